use futures::StreamExt;
use google_cloud_storage::{
    client::{Client, ClientConfig},
    http::{
        object_access_controls::{
            delete::DeleteObjectAccessControlRequest,
            insert::{InsertObjectAccessControlRequest, ObjectAccessControlCreationConfig},
            ObjectACLRole,
        },
        objects::{
            delete::DeleteObjectRequest,
            download::Range,
            get::GetObjectRequest,
            list::ListObjectsRequest,
            upload::{UploadObjectRequest, UploadType},
        },
        Error as GcsError,
    },
};
use tracing::{debug, info};

use crate::{adapters, model, util};

const PUBLIC_ENDPOINT: &str = "http://storage.googleapis.com";
const ALL_USERS: &str = "allUsers";

/// GCS-backed implementation of [`adapters::BlobStorage`], scoped to one
/// bucket. Private operations go through the authenticated client; reads
/// with a public ACL go through the anonymous HTTP endpoint instead.
pub struct GcsStorage {
    client: Client,
    http: reqwest::Client,
    project: String,
    bucket: String,
}

impl GcsStorage {
    /// Validates the options and binds an authenticated client for the
    /// adapter's lifetime. Credentials come from the ambient environment.
    pub async fn new(
        options: model::info::StorageOptions,
    ) -> Result<Self, model::error::StorageError> {
        let project = options
            .project
            .filter(|p| !p.is_empty())
            .ok_or(model::error::StorageError::Config("project"))?;
        let bucket = options
            .bucket
            .filter(|b| !b.is_empty())
            .ok_or(model::error::StorageError::Config("bucket"))?;

        let config = ClientConfig::default()
            .with_auth()
            .await
            .map_err(|err| model::error::StorageError::Auth(err.to_string()))?;

        info!(project = %project, bucket = %bucket, "gcs storage ready");

        Ok(Self {
            client: Client::new(config),
            http: reqwest::Client::new(),
            project,
            bucket,
        })
    }

    /// Builds the adapter around a pre-configured client, bypassing the
    /// ambient-credential bootstrap. Useful for custom auth and tests.
    pub fn from_client(client: Client, project: &str, bucket: &str) -> Self {
        Self {
            client,
            http: reqwest::Client::new(),
            project: project.to_string(),
            bucket: bucket.to_string(),
        }
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Anonymous request against the public object endpoint. Any non-200
    /// response is an error carrying the request path.
    async fn http_request(
        &self,
        method: reqwest::Method,
        file_key: &str,
    ) -> Result<(reqwest::header::HeaderMap, Vec<u8>), model::error::StorageError> {
        let path = format!("/{}/{}", self.bucket, file_key);
        let url = format!("{}{}", PUBLIC_ENDPOINT, path);
        debug!(method = %method, url = %url, "public request");

        let res = self.http.request(method, &url).send().await.map_err(|source| {
            model::error::StorageError::HttpTransport {
                path: path.clone(),
                source,
            }
        })?;

        let status = res.status().as_u16();
        if status != 200 {
            return Err(model::error::StorageError::HttpStatus { status, path });
        }

        let headers = res.headers().clone();
        let body = res
            .bytes()
            .await
            .map_err(|source| model::error::StorageError::HttpTransport { path, source })?;

        Ok((headers, body.to_vec()))
    }

    fn fetch_error(&self, file_key: &str, source: GcsError) -> model::error::StorageError {
        model::error::StorageError::Fetch {
            bucket: self.bucket.clone(),
            key: file_key.to_string(),
            source,
        }
    }
}

#[async_trait::async_trait]
impl adapters::BlobStorage for GcsStorage {
    async fn fetch_info(
        &self,
        file_key: &str,
        opts: model::info::FetchOptions,
    ) -> Result<model::info::FileInfo, model::error::StorageError> {
        debug!(bucket = %self.bucket, key = file_key, "fetch_info");

        if opts.acl.is_public() {
            let (headers, _) = self.http_request(reqwest::Method::HEAD, file_key).await?;
            return Ok(util::translate::info_from_headers(&headers));
        }

        let req = GetObjectRequest {
            bucket: self.bucket.clone(),
            object: file_key.to_string(),
            ..Default::default()
        };
        let meta = self.client.get_object(&req).await?;

        Ok(util::translate::info_from_object(&meta))
    }

    async fn fetch(
        &self,
        file_key: &str,
        opts: model::info::FetchOptions,
    ) -> Result<(model::info::FileInfo, Vec<u8>), model::error::StorageError> {
        debug!(bucket = %self.bucket, key = file_key, "fetch");

        if opts.acl.is_public() {
            let (headers, body) = self.http_request(reqwest::Method::GET, file_key).await?;
            return Ok((util::translate::info_from_headers(&headers), body));
        }

        // Metadata comes from a separate get_object before the download;
        // the two calls can observe different generations if the object is
        // rewritten in between.
        let req = GetObjectRequest {
            bucket: self.bucket.clone(),
            object: file_key.to_string(),
            ..Default::default()
        };
        let meta = self
            .client
            .get_object(&req)
            .await
            .map_err(|source| self.fetch_error(file_key, source))?;

        let mut stream = self
            .client
            .download_streamed_object(&req, &Range::default())
            .await
            .map_err(|source| self.fetch_error(file_key, source))?;

        let mut buf = Vec::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|source| self.fetch_error(file_key, source))?;
            buf.extend_from_slice(&chunk);
        }

        Ok((util::translate::info_from_object(&meta), buf))
    }

    async fn store(
        &self,
        file_key: &str,
        file: model::info::StoreFile,
    ) -> Result<model::info::FileInfo, model::error::StorageError> {
        debug!(bucket = %self.bucket, key = file_key, size = file.buffer.len(), "store");

        let meta = util::translate::object_from_info(file_key, &file.headers);
        let req = UploadObjectRequest {
            bucket: self.bucket.clone(),
            predefined_acl: util::translate::predefined_acl_from_info(&file.headers),
            ..Default::default()
        };

        let stored = self
            .client
            .upload_object(&req, file.buffer, &UploadType::Multipart(Box::new(meta)))
            .await
            .map_err(|source| model::error::StorageError::Store {
                bucket: self.bucket.clone(),
                key: file_key.to_string(),
                source,
            })?;

        Ok(util::translate::info_from_object(&stored))
    }

    async fn set_acl(
        &self,
        file_key: &str,
        acl: &str,
    ) -> Result<(), model::error::StorageError> {
        debug!(bucket = %self.bucket, key = file_key, acl = acl, "set_acl");

        if acl.starts_with("public") {
            let req = InsertObjectAccessControlRequest {
                bucket: self.bucket.clone(),
                object: file_key.to_string(),
                acl: ObjectAccessControlCreationConfig {
                    entity: ALL_USERS.to_string(),
                    role: ObjectACLRole::READER,
                },
                ..Default::default()
            };
            self.client.insert_object_access_control(&req).await?;

            return Ok(());
        }

        let req = DeleteObjectAccessControlRequest {
            bucket: self.bucket.clone(),
            object: file_key.to_string(),
            entity: ALL_USERS.to_string(),
            ..Default::default()
        };
        match self.client.delete_object_access_control(&req).await {
            // no allUsers entry means the object is already private
            Err(GcsError::Response(err)) if err.code == 404 => Ok(()),
            Err(err) => Err(err.into()),
            Ok(_) => Ok(()),
        }
    }

    async fn remove(&self, file_key: &str) -> Result<(), model::error::StorageError> {
        debug!(bucket = %self.bucket, key = file_key, "remove");

        let req = DeleteObjectRequest {
            bucket: self.bucket.clone(),
            object: file_key.to_string(),
            ..Default::default()
        };
        self.client.delete_object(&req).await?;

        Ok(())
    }

    async fn remove_directory(&self, dir: &str) -> Result<(), model::error::StorageError> {
        let prefix = util::path::dir_prefix(dir);
        debug!(bucket = %self.bucket, prefix = %prefix, "remove_directory");

        let mut page_token: Option<String> = None;
        loop {
            let req = ListObjectsRequest {
                bucket: self.bucket.clone(),
                prefix: Some(prefix.clone()),
                page_token: page_token.clone(),
                ..Default::default()
            };
            let page = self.client.list_objects(&req).await?;

            if let Some(objects) = page.items {
                for object in objects {
                    let req = DeleteObjectRequest {
                        bucket: self.bucket.clone(),
                        object: object.name,
                        ..Default::default()
                    };
                    self.client.delete_object(&req).await?;
                }
            }

            page_token = page.next_page_token;
            if page_token.is_none() {
                break;
            }
        }

        Ok(())
    }

    async fn list(
        &self,
        dir: &str,
        opts: model::info::ListOptions,
    ) -> Result<model::info::ListPage, model::error::StorageError> {
        let prefix = util::path::dir_prefix(dir);
        let delimiter = match opts.delimiter {
            Some(delimiter) => delimiter,
            None if opts.deep_query => String::new(),
            None => "/".to_string(),
        };
        debug!(bucket = %self.bucket, prefix = %prefix, delimiter = %delimiter, "list");

        let req = ListObjectsRequest {
            bucket: self.bucket.clone(),
            prefix: Some(prefix),
            delimiter: if delimiter.is_empty() {
                None
            } else {
                Some(delimiter.clone())
            },
            page_token: opts.last_key,
            max_results: opts.max_keys,
            ..Default::default()
        };
        let page = self.client.list_objects(&req).await?;

        let files = page
            .items
            .unwrap_or_default()
            .iter()
            .map(util::translate::info_from_object)
            .collect();
        let dirs = page
            .prefixes
            .unwrap_or_default()
            .into_iter()
            .map(|p| p.strip_suffix(delimiter.as_str()).unwrap_or(p.as_str()).to_string())
            .collect();

        Ok(model::info::ListPage {
            files,
            dirs,
            last_key: page.next_page_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_new_requires_project_and_bucket() {
        let cases = vec![
            (None, None, "project"),
            (None, Some("cache-us"), "project"),
            (Some(""), Some("cache-us"), "project"),
            (Some("my-project"), None, "bucket"),
            (Some("my-project"), Some(""), "bucket"),
        ];

        for (project, bucket, expected) in cases {
            let res = GcsStorage::new(model::info::StorageOptions {
                project: project.map(str::to_string),
                bucket: bucket.map(str::to_string),
            })
            .await;

            match res {
                Err(model::error::StorageError::Config(field)) => assert_eq!(field, expected),
                Err(err) => panic!("expected config error, got: {}", err),
                Ok(_) => panic!("expected config error for missing {}", expected),
            }
        }
    }
}
