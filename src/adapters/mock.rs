use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Mutex,
};

use time::OffsetDateTime;

use crate::{adapters, model, util};

/// In-memory [`adapters::BlobStorage`] for callers' tests. Keys live in a
/// sorted map so listing order and pagination are deterministic. ACL calls
/// are accepted and ignored; the public/private read paths serve the same
/// data.
#[derive(Default)]
pub struct MockStorage {
    objects: Mutex<BTreeMap<String, (model::info::FileInfo, Vec<u8>)>>,
}

impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn not_found(&self, file_key: &str) -> model::error::StorageError {
        model::error::StorageError::HttpStatus {
            status: 404,
            path: format!("/mock/{}", file_key),
        }
    }
}

#[async_trait::async_trait]
impl adapters::BlobStorage for MockStorage {
    async fn fetch_info(
        &self,
        file_key: &str,
        _opts: model::info::FetchOptions,
    ) -> Result<model::info::FileInfo, model::error::StorageError> {
        let objects = self.objects.lock().expect("failed to acquire `objects` guard");

        match objects.get(file_key) {
            Some((info, _)) => Ok(info.clone()),
            None => Err(self.not_found(file_key)),
        }
    }

    async fn fetch(
        &self,
        file_key: &str,
        _opts: model::info::FetchOptions,
    ) -> Result<(model::info::FileInfo, Vec<u8>), model::error::StorageError> {
        let objects = self.objects.lock().expect("failed to acquire `objects` guard");

        match objects.get(file_key) {
            Some((info, body)) => Ok((info.clone(), body.clone())),
            None => Err(self.not_found(file_key)),
        }
    }

    async fn store(
        &self,
        file_key: &str,
        file: model::info::StoreFile,
    ) -> Result<model::info::FileInfo, model::error::StorageError> {
        let info = model::info::FileInfo {
            key: Some(file_key.to_string()),
            size: Some(file.buffer.len() as u64),
            last_modified: Some(OffsetDateTime::now_utc()),
            cache_control: file.headers.cache_control.clone(),
            content_type: file.headers.content_type.clone(),
            custom_headers: file.headers.custom_headers.clone(),
            ..Default::default()
        };

        let mut objects = self.objects.lock().expect("failed to acquire `objects` guard");
        objects.insert(file_key.to_string(), (info.clone(), file.buffer));

        Ok(info)
    }

    async fn set_acl(
        &self,
        _file_key: &str,
        _acl: &str,
    ) -> Result<(), model::error::StorageError> {
        Ok(())
    }

    async fn remove(&self, file_key: &str) -> Result<(), model::error::StorageError> {
        let mut objects = self.objects.lock().expect("failed to acquire `objects` guard");

        match objects.remove(file_key) {
            Some(_) => Ok(()),
            None => Err(self.not_found(file_key)),
        }
    }

    async fn remove_directory(&self, dir: &str) -> Result<(), model::error::StorageError> {
        let prefix = util::path::dir_prefix(dir);

        let mut objects = self.objects.lock().expect("failed to acquire `objects` guard");
        objects.retain(|key, _| !key.starts_with(&prefix));

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
        let max_keys = opts.max_keys.unwrap_or(i32::MAX).max(0) as usize;

        let objects = self.objects.lock().expect("failed to acquire `objects` guard");

        let mut files = Vec::new();
        let mut dirs = BTreeSet::new();
        let mut last_key = None;

        for (key, (info, _)) in objects.iter() {
            if !key.starts_with(&prefix) {
                continue;
            }
            if let Some(seed) = &opts.last_key {
                if key <= seed {
                    continue;
                }
            }

            let rest = &key[prefix.len()..];
            if !delimiter.is_empty() {
                if let Some(pos) = rest.find(delimiter.as_str()) {
                    dirs.insert(format!("{}{}", prefix, &rest[..pos]));
                    continue;
                }
            }

            if files.len() == max_keys {
                last_key = files
                    .last()
                    .and_then(|f: &model::info::FileInfo| f.key.clone());
                break;
            }
            files.push(info.clone());
        }

        Ok(model::info::ListPage {
            files,
            dirs: dirs.into_iter().collect(),
            last_key,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use crate::adapters::BlobStorage;

    use super::*;

    async fn seed(keys: &[&str]) -> MockStorage {
        let storage = MockStorage::new();
        for key in keys {
            storage
                .store(
                    key,
                    model::info::StoreFile {
                        buffer: b"hello, world!".to_vec(),
                        headers: model::info::FileInfo::default(),
                    },
                )
                .await
                .unwrap();
        }

        storage
    }

    #[tokio::test]
    async fn test_store_then_fetch() {
        let storage = MockStorage::new();

        let stored = storage
            .store(
                "dir/test.txt",
                model::info::StoreFile {
                    buffer: b"hello, world!".to_vec(),
                    headers: model::info::FileInfo {
                        content_type: Some("text/plain".to_string()),
                        custom_headers: HashMap::from([("k".to_string(), "v".to_string())]),
                        ..Default::default()
                    },
                },
            )
            .await
            .unwrap();

        assert_eq!(stored.key.as_deref(), Some("dir/test.txt"));
        assert_eq!(stored.size, Some(13));

        let (info, body) = storage
            .fetch("dir/test.txt", model::info::FetchOptions::default())
            .await
            .unwrap();
        assert_eq!(body, b"hello, world!");
        assert_eq!(info.content_type.as_deref(), Some("text/plain"));
        assert_eq!(info.custom_headers.get("k").map(String::as_str), Some("v"));
    }

    #[tokio::test]
    async fn test_fetch_info_missing_key() {
        let storage = MockStorage::new();

        let res = storage
            .fetch_info("nope", model::info::FetchOptions::default())
            .await;
        assert!(res.is_err());
    }

    #[tokio::test]
    async fn test_list_hierarchical() {
        let storage = seed(&["a/one", "a/two", "a/sub/three", "b/four", "five"]).await;

        let page = storage
            .list("a", model::info::ListOptions::default())
            .await
            .unwrap();

        let keys: Vec<_> = page.files.iter().filter_map(|f| f.key.clone()).collect();
        assert_eq!(keys, vec!["a/one", "a/two"]);
        assert_eq!(page.dirs, vec!["a/sub"]);
        assert_eq!(page.last_key, None);
    }

    #[tokio::test]
    async fn test_list_deep_query() {
        let storage = seed(&["a/one", "a/sub/three", "b/four"]).await;

        let page = storage
            .list(
                "a",
                model::info::ListOptions {
                    deep_query: true,
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let keys: Vec<_> = page.files.iter().filter_map(|f| f.key.clone()).collect();
        assert_eq!(keys, vec!["a/one", "a/sub/three"]);
        assert!(page.dirs.is_empty());
    }

    #[tokio::test]
    async fn test_list_pagination() {
        let storage = seed(&["p/a", "p/b", "p/c"]).await;

        let first = storage
            .list(
                "p",
                model::info::ListOptions {
                    max_keys: Some(2),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let keys: Vec<_> = first.files.iter().filter_map(|f| f.key.clone()).collect();
        assert_eq!(keys, vec!["p/a", "p/b"]);
        assert_eq!(first.last_key.as_deref(), Some("p/b"));

        let second = storage
            .list(
                "p",
                model::info::ListOptions {
                    max_keys: Some(2),
                    last_key: first.last_key,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let keys: Vec<_> = second.files.iter().filter_map(|f| f.key.clone()).collect();
        assert_eq!(keys, vec!["p/c"]);
        assert_eq!(second.last_key, None);
    }

    #[tokio::test]
    async fn test_list_full_page_trailed_by_grouped_keys_has_no_last_key() {
        // keys sort so both files come before the delimiter-grouped ones
        let storage = seed(&["p/a", "p/b", "p/sub/c", "p/sub/d"]).await;

        let page = storage
            .list(
                "p",
                model::info::ListOptions {
                    max_keys: Some(2),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let keys: Vec<_> = page.files.iter().filter_map(|f| f.key.clone()).collect();
        assert_eq!(keys, vec!["p/a", "p/b"]);
        assert_eq!(page.dirs, vec!["p/sub"]);
        assert_eq!(page.last_key, None);
    }

    #[tokio::test]
    async fn test_remove_directory() {
        let storage = seed(&["logs/a", "logs/b", "logstash", "other"]).await;

        storage.remove_directory("logs").await.unwrap();

        let page = storage
            .list(
                "",
                model::info::ListOptions {
                    deep_query: true,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let keys: Vec<_> = page.files.iter().filter_map(|f| f.key.clone()).collect();
        assert_eq!(keys, vec!["logstash", "other"]);
    }

    #[tokio::test]
    async fn test_remove() {
        let storage = seed(&["one"]).await;

        storage.remove("one").await.unwrap();
        assert!(storage.remove("one").await.is_err());
    }
}
