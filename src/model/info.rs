use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Neutral, S3-like metadata record. Built fresh from every provider
/// response; fields with empty or absent provider values stay `None`.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct FileInfo {
    #[serde(rename = "Key", skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    #[serde(rename = "ETag", skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,

    #[serde(rename = "Size", skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    #[serde(
        rename = "LastModified",
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub last_modified: Option<OffsetDateTime>,

    #[serde(rename = "CacheControl", skip_serializing_if = "Option::is_none")]
    pub cache_control: Option<String>,

    #[serde(rename = "ContentEncoding", skip_serializing_if = "Option::is_none")]
    pub content_encoding: Option<String>,

    #[serde(rename = "ContentLanguage", skip_serializing_if = "Option::is_none")]
    pub content_language: Option<String>,

    #[serde(rename = "ContentType", skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    /// Write-path only. Prefix-matched: anything starting with `public`
    /// requests public-read visibility, `private` requests private.
    #[serde(rename = "AccessControl", skip_serializing_if = "Option::is_none")]
    pub access_control: Option<String>,

    /// User-defined key/value metadata, distinct from the fixed fields above.
    #[serde(rename = "CustomHeaders", skip_serializing_if = "HashMap::is_empty")]
    pub custom_headers: HashMap<String, String>,
}

/// One page of a listing: files, single-level directory prefixes, and the
/// continuation token for the next page (absent on the last page).
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct ListPage {
    pub files: Vec<FileInfo>,
    pub dirs: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_key: Option<String>,
}

/// Write-path input: the full object body plus the neutral header fields
/// to derive upload options from.
#[derive(Debug, Default, Clone)]
pub struct StoreFile {
    pub buffer: Vec<u8>,
    pub headers: FileInfo,
}

/// Adapter construction options. Both fields are required; validation
/// happens in the constructor before any network work.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct StorageOptions {
    pub project: Option<String>,
    pub bucket: Option<String>,
}

/// Access mode for read operations. `Public` routes the call through the
/// anonymous HTTP endpoint instead of the authenticated client.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Acl {
    Public,
    #[default]
    Private,
}

impl Acl {
    pub fn is_public(&self) -> bool {
        matches!(self, Acl::Public)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FetchOptions {
    pub acl: Acl,
}

/// Listing options. Pagination is caller-controlled: feed the returned
/// `last_key` back in to get the next page.
#[derive(Debug, Default, Clone)]
pub struct ListOptions {
    pub last_key: Option<String>,
    pub max_keys: Option<i32>,
    /// Explicit delimiter; wins over `deep_query` when set.
    pub delimiter: Option<String>,
    /// Flat listing across the full key space under the prefix.
    pub deep_query: bool,
}
