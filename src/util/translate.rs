use google_cloud_storage::http::{
    object_access_controls::PredefinedObjectAcl, objects::Object,
};
use reqwest::header::HeaderMap;
use time::{
    format_description::well_known::Rfc2822, macros::format_description, OffsetDateTime,
    PrimitiveDateTime,
};

use crate::model;

/// Parses an HTTP date header value. GCS serves IMF-fixdate with a literal
/// `GMT` zone, which the RFC 2822 parser rejects, so try that form first.
pub fn parse_http_date(raw: &str) -> Option<OffsetDateTime> {
    let imf_fixdate = format_description!(
        "[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT"
    );

    if let Ok(parsed) = PrimitiveDateTime::parse(raw, &imf_fixdate) {
        return Some(parsed.assume_utc());
    }

    OffsetDateTime::parse(raw, &Rfc2822).ok()
}

/// Maps anonymous-endpoint response headers onto the neutral record.
/// Unmapped headers are ignored except `x-goog-meta-<name>`, which lands in
/// `custom_headers[name]`. Empty values are dropped, never mapped.
pub fn info_from_headers(headers: &HeaderMap) -> model::info::FileInfo {
    let mut info = model::info::FileInfo::default();

    for (name, value) in headers {
        let value = match value.to_str() {
            Ok(value) if !value.is_empty() => value,
            _ => continue,
        };

        match name.as_str() {
            "cache-control" => info.cache_control = Some(value.to_string()),
            "content-encoding" => info.content_encoding = Some(value.to_string()),
            "content-language" => info.content_language = Some(value.to_string()),
            "content-type" => info.content_type = Some(value.to_string()),
            "last-modified" => info.last_modified = parse_http_date(value),
            "content-length" => info.size = value.parse::<u64>().ok(),
            "etag" => info.etag = Some(value.to_string()),
            other => {
                if let Some(custom) = other.strip_prefix("x-goog-meta-") {
                    info.custom_headers
                        .insert(custom.to_string(), value.to_string());
                }
            }
        }
    }

    info
}

/// Maps provider object metadata onto the neutral record. The nested
/// custom-metadata map is copied through verbatim.
pub fn info_from_object(meta: &Object) -> model::info::FileInfo {
    let mut info = model::info::FileInfo::default();

    if !meta.name.is_empty() {
        info.key = Some(meta.name.clone());
    }
    if !meta.etag.is_empty() {
        info.etag = Some(meta.etag.clone());
    }
    if meta.size > 0 {
        info.size = Some(meta.size as u64);
    }
    info.last_modified = meta.time_created;
    if let Some(cache_control) = meta.cache_control.as_deref().filter(|v| !v.is_empty()) {
        info.cache_control = Some(cache_control.to_string());
    }
    if let Some(content_type) = meta.content_type.as_deref().filter(|v| !v.is_empty()) {
        info.content_type = Some(content_type.to_string());
    }
    if let Some(metadata) = &meta.metadata {
        info.custom_headers = metadata.clone();
    }

    info
}

/// Maps neutral header fields back into provider object metadata for an
/// upload. The inverse of `info_from_object` for the write-path fields.
pub fn object_from_info(file_key: &str, info: &model::info::FileInfo) -> Object {
    let mut meta = Object {
        name: file_key.to_string(),
        ..Default::default()
    };

    if let Some(cache_control) = info.cache_control.as_deref().filter(|v| !v.is_empty()) {
        meta.cache_control = Some(cache_control.to_string());
    }
    if let Some(content_type) = info.content_type.as_deref().filter(|v| !v.is_empty()) {
        meta.content_type = Some(content_type.to_string());
    }
    if !info.custom_headers.is_empty() {
        meta.metadata = Some(info.custom_headers.clone());
    }

    meta
}

/// Prefix-matches the neutral access-control value: `public*` requests
/// public-read, `private*` requests private, anything else leaves the
/// bucket default in place.
pub fn predefined_acl_from_info(
    info: &model::info::FileInfo,
) -> Option<PredefinedObjectAcl> {
    match info.access_control.as_deref() {
        Some(acl) if acl.starts_with("public") => Some(PredefinedObjectAcl::PublicRead),
        Some(acl) if acl.starts_with("private") => Some(PredefinedObjectAcl::Private),
        _ => None,
    }
}
