use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("missing required option: {0}")]
    Config(&'static str),

    #[error("failed to set up credentials: {0}")]
    Auth(String),

    #[error("http request error: {status} for {path}")]
    HttpStatus { status: u16, path: String },

    #[error("http request error for {path}: {source}")]
    HttpTransport {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to fetch {bucket}/{key}: {source}")]
    Fetch {
        bucket: String,
        key: String,
        #[source]
        source: google_cloud_storage::http::Error,
    },

    #[error("failed to store {bucket}/{key}: {source}")]
    Store {
        bucket: String,
        key: String,
        #[source]
        source: google_cloud_storage::http::Error,
    },

    #[error(transparent)]
    Client(#[from] google_cloud_storage::http::Error),
}
