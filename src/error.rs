use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("config parse error: {0}")]
    ConfigParse(String),

    #[error("cache parse error: {0}")]
    CacheParse(String),

    #[error("cache file not found: {0}")]
    CacheNotFound(String),

    #[error("GitHub API error ({status}) for {url}")]
    ApiStatus { status: u16, url: String },

    #[error("rate limit retries exhausted for {0}")]
    RateLimitExhausted(String),

    #[error("transport error for {url}: {message}")]
    Transport { url: String, message: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("xlsx error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

pub type Result<T> = std::result::Result<T, AnalyzerError>;
