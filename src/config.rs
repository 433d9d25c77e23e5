use anyhow::{Context, Result};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_PREDICT_URL: &str = "http://127.0.0.1:5000/predict";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub bind_addr: String,
    pub predict_url: String,
    pub max_upload_bytes: usize,
}

impl Config {
    /// Reads `BIND_ADDR`, `PREDICT_URL` and `MAX_UPLOAD_BYTES`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        let predict_url =
            lookup("PREDICT_URL").unwrap_or_else(|| DEFAULT_PREDICT_URL.to_string());
        reqwest::Url::parse(&predict_url)
            .with_context(|| format!("PREDICT_URL is not a valid URL: {}", predict_url))?;

        let max_upload_bytes = match lookup("MAX_UPLOAD_BYTES") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .with_context(|| format!("MAX_UPLOAD_BYTES must be a byte count, got {:?}", raw))?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        Ok(Self {
            bind_addr,
            predict_url,
            max_upload_bytes,
        })
    }
}
