use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub openai_model: String,
    pub pronet_api_key: Option<String>, // Optional: professional-network candidate source
    pub pronet_base_url: String,
    pub request_timeout_secs: u64,
    pub max_concurrency: usize,
    pub lead_cache_capacity: u64,
    pub lead_cache_ttl_secs: u64,
}

/// Loose format check for OpenAI-style keys. A bad key is still sent upstream
/// so the 401 path classifies it; this only powers the startup warning.
pub fn is_valid_api_key_format(key: &str) -> bool {
    key.len() > 10 && key.starts_with("sk-")
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            openai_api_key: std::env::var("OPENAI_API_KEY")
                .map_err(|_| anyhow::anyhow!("OPENAI_API_KEY environment variable required"))
                .and_then(|key| {
                    if key.trim().is_empty() {
                        anyhow::bail!("OPENAI_API_KEY cannot be empty");
                    }
                    Ok(key)
                })?,
            openai_base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com".to_string())
                .trim_end_matches('/')
                .to_string(),
            openai_model: std::env::var("OPENAI_MODEL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| "gpt-4o".to_string()),
            pronet_api_key: std::env::var("PRONET_API_KEY")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            pronet_base_url: {
                let url = std::env::var("PRONET_BASE_URL")
                    .unwrap_or_else(|_| "https://api.linkedin.com/v2".to_string());
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    anyhow::bail!("PRONET_BASE_URL must start with http:// or https://");
                }
                url.trim_end_matches('/').to_string()
            },
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("REQUEST_TIMEOUT_SECS must be a valid number"))?,
            max_concurrency: std::env::var("MAX_CONCURRENCY")
                .unwrap_or_else(|_| "4".to_string())
                .parse()
                .ok()
                .filter(|n| *n >= 1)
                .ok_or_else(|| anyhow::anyhow!("MAX_CONCURRENCY must be a number >= 1"))?,
            lead_cache_capacity: std::env::var("LEAD_CACHE_CAPACITY")
                .unwrap_or_else(|_| "10000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("LEAD_CACHE_CAPACITY must be a valid number"))?,
            lead_cache_ttl_secs: std::env::var("LEAD_CACHE_TTL_SECS")
                .unwrap_or_else(|_| "3600".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("LEAD_CACHE_TTL_SECS must be a valid number"))?,
        };

        if !config.openai_base_url.starts_with("http://")
            && !config.openai_base_url.starts_with("https://")
        {
            anyhow::bail!("OPENAI_BASE_URL must start with http:// or https://");
        }

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        if !is_valid_api_key_format(&config.openai_api_key) {
            tracing::warn!(
                "OPENAI_API_KEY does not look like an OpenAI key (expected sk- prefix); \
                 lead generation may fail with invalid_api_key"
            );
        }
        tracing::debug!("OpenAI base URL: {}", config.openai_base_url);
        tracing::debug!("OpenAI model: {}", config.openai_model);
        if config.pronet_api_key.is_some() {
            tracing::info!(
                "Professional-network candidate source configured: {}",
                config.pronet_base_url
            );
        }
        tracing::debug!("Max assembly concurrency: {}", config.max_concurrency);

        Ok(config)
    }
}
