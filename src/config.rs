//! Configuration loader — merges env vars, .env file, and config.toml.

use common::{AppConfig, Error};
use std::path::Path;

fn parse_positive_u64(raw: &str, env_name: &str) -> Result<u64, Error> {
    let parsed = raw
        .trim()
        .parse::<u64>()
        .map_err(|_| Error::Config(format!("{env_name} must be an integer > 0")))?;
    if parsed == 0 {
        return Err(Error::Config(format!("{env_name} must be an integer > 0")));
    }
    Ok(parsed)
}

fn validate_config(config: &AppConfig) -> Result<(), Error> {
    let mut issues: Vec<String> = Vec::new();

    if config.database_url.trim().is_empty() {
        issues.push("database_url must not be empty".into());
    }

    if config.server.port == 0 {
        issues.push("server.port must be > 0".into());
    }
    if config.server.default_limit == 0 {
        issues.push("server.default_limit must be > 0".into());
    }

    if config.timing.refresh_interval_secs == 0 {
        issues.push("timing.refresh_interval_secs must be > 0".into());
    }
    if config.timing.insight_interval_secs == 0 {
        issues.push("timing.insight_interval_secs must be > 0".into());
    }
    if config.timing.cache_ttl_secs == 0 {
        issues.push("timing.cache_ttl_secs must be > 0".into());
    }
    if config.timing.batch_width == 0 {
        issues.push("timing.batch_width must be > 0".into());
    }
    if config.timing.llm_timeout_ms == 0 {
        issues.push("timing.llm_timeout_ms must be > 0".into());
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "Invalid config:\n - {}",
            issues.join("\n - ")
        )))
    }
}

/// Load service configuration from environment and optional config file.
pub fn load_config() -> Result<AppConfig, Error> {
    // 1. Load .env file if present.
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!("No .env file loaded: {}", e);
    }

    // 2. Start with defaults.
    let mut config = AppConfig::default();

    // 3. Try loading config.toml if it exists.
    let config_path = Path::new("config.toml");
    if config_path.exists() {
        let contents = std::fs::read_to_string(config_path)
            .map_err(|e| Error::Config(format!("Failed to read config.toml: {}", e)))?;
        config = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config.toml: {}", e)))?;
    }

    // 4. Override with environment variables (highest priority).
    if let Ok(key) = std::env::var("DEEPSEEK_API_KEY") {
        config.deepseek_api_key = key;
    }
    if let Ok(model) = std::env::var("DEEPSEEK_MODEL") {
        config.deepseek_model = model;
    }
    if let Ok(url) = std::env::var("DATABASE_URL") {
        config.database_url = url;
    }
    if let Ok(host) = std::env::var("HOST") {
        config.server.host = host;
    }
    if let Ok(port) = std::env::var("PORT") {
        config.server.port = port
            .trim()
            .parse::<u16>()
            .map_err(|_| Error::Config("PORT must be a valid port number".into()))?;
    }
    if let Ok(raw) = std::env::var("REFRESH_INTERVAL_SECS") {
        config.timing.refresh_interval_secs = parse_positive_u64(&raw, "REFRESH_INTERVAL_SECS")?;
    }
    if let Ok(raw) = std::env::var("INSIGHT_INTERVAL_SECS") {
        config.timing.insight_interval_secs = parse_positive_u64(&raw, "INSIGHT_INTERVAL_SECS")?;
    }
    if let Ok(raw) = std::env::var("CACHE_TTL_SECS") {
        config.timing.cache_ttl_secs = parse_positive_u64(&raw, "CACHE_TTL_SECS")?;
    }
    if let Ok(raw) = std::env::var("BATCH_WIDTH") {
        let width = parse_positive_u64(&raw, "BATCH_WIDTH")?;
        config.timing.batch_width = width as usize;
    }
    if let Ok(raw) = std::env::var("BATCH_DELAY_MS") {
        config.timing.batch_delay_ms = raw
            .trim()
            .parse::<u64>()
            .map_err(|_| Error::Config("BATCH_DELAY_MS must be an integer >= 0".into()))?;
    }

    // 5. Validate. The DeepSeek key is deliberately optional: without it
    // the AI endpoints degrade instead of blocking startup.
    validate_config(&config)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut config = AppConfig::default();
        config.timing.refresh_interval_secs = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("refresh_interval_secs"));
    }

    #[test]
    fn test_zero_batch_width_rejected() {
        let mut config = AppConfig::default();
        config.timing.batch_width = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_parse_positive_u64() {
        assert_eq!(parse_positive_u64("30", "X").unwrap(), 30);
        assert!(parse_positive_u64("0", "X").is_err());
        assert!(parse_positive_u64("abc", "X").is_err());
    }
}
