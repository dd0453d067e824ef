use super::{types::Config, ConfigError};
use crate::searcher::MAX_PAGE_SIZE;

/// Validate configuration
/// Currently validates:
/// - YouTube API key is set (file or `CURATOR_YOUTUBE__API_KEY`)
/// - Unit costs and timeouts are non-zero
/// - Page size is within the API limit
/// - Default filter criteria and pagination bounds are usable
/// - Classifier backoff bounds are consistent
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let yt = &config.youtube;
    if yt.api_key.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "youtube.api_key must be set".to_string(),
        ));
    }
    if yt.search_unit_cost == 0 || yt.detail_unit_cost == 0 {
        return Err(ConfigError::ValidationError(
            "youtube unit costs cannot be 0".to_string(),
        ));
    }
    if yt.search_timeout_secs == 0 || yt.detail_timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "youtube timeouts cannot be 0".to_string(),
        ));
    }

    let page_size = config.orchestrator.page_size;
    if page_size == 0 || page_size > MAX_PAGE_SIZE {
        return Err(ConfigError::ValidationError(format!(
            "orchestrator.page_size must be between 1 and {}",
            MAX_PAGE_SIZE
        )));
    }

    config
        .filter
        .validate()
        .map_err(|e| ConfigError::ValidationError(format!("filter: {}", e)))?;

    config
        .pagination
        .validate()
        .map_err(|e| ConfigError::ValidationError(format!("pagination: {}", e)))?;

    let retry = &config.classifier.retry;
    if retry.initial_backoff_ms > retry.max_backoff_ms {
        return Err(ConfigError::ValidationError(
            "classifier.retry.initial_backoff_ms exceeds max_backoff_ms".to_string(),
        ));
    }
    if !retry.multiplier.is_finite() || retry.multiplier < 1.0 {
        return Err(ConfigError::ValidationError(
            "classifier.retry.multiplier must be at least 1.0".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ClassifierConfig, YouTubeConfig};
    use crate::filter::FilterCriteria;
    use crate::orchestrator::OrchestratorConfig;
    use crate::pagination::PaginationConfig;

    fn valid_config() -> Config {
        Config {
            youtube: YouTubeConfig {
                api_key: "key".to_string(),
                ..YouTubeConfig::default()
            },
            filter: FilterCriteria::default(),
            pagination: PaginationConfig::default(),
            orchestrator: OrchestratorConfig::default(),
            classifier: ClassifierConfig::default(),
        }
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_validate_missing_api_key_fails() {
        let mut config = valid_config();
        config.youtube.api_key = "  ".to_string();
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_page_size_bounds() {
        let mut config = valid_config();
        config.orchestrator.page_size = 51;
        assert!(validate_config(&config).is_err());

        config.orchestrator.page_size = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_inverted_duration_window_fails() {
        let mut config = valid_config();
        config.filter.min_duration_seconds = 120;
        config.filter.max_duration_seconds = 60;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("filter"));
    }

    #[test]
    fn test_validate_zero_page_budget_fails() {
        let mut config = valid_config();
        config.pagination.max_pages = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("pagination"));
    }

    #[test]
    fn test_validate_retry_bounds() {
        let mut config = valid_config();
        config.classifier.retry.initial_backoff_ms = 60_000;
        assert!(validate_config(&config).is_err());

        let mut config = valid_config();
        config.classifier.retry.multiplier = 0.5;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("multiplier"));
    }
}
