use crate::config::types::{
    ApiConfig, Config, FetchConfig, MarkerConfig, OutputConfig, SelectorConfig, SiteConfig,
};
use crate::ConfigError;
use scraper::Selector;
use std::time::Duration;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_selectors(&config.selectors)?;
    validate_markers(&config.markers)?;
    validate_fetch_config(&config.fetch)?;
    validate_output_config(&config.output)?;
    validate_api_config(&config.api)?;
    Ok(())
}

/// Validates the site address settings
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' must use http or https",
            config.base_url
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' has no host",
            config.base_url
        )));
    }

    if config.page_param.is_empty() {
        return Err(ConfigError::Validation(
            "page-param cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Checks that every configured selector compiles
fn validate_selectors(config: &SelectorConfig) -> Result<(), ConfigError> {
    let selectors = [
        ("feature-item", &config.feature_item),
        ("feature-link", &config.feature_link),
        ("pagination-item", &config.pagination_item),
        ("collection-root", &config.collection_root),
        ("product-card", &config.product_card),
        ("product-title", &config.product_title),
        ("product-link", &config.product_link),
        ("product-price", &config.product_price),
        ("feature-product", &config.feature_product),
        ("feature-product-name", &config.feature_product_name),
        ("detail-root", &config.detail_root),
        ("option-name", &config.option_name),
        ("option-select", &config.option_select),
    ];

    for (field, selector) in selectors {
        compile_selector(field, selector)?;
    }

    if config.feature_handle_attr.is_empty() {
        return Err(ConfigError::Validation(
            "feature-handle-attr cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Compiles one selector, naming the offending config key on failure
pub(crate) fn compile_selector(field: &'static str, selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|_| ConfigError::InvalidSelector {
        field,
        selector: selector.to_string(),
    })
}

/// Validates text markers and separators
fn validate_markers(config: &MarkerConfig) -> Result<(), ConfigError> {
    let required = [
        ("currency-sign", &config.currency_sign),
        ("has-options", &config.has_options),
        ("sold-out", &config.sold_out),
        ("option-sold-out", &config.option_sold_out),
        ("option-separator", &config.option_separator),
    ];

    for (field, value) in required {
        if value.is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", field)));
        }
    }

    Ok(())
}

/// Validates retry and concurrency settings
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "attempts must be >= 1, got {}",
            config.attempts
        )));
    }

    if Duration::try_from_secs_f64(config.wait_seconds).is_err() {
        return Err(ConfigError::Validation(format!(
            "wait-seconds must be a non-negative number of seconds, got {}",
            config.wait_seconds
        )));
    }

    if config.feature_batch_size < 1 || config.feature_batch_size > 100 {
        return Err(ConfigError::Validation(format!(
            "feature-batch-size must be between 1 and 100, got {}",
            config.feature_batch_size
        )));
    }

    if config.timeout_seconds < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout-seconds must be >= 1, got {}",
            config.timeout_seconds
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "directory cannot be empty".to_string(),
        ));
    }

    if config.snapshot_directory.is_empty() {
        return Err(ConfigError::Validation(
            "snapshot-directory cannot be empty".to_string(),
        ));
    }

    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates the crop endpoint and feature names
fn validate_api_config(config: &ApiConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.crops_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid crops-url: {}", e)))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "crops-url '{}' must use http or https",
            config.crops_url
        )));
    }

    if config.perennial_feature.is_empty() || config.other_feature.is_empty() {
        return Err(ConfigError::Validation(
            "crop feature names cannot be empty".to_string(),
        ));
    }

    Ok(())
}
