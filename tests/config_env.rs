//! Environment-driven configuration tests.
//!
//! These tests mutate process environment and must run serially.

use std::time::Duration;

use edgequake_rerank::{HttpRerankProvider, RerankConfig, RerankError};
use serial_test::serial;

const VARS: [&str; 5] = [
    "RERANK_API_KEY",
    "RERANK_BASE_URL",
    "RERANK_MODEL",
    "RERANK_TOP_N",
    "RERANK_TIMEOUT_SECS",
];

fn clear_env() {
    for var in VARS {
        std::env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_defaults_without_env() {
    clear_env();

    let config = RerankConfig::from_env().unwrap();
    assert_eq!(config.model, "rerank-1");
    assert_eq!(config.base_url, "https://api.openai.com");
    assert_eq!(config.top_n, 10);
    assert_eq!(config.timeout, Duration::from_secs(30));
    assert!(config.api_key.is_none());
}

#[test]
#[serial]
fn test_env_overrides() {
    clear_env();
    std::env::set_var("RERANK_API_KEY", "sk-test");
    std::env::set_var("RERANK_BASE_URL", "https://api.siliconflow.cn/");
    std::env::set_var("RERANK_MODEL", "BAAI/bge-reranker-v2-m3");
    std::env::set_var("RERANK_TOP_N", "3");
    std::env::set_var("RERANK_TIMEOUT_SECS", "5");

    let config = RerankConfig::from_env().unwrap();
    assert_eq!(config.api_key.as_deref(), Some("sk-test"));
    assert_eq!(config.base_url, "https://api.siliconflow.cn");
    assert_eq!(config.model, "BAAI/bge-reranker-v2-m3");
    assert_eq!(config.top_n, 3);
    assert_eq!(config.timeout, Duration::from_secs(5));

    clear_env();
}

#[test]
#[serial]
fn test_invalid_top_n() {
    clear_env();
    std::env::set_var("RERANK_TOP_N", "three");

    let err = RerankConfig::from_env().unwrap_err();
    assert!(matches!(err, RerankError::ConfigError(_)));
    assert!(err.to_string().contains("RERANK_TOP_N"));

    clear_env();
}

#[test]
#[serial]
fn test_zero_top_n_raised_to_one() {
    clear_env();
    std::env::set_var("RERANK_TOP_N", "0");

    assert_eq!(RerankConfig::from_env().unwrap().top_n, 1);

    clear_env();
}

#[test]
#[serial]
fn test_http_provider_requires_key() {
    clear_env();

    let err = HttpRerankProvider::from_env().unwrap_err();
    assert!(matches!(err, RerankError::ConfigError(_)));

    std::env::set_var("RERANK_API_KEY", "sk-test");
    assert!(HttpRerankProvider::from_env().is_ok());

    clear_env();
}
