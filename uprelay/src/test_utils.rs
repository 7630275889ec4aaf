//! Shared helpers for integration-style tests.

use axum_test::TestServer;
use url::Url;

use crate::{Application, Config};

/// Config pointing the store at a mock server, with test credentials set.
pub fn test_config(store_base: &str) -> Config {
    let mut config = Config::default();
    config.store.api_base = Url::parse(store_base).expect("invalid store base url");
    config.store.token = Some("test-token".to_string());
    config.store.account = Some("test-account".to_string());
    config
}

pub fn create_test_app(config: Config) -> TestServer {
    Application::new(config)
        .expect("Failed to build application")
        .into_test_server()
}
