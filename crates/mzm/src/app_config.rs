//! 🔧 Provider configuration: where the API lives and how to prove we're allowed in.
//!
//! 🏗️ Figment again. Environment variables (`MZM_*`, nested with `__`) form the base layer,
//! and an optional TOML file goes on top. TOML wins on conflicts.
//!
//! ```toml
//! [api]
//! endpoint = "https://api.mezmo.com"
//! auth_key = "..."
//! request_timeout_secs = 60
//! ```
//!
//! is the same as `MZM_API__AUTH_KEY=... MZM_API__REQUEST_TIMEOUT_SECS=60`.

use std::fmt;
use std::path::Path;

use anyhow::Context;
use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::Deserialize;
use tracing::info;

/// 📦 Everything the provider needs to know before it can talk to anyone.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub api: ApiConfig,
}

/// 📡 The pipeline API connection.
#[derive(Deserialize, Clone)]
pub struct ApiConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// 🔒 Sent as `Authorization: Token <auth_key>`. Required, no default.
    pub auth_key: String,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_endpoint() -> String {
    "https://api.mezmo.com".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    30
}

// 🔒 Keep the key out of logs.
impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("endpoint", &self.endpoint)
            .field("auth_key", &"<redacted>")
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

/// 🚀 Load the config from `MZM_*` environment variables, plus `config_file_name` if given.
///
/// 💀 Fails when the result doesn't parse, most commonly because `api.auth_key` is nowhere
/// to be found. The error says where we looked.
pub fn load_config(config_file_name: Option<&Path>) -> anyhow::Result<AppConfig> {
    info!("🔧 Loading configuration: {:?}", config_file_name.unwrap_or(Path::new("")));

    let config = Figment::new().merge(Env::prefixed("MZM_").split("__"));
    let config = match config_file_name {
        Some(file_name) => config.merge(Toml::file(file_name)),
        None => config,
    };

    let context_msg = match config_file_name {
        Some(path) => format!(
            "💀 Failed to load configuration from '{}' and environment variables (MZM_*). \
             An API auth key is required: set [api] auth_key or MZM_API__AUTH_KEY.",
            path.display()
        ),
        None => "💀 Failed to load configuration from environment variables (MZM_*). \
                 An API auth key is required: set MZM_API__AUTH_KEY, or pass a config file."
            .to_string(),
    };

    config.extract().context(context_msg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_test_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("💀 Could not create a temp config file");
        file.write_all(contents.as_bytes())
            .expect("💀 Could not write the temp config file");
        file
    }

    #[test]
    fn the_one_where_only_the_key_is_given_and_defaults_fill_the_rest() {
        let the_file = write_test_config(
            r#"
            [api]
            auth_key = "sekrit"
            "#,
        );
        let the_config = load_config(Some(the_file.path())).expect("💀 a key alone should be enough");
        assert_eq!(the_config.api.endpoint, "https://api.mezmo.com");
        assert_eq!(the_config.api.auth_key, "sekrit");
        assert_eq!(the_config.api.connect_timeout_secs, 10);
        assert_eq!(the_config.api.request_timeout_secs, 30);
    }

    #[test]
    fn the_one_where_the_file_overrides_everything() {
        let the_file = write_test_config(
            r#"
            [api]
            endpoint = "http://localhost:8080"
            auth_key = "sekrit"
            connect_timeout_secs = 1
            request_timeout_secs = 2
            "#,
        );
        let the_config = load_config(Some(the_file.path())).expect("💀 full config should parse");
        assert_eq!(the_config.api.endpoint, "http://localhost:8080");
        assert_eq!(the_config.api.request_timeout_secs, 2);
    }

    #[test]
    fn the_one_where_nobody_brought_a_key() {
        let the_file = write_test_config(
            r#"
            [api]
            endpoint = "http://localhost:8080"
            "#,
        );
        let the_error = load_config(Some(the_file.path())).expect_err("💀 no key, no config");
        assert!(format!("{the_error:#}").contains("auth_key"));
    }

    #[test]
    fn the_one_where_debug_output_keeps_a_secret() {
        let the_config: AppConfig = toml::from_str(
            r#"
            [api]
            auth_key = "sekrit"
            "#,
        )
        .expect("💀 inline toml should parse");
        let the_debug = format!("{the_config:?}");
        assert!(!the_debug.contains("sekrit"));
        assert!(the_debug.contains("<redacted>"));
    }
}
