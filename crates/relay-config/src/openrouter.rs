use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Connection settings for the OpenRouter chat completions API
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OpenRouterConfig {
    /// API key sent as a bearer token (required to build a model)
    #[serde(default)]
    pub api_key: Option<SecretString>,
    /// Base URL override, e.g. `https://openrouter.ai/api/v1`
    #[serde(default)]
    pub base_url: Option<Url>,
    /// Site URL reported through the `HTTP-Referer` header
    #[serde(default)]
    pub app_url: Option<String>,
    /// Application name reported through the `X-Title` header
    #[serde(default)]
    pub app_name: Option<String>,
}

impl OpenRouterConfig {
    /// Config carrying only an API key, everything else defaulted
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(SecretString::from(api_key.into())),
            ..Self::default()
        }
    }
}
