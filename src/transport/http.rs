use crate::config::FlowConfig;
use crate::error::Error;
use crate::Result;
use keyring::Entry;
use reqwest::Proxy;
use serde_json::Value;
use std::env;
use std::time::Duration;

/// JSON-over-HTTP transport with a bounded per-request timeout.
///
/// No retries happen here; a failed call surfaces as a service error.
/// The API key travels in a request header so it never appears in URLs,
/// and therefore never in transport error messages or logs.
#[derive(Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    key_header: &'static str,
}

impl HttpTransport {
    /// `key_header` names the header that carries the API key.
    pub fn new(config: &FlowConfig, key_header: &'static str) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| Self::get_api_key(&config.provider, &config.api_key_env));
        if api_key.is_none() {
            tracing::warn!(
                provider = %config.provider,
                env = %config.api_key_env,
                "no API key found in config, keyring or environment"
            );
        }

        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.timeout().min(Duration::from_secs(10)))
            .pool_idle_timeout(Some(Duration::from_secs(90)));

        if let Ok(proxy_url) = env::var("JINGLE_PROXY_URL") {
            match Proxy::all(&proxy_url) {
                Ok(proxy) => builder = builder.proxy(proxy),
                Err(e) => tracing::warn!(error = %e, "ignoring invalid JINGLE_PROXY_URL"),
            }
        }

        let client = builder.build()?;

        Ok(Self {
            client,
            base_url: config.base_url().to_string(),
            api_key,
            key_header,
        })
    }

    fn get_api_key(provider_id: &str, env_var: &str) -> Option<String> {
        // 1. Try Keyring
        if let Ok(entry) = Entry::new("jinglemaker", provider_id) {
            if let Ok(key) = entry.get_password() {
                return Some(key);
            }
        }

        // 2. Try Environment Variable
        env::var(env_var).ok().filter(|k| !k.is_empty())
    }

    /// POST `body` to `base_url + path` and decode the JSON reply.
    ///
    /// Non-2xx replies become [`Error::Service`] with the status and the
    /// provider's `error.message` when one is present.
    pub async fn post_json(&self, path: &str, body: &Value) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.post(&url).json(body);

        if let Some(key) = &self.api_key {
            request = request.header(self.key_header, key.as_str());
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|v| {
                    v.pointer("/error/message")
                        .and_then(|m| m.as_str())
                        .map(String::from)
                })
                .unwrap_or_else(|| {
                    if text.is_empty() {
                        status.canonical_reason().unwrap_or("request failed").to_string()
                    } else {
                        text
                    }
                });
            return Err(Error::remote(status.as_u16(), message));
        }

        Ok(response.json::<Value>().await?)
    }
}
