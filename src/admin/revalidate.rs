//! Asks the rendering frontend to rebuild locale root paths.

use anyhow::Context;
use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

use crate::i18n::Locale;

#[derive(Debug, Clone)]
struct Endpoint {
    client: Client,
    url: Url,
    secret: Option<String>,
}

/// Fire-and-forget path revalidation.
///
/// Disabled when no webhook is configured; every call is then a no-op.
#[derive(Debug, Clone, Default)]
pub struct Revalidator {
    endpoint: Option<Endpoint>,
}

impl Revalidator {
    pub fn new(url: Url, secret: Option<String>) -> Self {
        Self {
            endpoint: Some(Endpoint {
                client: Client::new(),
                url,
                secret,
            }),
        }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.endpoint.is_some()
    }

    /// Revalidate every locale's root path in the background.
    pub fn revalidate_locales(&self) {
        for locale in Locale::ALL {
            self.spawn(locale.root_path());
        }
    }

    /// Revalidate `path` on a spawned task; failures are only logged.
    pub fn spawn(&self, path: String) {
        if self.endpoint.is_none() {
            return;
        }

        let revalidator = self.clone();
        tokio::spawn(async move {
            if let Err(e) = revalidator.send(&path).await {
                warn!("Failed to revalidate {}: {:#}", path, e);
            }
        });
    }

    /// Send one revalidation request.
    pub async fn send(&self, path: &str) -> anyhow::Result<()> {
        let Some(endpoint) = &self.endpoint else {
            return Ok(());
        };

        let mut request = endpoint.client.post(endpoint.url.clone()).query(&[("path", path)]);
        if let Some(secret) = &endpoint.secret {
            request = request.bearer_auth(secret);
        }

        request
            .send()
            .await
            .context("revalidation request failed")?
            .error_for_status()
            .context("revalidation rejected")?;

        debug!("Revalidated {}", path);
        Ok(())
    }
}
