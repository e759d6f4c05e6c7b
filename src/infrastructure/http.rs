use crate::config::GatewaySettings;
use crate::domain::ports::GatewayTransport;
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::{debug, warn};

/// Talks to the gateway over HTTP: a `GET` on the endpoint with the request
/// parameters in the query string.
///
/// Non-success statuses are not errors here. Their body is handed back like
/// any other, and the client decides whether it holds anything usable.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: Url,
}

impl HttpTransport {
    pub fn new(settings: &GatewaySettings) -> Result<Self> {
        let endpoint = Url::parse(&settings.endpoint).map_err(|e| {
            PaymentError::ConfigError(format!(
                "Invalid gateway endpoint `{}`: {e}",
                settings.endpoint
            ))
        })?;
        let client = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl GatewayTransport for HttpTransport {
    async fn send(&self, params: &[(&'static str, String)]) -> Result<String> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "gateway answered with a non-success status");
        }
        let body = response.text().await?;
        debug!(%status, bytes = body.len(), "gateway response received");
        Ok(body)
    }
}
