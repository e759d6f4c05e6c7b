use crate::config::{DEFAULT_MAX_ATTEMPTS, GatewaySettings};
use crate::domain::ports::GatewayTransportBox;
use crate::domain::request::GatewayRequest;
use crate::domain::response::{BankEntry, GatewayResponse, OrderNode};
use crate::error::{PaymentError, Result};
use tracing::{debug, warn};

/// Performs gateway operations and turns the XML answers into order fragments.
///
/// The gateway now and then answers with an empty or broken document. Such
/// answers are retried up to `max_attempts` times; an explicit error item is
/// final and never retried.
pub struct GatewayClient {
    transport: GatewayTransportBox,
    max_attempts: usize,
}

impl GatewayClient {
    pub fn new(transport: GatewayTransportBox) -> Self {
        Self {
            transport,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// A client whose attempt budget comes from `settings`.
    pub fn from_settings(transport: GatewayTransportBox, settings: &GatewaySettings) -> Self {
        Self::new(transport).with_max_attempts(settings.max_attempts)
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Sends `request` and returns the verbatim response body with its order.
    pub async fn submit(&self, request: &GatewayRequest) -> Result<(String, OrderNode)> {
        self.exchange(request, |response| match response {
            GatewayResponse::Order(order) => Some(order),
            _ => None,
        })
        .await
    }

    /// Fetches the banks currently offered by the gateway.
    pub async fn bank_list(&self, request: &GatewayRequest) -> Result<Vec<BankEntry>> {
        let (_, banks) = self
            .exchange(request, |response| match response {
                GatewayResponse::Banks(banks) => Some(banks),
                _ => None,
            })
            .await?;
        Ok(banks)
    }

    async fn exchange<T, F>(&self, request: &GatewayRequest, pick: F) -> Result<(String, T)>
    where
        F: Fn(GatewayResponse) -> Option<T>,
    {
        let operation = request.operation();
        let params = request.to_query();

        for attempt in 1..=self.max_attempts {
            debug!(operation, attempt, "sending gateway request");
            let body = self.transport.send(&params).await?;

            match GatewayResponse::parse(&body) {
                Ok(GatewayResponse::Error { code, message }) => {
                    warn!(operation, %code, %message, "gateway reported an error");
                    return Err(PaymentError::GatewayProtocol { code, message });
                }
                Ok(response) => {
                    if let Some(found) = pick(response) {
                        return Ok((body, found));
                    }
                    warn!(operation, attempt, "gateway response held nothing usable");
                }
                Err(e) => {
                    warn!(operation, attempt, error = %e, "malformed gateway response");
                }
            }
        }

        Err(PaymentError::GatewayUnavailable {
            attempts: self.max_attempts,
        })
    }
}
