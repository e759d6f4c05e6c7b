use super::payment::PaymentRecord;
use crate::error::Result;
use async_trait::async_trait;

/// Persistence for payment records.
#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn save(&self, record: PaymentRecord) -> Result<()>;
    async fn load(&self, id: u64) -> Result<Option<PaymentRecord>>;
    async fn find_by_transaction_id(&self, transaction_id: &str) -> Result<Option<PaymentRecord>>;
    async fn get_all(&self) -> Result<Vec<PaymentRecord>>;
}

/// Carries one request to the gateway and returns the raw response body.
#[async_trait]
pub trait GatewayTransport: Send + Sync {
    async fn send(&self, params: &[(&'static str, String)]) -> Result<String>;
}

pub type PaymentStoreBox = Box<dyn PaymentStore>;
pub type GatewayTransportBox = Box<dyn GatewayTransport>;
pub type PaymentStoreFactory = Box<dyn Fn() -> PaymentStoreBox + Send + Sync>;
