use crate::domain::payment::PaymentRecord;
use crate::domain::ports::PaymentStore;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory store for payment records.
///
/// Uses `Arc<RwLock<BTreeMap<u64, PaymentRecord>>>` so clones share the same
/// records and listings come back ordered by id.
#[derive(Default, Clone)]
pub struct InMemoryPaymentStore {
    payments: Arc<RwLock<BTreeMap<u64, PaymentRecord>>>,
}

impl InMemoryPaymentStore {
    /// Creates a new, empty in-memory payment store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentStore for InMemoryPaymentStore {
    async fn save(&self, record: PaymentRecord) -> Result<()> {
        let mut payments = self.payments.write().await;
        payments.insert(record.id, record);
        Ok(())
    }

    async fn load(&self, id: u64) -> Result<Option<PaymentRecord>> {
        let payments = self.payments.read().await;
        Ok(payments.get(&id).cloned())
    }

    async fn find_by_transaction_id(&self, transaction_id: &str) -> Result<Option<PaymentRecord>> {
        let payments = self.payments.read().await;
        Ok(payments
            .values()
            .find(|p| p.transaction_id() == Some(transaction_id))
            .cloned())
    }

    async fn get_all(&self) -> Result<Vec<PaymentRecord>> {
        let payments = self.payments.read().await;
        Ok(payments.values().cloned().collect())
    }
}
