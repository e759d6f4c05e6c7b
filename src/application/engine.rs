use crate::application::gateway::GatewayClient;
use crate::config::GatewaySettings;
use crate::domain::payment::PaymentRecord;
use crate::domain::ports::PaymentStoreBox;
use crate::domain::request::GatewayRequest;
use crate::domain::response::BankEntry;
use crate::error::{PaymentError, Result};
use tracing::{debug, info};

/// Drives payment records through initiation and status checks.
///
/// `PaymentEngine` owns the store and the gateway client. Operations on one
/// record must be serialized by the caller: the terminal-status guard only
/// works if a previous check's write is visible to the next one.
pub struct PaymentEngine {
    store: PaymentStoreBox,
    gateway: GatewayClient,
    settings: GatewaySettings,
}

impl PaymentEngine {
    /// Creates a new `PaymentEngine` instance.
    ///
    /// # Arguments
    ///
    /// * `store` - Where payment records are persisted.
    /// * `gateway` - The client used for every gateway round trip.
    /// * `settings` - Partner id, callback URLs and profile key.
    pub fn new(store: PaymentStoreBox, gateway: GatewayClient, settings: GatewaySettings) -> Self {
        Self {
            store,
            gateway,
            settings,
        }
    }

    /// Persists a new record. Ids are chosen by the caller and must be unused.
    pub async fn create(&self, record: PaymentRecord) -> Result<()> {
        if self.store.load(record.id).await?.is_some() {
            return Err(PaymentError::ValidationError(format!(
                "Payment {} already exists",
                record.id
            )));
        }
        self.store.save(record).await
    }

    pub async fn load(&self, id: u64) -> Result<PaymentRecord> {
        self.store
            .load(id)
            .await?
            .ok_or_else(|| PaymentError::NotFound(id.to_string()))
    }

    /// Starts the payment at the gateway and returns the URL the consumer
    /// must be redirected to.
    ///
    /// The raw response and the transaction id are saved in two separate
    /// writes; a failure in between leaves the response stored without id.
    pub async fn initiate(&self, record: &mut PaymentRecord) -> Result<String> {
        if let Some(existing) = record.transaction_id() {
            return Err(PaymentError::ValidationError(format!(
                "Payment {} was already initiated as {existing}",
                record.id
            )));
        }

        let request = GatewayRequest::fetch(&self.settings, record)?;
        let (raw, order) = self.gateway.submit(&request).await?;

        record.fetch_response = raw;
        self.store.save(record.clone()).await?;

        let transaction_id = order
            .transaction_id()
            .ok_or(PaymentError::IncompleteOrder("transaction_id"))?;
        record.assign_transaction_id(transaction_id.to_string())?;
        self.store.save(record.clone()).await?;

        info!(
            payment = record.id,
            transaction_id, "payment initiated at gateway"
        );

        order
            .url()
            .map(str::to_string)
            .ok_or(PaymentError::IncompleteOrder("URL"))
    }

    /// Returns whether the payment succeeded.
    ///
    /// Once a status is known locally the gateway is never asked again:
    /// a second check there only yields `CheckedBefore`.
    pub async fn check_status(&self, record: &mut PaymentRecord) -> Result<bool> {
        if let Some(paid) = record.cached_outcome() {
            debug!(payment = record.id, paid, "status already known, skipping gateway");
            return Ok(paid);
        }

        let request = GatewayRequest::check(&self.settings, record)?;
        let (raw, order) = self.gateway.submit(&request).await?;

        record.apply_check(raw, &order)?;
        self.store.save(record.clone()).await?;

        info!(
            payment = record.id,
            status = record.status().map(|s| s.as_str()).unwrap_or(""),
            payed = ?order.payed(),
            "payment status checked"
        );

        Ok(record.is_paid())
    }

    pub async fn initiate_by_id(&self, id: u64) -> Result<String> {
        let mut record = self.load(id).await?;
        self.initiate(&mut record).await
    }

    pub async fn check_status_by_id(&self, id: u64) -> Result<bool> {
        let mut record = self.load(id).await?;
        self.check_status(&mut record).await
    }

    /// Status check keyed by the gateway's transaction id, as delivered to
    /// the report callback.
    pub async fn check_status_by_transaction(&self, transaction_id: &str) -> Result<bool> {
        let mut record = self.find_by_transaction(transaction_id).await?;
        self.check_status(&mut record).await
    }

    pub async fn find_by_transaction(&self, transaction_id: &str) -> Result<PaymentRecord> {
        self.store
            .find_by_transaction_id(transaction_id)
            .await?
            .ok_or_else(|| PaymentError::NotFound(transaction_id.to_string()))
    }

    pub async fn bank_list(&self) -> Result<Vec<BankEntry>> {
        let request = GatewayRequest::bank_list(&self.settings);
        self.gateway.bank_list(&request).await
    }

    pub async fn all_payments(&self) -> Result<Vec<PaymentRecord>> {
        self.store.get_all().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::bank::BankId;
    use crate::domain::payment::{Amount, Description, PaymentStatus};
    use crate::domain::ports::GatewayTransport;
    use crate::infrastructure::in_memory::InMemoryPaymentStore;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Answers every request with the same body.
    struct FixedTransport {
        body: &'static str,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl GatewayTransport for FixedTransport {
        async fn send(&self, _params: &[(&'static str, String)]) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.body.to_string())
        }
    }

    fn engine(body: &'static str) -> (PaymentEngine, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let transport = FixedTransport {
            body,
            calls: calls.clone(),
        };
        let mut settings = GatewaySettings::new("123456");
        settings.report_url = Some("https://shop.example/report".to_string());
        settings.return_url = Some("https://shop.example/return".to_string());
        let engine = PaymentEngine::new(
            Box::new(InMemoryPaymentStore::new()),
            GatewayClient::new(Box::new(transport)),
            settings,
        );
        (engine, calls)
    }

    fn record(id: u64) -> PaymentRecord {
        PaymentRecord::new(
            id,
            Amount::new(dec!(10.00)).unwrap(),
            BankId::Ing,
            Description::new("Test order").unwrap(),
        )
    }

    const ORDER: &str = "<response><order><transaction_id>tx-1</transaction_id><URL>https://pay.example/tx-1</URL><status>Cancelled</status></order></response>";

    #[tokio::test]
    async fn test_create_rejects_duplicate_ids() {
        let (engine, _) = engine(ORDER);
        engine.create(record(1)).await.unwrap();
        let result = engine.create(record(1)).await;
        assert!(matches!(result, Err(PaymentError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_initiate_twice_is_rejected_without_gateway_call() {
        let (engine, calls) = engine(ORDER);
        let mut payment = record(1);

        let url = engine.initiate(&mut payment).await.unwrap();
        assert_eq!(url, "https://pay.example/tx-1");
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let again = engine.initiate(&mut payment).await;
        assert!(matches!(again, Err(PaymentError::ValidationError(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(payment.transaction_id(), Some("tx-1"));
    }

    #[tokio::test]
    async fn test_check_before_initiate_fails_without_gateway_call() {
        let (engine, calls) = engine(ORDER);
        let mut payment = record(3);
        let result = engine.check_status(&mut payment).await;
        assert!(matches!(result, Err(PaymentError::NotInitiated(3))));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_by_id_lookups() {
        let (engine, _) = engine(ORDER);
        assert!(matches!(
            engine.initiate_by_id(9).await,
            Err(PaymentError::NotFound(_))
        ));

        engine.create(record(9)).await.unwrap();
        engine.initiate_by_id(9).await.unwrap();
        assert!(!engine.check_status_by_transaction("tx-1").await.unwrap());

        let stored = engine.load(9).await.unwrap();
        assert_eq!(stored.status(), Some(&PaymentStatus::Cancelled));
        assert!(matches!(
            engine.check_status_by_transaction("unknown").await,
            Err(PaymentError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_order_without_url_is_incomplete() {
        let (engine, _) = engine(
            "<response><order><transaction_id>tx-2</transaction_id></order></response>",
        );
        let mut payment = record(2);
        let result = engine.initiate(&mut payment).await;
        assert!(matches!(result, Err(PaymentError::IncompleteOrder("URL"))));
        // The id was still stored before the URL was read.
        assert_eq!(
            engine.load(2).await.unwrap().transaction_id(),
            Some("tx-2")
        );
    }
}
