use crate::domain::payment::PaymentRecord;
use crate::domain::ports::PaymentStore;
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, IteratorMode, Options};
use std::path::Path;
use std::sync::Arc;

/// Column Family for storing payment records.
pub const CF_PAYMENTS: &str = "payments";

/// A persistent store implementation using RocksDB.
///
/// Records are JSON-encoded and keyed by the big-endian bytes of their id,
/// so iteration yields them in id order.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// # Arguments
    ///
    /// * `path` - The filesystem path where the database will be stored.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_payments = ColumnFamilyDescriptor::new(CF_PAYMENTS, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf_payments])?;

        Ok(Self { db: Arc::new(db) })
    }

    fn decode(bytes: &[u8]) -> Result<PaymentRecord> {
        serde_json::from_slice(bytes).map_err(|e| {
            PaymentError::InternalError(Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("Deserialization error: {}", e),
            )))
        })
    }

    fn scan(&self) -> Result<Vec<PaymentRecord>> {
        let cf = self.payments_cf()?;
        let mut payments = Vec::new();
        for item in self.db.iterator_cf(&cf, IteratorMode::Start) {
            let (_key, value) = item?;
            payments.push(Self::decode(&value)?);
        }
        Ok(payments)
    }

    fn payments_cf(&self) -> Result<&rocksdb::ColumnFamily> {
        self.db.cf_handle(CF_PAYMENTS).ok_or_else(|| {
            PaymentError::InternalError(Box::new(std::io::Error::other(
                "Payments column family not found",
            )))
        })
    }
}

#[async_trait]
impl PaymentStore for RocksDBStore {
    async fn save(&self, record: PaymentRecord) -> Result<()> {
        let cf = self.payments_cf()?;
        let key = record.id.to_be_bytes();
        let value = serde_json::to_vec(&record).map_err(|e| {
            PaymentError::InternalError(Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("Serialization error: {}", e),
            )))
        })?;

        self.db.put_cf(cf, key, value)?;
        Ok(())
    }

    async fn load(&self, id: u64) -> Result<Option<PaymentRecord>> {
        let cf = self.payments_cf()?;
        match self.db.get_pinned_cf(cf, id.to_be_bytes())? {
            Some(bytes) => Ok(Some(Self::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn find_by_transaction_id(&self, transaction_id: &str) -> Result<Option<PaymentRecord>> {
        Ok(self
            .scan()?
            .into_iter()
            .find(|p| p.transaction_id() == Some(transaction_id)))
    }

    async fn get_all(&self) -> Result<Vec<PaymentRecord>> {
        self.scan()
    }
}
