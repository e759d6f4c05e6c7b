use thiserror::Error;

/// Gateway code reported when the retry budget runs out without an order.
pub const NO_ORDER_FOUND: &str = "no_order_found";

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("Gateway error: errorcode={code} - {message}")]
    GatewayProtocol { code: String, message: String },
    #[error("Gateway error: no order could be found in the gateway response after {attempts} attempts")]
    GatewayUnavailable { attempts: usize },
    #[error("Gateway order is missing `{0}`")]
    IncompleteOrder(&'static str),
    #[error("Payment {0} has not been initiated yet")]
    NotInitiated(u64),
    #[error("Payment {0} not found")]
    NotFound(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("RocksDB error: {0}")]
    RocksDbError(#[from] rocksdb::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("Internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

impl PaymentError {
    /// The provider-level code of a gateway failure, if this is one.
    pub fn gateway_code(&self) -> Option<&str> {
        match self {
            PaymentError::GatewayProtocol { code, .. } => Some(code),
            PaymentError::GatewayUnavailable { .. } => Some(NO_ORDER_FOUND),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, PaymentError>;
