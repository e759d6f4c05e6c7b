use crate::domain::bank::BankId;
use crate::domain::response::OrderNode;
use crate::error::{PaymentError, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of characters the gateway accepts for a description.
pub const MAX_DESCRIPTION_LEN: usize = 29;

/// A strictly positive payment amount with at most two fractional digits.
///
/// The two-digit limit keeps the conversion to minor units (cents) exact.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self> {
        if value <= Decimal::ZERO {
            return Err(PaymentError::ValidationError(
                "Amount must be positive".to_string(),
            ));
        }
        if value.normalize().scale() > 2 {
            return Err(PaymentError::ValidationError(format!(
                "Amount {value} has more than 2 fractional digits"
            )));
        }
        Ok(Self(value))
    }

    /// Builds an amount from an integer count of cents.
    pub fn from_minor_units(cents: i64) -> Result<Self> {
        Self::new(Decimal::new(cents, 2))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Amount in cents, as the gateway expects it.
    pub fn to_minor_units(&self) -> Result<i64> {
        (self.0 * dec!(100)).trunc().to_i64().ok_or_else(|| {
            PaymentError::ValidationError(format!("Amount {} does not fit in minor units", self.0))
        })
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = PaymentError;

    fn try_from(value: Decimal) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Payment description shown on the consumer's bank statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Description(String);

impl Description {
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if value.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(PaymentError::ValidationError(format!(
                "Description must be at most {MAX_DESCRIPTION_LEN} characters"
            )));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Description {
    type Error = PaymentError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Description> for String {
    fn from(description: Description) -> Self {
        description.0
    }
}

/// Outcome reported by the gateway for a checked transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PaymentStatus {
    Success,
    Cancelled,
    Failure,
    Expired,
    /// The transaction was already checked once; the real outcome is hidden.
    CheckedBefore,
    Unrecognized(String),
}

impl PaymentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            PaymentStatus::Success => "Success",
            PaymentStatus::Cancelled => "Cancelled",
            PaymentStatus::Failure => "Failure",
            PaymentStatus::Expired => "Expired",
            PaymentStatus::CheckedBefore => "CheckedBefore",
            PaymentStatus::Unrecognized(other) => other,
        }
    }

    pub fn is_success(&self) -> bool {
        *self == PaymentStatus::Success
    }
}

impl From<String> for PaymentStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Success" => PaymentStatus::Success,
            "Cancelled" => PaymentStatus::Cancelled,
            "Failure" => PaymentStatus::Failure,
            "Expired" => PaymentStatus::Expired,
            "CheckedBefore" => PaymentStatus::CheckedBefore,
            _ => PaymentStatus::Unrecognized(value),
        }
    }
}

impl From<PaymentStatus> for String {
    fn from(status: PaymentStatus) -> Self {
        match status {
            PaymentStatus::Unrecognized(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One iDEAL payment attempt.
///
/// The record only changes through the methods below, which keep the
/// transaction id write-once and the status terminal once set.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct PaymentRecord {
    pub id: u64,
    transaction_id: Option<String>,
    pub amount: Amount,
    pub bank_id: BankId,
    pub description: Description,
    pub timestamp: DateTime<Utc>,
    pub consumer_account: Option<String>,
    pub consumer_name: Option<String>,
    pub consumer_city: Option<String>,
    status: Option<PaymentStatus>,
    pub fetch_response: String,
    pub check_response: String,
}

impl PaymentRecord {
    pub fn new(id: u64, amount: Amount, bank_id: BankId, description: Description) -> Self {
        Self {
            id,
            transaction_id: None,
            amount,
            bank_id,
            description,
            timestamp: Utc::now(),
            consumer_account: None,
            consumer_name: None,
            consumer_city: None,
            status: None,
            fetch_response: String::new(),
            check_response: String::new(),
        }
    }

    pub fn transaction_id(&self) -> Option<&str> {
        self.transaction_id.as_deref()
    }

    pub fn status(&self) -> Option<&PaymentStatus> {
        self.status.as_ref()
    }

    pub fn bank_name(&self) -> &'static str {
        self.bank_id.name()
    }

    pub fn is_paid(&self) -> bool {
        self.status.as_ref().is_some_and(PaymentStatus::is_success)
    }

    /// The locally known outcome, if the gateway was already asked once.
    pub fn cached_outcome(&self) -> Option<bool> {
        self.status.as_ref().map(PaymentStatus::is_success)
    }

    /// Assigns the gateway transaction id. Only the first assignment is accepted.
    pub fn assign_transaction_id(&mut self, transaction_id: String) -> Result<()> {
        if let Some(existing) = &self.transaction_id {
            return Err(PaymentError::ValidationError(format!(
                "Payment {} already has transaction id {existing}",
                self.id
            )));
        }
        if transaction_id.is_empty() {
            return Err(PaymentError::IncompleteOrder("transaction_id"));
        }
        self.transaction_id = Some(transaction_id);
        Ok(())
    }

    /// Records the outcome of a status check.
    ///
    /// An order without status text leaves the status unset, so a later
    /// check may still ask the gateway. Consumer details are stored without
    /// surrounding whitespace.
    pub fn apply_check(&mut self, raw_response: String, order: &OrderNode) -> Result<()> {
        if let Some(status) = &self.status {
            return Err(PaymentError::ValidationError(format!(
                "Payment {} already has terminal status {status}",
                self.id
            )));
        }
        self.check_response = raw_response;
        if let Some(consumer) = &order.consumer {
            self.consumer_account = trimmed(&consumer.account);
            self.consumer_city = trimmed(&consumer.city);
            self.consumer_name = trimmed(&consumer.name);
        }
        self.status = order.status().map(|s| PaymentStatus::from(s.to_string()));
        Ok(())
    }
}

fn trimmed(value: &Option<String>) -> Option<String> {
    value.as_deref().map(|v| v.trim().to_string())
}

impl fmt::Display for PaymentRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Mollie/iDEAL Payment ID: {}", self.id)
    }
}
