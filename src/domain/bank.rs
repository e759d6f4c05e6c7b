use crate::error::PaymentError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// iDEAL issuing banks known to the gateway, keyed by their four-digit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BankId {
    AbnAmro,
    AsnBank,
    FrieslandBank,
    Ing,
    Knab,
    Rabobank,
    SnsBank,
    SnsRegioBank,
    TriodosBank,
    VanLanschot,
    /// Only offered by the gateway in test mode.
    TestBank,
}

impl BankId {
    pub const ALL: [BankId; 11] = [
        BankId::AbnAmro,
        BankId::AsnBank,
        BankId::FrieslandBank,
        BankId::Ing,
        BankId::Knab,
        BankId::Rabobank,
        BankId::SnsBank,
        BankId::SnsRegioBank,
        BankId::TriodosBank,
        BankId::VanLanschot,
        BankId::TestBank,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            BankId::AbnAmro => "0031",
            BankId::AsnBank => "0761",
            BankId::FrieslandBank => "0091",
            BankId::Ing => "0721",
            BankId::Knab => "0801",
            BankId::Rabobank => "0021",
            BankId::SnsBank => "0751",
            BankId::SnsRegioBank => "0771",
            BankId::TriodosBank => "0511",
            BankId::VanLanschot => "0161",
            BankId::TestBank => "9999",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BankId::AbnAmro => "ABN AMRO",
            BankId::AsnBank => "ASN Bank",
            BankId::FrieslandBank => "Friesland Bank",
            BankId::Ing => "ING",
            BankId::Knab => "Knab",
            BankId::Rabobank => "Rabobank",
            BankId::SnsBank => "SNS Bank",
            BankId::SnsRegioBank => "SNS Regio Bank",
            BankId::TriodosBank => "Triodos Bank",
            BankId::VanLanschot => "Van Lanschot",
            BankId::TestBank => "TBM Bank",
        }
    }
}

impl FromStr for BankId {
    type Err = PaymentError;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        BankId::ALL
            .into_iter()
            .find(|bank| bank.code() == code.trim())
            .ok_or_else(|| PaymentError::ValidationError(format!("Unknown bank id `{code}`")))
    }
}

impl TryFrom<String> for BankId {
    type Error = PaymentError;

    fn try_from(code: String) -> Result<Self, Self::Error> {
        code.parse()
    }
}

impl From<BankId> for String {
    fn from(bank: BankId) -> Self {
        bank.code().to_string()
    }
}

impl fmt::Display for BankId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
