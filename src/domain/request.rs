use crate::config::GatewaySettings;
use crate::domain::payment::PaymentRecord;
use crate::error::{PaymentError, Result};

/// A single gateway operation and its query parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayRequest {
    Fetch {
        partner_id: String,
        amount_minor: i64,
        bank_id: String,
        description: String,
        report_url: String,
        return_url: String,
        profile_key: Option<String>,
    },
    Check {
        partner_id: String,
        transaction_id: String,
    },
    BankList {
        partner_id: String,
    },
}

impl GatewayRequest {
    /// Builds the request that starts a payment for `record`.
    pub fn fetch(settings: &GatewaySettings, record: &PaymentRecord) -> Result<Self> {
        let (report_url, return_url) = settings.callback_urls()?;
        Ok(GatewayRequest::Fetch {
            partner_id: settings.partner_id.clone(),
            amount_minor: record.amount.to_minor_units()?,
            bank_id: record.bank_id.code().to_string(),
            description: record.description.as_str().to_string(),
            report_url,
            return_url,
            profile_key: settings.profile_key.clone(),
        })
    }

    /// Builds the status query for an initiated `record`.
    pub fn check(settings: &GatewaySettings, record: &PaymentRecord) -> Result<Self> {
        let transaction_id = record
            .transaction_id()
            .ok_or(PaymentError::NotInitiated(record.id))?;
        Ok(GatewayRequest::Check {
            partner_id: settings.partner_id.clone(),
            transaction_id: transaction_id.to_string(),
        })
    }

    pub fn bank_list(settings: &GatewaySettings) -> Self {
        GatewayRequest::BankList {
            partner_id: settings.partner_id.clone(),
        }
    }

    /// Value of the `a` parameter.
    pub fn operation(&self) -> &'static str {
        match self {
            GatewayRequest::Fetch { .. } => "fetch",
            GatewayRequest::Check { .. } => "check",
            GatewayRequest::BankList { .. } => "banklist",
        }
    }

    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("a", self.operation().to_string())];
        match self {
            GatewayRequest::Fetch {
                partner_id,
                amount_minor,
                bank_id,
                description,
                report_url,
                return_url,
                profile_key,
            } => {
                params.push(("partnerid", partner_id.clone()));
                params.push(("amount", amount_minor.to_string()));
                params.push(("bank_id", bank_id.clone()));
                params.push(("description", description.clone()));
                params.push(("reporturl", report_url.clone()));
                params.push(("returnurl", return_url.clone()));
                if let Some(key) = profile_key {
                    params.push(("profile_key", key.clone()));
                }
            }
            GatewayRequest::Check {
                partner_id,
                transaction_id,
            } => {
                params.push(("partnerid", partner_id.clone()));
                params.push(("transaction_id", transaction_id.clone()));
            }
            GatewayRequest::BankList { partner_id } => {
                params.push(("partnerid", partner_id.clone()));
            }
        }
        params
    }
}
