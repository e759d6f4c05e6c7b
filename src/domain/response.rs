//! Gateway XML responses.
//!
//! The gateway answers every call with a `<response>` document holding either
//! an `order`, an error `item`, or (for the bank list) a run of `bank`
//! elements. Only direct children of the root are considered, and when an
//! element repeats only the first one counts.

use serde::Deserialize;

/// The `order` fragment of a gateway response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OrderNode {
    pub transaction_id: Option<String>,
    pub amount: Option<String>,
    pub currency: Option<String>,
    #[serde(rename = "URL")]
    pub url: Option<String>,
    pub message: Option<String>,
    pub status: Option<String>,
    pub payed: Option<String>,
    pub consumer: Option<ConsumerNode>,
}

impl OrderNode {
    pub fn transaction_id(&self) -> Option<&str> {
        non_empty(&self.transaction_id)
    }

    pub fn url(&self) -> Option<&str> {
        non_empty(&self.url)
    }

    pub fn status(&self) -> Option<&str> {
        non_empty(&self.status)
    }

    /// The gateway's `payed` flag. Informational only: it reads `false` on
    /// every check after the first successful one.
    pub fn payed(&self) -> Option<bool> {
        non_empty(&self.payed).map(|p| p.eq_ignore_ascii_case("true"))
    }

    /// An `order` element without any content counts as no order at all.
    pub fn is_empty(&self) -> bool {
        self.transaction_id.is_none()
            && self.amount.is_none()
            && self.currency.is_none()
            && self.url.is_none()
            && self.message.is_none()
            && self.status.is_none()
            && self.payed.is_none()
            && self.consumer.is_none()
    }
}

/// Account holder details reported after a successful payment.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ConsumerNode {
    #[serde(rename = "consumerAccount")]
    pub account: Option<String>,
    #[serde(rename = "consumerName")]
    pub name: Option<String>,
    #[serde(rename = "consumerCity")]
    pub city: Option<String>,
}

/// One entry of the gateway's bank list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BankEntry {
    pub bank_id: String,
    pub bank_name: String,
}

#[derive(Debug, Deserialize)]
struct ItemNode {
    #[serde(rename = "@type")]
    kind: Option<String>,
    errorcode: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseDocument {
    #[serde(default)]
    order: Vec<OrderNode>,
    #[serde(default)]
    item: Vec<ItemNode>,
    #[serde(default)]
    bank: Vec<BankEntry>,
}

/// What a single gateway answer amounts to.
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayResponse {
    Error { code: String, message: String },
    Order(OrderNode),
    Banks(Vec<BankEntry>),
    /// Well-formed, but neither an order, an error nor a bank list.
    Empty,
}

impl GatewayResponse {
    /// Parses a raw response body. Malformed XML is reported as an error so
    /// the caller can decide to retry.
    pub fn parse(xml: &str) -> Result<Self, quick_xml::DeError> {
        let document: ResponseDocument = quick_xml::de::from_str(xml)?;

        if let Some(item) = document.item.into_iter().next()
            && item.kind.as_deref() == Some("error")
        {
            return Ok(GatewayResponse::Error {
                code: item.errorcode.unwrap_or_default(),
                message: item.message.unwrap_or_default(),
            });
        }
        if let Some(order) = document.order.into_iter().next()
            && !order.is_empty()
        {
            return Ok(GatewayResponse::Order(order));
        }
        if !document.bank.is_empty() {
            return Ok(GatewayResponse::Banks(document.bank));
        }
        Ok(GatewayResponse::Empty)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
