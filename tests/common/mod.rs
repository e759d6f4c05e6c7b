#![allow(dead_code)]

use async_trait::async_trait;
use mollie_ideal::application::engine::PaymentEngine;
use mollie_ideal::application::gateway::GatewayClient;
use mollie_ideal::config::GatewaySettings;
use mollie_ideal::domain::bank::BankId;
use mollie_ideal::domain::payment::{Amount, Description, PaymentRecord};
use mollie_ideal::domain::ports::GatewayTransport;
use mollie_ideal::error::Result;
use mollie_ideal::infrastructure::in_memory::InMemoryPaymentStore;
use rust_decimal::Decimal;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

pub type Params = Vec<(&'static str, String)>;

/// Replays canned response bodies in order and records every request.
///
/// Once the script runs out every further request gets an empty body.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    responses: Arc<Mutex<VecDeque<String>>>,
    requests: Arc<Mutex<Vec<Params>>>,
}

impl ScriptedTransport {
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: Arc::new(Mutex::new(responses.into_iter().map(Into::into).collect())),
            requests: Arc::default(),
        }
    }

    pub fn push(&self, body: impl Into<String>) {
        self.responses.lock().unwrap().push_back(body.into());
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<Params> {
        self.requests.lock().unwrap().clone()
    }

    /// Value of `key` in the `n`-th request.
    pub fn param(&self, n: usize, key: &str) -> Option<String> {
        self.requests.lock().unwrap()[n]
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.clone())
    }
}

#[async_trait]
impl GatewayTransport for ScriptedTransport {
    async fn send(&self, params: &[(&'static str, String)]) -> Result<String> {
        self.requests.lock().unwrap().push(params.to_vec());
        Ok(self.responses.lock().unwrap().pop_front().unwrap_or_default())
    }
}

pub fn settings() -> GatewaySettings {
    let mut settings = GatewaySettings::new("123456");
    settings.report_url = Some("https://shop.example/ideal/report".to_string());
    settings.return_url = Some("https://shop.example/ideal/return".to_string());
    settings
}

/// An engine over a fresh in-memory store; the store handle is returned so
/// tests can inspect what was persisted.
pub fn engine(transport: &ScriptedTransport) -> (PaymentEngine, InMemoryPaymentStore) {
    let store = InMemoryPaymentStore::new();
    let engine = PaymentEngine::new(
        Box::new(store.clone()),
        GatewayClient::new(Box::new(transport.clone())),
        settings(),
    );
    (engine, store)
}

pub fn payment(id: u64, amount: Decimal) -> PaymentRecord {
    PaymentRecord::new(
        id,
        Amount::new(amount).unwrap(),
        BankId::AbnAmro,
        Description::new(format!("Order {id}")).unwrap(),
    )
}

pub fn fetch_order(transaction_id: &str) -> String {
    format!(
        r#"<?xml version="1.0"?>
<response>
  <order>
    <transaction_id>{transaction_id}</transaction_id>
    <amount>1234</amount>
    <currency>EUR</currency>
    <URL>https://www.mollie.nl/partners/ideal-test-bank?order_nr=M0000001&amp;transaction_id={transaction_id}</URL>
    <message>Your iDEAL-payment has successfully been setup.</message>
  </order>
</response>"#
    )
}

pub fn check_order(transaction_id: &str, status: &str, payed: bool) -> String {
    format!(
        r#"<?xml version="1.0"?>
<response>
  <order>
    <transaction_id>{transaction_id}</transaction_id>
    <amount>1234</amount>
    <currency>EUR</currency>
    <payed>{payed}</payed>
    <message>Status check</message>
    <status>{status}</status>
  </order>
</response>"#
    )
}

pub fn check_order_with_consumer(transaction_id: &str, status: &str) -> String {
    format!(
        r#"<?xml version="1.0"?>
<response>
  <order>
    <transaction_id>{transaction_id}</transaction_id>
    <amount>1234</amount>
    <currency>EUR</currency>
    <payed>true</payed>
    <consumer>
      <consumerName>Hr J Janssen</consumerName>
      <consumerAccount>P001234567</consumerAccount>
      <consumerCity>Amsterdam</consumerCity>
    </consumer>
    <message>This iDEAL-order has successfuly been payed for.</message>
    <status>{status}</status>
  </order>
</response>"#
    )
}

pub fn error_item(code: &str, message: &str) -> String {
    format!(
        r#"<?xml version="1.0"?>
<response>
  <item type="error">
    <errorcode>{code}</errorcode>
    <message>{message}</message>
  </item>
</response>"#
    )
}

pub fn redirect_url(transaction_id: &str) -> String {
    format!(
        "https://www.mollie.nl/partners/ideal-test-bank?order_nr=M0000001&transaction_id={transaction_id}"
    )
}
