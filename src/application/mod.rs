//! Application layer: the gateway client and the payment orchestration.
//!
//! `GatewayClient` performs a single logical gateway operation (with its
//! retry budget); `PaymentEngine` applies the results to payment records and
//! persists them through the `PaymentStore` port.

pub mod engine;
pub mod gateway;
