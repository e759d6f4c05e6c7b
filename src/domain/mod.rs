//! Domain model: payment records, bank codes, gateway requests and responses,
//! and the ports the application layer depends on.

pub mod bank;
pub mod payment;
pub mod ports;
pub mod request;
pub mod response;
