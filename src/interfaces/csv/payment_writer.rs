use crate::domain::payment::PaymentRecord;
use crate::error::Result;
use std::io::Write;

const HEADER: [&str; 8] = [
    "id",
    "transaction_id",
    "amount",
    "bank_id",
    "description",
    "status",
    "consumer_name",
    "timestamp",
];

/// Writes payment records as CSV, one row per record.
pub struct PaymentWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> PaymentWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    /// Writes the header followed by `payments`; the header is written even
    /// when there is nothing to list.
    pub fn write_payments(&mut self, payments: impl IntoIterator<Item = PaymentRecord>) -> Result<()> {
        self.writer.write_record(HEADER)?;
        for payment in payments {
            self.writer.write_record([
                payment.id.to_string(),
                payment.transaction_id().unwrap_or_default().to_string(),
                payment.amount.to_string(),
                payment.bank_id.code().to_string(),
                payment.description.as_str().to_string(),
                payment.status().map(|s| s.to_string()).unwrap_or_default(),
                payment.consumer_name.clone().unwrap_or_default(),
                payment.timestamp.to_rfc3339(),
            ])?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
