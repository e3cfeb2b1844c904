//! Outbound payment processor interface.

use async_trait::async_trait;
use thiserror::Error;

pub mod chapa;

pub use chapa::ChapaClient;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// Timeout or transport failure; the caller may retry.
    #[error("{0}")]
    Unavailable(String),

    /// The processor answered but refused the request.
    #[error("{0}")]
    Rejected(String),
}

#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    /// Minor units.
    pub amount: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub tx_ref: String,
    pub return_url: String,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct Checkout {
    pub checkout_url: String,
    /// Reference the processor assigned to the transaction, when it returns one.
    pub transaction_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    Success,
    Failed,
}

#[derive(Debug, Clone)]
pub struct Verification {
    pub state: TransactionState,
    pub transaction_id: Option<String>,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync + 'static {
    async fn initialize(&self, request: &CheckoutRequest) -> Result<Checkout, GatewayError>;

    async fn verify(&self, tx_ref: &str) -> Result<Verification, GatewayError>;
}

/// Renders minor units as a decimal string, `12345` -> `"123.45"`.
pub fn format_amount(minor: i64) -> String {
    let sign = if minor < 0 { "-" } else { "" };
    let abs = minor.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_minor_units() {
        assert_eq!(format_amount(12345), "123.45");
        assert_eq!(format_amount(500), "5.00");
        assert_eq!(format_amount(7), "0.07");
        assert_eq!(format_amount(-250), "-2.50");
    }
}
