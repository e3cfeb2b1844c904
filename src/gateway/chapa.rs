use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use super::{
    Checkout, CheckoutRequest, GatewayError, PaymentGateway, TransactionState, Verification,
    format_amount,
};
use crate::config::PaymentConfig;

/// Chapa REST client. Every call is a single attempt bounded by the configured timeout.
#[derive(Clone)]
pub struct ChapaClient {
    http: Client,
    base_url: String,
    secret_key: String,
    currency: String,
    callback_url: String,
}

#[derive(Serialize)]
struct InitializeBody<'a> {
    amount: String,
    currency: &'a str,
    email: &'a str,
    first_name: &'a str,
    last_name: &'a str,
    tx_ref: &'a str,
    callback_url: &'a str,
    return_url: &'a str,
    customization: Customization<'a>,
}

#[derive(Serialize)]
struct Customization<'a> {
    title: &'a str,
    description: &'a str,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    message: Option<serde_json::Value>,
    #[serde(default)]
    status: Option<String>,
    data: Option<T>,
}

impl<T> Envelope<T> {
    fn is_success(&self) -> bool {
        self.status.as_deref() == Some("success")
    }

    fn message_or(&self, fallback: &str) -> String {
        match &self.message {
            Some(serde_json::Value::String(msg)) => msg.clone(),
            Some(other) => other.to_string(),
            None => fallback.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct InitializeData {
    checkout_url: String,
    #[serde(default)]
    tx_ref: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VerifyData {
    status: String,
    #[serde(default)]
    reference: Option<String>,
}

impl ChapaClient {
    pub fn new(config: &PaymentConfig) -> Result<Self, GatewayError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::Unavailable(e.to_string()))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            secret_key: config.secret_key.clone(),
            currency: config.currency.clone(),
            callback_url: config.callback_url.clone(),
        })
    }

    fn transport(err: reqwest::Error) -> GatewayError {
        if err.is_timeout() {
            GatewayError::Unavailable("payment gateway timed out".into())
        } else {
            GatewayError::Unavailable(err.to_string())
        }
    }

    async fn decode<T: for<'de> Deserialize<'de>>(
        response: reqwest::Response,
    ) -> Result<(StatusCode, Envelope<T>), GatewayError> {
        let status = response.status();
        if status.is_server_error() {
            return Err(GatewayError::Unavailable(format!(
                "payment gateway returned {status}"
            )));
        }
        // A body that fails mid-read is a transport failure, not an answer.
        let bytes = response.bytes().await.map_err(Self::transport)?;
        let body = serde_json::from_slice::<Envelope<T>>(&bytes)
            .map_err(|e| GatewayError::Rejected(format!("unreadable gateway response: {e}")))?;
        Ok((status, body))
    }
}

#[async_trait]
impl PaymentGateway for ChapaClient {
    async fn initialize(&self, request: &CheckoutRequest) -> Result<Checkout, GatewayError> {
        let body = InitializeBody {
            amount: format_amount(request.amount),
            currency: &self.currency,
            email: &request.email,
            first_name: &request.first_name,
            last_name: &request.last_name,
            tx_ref: &request.tx_ref,
            callback_url: &self.callback_url,
            return_url: &request.return_url,
            customization: Customization {
                title: &request.title,
                description: &request.description,
            },
        };

        let response = self
            .http
            .post(format!("{}/v1/transaction/initialize", self.base_url))
            .bearer_auth(&self.secret_key)
            .json(&body)
            .send()
            .await
            .map_err(Self::transport)?;

        let (status, envelope) = Self::decode::<InitializeData>(response).await?;
        if status != StatusCode::OK || !envelope.is_success() {
            return Err(GatewayError::Rejected(
                envelope.message_or("Payment initiation failed"),
            ));
        }
        let data = envelope
            .data
            .ok_or_else(|| GatewayError::Rejected("gateway response has no data".into()))?;

        Ok(Checkout {
            checkout_url: data.checkout_url,
            transaction_id: data.tx_ref,
        })
    }

    async fn verify(&self, tx_ref: &str) -> Result<Verification, GatewayError> {
        let response = self
            .http
            .get(format!("{}/v1/transaction/verify/{}", self.base_url, tx_ref))
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(Self::transport)?;

        let (status, envelope) = Self::decode::<VerifyData>(response).await?;
        if status != StatusCode::OK || !envelope.is_success() {
            return Err(GatewayError::Rejected(envelope.message_or("Verification failed")));
        }
        let data = envelope
            .data
            .ok_or_else(|| GatewayError::Rejected("gateway response has no data".into()))?;

        let state = if data.status == "success" {
            TransactionState::Success
        } else {
            TransactionState::Failed
        };
        Ok(Verification {
            state,
            transaction_id: data.reference,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;
    use std::time::Duration;

    use super::*;

    #[test]
    fn reads_initialize_envelope() {
        let raw = r#"{
            "message": "Hosted Link",
            "status": "success",
            "data": { "checkout_url": "https://checkout.chapa.co/checkout/payment/abc" }
        }"#;
        let env: Envelope<InitializeData> = serde_json::from_str(raw).unwrap();
        assert!(env.is_success());
        let data = env.data.unwrap();
        assert!(data.checkout_url.ends_with("/abc"));
        assert!(data.tx_ref.is_none());
    }

    #[test]
    fn failed_envelope_surfaces_gateway_message() {
        let raw = r#"{ "message": { "currency": ["unsupported"] }, "status": "failed", "data": null }"#;
        let env: Envelope<InitializeData> = serde_json::from_str(raw).unwrap();
        assert!(!env.is_success());
        assert!(env.message_or("fallback").contains("unsupported"));
    }

    #[test]
    fn reads_verify_envelope() {
        let raw = r#"{
            "message": "Payment details",
            "status": "success",
            "data": { "status": "success", "reference": "APabc123", "tx_ref": "BK-1" }
        }"#;
        let env: Envelope<VerifyData> = serde_json::from_str(raw).unwrap();
        let data = env.data.unwrap();
        assert_eq!(data.status, "success");
        assert_eq!(data.reference.as_deref(), Some("APabc123"));
    }

    fn config(base_url: &str, timeout: Duration) -> PaymentConfig {
        PaymentConfig {
            base_url: base_url.into(),
            secret_key: "sk".into(),
            currency: "ETB".into(),
            callback_url: "http://localhost/cb".into(),
            return_url: "http://localhost/ok".into(),
            timeout,
        }
    }

    /// Answers one connection with `raw`, then holds the socket open for `hold`.
    fn serve_once(raw: &'static str, hold: Duration) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 4096];
                let _ = stream.read(&mut buf);
                let _ = stream.write_all(raw.as_bytes());
                let _ = stream.flush();
                thread::sleep(hold);
            }
        });
        format!("http://{addr}")
    }

    #[test]
    fn builds_with_trimmed_base_url() {
        let client =
            ChapaClient::new(&config("https://api.chapa.co/", Duration::from_secs(2))).unwrap();
        assert_eq!(client.base_url, "https://api.chapa.co");
    }

    #[tokio::test]
    async fn stalled_body_is_unavailable() {
        let url = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 200\r\n\r\n{\"status\":",
            Duration::from_secs(3),
        );
        let client = ChapaClient::new(&config(&url, Duration::from_millis(300))).unwrap();
        let err = client.verify("BK-1").await.unwrap_err();
        assert!(matches!(err, GatewayError::Unavailable(_)), "{err:?}");
    }

    #[tokio::test]
    async fn malformed_body_is_rejected() {
        let url = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Length: 8\r\nConnection: close\r\n\r\nnot json",
            Duration::from_millis(0),
        );
        let client = ChapaClient::new(&config(&url, Duration::from_secs(2))).unwrap();
        let err = client.verify("BK-1").await.unwrap_err();
        assert!(matches!(err, GatewayError::Rejected(_)), "{err:?}");
    }
}
