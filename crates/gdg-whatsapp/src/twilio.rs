//! Twilio API client for WhatsApp

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, WhatsAppError};

/// WhatsApp addresses arrive as `whatsapp:+123456789`
const CHANNEL_PREFIX: &str = "whatsapp:";

/// Twilio API client
#[derive(Debug, Clone)]
pub struct TwilioClient {
    client: Client,
    account_sid: String,
    auth_token: String,
    phone_number: String,
    base_url: String,
}

/// Incoming WhatsApp message from Twilio webhook
#[derive(Debug, Deserialize)]
pub struct IncomingMessage {
    #[serde(rename = "From")]
    pub from: String,
    #[serde(rename = "To", default)]
    pub to: String,
    #[serde(rename = "Body", default)]
    pub body: String,
    #[serde(rename = "MessageSid", default)]
    pub message_sid: String,
    #[serde(rename = "AccountSid", default)]
    pub account_sid: String,
}

/// Outgoing message payload
#[derive(Debug, Serialize)]
struct SendMessagePayload {
    #[serde(rename = "From")]
    from: String,
    #[serde(rename = "To")]
    to: String,
    #[serde(rename = "Body")]
    body: String,
}

/// Strip the `whatsapp:` channel prefix from an address, if present
pub fn strip_channel_prefix(address: &str) -> &str {
    address.strip_prefix(CHANNEL_PREFIX).unwrap_or(address)
}

impl TwilioClient {
    /// Create a new Twilio client
    pub fn new(account_sid: String, auth_token: String, phone_number: String) -> Self {
        Self {
            client: Client::new(),
            account_sid,
            auth_token,
            phone_number,
            base_url: "https://api.twilio.com".to_string(),
        }
    }

    /// Override the base URL (for tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Send a WhatsApp message, returning the message SID
    pub async fn send_message(&self, to: &str, body: &str) -> Result<String> {
        info!("Sending WhatsApp message to {}", to);

        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, self.account_sid
        );

        let payload = SendMessagePayload {
            from: format!("{}{}", CHANNEL_PREFIX, self.phone_number),
            to: format!("{}{}", CHANNEL_PREFIX, strip_channel_prefix(to)),
            body: body.to_string(),
        };

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(WhatsAppError::Api(format!(
                "Failed to send message: {} - {}",
                status, text
            )));
        }

        #[derive(Deserialize)]
        struct SendMessageResponse {
            sid: String,
        }

        let result: SendMessageResponse = response.json().await?;
        info!("Message sent successfully. SID: {}", result.sid);
        Ok(result.sid)
    }

    /// Verify webhook signature
    pub fn verify_signature(&self, url: &str, params: &str, signature: &str) -> bool {
        use hmac::{Hmac, Mac};
        use sha2::Sha256;

        type HmacSha256 = Hmac<Sha256>;

        let mut mac = match HmacSha256::new_from_slice(self.auth_token.as_bytes()) {
            Ok(m) => m,
            Err(_) => return false,
        };

        let data = format!("{}{}", url, params);
        mac.update(data.as_bytes());

        let expected = mac.finalize().into_bytes();
        let expected_hex = hex::encode(expected);

        expected_hex == signature
    }
}
