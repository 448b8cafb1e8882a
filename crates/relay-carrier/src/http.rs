//! HTTP implementation of the carrier gateway.
//!
//! Speaks the carrier's Twilio-style REST API: form-encoded POSTs under
//! basic auth, JSON responses, `2010-04-01` paths. The base URL is
//! configurable so tests can point at a mock server.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use relay_core::ChannelKind;

use crate::error::CarrierError;
use crate::gateway::{
    CarrierCredentials, CarrierGateway, DispatchReceipt, OutboundCall, OutboundMessage,
    ResourceStatus,
};
use crate::Result;

/// Default timeout for carrier requests.
///
/// Dispatch is the only external-network call on the request path, so
/// this bounds end-to-end request latency.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP carrier gateway client.
#[derive(Debug, Clone)]
pub struct HttpCarrier {
    client: reqwest::Client,
    base_url: String,
}

/// Message or call resource as the carrier returns it.
#[derive(Debug, Deserialize)]
struct ResourceResponse {
    sid: String,
    status: String,
    #[serde(default)]
    price: Option<String>,
    #[serde(default)]
    error_code: Option<serde_json::Value>,
    #[serde(default)]
    error_message: Option<String>,
}

/// Carrier error body.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: Option<String>,
}

impl HttpCarrier {
    /// Create a client against the given base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout.unwrap_or(DEFAULT_TIMEOUT))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn messages_url(&self, account_sid: &str) -> String {
        format!(
            "{}/2010-04-01/Accounts/{account_sid}/Messages.json",
            self.base_url
        )
    }

    fn calls_url(&self, account_sid: &str) -> String {
        format!(
            "{}/2010-04-01/Accounts/{account_sid}/Calls.json",
            self.base_url
        )
    }

    fn resource_url(&self, account_sid: &str, carrier_sid: &str, kind: ChannelKind) -> String {
        let collection = if kind.is_message() { "Messages" } else { "Calls" };
        format!(
            "{}/2010-04-01/Accounts/{account_sid}/{collection}/{carrier_sid}.json",
            self.base_url
        )
    }

    async fn handle_response(&self, response: reqwest::Response) -> Result<ResourceResponse> {
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CarrierError::NotFound);
        }

        if status.is_success() {
            return Ok(response.json().await?);
        }

        // Try to parse the carrier's error body
        let error_body: std::result::Result<ErrorResponse, _> = response.json().await;
        match error_body {
            Ok(body) => Err(CarrierError::Api {
                status: status.as_u16(),
                code: body.code,
                message: body.message.unwrap_or_else(|| format!("HTTP {status}")),
            }),
            Err(_) => Err(CarrierError::Api {
                status: status.as_u16(),
                code: None,
                message: format!("HTTP {status}"),
            }),
        }
    }
}

#[async_trait]
impl CarrierGateway for HttpCarrier {
    async fn send_message(
        &self,
        auth: &CarrierCredentials,
        message: &OutboundMessage,
    ) -> Result<DispatchReceipt> {
        let mut form: Vec<(&str, &str)> = vec![("To", &message.to), ("Body", &message.body)];
        if let Some(from) = &message.from {
            form.push(("From", from));
        }
        for url in &message.media_urls {
            form.push(("MediaUrl", url));
        }
        if let Some(callback) = &message.status_callback {
            form.push(("StatusCallback", callback));
        }

        tracing::debug!(to = %message.to, account_sid = %auth.account_sid, "Dispatching message");

        let response = self
            .client
            .post(self.messages_url(&auth.account_sid))
            .basic_auth(&auth.account_sid, Some(&auth.token))
            .form(&form)
            .send()
            .await?;

        let resource = self.handle_response(response).await?;
        Ok(DispatchReceipt {
            price_units: resource.price.as_deref().and_then(parse_price_units),
            sid: resource.sid,
            status: resource.status,
        })
    }

    async fn place_call(
        &self,
        auth: &CarrierCredentials,
        call: &OutboundCall,
    ) -> Result<DispatchReceipt> {
        let mut form: Vec<(&str, &str)> = vec![("To", &call.to)];
        if let Some(from) = &call.from {
            form.push(("From", from));
        }
        if let Some(twiml) = &call.twiml {
            form.push(("Twiml", twiml));
        }
        if let Some(url) = &call.url {
            form.push(("Url", url));
        }
        if let Some(callback) = &call.status_callback {
            form.push(("StatusCallback", callback));
        }

        tracing::debug!(to = %call.to, account_sid = %auth.account_sid, "Placing call");

        let response = self
            .client
            .post(self.calls_url(&auth.account_sid))
            .basic_auth(&auth.account_sid, Some(&auth.token))
            .form(&form)
            .send()
            .await?;

        let resource = self.handle_response(response).await?;
        Ok(DispatchReceipt {
            price_units: resource.price.as_deref().and_then(parse_price_units),
            sid: resource.sid,
            status: resource.status,
        })
    }

    async fn fetch_status(
        &self,
        auth: &CarrierCredentials,
        carrier_sid: &str,
        kind: ChannelKind,
    ) -> Result<ResourceStatus> {
        let response = self
            .client
            .get(self.resource_url(&auth.account_sid, carrier_sid, kind))
            .basic_auth(&auth.account_sid, Some(&auth.token))
            .send()
            .await?;

        let resource = self.handle_response(response).await?;
        Ok(ResourceStatus {
            status: resource.status,
            error_code: resource.error_code.map(|code| match code {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            }),
            error_message: resource.error_message,
            price_units: resource.price.as_deref().and_then(parse_price_units),
        })
    }
}

/// Parse a carrier price string (e.g. `"-0.00750"`) into absolute balance
/// units.
///
/// Carriers report prices as negative decimals with up to five fractional
/// digits; digits beyond the 4-decimal unit scale are truncated. Integer
/// parsing keeps the result exact.
fn parse_price_units(price: &str) -> Option<i64> {
    let trimmed = price.trim().trim_start_matches(['-', '+']);
    let (whole_str, frac_str) = match trimmed.split_once('.') {
        Some((w, f)) => (w, f),
        None => (trimmed, ""),
    };

    if whole_str.is_empty() && frac_str.is_empty() {
        return None;
    }
    if !whole_str.chars().all(|c| c.is_ascii_digit())
        || !frac_str.chars().all(|c| c.is_ascii_digit())
    {
        return None;
    }

    let whole: i64 = if whole_str.is_empty() {
        0
    } else {
        whole_str.parse().ok()?
    };

    // Right-pad to 4 digits, truncating anything finer
    let frac_padded = format!("{frac_str:0<4.4}");
    let frac: i64 = frac_padded.parse().ok()?;

    whole.checked_mul(relay_core::UNIT_SCALE)?.checked_add(frac)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_trims_trailing_slash() {
        let carrier = HttpCarrier::new("http://localhost:4010/", None).unwrap();
        assert_eq!(
            carrier.messages_url("AC1"),
            "http://localhost:4010/2010-04-01/Accounts/AC1/Messages.json"
        );
    }

    #[test]
    fn resource_url_picks_collection_by_kind() {
        let carrier = HttpCarrier::new("http://localhost:4010", None).unwrap();
        assert!(carrier
            .resource_url("AC1", "SM2", ChannelKind::Sms)
            .ends_with("/Messages/SM2.json"));
        assert!(carrier
            .resource_url("AC1", "CA3", ChannelKind::Call)
            .ends_with("/Calls/CA3.json"));
    }

    #[test]
    fn price_parsing() {
        assert_eq!(parse_price_units("-0.00750"), Some(75));
        assert_eq!(parse_price_units("0.0075"), Some(75));
        assert_eq!(parse_price_units("-1.5"), Some(15_000));
        assert_eq!(parse_price_units("2"), Some(20_000));
        assert_eq!(parse_price_units(""), None);
        assert_eq!(parse_price_units("n/a"), None);
    }
}
