//! HTTP carrier gateway tests against a mock carrier.

use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use relay_carrier::{
    CarrierCredentials, CarrierError, CarrierGateway, HttpCarrier, OutboundCall, OutboundMessage,
};
use relay_core::ChannelKind;

fn test_auth() -> CarrierCredentials {
    CarrierCredentials {
        account_sid: "ACtest".to_string(),
        token: "token-secret".to_string(),
    }
}

#[tokio::test]
async fn send_message_posts_form_and_parses_receipt() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/2010-04-01/Accounts/ACtest/Messages.json"))
        .and(body_string_contains("To=%2B15551234567"))
        .and(body_string_contains("Body=hello"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "sid": "SM123",
            "status": "queued",
            "price": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let carrier = HttpCarrier::new(server.uri(), None).unwrap();
    let receipt = carrier
        .send_message(
            &test_auth(),
            &OutboundMessage {
                to: "+15551234567".to_string(),
                from: Some("+15550000000".to_string()),
                body: "hello".to_string(),
                ..OutboundMessage::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(receipt.sid, "SM123");
    assert_eq!(receipt.status, "queued");
    assert_eq!(receipt.price_units, None);
}

#[tokio::test]
async fn place_call_hits_the_calls_collection() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/2010-04-01/Accounts/ACtest/Calls.json"))
        .and(body_string_contains("Twiml="))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "sid": "CA456",
            "status": "initiated"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let carrier = HttpCarrier::new(server.uri(), None).unwrap();
    let receipt = carrier
        .place_call(
            &test_auth(),
            &OutboundCall {
                to: "+15551234567".to_string(),
                from: Some("+15550000000".to_string()),
                twiml: Some("<Response><Say>hi</Say></Response>".to_string()),
                ..OutboundCall::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(receipt.sid, "CA456");
    assert_eq!(receipt.status, "initiated");
}

#[tokio::test]
async fn fetch_status_returns_measured_price() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/2010-04-01/Accounts/ACtest/Messages/SM123.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "sid": "SM123",
            "status": "delivered",
            "price": "-0.00750",
            "error_code": null,
            "error_message": null
        })))
        .mount(&server)
        .await;

    let carrier = HttpCarrier::new(server.uri(), None).unwrap();
    let status = carrier
        .fetch_status(&test_auth(), "SM123", ChannelKind::Sms)
        .await
        .unwrap();

    assert_eq!(status.status, "delivered");
    assert_eq!(status.price_units, Some(75));
    assert!(status.error_code.is_none());
}

#[tokio::test]
async fn not_found_is_distinguishable() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/2010-04-01/Accounts/ACtest/Calls/CA999.json"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "code": 20404,
            "message": "The requested resource was not found"
        })))
        .mount(&server)
        .await;

    let carrier = HttpCarrier::new(server.uri(), None).unwrap();
    let err = carrier
        .fetch_status(&test_auth(), "CA999", ChannelKind::Call)
        .await
        .unwrap_err();

    assert!(matches!(err, CarrierError::NotFound));
}

#[tokio::test]
async fn api_errors_carry_the_carrier_code() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/2010-04-01/Accounts/ACtest/Messages.json"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "code": 20003,
            "message": "Authentication Error"
        })))
        .mount(&server)
        .await;

    let carrier = HttpCarrier::new(server.uri(), None).unwrap();
    let err = carrier
        .send_message(
            &test_auth(),
            &OutboundMessage {
                to: "+15551234567".to_string(),
                body: "hello".to_string(),
                ..OutboundMessage::default()
            },
        )
        .await
        .unwrap_err();

    match err {
        CarrierError::Api { status, code, message } => {
            assert_eq!(status, 401);
            assert_eq!(code, Some(20003));
            assert_eq!(message, "Authentication Error");
        }
        other => panic!("unexpected error: {other}"),
    }
}
