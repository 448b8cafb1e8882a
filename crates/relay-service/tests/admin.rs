//! Admin surface integration tests.

mod common;

use common::{TestHarness, ADMIN_KEY};
use serde_json::json;

// ============================================================================
// Auth
// ============================================================================

#[tokio::test]
async fn admin_endpoints_require_the_admin_key() {
    let harness = TestHarness::new().await;

    harness
        .server
        .post("/v1/tenants")
        .json(&json!({ "name": "acme" }))
        .await
        .assert_status_unauthorized();

    harness
        .server
        .post("/v1/tenants")
        .add_header("x-admin-key", "wrong-key")
        .json(&json!({ "name": "acme" }))
        .await
        .assert_status_unauthorized();
}

#[tokio::test]
async fn health_is_public() {
    let harness = TestHarness::new().await;

    let response = harness.server.get("/health").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "relay");
}

// ============================================================================
// Tenants & ledger
// ============================================================================

#[tokio::test]
async fn create_and_credit_tenant() {
    let harness = TestHarness::new().await;
    let tenant_id = harness.create_tenant("acme", "2.5000").await;

    assert_eq!(harness.tenant_balance(&tenant_id).await, "2.5000");

    let response = harness
        .server
        .post(&format!("/v1/tenants/{tenant_id}/credit"))
        .add_header("x-admin-key", ADMIN_KEY)
        .json(&json!({ "amount": "10" }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["balance"], "12.5000");
}

#[tokio::test]
async fn credit_rejects_non_positive_amounts() {
    let harness = TestHarness::new().await;
    let tenant_id = harness.create_tenant("acme", "1.0000").await;

    harness
        .server
        .post(&format!("/v1/tenants/{tenant_id}/credit"))
        .add_header("x-admin-key", ADMIN_KEY)
        .json(&json!({ "amount": "-5" }))
        .await
        .assert_status_bad_request();
}

#[tokio::test]
async fn unknown_tenant_is_404() {
    let harness = TestHarness::new().await;

    harness
        .server
        .get(&format!("/v1/tenants/{}", uuid::Uuid::new_v4()))
        .add_header("x-admin-key", ADMIN_KEY)
        .await
        .assert_status_not_found();
}

// ============================================================================
// Keys
// ============================================================================

#[tokio::test]
async fn generated_key_secret_is_shown_once() {
    let harness = TestHarness::new().await;
    let tenant_id = harness.create_tenant("acme", "1.0000").await;

    let response = harness
        .server
        .post(&format!("/v1/tenants/{tenant_id}/keys"))
        .add_header("x-admin-key", ADMIN_KEY)
        .json(&json!({}))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    let created: serde_json::Value = response.json();
    let secret = created["secret"].as_str().unwrap();
    assert_eq!(secret.len(), 43);

    // The listing carries the prefix but never the secret.
    let list_response = harness
        .server
        .get(&format!("/v1/tenants/{tenant_id}/keys"))
        .add_header("x-admin-key", ADMIN_KEY)
        .await;
    let keys: serde_json::Value = list_response.json();
    assert_eq!(keys.as_array().unwrap().len(), 1);
    assert_eq!(keys[0]["prefix"], created["prefix"]);
    assert!(keys[0].get("secret").is_none());
    assert!(keys[0].get("key_digest").is_none());
}

// ============================================================================
// Carrier accounts & rules
// ============================================================================

#[tokio::test]
async fn account_listing_never_exposes_the_token() {
    let harness = TestHarness::new().await;
    harness.put_account("AC100", "+15550000001").await;

    let response = harness
        .server
        .get("/v1/accounts")
        .add_header("x-admin-key", ADMIN_KEY)
        .await;

    response.assert_status_ok();
    let accounts: serde_json::Value = response.json();
    assert_eq!(accounts[0]["sid"], "AC100");
    assert!(accounts[0].get("token").is_none());
    assert!(accounts[0].get("encrypted_token").is_none());
    assert!(!response.text().contains(common::CARRIER_TOKEN));
}

#[tokio::test]
async fn stored_token_is_encrypted_at_rest() {
    let harness = TestHarness::new().await;
    harness.put_account("AC100", "+15550000001").await;

    use relay_store::Store;
    let account = harness
        .store
        .get_account(&"AC100".parse().unwrap())
        .unwrap()
        .unwrap();
    assert_ne!(account.encrypted_token, common::CARRIER_TOKEN);
    assert!(!account.encrypted_token.contains(common::CARRIER_TOKEN));
}

#[tokio::test]
async fn rule_creation_validates_pattern_and_account() {
    let harness = TestHarness::new().await;
    harness.put_account("AC100", "+15550000001").await;

    // Unknown account
    harness
        .server
        .post("/v1/rules")
        .add_header("x-admin-key", ADMIN_KEY)
        .json(&json!({ "priority": 10, "pattern": r"\+1.*", "account_sid": "ACmissing" }))
        .await
        .assert_status_not_found();

    // Invalid pattern
    harness
        .server
        .post("/v1/rules")
        .add_header("x-admin-key", ADMIN_KEY)
        .json(&json!({ "priority": 10, "pattern": "(unclosed", "account_sid": "AC100" }))
        .await
        .assert_status_bad_request();

    harness.create_rule(10, r"\+1.*", "AC100").await;
}

#[tokio::test]
async fn deleting_an_account_cascades_to_its_rules() {
    let harness = TestHarness::new().await;
    harness.put_account("AC100", "+15550000001").await;
    harness.put_account("AC200", "+15550000002").await;
    harness.create_rule(10, r"\+1.*", "AC100").await;
    harness.create_rule(20, r"\+44.*", "AC200").await;

    harness
        .server
        .delete("/v1/accounts/AC100")
        .add_header("x-admin-key", ADMIN_KEY)
        .await
        .assert_status(axum::http::StatusCode::NO_CONTENT);

    let response = harness
        .server
        .get("/v1/rules")
        .add_header("x-admin-key", ADMIN_KEY)
        .await;
    let rules: serde_json::Value = response.json();
    let rules = rules.as_array().unwrap();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0]["account_sid"], "AC200");
}

#[tokio::test]
async fn rules_list_ascending_by_priority() {
    let harness = TestHarness::new().await;
    harness.put_account("AC100", "+15550000001").await;
    harness.create_rule(30, r"\+44.*", "AC100").await;
    harness.create_rule(10, r"\+1.*", "AC100").await;
    harness.create_rule(20, r"\+49.*", "AC100").await;

    let response = harness
        .server
        .get("/v1/rules")
        .add_header("x-admin-key", ADMIN_KEY)
        .await;
    let rules: serde_json::Value = response.json();
    let priorities: Vec<i64> = rules
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["priority"].as_i64().unwrap())
        .collect();
    assert_eq!(priorities, vec![10, 20, 30]);
}

// ============================================================================
// Audit
// ============================================================================

#[tokio::test]
async fn mutations_are_audited() {
    let harness = TestHarness::new().await;
    let tenant_id = harness.create_tenant("acme", "1.0000").await;
    harness.generate_key(&tenant_id).await;
    harness.put_account("AC100", "+15550000001").await;

    let response = harness
        .server
        .get("/v1/audit")
        .add_header("x-admin-key", ADMIN_KEY)
        .await;
    response.assert_status_ok();
    let entries: serde_json::Value = response.json();
    let actions: Vec<&str> = entries
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["action"].as_str().unwrap())
        .collect();

    assert!(actions.contains(&"key_generated"));
    assert!(actions.contains(&"account_saved"));
}
