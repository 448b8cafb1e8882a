//! Destination routing.
//!
//! Routing rules carry regex patterns matched against the destination
//! number anchored at the start. Rules are evaluated ascending by
//! priority and the first match wins. A credential-level forced account
//! bypasses the rule table entirely.

use std::collections::HashMap;
use std::sync::RwLock;

use regex::Regex;

use relay_core::{CarrierAccount, Identity};
use relay_store::Store;

use crate::error::ApiError;

/// Cache of compiled routing patterns, keyed by pattern text.
///
/// Patterns are immutable once written (rules are created and deleted,
/// never edited), so entries never need invalidation. A pattern that
/// fails to compile is cached as `None` and its rule is skipped.
#[derive(Default)]
pub struct PatternCache {
    compiled: RwLock<HashMap<String, Option<Regex>>>,
}

impl PatternCache {
    /// Whether `pattern` matches `number`, anchored at the start.
    pub fn matches(&self, pattern: &str, number: &str) -> bool {
        if let Ok(cache) = self.compiled.read() {
            if let Some(entry) = cache.get(pattern) {
                return entry.as_ref().is_some_and(|re| re.is_match(number));
            }
        }

        let compiled = compile_anchored(pattern);
        if compiled.is_none() {
            tracing::warn!(%pattern, "routing rule pattern does not compile, skipping");
        }
        let matched = compiled.as_ref().is_some_and(|re| re.is_match(number));

        if let Ok(mut cache) = self.compiled.write() {
            cache.insert(pattern.to_string(), compiled);
        }
        matched
    }
}

/// Compile a rule pattern anchored at the start of the input.
fn compile_anchored(pattern: &str) -> Option<Regex> {
    Regex::new(&format!(r"\A(?:{pattern})")).ok()
}

/// Validate a rule pattern at creation time.
pub fn validate_pattern(pattern: &str) -> Result<(), ApiError> {
    compile_anchored(pattern)
        .map(|_| ())
        .ok_or_else(|| ApiError::BadRequest(format!("invalid pattern: {pattern}")))
}

/// Select the carrier account for a destination number.
///
/// A forced account on the credential wins over all rules; if it points
/// at an account that no longer exists, that is a routing failure, not a
/// server error. Otherwise rules are evaluated ascending by priority and
/// the first match wins. `None` means no route.
pub fn select_account(
    store: &dyn Store,
    patterns: &PatternCache,
    identity: &Identity,
    number: &str,
) -> Result<Option<CarrierAccount>, ApiError> {
    if let Some(forced) = &identity.forced_account {
        let account = store.get_account(forced)?;
        if account.is_none() {
            tracing::warn!(
                account_sid = %forced,
                credential_id = %identity.credential_id,
                "forced account no longer exists"
            );
        }
        return Ok(account);
    }

    for rule in store.list_rules()? {
        if !patterns.matches(&rule.pattern, number) {
            continue;
        }
        match store.get_account(&rule.account_sid)? {
            Some(account) => return Ok(Some(account)),
            None => {
                // Stale rule; the cascade on account deletion should have
                // removed it.
                tracing::warn!(rule_id = %rule.id, account_sid = %rule.account_sid,
                    "rule references a missing account, skipping");
            }
        }
    }

    Ok(None)
}
