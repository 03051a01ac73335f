//! Quick extraction: pull a value (typically a verification code) out of
//! message text.
//!
//! Independent of the allow/block decision. Rules are tried in storage
//! order with search semantics; the first rule that yields a value wins.
//!
//! ## Value selection
//!
//! | Pattern | Extracted value |
//! |---------|-----------------|
//! | no capture groups | the whole match |
//! | group 1 participated | group 1 |
//! | group 1 declared but did not participate | nothing, try the next rule |
//!
//! An empty value also counts as nothing.

use serde::{Deserialize, Serialize};

use crate::rules::{Matcher, PatternRule, RuleCategory};
use crate::sources::RuleStore;
use crate::types::Mode;

/// A rule and the value it pulled out of the text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extraction {
    pub rule: PatternRule,
    pub value: String,
}

/// Extracts values using the quick-copy rules of a store.
pub struct QuickExtractor<'a> {
    rules: &'a dyn RuleStore,
}

impl<'a> QuickExtractor<'a> {
    pub fn new(rules: &'a dyn RuleStore) -> Self {
        Self { rules }
    }

    pub fn extract(&self, body: &str) -> Option<Extraction> {
        let rules = self.rules.list_active_rules(RuleCategory::QuickCopy, Mode::Sms);
        extract_with_rules(body, &rules)
    }
}

/// Try `rules` in order against `text` and return the first extraction.
///
/// Rules whose pattern does not compile are skipped.
pub fn extract_with_rules(text: &str, rules: &[PatternRule]) -> Option<Extraction> {
    rules.iter().find_map(|rule| {
        let matcher = match rule.search_matcher() {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!(rule_id = rule.id, error = %e, "Skipping malformed quick-copy rule");
                return None;
            }
        };
        extract_value(&matcher, text).map(|value| Extraction {
            rule: rule.clone(),
            value,
        })
    })
}

/// Search `text` with `matcher` and pick the value per the selection table.
pub fn extract_value(matcher: &Matcher, text: &str) -> Option<String> {
    let caps = matcher.captures(text)?;

    let value = if matcher.captures_len() == 1 {
        caps.get(0)
    } else {
        caps.get(1)
    }?;

    if value.as_str().is_empty() {
        None
    } else {
        Some(value.as_str().to_string())
    }
}
