//! Checkers backed by user-authored pattern rules.
//!
//! Both use full-match semantics: the whole subject must satisfy the
//! pattern, a substring hit is not enough. Patterns are compiled when the
//! checker is built, so a malformed rule surfaces as a `PatternError` from
//! `new` and never during evaluation.

use crate::rules::{Matcher, PatternError, PatternRule};
use crate::types::{Attribution, Incoming, Verdict};

use super::{Checker, CheckerKind};

fn rule_verdict(kind: CheckerKind, rule: &PatternRule) -> Verdict {
    Verdict::decide(rule.blacklist, kind.result_code())
        .attributed(Attribution::MatchedRuleId(rule.id))
}

/// Matches the normalized number against a number rule.
#[derive(Debug)]
pub struct NumberRuleChecker {
    rule: PatternRule,
    matcher: Matcher,
}

impl NumberRuleChecker {
    pub fn new(rule: PatternRule) -> Result<Self, PatternError> {
        let matcher = rule.full_matcher()?;
        Ok(Self { rule, matcher })
    }
}

impl Checker for NumberRuleChecker {
    fn kind(&self) -> CheckerKind {
        CheckerKind::NumberRule
    }

    fn priority(&self) -> i32 {
        self.rule.priority
    }

    fn evaluate(&self, incoming: &Incoming) -> Option<Verdict> {
        self.matcher
            .is_match(&incoming.number)
            .then(|| rule_verdict(self.kind(), &self.rule))
    }
}

/// Matches the message body, optionally restricted to a sender pattern.
#[derive(Debug)]
pub struct ContentRuleChecker {
    rule: PatternRule,
    matcher: Matcher,
    sender: Option<Matcher>,
}

impl ContentRuleChecker {
    pub fn new(rule: PatternRule) -> Result<Self, PatternError> {
        let matcher = rule.full_matcher()?;
        let sender = if rule.has_extra() {
            Some(rule.extra_full_matcher()?)
        } else {
            None
        };
        Ok(Self {
            rule,
            matcher,
            sender,
        })
    }
}

impl Checker for ContentRuleChecker {
    fn kind(&self) -> CheckerKind {
        CheckerKind::ContentRule
    }

    fn priority(&self) -> i32 {
        self.rule.priority
    }

    fn evaluate(&self, incoming: &Incoming) -> Option<Verdict> {
        let body = incoming.body.as_deref()?;
        if !self.matcher.is_match(body) {
            return None;
        }
        if let Some(sender) = &self.sender {
            if !sender.is_match(&incoming.number) {
                return None;
            }
        }
        Some(rule_verdict(self.kind(), &self.rule))
    }
}
