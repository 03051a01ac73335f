//! User-authored pattern rules.
//!
//! Rules are owned by an external store and are read-only here. This module
//! only knows how to turn a rule's pattern text into a compiled matcher.

use fancy_regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::Mode;

/// A rule pattern that failed to compile.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("rule {rule_id}: invalid pattern {pattern:?}: {message}")]
pub struct PatternError {
    pub rule_id: i64,
    pub pattern: String,
    pub message: String,
}

/// Which list a rule lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCategory {
    Number,
    Content,
    QuickCopy,
}

/// Matching options applied when compiling a pattern.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleFlags {
    pub ignore_case: bool,
    pub multi_line: bool,
    pub dot_matches_newline: bool,
}

fn default_true() -> bool {
    true
}

/// A user-authored filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternRule {
    /// Stable identifier, used for attribution
    pub id: i64,

    /// Higher evaluates first, on the same axis as built-in checkers
    #[serde(default)]
    pub priority: i32,

    pub pattern: String,

    #[serde(default)]
    pub flags: RuleFlags,

    /// Sender constraint for content rules; empty means any sender
    #[serde(default)]
    pub extra_pattern: String,

    #[serde(default)]
    pub extra_flags: RuleFlags,

    /// true blocks on match, false allows on match
    #[serde(default)]
    pub blacklist: bool,

    #[serde(default)]
    pub description: String,

    #[serde(default = "default_true")]
    pub for_call: bool,

    #[serde(default = "default_true")]
    pub for_sms: bool,
}

impl PatternRule {
    pub fn new(id: i64, pattern: impl Into<String>) -> Self {
        Self {
            id,
            priority: 0,
            pattern: pattern.into(),
            flags: RuleFlags::default(),
            extra_pattern: String::new(),
            extra_flags: RuleFlags::default(),
            blacklist: false,
            description: String::new(),
            for_call: true,
            for_sms: true,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn blocking(mut self) -> Self {
        self.blacklist = true;
        self
    }

    pub fn with_flags(mut self, flags: RuleFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_extra(mut self, pattern: impl Into<String>) -> Self {
        self.extra_pattern = pattern.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn only_for(mut self, mode: Mode) -> Self {
        self.for_call = mode == Mode::Call;
        self.for_sms = mode == Mode::Sms;
        self
    }

    pub fn applies_to(&self, mode: Mode) -> bool {
        match mode {
            Mode::Call => self.for_call,
            Mode::Sms => self.for_sms,
        }
    }

    pub fn has_extra(&self) -> bool {
        !self.extra_pattern.is_empty()
    }

    /// Compile the primary pattern so that it must match the whole subject.
    pub fn full_matcher(&self) -> Result<Matcher, PatternError> {
        Matcher::compile(self.id, &self.pattern, self.flags, true)
    }

    /// Compile the sender constraint, anchored like the primary pattern.
    pub fn extra_full_matcher(&self) -> Result<Matcher, PatternError> {
        Matcher::compile(self.id, &self.extra_pattern, self.extra_flags, true)
    }

    /// Compile the primary pattern for searching anywhere in the subject.
    pub fn search_matcher(&self) -> Result<Matcher, PatternError> {
        Matcher::compile(self.id, &self.pattern, self.flags, false)
    }
}

/// A compiled rule pattern.
///
/// Lookaround and backreferences are supported. Patterns without them run
/// on the plain `regex` engine; the rest backtrack, and a match that hits
/// the backtracking limit counts as no match.
#[derive(Debug, Clone)]
pub struct Matcher {
    rule_id: i64,
    regex: Regex,
}

impl Matcher {
    fn compile(rule_id: i64, pattern: &str, flags: RuleFlags, anchored: bool) -> Result<Self, PatternError> {
        let mut source = String::new();
        if flags.ignore_case {
            source.push_str("(?i)");
        }
        if flags.multi_line {
            source.push_str("(?m)");
        }
        if flags.dot_matches_newline {
            source.push_str("(?s)");
        }
        if anchored {
            source.push_str(&format!(r"\A(?:{})\z", pattern));
        } else {
            source.push_str(pattern);
        }

        let regex = Regex::new(&source).map_err(|e| PatternError {
            rule_id,
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self { rule_id, regex })
    }

    pub fn is_match(&self, text: &str) -> bool {
        match self.regex.is_match(text) {
            Ok(matched) => matched,
            Err(e) => {
                tracing::warn!(rule_id = self.rule_id, error = %e, "Pattern gave up, treating as no match");
                false
            }
        }
    }

    /// First match in `text`, or `None` on no match or a failed search.
    pub fn captures<'t>(&self, text: &'t str) -> Option<Captures<'t>> {
        match self.regex.captures(text) {
            Ok(caps) => caps,
            Err(e) => {
                tracing::warn!(rule_id = self.rule_id, error = %e, "Pattern gave up, treating as no match");
                None
            }
        }
    }

    /// Number of capture groups, counting the whole match as group 0.
    pub fn captures_len(&self) -> usize {
        self.regex.captures_len()
    }
}
