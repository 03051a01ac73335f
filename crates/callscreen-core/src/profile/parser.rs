//! Profile parsing from YAML/JSON.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Local, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::checkers::{ContentRuleChecker, NumberRuleChecker};
use crate::rules::{PatternError, RuleCategory};
use crate::settings::{opt_hhmm, Settings};
use crate::sources::{AppUsageEntry, Contact, FixedClock, Grants, HistoryEntry, MemorySources, RuleLists};

use super::schema::validate_profile_schema;

/// Errors that can occur when loading profiles.
#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("Failed to read profile file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Profile does not match schema:\n  {}", .0.join("\n  "))]
    SchemaError(Vec<String>),

    #[error("Profile validation failed: {0}")]
    ValidationError(String),
}

/// Settings plus the data the checkers query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub settings: Settings,
    pub rules: RuleLists,
    pub contacts: Vec<Contact>,
    pub history: Vec<HistoryEntry>,
    pub app_usage: Vec<AppUsageEntry>,
    pub permissions: Grants,

    /// Freeze the clock at this instant instead of the real time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub now: Option<DateTime<Utc>>,

    /// Local time of day used for quiet hours
    #[serde(with = "opt_hhmm", skip_serializing_if = "Option::is_none")]
    pub local_time: Option<NaiveTime>,
}

impl Profile {
    /// Parse a profile from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ProfileError> {
        let value: serde_json::Value = serde_yaml::from_str(yaml)?;
        Self::from_value(value)
    }

    /// Parse a profile from JSON string.
    pub fn from_json(json: &str) -> Result<Self, ProfileError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Parse a profile file, choosing JSON for `.json` and YAML otherwise.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ProfileError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&contents),
            _ => Self::from_yaml(&contents),
        }
    }

    fn from_value(value: serde_json::Value) -> Result<Self, ProfileError> {
        // An empty YAML document parses as null
        let value = if value.is_null() {
            serde_json::Value::Object(Default::default())
        } else {
            value
        };

        validate_profile_schema(&value).map_err(ProfileError::SchemaError)?;
        let profile: Profile = serde_json::from_value(value)?;
        profile.validate()?;
        Ok(profile)
    }

    /// Semantic checks the schema cannot express.
    fn validate(&self) -> Result<(), ProfileError> {
        for category in [RuleCategory::Number, RuleCategory::Content, RuleCategory::QuickCopy] {
            let mut seen = HashSet::new();
            for rule in self.rules.category(category) {
                if !seen.insert(rule.id) {
                    return Err(ProfileError::ValidationError(format!(
                        "Duplicate {:?} rule ID: {}",
                        category, rule.id
                    )));
                }
            }
        }

        if self.settings.repeated.times == 0 {
            return Err(ProfileError::ValidationError(
                "settings.repeated.times must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Rules whose patterns do not compile.
    ///
    /// Loading still succeeds for these; the engine skips them at evaluation.
    pub fn malformed_rules(&self) -> Vec<PatternError> {
        let number = self
            .rules
            .number
            .iter()
            .filter_map(|r| NumberRuleChecker::new(r.clone()).err());
        let content = self
            .rules
            .content
            .iter()
            .filter_map(|r| ContentRuleChecker::new(r.clone()).err());
        let quick = self
            .rules
            .quick_copy
            .iter()
            .filter_map(|r| r.search_matcher().err());

        number.chain(content).chain(quick).collect()
    }

    /// The clock this profile pins, or the current time.
    pub fn clock(&self) -> FixedClock {
        match (self.now, self.local_time) {
            (Some(now), Some(local_time)) => FixedClock::new(now, local_time),
            (Some(now), None) => FixedClock::new(now, now.with_timezone(&Local).time()),
            (None, Some(local_time)) => FixedClock::new(Utc::now(), local_time),
            (None, None) => FixedClock::capture(),
        }
    }

    /// Build in-memory collaborators from this profile.
    pub fn to_sources(&self) -> MemorySources {
        let mut sources = MemorySources::new(self.clock());
        sources.rules = self.rules.clone();
        sources.contacts = self.contacts.clone();
        sources.history = self.history.clone();
        sources.app_usage = self.app_usage.clone();
        sources.grants = self.permissions;
        sources
    }
}
