//! User configuration snapshot.
//!
//! A `Settings` value is captured once at the start of an evaluation and
//! handed to the resolver, so a single evaluation never observes a half
//! applied edit. Nothing here is cached across evaluations.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// Priority of checkers that must win over everything else.
pub const PRIORITY_MAX: i32 = i32::MAX;

/// Priority shared by the built-in checkers when not exclusive.
pub const DEFAULT_BUILTIN_PRIORITY: i32 = 10;

/// Caller identity verification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerificationSettings {
    pub enabled: bool,

    /// Verification is the sole authority: failures block
    pub exclusive: bool,

    /// Treat "not verified" like the decisive outcome of the current mode
    pub include_unverified: bool,
}

/// Contact membership.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactSettings {
    pub enabled: bool,

    /// Non-contacts are blocked
    pub exclusive: bool,
}

/// Allow numbers that keep trying to get through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepeatedSettings {
    pub enabled: bool,

    /// Incoming calls plus messages needed within the window
    pub times: u32,

    pub within_minutes: u32,
}

impl Default for RepeatedSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            times: 3,
            within_minutes: 5,
        }
    }
}

/// Allow numbers the user contacted recently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialedSettings {
    pub enabled: bool,
    pub within_days: u32,
}

impl Default for DialedSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            within_days: 3,
        }
    }
}

/// A daily window during which everything is allowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuietHoursSettings {
    pub enabled: bool,

    #[serde(with = "hhmm")]
    pub start: NaiveTime,

    #[serde(with = "hhmm")]
    pub end: NaiveTime,
}

impl Default for QuietHoursSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            start: NaiveTime::MIN,
            end: NaiveTime::MIN,
        }
    }
}

impl QuietHoursSettings {
    /// Whether `now` falls inside `[start, end)`.
    ///
    /// A window whose end is before its start wraps past midnight. Equal
    /// bounds cover the whole day.
    pub fn contains(&self, now: NaiveTime) -> bool {
        if self.start == self.end {
            true
        } else if self.start < self.end {
            self.start <= now && now < self.end
        } else {
            now >= self.start || now < self.end
        }
    }
}

/// Allow calls while the user was recently in one of these apps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecentAppSettings {
    /// Application ids, in the order used for attribution
    pub apps: Vec<String>,
    pub within_minutes: u32,
}

impl Default for RecentAppSettings {
    fn default() -> Self {
        Self {
            apps: Vec::new(),
            within_minutes: 5,
        }
    }
}

/// Platform capabilities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformSettings {
    pub supports_verification: bool,
}

impl Default for PlatformSettings {
    fn default() -> Self {
        Self {
            supports_verification: true,
        }
    }
}

/// Immutable configuration for one evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub verification: VerificationSettings,
    pub contacts: ContactSettings,
    pub repeated: RepeatedSettings,
    pub dialed: DialedSettings,
    pub quiet_hours: QuietHoursSettings,
    pub recent_apps: RecentAppSettings,
    pub platform: PlatformSettings,
}

impl Settings {
    /// Priority of the verification checker.
    pub fn verification_priority(&self) -> i32 {
        if self.verification.exclusive {
            PRIORITY_MAX
        } else {
            DEFAULT_BUILTIN_PRIORITY
        }
    }

    /// Priority of the contact checker.
    pub fn contact_priority(&self) -> i32 {
        if self.contacts.exclusive {
            PRIORITY_MAX
        } else {
            DEFAULT_BUILTIN_PRIORITY
        }
    }
}

/// `HH:MM` (de)serialization for times of day.
pub(crate) mod hhmm {
    use chrono::NaiveTime;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%H:%M";

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&text, FORMAT)
            .map_err(|e| D::Error::custom(format!("invalid time {:?}, expected HH:MM: {}", text, e)))
    }
}

/// Optional `HH:MM` (de)serialization.
pub(crate) mod opt_hhmm {
    use chrono::NaiveTime;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    use super::hhmm::FORMAT;

    pub fn serialize<S>(time: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match time {
            Some(t) => serializer.serialize_str(&t.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(text) => NaiveTime::parse_from_str(&text, FORMAT)
                .map(Some)
                .map_err(|e| D::Error::custom(format!("invalid time {:?}, expected HH:MM: {}", text, e))),
            None => Ok(None),
        }
    }
}
