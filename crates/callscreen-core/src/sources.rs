//! Collaborator interfaces the checkers query.
//!
//! Storage, contacts, history, app usage and permissions all live outside
//! the engine. Each is a small trait so a host platform can plug in its own
//! data sources; `MemorySources` is the in-memory implementation used by
//! profiles and tests.

use std::collections::BTreeSet;
use std::time::Duration;

use chrono::{DateTime, Local, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::normalize::normalize_number;
use crate::rules::{PatternRule, RuleCategory};
use crate::types::Mode;

/// Read-only access to stored pattern rules.
pub trait RuleStore {
    /// Active rules of a category that apply to `mode`, in storage order.
    fn list_active_rules(&self, category: RuleCategory, mode: Mode) -> Vec<PatternRule>;

    /// Look up a rule by id, whether or not it is still active.
    fn find_rule(&self, category: RuleCategory, id: i64) -> Option<PatternRule>;
}

/// An address book entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    pub number: String,
}

pub trait ContactDirectory {
    fn find_contact_by_number(&self, number: &str) -> Option<Contact>;
}

/// Call and SMS history, both channels counted together.
pub trait CallHistory {
    fn count_incoming(&self, number: &str, within: Duration) -> u32;
    fn count_outgoing(&self, number: &str, within: Duration) -> u32;
}

/// Foreground application usage.
pub trait AppUsage {
    fn recently_used_apps(&self, within: Duration) -> BTreeSet<String>;
}

/// Whether the user granted access to a data source.
pub trait Permissions {
    fn contacts_access_granted(&self) -> bool;
    fn history_access_granted(&self) -> bool;
}

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;

    /// Wall-clock time of day in the user's timezone.
    fn local_time(&self) -> NaiveTime;
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    pub now: DateTime<Utc>,
    pub local_time: NaiveTime,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>, local_time: NaiveTime) -> Self {
        Self { now, local_time }
    }

    /// Freeze the system clock at the current instant.
    pub fn capture() -> Self {
        let local = Local::now();
        Self {
            now: local.with_timezone(&Utc),
            local_time: local.time(),
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn local_time(&self) -> NaiveTime {
        self.local_time
    }
}

/// Borrowed collaborators for one evaluation.
#[derive(Clone, Copy)]
pub struct Sources<'a> {
    pub rules: &'a dyn RuleStore,
    pub contacts: &'a dyn ContactDirectory,
    pub history: &'a dyn CallHistory,
    pub apps: &'a dyn AppUsage,
    pub permissions: &'a dyn Permissions,
    pub clock: &'a dyn Clock,
}

/// Stored rule lists, one per category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleLists {
    pub number: Vec<PatternRule>,
    pub content: Vec<PatternRule>,
    pub quick_copy: Vec<PatternRule>,
}

impl RuleLists {
    pub fn category(&self, category: RuleCategory) -> &[PatternRule] {
        match category {
            RuleCategory::Number => &self.number,
            RuleCategory::Content => &self.content,
            RuleCategory::QuickCopy => &self.quick_copy,
        }
    }

    pub fn category_mut(&mut self, category: RuleCategory) -> &mut Vec<PatternRule> {
        match category {
            RuleCategory::Number => &mut self.number,
            RuleCategory::Content => &mut self.content,
            RuleCategory::QuickCopy => &mut self.quick_copy,
        }
    }
}

impl RuleStore for RuleLists {
    fn list_active_rules(&self, category: RuleCategory, mode: Mode) -> Vec<PatternRule> {
        self.category(category)
            .iter()
            .filter(|r| r.applies_to(mode))
            .cloned()
            .collect()
    }

    fn find_rule(&self, category: RuleCategory, id: i64) -> Option<PatternRule> {
        self.category(category).iter().find(|r| r.id == id).cloned()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Incoming,
    Outgoing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Call,
    Sms,
}

/// One call or message in the history log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub number: String,
    pub direction: Direction,
    pub channel: Channel,
    pub at: DateTime<Utc>,
}

/// Last time an application was in the foreground.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppUsageEntry {
    pub app: String,
    pub last_used: DateTime<Utc>,
}

/// Granted permissions. Everything is granted unless stated otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Grants {
    pub contacts: bool,
    pub history: bool,
}

impl Default for Grants {
    fn default() -> Self {
        Self {
            contacts: true,
            history: true,
        }
    }
}

impl Permissions for Grants {
    fn contacts_access_granted(&self) -> bool {
        self.contacts
    }

    fn history_access_granted(&self) -> bool {
        self.history
    }
}

/// In-memory collaborators.
#[derive(Debug, Clone)]
pub struct MemorySources {
    pub rules: RuleLists,
    pub contacts: Vec<Contact>,
    pub history: Vec<HistoryEntry>,
    pub app_usage: Vec<AppUsageEntry>,
    pub grants: Grants,
    pub clock: FixedClock,
}

impl MemorySources {
    pub fn new(clock: FixedClock) -> Self {
        Self {
            rules: RuleLists::default(),
            contacts: Vec::new(),
            history: Vec::new(),
            app_usage: Vec::new(),
            grants: Grants::default(),
            clock,
        }
    }

    pub fn sources(&self) -> Sources<'_> {
        Sources {
            rules: &self.rules,
            contacts: self,
            history: self,
            apps: self,
            permissions: &self.grants,
            clock: &self.clock,
        }
    }

    pub fn add_rule(&mut self, category: RuleCategory, rule: PatternRule) -> &mut Self {
        self.rules.category_mut(category).push(rule);
        self
    }

    pub fn add_contact(&mut self, name: impl Into<String>, number: impl Into<String>) -> &mut Self {
        self.contacts.push(Contact {
            name: name.into(),
            number: number.into(),
        });
        self
    }

    /// Record a history entry `ago` before the frozen clock.
    pub fn add_history(
        &mut self,
        number: impl Into<String>,
        direction: Direction,
        channel: Channel,
        ago: Duration,
    ) -> &mut Self {
        let at = self.before_now(ago);
        self.history.push(HistoryEntry {
            number: number.into(),
            direction,
            channel,
            at,
        });
        self
    }

    /// Record that `app` was used `ago` before the frozen clock.
    pub fn add_app_usage(&mut self, app: impl Into<String>, ago: Duration) -> &mut Self {
        let last_used = self.before_now(ago);
        self.app_usage.push(AppUsageEntry {
            app: app.into(),
            last_used,
        });
        self
    }

    fn before_now(&self, ago: Duration) -> DateTime<Utc> {
        chrono::Duration::from_std(ago)
            .ok()
            .and_then(|d| self.clock.now().checked_sub_signed(d))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    fn count_history(&self, number: &str, direction: Direction, within: Duration) -> u32 {
        let wanted = normalize_number(number);
        let since = self.before_now(within);
        let now = self.clock.now();
        let count = self
            .history
            .iter()
            .filter(|e| e.direction == direction)
            .filter(|e| e.at >= since && e.at <= now)
            .filter(|e| normalize_number(&e.number) == wanted)
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }
}

impl ContactDirectory for MemorySources {
    fn find_contact_by_number(&self, number: &str) -> Option<Contact> {
        let wanted = normalize_number(number);
        self.contacts
            .iter()
            .find(|c| normalize_number(&c.number) == wanted)
            .cloned()
    }
}

impl CallHistory for MemorySources {
    fn count_incoming(&self, number: &str, within: Duration) -> u32 {
        self.count_history(number, Direction::Incoming, within)
    }

    fn count_outgoing(&self, number: &str, within: Duration) -> u32 {
        self.count_history(number, Direction::Outgoing, within)
    }
}

impl AppUsage for MemorySources {
    fn recently_used_apps(&self, within: Duration) -> BTreeSet<String> {
        let since = self.before_now(within);
        let now = self.clock.now();
        self.app_usage
            .iter()
            .filter(|u| u.last_used >= since && u.last_used <= now)
            .map(|u| u.app.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn clock() -> FixedClock {
        FixedClock::new(
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
        )
    }

    const MINUTE: Duration = Duration::from_secs(60);

    #[test]
    fn test_contact_lookup_ignores_formatting() {
        let mut mem = MemorySources::new(clock());
        mem.add_contact("Alice", "+1 (555) 000-1111");

        let found = mem.find_contact_by_number("+15550001111").unwrap();
        assert_eq!(found.name, "Alice");
        assert!(mem.find_contact_by_number("+15550001112").is_none());
    }

    #[test]
    fn test_history_counts_window_and_direction() {
        let mut mem = MemorySources::new(clock());
        mem.add_history("555", Direction::Incoming, Channel::Call, MINUTE)
            .add_history("555", Direction::Incoming, Channel::Sms, 2 * MINUTE)
            .add_history("555", Direction::Incoming, Channel::Call, 30 * MINUTE)
            .add_history("555", Direction::Outgoing, Channel::Call, MINUTE)
            .add_history("666", Direction::Incoming, Channel::Call, MINUTE);

        assert_eq!(mem.count_incoming("555", 5 * MINUTE), 2);
        assert_eq!(mem.count_incoming("555", 60 * MINUTE), 3);
        assert_eq!(mem.count_outgoing("555", 5 * MINUTE), 1);
        assert_eq!(mem.count_outgoing("777", 5 * MINUTE), 0);
    }

    #[test]
    fn test_windows_end_at_clock_now() {
        let mut mem = MemorySources::new(clock());
        let later = clock().now() + chrono::Duration::minutes(1);
        mem.history.push(HistoryEntry {
            number: "555".into(),
            direction: Direction::Incoming,
            channel: Channel::Call,
            at: later,
        });
        mem.app_usage.push(AppUsageEntry {
            app: "com.example.taxi".into(),
            last_used: later,
        });

        assert_eq!(mem.count_incoming("555", 5 * MINUTE), 0);
        assert!(mem.recently_used_apps(5 * MINUTE).is_empty());
    }

    #[test]
    fn test_recent_apps_window() {
        let mut mem = MemorySources::new(clock());
        mem.add_app_usage("com.example.delivery", 2 * MINUTE)
            .add_app_usage("com.example.taxi", 20 * MINUTE);

        let apps = mem.recently_used_apps(5 * MINUTE);
        assert!(apps.contains("com.example.delivery"));
        assert!(!apps.contains("com.example.taxi"));
    }

    #[test]
    fn test_rule_lists_filter_by_mode() {
        let mut mem = MemorySources::new(clock());
        mem.add_rule(RuleCategory::Number, PatternRule::new(1, "1.*"))
            .add_rule(RuleCategory::Number, PatternRule::new(2, "2.*").only_for(Mode::Sms))
            .add_rule(RuleCategory::Number, PatternRule::new(3, "3.*"));

        let ids: Vec<i64> = mem
            .rules
            .list_active_rules(RuleCategory::Number, Mode::Call)
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![1, 3]);
        assert!(mem.rules.find_rule(RuleCategory::Number, 2).is_some());
        assert!(mem.rules.find_rule(RuleCategory::Content, 2).is_none());
    }
}
