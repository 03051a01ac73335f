//! History-based checkers: repeated attempts and recently dialed numbers.

use std::time::Duration;

use crate::settings::{DialedSettings, RepeatedSettings, Settings, DEFAULT_BUILTIN_PRIORITY};
use crate::sources::{CallHistory, Permissions};
use crate::types::{Incoming, Verdict};

use super::{allow, Checker, CheckerKind};

const SECS_PER_MINUTE: u64 = 60;
const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// Allows a number that called or texted often enough within the window.
pub struct RepeatedContactChecker<'a> {
    settings: &'a RepeatedSettings,
    history: &'a dyn CallHistory,
    permissions: &'a dyn Permissions,
}

impl<'a> RepeatedContactChecker<'a> {
    pub fn new(
        settings: &'a Settings,
        history: &'a dyn CallHistory,
        permissions: &'a dyn Permissions,
    ) -> Self {
        Self {
            settings: &settings.repeated,
            history,
            permissions,
        }
    }
}

impl Checker for RepeatedContactChecker<'_> {
    fn kind(&self) -> CheckerKind {
        CheckerKind::RepeatedContact
    }

    fn priority(&self) -> i32 {
        DEFAULT_BUILTIN_PRIORITY
    }

    fn evaluate(&self, incoming: &Incoming) -> Option<Verdict> {
        if !self.settings.enabled || !self.permissions.history_access_granted() {
            return None;
        }

        let window = Duration::from_secs(u64::from(self.settings.within_minutes) * SECS_PER_MINUTE);
        let attempts = self.history.count_incoming(&incoming.number, window);

        (attempts >= self.settings.times).then(|| allow(self.kind()))
    }
}

/// Allows a number the user called or texted within the window.
pub struct RecentlyDialedChecker<'a> {
    settings: &'a DialedSettings,
    history: &'a dyn CallHistory,
    permissions: &'a dyn Permissions,
}

impl<'a> RecentlyDialedChecker<'a> {
    pub fn new(
        settings: &'a Settings,
        history: &'a dyn CallHistory,
        permissions: &'a dyn Permissions,
    ) -> Self {
        Self {
            settings: &settings.dialed,
            history,
            permissions,
        }
    }
}

impl Checker for RecentlyDialedChecker<'_> {
    fn kind(&self) -> CheckerKind {
        CheckerKind::RecentlyDialed
    }

    fn priority(&self) -> i32 {
        DEFAULT_BUILTIN_PRIORITY
    }

    fn evaluate(&self, incoming: &Incoming) -> Option<Verdict> {
        if !self.settings.enabled || !self.permissions.history_access_granted() {
            return None;
        }

        let window = Duration::from_secs(u64::from(self.settings.within_days) * SECS_PER_DAY);
        let outgoing = self.history.count_outgoing(&incoming.number, window);

        (outgoing > 0).then(|| allow(self.kind()))
    }
}
