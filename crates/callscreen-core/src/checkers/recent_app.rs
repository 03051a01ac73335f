//! Allow calls while the user recently had a configured app in the foreground,
//! e.g. a delivery driver calling right after an order was placed.

use std::time::Duration;

use crate::settings::{RecentAppSettings, Settings, DEFAULT_BUILTIN_PRIORITY};
use crate::sources::AppUsage;
use crate::types::{Attribution, Incoming, Verdict};

use super::{allow, Checker, CheckerKind};

pub struct RecentAppChecker<'a> {
    settings: &'a RecentAppSettings,
    apps: &'a dyn AppUsage,
}

impl<'a> RecentAppChecker<'a> {
    pub fn new(settings: &'a Settings, apps: &'a dyn AppUsage) -> Self {
        Self {
            settings: &settings.recent_apps,
            apps,
        }
    }
}

impl Checker for RecentAppChecker<'_> {
    fn kind(&self) -> CheckerKind {
        CheckerKind::RecentForegroundApp
    }

    fn priority(&self) -> i32 {
        DEFAULT_BUILTIN_PRIORITY
    }

    fn evaluate(&self, _incoming: &Incoming) -> Option<Verdict> {
        if self.settings.apps.is_empty() {
            return None;
        }

        let window = Duration::from_secs(u64::from(self.settings.within_minutes) * 60);
        let used = self.apps.recently_used_apps(window);

        self.settings
            .apps
            .iter()
            .find(|app| used.contains(app.as_str()))
            .map(|app| allow(self.kind()).attributed(Attribution::ForegroundAppId(app.clone())))
    }
}
