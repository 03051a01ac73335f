//! Time-of-day allow window.

use crate::settings::{QuietHoursSettings, Settings, DEFAULT_BUILTIN_PRIORITY};
use crate::sources::Clock;
use crate::types::{Incoming, Verdict};

use super::{allow, Checker, CheckerKind};

pub struct QuietHoursChecker<'a> {
    settings: &'a QuietHoursSettings,
    clock: &'a dyn Clock,
}

impl<'a> QuietHoursChecker<'a> {
    pub fn new(settings: &'a Settings, clock: &'a dyn Clock) -> Self {
        Self {
            settings: &settings.quiet_hours,
            clock,
        }
    }
}

impl Checker for QuietHoursChecker<'_> {
    fn kind(&self) -> CheckerKind {
        CheckerKind::QuietHours
    }

    fn priority(&self) -> i32 {
        DEFAULT_BUILTIN_PRIORITY
    }

    fn evaluate(&self, _incoming: &Incoming) -> Option<Verdict> {
        if !self.settings.enabled {
            return None;
        }
        self.settings
            .contains(self.clock.local_time())
            .then(|| allow(self.kind()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkers::test_support::clock;
    use chrono::NaiveTime;

    fn settings(start: (u32, u32), end: (u32, u32)) -> Settings {
        let mut settings = Settings::default();
        settings.quiet_hours = QuietHoursSettings {
            enabled: true,
            start: NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
            end: NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
        };
        settings
    }

    #[test]
    fn test_inside_window_allows() {
        // test clock reads 14:00 local
        let s = settings((13, 0), (15, 0));
        let c = clock();
        let verdict = QuietHoursChecker::new(&s, &c)
            .evaluate(&Incoming::call("5551234", false, None))
            .unwrap();
        assert!(!verdict.blocks);
    }

    #[test]
    fn test_outside_window_abstains() {
        let s = settings((22, 0), (7, 0));
        let c = clock();
        assert!(QuietHoursChecker::new(&s, &c)
            .evaluate(&Incoming::sms("5551234", "hi"))
            .is_none());
    }

    #[test]
    fn test_disabled_abstains() {
        let mut s = settings((0, 0), (0, 0));
        s.quiet_hours.enabled = false;
        let c = clock();
        assert!(QuietHoursChecker::new(&s, &c)
            .evaluate(&Incoming::call("5551234", false, None))
            .is_none());
    }
}
