//! Checkers: independent policy predicates that allow, block or abstain.
//!
//! Every checker exposes a priority and a single `evaluate` operation. The
//! contract is total: a checker whose preconditions are unmet (feature off,
//! permission missing, no signal, no body) abstains with `None` instead of
//! failing, so the resolver can call any of them unconditionally.

mod contact;
mod emergency;
mod history;
mod pattern;
mod quiet_hours;
mod recent_app;
mod verification;

pub use contact::ContactChecker;
pub use emergency::EmergencyChecker;
pub use history::{RecentlyDialedChecker, RepeatedContactChecker};
pub use pattern::{ContentRuleChecker, NumberRuleChecker};
pub use quiet_hours::QuietHoursChecker;
pub use recent_app::RecentAppChecker;
pub use verification::VerificationChecker;

use serde::{Deserialize, Serialize};

use crate::types::{Incoming, ResultCode, Verdict};

/// The closed set of checker variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckerKind {
    Emergency,
    IdentityVerification,
    Contact,
    RepeatedContact,
    RecentlyDialed,
    QuietHours,
    RecentForegroundApp,
    NumberRule,
    ContentRule,
}

impl CheckerKind {
    /// The result code carried by verdicts from this kind of checker.
    pub fn result_code(&self) -> ResultCode {
        match self {
            CheckerKind::Emergency => ResultCode::Emergency,
            CheckerKind::IdentityVerification => ResultCode::IdentityVerification,
            CheckerKind::Contact => ResultCode::Contact,
            CheckerKind::RepeatedContact => ResultCode::RepeatedContact,
            CheckerKind::RecentlyDialed => ResultCode::RecentlyDialed,
            CheckerKind::QuietHours => ResultCode::QuietHours,
            CheckerKind::RecentForegroundApp => ResultCode::RecentForegroundApp,
            CheckerKind::NumberRule => ResultCode::NumberRule,
            CheckerKind::ContentRule => ResultCode::ContentRule,
        }
    }
}

/// A single policy predicate.
pub trait Checker {
    fn kind(&self) -> CheckerKind;

    /// Higher evaluates first.
    fn priority(&self) -> i32;

    /// Produce a verdict, or `None` to let the next checker decide.
    fn evaluate(&self, incoming: &Incoming) -> Option<Verdict>;
}

/// Allow verdict tagged with the checker's result code.
pub(crate) fn allow(kind: CheckerKind) -> Verdict {
    Verdict::allow(kind.result_code())
}

/// Block verdict tagged with the checker's result code.
pub(crate) fn block(kind: CheckerKind) -> Verdict {
    Verdict::block(kind.result_code())
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{NaiveTime, TimeZone, Utc};

    use crate::sources::{FixedClock, MemorySources};

    /// 2024-05-01 12:00 UTC, 14:00 local.
    pub fn clock() -> FixedClock {
        FixedClock::new(
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
        )
    }

    pub fn memory() -> MemorySources {
        MemorySources::new(clock())
    }
}
