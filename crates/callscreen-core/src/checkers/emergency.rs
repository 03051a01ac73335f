//! Emergency calls always ring through.

use crate::settings::PRIORITY_MAX;
use crate::types::{Incoming, Verdict};

use super::{allow, Checker, CheckerKind};

/// Allows emergency-callback and network-identified emergency calls.
pub struct EmergencyChecker;

impl EmergencyChecker {
    pub fn new() -> Self {
        Self
    }
}

impl Default for EmergencyChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl Checker for EmergencyChecker {
    fn kind(&self) -> CheckerKind {
        CheckerKind::Emergency
    }

    fn priority(&self) -> i32 {
        PRIORITY_MAX
    }

    fn evaluate(&self, incoming: &Incoming) -> Option<Verdict> {
        incoming.emergency.then(|| allow(self.kind()))
    }
}
