//! Caller identity verification (STIR/SHAKEN style attestation).
//!
//! ## Decision table
//!
//! | Mode | Passed | Failed | Not verified |
//! |------|--------|--------|--------------|
//! | exclusive | abstain | block | block if `include_unverified` |
//! | non-exclusive | allow | abstain | allow if `include_unverified` |
//!
//! A failed verification outside exclusive mode is deliberately left to
//! lower-priority checkers.

use crate::settings::{Settings, VerificationSettings};
use crate::types::{Attribution, Incoming, Verdict, VerificationStatus};

use super::{allow, block, Checker, CheckerKind};

pub struct VerificationChecker<'a> {
    settings: &'a VerificationSettings,
    platform_supported: bool,
    priority: i32,
}

impl<'a> VerificationChecker<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self {
            settings: &settings.verification,
            platform_supported: settings.platform.supports_verification,
            priority: settings.verification_priority(),
        }
    }
}

impl Checker for VerificationChecker<'_> {
    fn kind(&self) -> CheckerKind {
        CheckerKind::IdentityVerification
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn evaluate(&self, incoming: &Incoming) -> Option<Verdict> {
        if !self.settings.enabled || !self.platform_supported {
            return None;
        }
        let status = incoming.verification?;
        let unverified_counts =
            status == VerificationStatus::NotVerified && self.settings.include_unverified;

        let verdict = if self.settings.exclusive {
            if status == VerificationStatus::Failed || unverified_counts {
                block(self.kind())
            } else {
                return None;
            }
        } else if status == VerificationStatus::Passed || unverified_counts {
            allow(self.kind())
        } else {
            return None;
        };

        Some(verdict.attributed(Attribution::Verification(status)))
    }
}
