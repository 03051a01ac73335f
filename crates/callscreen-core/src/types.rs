//! Core data model: inbound events, verdicts and their attribution.

use serde::{Deserialize, Serialize};

use crate::normalize::normalize_number;

/// Whether the event being screened is a phone call or an SMS message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Call,
    Sms,
}

/// Caller identity verification outcome as resolved by the telecom stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Passed,
    Failed,
    NotVerified,
}

/// Which rule class produced a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultCode {
    /// No checker matched.
    Default,
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

impl ResultCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultCode::Default => "default",
            ResultCode::Emergency => "emergency",
            ResultCode::IdentityVerification => "identity_verification",
            ResultCode::Contact => "contact",
            ResultCode::RepeatedContact => "repeated_contact",
            ResultCode::RecentlyDialed => "recently_dialed",
            ResultCode::QuietHours => "quiet_hours",
            ResultCode::RecentForegroundApp => "recent_foreground_app",
            ResultCode::NumberRule => "number_rule",
            ResultCode::ContentRule => "content_rule",
        }
    }
}

impl std::fmt::Display for ResultCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What caused a verdict. Exactly one kind is ever recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum Attribution {
    ContactName(String),
    MatchedRuleId(i64),
    ForegroundAppId(String),
    Verification(VerificationStatus),
}

/// The allow/block decision plus its causal attribution.
///
/// Verdicts are built once by the checker that matched and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub blocks: bool,
    pub code: ResultCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribution: Option<Attribution>,
}

impl Verdict {
    pub fn allow(code: ResultCode) -> Self {
        Self {
            blocks: false,
            code,
            attribution: None,
        }
    }

    pub fn block(code: ResultCode) -> Self {
        Self {
            blocks: true,
            code,
            attribution: None,
        }
    }

    /// Allow or block depending on `blocks`.
    pub fn decide(blocks: bool, code: ResultCode) -> Self {
        Self {
            blocks,
            code,
            attribution: None,
        }
    }

    pub fn attributed(mut self, attribution: Attribution) -> Self {
        self.attribution = Some(attribution);
        self
    }

    /// The fallback verdict when nothing matched.
    pub fn no_match() -> Self {
        Self::allow(ResultCode::Default)
    }

    pub fn is_default(&self) -> bool {
        self.code == ResultCode::Default
    }

    pub fn matched_rule_id(&self) -> Option<i64> {
        match self.attribution {
            Some(Attribution::MatchedRuleId(id)) => Some(id),
            _ => None,
        }
    }
}

/// One inbound call or message, as seen by every checker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Incoming {
    pub mode: Mode,

    /// Number exactly as delivered by the platform
    pub raw_number: String,

    /// Number with formatting characters stripped
    pub number: String,

    /// Message body (SMS only)
    pub body: Option<String>,

    /// Emergency-callback or network-identified emergency call
    pub emergency: bool,

    /// Resolved caller verification, if the platform supplied one
    pub verification: Option<VerificationStatus>,
}

impl Incoming {
    pub fn call(
        raw_number: impl Into<String>,
        emergency: bool,
        verification: Option<VerificationStatus>,
    ) -> Self {
        let raw_number = raw_number.into();
        Self {
            mode: Mode::Call,
            number: normalize_number(&raw_number),
            raw_number,
            body: None,
            emergency,
            verification,
        }
    }

    pub fn sms(raw_number: impl Into<String>, body: impl Into<String>) -> Self {
        let raw_number = raw_number.into();
        Self {
            mode: Mode::Sms,
            number: normalize_number(&raw_number),
            raw_number,
            body: Some(body.into()),
            emergency: false,
            verification: None,
        }
    }
}
