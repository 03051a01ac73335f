//! Human-readable reasons for verdicts.
//!
//! Pure presentation: the engine never reads these strings. Verdicts are
//! often rendered long after they were recorded, so a rule referenced by id
//! may have been deleted in the meantime; that renders as a placeholder.

use crate::rules::RuleCategory;
use crate::sources::RuleStore;
use crate::types::{Attribution, ResultCode, Verdict, VerificationStatus};

/// Render the reason for `verdict`, resolving rule ids through `rules`.
pub fn render_reason(verdict: &Verdict, rules: &dyn RuleStore) -> String {
    let attribution = verdict.attribution.as_ref();

    match verdict.code {
        ResultCode::Default => "No rule matched".to_string(),
        ResultCode::Emergency => "Emergency call".to_string(),
        ResultCode::IdentityVerification => match attribution {
            Some(Attribution::Verification(status)) => verification_text(verdict.blocks, *status),
            _ => decision_text(verdict.blocks, "caller verification"),
        },
        ResultCode::Contact => match attribution {
            Some(Attribution::ContactName(name)) => format!("Contact: {}", name),
            _ if verdict.blocks => "Not a contact".to_string(),
            _ => "Contact".to_string(),
        },
        ResultCode::RepeatedContact => "Repeated call".to_string(),
        ResultCode::RecentlyDialed => "Recently dialed".to_string(),
        ResultCode::QuietHours => "Quiet hours".to_string(),
        ResultCode::RecentForegroundApp => match attribution {
            Some(Attribution::ForegroundAppId(app)) => format!("Recent app: {}", app),
            _ => "Recent app".to_string(),
        },
        ResultCode::NumberRule => rule_text(verdict, RuleCategory::Number, rules),
        ResultCode::ContentRule => rule_text(verdict, RuleCategory::Content, rules),
    }
}

fn decision_text(blocks: bool, subject: &str) -> String {
    if blocks {
        format!("Blocked by {}", subject)
    } else {
        format!("Allowed by {}", subject)
    }
}

fn verification_text(blocks: bool, status: VerificationStatus) -> String {
    let status = match status {
        VerificationStatus::Passed => "passed",
        VerificationStatus::Failed => "failed",
        VerificationStatus::NotVerified => "unverified",
    };
    format!("{} ({})", decision_text(blocks, "caller verification"), status)
}

fn rule_text(verdict: &Verdict, category: RuleCategory, rules: &dyn RuleStore) -> String {
    let Some(id) = verdict.matched_rule_id() else {
        return decision_text(verdict.blocks, "rule");
    };

    match rules.find_rule(category, id) {
        Some(rule) if !rule.description.is_empty() => rule.description,
        Some(rule) => rule.pattern,
        None => format!("deleted rule #{}", id),
    }
}
