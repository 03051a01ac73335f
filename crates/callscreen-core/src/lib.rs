//! # callscreen-core
//!
//! Deterministic call and SMS screening engine.
//!
//! This crate classifies an inbound call or message as allowed or blocked
//! by running a prioritized set of checkers and stopping at the first one
//! that produces a verdict.
//!
//! ## Key Guarantees
//!
//! 1. **Total**: every evaluation returns exactly one `Verdict`
//! 2. **Highest priority wins**: a lower priority checker never overrides a higher one
//! 3. **Deterministic**: equal priorities resolve by a fixed construction order
//! 4. **Stateless**: settings and rules are read fresh for every evaluation
//!
//! ## Example
//!
//! ```rust,ignore
//! use callscreen_core::{Profile, evaluate_sms, render_reason};
//!
//! let profile = Profile::from_file("profile.yaml")?;
//! let sources = profile.to_sources();
//! let verdict = evaluate_sms(&profile.settings, sources.sources(), "+15551234", "WIN CASH NOW");
//!
//! if verdict.blocks {
//!     println!("BLOCKED: {}", render_reason(&verdict, &sources.rules));
//! }
//! ```

pub mod checkers;
pub mod extractor;
pub mod normalize;
pub mod profile;
pub mod reason;
pub mod resolver;
pub mod rules;
pub mod settings;
pub mod sources;
pub mod types;

// Re-export main types at crate root
pub use checkers::{Checker, CheckerKind};
pub use extractor::{Extraction, QuickExtractor};
pub use normalize::normalize_number;
pub use profile::{Profile, ProfileError};
pub use reason::render_reason;
pub use resolver::{Resolution, Resolver, Step};
pub use rules::{Matcher, PatternError, PatternRule, RuleCategory, RuleFlags};
pub use settings::Settings;
pub use sources::{
    AppUsage, CallHistory, Clock, Contact, ContactDirectory, FixedClock, MemorySources,
    Permissions, RuleLists, RuleStore, Sources,
};
pub use types::{Attribution, Incoming, Mode, ResultCode, Verdict, VerificationStatus};

/// Screen an incoming call.
///
/// # Arguments
///
/// * `settings` - Configuration snapshot taken for this evaluation
/// * `sources` - Collaborators the checkers query
/// * `number` - Caller number as delivered by the platform
/// * `emergency` - Emergency-callback or network-identified emergency call
/// * `verification` - Caller verification outcome, if the platform supplied one
pub fn evaluate_call(
    settings: &Settings,
    sources: Sources<'_>,
    number: &str,
    emergency: bool,
    verification: Option<VerificationStatus>,
) -> Verdict {
    Resolver::new(settings, sources).evaluate_call(number, emergency, verification)
}

/// Screen an incoming SMS.
pub fn evaluate_sms(settings: &Settings, sources: Sources<'_>, number: &str, body: &str) -> Verdict {
    Resolver::new(settings, sources).evaluate_sms(number, body)
}

/// Extract a value from `body` using the store's quick-copy rules.
pub fn extract_quick_value(rules: &dyn RuleStore, body: &str) -> Option<Extraction> {
    QuickExtractor::new(rules).extract(body)
}
