//! Resolver: assembles the checker set for an event and picks the winner.
//!
//! The resolution law is fixed:
//! 1. Built-in checkers valid for the mode are assembled in a fixed order
//! 2. Number rules, then content rules (SMS only), are appended in storage order
//! 3. The list is stably sorted by priority, highest first
//! 4. The first checker that produces a verdict wins
//! 5. If none does, the event is allowed with the default code
//!
//! Construction order is the tie-break between equal priorities. Checkers are
//! evaluated sequentially and evaluation stops at the first verdict, so a lower
//! priority checker can never override a higher one.

use serde::Serialize;

use crate::checkers::{
    Checker, CheckerKind, ContactChecker, ContentRuleChecker, EmergencyChecker, NumberRuleChecker,
    QuietHoursChecker, RecentAppChecker, RecentlyDialedChecker, RepeatedContactChecker,
    VerificationChecker,
};
use crate::extractor::{Extraction, QuickExtractor};
use crate::rules::{PatternError, PatternRule, RuleCategory};
use crate::settings::Settings;
use crate::sources::Sources;
use crate::types::{Incoming, Mode, Verdict, VerificationStatus};

/// A checker that was consulted during resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Step {
    pub kind: CheckerKind,
    pub priority: i32,
    pub matched: bool,
}

/// The verdict plus the checkers consulted to reach it, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub verdict: Verdict,
    pub steps: Vec<Step>,
}

/// Evaluates calls and messages against one settings snapshot.
pub struct Resolver<'a> {
    settings: &'a Settings,
    sources: Sources<'a>,
}

impl<'a> Resolver<'a> {
    pub fn new(settings: &'a Settings, sources: Sources<'a>) -> Self {
        Self { settings, sources }
    }

    /// Screen an incoming call.
    pub fn evaluate_call(
        &self,
        number: &str,
        emergency: bool,
        verification: Option<VerificationStatus>,
    ) -> Verdict {
        self.evaluate(&Incoming::call(number, emergency, verification))
    }

    /// Screen an incoming SMS.
    pub fn evaluate_sms(&self, number: &str, body: &str) -> Verdict {
        self.evaluate(&Incoming::sms(number, body))
    }

    pub fn evaluate(&self, incoming: &Incoming) -> Verdict {
        self.resolve(incoming).verdict
    }

    /// Evaluate and keep the trail of consulted checkers.
    pub fn resolve(&self, incoming: &Incoming) -> Resolution {
        let checkers = self.checkers(incoming.mode);
        resolve(&checkers, incoming)
    }

    /// Pull a value out of `body` with the quick-copy rules.
    pub fn extract_quick_value(&self, body: &str) -> Option<Extraction> {
        QuickExtractor::new(self.sources.rules).extract(body)
    }

    /// The checker list for `mode`, sorted in evaluation order.
    pub fn checkers(&self, mode: Mode) -> Vec<Box<dyn Checker + 'a>> {
        let mut checkers = self.builtin_checkers(mode);
        checkers.extend(self.rule_checkers(mode));

        // stable: equal priorities keep construction order
        checkers.sort_by(|a, b| b.priority().cmp(&a.priority()));
        checkers
    }

    fn builtin_checkers(&self, mode: Mode) -> Vec<Box<dyn Checker + 'a>> {
        let settings = self.settings;
        let src = self.sources;

        let mut checkers: Vec<Box<dyn Checker + 'a>> = Vec::new();
        if mode == Mode::Call {
            checkers.push(Box::new(EmergencyChecker::new()));
            checkers.push(Box::new(VerificationChecker::new(settings)));
        }
        checkers.push(Box::new(ContactChecker::new(settings, src.contacts, src.permissions)));
        if mode == Mode::Call {
            checkers.push(Box::new(RepeatedContactChecker::new(settings, src.history, src.permissions)));
            checkers.push(Box::new(RecentlyDialedChecker::new(settings, src.history, src.permissions)));
            checkers.push(Box::new(RecentAppChecker::new(settings, src.apps)));
        }
        checkers.push(Box::new(QuietHoursChecker::new(settings, src.clock)));
        checkers
    }

    fn rule_checkers(&self, mode: Mode) -> Vec<Box<dyn Checker + 'a>> {
        let mut checkers: Vec<Box<dyn Checker + 'a>> = Vec::new();

        for rule in self.sources.rules.list_active_rules(RuleCategory::Number, mode) {
            if let Some(checker) = skip_malformed(rule, NumberRuleChecker::new) {
                checkers.push(Box::new(checker));
            }
        }

        if mode == Mode::Sms {
            for rule in self.sources.rules.list_active_rules(RuleCategory::Content, mode) {
                if let Some(checker) = skip_malformed(rule, ContentRuleChecker::new) {
                    checkers.push(Box::new(checker));
                }
            }
        }

        checkers
    }
}

/// Build a rule checker, logging and dropping rules whose pattern is broken.
fn skip_malformed<C>(
    rule: PatternRule,
    build: impl FnOnce(PatternRule) -> Result<C, PatternError>,
) -> Option<C> {
    match build(rule) {
        Ok(checker) => Some(checker),
        Err(e) => {
            tracing::warn!(rule_id = e.rule_id, error = %e, "Skipping malformed rule");
            None
        }
    }
}

/// First-match-wins over checkers already in evaluation order.
pub fn resolve(checkers: &[Box<dyn Checker + '_>], incoming: &Incoming) -> Resolution {
    let mut steps = Vec::new();

    for checker in checkers {
        let kind = checker.kind();
        let priority = checker.priority();

        match checker.evaluate(incoming) {
            Some(verdict) => {
                tracing::debug!(
                    checker = ?kind,
                    priority,
                    blocks = verdict.blocks,
                    "Checker produced verdict"
                );
                steps.push(Step {
                    kind,
                    priority,
                    matched: true,
                });
                return Resolution { verdict, steps };
            }
            None => {
                tracing::trace!(checker = ?kind, priority, "Checker abstained");
                steps.push(Step {
                    kind,
                    priority,
                    matched: false,
                });
            }
        }
    }

    tracing::debug!(mode = ?incoming.mode, consulted = steps.len(), "No checker matched, allowing");
    Resolution {
        verdict: Verdict::no_match(),
        steps,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkers::test_support::memory;
    use crate::settings::{DEFAULT_BUILTIN_PRIORITY, PRIORITY_MAX};
    use crate::types::{Attribution, ResultCode};

    fn kinds(checkers: &[Box<dyn Checker + '_>]) -> Vec<CheckerKind> {
        checkers.iter().map(|c| c.kind()).collect()
    }

    #[test]
    fn test_call_builtins_in_construction_order() {
        let mem = memory();
        let settings = Settings::default();
        let resolver = Resolver::new(&settings, mem.sources());

        assert_eq!(
            kinds(&resolver.checkers(Mode::Call)),
            vec![
                CheckerKind::Emergency,
                CheckerKind::IdentityVerification,
                CheckerKind::Contact,
                CheckerKind::RepeatedContact,
                CheckerKind::RecentlyDialed,
                CheckerKind::RecentForegroundApp,
                CheckerKind::QuietHours,
            ]
        );
    }

    #[test]
    fn test_sms_builtins_and_rules() {
        let mut mem = memory();
        mem.add_rule(RuleCategory::Content, PatternRule::new(2, ".*"))
            .add_rule(RuleCategory::Number, PatternRule::new(1, ".*"));
        let settings = Settings::default();
        let resolver = Resolver::new(&settings, mem.sources());

        assert_eq!(
            kinds(&resolver.checkers(Mode::Sms)),
            vec![
                CheckerKind::Contact,
                CheckerKind::QuietHours,
                CheckerKind::NumberRule,
                CheckerKind::ContentRule,
            ]
        );
        // content rules never apply to calls
        assert!(!kinds(&resolver.checkers(Mode::Call)).contains(&CheckerKind::ContentRule));
    }

    #[test]
    fn test_sorted_by_priority_descending() {
        let mut mem = memory();
        mem.add_rule(RuleCategory::Number, PatternRule::new(1, "1").with_priority(5))
            .add_rule(RuleCategory::Number, PatternRule::new(2, "2").with_priority(50));
        let mut settings = Settings::default();
        settings.contacts.exclusive = true;
        let resolver = Resolver::new(&settings, mem.sources());

        let priorities: Vec<i32> = resolver
            .checkers(Mode::Call)
            .iter()
            .map(|c| c.priority())
            .collect();
        assert_eq!(priorities[0], PRIORITY_MAX);
        assert_eq!(priorities[1], PRIORITY_MAX);
        assert_eq!(priorities[2], 50);
        assert_eq!(*priorities.last().unwrap(), 5);
        assert!(priorities.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_equal_priority_keeps_storage_order() {
        let mut mem = memory();
        mem.add_rule(RuleCategory::Number, PatternRule::new(7, "555.*").blocking())
            .add_rule(RuleCategory::Number, PatternRule::new(3, "5551.*"));
        let settings = Settings::default();
        let resolver = Resolver::new(&settings, mem.sources());

        let verdict = resolver.evaluate_call("5551234", false, None);
        assert_eq!(verdict.matched_rule_id(), Some(7));
        assert!(verdict.blocks);
    }

    #[test]
    fn test_builtin_wins_tie_with_rule() {
        let mut mem = memory();
        mem.add_contact("Bob", "5551234");
        mem.add_rule(
            RuleCategory::Number,
            PatternRule::new(1, ".*").blocking().with_priority(DEFAULT_BUILTIN_PRIORITY),
        );
        let mut settings = Settings::default();
        settings.contacts.enabled = true;
        let resolver = Resolver::new(&settings, mem.sources());

        let verdict = resolver.evaluate_call("5551234", false, None);
        assert_eq!(verdict.code, ResultCode::Contact);
        assert_eq!(verdict.attribution, Some(Attribution::ContactName("Bob".into())));
    }

    #[test]
    fn test_short_circuits_at_first_verdict() {
        let mut mem = memory();
        mem.add_rule(RuleCategory::Number, PatternRule::new(1, ".*").with_priority(100))
            .add_rule(RuleCategory::Number, PatternRule::new(2, ".*").blocking());
        let settings = Settings::default();
        let resolver = Resolver::new(&settings, mem.sources());

        let resolution = resolver.resolve(&Incoming::call("5551234", false, None));
        assert_eq!(resolution.verdict.matched_rule_id(), Some(1));
        let last = resolution.steps.last().unwrap();
        assert!(last.matched);
        assert_eq!(last.kind, CheckerKind::NumberRule);
        assert_eq!(last.priority, 100);
        // rule 2 was never consulted
        assert_eq!(
            resolution
                .steps
                .iter()
                .filter(|s| s.kind == CheckerKind::NumberRule)
                .count(),
            1
        );
    }

    #[test]
    fn test_malformed_rule_does_not_abort() {
        let mut mem = memory();
        mem.add_rule(RuleCategory::Number, PatternRule::new(1, "(").with_priority(100))
            .add_rule(RuleCategory::Number, PatternRule::new(2, "555.*").blocking());
        let settings = Settings::default();
        let resolver = Resolver::new(&settings, mem.sources());

        let verdict = resolver.evaluate_call("5551234", false, None);
        assert_eq!(verdict.matched_rule_id(), Some(2));
    }

    #[test]
    fn test_default_when_nothing_matches() {
        let mem = memory();
        let settings = Settings::default();
        let resolver = Resolver::new(&settings, mem.sources());

        let resolution = resolver.resolve(&Incoming::sms("5551234", "hello"));
        assert_eq!(resolution.verdict, Verdict::no_match());
        assert!(resolution.steps.iter().all(|s| !s.matched));
    }

    #[test]
    fn test_quick_extraction_uses_store() {
        let mut mem = memory();
        mem.add_rule(RuleCategory::QuickCopy, PatternRule::new(1, r"code (\d+)"));
        let settings = Settings::default();
        let resolver = Resolver::new(&settings, mem.sources());

        let found = resolver.extract_quick_value("Your code 5521").unwrap();
        assert_eq!(found.value, "5521");
        assert!(resolver.extract_quick_value("nothing").is_none());
    }
}
