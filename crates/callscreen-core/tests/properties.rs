//! Property tests for the resolution laws.

use callscreen_core::{
    evaluate_call, evaluate_sms, FixedClock, MemorySources, PatternRule, ResultCode, RuleCategory,
    Settings, VerificationStatus,
};
use chrono::{NaiveTime, TimeZone, Utc};
use proptest::prelude::*;

fn memory() -> MemorySources {
    MemorySources::new(FixedClock::new(
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
    ))
}

fn any_status() -> impl Strategy<Value = Option<VerificationStatus>> {
    prop_oneof![
        Just(None),
        Just(Some(VerificationStatus::Passed)),
        Just(Some(VerificationStatus::Failed)),
        Just(Some(VerificationStatus::NotVerified)),
    ]
}

fn any_settings() -> impl Strategy<Value = Settings> {
    (any::<[bool; 8]>(), 1u32..5).prop_map(|(flags, times)| {
        let mut s = Settings::default();
        s.verification.enabled = flags[0];
        s.verification.exclusive = flags[1];
        s.verification.include_unverified = flags[2];
        s.contacts.enabled = flags[3];
        s.contacts.exclusive = flags[4];
        s.repeated.enabled = flags[5];
        s.repeated.times = times;
        s.dialed.enabled = flags[6];
        s.quiet_hours.enabled = flags[7];
        s
    })
}

proptest! {
    #[test]
    fn emergency_always_allows(
        settings in any_settings(),
        status in any_status(),
        number in "[0-9+]{1,12}",
        rule_priority in any::<i32>(),
    ) {
        let mut mem = memory();
        mem.add_rule(
            RuleCategory::Number,
            PatternRule::new(1, ".*").blocking().with_priority(rule_priority),
        );

        let verdict = evaluate_call(&settings, mem.sources(), &number, true, status);
        prop_assert!(!verdict.blocks);
        prop_assert_eq!(verdict.code, ResultCode::Emergency);
    }

    #[test]
    fn higher_priority_rule_wins(
        p1 in -1000i32..1000,
        p2 in -1000i32..1000,
        number in "[0-9]{3,10}",
    ) {
        prop_assume!(p1 != p2);
        let mut mem = memory();
        mem.add_rule(RuleCategory::Number, PatternRule::new(1, ".*").blocking().with_priority(p1))
            .add_rule(RuleCategory::Number, PatternRule::new(2, ".*").with_priority(p2));

        let verdict = evaluate_call(&Settings::default(), mem.sources(), &number, false, None);
        let expected = if p1 > p2 { 1 } else { 2 };
        prop_assert_eq!(verdict.matched_rule_id(), Some(expected));
        prop_assert_eq!(verdict.blocks, expected == 1);
    }

    #[test]
    fn number_rules_never_match_a_longer_number(
        digits in "[0-9]{1,8}",
        suffix in "[0-9]{1,4}",
    ) {
        let mut mem = memory();
        mem.add_rule(RuleCategory::Number, PatternRule::new(1, digits.clone()).blocking());

        let longer = format!("{}{}", digits, suffix);
        let verdict = evaluate_call(&Settings::default(), mem.sources(), &longer, false, None);
        prop_assert!(verdict.is_default());

        let exact = evaluate_call(&Settings::default(), mem.sources(), &digits, false, None);
        prop_assert!(exact.blocks);
    }

    #[test]
    fn sms_evaluation_is_total(
        settings in any_settings(),
        number in "\\PC{0,16}",
        body in "\\PC{0,64}",
    ) {
        let mut mem = memory();
        mem.add_rule(RuleCategory::Content, PatternRule::new(1, "(").blocking())
            .add_rule(RuleCategory::Content, PatternRule::new(2, ".*free.*").blocking());

        let verdict = evaluate_sms(&settings, mem.sources(), &number, &body);
        if verdict.code == ResultCode::ContentRule {
            prop_assert_eq!(verdict.matched_rule_id(), Some(2));
        }
    }
}
