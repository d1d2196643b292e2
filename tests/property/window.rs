use proptest::prelude::*;
use semantic_manifest::enums::TimeGranularity;
use semantic_manifest::primitives::parse_window;

fn arb_grain() -> impl Strategy<Value = TimeGranularity> {
    prop::sample::select(TimeGranularity::ALL.to_vec())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn singular_and_plural_windows_parse(count in 0u64..100_000, grain in arb_grain(), plural in any::<bool>()) {
        let window = format!("{} {}{}", count, grain.as_str(), if plural { "s" } else { "" });
        let parsed = parse_window(&window, &[]);
        prop_assert!(parsed.is_ok(), "{:?}: {:?}", window, parsed);
        let parsed = parsed.unwrap();
        prop_assert_eq!(parsed.count, count);
        prop_assert_eq!(parsed.granularity, grain.as_str());
    }

    #[test]
    fn granularity_is_case_insensitive(count in 1u64..1000, grain in arb_grain()) {
        let window = format!("{} {}", count, grain.as_str().to_uppercase());
        let parsed = parse_window(&window, &[]).unwrap();
        prop_assert_eq!(parsed.granularity, grain.as_str());
    }

    #[test]
    fn unknown_granularities_are_rejected(count in 1u64..1000, grain in "[a-z]{3,10}") {
        prop_assume!(TimeGranularity::from_name(&grain).is_none());
        prop_assume!(grain.strip_suffix('s').is_none_or(|g| TimeGranularity::from_name(g).is_none()));
        let window = format!("{} {}", count, grain);
        prop_assert!(parse_window(&window, &[]).is_err());
    }

    #[test]
    fn custom_granularity_windows_parse(count in 1u64..1000, custom in "[a-z]{3,6}_[a-z]{3,6}") {
        let window = format!("{} {}", count, custom);
        let parsed = parse_window(&window, &[custom.clone()]).unwrap();
        prop_assert_eq!(parsed.granularity, custom);
    }

    #[test]
    fn malformed_windows_are_rejected(words in prop::collection::vec("[a-z0-9]{1,5}", 0..5)) {
        prop_assume!(words.len() != 2);
        prop_assert!(parse_window(&words.join(" "), &[]).is_err());
    }
}
