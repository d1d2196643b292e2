use proptest::prelude::*;
use semantic_manifest::enums::TimeGranularity;
use semantic_manifest::naming::parse_dundered_name;

fn arb_grain() -> impl Strategy<Value = Option<TimeGranularity>> {
    prop::option::of(prop::sample::select(TimeGranularity::ALL.to_vec()))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn dundered_name_round_trips(
        links in prop::collection::vec("[a-z]{3,8}", 0..3),
        element in "[a-z]{3,8}",
        grain in arb_grain(),
    ) {
        prop_assume!(TimeGranularity::from_name(&element).is_none());

        let mut parts = links.clone();
        parts.push(element.clone());
        if let Some(g) = grain {
            parts.push(g.as_str().to_string());
        }
        let name = parts.join("__");

        let parsed = parse_dundered_name(&name, &[]);
        prop_assert_eq!(parsed.dundered_name(), name.clone());
        prop_assert_eq!(&parsed.element_name, &element);
        prop_assert_eq!(
            parsed.entity_links.iter().map(|e| e.as_str().to_string()).collect::<Vec<_>>(),
            links
        );
        prop_assert_eq!(parsed.time_granularity, grain.map(|g| g.as_str().to_string()));
    }

    #[test]
    fn custom_grain_suffix_is_recognized(
        link in "[a-z]{3,8}",
        element in "[a-z]{3,8}",
        custom in "[a-z]{3,6}_[a-z]{3,6}",
    ) {
        let name = format!("{}__{}__{}", link, element, custom);
        let parsed = parse_dundered_name(&name, &[custom.clone()]);
        prop_assert_eq!(
            parsed.dundered_name_without_granularity(),
            format!("{}__{}", link, element)
        );
        prop_assert_eq!(parsed.time_granularity, Some(custom));
        prop_assert_eq!(parsed.element_name, element);
    }
}
