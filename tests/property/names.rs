use proptest::prelude::*;
use regex::Regex;
use semantic_manifest::enums::TimeGranularity;
use semantic_manifest::naming::ENGINE_RESERVED_NAMES;
use semantic_manifest::primitives::check_valid_name;

fn expected_valid(name: &str) -> bool {
    let re = Regex::new(r"^[a-z][a-z0-9_]*[a-z0-9]$").unwrap();
    re.is_match(name)
        && !name.contains("__")
        && TimeGranularity::from_name(name).is_none()
        && !ENGINE_RESERVED_NAMES.contains(&name)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn check_valid_name_matches_naming_rules(name in "[a-zA-Z0-9_]{0,12}") {
        let issues = check_valid_name(&name, None);
        prop_assert_eq!(issues.is_empty(), expected_valid(&name), "{:?}: {:?}", name, issues);
    }

    #[test]
    fn snake_case_names_are_valid(name in "[a-z][a-z0-9]{1,6}(_[a-z0-9]{1,6}){0,3}") {
        prop_assume!(TimeGranularity::from_name(&name).is_none());
        prop_assume!(!ENGINE_RESERVED_NAMES.contains(&name.as_str()));
        prop_assert!(check_valid_name(&name, None).is_empty());
    }

    #[test]
    fn dundered_names_are_invalid(a in "[a-z]{2,6}", b in "[a-z]{2,6}") {
        let name = format!("{}__{}", a, b);
        prop_assert!(!check_valid_name(&name, None).is_empty());
    }
}
