use proptest::prelude::*;
use semantic_manifest::enums::TimeGranularity;
use semantic_manifest::error::WhereFilterParseErrorKind;
use semantic_manifest::naming::METRIC_TIME_ELEMENT_NAME;
use semantic_manifest::where_filter::{parse_group_by_item, parse_where_filter};

fn plain_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{2,8}".prop_filter("not a granularity or metric_time", |n| {
        TimeGranularity::from_name(n).is_none() && n != METRIC_TIME_ELEMENT_NAME
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn dimension_call_resolves_entity_and_name(entity in plain_name(), dimension in plain_name()) {
        let template = format!("{{{{ Dimension('{}__{}') }}}} = 'x'", entity, dimension);
        let sets = parse_where_filter(&template, &[]).unwrap();
        prop_assert_eq!(sets.len(), 1);
        let call = &sets.dimension_call_parameter_sets[0];
        prop_assert_eq!(call.dimension_reference.as_str(), dimension.as_str());
        prop_assert_eq!(call.entity_path.len(), 1);
        prop_assert_eq!(call.entity_path[0].as_str(), entity.as_str());
    }

    #[test]
    fn dimension_without_entity_link_fails(dimension in plain_name()) {
        let template = format!("{{{{ Dimension('{}') }}}}", dimension);
        let err = parse_where_filter(&template, &[]).unwrap_err();
        prop_assert_eq!(err.kind, WhereFilterParseErrorKind::IncorrectFormat);
    }

    #[test]
    fn entity_with_dunder_fails(entity in plain_name(), other in "[a-z]{1,8}") {
        let template = format!("{{{{ Entity('{}__{}') }}}}", entity, other);
        let err = parse_where_filter(&template, &[]).unwrap_err();
        prop_assert_eq!(err.kind, WhereFilterParseErrorKind::IncorrectFormat);
    }

    #[test]
    fn call_count_matches_marker_count(n in 0usize..6, entity in plain_name(), dimension in plain_name()) {
        let template = (0..n)
            .map(|_| format!("{{{{ Dimension('{}__{}') }}}}", entity, dimension))
            .collect::<Vec<_>>()
            .join(" AND ");
        let sets = parse_where_filter(&template, &[]).unwrap();
        prop_assert_eq!(sets.len(), n);
    }

    #[test]
    fn parser_never_panics(template in "\\PC{0,64}") {
        let _ = parse_where_filter(&template, &[]);
        let _ = parse_group_by_item(&template, &[]);
    }

    #[test]
    fn parser_never_panics_on_template_like_input(
        template in "(\\{\\{|\\}\\}|[(),=.'\"\\[\\] _a-zA-Z]|Dimension|TimeDimension|Entity|Metric|\\\\){0,40}"
    ) {
        let _ = parse_where_filter(&template, &[]);
    }
}
