#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct Input<'a> {
    template: &'a str,
    custom_granularities: Vec<String>,
    wrap_in_markers: bool,
}

fuzz_target!(|input: Input<'_>| {
    let template = if input.wrap_in_markers {
        format!("{{{{ {} }}}}", input.template)
    } else {
        input.template.to_string()
    };

    if let Ok(sets) =
        semantic_manifest::where_filter::parse_where_filter(&template, &input.custom_granularities)
    {
        // Every call comes from a marker.
        assert!(sets.len() <= template.matches("{{").count());
        for call in &sets.time_dimension_call_parameter_sets {
            if let Some(grain) = &call.time_granularity_name {
                assert_eq!(grain, &grain.to_lowercase());
            }
        }
    }
    let _ = semantic_manifest::where_filter::parse_group_by_item(
        input.template,
        &input.custom_granularities,
    );
});
