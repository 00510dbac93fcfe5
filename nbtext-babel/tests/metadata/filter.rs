use nbtext_babel::metadata::filter::{
    parse_filter, DEFAULT_CELL_METADATA_FILTER, DEFAULT_NOTEBOOK_METADATA_FILTER,
};
use nbtext_babel::{filter_metadata, Metadata, MetadataFilter};
use proptest::prelude::*;
use serde_json::json;

fn notebook_metadata() -> Metadata {
    json!({
        "jupytext": {"formats": "ipynb,py"},
        "kernelspec": {"name": "python3"},
        "language_info": {"name": "python"},
        "widgets": {"state": {}},
        "varInspector": {"window_display": false}
    })
    .as_object()
    .cloned()
    .expect("object")
}

fn sorted_keys(metadata: &Metadata) -> Vec<String> {
    let mut keys: Vec<String> = metadata.keys().cloned().collect();
    keys.sort();
    keys
}

#[test]
fn test_default_notebook_filter() {
    let mut metadata = notebook_metadata();
    filter_metadata(&mut metadata, None, DEFAULT_NOTEBOOK_METADATA_FILTER);
    assert_eq!(
        sorted_keys(&metadata),
        vec!["jupytext", "kernelspec", "language_info"]
    );
}

#[test]
fn test_user_filter_takes_precedence() {
    let mut metadata = notebook_metadata();
    filter_metadata(
        &mut metadata,
        Some("varInspector,-language_info"),
        DEFAULT_NOTEBOOK_METADATA_FILTER,
    );
    assert_eq!(
        sorted_keys(&metadata),
        vec!["jupytext", "kernelspec", "varInspector"]
    );
}

#[test]
fn test_deny_all() {
    let mut metadata = notebook_metadata();
    filter_metadata(&mut metadata, Some("-all"), DEFAULT_NOTEBOOK_METADATA_FILTER);
    assert!(metadata.is_empty());
}

#[test]
fn test_cell_filter() {
    let mut metadata: Metadata = json!({"tags": [], "scrolled": true, "trusted": true})
        .as_object()
        .cloned()
        .expect("object");
    filter_metadata(&mut metadata, None, DEFAULT_CELL_METADATA_FILTER);
    assert_eq!(sorted_keys(&metadata), vec!["tags"]);
}

#[test]
fn test_filter_display() {
    let filter: MetadataFilter = "kernelspec, jupytext ,-all".parse().unwrap();
    assert_eq!(filter.to_string(), "kernelspec,jupytext,-all");
}

proptest! {
    #[test]
    fn prop_parse_print_is_stable(tokens in prop::collection::vec("-?[a-z]{1,6}", 0..6)) {
        let printed = parse_filter(&tokens.join(",")).to_string();
        prop_assert_eq!(parse_filter(&printed).to_string(), printed.clone());
        prop_assert_eq!(parse_filter(&printed), parse_filter(&tokens.join(",")));
    }

    #[test]
    fn prop_filtering_is_idempotent(spec in "(-?[a-z]{1,6},){0,4}(-?all)?") {
        let mut once = notebook_metadata();
        filter_metadata(&mut once, Some(&spec), DEFAULT_NOTEBOOK_METADATA_FILTER);
        let mut twice = once.clone();
        filter_metadata(&mut twice, Some(&spec), DEFAULT_NOTEBOOK_METADATA_FILTER);
        prop_assert_eq!(once, twice);
    }
}
