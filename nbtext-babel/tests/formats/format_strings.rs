use nbtext_babel::format_spec::{identical_format_path, update_jupytext_formats_metadata};
use nbtext_babel::{
    long_form_multiple_formats, long_form_one_format, short_form_multiple_formats,
    short_form_one_format, FormatDescriptor, FormatError, FormatRegistry, Metadata,
};
use proptest::prelude::*;
use serde_json::{json, Value};

#[test]
fn test_long_form_examples() {
    assert_eq!(
        long_form_multiple_formats("ipynb,py:percent", None).unwrap(),
        vec![
            FormatDescriptor::new(".ipynb"),
            FormatDescriptor::new(".py").with_format_name("percent"),
        ]
    );
    assert_eq!(
        long_form_one_format("notebooks//ipynb", None).unwrap(),
        FormatDescriptor::new(".ipynb").with_prefix("notebooks/")
    );
    assert_eq!(
        long_form_one_format(".pct.py:percent", None).unwrap(),
        FormatDescriptor::new(".py")
            .with_suffix(".pct")
            .with_format_name("percent")
    );
    assert_eq!(
        long_form_one_format("markdown", None).unwrap(),
        FormatDescriptor::new(".md")
    );
}

#[test]
fn test_auto_extension() {
    let metadata: Metadata = json!({"kernelspec": {"language": "R"}})
        .as_object()
        .cloned()
        .expect("object");
    assert_eq!(
        long_form_one_format("auto:percent", Some(&metadata)).unwrap(),
        FormatDescriptor::new(".R").with_format_name("percent")
    );
    assert_eq!(
        long_form_one_format("auto:percent", None).unwrap().extension,
        ".auto"
    );
}

#[test]
fn test_invalid_formats() {
    for token in ["py:unknown", "exe", "nb.xyz:light"] {
        match long_form_one_format(token, None) {
            Err(FormatError::InvalidFormat { format, .. }) => assert_eq!(format, token),
            other => panic!("Expected an invalid format error for {token}, got {other:?}"),
        }
    }
}

#[test]
fn test_short_form_drops_markdown_names() {
    let formats = vec![
        FormatDescriptor::new(".ipynb"),
        FormatDescriptor::new(".md").with_format_name("markdown"),
        FormatDescriptor::new(".Rmd").with_format_name("rmarkdown"),
        FormatDescriptor::new(".py").with_format_name("light"),
    ];
    assert_eq!(short_form_multiple_formats(&formats), "ipynb,md,Rmd,py:light");
}

#[test]
fn test_identical_format_path() {
    let a = long_form_one_format(".pct.py:percent", None).unwrap();
    let b = long_form_one_format(".pct.py:hydrogen", None).unwrap();
    let c = long_form_one_format("py:percent", None).unwrap();
    assert!(identical_format_path(&a, &b));
    assert!(!identical_format_path(&a, &c));
}

#[test]
fn test_update_formats_metadata() {
    let mut metadata: Metadata = json!({"jupytext": {"formats": "ipynb,py"}})
        .as_object()
        .cloned()
        .expect("object");
    update_jupytext_formats_metadata(&mut metadata, "py:percent").unwrap();
    assert_eq!(
        Value::Object(metadata),
        json!({"jupytext": {"formats": "ipynb,py:percent"}})
    );
}

fn descriptor() -> impl Strategy<Value = FormatDescriptor> {
    let registry = FormatRegistry::default();
    let mut candidates: Vec<(String, Option<String>)> = vec![
        (".ipynb".to_string(), None),
        (".md".to_string(), None),
        (".Rmd".to_string(), None),
    ];
    for ext in [".py", ".R", ".jl", ".cpp", ".ss"] {
        candidates.push((ext.to_string(), None));
        for name in registry.variant_names(ext) {
            candidates.push((ext.to_string(), Some(name.to_string())));
        }
    }

    (
        prop::sample::select(candidates),
        prop::option::of(prop::sample::select(vec![".pct", ".lgt", ".nb"])),
        prop::option::of(prop::sample::select(vec!["notebooks/", "scripts", "a/b/"])),
    )
        .prop_map(|((ext, name), suffix, prefix)| {
            let mut fmt = FormatDescriptor::new(&ext);
            fmt.format_name = name;
            fmt.suffix = suffix.map(str::to_string);
            fmt.prefix = prefix.map(str::to_string);
            fmt
        })
}

proptest! {
    #[test]
    fn prop_long_of_short_is_identity(fmt in descriptor()) {
        let short = short_form_one_format(&fmt);
        prop_assert_eq!(long_form_one_format(&short, None).unwrap(), fmt);
    }

    #[test]
    fn prop_multiple_formats_round_trip(formats in prop::collection::vec(descriptor(), 1..5)) {
        let short = short_form_multiple_formats(&formats);
        prop_assert_eq!(long_form_multiple_formats(&short, None).unwrap(), formats);
    }
}
