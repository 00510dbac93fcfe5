use insta::assert_snapshot;
use nbtext_babel::header::encoding_and_executable;
use nbtext_babel::{
    header_to_metadata, metadata_to_header, notebook_header, Cell, FormatImplementation,
    FormatRegistry, HeaderOptions, Metadata, Notebook, CODEC_VERSION,
};
use serde_json::{json, Value};

fn as_metadata(value: Value) -> Metadata {
    value.as_object().cloned().expect("object")
}

fn format(ext: &str, name: &str) -> FormatImplementation {
    FormatRegistry::default()
        .get(ext, Some(name))
        .expect("registered format")
        .clone()
}

fn unstamped() -> HeaderOptions {
    HeaderOptions::default().without_version_number()
}

fn kernelspec() -> Value {
    json!({"display_name": "Python 3", "language": "python", "name": "python3"})
}

#[test]
fn test_markdown_header_with_root_level_metadata() {
    let metadata = as_metadata(json!({
        "jupytext": {
            "main_language": "python",
            "root_level_metadata": {"title": "Sample header"}
        }
    }));
    let header = metadata_to_header(&metadata, &format(".md", "markdown"), ".md", &unstamped())
        .expect("Failed to write header");

    assert_snapshot!(header.join("\n"), @r###"
    ---
    jupyter:
      jupytext:
        main_language: python
    title: Sample header
    ---
    "###);
}

#[test]
fn test_hidden_markdown_header() {
    let metadata = as_metadata(json!({
        "jupytext": {"mainlanguage": "python", "hide_notebook_metadata": true}
    }));
    let header = metadata_to_header(&metadata, &format(".md", "markdown"), ".md", &unstamped())
        .expect("Failed to write header");

    assert_eq!(
        header,
        vec![
            "<!--",
            "",
            "---",
            "jupyter:",
            "  jupytext:",
            "    hide_notebook_metadata: true",
            "    mainlanguage: python",
            "---",
            "",
            "-->",
        ]
    );
}

#[test]
fn test_hidden_header_only_in_markdown() {
    let metadata = as_metadata(json!({"jupytext": {"hide_notebook_metadata": true}}));
    let header = metadata_to_header(&metadata, &format(".py", "percent"), ".py", &unstamped())
        .expect("Failed to write header");
    assert_eq!(header.first().map(String::as_str), Some("# ---"));
}

#[test]
fn test_percent_script_header() {
    let metadata = as_metadata(json!({"kernelspec": kernelspec()}));
    let header = metadata_to_header(&metadata, &format(".py", "percent"), ".py", &unstamped())
        .expect("Failed to write header");

    assert_snapshot!(header.join("\n"), @r###"
    # ---
    # jupyter:
    #   kernelspec:
    #     display_name: Python 3
    #     language: python
    #     name: python3
    # ---
    "###);
}

#[test]
fn test_spin_header_prefix() {
    let metadata = as_metadata(json!({"kernelspec": {"name": "ir"}}));
    let header = metadata_to_header(&metadata, &format(".R", "spin"), ".R", &unstamped())
        .expect("Failed to write header");
    assert_eq!(
        header,
        vec!["#' ---", "#' jupyter:", "#'   kernelspec:", "#'     name: ir", "#' ---"]
    );
}

#[test]
fn test_version_stamp_is_read_back() {
    let fmt = format(".jl", "percent");
    let header = metadata_to_header(
        &as_metadata(json!({"kernelspec": {"name": "julia-1.9"}})),
        &fmt,
        ".jl",
        &HeaderOptions::default(),
    )
    .expect("Failed to write header");
    let parse = header_to_metadata(&header, "#").expect("Failed to read header");

    assert_eq!(
        parse.metadata["jupytext"]["text_representation"],
        json!({
            "extension": ".jl",
            "format_name": "percent",
            "format_version": fmt.current_version_number,
            "jupytext_version": CODEC_VERSION
        })
    );
}

#[test]
fn test_default_filter_drops_widgets() {
    let metadata = as_metadata(json!({"kernelspec": {"name": "python3"}, "widgets": {"state": {}}}));
    let header = metadata_to_header(&metadata, &format(".py", "light"), ".py", &unstamped())
        .expect("Failed to write header");
    let text = header.join("\n");
    assert!(text.contains("kernelspec"));
    assert!(!text.contains("widgets"));
}

#[test]
fn test_user_filter_keeps_only_listed_keys() {
    let metadata = as_metadata(json!({
        "jupytext": {"notebook_metadata_filter": "kernelspec,-all"},
        "kernelspec": {"name": "python3"},
        "language_info": {"name": "python"}
    }));
    let header = metadata_to_header(&metadata, &format(".py", "light"), ".py", &unstamped())
        .expect("Failed to write header");
    let parse = header_to_metadata(&header, "#").expect("Failed to read header");
    assert_eq!(
        Value::Object(parse.metadata),
        json!({"kernelspec": {"name": "python3"}})
    );
}

#[test]
fn test_notebook_header_with_non_ascii_cell() {
    let notebook = Notebook::new(as_metadata(json!({"kernelspec": kernelspec()})))
        .with_cells(vec![Cell::markdown("Café"), Cell::code("x = 1")]);
    let header = notebook_header(&notebook, &format(".py", "light"), ".py", &unstamped())
        .expect("Failed to write header");
    assert_eq!(header[0], "# -*- coding: utf-8 -*-");
    assert_eq!(header[1], "# ---");
}

#[test]
fn test_executable_moves_out_of_yaml() {
    let notebook = Notebook::new(as_metadata(json!({
        "jupytext": {"executable": "/usr/bin/env python", "formats": "ipynb,py"}
    })));
    let mut metadata = notebook.metadata.clone();
    let lines = encoding_and_executable(&notebook, &mut metadata, ".py");
    assert_eq!(lines, vec!["#!/usr/bin/env python"]);
    assert_eq!(
        Value::Object(metadata),
        json!({"jupytext": {"formats": "ipynb,py"}})
    );
}
