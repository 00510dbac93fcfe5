use nbtext_babel::{
    check_file_version, header_to_metadata, read_header, FormatError, FormatRegistry,
    HeaderOptions,
};
use serde_json::{json, Value};

fn lines(text: &str) -> Vec<&str> {
    text.lines().collect()
}

#[test]
fn test_markdown_header_with_title() {
    let md = r#"---
title: My Notebook
jupyter:
  kernelspec:
    display_name: Python 3
    language: python
    name: python3
---

# Content
"#;

    let lines = lines(md);
    let parse = header_to_metadata(&lines, "").expect("Failed to read header");

    assert!(parse.jupyter_found);
    assert_eq!(lines[parse.next_line], "# Content");
    assert_eq!(
        Value::Object(parse.metadata),
        json!({
            "kernelspec": {"display_name": "Python 3", "language": "python", "name": "python3"},
            "jupytext": {"root_level_metadata": {"title": "My Notebook"}}
        })
    );
}

#[test]
fn test_header_offset_with_and_without_blank_line() {
    for (text, expected) in [
        ("---\ntitle: t\n---\n\nbody\n", 4),
        ("---\ntitle: t\n---\nbody\n", 3),
        ("---\ntitle: t\n---\n", 3),
    ] {
        let parse = header_to_metadata(&lines(text), "").expect("Failed to read header");
        assert_eq!(parse.next_line, expected, "offset for {text:?}");
    }
}

#[test]
fn test_no_header() {
    let text = "# A title\n\nSome text\n";
    let parse = header_to_metadata(&lines(text), "").expect("Failed to read header");
    assert!(parse.metadata.is_empty());
    assert!(!parse.jupyter_found);
    assert_eq!(parse.next_line, 0);
}

#[test]
fn test_hidden_header_in_html_comment() {
    let md = "<!--\n\n---\njupyter:\n  jupytext:\n    hide_notebook_metadata: true\n---\n\n-->\n\n# Title\n";
    let lines = lines(md);
    let parse = header_to_metadata(&lines, "").expect("Failed to read header");
    assert_eq!(
        Value::Object(parse.metadata),
        json!({"jupytext": {"hide_notebook_metadata": true}})
    );
    assert_eq!(lines[parse.next_line], "# Title");
}

#[test]
fn test_script_header_with_shebang_and_encoding() {
    let script = r#"#!/usr/bin/env python
# coding=utf-8
# ---
# jupyter:
#   jupytext:
#     formats: ipynb,py:percent
# ---

# %%
print("hello")
"#;

    let lines = lines(script);
    let parse = header_to_metadata(&lines, "#").expect("Failed to read header");
    assert_eq!(
        Value::Object(parse.metadata),
        json!({"jupytext": {
            "executable": "/usr/bin/env python",
            "encoding": "# coding=utf-8",
            "formats": "ipynb,py:percent"
        }})
    );
    assert_eq!(lines[parse.next_line], "# %%");
}

#[test]
fn test_encoding_only_on_first_lines() {
    let script = "#!/usr/bin/env python\n# a comment\n# -*- coding: latin-1 -*-\nx = 1\n";
    let parse = header_to_metadata(&lines(script), "#").expect("Failed to read header");
    assert_eq!(
        Value::Object(parse.metadata),
        json!({"jupytext": {"executable": "/usr/bin/env python"}})
    );
    assert_eq!(parse.next_line, 1);
}

#[test]
fn test_unsupported_encoding() {
    let script = "#!/usr/bin/env python\n# -*- coding: cp1252 -*-\nx = 1\n";
    let err = header_to_metadata(&lines(script), "#").unwrap_err();
    assert!(matches!(err, FormatError::UnsupportedEncoding(ref e) if e == "cp1252"));
    assert!(err.to_string().contains("cp1252"));
}

#[test]
fn test_cpp_header() {
    let script = "// ---\n// jupyter:\n//   kernelspec:\n//     name: xcpp17\n// ---\n\nint x = 1;\n";
    let lines = lines(script);
    let parse = header_to_metadata(&lines, "//").expect("Failed to read header");
    assert_eq!(
        Value::Object(parse.metadata),
        json!({"kernelspec": {"name": "xcpp17"}})
    );
    assert_eq!(lines[parse.next_line], "int x = 1;");
}

#[test]
fn test_read_header_migrates_legacy_keys() {
    let registry = FormatRegistry::default();
    let fmt = registry.get(".py", Some("light")).expect("light format");
    let script = "# ---\n# jupyter:\n#   jupytext_formats: ipynb,py\n#   main_language: python\n# ---\n";
    let parse = read_header(script, fmt).expect("Failed to read header");
    assert_eq!(
        Value::Object(parse.metadata),
        json!({"jupytext": {"formats": "ipynb,py", "main_language": "python"}})
    );
}

#[test]
fn test_version_check_after_read() {
    let registry = FormatRegistry::default();
    let fmt = registry.get(".py", Some("percent")).expect("percent format");
    let script = r#"# ---
# jupyter:
#   jupytext:
#     text_representation:
#       extension: .py
#       format_name: percent
#       format_version: '1.0'
# ---
"#;
    let parse = read_header(script, fmt).expect("Failed to read header");
    let err = check_file_version(&parse.metadata, ".py", &registry, &HeaderOptions::default())
        .unwrap_err();
    match err {
        FormatError::IncompatibleVersion {
            format_name,
            version,
            min_readable,
            current,
        } => {
            assert_eq!(format_name, "percent");
            assert_eq!(version, "1.0");
            assert_eq!(min_readable, "1.1");
            assert_eq!(current, "1.3");
        }
        other => panic!("Expected a version error, got {other:?}"),
    }
}
