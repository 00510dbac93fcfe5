use nbtext_babel::{divine_format, guess_format, read_format_from_metadata, FormatError};

#[test]
fn test_guess_python_formats() {
    let cases = [
        ("#%%\n1 + 1\n", "percent"),
        ("# %%\n1 + 1\n", "percent"),
        ("#%% cell name\n1 + 1\n", "percent"),
        ("# %% [markdown]\n# Some text\n", "percent"),
        ("#%%time\n1 + 1\n", "light"),
        ("#%%\n%matplotlib inline\n", "hydrogen"),
        ("1 + 1\n", "light"),
        ("", "light"),
    ];
    for (text, expected) in cases {
        assert_eq!(guess_format(text, ".py").unwrap(), expected, "text: {text:?}");
    }
}

#[test]
fn test_guess_other_languages() {
    assert_eq!(guess_format("// %%\nint x;\n", ".cpp").unwrap(), "percent");
    assert_eq!(guess_format(";; %%\n(+ 1 1)\n", ".ss").unwrap(), "percent");
    assert_eq!(guess_format("-- %%\nx = 1\n", ".hs").unwrap(), "percent");
    assert_eq!(guess_format("#' A spin comment\nx <- 1\n", ".R").unwrap(), "spin");
    assert_eq!(guess_format("# %%\nx <- 1\n", ".R").unwrap(), "percent");
}

#[test]
fn test_percent_wins_over_sphinx() {
    let text = "####################\n# %%\nx = 1\n####################\n";
    assert_eq!(guess_format(text, ".py").unwrap(), "percent");
}

#[test]
fn test_guess_uses_header() {
    let text = r#"# ---
# jupyter:
#   jupytext:
#     formats: ipynb,py:hydrogen
# ---

1 + 1
"#;
    assert_eq!(guess_format(text, ".py").unwrap(), "hydrogen");
}

#[test]
fn test_divine() {
    assert_eq!(
        divine_format(r#"{"cells": [], "metadata": {}, "nbformat": 4}"#).unwrap(),
        "ipynb"
    );
    assert_eq!(divine_format("1 + 1\n").unwrap(), "py:light");
    assert_eq!(divine_format("# %%\n1 + 1\n").unwrap(), "py:percent");
    assert_eq!(divine_format("#%%\n%time 1 + 1\n").unwrap(), "py:hydrogen");
    assert_eq!(
        divine_format("Some text\n\n```python\n1 + 1\n```\n").unwrap(),
        "md"
    );
}

#[test]
fn test_divine_script_from_header() {
    let text = r#";; ---
;; jupyter:
;;   jupytext:
;;     text_representation:
;;       extension: .ss
;;       format_name: percent
;; ---

;; %%
(+ 1 1)
"#;
    assert_eq!(divine_format(text).unwrap(), "ss:percent");
}

#[test]
fn test_divine_markdown_from_header() {
    let text = r#"---
jupyter:
  jupytext:
    text_representation:
      extension: .md
      format_name: markdown
---

Text
"#;
    assert_eq!(divine_format(text).unwrap(), "md:markdown");
}

#[test]
fn test_divine_reports_invalid_yaml() {
    let text = "---\njupyter: [x\n---\n";
    assert!(matches!(divine_format(text), Err(FormatError::InvalidYaml(_))));
    assert!(matches!(guess_format(text, ".md"), Err(FormatError::InvalidYaml(_))));
}

#[test]
fn test_divine_markdown_opening_with_a_rule() {
    let text = "---\n\nSome prose\n\n---\n\n```\ncode\n```\n";
    assert_eq!(divine_format(text).unwrap(), "md");
}

#[test]
fn test_read_format_from_metadata_other_extension() {
    let text = r#"---
jupyter:
  jupytext:
    formats: ipynb,pct.py:percent,lgt.py:light
    text_representation:
      extension: .pct.py
      format_name: percent
---
"#;
    assert_eq!(read_format_from_metadata(text, ".Rmd").unwrap(), None);
}

#[test]
fn test_read_format_from_metadata_without_header() {
    assert_eq!(read_format_from_metadata("1 + 1\n", ".py").unwrap(), None);
}
