//! CLI commands
//!
//! Each command takes the text it works on and returns its output as a string,
//! or an error message. Reading files, printing and exit codes are left to
//! `main.rs`.

use nbtext_babel::format_spec::FormatDescriptor;
use nbtext_babel::metadata::{jupytext_section_mut, jupytext_str};
use nbtext_babel::{
    check_file_version, divine_format, filter_metadata, guess_format, header_to_metadata,
    long_form_multiple_formats, long_form_one_format, notebook_header,
    rearrange_jupytext_metadata, short_form_multiple_formats, FormatRegistry, HeaderOptions,
    Notebook,
};
use serde_json::{json, Value};

/// Settings shared by the commands, resolved from the configuration
#[derive(Debug, Clone)]
pub struct CommandSettings {
    pub header: HeaderOptions,
    pub cell_metadata_filter: String,
    pub hide_notebook_metadata: bool,
}

/// Guess the format variant of `text`, a file with extension `ext`
pub fn guess(text: &str, ext: &str) -> Result<String, String> {
    guess_format(text, ext).map_err(|e| e.to_string())
}

/// Guess both extension and format of `text`
pub fn divine(text: &str) -> Result<String, String> {
    divine_format(text).map_err(|e| e.to_string())
}

/// Read the header of `text` and describe it as JSON
///
/// The header prefix is the one of format `ext:format_name`, unless given
/// explicitly.
pub fn header(
    text: &str,
    ext: &str,
    format_name: Option<&str>,
    prefix: Option<&str>,
    check_version: bool,
    settings: &CommandSettings,
) -> Result<String, String> {
    let registry = FormatRegistry::global();
    let prefix = match prefix {
        Some(prefix) => prefix.to_string(),
        None => registry
            .get(ext, format_name)
            .map_err(|e| e.to_string())?
            .header_prefix
            .clone(),
    };

    let lines: Vec<&str> = text.lines().collect();
    let mut parse = header_to_metadata(&lines, &prefix).map_err(|e| e.to_string())?;
    rearrange_jupytext_metadata(&mut parse.metadata).map_err(|e| e.to_string())?;
    if check_version {
        check_file_version(&parse.metadata, ext, registry, &settings.header)
            .map_err(|e| e.to_string())?;
    }

    let report = json!({
        "metadata": parse.metadata,
        "jupyter_found": parse.jupyter_found,
        "next_line": parse.next_line,
    });
    serde_json::to_string_pretty(&report).map_err(|e| e.to_string())
}

fn descriptor_json(fmt: &FormatDescriptor) -> Value {
    json!({
        "extension": fmt.extension,
        "suffix": fmt.suffix,
        "prefix": fmt.prefix,
        "format_name": fmt.format_name,
    })
}

/// Normalize a compact format string, or expand it into JSON with `long`
pub fn formats(spec: &str, long: bool) -> Result<String, String> {
    let formats = long_form_multiple_formats(spec, None).map_err(|e| e.to_string())?;
    if long {
        let expanded: Vec<Value> = formats.iter().map(descriptor_json).collect();
        serde_json::to_string_pretty(&expanded).map_err(|e| e.to_string())
    } else {
        Ok(short_form_multiple_formats(&formats))
    }
}

/// Read a notebook, or bare notebook metadata, from JSON
fn read_notebook(source: &str) -> Result<Notebook, String> {
    let value: Value =
        serde_json::from_str(source).map_err(|e| format!("Invalid JSON input: {e}"))?;
    match value {
        Value::Object(map) if map.contains_key("cells") || map.contains_key("nbformat") => {
            serde_json::from_value(Value::Object(map)).map_err(|e| format!("Invalid notebook: {e}"))
        }
        Value::Object(map) => Ok(Notebook::new(map)),
        _ => Err("Expected a JSON object".to_string()),
    }
}

/// Write the header of a notebook (or of bare metadata) in format `to`
pub fn render(source: &str, to: &str, settings: &CommandSettings) -> Result<String, String> {
    let mut notebook = read_notebook(source)?;
    rearrange_jupytext_metadata(&mut notebook.metadata).map_err(|e| e.to_string())?;

    let target = long_form_one_format(to, Some(&notebook.metadata)).map_err(|e| e.to_string())?;
    let fmt = FormatRegistry::global()
        .get(&target.extension, target.format_name.as_deref())
        .map_err(|e| e.to_string())?;

    if settings.hide_notebook_metadata {
        jupytext_section_mut(&mut notebook.metadata)
            .entry("hide_notebook_metadata")
            .or_insert(Value::Bool(true));
    }

    let lines = notebook_header(&notebook, fmt, &target.extension, &settings.header)
        .map_err(|e| e.to_string())?;
    if lines.is_empty() {
        return Ok(String::new());
    }
    Ok(lines.join("\n") + "\n")
}

/// Apply the notebook and cell metadata filters to a notebook
pub fn filter(source: &str, settings: &CommandSettings) -> Result<String, String> {
    let mut notebook = read_notebook(source)?;
    rearrange_jupytext_metadata(&mut notebook.metadata).map_err(|e| e.to_string())?;

    notebook.filter_cell_metadata(&settings.cell_metadata_filter);

    let user_filter = jupytext_str(&notebook.metadata, "notebook_metadata_filter").map(str::to_string);
    filter_metadata(
        &mut notebook.metadata,
        user_filter.as_deref(),
        &settings.header.default_notebook_metadata_filter,
    );

    serde_json::to_string_pretty(&notebook).map_err(|e| e.to_string())
}

/// All registered formats, one `ext:name` label per line
pub fn list_formats() -> String {
    FormatRegistry::global().list_formats().join("\n")
}
