//! Format detection
//!
//! Text notebooks do not always say which format they are in. These functions
//! work it out: first from the header metadata, then from the cell markers
//! found in the text.

use crate::error::FormatError;
use crate::format_spec::long_form_multiple_formats;
use crate::header::header_to_metadata;
use crate::languages::{comment_for_extension, comment_tokens, is_magic, script_language};
use crate::metadata::{
    jupytext_section, jupytext_str, rearrange_jupytext_metadata, text_representation_str,
    Metadata, JUPYTEXT,
};
use crate::registry::FormatRegistry;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

/// Extensions whose default variant is not written into headers
const IMPLICIT_DEFAULT_EXTENSIONS: &[&str] = &[".md", ".markdown", ".Rmd"];

/// `jupytext` entries that say nothing about the format
const FORMAT_NEUTRAL_KEYS: &[&str] = &["encoding", "executable", "main_language"];

static TWENTY_HASH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#( |)#{19,}\s*$").expect("valid twenty hash regex"));

/// Marker lines found while scanning a script
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct MarkerCounts {
    double_percent: usize,
    magics: usize,
    twenty_hash: usize,
    spin: usize,
    folding: usize,
}

fn is_hydrogen(counts: &MarkerCounts) -> bool {
    counts.double_percent > 0 && counts.magics > 0
}

fn is_percent(counts: &MarkerCounts) -> bool {
    counts.double_percent > 0
}

fn has_folding_markers(counts: &MarkerCounts) -> bool {
    counts.folding > 0
}

fn is_sphinx(counts: &MarkerCounts) -> bool {
    counts.twenty_hash >= 2
}

fn is_spin(counts: &MarkerCounts) -> bool {
    counts.spin > 0
}

type Rule = (&'static str, fn(&MarkerCounts) -> bool);

/// Checked in order, the first match wins
const RULES: &[Rule] = &[
    ("hydrogen", is_hydrogen),
    ("percent", is_percent),
    ("light", has_folding_markers),
    ("sphinx", is_sphinx),
    ("spin", is_spin),
];

const QUOTES: &[&[u8]] = &[b"\"\"\"", b"'''", b"\"", b"'"];

/// Tracks whether the scan is inside a string literal, so that markers in
/// docstrings are not counted.
struct QuoteTracker {
    python: bool,
    open: Option<&'static [u8]>,
}

impl QuoteTracker {
    fn new(python: bool) -> Self {
        QuoteTracker { python, open: None }
    }

    fn is_quoted(&self) -> bool {
        self.open.is_some()
    }

    fn read_line(&mut self, line: &str) {
        let bytes = line.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            let rest = &bytes[i..];
            if let Some(quote) = self.open {
                if rest[0] == b'\\' {
                    i += 2;
                } else if rest.starts_with(quote) {
                    self.open = None;
                    i += quote.len();
                } else {
                    i += 1;
                }
                continue;
            }
            if rest[0] == b'#' {
                break;
            }
            match QUOTES
                .iter()
                .find(|q| (self.python || q.len() == 1) && rest.starts_with(q))
            {
                Some(quote) => {
                    self.open = Some(*quote);
                    i += quote.len();
                }
                None => i += 1,
            }
        }
        // python strings on single quotes end with the line
        if self.python && self.open.is_some_and(|q| q.len() == 1) {
            self.open = None;
        }
    }
}

struct MarkerPatterns {
    double_percent: Regex,
    double_percent_and_space: Regex,
    nbconvert: Regex,
    vim_folding: Regex,
    vscode_folding: Regex,
}

impl MarkerPatterns {
    fn new(comment: &str) -> Result<Self, regex::Error> {
        let c = regex::escape(comment);
        Ok(MarkerPatterns {
            double_percent: Regex::new(&format!(r"^{c}( %%|%%)$"))?,
            double_percent_and_space: Regex::new(&format!(r"^{c}( %%|%%)\s"))?,
            nbconvert: Regex::new(&format!(r"^{c}( <codecell>| In\[[0-9 ]*\]:?)"))?,
            vim_folding: Regex::new(&format!(r"^{c}\s*\{{\{{\{{"))?,
            vscode_folding: Regex::new(&format!(r"^{c}\s*region"))?,
        })
    }

    fn is_cell_marker(&self, line: &str) -> bool {
        self.double_percent.is_match(line)
            || self.double_percent_and_space.is_match(line)
            || self.nbconvert.is_match(line)
    }

    fn is_folding_marker(&self, line: &str) -> bool {
        self.vim_folding.is_match(line) || self.vscode_folding.is_match(line)
    }
}

fn count_markers(text: &str, ext: &str, comment: &str, language: &str) -> MarkerCounts {
    let patterns = match MarkerPatterns::new(comment) {
        Ok(patterns) => patterns,
        Err(_) => return MarkerCounts::default(),
    };
    let is_r = ext == ".R" || ext == ".r";
    let mut tracker = QuoteTracker::new(!is_r);
    let mut counts = MarkerCounts::default();

    for line in text.lines() {
        tracker.read_line(line);
        if tracker.is_quoted() {
            continue;
        }
        if patterns.is_cell_marker(line) {
            counts.double_percent += 1;
        }
        if !line.starts_with(comment) && is_magic(line, language) {
            counts.magics += 1;
        }
        if ext == ".py" && TWENTY_HASH_RE.is_match(line) {
            counts.twenty_hash += 1;
        }
        if is_r && line.starts_with("#'") {
            counts.spin += 1;
        }
        if patterns.is_folding_marker(line) {
            counts.folding += 1;
        }
    }
    counts
}

/// Does the metadata say anything about the format of the file?
fn has_format_information(metadata: &Metadata) -> bool {
    metadata.keys().any(|key| key != JUPYTEXT)
        || jupytext_section(metadata).is_some_and(|jupytext| {
            jupytext
                .keys()
                .any(|key| !FORMAT_NEUTRAL_KEYS.contains(&key.as_str()))
        })
}

/// Read and migrate the header metadata of `text`, trying each header prefix
/// the registry knows for `ext`.
fn read_metadata(
    text: &str,
    ext: &str,
    registry: &FormatRegistry,
) -> Result<Metadata, FormatError> {
    let lines: Vec<&str> = text.lines().collect();
    let mut prefixes = registry.header_prefixes(ext);
    if prefixes.is_empty() {
        prefixes.push(comment_for_extension(ext).unwrap_or("#"));
    }
    for prefix in prefixes {
        let mut metadata = header_to_metadata(&lines, prefix)?.metadata;
        if !metadata.is_empty() {
            rearrange_jupytext_metadata(&mut metadata)?;
            return Ok(metadata);
        }
    }
    Ok(Metadata::new())
}

/// Guess the format variant of `text`, a file with extension `ext`.
pub fn guess_format(text: &str, ext: &str) -> Result<String, FormatError> {
    guess_format_with(text, ext, FormatRegistry::global())
}

/// Guess the format variant of `text` against a specific registry.
pub fn guess_format_with(
    text: &str,
    ext: &str,
    registry: &FormatRegistry,
) -> Result<String, FormatError> {
    let metadata = read_metadata(text, ext, registry)?;
    if has_format_information(&metadata) {
        if let Some(name) = format_name_for_ext_impl(&metadata, ext, registry, true)? {
            debug!(ext, format = %name, "format read from header");
            return Ok(name);
        }
    }

    let variants = registry.variant_names(ext);
    if variants.len() == 1 {
        return Ok(variants[0].to_string());
    }

    if let Some(script) = script_language(ext) {
        let counts = count_markers(text, ext, script.comment, script.language);
        let matched = RULES.iter().find(|(name, applies)| {
            applies(&counts) && registry.get(ext, Some(*name)).is_ok()
        });
        if let Some((name, _)) = matched {
            debug!(ext, format = name, ?counts, "format guessed from cell markers");
            return Ok(name.to_string());
        }
    }

    let default = registry.get(ext, None)?;
    Ok(default.format_name.clone())
}

/// Guess both the extension and the format of `text`, as an `ext:format`
/// string (`ipynb` for notebooks).
pub fn divine_format(text: &str) -> Result<String, FormatError> {
    let registry = FormatRegistry::global();
    if matches!(serde_json::from_str::<Value>(text), Ok(Value::Object(_))) {
        return Ok("ipynb".to_string());
    }

    let lines: Vec<&str> = text.lines().collect();
    let mut prefixes = vec!["", "#"];
    prefixes.extend(comment_tokens());
    for prefix in prefixes {
        let parse = header_to_metadata(&lines, prefix)?;
        let Some(extension) = text_representation_str(&parse.metadata, "extension") else {
            continue;
        };
        let ext = match extension.rfind('.') {
            Some(pos) => &extension[pos..],
            None => extension,
        };
        let name = guess_format_with(text, ext, registry)?;
        return Ok(format!("{}:{name}", extension.trim_start_matches('.')));
    }

    if lines.iter().any(|line| *line == "```") {
        return Ok("md".to_string());
    }
    Ok(format!("py:{}", guess_format_with(text, ".py", registry)?))
}

/// The format name recorded in the header of `text`, if it applies to `ext`.
///
/// Unlike [`format_name_for_ext`], this does not fall back to the default
/// variant of the extension.
pub fn read_format_from_metadata(text: &str, ext: &str) -> Result<Option<String>, FormatError> {
    let registry = FormatRegistry::global();
    let metadata = read_metadata(text, ext, registry)?;
    format_name_for_ext_impl(&metadata, ext, registry, false)
}

/// The format variant that `metadata` implies for extension `ext`.
///
/// The stamped `text_representation` wins when its extension matches, then the
/// `formats` entry for `ext`. Markdown extensions give `None` (their default is
/// implicit), other extensions the registry default.
pub fn format_name_for_ext(
    metadata: &Metadata,
    ext: &str,
    registry: &FormatRegistry,
) -> Result<Option<String>, FormatError> {
    format_name_for_ext_impl(metadata, ext, registry, true)
}

fn format_name_for_ext_impl(
    metadata: &Metadata,
    ext: &str,
    registry: &FormatRegistry,
    explicit_default: bool,
) -> Result<Option<String>, FormatError> {
    let stamped_extension = text_representation_str(metadata, "extension").unwrap_or_default();
    if let Some(name) = text_representation_str(metadata, "format_name") {
        if stamped_extension.ends_with(ext) {
            return Ok(Some(name.to_string()));
        }
    }

    if let Some(formats) = jupytext_str(metadata, "formats") {
        for fmt in long_form_multiple_formats(formats, Some(metadata))? {
            if fmt.extension == ext && (!explicit_default || fmt.format_name.is_some()) {
                return Ok(fmt.format_name);
            }
        }
    }

    if !explicit_default || IMPLICIT_DEFAULT_EXTENSIONS.contains(&ext) {
        return Ok(None);
    }
    Ok(Some(registry.get(ext, None)?.format_name.clone()))
}
