//! Script languages, their extensions and comment tokens
//!
//! Every script format writes its header inside line comments. This table is
//! the single source for which extensions are scripts and how they comment.

use once_cell::sync::Lazy;
use regex::Regex;

/// A scripting language known to the text formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptLanguage {
    pub extension: &'static str,
    pub language: &'static str,
    pub comment: &'static str,
}

const fn lang(extension: &'static str, language: &'static str, comment: &'static str) -> ScriptLanguage {
    ScriptLanguage {
        extension,
        language,
        comment,
    }
}

/// Script extensions, in registration order
pub const SCRIPT_LANGUAGES: &[ScriptLanguage] = &[
    lang(".py", "python", "#"),
    lang(".R", "R", "#"),
    lang(".r", "R", "#"),
    lang(".jl", "julia", "#"),
    lang(".cpp", "c++", "//"),
    lang(".ss", "scheme", ";;"),
    lang(".clj", "clojure", ";;"),
    lang(".scm", "scheme", ";;"),
    lang(".sh", "bash", "#"),
    lang(".ps1", "powershell", "#"),
    lang(".q", "q", "/"),
    lang(".m", "matlab", "%"),
    lang(".pro", "idl", ";"),
    lang(".js", "javascript", "//"),
    lang(".ts", "typescript", "//"),
    lang(".scala", "scala", "//"),
    lang(".rs", "rust", "//"),
    lang(".robot", "robotframework", "#"),
    lang(".cs", "csharp", "//"),
    lang(".fsx", "fsharp", "//"),
    lang(".fs", "fsharp", "//"),
    lang(".sos", "sos", "#"),
    lang(".java", "java", "//"),
    lang(".groovy", "groovy", "//"),
    lang(".sage", "sage", "#"),
    lang(".hs", "haskell", "--"),
    lang(".tcl", "tcl", "#"),
];

/// Languages whose kernels understand `%magic` / `!shell` commands
const LANGUAGES_WITH_MAGICS: &[&str] = &["python", "R", "julia", "scala", "sos", "sage"];

static MAGIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(%|%%|%%%)[a-zA-Z]").expect("valid magic regex"));
static SHELL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^!\w").expect("valid shell regex"));

/// Look up a script language by extension (with leading dot)
pub fn script_language(extension: &str) -> Option<&'static ScriptLanguage> {
    SCRIPT_LANGUAGES.iter().find(|l| l.extension == extension)
}

/// Comment token for a script extension, `None` for non-script extensions
pub fn comment_for_extension(extension: &str) -> Option<&'static str> {
    script_language(extension).map(|l| l.comment)
}

/// Preferred extension for a language name (case-insensitive)
pub fn extension_for_language(language: &str) -> Option<&'static str> {
    SCRIPT_LANGUAGES
        .iter()
        .find(|l| l.language.eq_ignore_ascii_case(language))
        .map(|l| l.extension)
}

/// Distinct comment tokens, in table order
pub fn comment_tokens() -> Vec<&'static str> {
    let mut tokens: Vec<&'static str> = Vec::new();
    for l in SCRIPT_LANGUAGES {
        if !tokens.contains(&l.comment) {
            tokens.push(l.comment);
        }
    }
    tokens
}

/// Is `line` an (uncommented) Jupyter magic or shell command in `language`?
pub fn is_magic(line: &str, language: &str) -> bool {
    if !LANGUAGES_WITH_MAGICS.contains(&language) {
        return false;
    }
    MAGIC_RE.is_match(line) || (language == "python" && SHELL_RE.is_match(line))
}

/// Prefix every line with `prefix` (and a space, unless the line is empty)
pub fn comment_lines<S: AsRef<str>>(lines: &[S], prefix: &str) -> Vec<String> {
    if prefix.is_empty() {
        return lines.iter().map(|l| l.as_ref().to_string()).collect();
    }
    lines
        .iter()
        .map(|l| {
            let l = l.as_ref();
            if l.is_empty() {
                prefix.to_string()
            } else {
                format!("{prefix} {l}")
            }
        })
        .collect()
}

/// Remove `prefix` (and the following space, if any) from `line`
pub fn uncomment_line<'a>(line: &'a str, prefix: &str) -> &'a str {
    if prefix.is_empty() {
        return line;
    }
    line.strip_prefix(prefix)
        .map(|rest| rest.strip_prefix(' ').unwrap_or(rest))
        .unwrap_or(line)
}
