// Command-line interface for nbtext
//
// This binary exposes the nbtext-babel library: it reads text notebooks and reports what their
// headers hold, which format they are in, and how a notebook's metadata would be written back.
//
// Usage:
//  nbtext guess <path> [--ext <ext>]                 - Format variant of a text notebook
//  nbtext divine <path>                              - Extension and format of any notebook file
//  nbtext header <path> [--ext <ext>] [--format <name>] [--prefix <prefix>] [--check-version]
//                                                    - Header metadata, as JSON
//  nbtext formats <spec> [--long]                    - Normalize a compact format string
//  nbtext render <notebook.json> --to <ext[:name]>
//                                                    - Header lines for a notebook or its metadata
//  nbtext filter <notebook.json>                     - Apply the metadata filters to a notebook
//  nbtext --list-formats                             - List the registered formats
//
// Settings come from the embedded defaults, then ./nbtext.toml, then the file given with
// --config. Logs go to stderr and are controlled with RUST_LOG (default: warn).

mod commands;

use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use commands::CommandSettings;
use nbtext_babel::{FormatRegistry, HeaderOptions};
use nbtext_config::{Loader, NbTextConfig};
use std::fs;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn build_cli() -> Command {
    Command::new("nbtext")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A tool for inspecting the headers and formats of text notebooks")
        .long_about(
            "nbtext reads text notebooks (scripts and Markdown documents that hold a Jupyter\n\
            notebook) and reports on their YAML header, their format variant, and the\n\
            compact format strings used to pair them with .ipynb files.\n\n\
            Examples:\n  \
            nbtext guess notebook.py                   # percent, light, hydrogen, ...\n  \
            nbtext divine notebook.txt                 # py:percent, md, ipynb, ...\n  \
            nbtext header notebook.md                  # Header metadata as JSON\n  \
            nbtext formats ipynb,pct.py:percent --long # Expand a format string\n  \
            nbtext render nb.ipynb --to py:percent     # Header lines for a notebook"
        )
        .arg_required_else_help(true)
        .arg(
            Arg::new("list-formats")
                .long("list-formats")
                .help("List registered formats")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to an nbtext.toml configuration file")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .subcommand(
            Command::new("guess")
                .about("Guess the format variant of a text notebook")
                .arg(
                    Arg::new("path")
                        .help("Path to the text notebook")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("ext")
                        .long("ext")
                        .help("Extension to assume (detected from the file name if not specified)")
                        .value_hint(ValueHint::Other),
                ),
        )
        .subcommand(
            Command::new("divine")
                .about("Guess the extension and format of a notebook file")
                .arg(
                    Arg::new("path")
                        .help("Path to the notebook file")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("header")
                .about("Read the header of a text notebook")
                .long_about(
                    "Read the header of a text notebook and print it as JSON: the metadata\n\
                    (in its current canonical shape), whether a 'jupyter' section was found,\n\
                    and the index of the first line after the header.\n\n\
                    The header prefix is that of the file's format, unless given with --prefix."
                )
                .arg(
                    Arg::new("path")
                        .help("Path to the text notebook")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("ext")
                        .long("ext")
                        .help("Extension to assume (detected from the file name if not specified)")
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .help("Format variant (the extension's default if not specified)")
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("prefix")
                        .long("prefix")
                        .help("Comment prefix of the header lines")
                        .allow_hyphen_values(true)
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("check-version")
                        .long("check-version")
                        .help("Fail if the header was written by an incompatible format version")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("formats")
                .about("Normalize a compact format string such as 'ipynb,py:percent'")
                .arg(
                    Arg::new("spec")
                        .help("Comma separated formats")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("long")
                        .long("long")
                        .help("Print each format's parts as JSON")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("render")
                .about("Write the header of a notebook in a text format")
                .long_about(
                    "Write the header lines that a notebook would get in a text format.\n\n\
                    The input is a notebook (.ipynb JSON), or a JSON object holding notebook\n\
                    metadata only. Output goes to stdout.\n\n\
                    Examples:\n  \
                    nbtext render nb.ipynb --to py:percent\n  \
                    nbtext render metadata.json --to md"
                )
                .arg(
                    Arg::new("input")
                        .help("Notebook or metadata JSON file")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("to")
                        .long("to")
                        .help("Target format, as ext[:name] (e.g. py:percent, md)")
                        .required(true)
                        .value_hint(ValueHint::Other),
                ),
        )
        .subcommand(
            Command::new("filter")
                .about("Apply the notebook and cell metadata filters to a notebook")
                .arg(
                    Arg::new("input")
                        .help("Notebook JSON file")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                ),
        )
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    init_tracing();

    let matches = build_cli().get_matches();

    if matches.get_flag("list-formats") {
        println!("{}", commands::list_formats());
        return;
    }

    let config = load_cli_config(matches.get_one::<String>("config").map(|s| s.as_str()));
    let settings = settings_from_config(&config);

    let result = match matches.subcommand() {
        Some(("guess", sub_matches)) => {
            let path = required(sub_matches, "path");
            let ext = extension_arg(sub_matches, path);
            commands::guess(&read_input(path), &ext)
        }
        Some(("divine", sub_matches)) => {
            let path = required(sub_matches, "path");
            commands::divine(&read_input(path))
        }
        Some(("header", sub_matches)) => {
            let path = required(sub_matches, "path");
            let ext = extension_arg(sub_matches, path);
            commands::header(
                &read_input(path),
                &ext,
                sub_matches.get_one::<String>("format").map(|s| s.as_str()),
                sub_matches.get_one::<String>("prefix").map(|s| s.as_str()),
                sub_matches.get_flag("check-version"),
                &settings,
            )
        }
        Some(("formats", sub_matches)) => {
            commands::formats(required(sub_matches, "spec"), sub_matches.get_flag("long"))
        }
        Some(("render", sub_matches)) => {
            let input = required(sub_matches, "input");
            let to = required(sub_matches, "to");
            commands::render(&read_input(input), to, &settings).map(|out| {
                // the header already ends with a newline
                out.trim_end_matches('\n').to_string()
            })
        }
        Some(("filter", sub_matches)) => {
            let input = required(sub_matches, "input");
            commands::filter(&read_input(input), &settings)
        }
        _ => {
            eprintln!("Unknown subcommand. Use --help for usage information.");
            std::process::exit(1);
        }
    };

    match result {
        Ok(output) => {
            if !output.is_empty() {
                println!("{output}");
            }
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

fn required<'a>(matches: &'a ArgMatches, name: &str) -> &'a str {
    match matches.get_one::<String>(name) {
        Some(value) => value,
        None => {
            eprintln!("Error: missing argument '{name}'");
            std::process::exit(1);
        }
    }
}

fn read_input(path: &str) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file '{path}': {e}");
        std::process::exit(1);
    })
}

/// The `--ext` argument, or the extension of `path`
fn extension_arg(matches: &ArgMatches, path: &str) -> String {
    if let Some(ext) = matches.get_one::<String>("ext") {
        return if ext.starts_with('.') {
            ext.to_string()
        } else {
            format!(".{ext}")
        };
    }
    match FormatRegistry::global().detect_extension_from_filename(path) {
        Some(ext) => {
            debug!(path, ext = %ext, "detected extension");
            ext
        }
        None => {
            eprintln!("Error: Could not detect format from filename '{path}'");
            eprintln!("Please specify --ext explicitly");
            std::process::exit(1);
        }
    }
}

fn load_cli_config(explicit_path: Option<&str>) -> NbTextConfig {
    let loader = Loader::new().with_optional_file("nbtext.toml");
    let loader = if let Some(path) = explicit_path {
        loader.with_file(path)
    } else {
        loader
    };

    loader.build().unwrap_or_else(|err| {
        eprintln!("Failed to load configuration: {err}");
        std::process::exit(1);
    })
}

fn settings_from_config(config: &NbTextConfig) -> CommandSettings {
    CommandSettings {
        header: HeaderOptions::from(config),
        cell_metadata_filter: config.filters.cell_metadata.clone(),
        hide_notebook_metadata: config.render.hide_notebook_metadata,
    }
}
