use clap::{Arg, ArgAction, Command, ValueHint};
use clap_complete::{generate_to, shells::*};
use std::env;
use std::io::Error;

// Mirror of build_cli() from src/main.rs
// We need to duplicate this here since build scripts can't access src/ modules
fn path_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .help(help)
        .required(true)
        .index(1)
        .value_hint(ValueHint::FilePath)
}

fn ext_arg() -> Arg {
    Arg::new("ext")
        .long("ext")
        .help("Extension to assume (detected from the file name if not specified)")
        .value_hint(ValueHint::Other)
}

fn main() -> Result<(), Error> {
    let outdir = match env::var_os("OUT_DIR") {
        None => return Ok(()),
        Some(outdir) => outdir,
    };

    let mut cmd = Command::new("nbtext")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A tool for inspecting the headers and formats of text notebooks")
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
                .arg(path_arg("path", "Path to the text notebook"))
                .arg(ext_arg()),
        )
        .subcommand(
            Command::new("divine")
                .about("Guess the extension and format of a notebook file")
                .arg(path_arg("path", "Path to the notebook file")),
        )
        .subcommand(
            Command::new("header")
                .about("Read the header of a text notebook")
                .arg(path_arg("path", "Path to the text notebook"))
                .arg(ext_arg())
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
                .arg(path_arg("input", "Notebook or metadata JSON file"))
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
                .arg(path_arg("input", "Notebook JSON file")),
        );

    // Generate completions for bash
    generate_to(Bash, &mut cmd, "nbtext", &outdir)?;

    // Generate completions for zsh
    generate_to(Zsh, &mut cmd, "nbtext", &outdir)?;

    // Generate completions for fish
    generate_to(Fish, &mut cmd, "nbtext", &outdir)?;

    println!("cargo:warning=Shell completions generated in {outdir:?}");

    Ok(())
}
