//! Command-line interface for `jpatch-core`.
//!
//! Diff mode prints the RFC 6902 patch that turns FILE1 into FILE2. Patch
//! mode (`-p`) applies a patch file to a document and prints the result.

use std::ffi::OsString;
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use clap::{ArgAction, Parser};
use jpatch_core::{DiffOptions, KeyOrder, Patch, Value};
use tracing::debug;
use tracing_subscriber::EnvFilter;

const VERSION_NUMBER: &str = env!("CARGO_PKG_VERSION");
const VERSION_BANNER: &str = concat!("jpatch version ", env!("CARGO_PKG_VERSION"));

// Exit codes: equal (or patch applied), patch produced, failure.
const EXIT_SAME: i32 = 0;
const EXIT_DIFFERENT: i32 = 1;
const EXIT_ERROR: i32 = 2;

const HELP_TEMPLATE: &str = r#"Usage: jpatch [OPTION]... FILE1 [FILE2]
Generate and apply RFC 6902 JSON Patches.

Prints the patch turning FILE1 into FILE2 to STDOUT.
When FILE2 is omitted the second input is read from STDIN.
When patching (-p) FILE1 is a patch and FILE2 the document.

Options:
  -p, --patch    Apply patch FILE1 to FILE2 or STDIN.
  -o FILE3       Write to FILE3 instead of STDOUT.
  --yaml         Read documents as YAML. Patched documents are written as YAML.
  --sort-keys    Emit object operations in sorted key order.
  --pretty       Pretty-print JSON output.
  -v, --verbose  Log to STDERR (-vv for more). RUST_LOG overrides.

Exit status is 0 when the inputs are equal or the patch applied, 1 when a
patch was produced and 2 on error.

Examples:
  jpatch a.json b.json
  cat b.json | jpatch a.json
  jpatch -o patch.json a.json b.json; jpatch -p patch.json a.json

Version: {version}
"#;

#[derive(Debug, Parser)]
#[command(
    name = "jpatch",
    disable_help_flag = true,
    disable_help_subcommand = true,
    disable_version_flag = true,
    override_usage = "jpatch [OPTION]... FILE1 [FILE2]"
)]
struct Cli {
    #[arg(long = "help", short = 'h', action = ArgAction::SetTrue, hide = true)]
    help: bool,

    #[arg(long = "version", action = ArgAction::SetTrue, hide = true)]
    version: bool,

    /// Enable patch mode (apply FILE1 patch to FILE2/STDIN).
    #[arg(short = 'p', long = "patch", action = ArgAction::SetTrue)]
    patch: bool,

    /// Write output to FILE instead of STDOUT.
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Read documents as YAML.
    #[arg(long = "yaml", action = ArgAction::SetTrue)]
    yaml: bool,

    /// Emit object operations in sorted key order.
    #[arg(long = "sort-keys", action = ArgAction::SetTrue)]
    sort_keys: bool,

    /// Pretty-print JSON output.
    #[arg(long = "pretty", action = ArgAction::SetTrue)]
    pretty: bool,

    /// Raise the log level; repeat for more.
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,

    /// Positional inputs (FILE1 \[FILE2]).
    #[arg()]
    inputs: Vec<OsString>,
}

fn main() {
    match try_main() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            let _ = writeln!(io::stderr(), "{err:#}");
            std::process::exit(EXIT_ERROR);
        }
    }
}

fn try_main() -> Result<i32> {
    let args = canonicalize_args(std::env::args_os());
    let cli = Cli::parse_from(args);

    if cli.help {
        print!("{}", help_text());
        return Ok(EXIT_SAME);
    }

    if cli.version {
        println!("{VERSION_BANNER}");
        return Ok(EXIT_SAME);
    }

    init_tracing(cli.verbose);

    let mode = if cli.patch { Mode::Patch } else { Mode::Diff };
    debug!(?mode, inputs = cli.inputs.len(), "starting");

    match mode {
        Mode::Diff => run_diff(&cli),
        Mode::Patch => run_patch(&cli),
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Mode {
    Diff,
    Patch,
}

fn init_tracing(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run_diff(cli: &Cli) -> Result<i32> {
    let (first, second) = input_sources(cli)?;

    let lhs_text = read_input(&first)?;
    let rhs_text = read_input(&second)?;
    let lhs = parse_document(&lhs_text, cli.yaml).context("failed to parse first input")?;
    let rhs = parse_document(&rhs_text, cli.yaml).context("failed to parse second input")?;

    let patch = lhs.diff_with_options(&rhs, &build_options(cli));
    let rendered = if cli.pretty {
        patch.to_json_string_pretty().context("failed to render JSON Patch")?
    } else {
        patch.to_json_string()
    };

    write_output(cli, &rendered)?;
    Ok(if patch.is_empty() { EXIT_SAME } else { EXIT_DIFFERENT })
}

fn run_patch(cli: &Cli) -> Result<i32> {
    let (patch_source, document_source) = input_sources(cli)?;

    let patch_text = read_input(&patch_source)?;
    let document_text = read_input(&document_source)?;
    let patch = Patch::from_json_str(&patch_text).context("failed to parse patch")?;
    let document =
        parse_document(&document_text, cli.yaml).context("failed to parse document")?;

    let patched = document.apply_patch(&patch).context("failed to apply patch")?;
    let rendered = if cli.yaml {
        serde_yaml::to_string(&patched).context("failed to render YAML")?
    } else if cli.pretty {
        patched.to_json_string_pretty().context("failed to render JSON")?
    } else {
        patched.to_json_string()
    };

    write_output(cli, &rendered)?;
    Ok(EXIT_SAME)
}

#[derive(Debug)]
enum InputSource {
    File(PathBuf),
    Stdin,
}

fn input_sources(cli: &Cli) -> Result<(InputSource, InputSource)> {
    match cli.inputs.as_slice() {
        [first] => Ok((InputSource::File(path_from(first)?), InputSource::Stdin)),
        [first, second] => {
            Ok((InputSource::File(path_from(first)?), InputSource::File(path_from(second)?)))
        }
        _ => Err(anyhow!("{}", help_text())),
    }
}

fn path_from(input: &OsString) -> Result<PathBuf> {
    let path = PathBuf::from(input);
    if path.as_os_str().is_empty() {
        bail!("expected file path; got empty string");
    }
    Ok(path)
}

fn read_input(source: &InputSource) -> Result<String> {
    match source {
        InputSource::File(path) => {
            debug!(path = %path.display(), "reading input");
            fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
        }
        InputSource::Stdin => {
            debug!("reading input from stdin");
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer).context("failed to read stdin")?;
            Ok(buffer)
        }
    }
}

fn parse_document(input: &str, yaml: bool) -> Result<Value> {
    let value = if yaml { Value::from_yaml_str(input)? } else { Value::from_json_str(input)? };
    Ok(value)
}

fn build_options(cli: &Cli) -> DiffOptions {
    let key_order = if cli.sort_keys { KeyOrder::Sorted } else { KeyOrder::Document };
    DiffOptions::default().with_key_order(key_order)
}

fn write_output(cli: &Cli, rendered: &str) -> Result<()> {
    let mut text = rendered.to_owned();
    if !text.ends_with('\n') {
        text.push('\n');
    }

    if let Some(path) = &cli.output {
        fs::write(path, text.as_bytes())
            .with_context(|| format!("failed to write output to {}", path.display()))?;
    } else {
        let mut stdout = io::stdout().lock();
        stdout.write_all(text.as_bytes()).context("failed to write to stdout")?;
        stdout.flush().ok();
    }
    Ok(())
}

/// Accepts single-dash spellings of long flags (`-yaml`, `-pretty`, ...).
fn canonicalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut canonicalized = Vec::new();
    for (idx, arg) in args.into_iter().enumerate() {
        if idx == 0 {
            canonicalized.push(arg);
            continue;
        }
        match arg.to_str() {
            Some("-help") => canonicalized.push(OsString::from("--help")),
            Some("-version") => canonicalized.push(OsString::from("--version")),
            Some("-yaml") => canonicalized.push(OsString::from("--yaml")),
            Some("-pretty") => canonicalized.push(OsString::from("--pretty")),
            Some("-sort-keys") => canonicalized.push(OsString::from("--sort-keys")),
            Some(other) if other.starts_with("-o=") => {
                canonicalized.push(OsString::from("-o"));
                canonicalized.push(OsString::from(other.trim_start_matches("-o=")));
            }
            _ => canonicalized.push(arg),
        }
    }
    canonicalized
}

fn help_text() -> String {
    HELP_TEMPLATE.replace("{version}", VERSION_NUMBER)
}
