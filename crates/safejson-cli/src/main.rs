use std::fs::File;
use std::io::{Read, stdin};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use safejson::{DefaultMasker, Options, Printer};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "safejson",
    about = "Pretty print JSON with tab indentation, optionally masking secrets",
    version
)]
struct Args {
    /// Mask sensitive keys (password, authorization, access_token, ...)
    #[arg(short, long)]
    secure: bool,

    /// Extra key to mask; may be repeated. Implies --secure
    #[arg(long = "mask-key", value_name = "KEY")]
    mask_keys: Vec<String>,

    /// Character used for masking
    #[arg(long, default_value_t = '*')]
    mask_char: char,

    /// Indent with N spaces instead of a tab
    #[arg(long, value_name = "N")]
    indent: Option<usize>,

    /// Keep <, > and & unescaped
    #[arg(long)]
    no_escape_html: bool,

    /// Write to this file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Input file (defaults to stdin)
    input: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut buf = String::new();
    match &args.input {
        Some(path) => {
            let mut f = File::open(path).with_context(|| format!("opening {}", path.display()))?;
            f.read_to_string(&mut buf)?;
        }
        None => {
            stdin().read_to_string(&mut buf)?;
        }
    }
    let value: serde_json::Value = serde_json::from_str(&buf).context("input is not valid JSON")?;
    debug!(bytes = buf.len(), "parsed input");

    let options = Options {
        indent: match args.indent {
            Some(n) => " ".repeat(n),
            None => String::from("\t"),
        },
        escape_html: !args.no_escape_html,
        ..Options::default()
    };
    let masker = args
        .mask_keys
        .iter()
        .fold(DefaultMasker::builder().mask_char(args.mask_char), |b, key| b.sensitive_key(key.as_str()))
        .build();
    let printer = Printer::new(Arc::new(masker), options);
    let secure = args.secure || !args.mask_keys.is_empty();

    match (&args.output, secure) {
        (Some(path), true) => printer.save_secure_json_file(path, &value)?,
        (Some(path), false) => printer.save_json_file(path, &value)?,
        (None, true) => print!("{}", printer.secure_json(&value)?),
        (None, false) => print!("{}", printer.pretty_json(&value)?),
    }

    Ok(())
}
