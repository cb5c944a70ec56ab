//! xml2json CLI - Main entry point

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use xml2json_core::{
    ConvertOptions, DEFAULT_MAX_DEPTH, EncodeOptions, RawExpressionMode, from_xml_with,
};

/// Convert an XML document to JSON
#[derive(Parser, Debug)]
#[command(name = "xml2json")]
#[command(version)]
#[command(about = "Convert XML documents to JSON", long_about = None)]
struct Args {
    /// XML file to convert; reads stdin when omitted or "-"
    input: Option<PathBuf>,

    /// Write JSON to FILE instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Include XML attributes under "@attributes"
    #[arg(short, long)]
    attributes: bool,

    /// Deepest element nesting allowed, counting the root as 0
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Indent the JSON output
    #[arg(long)]
    pretty: bool,

    /// Write raw expressions as JSON strings instead of verbatim
    #[arg(long)]
    quote_expressions: bool,
}

impl Args {
    fn convert_options(&self) -> ConvertOptions {
        ConvertOptions::default()
            .with_attributes(self.attributes)
            .with_max_depth(self.max_depth)
    }

    fn encode_options(&self) -> EncodeOptions {
        let mode = if self.quote_expressions {
            RawExpressionMode::Quoted
        } else {
            RawExpressionMode::Verbatim
        };
        EncodeOptions {
            pretty: self.pretty,
            raw_expressions: mode,
        }
    }

    fn reads_stdin(&self) -> bool {
        self.input
            .as_deref()
            .is_none_or(|path| path == Path::new("-"))
    }
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "xml2json=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    if let Err(e) = run(Args::parse()) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let source = read_input(&args)?;
    let json = convert(&source, &args)?;

    match &args.output {
        Some(path) => fs::write(path, format!("{json}\n"))
            .with_context(|| format!("Failed to write output file: {}", path.display()))?,
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{json}").context("Failed to write to stdout")?;
        }
    }

    Ok(())
}

fn read_input(args: &Args) -> Result<String> {
    if args.reads_stdin() {
        let mut source = String::new();
        io::stdin()
            .read_to_string(&mut source)
            .context("Failed to read XML from stdin")?;
        return Ok(source);
    }

    let path = args.input.as_deref().unwrap_or(Path::new("-"));
    fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file: {}", path.display()))
}

fn convert(source: &str, args: &Args) -> Result<String> {
    let options = args.convert_options();
    tracing::info!(
        attributes = options.include_attributes,
        max_depth = options.max_depth,
        "converting input"
    );

    from_xml_with(source, &options, &args.encode_options()).context(match &args.input {
        Some(path) if !args.reads_stdin() => format!("Failed to convert {}", path.display()),
        _ => "Failed to convert XML from stdin".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("xml2json").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = args(&[]);
        assert!(args.reads_stdin());
        assert_eq!(args.convert_options(), ConvertOptions::default());
        assert_eq!(args.encode_options(), EncodeOptions::default());
    }

    #[test]
    fn test_dash_reads_stdin() {
        assert!(args(&["-"]).reads_stdin());
        assert!(!args(&["doc.xml"]).reads_stdin());
    }

    #[test]
    fn test_flags_map_to_options() {
        let args = args(&["-a", "--max-depth", "4", "--pretty", "--quote-expressions"]);
        assert_eq!(
            args.convert_options(),
            ConvertOptions::default().with_attributes(true).with_max_depth(4)
        );
        assert_eq!(
            args.encode_options(),
            EncodeOptions::pretty().with_raw_expressions(RawExpressionMode::Quoted)
        );
    }

    #[test]
    fn test_rejects_non_numeric_depth() {
        let result = Args::try_parse_from(["xml2json", "--max-depth", "deep"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_convert_with_attributes() {
        let json = convert(r#"<a x="1">hi</a>"#, &args(&["-a"])).unwrap();
        assert_eq!(json, r#"{"a":{"@attributes":{"x":"1"},"@text":"hi"}}"#);
    }

    #[test]
    fn test_convert_error_has_context() {
        let err = convert("<a>", &args(&["broken.xml"])).unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.starts_with("Failed to convert broken.xml: invalid XML input"));
    }

    #[test]
    fn test_run_file_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.xml");
        let output = dir.path().join("out.json");
        fs::write(&input, "<list><i>1</i><i>2</i></list>").unwrap();

        run(args(&[
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ]))
        .unwrap();

        assert_eq!(
            fs::read_to_string(&output).unwrap(),
            "{\"list\":{\"i\":[\"1\",\"2\"]}}\n"
        );
    }

    #[test]
    fn test_run_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.xml");
        let err = run(args(&[missing.to_str().unwrap()])).unwrap_err();
        assert!(format!("{err}").starts_with("Failed to read input file"));
    }
}
