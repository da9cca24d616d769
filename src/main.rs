//! linewise: print the lines of a file, stdin or TCP stream
//!
//! Usage: linewise [OPTIONS] [INPUT]

use clap::{ArgAction, Parser};
use std::io;
use std::path::PathBuf;
use std::process;

use linewise::config::{parse_max_line_length, ReaderOptions};
use linewise::eol::{self, Encoding};
use linewise::error::LinewiseError;
use linewise::output::OutputWriter;
use linewise::source::{PullSource, ReadSource, SocketSource, SourceKind};
use linewise::LineReader;

#[derive(Parser)]
#[command(name = "linewise")]
#[command(version)]
#[command(about = "linewise: split a byte stream into lines by encoding and EOL dialect", long_about = None)]
struct Cli {
    /// Input file (omit or use - for stdin)
    input: Option<PathBuf>,

    /// Read from a TCP address (host:port) instead of a file
    #[arg(long, conflicts_with = "input")]
    connect: Option<String>,

    /// Text encoding of the input
    #[arg(short, long)]
    encoding: Option<String>,

    /// EOL dialect (crlf, lf, basic, 7bit, iso8859, all, or an alias such as dos or unix)
    #[arg(short = 'l', long = "eol")]
    eol: Option<String>,

    /// Maximum line length in characters (0 = unlimited)
    #[arg(long = "max-line-length")]
    max_line_length: Option<String>,

    /// Destroy the input once reading stops (files and sockets only)
    #[arg(long)]
    auto_destroy: bool,

    /// Prefix each line with its number
    #[arg(short = 'n', long)]
    number: bool,

    /// Print only the number of lines
    #[arg(short = 'c', long, conflicts_with = "number")]
    count: bool,

    /// List the supported encodings and exit
    #[arg(long)]
    list_encodings: bool,

    /// List the EOL dialects valid for an encoding and exit
    #[arg(long, value_name = "ENC")]
    list_eol: Option<String>,

    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = if cli.list_encodings {
        list_encodings()
    } else if let Some(enc) = cli.list_eol.as_deref() {
        list_eol(enc)
    } else {
        run(&cli)
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("linewise={}", level)));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(true))
        .with(filter)
        .init();
}

fn list_encodings() -> Result<(), LinewiseError> {
    let stdout = io::stdout();
    let mut out = OutputWriter::new(stdout.lock());
    for encoding in eol::encodings() {
        out.write_line(encoding.as_str())?;
    }
    out.flush()?;
    Ok(())
}

fn list_eol(encoding: &str) -> Result<(), LinewiseError> {
    let encoding: Encoding = encoding.parse()?;
    let stdout = io::stdout();
    let mut out = OutputWriter::new(stdout.lock());
    for dialect in eol::eol_matches(encoding) {
        out.write_line(dialect.as_str())?;
    }
    out.flush()?;
    Ok(())
}

fn build_options(cli: &Cli) -> Result<ReaderOptions, LinewiseError> {
    let mut options = ReaderOptions::new().auto_destroy_source(cli.auto_destroy);
    if let Some(encoding) = cli.encoding.as_deref() {
        options = options.encoding(encoding.parse()?);
    }
    if let Some(eol) = cli.eol.as_deref() {
        options = options.eol_match(eol.parse()?);
    }
    if let Some(max) = cli.max_line_length.as_deref() {
        options = options.max_line_length(parse_max_line_length(max)?);
    }
    Ok(options)
}

fn run(cli: &Cli) -> Result<(), LinewiseError> {
    let options = build_options(cli)?;

    if let Some(addr) = cli.connect.as_deref() {
        let source = SocketSource::connect(addr)?;
        return print_lines(source, options, cli);
    }

    match cli.input.as_deref() {
        Some(path) if path.as_os_str() != "-" => {
            let source = ReadSource::open(path)?;
            print_lines(source, options, cli)
        }
        _ => {
            let source = ReadSource::with_kind(io::stdin(), SourceKind::Stream);
            print_lines(source, options, cli)
        }
    }
}

fn print_lines<S: PullSource>(
    source: S,
    options: ReaderOptions,
    cli: &Cli,
) -> Result<(), LinewiseError> {
    let mut reader = LineReader::new(source, options)?;
    let stdout = io::stdout();
    let mut out = OutputWriter::new(stdout.lock());

    let mut number: u64 = 0;
    for line in reader.lines() {
        let line = line?;
        number += 1;
        if cli.count {
            continue;
        }
        if cli.number {
            out.write_numbered(number, &line)?;
        } else {
            out.write_line(&line)?;
        }
    }
    if cli.count {
        out.write_count(reader.line_count())?;
    }
    out.flush()?;
    Ok(())
}
