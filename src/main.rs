use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use rawk::driver;
use rawk::fields::Separator;
use rawk::interrupt::{self, Progress};
use rawk::options::Options;
use rawk::output::Output;
use rawk::reader::Terminator;

#[derive(Parser)]
#[command(name = "rawk", version)]
#[command(
    about = "Run Rhai code for every record of the input, with fields bound to A1, N2, D3, ..."
)]
#[command(after_help = "\
Names available to CODE:
  A1, A2, ...   field text (A0 is the whole record)
  N1, D1, ...   field as integer / float, 0 when malformed
  A, N, D       all fields as an array; A(k), N(k), D(k) by computed index
  NF, NR        number of fields, record number
  P(x, ...)     print up to 8 values separated by spaces; P([..]) for more
  a..z, sum, count, acc, seen   preset variables")]
struct Cli {
    /// Input file, or - for standard input
    #[arg(value_name = "FILENAME")]
    input: String,

    /// Code run for every record, in order
    #[arg(value_name = "CODE")]
    code: Vec<String>,

    /// Field separator (default: runs of whitespace)
    #[arg(short = 'F', long = "separator", value_name = "SEP")]
    separator: Option<String>,

    /// Line separator (default: newline; empty for paragraphs)
    #[arg(short = 'L', long = "line-separator", value_name = "SEP")]
    line_separator: Option<String>,

    /// Code run once before the first record
    #[arg(short = 'B', long = "begin", value_name = "CODE")]
    begin: Option<String>,

    /// Code run once after the last record
    #[arg(short = 'E', long = "end", value_name = "CODE")]
    end: Option<String>,

    /// Print extra information for debugging
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

impl From<Cli> for Options {
    fn from(cli: Cli) -> Self {
        Options {
            separator: Separator::from_arg(cli.separator.as_deref()),
            terminator: Terminator::from_arg(cli.line_separator.as_deref()),
            verbose: cli.verbose,
            code: cli.code,
            begin: cli.begin,
            end: cli.end,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let input: Box<dyn BufRead> = if cli.input == "-" {
        Box::new(io::stdin().lock())
    } else {
        let file = File::open(&cli.input)
            .with_context(|| format!("cannot open input '{}'", cli.input))?;
        Box::new(BufReader::new(file))
    };

    let progress = Progress::default();
    interrupt::install(progress.clone()).context("failed to install SIGINT handler")?;

    let options = Options::from(cli);
    driver::run(&options, input, Output::stdout(), &progress)?;
    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("rawk=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).without_time())
        .with(filter)
        .init();
}
