// rust/ttlc-cli/src/main.rs
// ttlc driver: one input file in, one .plan.bin out
// Exit codes: 0 success, 1 any error

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use ttlc::{compile_file, default_output_path, CompileError, CompileOptions};

#[derive(Debug, Parser)]
#[command(
    name = "ttlc",
    version,
    about = "Compile a Turtle/OWL/SHACL specification into a binary execution plan"
)]
struct Cli {
    /// Input TTL file
    input: PathBuf,
    /// Output path (defaults to the input with a .plan.bin extension)
    output: Option<PathBuf>,
    /// Abort on the first parse error or validation violation
    #[arg(long)]
    strict: bool,
    /// Skip SHACL validation
    #[arg(long = "no-validate")]
    no_validate: bool,
    /// Verbose progress logging
    #[arg(long, short)]
    verbose: bool,
    /// Print compilation statistics as JSON
    #[arg(long)]
    stats: bool,
    /// Trace-level logging
    #[arg(long)]
    debug: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(&cli.input, &e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), CompileError> {
    let config = ttlc_config::load_config()?;
    let mut opts = CompileOptions::new(config);
    if cli.strict {
        opts.strict = true;
    }
    if cli.no_validate {
        opts.validate = false;
    }

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&cli.input));
    let outcome = compile_file(&cli.input, &output, &opts)?;

    for line in &outcome.stats.contradictions {
        eprintln!("{}: disjointness-contradiction: {line}", cli.input.display());
    }
    if cli.stats {
        let mut value =
            serde_json::to_value(&outcome.stats).unwrap_or(serde_json::json!({}));
        if let Some(report) = &outcome.report {
            if let Ok(report_value) = serde_json::to_value(report) {
                value["report"] = report_value;
            }
        }
        match serde_json::to_string_pretty(&value) {
            Ok(text) => println!("{text}"),
            Err(_) => println!("{value}"),
        }
    }
    Ok(())
}

/// One error per line: path:line:col: KIND: message.
fn report_error(input: &std::path::Path, e: &CompileError) {
    let (line, col) = e.position().unwrap_or((0, 0));
    eprintln!("{}:{}:{}: {}: {}", input.display(), line, col, e.kind(), e);
}

fn init_logging(cli: &Cli) {
    let level = if cli.debug {
        "trace"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
