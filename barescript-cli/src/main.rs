//! `bares` — run barescript source files or dump their parsed AST.

use barescript_runtime::host::HostOptions;
use barescript_runtime::{execute_script, execute_script_async, parse_script};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;

#[derive(Parser)]
#[command(
    name = "bares",
    version,
    about = "Run barescript source files",
    long_about = "bares executes barescript programs: a small dynamically-typed \
                  scripting language for computing expressions and driving data \
                  transformations from Markdown-embedded code blocks.\n\n\
                  Examples:\n  \
                  bares run script.bs\n  \
                  bares run --async --max-statements 50000 fetcher.bs\n  \
                  bares ast script.bs"
)]
struct Cli {
    /// Log verbosity for ambient diagnostics (parse/eval phases), not the
    /// script's own `debugLog` output, which always goes to stdout.
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and execute a script file, printing the stringified result.
    Run {
        /// Path to the `.bs` source file.
        file: PathBuf,

        /// Maximum statements the evaluator will execute before failing
        /// (`0` disables the check). Defaults to the host's own default
        /// (10,000,000).
        #[arg(long)]
        max_statements: Option<u64>,

        /// Run under the asynchronous evaluator (enables `fetch` and
        /// `async function` calls) instead of the synchronous one.
        #[arg(long)]
        r#async: bool,
    },
    /// Parse a script file and print its AST as JSON.
    Ast {
        /// Path to the `.bs` source file.
        file: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_new(&cli.log_level)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Run {
            file,
            max_statements,
            r#async,
        } => run_cmd(&file, max_statements, r#async),
        Commands::Ast { file } => ast_cmd(&file),
    }
}

fn read_source(file: &PathBuf) -> Result<String, ExitCode> {
    std::fs::read_to_string(file).map_err(|e| {
        eprintln!("bares: could not read {}: {e}", file.display());
        ExitCode::FAILURE
    })
}

fn run_cmd(file: &PathBuf, max_statements: Option<u64>, run_async: bool) -> ExitCode {
    let source = match read_source(file) {
        Ok(s) => s,
        Err(code) => return code,
    };

    let script = match parse_script(&source) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("bares: {e}");
            return ExitCode::FAILURE;
        }
    };
    tracing::debug!(statements = script.statements.len(), "parsed script");

    let mut host = HostOptions::default();
    if let Some(max) = max_statements {
        host.max_statements = max;
    }
    let host = Rc::new(host);

    let result = if run_async {
        let rt = match tokio::runtime::Builder::new_current_thread().enable_time().build() {
            Ok(rt) => rt,
            Err(e) => {
                eprintln!("bares: could not start runtime: {e}");
                return ExitCode::FAILURE;
            }
        };
        rt.block_on(execute_script_async(&script, &host))
    } else {
        execute_script(&script, &host)
    };

    match result {
        Ok(value) => {
            println!("{}", value.stringify());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("bares: {e}");
            ExitCode::FAILURE
        }
    }
}

fn ast_cmd(file: &PathBuf) -> ExitCode {
    let source = match read_source(file) {
        Ok(s) => s,
        Err(code) => return code,
    };
    let script = match parse_script(&source) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("bares: {e}");
            return ExitCode::FAILURE;
        }
    };
    match serde_json::to_string_pretty(&script) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("bares: could not serialize AST: {e}");
            ExitCode::FAILURE
        }
    }
}
