mod runner;
mod tap;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use fsml_core::config::DEFAULT_MAX_STACK_DEPTH;
use fsml_core::{parse_source, FrontendError, ParseConfig};

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Front end for the FSML automaton language.
#[derive(Parser)]
#[command(
    name = "fsml",
    version,
    about = "Front end for the FSML automaton language",
    arg_required_else_help = true
)]
struct Cli {
    /// Path to the .fsml source file; the dump is written to <FILE>.out
    file: Option<PathBuf>,

    /// Write the dump to this path instead of <FILE>.out
    #[arg(long, conflicts_with = "stdout")]
    out: Option<PathBuf>,

    /// Print the dump to stdout instead of writing a file
    #[arg(long)]
    stdout: bool,

    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Maximum parse stack depth
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_STACK_DEPTH)]
    max_depth: usize,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the conformance suite
    Test {
        /// Path to the conformance suite directory
        #[arg(default_value = "conformance")]
        suite_dir: PathBuf,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let config = ParseConfig::default().with_max_stack_depth(cli.max_depth);

    match (cli.command, cli.file) {
        (Some(Commands::Test { suite_dir }), _) => {
            cmd_test(&suite_dir, &config);
        }
        (None, Some(file)) => {
            let target = if cli.stdout {
                None
            } else {
                Some(cli.out.unwrap_or_else(|| default_out_path(&file)))
            };
            cmd_parse(&file, target.as_deref(), &config, cli.output, cli.quiet);
        }
        (None, None) => {
            eprintln!("error: no input file given (see --help)");
            process::exit(2);
        }
    }
}

/// `<FILE>.out`, next to the input.
fn default_out_path(file: &Path) -> PathBuf {
    let mut name = file.as_os_str().to_owned();
    name.push(".out");
    PathBuf::from(name)
}

fn cmd_parse(
    file: &Path,
    target: Option<&Path>,
    config: &ParseConfig,
    output: OutputFormat,
    quiet: bool,
) {
    let src = match std::fs::read_to_string(file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: cannot read {}: {}", file.display(), e);
            process::exit(1);
        }
    };

    let program = match parse_source(&src, config) {
        Ok(p) => p,
        Err(e) => {
            report_error(file, &e, output);
            process::exit(1);
        }
    };
    log::info!(
        "{}: {} declaration(s)",
        file.display(),
        program.declarations.len()
    );

    let rendered = match output {
        OutputFormat::Text => program.to_string(),
        OutputFormat::Json => match serde_json::to_string_pretty(&program) {
            Ok(json) => json + "\n",
            Err(e) => {
                eprintln!("error: serialization failed: {}", e);
                process::exit(1);
            }
        },
    };

    match target {
        None => print!("{}", rendered),
        Some(path) => {
            if let Err(e) = std::fs::write(path, &rendered) {
                eprintln!("error: cannot write {}: {}", path.display(), e);
                process::exit(1);
            }
            if !quiet {
                println!(
                    "{}: {} declaration(s) written to {}",
                    file.display(),
                    program.declarations.len(),
                    path.display()
                );
            }
        }
    }
}

fn report_error(file: &Path, e: &FrontendError, output: OutputFormat) {
    match output {
        OutputFormat::Json => {
            let value = serde_json::json!({
                "file": file.display().to_string(),
                "error": e,
            });
            let err_json = serde_json::to_string_pretty(&value)
                .unwrap_or_else(|_| format!("{{\"error\": \"{}\"}}", e.message()));
            eprintln!("{}", err_json);
        }
        OutputFormat::Text => {
            eprintln!("{}:{}: {}", file.display(), e.position(), e.message());
        }
    }
}

fn cmd_test(suite_dir: &Path, config: &ParseConfig) {
    if !suite_dir.exists() {
        eprintln!(
            "error: conformance suite directory not found: {}",
            suite_dir.display()
        );
        process::exit(1);
    }

    let tap = runner::run_suite(suite_dir, config);
    let mut stdout = std::io::stdout().lock();
    if let Err(e) = tap.write_to(&mut stdout) {
        eprintln!("error: cannot write report: {}", e);
        process::exit(1);
    }
    if tap.failure_count() > 0 {
        process::exit(1);
    }
}
