//! TLS 1.3 interoperability test generator.
//!
//! # Commands
//!
//! - `generate` - Write `run_test` cases for the selected suites
//! - `list` - List available suites
//! - `predict` - Print the key exchange mode a handshake should settle on

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tls13_compat::{
    suites::{self, TestSuite},
    Config, Prediction, VERSION,
};

#[derive(Parser)]
#[command(name = "tls13-compat")]
#[command(version = VERSION)]
#[command(about = "Generate TLS 1.3 interoperability tests for ssl-opt.sh", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate test cases
    Generate {
        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Suite to generate, repeatable (default: all)
        #[arg(long = "test-suite", value_name = "NAME")]
        test_suite: Vec<String>,

        /// Config file (default: <config dir>/tls13-compat/config.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// List available test suites
    List,

    /// Predict the negotiated key exchange mode
    Predict {
        /// Implementation doing the selection (openssl, gnutls, mbedtls)
        #[arg(short, long)]
        implementation: String,

        /// Modes the selecting side is configured with
        #[arg(short, long)]
        local: String,

        /// Modes the peer offers
        #[arg(short, long)]
        peer: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Generate {
            output,
            test_suite,
            config,
        } => cmd_generate(output, &test_suite, config),

        Commands::List => {
            println!("{}", suites::suite_list());
            Ok(())
        },

        Commands::Predict {
            implementation,
            local,
            peer,
            json,
        } => cmd_predict(&implementation, &local, &peer, json),
    }
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<Config> {
    let file_config = match path {
        Some(path) => Config::from_file(&path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => match Config::default_path().filter(|p| p.exists()) {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        },
    };
    Ok(file_config.merge(Config::from_env()))
}

fn cmd_generate(
    output: Option<PathBuf>,
    test_suite: &[String],
    config: Option<PathBuf>,
) -> anyhow::Result<()> {
    let config = load_config(config)?;

    let mut selected = test_suite
        .iter()
        .map(|name| name.parse::<TestSuite>())
        .collect::<Result<Vec<_>, _>>()?;
    if selected.is_empty() {
        selected = config.generator.suites.clone();
    }
    if selected.is_empty() {
        selected = TestSuite::all().to_vec();
    }

    let options = config.generate_options()?;
    let mut args = std::env::args();
    let program = args
        .next()
        .and_then(|arg0| {
            std::path::Path::new(&arg0)
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "tls13-compat".to_string());
    let command_line = std::iter::once(program).chain(args).collect::<Vec<_>>().join(" ");

    let count = suites::output_test_cases(&selected, output.as_deref(), &command_line, &options)?;
    tracing::debug!("{count} test cases written");
    Ok(())
}

fn cmd_predict(implementation: &str, local: &str, peer: &str, json: bool) -> anyhow::Result<()> {
    let prediction = Prediction::parse(implementation, local, peer)?;
    if json {
        println!("{}", prediction.to_json()?);
    } else {
        println!("{prediction}");
    }
    Ok(())
}
