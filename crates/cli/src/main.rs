//! aws-s3 - single-bucket S3 command-line client
//!
//! Lists, reads, writes, uploads, downloads and deletes the objects of one
//! bucket on AWS S3 or an S3-compatible service.

use clap::Parser;
use clap::error::ErrorKind;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use s3cli::commands::{self, Cli};
use s3cli::exit_code::ExitCode;

const DEBUG_FILTER: &str = "warn,s3cli=debug,s3cli_core=debug,s3cli_s3=debug";

#[tokio::main]
async fn main() {
    let args = commands::normalize_args(std::env::args_os());
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) => {
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::Success,
                _ => ExitCode::GeneralError,
            };
            // Help goes to stdout, errors with usage to stderr
            let _ = e.print();
            std::process::exit(code.as_i32());
        }
    };

    init_tracing(cli.debug);

    let exit_code = tokio::select! {
        code = commands::execute(cli) => code,
        Ok(()) = tokio::signal::ctrl_c() => {
            tracing::debug!("interrupted");
            ExitCode::Interrupted
        }
    };

    std::process::exit(exit_code.as_i32());
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new(DEBUG_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}
