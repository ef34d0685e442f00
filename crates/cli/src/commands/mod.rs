//! CLI command definitions and execution
//!
//! Global flags resolve into [`Settings`]; each sub-command then runs against
//! a single [`ObjectStore`] within one command deadline.

use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use s3cli_core::{ConfigManager, Deadline, Error, FlagValues, ObjectStore, Result, Settings};
use s3cli_s3::S3Client;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

pub mod completions;
pub mod download;
pub mod ls;
pub mod read;
pub mod rm;
pub mod upload;
pub mod write;

const AFTER_HELP: &str = "\
Each flag has a corresponding environment variable which will be read if set.
If both environment variable and flag have been set, the flag overrides the
environment variable. Values missing from both are read from the config file.

Without an access key pair, credentials come from the default AWS chain
(environment, shared config files, instance role).

AWS Access Keys:
  https://docs.aws.amazon.com/general/latest/gr/aws-sec-cred-types.html#access-keys-and-secret-access-keys";

/// Flags that take a value, also accepted with a single dash
const VALUE_FLAGS: &[&str] = &[
    "access-key-id",
    "secret-access-key",
    "region",
    "bucket",
    "endpoint-url",
    "config",
];

/// Sub-commands whose remaining arguments are keys or paths
const TARGET_COMMANDS: &[&str] = &["ls", "download", "upload", "read", "write", "rm"];

/// Boolean flags, also accepted with a single dash
const SWITCH_FLAGS: &[&str] = &[
    "continue-on-error",
    "no-color",
    "no-progress",
    "quiet",
    "debug",
];

/// aws-s3 - work with the objects of a single bucket
#[derive(Parser, Debug)]
#[command(name = "aws-s3")]
#[command(author, version, about, long_about = None, after_help = AFTER_HELP)]
pub struct Cli {
    /// AWS access key ID [env: ACCESS_KEY_ID]
    #[arg(long, value_name = "ID")]
    pub access_key_id: Option<String>,

    /// AWS secret access key [env: SECRET_ACCESS_KEY]
    #[arg(long, value_name = "KEY")]
    pub secret_access_key: Option<String>,

    /// AWS region [env: REGION]
    #[arg(long)]
    pub region: Option<String>,

    /// Bucket name [env: BUCKET]
    #[arg(long)]
    pub bucket: Option<String>,

    /// Endpoint of an S3-compatible service [env: ENDPOINT_URL]
    #[arg(long, value_name = "URL")]
    pub endpoint_url: Option<String>,

    /// Config file (default: <config dir>/aws-s3/config.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Keep uploading remaining files after a failed upload
    #[arg(long)]
    pub continue_on_error: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Disable progress bars
    #[arg(long)]
    pub no_progress: bool,

    /// Suppress summaries and progress
    #[arg(short, long)]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List bucket objects, optionally filtered by the given prefix
    Ls(ls::LsArgs),

    /// Download the given object(s) from the bucket
    Download(download::DownloadArgs),

    /// Upload the given file(s) to the bucket
    Upload(upload::UploadArgs),

    /// Read a bucket object to stdout
    Read(read::ReadArgs),

    /// Write a bucket object from stdin
    Write(write::WriteArgs),

    /// Delete the given object(s) from the bucket
    Rm(rm::RmArgs),

    /// Generate shell completion scripts
    Completions(completions::CompletionsArgs),
}

/// Everything a command handler needs
pub struct Context<'a> {
    pub store: &'a dyn ObjectStore,
    pub bucket: String,
    pub deadline: Deadline,
    pub formatter: Formatter,
    pub continue_on_error: bool,
}

impl Context<'_> {
    pub fn output(&self) -> &OutputConfig {
        self.formatter.config()
    }
}

/// Outcome of a command that works through several keys or files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchReport {
    pub completed: usize,
    pub failed: usize,
    pub exit_code: ExitCode,
}

/// Failure of one step for one item, e.g. `error opening object: Not found`
#[derive(Debug)]
pub struct ItemError {
    pub context: &'static str,
    pub source: Error,
}

impl fmt::Display for ItemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.context, self.source)
    }
}

/// Attach the failing step to an error
pub trait ItemContext<T> {
    fn context(self, context: &'static str) -> std::result::Result<T, ItemError>;
}

impl<T, E: Into<Error>> ItemContext<T> for std::result::Result<T, E> {
    fn context(self, context: &'static str) -> std::result::Result<T, ItemError> {
        self.map_err(|e| ItemError {
            context,
            source: e.into(),
        })
    }
}

impl ItemError {
    /// Print the diagnostic line for `item`
    pub fn report(&self, formatter: &Formatter, item: &str) {
        formatter.item_error(item, self.context, &self.source);
    }
}

/// Execute the CLI command and return an exit code
pub async fn execute(cli: Cli) -> ExitCode {
    let output_config = OutputConfig {
        no_color: cli.no_color,
        no_progress: cli.no_progress,
        quiet: cli.quiet,
    };
    let formatter = Formatter::new(output_config);

    if let Some(Commands::Completions(args)) = &cli.command {
        return completions::execute(args);
    }

    let settings = match load_settings(&cli) {
        Ok(settings) => settings,
        Err(e) if e.is_usage() => return usage_error(&e.to_string()),
        Err(e) => {
            formatter.error(&e.to_string());
            return ExitCode::from_error(&e);
        }
    };

    let Some(command) = cli.command else {
        return usage_error("missing command");
    };

    tracing::debug!(bucket = %settings.bucket, region = %settings.client.region, "resolved settings");

    let client = S3Client::new(settings.client.clone());
    let command_deadline = Deadline::after(settings.command_timeout);
    let deadline = if matches!(command, Commands::Ls(_)) {
        command_deadline.narrow(settings.list_timeout)
    } else {
        command_deadline
    };

    let ctx = Context {
        store: &client,
        bucket: settings.bucket,
        deadline,
        formatter,
        continue_on_error: settings.continue_on_error,
    };

    match command {
        Commands::Ls(args) => ls::execute(args, &ctx).await,
        Commands::Download(args) => download::execute(args, &ctx).await,
        Commands::Upload(args) => upload::execute(args, &ctx).await,
        Commands::Read(args) => read::execute(args, &ctx).await,
        Commands::Write(args) => write::execute(args, &ctx).await,
        Commands::Rm(args) => rm::execute(args, &ctx).await,
        Commands::Completions(args) => completions::execute(&args),
    }
}

fn load_settings(cli: &Cli) -> Result<Settings> {
    let manager = match &cli.config {
        Some(path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new()?,
    };
    let config = manager.load()?;

    let flags = FlagValues {
        access_key_id: cli.access_key_id.clone(),
        secret_access_key: cli.secret_access_key.clone(),
        region: cli.region.clone(),
        bucket: cli.bucket.clone(),
        endpoint_url: cli.endpoint_url.clone(),
        continue_on_error: cli.continue_on_error,
    };

    Settings::resolve(&flags, &config, |name| std::env::var(name).ok())
}

/// Print `message` and the usage text to stderr
pub fn usage_error(message: &str) -> ExitCode {
    eprintln!("{message}\n");
    eprintln!("{}", Cli::command().render_help());
    ExitCode::GeneralError
}

/// Rewrite single-dash `-flag` / `-flag=value` arguments into `--flag` form
///
/// Only arguments before the sub-command are treated as flags. Everything
/// after it is passed behind a `--` so that keys or paths starting with a
/// dash reach the command untouched. `download` keeps its leading `--dir`.
pub fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut args = args.into_iter().peekable();
    let mut normalized: Vec<OsString> = args.next().into_iter().collect();
    let mut expect_value = false;

    while let Some(arg) = args.next() {
        if expect_value {
            expect_value = false;
            normalized.push(arg);
            continue;
        }

        let Some(text) = arg.to_str() else {
            normalized.push(arg);
            continue;
        };

        if text == "--" || !text.starts_with('-') {
            // Sub-command reached
            let command = text.to_string();
            normalized.push(arg);
            if TARGET_COMMANDS.contains(&command.as_str()) {
                if command == "download" {
                    push_dir_option(&mut args, &mut normalized);
                }
                if args.peek().is_none_or(|next| *next != "--") {
                    normalized.push(OsString::from("--"));
                }
            }
            normalized.extend(args);
            break;
        }

        let (name, has_value) = match text.trim_start_matches('-').split_once('=') {
            Some((name, _)) => (name, true),
            None => (text.trim_start_matches('-'), false),
        };

        let known_value = VALUE_FLAGS.contains(&name);
        let known_switch = SWITCH_FLAGS.contains(&name);

        if (known_value || known_switch) && !text.starts_with("--") {
            normalized.push(OsString::from(format!("-{text}")));
        } else {
            normalized.push(arg);
        }

        expect_value = known_value && !has_value;
    }

    normalized
}

/// Copy a leading `-d DIR`, `--dir DIR` or `--dir=DIR` of `download`
fn push_dir_option<I>(args: &mut std::iter::Peekable<I>, normalized: &mut Vec<OsString>)
where
    I: Iterator<Item = OsString>,
{
    let Some(text) = args.peek().and_then(|next| next.to_str()).map(str::to_string) else {
        return;
    };

    match text.as_str() {
        "-d" | "--dir" | "-dir" => {
            args.next();
            normalized.push(OsString::from("--dir"));
            normalized.extend(args.next());
        }
        _ => {
            if let Some(dir) = text
                .strip_prefix("--dir=")
                .or_else(|| text.strip_prefix("-dir="))
            {
                args.next();
                normalized.push(OsString::from(format!("--dir={dir}")));
            }
        }
    }
}
