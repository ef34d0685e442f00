//! ls command - List bucket objects
//!
//! Prints one key per line to stdout, following pagination to the end.

use clap::Args;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use super::Context;
use crate::exit_code::ExitCode;

/// List bucket objects
#[derive(Args, Debug)]
pub struct LsArgs {
    /// Only list keys starting with this prefix
    #[arg(allow_hyphen_values = true)]
    pub prefix: Option<String>,
}

/// Execute the ls command
pub async fn execute(args: LsArgs, ctx: &Context<'_>) -> ExitCode {
    let mut stdout = tokio::io::stdout();
    run(ctx, args.prefix.as_deref().unwrap_or_default(), &mut stdout).await
}

/// List keys under `prefix` into `out`
///
/// Nothing is written when listing fails part way through.
pub async fn run<W>(ctx: &Context<'_>, prefix: &str, out: &mut W) -> ExitCode
where
    W: AsyncWrite + Unpin,
{
    let keys = match ctx.store.list(&ctx.deadline, &ctx.bucket, prefix).await {
        Ok(keys) => keys,
        Err(e) => {
            ctx.formatter.error(&format!("error listing objects: {e}"));
            return ExitCode::from_error(&e);
        }
    };

    tracing::debug!(prefix, count = keys.len(), "listed objects");

    let mut listing = String::with_capacity(keys.iter().map(|k| k.len() + 1).sum());
    for key in &keys {
        listing.push_str(key);
        listing.push('\n');
    }

    let written = async {
        out.write_all(listing.as_bytes()).await?;
        out.flush().await
    };
    if let Err(e) = written.await {
        ctx.formatter.error(&format!("error writing listing: {e}"));
        return ExitCode::GeneralError;
    }

    ExitCode::Success
}
