//! rm command - Remove objects
//!
//! Deletes each key in turn. A failed key is reported and the rest are still
//! attempted.

use clap::Args;

use super::{BatchReport, Context, ItemContext};
use crate::exit_code::ExitCode;

/// Remove objects
#[derive(Args, Debug)]
pub struct RmArgs {
    /// Object key(s) to delete
    #[arg(required = true, allow_hyphen_values = true)]
    pub keys: Vec<String>,
}

/// Execute the rm command
pub async fn execute(args: RmArgs, ctx: &Context<'_>) -> ExitCode {
    run(ctx, &args.keys).await.exit_code
}

/// Delete `keys`, continuing past failures
pub async fn run(ctx: &Context<'_>, keys: &[String]) -> BatchReport {
    let mut deleted = 0;
    let mut failed = 0;

    for key in keys {
        let result = ctx
            .store
            .delete(&ctx.deadline, &ctx.bucket, key)
            .await
            .context("error deleting object");
        match result {
            Ok(()) => {
                tracing::debug!(key = %key, "deleted object");
                deleted += 1;
            }
            Err(e) => {
                e.report(&ctx.formatter, key);
                failed += 1;
            }
        }
    }

    ctx.formatter.summary(&format!("Deleted {deleted} object(s)"));

    BatchReport {
        completed: deleted,
        failed,
        exit_code: ExitCode::Success,
    }
}
