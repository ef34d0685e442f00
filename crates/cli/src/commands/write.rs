//! write command - Store stdin as an object
//!
//! The input length is unknown up front; the store decides how to buffer it.

use clap::Args;
use s3cli_core::{ObjectReader, UploadOptions, UploadSource};

use super::{Context, ItemContext};
use crate::exit_code::ExitCode;
use crate::output::{ProgressBar, ProgressReader};

/// Write stdin to an object
#[derive(Args, Debug)]
pub struct WriteArgs {
    /// Object key
    #[arg(allow_hyphen_values = true)]
    pub key: String,
}

/// Execute the write command
pub async fn execute(args: WriteArgs, ctx: &Context<'_>) -> ExitCode {
    let bar = ProgressBar::new(ctx.output(), None, &args.key);
    let stdin = ProgressReader::new(tokio::io::stdin(), bar.clone());
    let code = run(ctx, &args.key, Box::pin(stdin)).await;
    bar.finish_and_clear();
    code
}

/// Upload everything `source` yields to `key`
pub async fn run(ctx: &Context<'_>, key: &str, source: ObjectReader) -> ExitCode {
    let result = ctx
        .store
        .upload(
            &ctx.deadline,
            &ctx.bucket,
            key,
            UploadSource::Stream(source),
            UploadOptions::default(),
        )
        .await
        .context("error writing object");

    match result {
        Ok(()) => {
            tracing::info!(key, "wrote object");
            ExitCode::Success
        }
        Err(e) => {
            e.report(&ctx.formatter, key);
            ExitCode::from_error(&e.source)
        }
    }
}
