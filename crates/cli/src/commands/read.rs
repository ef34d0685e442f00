//! read command - Stream an object to stdout

use clap::Args;
use s3cli_core::Error;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use super::{Context, ItemContext};
use crate::exit_code::ExitCode;

/// Read an object to stdout
#[derive(Args, Debug)]
pub struct ReadArgs {
    /// Object key
    #[arg(allow_hyphen_values = true)]
    pub key: String,
}

/// Execute the read command
pub async fn execute(args: ReadArgs, ctx: &Context<'_>) -> ExitCode {
    let mut stdout = tokio::io::stdout();
    run(ctx, &args.key, &mut stdout).await
}

/// Copy the object at `key` into `out`
pub async fn run<W>(ctx: &Context<'_>, key: &str, out: &mut W) -> ExitCode
where
    W: AsyncWrite + Unpin + Send,
{
    let mut body = match ctx
        .store
        .open(&ctx.deadline, &ctx.bucket, key)
        .await
        .context("error opening object")
    {
        Ok(body) => body,
        Err(e) => {
            e.report(&ctx.formatter, key);
            return ExitCode::from_error(&e.source);
        }
    };

    let copied = ctx
        .deadline
        .run("read", async {
            let bytes = tokio::io::copy(&mut body.reader, &mut *out).await?;
            out.flush().await?;
            Ok::<_, Error>(bytes)
        })
        .await
        .context("error reading object");

    match copied {
        Ok(bytes) => {
            tracing::debug!(key, bytes, "read object");
            ExitCode::Success
        }
        Err(e) => {
            e.report(&ctx.formatter, key);
            ExitCode::from_error(&e.source)
        }
    }
}
