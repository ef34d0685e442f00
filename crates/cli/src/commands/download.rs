//! download command - Fetch objects into local files
//!
//! Each key is written to `<dir>/<basename(key)>`. A failed key is reported
//! and the remaining keys are still attempted.

use std::path::{Path, PathBuf};

use clap::Args;
use humansize::{BINARY, format_size};
use s3cli_core::Error;

use super::{BatchReport, Context, ItemContext, ItemError};
use crate::exit_code::ExitCode;
use crate::output::{ProgressBar, ProgressReader};

/// Download objects
#[derive(Args, Debug)]
pub struct DownloadArgs {
    /// Object key(s) to download
    #[arg(required = true, allow_hyphen_values = true)]
    pub keys: Vec<String>,

    /// Directory to write the files into
    #[arg(short, long, default_value = ".")]
    pub dir: PathBuf,
}

/// Execute the download command
pub async fn execute(args: DownloadArgs, ctx: &Context<'_>) -> ExitCode {
    run(ctx, &args.keys, &args.dir).await.exit_code
}

/// Download `keys` into `dir`, continuing past failures
pub async fn run(ctx: &Context<'_>, keys: &[String], dir: &Path) -> BatchReport {
    let mut downloaded = 0;
    let mut failed = 0;

    for key in keys {
        match download_one(ctx, key, dir).await {
            Ok(bytes) => {
                tracing::info!(key = %key, size = %format_size(bytes, BINARY), "downloaded object");
                downloaded += 1;
            }
            Err(e) => {
                e.report(&ctx.formatter, key);
                failed += 1;
            }
        }
    }

    ctx.formatter
        .summary(&format!("Downloaded {downloaded} object(s)"));

    BatchReport {
        completed: downloaded,
        failed,
        exit_code: ExitCode::Success,
    }
}

/// Local file name for `key`: its last path segment
pub fn local_name(key: &str) -> Result<&str, Error> {
    key.rsplit('/')
        .next()
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
        .ok_or_else(|| {
            Error::General(format!(
                "key '{key}' has no file name; keys ending in '/' are not downloaded"
            ))
        })
}

async fn download_one(ctx: &Context<'_>, key: &str, dir: &Path) -> Result<u64, ItemError> {
    let name = local_name(key).context("error opening file for writing")?;
    let target = dir.join(name);

    let body = ctx
        .store
        .open(&ctx.deadline, &ctx.bucket, key)
        .await
        .context("error opening object")?;

    let mut file = tokio::fs::File::create(&target)
        .await
        .context("error opening file for writing")?;

    let bar = ProgressBar::new(ctx.output(), body.content_length, key);
    let mut reader = ProgressReader::new(body.reader, bar.clone());

    let copied = ctx
        .deadline
        .run("download", async {
            let bytes = tokio::io::copy(&mut reader, &mut file).await?;
            file.sync_all().await?;
            Ok::<_, Error>(bytes)
        })
        .await;
    bar.finish_and_clear();

    match copied {
        Ok(bytes) => Ok(bytes),
        Err(e) => {
            drop(file);
            if let Err(remove_err) = tokio::fs::remove_file(&target).await {
                tracing::warn!(path = %target.display(), error = %remove_err, "could not remove partial download");
            }
            Err(ItemError {
                context: "error downloading object",
                source: e,
            })
        }
    }
}
