//! upload command - Store local files as objects
//!
//! Each file is uploaded under its base name. By default the first failure
//! ends the command; `--continue-on-error` keeps going.

use std::path::{Path, PathBuf};

use clap::Args;
use humansize::{BINARY, format_size};
use s3cli_core::{Error, UploadOptions, UploadSource};

use super::{BatchReport, Context, ItemContext, ItemError};
use crate::exit_code::ExitCode;

/// Upload files
#[derive(Args, Debug)]
pub struct UploadArgs {
    /// Local file(s) to upload
    #[arg(required = true, allow_hyphen_values = true)]
    pub paths: Vec<PathBuf>,
}

/// Execute the upload command
pub async fn execute(args: UploadArgs, ctx: &Context<'_>) -> ExitCode {
    run(ctx, &args.paths).await.exit_code
}

/// Upload `paths` in order
pub async fn run(ctx: &Context<'_>, paths: &[PathBuf]) -> BatchReport {
    let mut uploaded = 0;
    let mut failed = 0;

    for path in paths {
        match upload_one(ctx, path).await {
            Ok((key, bytes)) => {
                tracing::info!(key = %key, size = %format_size(bytes, BINARY), "uploaded file");
                uploaded += 1;
            }
            Err(e) => {
                e.report(&ctx.formatter, &path.display().to_string());
                failed += 1;
                if !ctx.continue_on_error {
                    break;
                }
            }
        }
    }

    ctx.formatter.summary(&format!("Uploaded {uploaded} file(s)"));

    BatchReport {
        completed: uploaded,
        failed,
        exit_code: if failed == 0 {
            ExitCode::Success
        } else {
            ExitCode::GeneralError
        },
    }
}

/// Object key for a local path: its file name
pub fn object_key(path: &Path) -> Option<String> {
    path.file_name().map(|name| name.to_string_lossy().into_owned())
}

async fn upload_one(ctx: &Context<'_>, path: &Path) -> Result<(String, u64), ItemError> {
    let metadata = tokio::fs::metadata(path).await.context("error opening file")?;
    if metadata.is_dir() {
        return Err(Error::General("is a directory".into())).context("error opening file");
    }

    let key = object_key(path)
        .ok_or_else(|| Error::General("no file name".into()))
        .context("error opening file")?;

    let options = UploadOptions {
        content_type: mime_guess::from_path(path).first().map(|m| m.essence_str().to_string()),
    };

    ctx.store
        .upload(
            &ctx.deadline,
            &ctx.bucket,
            &key,
            UploadSource::File(path.to_path_buf()),
            options,
        )
        .await
        .context("error uploading file")?;

    Ok((key, metadata.len()))
}
