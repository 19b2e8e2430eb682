use super::content_digest_hasher::{Checksum, ContentDigestVerifier};
use eyre::{Result, WrapErr};
use std::path::Path;
use tokio::io::AsyncReadExt;

const HASH_BUFFER_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrityStatus {
    /// Nothing usable on disk; the file has to be transferred.
    NeedsDownload,
    AlreadySatisfied,
}

/// Decides whether the file at `path` already holds the expected content.
///
/// With a checksum the whole file is hashed with the same algorithm. Without one,
/// an existing file is accepted when its size matches `declared_size`. A declared
/// size of 0 counts as unknown, and an unknown size accepts any existing file.
pub async fn check_existing_file(
    path: &Path,
    checksum: Option<&Checksum>,
    declared_size: Option<u64>,
) -> Result<IntegrityStatus> {
    let metadata = match tokio::fs::metadata(path).await {
        Ok(metadata) if metadata.is_file() => metadata,
        Ok(_) => return Ok(IntegrityStatus::NeedsDownload),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(IntegrityStatus::NeedsDownload);
        }
        Err(e) => {
            return Err(e).wrap_err_with(|| format!("Failed to stat {}", path.display()));
        }
    };

    let Some(checksum) = checksum else {
        let size_matches = declared_size.is_none_or(|size| size == 0 || size == metadata.len());
        return Ok(if size_matches {
            IntegrityStatus::AlreadySatisfied
        } else {
            IntegrityStatus::NeedsDownload
        });
    };

    let file = tokio::fs::File::open(path)
        .await
        .wrap_err_with(|| format!("Failed to open existing file: {}", path.display()))?;
    let mut reader = tokio::io::BufReader::new(file);
    let mut buffer = vec![0u8; HASH_BUFFER_SIZE];
    let mut verifier = ContentDigestVerifier::new(checksum.clone());

    loop {
        let bytes_read = reader
            .read(&mut buffer)
            .await
            .wrap_err_with(|| format!("Failed to read from existing file: {}", path.display()))?;
        if bytes_read == 0 {
            break;
        }
        tokio::task::block_in_place(|| verifier.update(&buffer[..bytes_read]));
    }

    Ok(match verifier.verify() {
        Ok(()) => IntegrityStatus::AlreadySatisfied,
        Err(_) => IntegrityStatus::NeedsDownload,
    })
}
