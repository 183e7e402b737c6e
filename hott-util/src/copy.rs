//! Copying a file through the progress-reporting stream decorators.
//!
//! The copy runs in up to two stages:
//! 1.  Stream the source (decompressed on the fly if it is `.gz`, `.xz` or
//!     `.zst`) into a temporary file next to the destination, then move it
//!     into place.
//! 2.  Optionally verify the copy by comparing SHA-256 hashes of a fresh read
//!     of the source and of the destination.
//!
//! Cancellation is honored on every byte of the copy and on every chunk of the
//! verification. A cancelled copy leaves no partial output behind.
use anyhow::{Result, anyhow};
use flate2::read::GzDecoder;
use hott_util_core::callback::Callback;
use hott_util_core::stream::{CallbackReader, CallbackWriter};
use log::debug;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use xz2::read::XzDecoder;
use zstd::stream::read::Decoder as ZstdDecoder;

const VERIFY_BUFFER_SIZE: usize = 64 * 1024;

/// What a call to [`run`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    /// The destination existed and the user chose to keep it.
    Skipped,
    /// The copy completed.
    Copied { bytes: u64, verified: bool },
}

/// Compression formats recognized by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Codec {
    Gzip,
    Xz,
    Zstd,
}

/// Picks the codec for `path` from its extension, `None` for plain files.
fn codec_for(path: &Path) -> Option<Codec> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    match ext.as_str() {
        "gz" | "gzip" => Some(Codec::Gzip),
        "xz" => Some(Codec::Xz),
        "zst" | "zstd" => Some(Codec::Zstd),
        _ => None,
    }
}

/// Opens `path` for reading, decompressing by extension.
///
/// The returned size is only known for uncompressed files.
fn open_source(path: &Path) -> io::Result<(Box<dyn Read>, Option<u64>)> {
    let file = File::open(path)?;

    let reader: Box<dyn Read> = match codec_for(path) {
        Some(Codec::Gzip) => Box::new(GzDecoder::new(BufReader::new(file))),
        Some(Codec::Xz) => Box::new(XzDecoder::new(BufReader::new(file))),
        Some(Codec::Zstd) => Box::new(ZstdDecoder::new(BufReader::new(file))?),
        None => {
            let len = file.metadata()?.len();
            return Ok((Box::new(BufReader::new(file)), Some(len)));
        }
    };

    Ok((reader, None))
}

/// Hashes everything `reader` yields, reporting `offset + bytes` as sub progress.
fn hash_stream(
    mut reader: impl Read,
    callback: &dyn Callback,
    offset: u64,
    total: u64,
) -> Result<(sha2::digest::Output<Sha256>, u64)> {
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; VERIFY_BUFFER_SIZE];
    let mut done: u64 = 0;

    loop {
        if callback.is_cancelled() {
            return Err(hott_util_core::Error::Cancelled.into());
        }

        let n = reader.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
        done += n as u64;
        callback.update_sub_progress(offset + done, total);
    }

    Ok((hasher.finalize(), done))
}

fn verify(source: &Path, destination: &Path, len: u64, callback: &dyn Callback) -> Result<()> {
    callback.update_message("Verifying copy...");
    let total = len.saturating_mul(2).max(1);

    let (reader, _) = open_source(source)?;
    let (source_hash, source_len) = hash_stream(reader, callback, 0, total)?;

    let reader = BufReader::new(File::open(destination)?);
    let (dest_hash, dest_len) = hash_stream(reader, callback, len, total)?;

    debug!("Source {source_len} bytes, destination {dest_len} bytes");
    if source_len != dest_len || source_hash != dest_hash {
        return Err(anyhow!("Verification failed: hash mismatch."));
    }
    Ok(())
}

/// Copies `source` to `destination`, reporting through `callback`.
///
/// # Errors
///
/// This function will return an error if:
/// - The source cannot be read or the destination cannot be written.
/// - The verification hash does not match.
/// - The operation is cancelled; the error is [`hott_util_core::Error::Cancelled`].
pub fn run(
    source: &Path,
    destination: &Path,
    verify_copy: bool,
    callback: &dyn Callback,
) -> Result<CopyOutcome> {
    if destination.exists()
        && !callback.confirm(
            "Overwrite",
            &format!("'{}' already exists. Overwrite it?", destination.display()),
            Some(&["Overwrite", "Keep"]),
            1,
        )
    {
        return Ok(CopyOutcome::Skipped);
    }

    let (input, total) = open_source(source)?;
    if total.is_none() {
        callback.update_message("Decompressing, total size unknown...");
    }

    let parent = match destination.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let temp = NamedTempFile::new_in(parent)?;

    let bytes = {
        let mut reader = CallbackReader::new(Some(callback), input, total);
        let mut writer = CallbackWriter::new(Some(callback), BufWriter::new(temp.as_file()), None);

        let bytes = io::copy(&mut reader, &mut writer).map_err(hott_util_core::Error::from)?;
        writer.flush().map_err(hott_util_core::Error::from)?;
        bytes
    };

    if let Some(total) = total {
        callback.update_progress(bytes, total);
    }

    temp.persist(destination).map_err(|e| e.error)?;
    debug!("Copied {bytes} bytes to {}", destination.display());

    if verify_copy {
        verify(source, destination, bytes, callback)?;
    }

    Ok(CopyOutcome::Copied {
        bytes,
        verified: verify_copy,
    })
}
