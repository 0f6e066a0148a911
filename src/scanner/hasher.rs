//! BLAKE3 file hasher with streaming and memory-mapped reads.
//!
//! # Overview
//!
//! [`Hasher::full_hash`] always consumes the entire byte stream of a file,
//! in order. Small files are read through a fixed buffer; files at or above
//! the mmap threshold are memory-mapped, falling back to streaming when the
//! map cannot be created.
//!
//! [`files_identical`] compares two files byte for byte and backs the
//! optional verification pass of the finder.
//!
//! # Example
//!
//! ```no_run
//! use rmdupes::scanner::{hash_to_hex, Hasher};
//! use std::path::Path;
//!
//! let hasher = Hasher::new();
//! let digest = hasher.full_hash(Path::new("photo.jpg")).unwrap();
//! println!("{}", hash_to_hex(&digest));
//! ```

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::HashError;

/// 32-byte BLAKE3 content digest.
pub type Digest = [u8; 32];

/// Read buffer size for streaming hashes and comparisons.
pub const BUFFER_SIZE: usize = 64 * 1024;

/// Files at or above this size are memory-mapped by default.
pub const DEFAULT_MMAP_THRESHOLD: u64 = 64 * 1024 * 1024;

/// Content hasher.
///
/// Cheap to share behind an `Arc` across the hashing pool.
#[derive(Debug, Clone)]
pub struct Hasher {
    use_mmap: bool,
    mmap_threshold: u64,
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher {
    /// Create a hasher with mmap enabled above [`DEFAULT_MMAP_THRESHOLD`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            use_mmap: true,
            mmap_threshold: DEFAULT_MMAP_THRESHOLD,
            shutdown_flag: None,
        }
    }

    /// Enable or disable memory-mapped hashing.
    #[must_use]
    pub fn with_mmap(mut self, enabled: bool) -> Self {
        self.use_mmap = enabled;
        self
    }

    /// Set the file size from which memory mapping is used.
    #[must_use]
    pub fn with_mmap_threshold(mut self, bytes: u64) -> Self {
        self.mmap_threshold = bytes;
        self
    }

    /// Set the shutdown flag checked between read chunks.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Compute the BLAKE3 digest of the full content of `path`.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the file vanished since it was listed
    /// - `PermissionDenied` if it cannot be opened for reading
    /// - `Interrupted` if shutdown was requested mid-file
    /// - `Io` for any other read failure
    pub fn full_hash(&self, path: &Path) -> Result<Digest, HashError> {
        let file = File::open(path).map_err(|e| HashError::from_io(path, e))?;

        if self.use_mmap {
            let size = file
                .metadata()
                .map_err(|e| HashError::from_io(path, e))?
                .len();
            if size >= self.mmap_threshold && size > 0 {
                // SAFETY: read-only map, dropped before returning. The file
                // must not be truncated by another process while mapped.
                match unsafe { memmap2::Mmap::map(&file) } {
                    Ok(map) => {
                        log::trace!("Hashing {} via mmap ({} bytes)", path.display(), size);
                        let mut hasher = blake3::Hasher::new();
                        hasher.update(&map);
                        return Ok(*hasher.finalize().as_bytes());
                    }
                    Err(e) => {
                        log::debug!(
                            "mmap failed for {}, streaming instead: {}",
                            path.display(),
                            e
                        );
                    }
                }
            }
        }

        self.stream_hash(path, file)
    }

    fn stream_hash(&self, path: &Path, mut file: File) -> Result<Digest, HashError> {
        let mut hasher = blake3::Hasher::new();
        let mut buffer = vec![0u8; BUFFER_SIZE];

        loop {
            if self.is_shutdown_requested() {
                return Err(HashError::Interrupted(path.to_path_buf()));
            }
            let read = match file.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(HashError::from_io(path, e)),
            };
            hasher.update(&buffer[..read]);
        }

        Ok(*hasher.finalize().as_bytes())
    }
}

/// Compare two files byte for byte.
///
/// Returns `Ok(false)` as soon as sizes or any chunk differ.
///
/// # Errors
///
/// Returns a [`HashError`] naming whichever file could not be read.
pub fn files_identical(a: &Path, b: &Path) -> Result<bool, HashError> {
    let mut file_a = File::open(a).map_err(|e| HashError::from_io(a, e))?;
    let mut file_b = File::open(b).map_err(|e| HashError::from_io(b, e))?;

    let size_a = file_a.metadata().map_err(|e| HashError::from_io(a, e))?.len();
    let size_b = file_b.metadata().map_err(|e| HashError::from_io(b, e))?.len();
    if size_a != size_b {
        return Ok(false);
    }

    let mut buf_a = vec![0u8; BUFFER_SIZE];
    let mut buf_b = vec![0u8; BUFFER_SIZE];
    loop {
        let read_a = fill(&mut file_a, &mut buf_a).map_err(|e| HashError::from_io(a, e))?;
        let read_b = fill(&mut file_b, &mut buf_b).map_err(|e| HashError::from_io(b, e))?;
        if read_a != read_b || buf_a[..read_a] != buf_b[..read_b] {
            return Ok(false);
        }
        if read_a == 0 {
            return Ok(true);
        }
    }
}

/// Read until `buf` is full or the reader is exhausted.
fn fill(reader: &mut impl Read, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Render a digest as 64 lowercase hex characters.
#[must_use]
pub fn hash_to_hex(hash: &Digest) -> String {
    hash.iter().map(|b| format!("{b:02x}")).collect()
}

/// Parse a 64-character hex string back into a digest.
#[must_use]
pub fn hex_to_hash(hex: &str) -> Option<Digest> {
    if hex.len() != 64 || !hex.is_ascii() {
        return None;
    }
    let mut out = [0u8; 32];
    for (i, byte) in out.iter_mut().enumerate() {
        *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).ok()?;
    }
    Some(out)
}
