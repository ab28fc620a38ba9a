//! On-disk snapshot of the reference embeddings.
//!
//! Stored as `rkyv` bytes and read back through a read-only memory map.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use half::f16;
use memmap2::Mmap;
use rkyv::rancor::Error as RkyvError;
use rkyv::{Archive, Deserialize, Serialize};
use tempfile::NamedTempFile;

use super::error::IndexError;
use super::similarity::{bytes_to_f16_vec, f16_slice_to_bytes};

/// Reference vectors plus the identity of the corpus they were computed from.
#[derive(Archive, Deserialize, Serialize, Debug, PartialEq, Clone)]
pub struct EmbeddingSnapshot {
    /// Vector dimension.
    pub dim: u32,
    /// Number of vectors.
    pub count: u32,
    /// BLAKE3 fingerprint of the ordered corpus texts.
    pub fingerprint: [u8; 32],
    /// Row-major vector bytes (little-endian f16).
    pub vectors: Vec<u8>,
}

impl EmbeddingSnapshot {
    pub fn new(dim: usize, fingerprint: [u8; 32], vectors: &[f16]) -> Self {
        let count = if dim == 0 { 0 } else { vectors.len() / dim };
        Self {
            dim: dim as u32,
            count: count as u32,
            fingerprint,
            vectors: f16_slice_to_bytes(vectors).to_vec(),
        }
    }

    /// Returns `true` if the snapshot was computed for this corpus and dimension.
    pub fn matches(&self, dim: usize, count: usize, fingerprint: &[u8; 32]) -> bool {
        self.dim as usize == dim && self.count as usize == count && &self.fingerprint == fingerprint
    }

    /// Decodes the vector bytes; `None` if their length disagrees with the header.
    pub fn to_f16_vectors(&self) -> Option<Vec<f16>> {
        let expected = self.dim as usize * self.count as usize;
        bytes_to_f16_vec(&self.vectors).filter(|v| v.len() == expected)
    }
}

/// Writes `snapshot` to `path` atomically (temp file in the same directory, then rename).
pub fn write_snapshot(path: &Path, snapshot: &EmbeddingSnapshot) -> Result<(), IndexError> {
    let snapshot_err = |reason: String| IndexError::Snapshot {
        path: path.to_path_buf(),
        reason,
    };

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|e| snapshot_err(e.to_string()))?;

    let bytes = rkyv::to_bytes::<RkyvError>(snapshot)
        .map_err(|e| snapshot_err(format!("serialization failed: {:?}", e)))?;

    let mut temp = NamedTempFile::new_in(parent).map_err(|e| snapshot_err(e.to_string()))?;
    temp.write_all(&bytes)
        .map_err(|e| snapshot_err(e.to_string()))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| snapshot_err(e.to_string()))?;
    temp.persist(path)
        .map_err(|e| snapshot_err(e.error.to_string()))?;

    Ok(())
}

/// Maps `path` and validates it as an [`EmbeddingSnapshot`].
pub fn read_snapshot(path: &Path) -> Result<EmbeddingSnapshot, IndexError> {
    let snapshot_err = |reason: String| IndexError::Snapshot {
        path: path.to_path_buf(),
        reason,
    };

    let file = File::open(path).map_err(|e| snapshot_err(e.to_string()))?;
    let len = file
        .metadata()
        .map_err(|e| snapshot_err(e.to_string()))?
        .len();
    if len == 0 {
        return Err(snapshot_err("file is empty".to_string()));
    }

    // SAFETY: the mapping is read-only and dropped before this function returns.
    // Snapshots are replaced by rename, never modified in place.
    let mmap = unsafe { Mmap::map(&file) }.map_err(|e| snapshot_err(e.to_string()))?;

    let archived = rkyv::access::<ArchivedEmbeddingSnapshot, RkyvError>(&mmap[..])
        .map_err(|e| snapshot_err(format!("validation failed: {:?}", e)))?;

    Ok(EmbeddingSnapshot {
        dim: archived.dim.to_native(),
        count: archived.count.to_native(),
        fingerprint: archived.fingerprint,
        vectors: archived.vectors.as_slice().to_vec(),
    })
}
