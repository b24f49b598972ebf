// SPDX-FileCopyrightText: 2026 Breeze Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Filesystem-backed chunk storage.
//!
//! Layout under the configured root:
//!
//! ```text
//! <root>/<transfer_id>/00000042.chunk   one file per received chunk index
//! <root>/<transfer_id>/assembled.bin    concatenated artifact
//! ```
//!
//! Chunk indices come from the client; assembly concatenates in numeric
//! index order regardless of arrival order. Transfer ids are server-issued
//! UUIDs, never caller-controlled paths.

use std::path::PathBuf;

use async_trait::async_trait;
use breeze_core::BreezeError;
use breeze_core::traits::{ChunkStore, ChunkStream};
use tokio::fs;
use tokio::io::AsyncWriteExt;

const CHUNK_SUFFIX: &str = ".chunk";
const ARTIFACT_NAME: &str = "assembled.bin";

pub struct FsChunkStore {
    root: PathBuf,
}

impl FsChunkStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn transfer_dir(&self, transfer_id: &str) -> PathBuf {
        self.root.join(transfer_id)
    }

    fn chunk_path(&self, transfer_id: &str, index: u32) -> PathBuf {
        self.transfer_dir(transfer_id)
            .join(format!("{index:08}{CHUNK_SUFFIX}"))
    }

    fn artifact_path(&self, transfer_id: &str) -> PathBuf {
        self.transfer_dir(transfer_id).join(ARTIFACT_NAME)
    }

    /// Chunk indices present on disk, sorted numerically.
    async fn chunk_indices(&self, transfer_id: &str) -> Result<Vec<u32>, BreezeError> {
        let dir = self.transfer_dir(transfer_id);
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error("reading chunk directory", e)),
        };
        let mut indices = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| io_error("reading chunk directory", e))?
        {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if let Some(stem) = name.strip_suffix(CHUNK_SUFFIX) {
                if let Ok(index) = stem.parse::<u32>() {
                    indices.push(index);
                }
            }
        }
        indices.sort_unstable();
        Ok(indices)
    }
}

fn io_error(message: &str, source: std::io::Error) -> BreezeError {
    BreezeError::Transport {
        message: message.to_string(),
        source: Some(Box::new(source)),
    }
}

#[async_trait]
impl ChunkStore for FsChunkStore {
    async fn save(&self, transfer_id: &str, index: u32, bytes: &[u8]) -> Result<(), BreezeError> {
        let dir = self.transfer_dir(transfer_id);
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| io_error("creating chunk directory", e))?;
        fs::write(self.chunk_path(transfer_id, index), bytes)
            .await
            .map_err(|e| io_error("writing chunk", e))
    }

    async fn assemble(&self, transfer_id: &str) -> Result<u64, BreezeError> {
        let indices = self.chunk_indices(transfer_id).await?;
        if indices.is_empty() {
            return Err(BreezeError::Internal(format!(
                "no chunks on disk for transfer {transfer_id}"
            )));
        }
        let artifact_path = self.artifact_path(transfer_id);
        let mut artifact = fs::File::create(&artifact_path)
            .await
            .map_err(|e| io_error("creating assembled artifact", e))?;
        let mut total = 0u64;
        for index in indices {
            let mut chunk = fs::File::open(self.chunk_path(transfer_id, index))
                .await
                .map_err(|e| io_error("opening chunk for assembly", e))?;
            total += tokio::io::copy(&mut chunk, &mut artifact)
                .await
                .map_err(|e| io_error("concatenating chunk", e))?;
        }
        artifact
            .flush()
            .await
            .map_err(|e| io_error("flushing assembled artifact", e))?;
        Ok(total)
    }

    async fn stream(&self, transfer_id: &str) -> Result<ChunkStream, BreezeError> {
        let path = self.artifact_path(transfer_id);
        let file = match fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // A completed transfer without its artifact is data loss and
                // must surface, not 500.
                return Err(BreezeError::not_found("transfer artifact"));
            }
            Err(e) => return Err(io_error("opening assembled artifact", e)),
        };
        let len = file
            .metadata()
            .await
            .map_err(|e| io_error("inspecting assembled artifact", e))?
            .len();
        Ok(ChunkStream {
            reader: Box::new(file),
            len,
        })
    }
}
