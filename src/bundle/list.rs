//! Chunked transfer of bundle lists
//!
//! A long list (for example every window of a large timeline) is handed over
//! in chunks that each stay near a soft byte ceiling. A chunk is a run of
//! `Continue(bundle)` records closed by either `Break` (ask again starting at
//! the next index) or `EndOfList`.

use serde::{Deserialize, Serialize};

use crate::bundle::Bundle;
use crate::utils::error::{MediaError, Result};

/// Default soft ceiling for a single chunk.
pub const DEFAULT_MAX_CHUNK_BYTES: usize = 64 * 1024;

/// One record inside a chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ChunkRecord {
    Continue(Bundle),
    Break,
    EndOfList,
}

impl ChunkRecord {
    /// Wire code of the record's control word.
    pub fn code(&self) -> u8 {
        match self {
            ChunkRecord::EndOfList => 0,
            ChunkRecord::Continue(_) => 1,
            ChunkRecord::Break => 2,
        }
    }
}

/// Serves a list of bundles in bounded chunks.
#[derive(Debug, Clone)]
pub struct BundleListSender {
    list: Vec<Bundle>,
    max_chunk_bytes: usize,
}

impl BundleListSender {
    pub fn new(list: Vec<Bundle>) -> Self {
        Self::with_max_chunk_bytes(list, DEFAULT_MAX_CHUNK_BYTES)
    }

    pub fn with_max_chunk_bytes(list: Vec<Bundle>, max_chunk_bytes: usize) -> Self {
        Self {
            list,
            max_chunk_bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Builds the chunk starting at `start`.
    ///
    /// Items are added while the chunk is below the ceiling, so a chunk always
    /// carries at least one item even if that item alone exceeds it.
    pub fn chunk_from(&self, start: usize) -> Vec<ChunkRecord> {
        let mut records = Vec::new();
        let mut size = 0;
        let mut index = start;
        while index < self.list.len() && size < self.max_chunk_bytes {
            let bundle = &self.list[index];
            size += bundle.encoded_len() + 1;
            records.push(ChunkRecord::Continue(bundle.clone()));
            index += 1;
        }
        records.push(if index < self.list.len() {
            ChunkRecord::Break
        } else {
            ChunkRecord::EndOfList
        });
        log::trace!(
            "Prepared chunk of {} bundles from index {} ({} bytes)",
            index - start,
            start,
            size
        );
        records
    }
}

/// Encodes a chunk for transport.
pub fn encode_chunk(records: &[ChunkRecord]) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(records)?)
}

/// Decodes a chunk produced by [`encode_chunk`].
pub fn decode_chunk(bytes: &[u8]) -> Result<Vec<ChunkRecord>> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Reassembles a list by repeatedly asking `fetch` for the chunk starting at
/// the number of bundles received so far.
pub fn collect_chunks<F>(mut fetch: F) -> Result<Vec<Bundle>>
where
    F: FnMut(usize) -> Result<Vec<ChunkRecord>>,
{
    let mut bundles = Vec::new();
    loop {
        let start = bundles.len();
        let records = fetch(start)?;
        let mut terminator = None;
        for record in records {
            if terminator.is_some() {
                return Err(MediaError::bundle("chunk continues after its terminator"));
            }
            match record {
                ChunkRecord::Continue(bundle) => bundles.push(bundle),
                other => terminator = Some(other),
            }
        }
        match terminator {
            Some(ChunkRecord::EndOfList) => return Ok(bundles),
            Some(ChunkRecord::Break) if bundles.len() > start => continue,
            Some(ChunkRecord::Break) => {
                return Err(MediaError::bundle("chunk broke off without delivering any bundle"));
            }
            _ => return Err(MediaError::bundle("chunk is missing its terminator")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(count: usize) -> Vec<Bundle> {
        (0..count)
            .map(|i| {
                let mut bundle = Bundle::new();
                bundle.put("0", i);
                bundle.put("1", "x".repeat(100));
                bundle
            })
            .collect()
    }

    #[test]
    fn test_small_list_single_chunk() {
        let sender = BundleListSender::new(numbered(3));
        let chunk = sender.chunk_from(0);
        assert_eq!(chunk.len(), 4);
        assert_eq!(chunk.last(), Some(&ChunkRecord::EndOfList));
    }

    #[test]
    fn test_ceiling_splits_chunks() {
        let list = numbered(50);
        let sender = BundleListSender::with_max_chunk_bytes(list.clone(), 1024);
        let first = sender.chunk_from(0);
        assert_eq!(first.last(), Some(&ChunkRecord::Break));

        let mut fetches = 0;
        let received = collect_chunks(|start| {
            fetches += 1;
            let bytes = encode_chunk(&sender.chunk_from(start))?;
            decode_chunk(&bytes)
        })
        .unwrap();

        assert_eq!(received, list);
        assert!(fetches > 1);
    }

    #[test]
    fn test_oversized_item_still_sent() {
        let sender = BundleListSender::with_max_chunk_bytes(numbered(2), 1);
        let chunk = sender.chunk_from(0);
        assert_eq!(chunk.len(), 2);
        assert_eq!(chunk[1], ChunkRecord::Break);
    }

    #[test]
    fn test_empty_list() {
        let sender = BundleListSender::new(Vec::new());
        assert_eq!(sender.chunk_from(0), vec![ChunkRecord::EndOfList]);
        assert!(collect_chunks(|start| Ok(sender.chunk_from(start))).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_chunks_rejected() {
        assert!(collect_chunks(|_| Ok(vec![ChunkRecord::Break])).is_err());
        assert!(collect_chunks(|_| Ok(Vec::new())).is_err());
        assert!(collect_chunks(|_| Ok(vec![ChunkRecord::EndOfList, ChunkRecord::Break])).is_err());
    }

    #[test]
    fn test_record_codes() {
        assert_eq!(ChunkRecord::EndOfList.code(), 0);
        assert_eq!(ChunkRecord::Continue(Bundle::new()).code(), 1);
        assert_eq!(ChunkRecord::Break.code(), 2);
    }
}
