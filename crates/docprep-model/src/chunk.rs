//! Chunks yielded by the streaming generator.

use std::ops::Range;

use polars::prelude::DataFrame;

use crate::doc::DocSeries;

/// Payload of a chunk.
#[derive(Debug, Clone)]
pub enum ChunkData {
    /// A slice of a canonical sequence.
    Docs(DocSeries),
    /// A slice of a table, or rows read from a file.
    Frame(DataFrame),
}

/// Where a file-backed chunk came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileWindow {
    /// Byte offset of the first record of the chunk.
    pub byte_offset: u64,
    /// 1-based line of the first record of the chunk.
    pub line: u64,
}

/// A contiguous slice of a collection plus the context needed to reattach it.
#[derive(Debug, Clone)]
pub struct Chunk {
    /// Zero-based chunk number.
    pub number: usize,
    /// Data-row positions covered, relative to the first data row.
    pub rows: Range<usize>,
    pub data: ChunkData,
    /// Set for chunks read from a file.
    pub window: Option<FileWindow>,
}

impl Chunk {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn frame(&self) -> Option<&DataFrame> {
        match &self.data {
            ChunkData::Frame(df) => Some(df),
            ChunkData::Docs(_) => None,
        }
    }
}

/// Splits `total` rows into consecutive windows of `chunksize` rows.
///
/// A chunksize of 0, or one at least as large as `total`, gives a single
/// window. An empty input still gives one empty window so callers always
/// see at least one chunk.
pub fn chunk_windows(total: usize, chunksize: usize) -> Vec<Range<usize>> {
    if chunksize == 0 || chunksize >= total {
        return vec![0..total];
    }
    (0..total)
        .step_by(chunksize)
        .map(|start| start..(start + chunksize).min(total))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn windows_cover_all_rows() {
        assert_eq!(chunk_windows(5, 2), vec![0..2, 2..4, 4..5]);
        assert_eq!(chunk_windows(5, 0), vec![0..5]);
        assert_eq!(chunk_windows(5, 5), vec![0..5]);
        assert_eq!(chunk_windows(5, 105), vec![0..5]);
        assert_eq!(chunk_windows(0, 3), vec![0..0]);
    }

    proptest! {
        #[test]
        fn windows_are_contiguous(total in 0usize..500, chunksize in 0usize..600) {
            let windows = chunk_windows(total, chunksize);
            prop_assert_eq!(windows.first().map(|w| w.start), Some(0));
            prop_assert_eq!(windows.last().map(|w| w.end), Some(total));
            for pair in windows.windows(2) {
                prop_assert_eq!(pair[0].end, pair[1].start);
            }
            if chunksize > 0 {
                prop_assert!(windows.iter().all(|w| w.len() <= chunksize));
            }
        }
    }
}
