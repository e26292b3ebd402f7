//! Binary block storage for one document.
//!
//! The YAML tree references array payloads by integer index into an ordered
//! block list. During encode the store is threaded mutably through the event
//! producer and appended to as ndarray nodes are visited; during decode it is
//! populated up front by the framing layer and read immutably.

use alloc::vec::Vec;

/// The index of a block within its document's store.
pub type BlockSource = usize;

/// An append-only, ordered collection of binary blocks.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BlockStore {
    blocks: Vec<Vec<u8>>,
}

impl BlockStore {
    /// Create an empty store.
    pub fn new() -> Self {
        BlockStore { blocks: Vec::new() }
    }

    /// Build a store from pre-read block payloads, in file order.
    pub fn from_blocks(blocks: Vec<Vec<u8>>) -> Self {
        BlockStore { blocks }
    }

    /// Append a block, returning its stable 0-based index.
    ///
    /// The index equals the store's length before the append, so the n-th
    /// block appended is always block `n`.
    pub fn append(&mut self, bytes: Vec<u8>) -> BlockSource {
        let source = self.blocks.len();
        self.blocks.push(bytes);
        source
    }

    /// The payload at `source`, or `None` if the store has no such block.
    pub fn get(&self, source: BlockSource) -> Option<&[u8]> {
        self.blocks.get(source).map(Vec::as_slice)
    }

    /// The number of blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Returns `true` if the store holds no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Iterate the block payloads in index order.
    pub fn iter(&self) -> impl Iterator<Item = &[u8]> {
        self.blocks.iter().map(Vec::as_slice)
    }
}
