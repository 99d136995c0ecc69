//! Shared, redrawable block tree.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::block::Block;

#[derive(Debug, Default)]
struct SurfaceState {
    blocks: Vec<Block>,
    raw: String,
    revision: u64,
}

/// The tree currently shown on one surface plus its serialized snapshot.
///
/// Clones share the same tree, so a completion that arrives on another task
/// can redraw what the test step is looking at.
#[derive(Debug, Clone, Default)]
pub struct Surface {
    inner: Arc<Mutex<SurfaceState>>,
}

impl Surface {
    pub fn new(blocks: Vec<Block>) -> Self {
        let surface = Self::default();
        surface.set(blocks);
        surface
    }

    fn lock(&self) -> MutexGuard<'_, SurfaceState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replaces the tree and re-serializes the snapshot.
    pub fn set(&self, blocks: Vec<Block>) {
        let raw = serde_json::to_string(&blocks).unwrap_or_default();
        let mut state = self.lock();
        state.blocks = blocks;
        state.raw = raw;
        state.revision += 1;
    }

    pub fn blocks(&self) -> Vec<Block> {
        self.lock().blocks.clone()
    }

    pub fn raw(&self) -> String {
        self.lock().raw.clone()
    }

    /// Incremented on every `set`.
    pub fn revision(&self) -> u64 {
        self.lock().revision
    }

    /// Runs `f` against the current tree without cloning it.
    pub fn read<R>(&self, f: impl FnOnce(&[Block]) -> R) -> R {
        f(&self.lock().blocks)
    }
}
