use rustc_hash::{FxHashMap, FxHashSet};

use brook_utils::{BlockPos, BlockStateId};

use super::{BlockLayer, GridAccess};

/// A pending write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Staged {
    /// Store this identity.
    Set(BlockStateId),
    /// Clear the layer to air.
    Delete,
}

impl Staged {
    /// The identity the layer holds once committed.
    #[must_use]
    pub const fn id(self) -> BlockStateId {
        match self {
            Self::Set(id) => id,
            Self::Delete => BlockStateId::AIR,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct StagedWrite {
    pos: BlockPos,
    layer: BlockLayer,
    value: Staged,
}

/// Buffers block writes and applies them to a grid in one step.
///
/// Writes to the same cell and layer overwrite each other; the entry keeps
/// the position of the first write in commit order. Nothing is visible
/// through the grid until [`BulkBlockAccessor::commit`].
#[derive(Debug, Default)]
pub struct BulkBlockAccessor {
    writes: Vec<StagedWrite>,
    index: FxHashMap<(BlockPos, BlockLayer), usize>,
}

impl BulkBlockAccessor {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages `id` for a cell layer.
    pub fn set_block(&mut self, pos: BlockPos, layer: BlockLayer, id: BlockStateId) {
        let value = if id.is_air() {
            Staged::Delete
        } else {
            Staged::Set(id)
        };
        self.stage(pos, layer, value);
    }

    /// Stages clearing a cell layer.
    pub fn delete(&mut self, pos: BlockPos, layer: BlockLayer) {
        self.stage(pos, layer, Staged::Delete);
    }

    fn stage(&mut self, pos: BlockPos, layer: BlockLayer, value: Staged) {
        if let Some(&slot) = self.index.get(&(pos, layer)) {
            self.writes[slot].value = value;
        } else {
            self.index.insert((pos, layer), self.writes.len());
            self.writes.push(StagedWrite { pos, layer, value });
        }
    }

    /// The pending write for a cell layer, if any.
    #[must_use]
    pub fn staged(&self, pos: &BlockPos, layer: BlockLayer) -> Option<Staged> {
        self.index
            .get(&(*pos, layer))
            .map(|&slot| self.writes[slot].value)
    }

    /// Number of pending writes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.writes.len()
    }

    /// Returns true if nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// Drops every pending write.
    pub fn discard(&mut self) {
        self.writes.clear();
        self.index.clear();
    }

    /// Applies every pending write and empties the buffer.
    ///
    /// Returns the positions whose stored identity actually changed, each once,
    /// in commit order.
    pub fn commit<G: GridAccess + ?Sized>(&mut self, grid: &mut G) -> Vec<BlockPos> {
        let mut changed: Vec<BlockPos> = Vec::with_capacity(self.writes.len());
        let mut seen = FxHashSet::default();
        for write in self.writes.drain(..) {
            if grid.set_block_id(&write.pos, write.layer, write.value.id()) && seen.insert(write.pos) {
                changed.push(write.pos);
            }
        }
        self.index.clear();
        changed
    }
}
