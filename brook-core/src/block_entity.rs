//! Per-cell data that does not fit in a block identity.

use simdnbt::owned::{NbtCompound, NbtTag};

/// Persistent data attached to a liquid cell.
///
/// Created the first time something asks for it and dropped with the liquid.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LiquidBlockEntity {
    /// Fractional volume carried between updates.
    pub partial_volume: f32,
}

impl LiquidBlockEntity {
    /// NBT key of [`Self::partial_volume`].
    pub const PARTIAL_VOLUME_KEY: &'static str = "partialVolume";

    /// Reads this entity's fields. Missing or mistyped tags read as `0.0`.
    pub fn load_additional(&mut self, nbt: &NbtCompound) {
        self.partial_volume = match nbt.get(Self::PARTIAL_VOLUME_KEY) {
            Some(NbtTag::Float(value)) => *value,
            _ => 0.0,
        };
    }

    /// Writes this entity's fields.
    pub fn save_additional(&self, nbt: &mut NbtCompound) {
        nbt.insert(Self::PARTIAL_VOLUME_KEY, NbtTag::Float(self.partial_volume));
    }
}
