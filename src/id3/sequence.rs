// Frame storage with per-kind multiplicity rules

use std::collections::BTreeMap;

use tracing::trace;

use crate::id3::frames::{Frame, FrameId};

/// The frames stored under one frame ID.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameSlot {
    /// Singleton kinds keep exactly one frame.
    Single(Frame),
    /// Repeatable kinds keep one frame per uniqueness key.
    Keyed(BTreeMap<String, Frame>),
}

impl FrameSlot {
    pub fn len(&self) -> usize {
        match self {
            FrameSlot::Single(_) => 1,
            FrameSlot::Keyed(frames) => frames.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> Box<dyn Iterator<Item = &Frame> + '_> {
        match self {
            FrameSlot::Single(frame) => Box::new(std::iter::once(frame)),
            FrameSlot::Keyed(frames) => Box::new(frames.values()),
        }
    }
}

/// All frames of a tag, grouped by ID.
///
/// Iteration order is by ID, then by uniqueness key, so it is stable between
/// the size computation and the write that follows it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameSequence {
    slots: BTreeMap<FrameId, FrameSlot>,
}

impl FrameSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `frame` under `id`.
    ///
    /// A singleton replaces whatever the slot held. A repeatable frame replaces only
    /// the frame with the same uniqueness key. Returns the replaced frame, if any.
    pub fn add(&mut self, id: FrameId, frame: Frame) -> Option<Frame> {
        let Some(key) = frame.unique_key() else {
            return match self.slots.insert(id, FrameSlot::Single(frame)) {
                Some(FrameSlot::Single(old)) => Some(old),
                _ => None,
            };
        };

        if let Some(FrameSlot::Keyed(frames)) = self.slots.get_mut(&id) {
            let replaced = frames.insert(key, frame);
            if replaced.is_some() {
                trace!(%id, "replaced frame with the same key");
            }
            return replaced;
        }

        let previous = self
            .slots
            .insert(id, FrameSlot::Keyed(BTreeMap::from([(key, frame)])));
        match previous {
            Some(FrameSlot::Single(old)) => Some(old),
            _ => None,
        }
    }

    /// Make `frame` the only frame under `id`.
    pub fn set(&mut self, id: FrameId, frame: Frame) {
        self.slots.remove(&id);
        self.add(id, frame);
    }

    pub fn slot(&self, id: FrameId) -> Option<&FrameSlot> {
        self.slots.get(&id)
    }

    /// Frames stored under `id`, in key order.
    pub fn frames(&self, id: FrameId) -> impl Iterator<Item = &Frame> {
        self.slots.get(&id).into_iter().flat_map(FrameSlot::iter)
    }

    /// The frame with uniqueness key `key` under `id`.
    pub fn keyed(&self, id: FrameId, key: &str) -> Option<&Frame> {
        match self.slots.get(&id)? {
            FrameSlot::Keyed(frames) => frames.get(key),
            FrameSlot::Single(_) => None,
        }
    }

    /// Remove every frame under `id`. Returns how many were removed.
    pub fn delete(&mut self, id: FrameId) -> usize {
        self.slots.remove(&id).map_or(0, |slot| slot.len())
    }

    /// Remove the frame with uniqueness key `key` under `id`.
    pub fn delete_keyed(&mut self, id: FrameId, key: &str) -> Option<Frame> {
        let FrameSlot::Keyed(frames) = self.slots.get_mut(&id)? else {
            return None;
        };
        let removed = frames.remove(key);
        if frames.is_empty() {
            self.slots.remove(&id);
        }
        removed
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    /// Number of live frames across all IDs.
    pub fn count(&self) -> usize {
        self.slots.values().map(FrameSlot::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = FrameId> + '_ {
        self.slots.keys().copied()
    }

    /// Every frame with its ID.
    pub fn iter(&self) -> impl Iterator<Item = (FrameId, &Frame)> {
        self.slots
            .iter()
            .flat_map(|(id, slot)| slot.iter().map(move |frame| (*id, frame)))
    }
}
