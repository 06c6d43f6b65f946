use std::sync::Arc;

use crate::{
    error::SyncError,
    impls::slot::Slot,
    traits::element::MediaElement,
    types::{SlotId, SlotStatus},
};

/// Mutable session state, guarded by a single lock.
pub(crate) struct SyncState {
    slots: Vec<Slot>,
    pub(crate) active: SlotId,
    pub(crate) volume: u8,
    pub(crate) closed: bool,
}

impl SyncState {
    pub(crate) fn new(elements: Vec<Arc<dyn MediaElement>>, volume: u8) -> Self {
        let slots = elements
            .into_iter()
            .enumerate()
            .map(|(i, element)| Slot::new(SlotId(i), element))
            .collect();
        Self {
            slots,
            active: SlotId(0),
            volume,
            closed: false,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn slot_id(&self, index: usize) -> Result<SlotId, SyncError> {
        SlotId::checked(index, self.slots.len())
    }

    pub(crate) fn ensure_open(&self) -> Result<(), SyncError> {
        if self.closed {
            Err(SyncError::SessionClosed)
        } else {
            Ok(())
        }
    }

    pub(crate) fn slot(&self, id: SlotId) -> &Slot {
        &self.slots[id.index()]
    }

    pub(crate) fn slot_mut(&mut self, id: SlotId) -> &mut Slot {
        &mut self.slots[id.index()]
    }

    pub(crate) fn slots(&self) -> impl Iterator<Item = &Slot> {
        self.slots.iter()
    }

    pub(crate) fn slots_mut(&mut self) -> impl Iterator<Item = &mut Slot> {
        self.slots.iter_mut()
    }

    pub(crate) fn status(&self, id: SlotId) -> SlotStatus {
        self.slot(id).status(id == self.active)
    }
}
