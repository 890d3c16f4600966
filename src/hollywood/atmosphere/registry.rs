// A generational list of surfaces
//
// This tracks one value for each live id. Slots are reused once a
// value is removed, and every reuse bumps the slot's generation so
// that an id handed out before the removal never resolves again.
// This is what lets the compositor treat "is this id in the registry"
// as the single test for a live surface.
//
// Austin Shafer - 2021

/// Unique, non-reusable handle to a registry entry
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId {
    id_index: u32,
    id_generation: u32,
}

struct Slot<T> {
    sl_generation: u32,
    sl_data: Option<T>,
}

pub struct Registry<T> {
    /// This is indexed by the id's index. It holds None if that id
    /// isn't active.
    rg_slots: Vec<Slot<T>>,
    /// Indices of empty slots, reused LIFO
    rg_free: Vec<u32>,
}

impl<T> Registry<T> {
    pub fn new() -> Self {
        Self {
            rg_slots: Vec::new(),
            rg_free: Vec::new(),
        }
    }

    pub fn insert(&mut self, data: T) -> SurfaceId {
        if let Some(index) = self.rg_free.pop() {
            let slot = &mut self.rg_slots[index as usize];
            slot.sl_generation = slot.sl_generation.wrapping_add(1);
            slot.sl_data = Some(data);

            return SurfaceId {
                id_index: index,
                id_generation: slot.sl_generation,
            };
        }

        self.rg_slots.push(Slot {
            sl_generation: 0,
            sl_data: Some(data),
        });

        SurfaceId {
            id_index: (self.rg_slots.len() - 1) as u32,
            id_generation: 0,
        }
    }

    pub fn remove(&mut self, id: SurfaceId) -> Option<T> {
        if !self.contains(id) {
            return None;
        }

        let ret = self.rg_slots[id.id_index as usize].sl_data.take();
        self.rg_free.push(id.id_index);
        ret
    }

    pub fn contains(&self, id: SurfaceId) -> bool {
        match self.rg_slots.get(id.id_index as usize) {
            Some(slot) => slot.sl_generation == id.id_generation && slot.sl_data.is_some(),
            None => false,
        }
    }

    pub fn get(&self, id: SurfaceId) -> Option<&T> {
        match self.rg_slots.get(id.id_index as usize) {
            Some(slot) if slot.sl_generation == id.id_generation => slot.sl_data.as_ref(),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, id: SurfaceId) -> Option<&mut T> {
        match self.rg_slots.get_mut(id.id_index as usize) {
            Some(slot) if slot.sl_generation == id.id_generation => slot.sl_data.as_mut(),
            _ => None,
        }
    }

    /// Iterate over all live ids and their values
    pub fn iter(&self) -> impl Iterator<Item = (SurfaceId, &T)> {
        self.rg_slots.iter().enumerate().filter_map(|(i, slot)| {
            slot.sl_data.as_ref().map(|data| {
                (
                    SurfaceId {
                        id_index: i as u32,
                        id_generation: slot.sl_generation,
                    },
                    data,
                )
            })
        })
    }
}
