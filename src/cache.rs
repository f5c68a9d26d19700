//! Direct-mapped decompressed-block cache (spec §3, §4.5).
//!
//! Each slot holds at most one block, chosen by `block % capacity`. A new
//! block unconditionally evicts whatever currently occupies its slot.
//! Resizing rehashes every live entry into the new slot count, keeping
//! whichever entry reaches an empty slot first and dropping the rest on
//! collision — matching `chm_lib.c`'s `chm_set_cache_size`.

pub const DEFAULT_CAPACITY: usize = 5;

struct Slot {
    block: u64,
    data: Vec<u8>,
}

pub struct BlockCache {
    capacity: usize,
    slots: Vec<Option<Slot>>,
}

impl BlockCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        BlockCache { capacity, slots }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn get(&self, block: u64) -> Option<&[u8]> {
        let slot = &self.slots[(block as usize) % self.capacity];
        match slot {
            Some(s) if s.block == block => Some(&s.data),
            _ => None,
        }
    }

    pub fn insert(&mut self, block: u64, data: Vec<u8>) {
        let idx = (block as usize) % self.capacity;
        if let Some(evicted) = &self.slots[idx] {
            if evicted.block != block {
                log::trace!("cache evicts block {} for block {block}", evicted.block);
            }
        }
        self.slots[idx] = Some(Slot { block, data });
    }

    /// Reshapes the cache to `new_capacity` slots, rehashing surviving
    /// entries. No new block data is allocated; existing buffers are moved,
    /// not copied.
    pub fn resize(&mut self, new_capacity: usize) {
        let new_capacity = new_capacity.max(1);
        let old_slots = std::mem::take(&mut self.slots);
        let mut new_slots = Vec::with_capacity(new_capacity);
        new_slots.resize_with(new_capacity, || None);

        for slot in old_slots.into_iter().flatten() {
            let idx = (slot.block as usize) % new_capacity;
            if new_slots[idx].is_none() {
                new_slots[idx] = Some(slot);
            }
        }

        self.capacity = new_capacity;
        self.slots = new_slots;
    }
}
