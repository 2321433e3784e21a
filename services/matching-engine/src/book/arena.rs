//! Queue-node arena
//!
//! Orders rest inside doubly-linked FIFO queues. Instead of pointer-linked
//! nodes, queue nodes live in a slab with stable u32 indices and a free
//! list, so the unlink operation is an index splice rather than a pointer
//! swing. `NULL_INDEX` is the null link.

use types::Order;

/// Sentinel for "no node".
pub const NULL_INDEX: u32 = u32::MAX;

/// Stable index of a queue node within its book's arena.
pub type NodeIndex = u32;

/// One resting order plus its FIFO links.
#[derive(Debug, Clone)]
pub struct QueueNode {
    pub order: Order,
    pub prev: NodeIndex,
    pub next: NodeIndex,
}

#[derive(Debug, Clone)]
enum Slot {
    Occupied(QueueNode),
    Free { next_free: u32 },
}

/// Slab of queue nodes with O(1) alloc/free through a free list.
#[derive(Debug, Clone)]
pub struct NodeArena {
    slots: Vec<Slot>,
    free_head: u32,
    len: usize,
}

impl Default for NodeArena {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeArena {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_head: NULL_INDEX,
            len: 0,
        }
    }

    /// Insert an order, returning its stable node index.
    pub fn insert(&mut self, order: Order) -> NodeIndex {
        let node = QueueNode {
            order,
            prev: NULL_INDEX,
            next: NULL_INDEX,
        };
        self.len += 1;
        if self.free_head != NULL_INDEX {
            let index = self.free_head;
            match self.slots[index as usize] {
                Slot::Free { next_free } => self.free_head = next_free,
                Slot::Occupied(_) => unreachable!("free list pointed at occupied slot"),
            }
            self.slots[index as usize] = Slot::Occupied(node);
            index
        } else {
            self.slots.push(Slot::Occupied(node));
            (self.slots.len() - 1) as u32
        }
    }

    /// Remove a node, returning its order. The index goes back on the free
    /// list and may be reused by a later insert.
    pub fn remove(&mut self, index: NodeIndex) -> Order {
        let slot = std::mem::replace(
            &mut self.slots[index as usize],
            Slot::Free {
                next_free: self.free_head,
            },
        );
        match slot {
            Slot::Occupied(node) => {
                self.free_head = index;
                self.len -= 1;
                node.order
            }
            Slot::Free { .. } => unreachable!("remove of free arena slot"),
        }
    }

    pub fn get(&self, index: NodeIndex) -> &QueueNode {
        match &self.slots[index as usize] {
            Slot::Occupied(node) => node,
            Slot::Free { .. } => unreachable!("read of free arena slot"),
        }
    }

    pub fn get_mut(&mut self, index: NodeIndex) -> &mut QueueNode {
        match &mut self.slots[index as usize] {
            Slot::Occupied(node) => node,
            Slot::Free { .. } => unreachable!("write to free arena slot"),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
