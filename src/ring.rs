//! Endpoint Ring
//!
//! Rotating cursor over the healthy endpoints of a pool. Kept as a vector
//! plus a cursor index rather than a linked ring; rotation and insertion
//! stay O(1) and removal is O(n) over a handful of endpoints.

use std::sync::Arc;

use crate::endpoint::Endpoint;

/// Circular sequence of endpoints with a round-robin cursor
#[derive(Debug, Default)]
pub(crate) struct EndpointRing {
    nodes: Vec<Arc<Endpoint>>,
    cursor: usize,
}

impl EndpointRing {
    #[allow(dead_code)]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Append at the tail; the first element becomes the cursor position
    pub fn add(&mut self, endpoint: Arc<Endpoint>) {
        self.nodes.push(endpoint);
    }

    /// Peek the element the cursor sits on
    pub fn current(&self) -> Option<Arc<Endpoint>> {
        self.nodes.get(self.cursor).cloned()
    }

    /// Peek the successor of the cursor without moving it.
    /// In a single-element ring the successor is the element itself.
    #[allow(dead_code)]
    pub fn next(&self) -> Option<Arc<Endpoint>> {
        if self.nodes.is_empty() {
            return None;
        }
        self.nodes
            .get((self.cursor + 1) % self.nodes.len())
            .cloned()
    }

    /// Peek the predecessor of the cursor without moving it
    #[allow(dead_code)]
    pub fn prev(&self) -> Option<Arc<Endpoint>> {
        if self.nodes.is_empty() {
            return None;
        }
        let len = self.nodes.len();
        self.nodes.get((self.cursor + len - 1) % len).cloned()
    }

    /// Return the current element and advance the cursor one step
    pub fn move_next(&mut self) -> Option<Arc<Endpoint>> {
        if self.nodes.is_empty() {
            return None;
        }
        let current = self.nodes[self.cursor].clone();
        self.cursor = (self.cursor + 1) % self.nodes.len();
        Some(current)
    }

    /// Return the current element and step the cursor back one step
    #[allow(dead_code)]
    pub fn move_prev(&mut self) -> Option<Arc<Endpoint>> {
        if self.nodes.is_empty() {
            return None;
        }
        let current = self.nodes[self.cursor].clone();
        let len = self.nodes.len();
        self.cursor = (self.cursor + len - 1) % len;
        Some(current)
    }

    /// Unlink an endpoint by id. When the removed element was the cursor
    /// position, the cursor lands on its successor.
    pub fn remove(&mut self, id: u64) -> bool {
        let Some(idx) = self.nodes.iter().position(|e| e.id() == id) else {
            return false;
        };
        self.nodes.remove(idx);

        if self.nodes.is_empty() {
            self.cursor = 0;
        } else {
            if idx < self.cursor {
                self.cursor -= 1;
            }
            if self.cursor >= self.nodes.len() {
                self.cursor = 0;
            }
        }
        true
    }

    /// Snapshot of the ring contents in insertion order
    pub fn snapshot(&self) -> Vec<Arc<Endpoint>> {
        self.nodes.clone()
    }

    /// Empty the ring and hand back everything it held
    pub fn take_all(&mut self) -> Vec<Arc<Endpoint>> {
        self.cursor = 0;
        std::mem::take(&mut self.nodes)
    }

    #[allow(dead_code)]
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.cursor = 0;
    }
}
