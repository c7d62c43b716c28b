//! Fixed-capacity string LRU cache with O(1) operations.
//
// Uses a doubly-linked list with raw pointers for recency order:
// - get (promote): O(1)
// - put (insert/overwrite/evict): O(1)
// - remove: O(1)
//
// HashMap provides O(1) lookup from key to node pointer.

use std::collections::HashMap;
use std::fmt;
use std::ptr::{self, NonNull};

/// LRU node in the doubly-linked list.
struct LruNode {
    key: String,
    value: String,
    prev: *mut LruNode,
    next: *mut LruNode,
}

impl LruNode {
    fn new(key: String, value: String) -> Box<Self> {
        Box::new(LruNode {
            key,
            value,
            prev: ptr::null_mut(),
            next: ptr::null_mut(),
        })
    }
}

/// Bounded key -> value store evicting the least recently used entry.
///
/// There is no internal locking: the owner serializes access
/// (the manager keeps each cache behind its own mutex).
pub struct LruCache {
    capacity: usize,
    /// Head of the list (most recently used)
    head: *mut LruNode,
    /// Tail of the list (least recently used)
    tail: *mut LruNode,
    /// Map from key to node pointer for O(1) lookup
    nodes: HashMap<String, NonNull<LruNode>>,
}

// Safety: LruCache owns every node it points to. Nodes are allocated as
// Box<LruNode>, reachable both from `nodes` and the list, and are freed
// exactly once (remove / pop_tail / clear). No pointer escapes the struct.
unsafe impl Send for LruCache {}
unsafe impl Sync for LruCache {}

impl LruCache {
    /// Creates an empty cache. A zero capacity is bumped to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            head: ptr::null_mut(),
            tail: ptr::null_mut(),
            nodes: HashMap::with_capacity(capacity),
        }
    }

    /// Returns the value and promotes the key to most recently used.
    pub fn get(&mut self, key: &str) -> Option<&str> {
        let node_ptr = self.nodes.get(key).copied()?;
        unsafe {
            let node = node_ptr.as_ptr();
            self.unlink(node);
            self.link_front(node);
            Some((*node).value.as_str())
        }
    }

    /// Returns the value without touching recency.
    pub fn peek(&self, key: &str) -> Option<&str> {
        self.nodes
            .get(key)
            .map(|node_ptr| unsafe { (*node_ptr.as_ptr()).value.as_str() })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.nodes.contains_key(key)
    }

    /// Inserts or overwrites a value and promotes the key.
    ///
    /// Returns the evicted `(key, value)` when a new key pushed the cache
    /// over capacity.
    pub fn put(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<(String, String)> {
        let key = key.into();
        let value = value.into();

        if let Some(node_ptr) = self.nodes.get(&key).copied() {
            unsafe {
                let node = node_ptr.as_ptr();
                (*node).value = value;
                self.unlink(node);
                self.link_front(node);
            }
            return None;
        }

        let evicted = if self.nodes.len() >= self.capacity {
            self.pop_tail()
        } else {
            None
        };

        let node_ptr = NonNull::from(Box::leak(LruNode::new(key.clone(), value)));
        self.nodes.insert(key, node_ptr);
        unsafe {
            self.link_front(node_ptr.as_ptr());
        }

        evicted
    }

    /// Removes a key, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let node_ptr = self.nodes.remove(key)?;
        unsafe {
            let node = node_ptr.as_ptr();
            self.unlink(node);
            let node = Box::from_raw(node);
            Some(node.value)
        }
    }

    /// Pops the least recently used entry.
    pub fn pop_tail(&mut self) -> Option<(String, String)> {
        if self.tail.is_null() {
            return None;
        }

        unsafe {
            let node = self.tail;
            self.unlink(node);
            let node = Box::from_raw(node);
            self.nodes.remove(&node.key);
            Some((node.key, node.value))
        }
    }

    /// Peeks at the least recently used key.
    pub fn peek_tail(&self) -> Option<&str> {
        if self.tail.is_null() {
            None
        } else {
            unsafe { Some((*self.tail).key.as_str()) }
        }
    }

    /// Keys ordered from most to least recently used.
    pub fn keys_by_recency(&self) -> Vec<String> {
        let mut keys = Vec::with_capacity(self.nodes.len());
        let mut current = self.head;
        unsafe {
            while !current.is_null() {
                keys.push((*current).key.clone());
                current = (*current).next;
            }
        }
        keys
    }

    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_null()
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        unsafe {
            let mut current = self.head;
            while !current.is_null() {
                let next = (*current).next;
                drop(Box::from_raw(current));
                current = next;
            }
        }

        self.head = ptr::null_mut();
        self.tail = ptr::null_mut();
        self.nodes.clear();
    }

    /// Helper: detaches a node from the list (does not deallocate).
    unsafe fn unlink(&mut self, node: *mut LruNode) {
        let prev = (*node).prev;
        let next = (*node).next;

        if prev.is_null() {
            self.head = next;
        } else {
            (*prev).next = next;
        }

        if next.is_null() {
            self.tail = prev;
        } else {
            (*next).prev = prev;
        }

        (*node).prev = ptr::null_mut();
        (*node).next = ptr::null_mut();
    }

    /// Helper: pushes a detached node to the front of the list.
    unsafe fn link_front(&mut self, node: *mut LruNode) {
        (*node).next = self.head;
        (*node).prev = ptr::null_mut();

        if !self.head.is_null() {
            (*self.head).prev = node;
        } else {
            self.tail = node;
        }

        self.head = node;
    }
}

impl fmt::Debug for LruCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCache")
            .field("capacity", &self.capacity)
            .field("size", &self.nodes.len())
            .finish()
    }
}

impl Drop for LruCache {
    fn drop(&mut self) {
        self.clear();
    }
}
