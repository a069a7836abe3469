//! A persistent hash-array-mapped trie, the backbone of [`Bindings`],
//! [`Database`](crate::machine::database::Database) and
//! [`ForeignRegistry`](crate::machine::registry::ForeignRegistry).
//!
//! This exists in-crate rather than as a dependency: per the
//! specification's design notes, the persistent collections are part of
//! the core, not a throwaway dependency. Each level branches 16 ways over
//! a 4-bit slice of the key's hash; inserting copies only the O(log16 n)
//! nodes on the path to the new leaf, sharing everything else via `Arc`.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

const FANOUT: usize = 16;
const BITS_PER_LEVEL: u32 = 4;
const MAX_DEPTH: u32 = 64 / BITS_PER_LEVEL as u32;

fn hash_of<K: Hash>(key: &K) -> u64 {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    hasher.finish()
}

fn index_at(hash: u64, depth: u32) -> usize {
    ((hash >> (depth * BITS_PER_LEVEL)) & 0xF) as usize
}

enum Node<K, V> {
    Empty,
    Leaf(u64, K, V),
    /// Two or more keys whose hashes still collide after `MAX_DEPTH` levels.
    Collision(u64, Vec<(K, V)>),
    Branch(Arc<[Node<K, V>; FANOUT]>),
}

impl<K: Clone, V: Clone> Clone for Node<K, V> {
    fn clone(&self) -> Self {
        match self {
            Node::Empty => Node::Empty,
            Node::Leaf(h, k, v) => Node::Leaf(*h, k.clone(), v.clone()),
            Node::Collision(h, entries) => Node::Collision(*h, entries.clone()),
            Node::Branch(children) => Node::Branch(children.clone()),
        }
    }
}

impl<K: Clone + Eq, V: Clone> Node<K, V> {
    fn insert(&self, hash: u64, depth: u32, key: K, value: V) -> Node<K, V> {
        match self {
            Node::Empty => Node::Leaf(hash, key, value),
            Node::Leaf(h, k, v) => {
                if *h == hash && *k == key {
                    return Node::Leaf(hash, key, value);
                }
                if *h == hash || depth >= MAX_DEPTH {
                    return Node::Collision(*h, vec![(k.clone(), v.clone()), (key, value)]);
                }
                let idx_old = index_at(*h, depth);
                let idx_new = index_at(hash, depth);
                let mut children: [Node<K, V>; FANOUT] = std::array::from_fn(|_| Node::Empty);
                if idx_old == idx_new {
                    children[idx_old] = Node::Leaf(*h, k.clone(), v.clone()).insert(hash, depth + 1, key, value);
                } else {
                    children[idx_old] = Node::Leaf(*h, k.clone(), v.clone());
                    children[idx_new] = Node::Leaf(hash, key, value);
                }
                Node::Branch(Arc::new(children))
            }
            Node::Collision(h, entries) => {
                if *h != hash {
                    // Re-insert every colliding entry through a fresh branch
                    // so it can split apart using bits beyond MAX_DEPTH's bucket.
                    let mut node = Node::Empty;
                    for (k, v) in entries.iter() {
                        node = node.insert(*h, depth, k.clone(), v.clone());
                    }
                    return node.insert(hash, depth, key, value);
                }
                let mut new_entries = entries.clone();
                match new_entries.iter().position(|(k, _)| *k == key) {
                    Some(pos) => new_entries[pos] = (key, value),
                    None => new_entries.push((key, value)),
                }
                Node::Collision(hash, new_entries)
            }
            Node::Branch(children) => {
                let idx = index_at(hash, depth);
                let mut new_children = (**children).clone();
                new_children[idx] = children[idx].insert(hash, depth + 1, key, value);
                Node::Branch(Arc::new(new_children))
            }
        }
    }

    fn get(&self, hash: u64, depth: u32, key: &K) -> Option<&V> {
        match self {
            Node::Empty => None,
            Node::Leaf(h, k, v) => {
                if *h == hash && k == key {
                    Some(v)
                } else {
                    None
                }
            }
            Node::Collision(h, entries) => {
                if *h == hash {
                    entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
                } else {
                    None
                }
            }
            Node::Branch(children) => children[index_at(hash, depth)].get(hash, depth + 1, key),
        }
    }
}

/// A persistent map from `K` to `V`.
pub struct PMap<K, V> {
    root: Arc<Node<K, V>>,
    len: usize,
}

impl<K, V> Clone for PMap<K, V> {
    fn clone(&self) -> Self {
        PMap { root: self.root.clone(), len: self.len }
    }
}

impl<K: Clone + Eq + Hash, V: Clone> Default for PMap<K, V> {
    fn default() -> Self {
        PMap::new()
    }
}

impl<K: Clone + Eq + Hash, V: Clone> PMap<K, V> {
    pub fn new() -> Self {
        PMap { root: Arc::new(Node::Empty), len: 0 }
    }

    /// Returns a new map with `key` bound to `value`, leaving `self` intact.
    pub fn insert(&self, key: K, value: V) -> Self {
        let hash = hash_of(&key);
        let grows = self.get(&key).is_none();
        let new_root = self.root.insert(hash, 0, key, value);
        PMap { root: Arc::new(new_root), len: if grows { self.len + 1 } else { self.len } }
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.root.get(hash_of(key), 0, key)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_then_get() {
        let m: PMap<u64, &str> = PMap::new();
        let m2 = m.insert(1, "a").insert(2, "b");
        assert_eq!(m2.get(&1), Some(&"a"));
        assert_eq!(m2.get(&2), Some(&"b"));
        assert_eq!(m2.get(&3), None);
    }

    #[test]
    fn original_map_unaffected_by_insert() {
        let m: PMap<u64, i32> = PMap::new();
        let m1 = m.insert(10, 1);
        let m2 = m1.insert(10, 2);
        assert_eq!(m1.get(&10), Some(&1));
        assert_eq!(m2.get(&10), Some(&2));
    }

    #[test]
    fn handles_many_keys_without_losing_entries() {
        let mut m: PMap<u64, u64> = PMap::new();
        for i in 0..2000u64 {
            m = m.insert(i, i * i);
        }
        for i in 0..2000u64 {
            assert_eq!(m.get(&i), Some(&(i * i)));
        }
        assert_eq!(m.len(), 2000);
    }

    #[test]
    fn len_does_not_double_count_overwrites() {
        let m: PMap<u64, i32> = PMap::new();
        let m = m.insert(1, 1).insert(1, 2).insert(1, 3);
        assert_eq!(m.len(), 1);
    }
}
