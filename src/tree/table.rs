use std::ops::Index;

use crate::config::TableConfig;
use crate::environment::{GameState, Player, Ply};
use crate::tree::{hash_to_index, Key, Node, NodeIndex};

/// Identity of the position held by a slot.
///
/// Two positions are the same node only if the hash, the side to move and the
/// ply all match: 64-bit hashes collide eventually, and the same board reached
/// at different plies has to be tracked separately for repetition rules.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Entry {
    /// Positional hash.
    pub key: Key,
    /// Player to move.
    pub side: Player,
    /// Half-moves since the start of the game.
    pub ply: Ply,
    /// Whether the slot currently holds a live position.
    pub occupied: bool,
}

impl Entry {
    #[must_use]
    fn matches(&self, key: Key, side: Player, ply: Ply) -> bool {
        self.key == key && self.side == side && self.ply == ply
    }
}

/// Fixed-capacity open-addressed table of positions with linear probing,
/// owning the arena of [`Node`] records aligned with its slots.
///
/// Failed lookups and insertions return the sentinel [`NodeTable::capacity`]
/// (one past the last valid slot) instead of an error. Callers have to check
/// returned indices with [`NodeTable::is_valid`] before touching the arena.
///
/// The table has no internal synchronization. Concurrent searches should wrap
/// it in a single lock so that a position is never claimed by two slots.
#[derive(Debug)]
pub struct NodeTable {
    pub(super) entries: Box<[Entry]>,
    pub(super) nodes: Box<[Node]>,
    pub(super) used: usize,
    limit: usize,
    pub(super) enough_size: bool,
}

impl NodeTable {
    /// Allocates an empty table.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` is not valid (see
    /// [`TableConfig::validate`]).
    pub fn new(config: TableConfig) -> anyhow::Result<Self> {
        config.validate()?;
        Ok(Self {
            entries: vec![Entry::default(); config.capacity].into_boxed_slice(),
            nodes: vec![Node::default(); config.capacity].into_boxed_slice(),
            used: 0,
            limit: config.limit(),
            enough_size: true,
        })
    }

    /// Clears all entries and node records without reallocating.
    pub fn initialize(&mut self) {
        tracing::trace!(capacity = self.capacity(), "initializing node table");
        self.used = 0;
        self.enough_size = true;
        self.entries.fill(Entry::default());
        for node in self.nodes.iter_mut() {
            node.reset();
        }
    }

    /// Number of slots. Also the sentinel value for a failed lookup or a full
    /// table.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if `index` refers to a slot, i.e. it is not the sentinel.
    #[must_use]
    pub fn is_valid(&self, index: NodeIndex) -> bool {
        index < self.capacity()
    }

    /// Number of occupied slots.
    #[must_use]
    pub const fn used(&self) -> usize {
        self.used
    }

    /// Returns `false` once the number of occupied slots exceeds the
    /// configured threshold. The flag is restored by
    /// [`NodeTable::delete_old_hash`].
    #[must_use]
    pub const fn has_enough_size(&self) -> bool {
        self.enough_size
    }

    /// Fraction of occupied slots in `[0, 1]`.
    #[must_use]
    pub fn get_usage_rate(&self) -> f64 {
        self.used as f64 / self.capacity() as f64
    }

    /// Same as [`NodeTable::get_usage_rate`].
    #[must_use]
    pub fn usage_rate(&self) -> f64 {
        self.get_usage_rate()
    }

    /// Slots visited by linear probing for `key`: starting at the home slot and
    /// wrapping around once.
    pub(super) fn probe(&self, key: Key) -> impl Iterator<Item = NodeIndex> {
        let capacity = self.capacity();
        let home = hash_to_index(key, capacity);
        (home..capacity).chain(0..home)
    }

    /// Claims the first free slot in the probe sequence of `key` for the
    /// position and returns it. Returns [`NodeTable::capacity`] if every slot
    /// is occupied.
    ///
    /// This does **not** check whether the position is already in the table:
    /// call [`NodeTable::find_same_hash_index`] first and only insert on a miss
    /// (or use [`NodeTable::find_or_insert`]), otherwise the same position can
    /// end up in two slots.
    pub fn search_empty_index(&mut self, key: Key, side: Player, ply: Ply) -> NodeIndex {
        let Some(index) = self.probe(key).find(|&i| !self.entries[i].occupied) else {
            tracing::warn!(key, capacity = self.capacity(), "node table is full");
            return self.capacity();
        };
        self.entries[index] = Entry {
            key,
            side,
            ply,
            occupied: true,
        };
        self.nodes[index].reset();
        self.used += 1;
        if self.enough_size && self.used > self.limit {
            tracing::debug!(used = self.used, limit = self.limit, "node table is under pressure");
            self.enough_size = false;
        }
        index
    }

    /// Returns the slot holding the position or [`NodeTable::capacity`] if it
    /// is not in the table.
    ///
    /// Probing stops at the first free slot.
    #[must_use]
    pub fn find_same_hash_index(&self, key: Key, side: Player, ply: Ply) -> NodeIndex {
        for i in self.probe(key) {
            let entry = &self.entries[i];
            if !entry.occupied {
                break;
            }
            if entry.matches(key, side, ply) {
                return i;
            }
        }
        self.capacity()
    }

    /// Returns the slot of the position, claiming a new one if it is not in the
    /// table yet. Returns [`NodeTable::capacity`] if the position is new and
    /// the table is full.
    pub fn find_or_insert(&mut self, key: Key, side: Player, ply: Ply) -> NodeIndex {
        let index = self.find_same_hash_index(key, side, ply);
        if self.is_valid(index) {
            return index;
        }
        self.search_empty_index(key, side, ply)
    }

    /// Looks up the current position of `game`.
    #[must_use]
    pub fn index_of(&self, game: &impl GameState) -> NodeIndex {
        self.find_same_hash_index(game.hash(), game.side_to_move(), game.ply())
    }

    /// [`NodeTable::find_or_insert`] for the current position of `game`.
    pub fn find_or_insert_position(&mut self, game: &impl GameState) -> NodeIndex {
        self.find_or_insert(game.hash(), game.side_to_move(), game.ply())
    }

    /// # Panics
    ///
    /// Panics if `index` is the sentinel.
    #[must_use]
    pub fn entry(&self, index: NodeIndex) -> &Entry {
        &self.entries[index]
    }

    /// # Panics
    ///
    /// Panics if `index` is the sentinel.
    #[must_use]
    pub fn node(&self, index: NodeIndex) -> &Node {
        &self.nodes[index]
    }

    /// # Panics
    ///
    /// Panics if `index` is the sentinel.
    #[must_use]
    pub fn node_mut(&mut self, index: NodeIndex) -> &mut Node {
        &mut self.nodes[index]
    }

    /// Records that the `i`-th child of `parent` was committed to `child`.
    ///
    /// # Panics
    ///
    /// Panics if `child` is not a slot of this table, e.g. the sentinel
    /// returned when the table is full.
    pub fn link_child(&mut self, parent: NodeIndex, i: usize, child: NodeIndex) {
        assert!(self.is_valid(child), "cannot link child to slot {child}");
        self.nodes[parent].link_child(i, child);
    }
}

impl Index<NodeIndex> for NodeTable {
    type Output = Entry;

    fn index(&self, index: NodeIndex) -> &Self::Output {
        &self.entries[index]
    }
}
