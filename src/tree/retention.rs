//! Tree reuse between moves: keeping only the positions reachable from the new
//! root.

use std::mem;

use crate::environment::{GameState, MoveId};
use crate::tree::{Entry, Node, NodeIndex, NodeTable, NOT_EXPANDED};

/// Applies moves to the borrowed game state and takes back the ones that are
/// still applied when dropped, so the state is restored on every exit path.
struct Line<'g, G: GameState> {
    game: &'g mut G,
    depth: usize,
}

impl<'g, G: GameState> Line<'g, G> {
    fn new(game: &'g mut G) -> Self {
        Self { game, depth: 0 }
    }

    fn push(&mut self, id: MoveId) {
        self.game.apply(id);
        self.depth += 1;
    }

    fn pop(&mut self) {
        debug_assert!(self.depth > 0);
        self.game.undo();
        self.depth -= 1;
    }
}

impl<G: GameState> Drop for Line<'_, G> {
    fn drop(&mut self) {
        while self.depth > 0 {
            self.pop();
        }
    }
}

impl NodeTable {
    /// Releases every slot that is not reachable from the current position of
    /// `game` (the new root after a move was played) and keeps the statistics
    /// of the reachable subtree.
    ///
    /// Returns the slot of the root after retention, or
    /// [`NodeTable::capacity`] if the root is not in the table, in which case
    /// the table ends up empty. The enough size flag is always restored.
    ///
    /// The subtree is walked depth-first without recursion. Moves are applied
    /// to `game` on the way down and undone on the way up: the walk leaves
    /// `game` in the position it was given, even if it unwinds.
    ///
    /// Retained positions are moved back into the probe sequences of their
    /// keys, so their slot indices can change: slots obtained before the call
    /// are stale. Child links are updated accordingly.
    ///
    /// # Panics
    ///
    /// Panics if a child link points outside the table.
    pub fn delete_old_hash(&mut self, game: &mut impl GameState) -> NodeIndex {
        let root = self.index_of(&*game);

        self.used = 0;
        for entry in self.entries.iter_mut() {
            entry.occupied = false;
        }

        let root_found = self.is_valid(root);
        let new_root = if root_found {
            let live = self.save_used_hash(game, root);
            self.reseat(&live)
        } else {
            self.capacity()
        };

        self.enough_size = true;
        tracing::debug!(
            root_found,
            retained = self.used,
            capacity = self.capacity(),
            "deleted old positions"
        );
        new_root
    }

    /// Marks `root` and every expanded node under it as occupied and returns
    /// their slots in visiting order.
    fn save_used_hash(&mut self, game: &mut impl GameState, root: NodeIndex) -> Vec<NodeIndex> {
        self.mark(root);
        let mut live = vec![root];

        let mut line = Line::new(game);
        // Slot and the position of the next child to look at.
        let mut stack: Vec<(NodeIndex, usize)> = vec![(root, 0)];
        while let Some(&mut (index, ref mut next)) = stack.last_mut() {
            let node = &self.nodes[index];
            let child = (*next..node.child_num()).find(|&i| {
                let slot = node.child_slots()[i];
                if slot == NOT_EXPANDED {
                    return false;
                }
                assert!(slot < self.entries.len(), "child slot {slot} is out of range");
                !self.entries[slot].occupied
            });
            match child {
                Some(i) => {
                    *next = i + 1;
                    let slot = node.child_slots()[i];
                    line.push(node.child_moves()[i]);
                    self.mark(slot);
                    live.push(slot);
                    stack.push((slot, 0));
                },
                None => {
                    let _ = stack.pop();
                    if !stack.is_empty() {
                        line.pop();
                    }
                },
            }
        }
        live
    }

    fn mark(&mut self, index: NodeIndex) {
        self.entries[index].occupied = true;
        self.used += 1;
    }

    /// Moves the `live` positions to the first free slots of their probe
    /// sequences. Lookup stops at the first free slot, so a retained position
    /// left behind a released one would otherwise become unreachable.
    ///
    /// Returns the new slot of `live[0]`.
    fn reseat(&mut self, live: &[NodeIndex]) -> NodeIndex {
        let retained: Vec<(NodeIndex, Entry, Node)> = live
            .iter()
            .map(|&index| {
                (
                    index,
                    self.entries[index],
                    mem::take(&mut self.nodes[index]),
                )
            })
            .collect();
        for &index in live {
            self.entries[index].occupied = false;
        }

        let mut moved_to = vec![NOT_EXPANDED; self.capacity()];
        let mut seats = Vec::with_capacity(retained.len());
        for (old, entry, node) in retained {
            let Some(new) = self.probe(entry.key).find(|&i| !self.entries[i].occupied) else {
                unreachable!("retained positions fit into the slots they were taken from");
            };
            self.entries[new] = entry;
            self.nodes[new] = node;
            moved_to[old] = new;
            seats.push(new);
        }

        for &seat in &seats {
            self.nodes[seat].remap_children(|slot| moved_to[slot]);
        }
        seats[0]
    }
}
