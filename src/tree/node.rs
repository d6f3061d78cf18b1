use itertools::izip;

use crate::environment::MoveId;
use crate::tree::{NodeIndex, NOT_EXPANDED};

/// Search statistics of a single position, stored in the arena slot that
/// matches the position's slot in [`crate::tree::NodeTable`].
///
/// Per-child data is kept in separate index-aligned arrays (one entry per legal
/// move at expansion time) so that selection can scan visits, values and
/// priors without touching the children's own records. Children that have not
/// been committed to the table yet have [`NOT_EXPANDED`] as their slot and only
/// exist through these local copies.
#[derive(Clone, Debug, Default)]
pub struct Node {
    /// Total number of simulations that passed through this node.
    visits: u32,
    /// Sum of simulation outcomes backed up through this node.
    value: f32,
    expanded: bool,
    child_moves: Vec<MoveId>,
    child_slots: Vec<NodeIndex>,
    child_visits: Vec<u32>,
    child_values: Vec<f32>,
    /// Policy network output for each child move.
    priors: Vec<f32>,
    /// Value network prediction for this position.
    value_estimate: f32,
    evaluated: bool,
}

/// Read-only view of one child of a [`Node`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChildRef {
    /// Move leading to the child.
    pub id: MoveId,
    /// Slot of the child or [`NOT_EXPANDED`].
    pub slot: NodeIndex,
    /// Visits of the child as seen from the parent.
    pub visits: u32,
    /// Accumulated value of the child as seen from the parent.
    pub value: f32,
    /// Policy prior of the move.
    pub prior: f32,
}

impl ChildRef {
    /// Returns `true` if the child has a slot in the table.
    #[must_use]
    pub const fn is_expanded(&self) -> bool {
        self.slot != NOT_EXPANDED
    }

    /// Average outcome of the simulations through this child.
    #[must_use]
    pub fn win_rate(&self) -> Option<f32> {
        win_rate(self.value, self.visits)
    }
}

fn win_rate(value: f32, visits: u32) -> Option<f32> {
    (visits > 0).then(|| value / visits as f32)
}

impl Node {
    /// Creates a node with no statistics and no children.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the node to the state it had right after creation. Child arrays
    /// keep their allocations.
    pub fn reset(&mut self) {
        self.visits = 0;
        self.value = 0.0;
        self.expanded = false;
        self.child_moves.clear();
        self.child_slots.clear();
        self.child_visits.clear();
        self.child_values.clear();
        self.priors.clear();
        self.value_estimate = 0.0;
        self.evaluated = false;
    }

    /// Generates the children of this node from the legal moves of its
    /// position. None of them is expanded into the table yet.
    ///
    /// # Panics
    ///
    /// Panics if the node has already been expanded: the number of children is
    /// fixed once set.
    pub fn expand(&mut self, moves: &[MoveId]) {
        assert!(!self.expanded, "node is already expanded");
        let child_num = moves.len();
        self.expanded = true;
        self.child_moves.extend_from_slice(moves);
        self.child_slots.resize(child_num, NOT_EXPANDED);
        self.child_visits.resize(child_num, 0);
        self.child_values.resize(child_num, 0.0);
        self.priors.resize(child_num, 0.0);
    }

    /// Returns `true` once the children were generated.
    #[must_use]
    pub const fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// Number of legal moves at expansion time.
    #[must_use]
    pub fn child_num(&self) -> usize {
        self.child_moves.len()
    }

    /// Move of each child.
    #[must_use]
    pub fn child_moves(&self) -> &[MoveId] {
        &self.child_moves
    }

    /// Slot of each child, [`NOT_EXPANDED`] for children not in the table.
    #[must_use]
    pub fn child_slots(&self) -> &[NodeIndex] {
        &self.child_slots
    }

    /// Visits of each child as seen from this node.
    #[must_use]
    pub fn child_visits(&self) -> &[u32] {
        &self.child_visits
    }

    /// Accumulated value of each child as seen from this node.
    #[must_use]
    pub fn child_values(&self) -> &[f32] {
        &self.child_values
    }

    /// Policy prior of each child.
    #[must_use]
    pub fn priors(&self) -> &[f32] {
        &self.priors
    }

    /// Iterates over the children in move generation order.
    pub fn children(&self) -> impl Iterator<Item = ChildRef> + '_ {
        izip!(
            &self.child_moves,
            &self.child_slots,
            &self.child_visits,
            &self.child_values,
            &self.priors
        )
        .map(|(&id, &slot, &visits, &value, &prior)| ChildRef {
            id,
            slot,
            visits,
            value,
            prior,
        })
    }

    /// Returns the `i`-th child.
    ///
    /// # Panics
    ///
    /// Panics if `i` is not less than [`Node::child_num`].
    #[must_use]
    pub fn child(&self, i: usize) -> ChildRef {
        ChildRef {
            id: self.child_moves[i],
            slot: self.child_slots[i],
            visits: self.child_visits[i],
            value: self.child_values[i],
            prior: self.priors[i],
        }
    }

    /// Records the slot the `i`-th child was committed to. Callers outside the
    /// crate go through [`crate::tree::NodeTable::link_child`], which checks
    /// the slot.
    pub(crate) fn link_child(&mut self, i: usize, slot: NodeIndex) {
        self.child_slots[i] = slot;
    }

    /// Rewrites the slots of expanded children, e.g. after the table moved
    /// them.
    pub(crate) fn remap_children(&mut self, mut moved_to: impl FnMut(NodeIndex) -> NodeIndex) {
        for slot in &mut self.child_slots {
            if *slot != NOT_EXPANDED {
                *slot = moved_to(*slot);
            }
        }
    }

    /// Backs up one simulation outcome through this node.
    pub fn update(&mut self, value: f32) {
        self.visits += 1;
        self.value += value;
    }

    /// Backs up one simulation outcome through the `i`-th child.
    pub fn update_child(&mut self, i: usize, value: f32) {
        self.child_visits[i] += 1;
        self.child_values[i] += value;
    }

    /// Number of simulations through this node.
    #[must_use]
    pub const fn visits(&self) -> u32 {
        self.visits
    }

    /// Sum of the simulation outcomes through this node.
    #[must_use]
    pub const fn value(&self) -> f32 {
        self.value
    }

    /// Average outcome of the simulations through this node, or `None` if it
    /// was never visited.
    #[must_use]
    pub fn win_rate(&self) -> Option<f32> {
        win_rate(self.value, self.visits)
    }

    /// Average outcome of the simulations through the `i`-th child.
    #[must_use]
    pub fn child_win_rate(&self, i: usize) -> Option<f32> {
        win_rate(self.child_values[i], self.child_visits[i])
    }

    /// Stores the neural network output for this position.
    ///
    /// # Panics
    ///
    /// Panics if the number of priors differs from the number of children.
    pub fn set_evaluation(&mut self, priors: &[f32], value: f32) {
        assert_eq!(
            priors.len(),
            self.child_num(),
            "expected one prior per child"
        );
        self.priors.copy_from_slice(priors);
        self.value_estimate = value;
        self.evaluated = true;
    }

    /// Returns `true` once the priors and the value estimate were set by the
    /// evaluator.
    #[must_use]
    pub const fn is_evaluated(&self) -> bool {
        self.evaluated
    }

    /// Value network prediction, meaningful once [`Node::is_evaluated`].
    #[must_use]
    pub const fn value_estimate(&self) -> f32 {
        self.value_estimate
    }
}
