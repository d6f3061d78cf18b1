//! Drives the node table with chess positions the way a search loop would:
//! random descents from the root, expansion of the leaves, then tree reuse
//! after a move is played on the board.

use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shakmaty::zobrist::{Zobrist64, ZobristHash};
use shakmaty::{Chess, Color, EnPassantMode, Position};
use uct_table::config::TableConfig;
use uct_table::environment::{GameState, MoveId, Player, Ply};
use uct_table::tree::{Key, NodeIndex, NodeTable, NOT_EXPANDED};

/// Chess game with full history, so that moves can be taken back.
struct Game {
    history: Vec<Chess>,
}

impl Game {
    fn new() -> Self {
        Self {
            history: vec![Chess::default()],
        }
    }

    fn current(&self) -> &Chess {
        self.history.last().expect("history always has the root")
    }

    fn moves(&self) -> Vec<MoveId> {
        let count = self.current().legal_moves().len();
        (0..count)
            .map(|i| MoveId::try_from(i).expect("move index fits in a MoveId"))
            .collect()
    }

    fn identity(&self) -> (Key, Player, Ply) {
        (self.hash(), self.side_to_move(), self.ply())
    }
}

impl GameState for Game {
    fn hash(&self) -> Key {
        self.current()
            .zobrist_hash::<Zobrist64>(EnPassantMode::Legal)
            .0
    }

    fn side_to_move(&self) -> Player {
        match self.current().turn() {
            Color::White => Player::White,
            Color::Black => Player::Black,
        }
    }

    fn ply(&self) -> Ply {
        Ply::try_from(self.history.len() - 1).expect("short games only")
    }

    fn apply(&mut self, id: MoveId) {
        let mut next = self.current().clone();
        let moves = next.legal_moves();
        next.play_unchecked(&moves[usize::from(id)]);
        self.history.push(next);
    }

    fn undo(&mut self) {
        assert!(self.history.len() > 1, "undo at the root");
        let _ = self.history.pop();
    }
}

/// Descends from the root following random children and inserts the first
/// unexpanded child it meets.
fn simulate(table: &mut NodeTable, game: &mut Game, rng: &mut StdRng) {
    let mut index = table.find_or_insert_position(&*game);
    assert!(table.is_valid(index));
    let mut depth = 0;
    loop {
        if !table.node(index).is_expanded() {
            let moves = game.moves();
            let uniform = vec![1.0 / moves.len().max(1) as f32; moves.len()];
            let node = table.node_mut(index);
            node.expand(&moves);
            node.set_evaluation(&uniform, 0.5);
        }
        let child_num = table.node(index).child_num();
        if child_num == 0 {
            break;
        }
        let i = rng.gen_range(0..child_num);
        let id = table.node(index).child_moves()[i];
        table.node_mut(index).update_child(i, 1.0);
        table.node_mut(index).update(1.0);
        game.apply(id);
        depth += 1;
        let slot = table.node(index).child_slots()[i];
        if slot == NOT_EXPANDED {
            let child = table.find_or_insert_position(&*game);
            if !table.is_valid(child) {
                break;
            }
            table.link_child(index, i, child);
            table.node_mut(child).update(1.0);
            break;
        }
        index = slot;
    }
    for _ in 0..depth {
        game.undo();
    }
}

/// Slots reachable from `root` through expanded children.
fn reachable(table: &NodeTable, root: NodeIndex) -> Vec<NodeIndex> {
    let mut seen = vec![false; table.capacity()];
    let mut stack = vec![root];
    let mut result = vec![];
    while let Some(index) = stack.pop() {
        if seen[index] {
            continue;
        }
        seen[index] = true;
        result.push(index);
        stack.extend(
            table
                .node(index)
                .child_slots()
                .iter()
                .filter(|&&slot| slot != NOT_EXPANDED),
        );
    }
    result
}

#[test]
fn search_then_reuse() {
    let mut table = NodeTable::new(TableConfig::with_capacity(4096)).expect("valid config");
    let mut game = Game::new();
    let mut rng = StdRng::seed_from_u64(42);

    let mut previous = table.usage_rate();
    for _ in 0..500 {
        simulate(&mut table, &mut game, &mut rng);
        let rate = table.usage_rate();
        assert!(previous <= rate && rate <= 1.0);
        previous = rate;
    }
    assert_eq!(game.ply(), 0);
    let root = table.index_of(&game);
    let before = table.used();
    assert_eq!(reachable(&table, root).len(), before);

    // Play the most visited move on the board.
    let node = table.node(root);
    let best = (0..node.child_num())
        .max_by_key(|&i| node.child_visits()[i])
        .expect("root has children");
    let best_visits = node.child_visits()[best];
    let best_slot = node.child_slots()[best];
    let best_id = node.child_moves()[best];
    assert_ne!(best_slot, NOT_EXPANDED);
    let subtree = reachable(&table, best_slot).len();

    game.apply(best_id);
    let identity = game.identity();
    let new_root = table.delete_old_hash(&mut game);

    assert_eq!(game.identity(), identity);
    assert_eq!(table.used(), subtree);
    assert!(table.used() < before);
    assert!(table.has_enough_size());
    assert!(table.is_valid(new_root));
    assert_eq!(table.index_of(&game), new_root);
    assert_eq!(table.node(new_root).visits(), best_visits);
    assert_eq!(reachable(&table, new_root).len(), subtree);
    for index in reachable(&table, new_root) {
        assert!(table.entry(index).occupied);
    }

    // The previous root is gone.
    game.undo();
    assert_eq!(table.index_of(&game), table.capacity());
}

#[test]
fn unexpected_move_leaves_cold_table() {
    let mut table = NodeTable::new(TableConfig::with_capacity(1024)).expect("valid config");
    let mut game = Game::new();
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..50 {
        simulate(&mut table, &mut game, &mut rng);
    }
    assert!(table.used() > 1);

    // Find a position two plies ahead that the search never reached.
    let mut missing = None;
    'search: for first in game.moves() {
        game.apply(first);
        for second in game.moves() {
            game.apply(second);
            let found = table.is_valid(table.index_of(&game));
            game.undo();
            if !found {
                missing = Some((first, second));
                break 'search;
            }
        }
        game.undo();
    }
    let (first, second) = missing.expect("the search is small");
    // Breaking out of the loop skipped the undo of the first move.
    game.undo();
    game.apply(first);
    game.apply(second);
    let root = table.delete_old_hash(&mut game);

    assert_eq!(root, table.capacity());
    assert_eq!(table.used(), 0);
    assert_eq!(table.usage_rate(), 0.0);
    assert_eq!(game.ply(), 2);
}

#[test]
fn tree_reuse_over_a_game() {
    let mut table = NodeTable::new(TableConfig::with_capacity(2048)).expect("valid config");
    let mut game = Game::new();
    let mut rng = StdRng::seed_from_u64(2024);

    for ply in 0..12 {
        for _ in 0..200 {
            simulate(&mut table, &mut game, &mut rng);
        }
        assert!(table.used() <= table.capacity());

        let root = table.index_of(&game);
        assert!(table.is_valid(root));
        let node = table.node(root);
        if node.child_num() == 0 {
            break;
        }
        let best = (0..node.child_num())
            .max_by_key(|&i| node.child_visits()[i])
            .expect("root has children");
        game.apply(node.child_moves()[best]);
        let root = table.delete_old_hash(&mut game);

        assert_eq!(game.ply(), ply + 1);
        assert!(table.is_valid(root));
        assert_eq!(table.index_of(&game), root);
        assert!(table.has_enough_size());
    }
}
