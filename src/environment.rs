//! Interface of the game rules implementation that the node table relies on.
//!
//! The table never inspects the board itself: positions are identified by the
//! triple (positional hash, side to move, ply) that the rules provide, and the
//! only way the table changes a position is by applying and undoing moves
//! during [subtree retention](crate::tree::NodeTable::delete_old_hash).

use std::fmt;
use std::ops::Not;

use anyhow::bail;

use crate::tree::Key;

/// Two-player games only: Black moves first, as in Go and Shogi.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Player {
    #[default]
    Black,
    White,
}

impl Not for Player {
    type Output = Self;

    fn not(self) -> Self::Output {
        match self {
            Self::Black => Self::White,
            Self::White => Self::Black,
        }
    }
}

impl TryFrom<&str> for Player {
    type Error = anyhow::Error;

    fn try_from(color: &str) -> anyhow::Result<Self> {
        match color {
            "b" => Ok(Self::Black),
            "w" => Ok(Self::White),
            _ => bail!("color should be 'b' or 'w', got '{color}'"),
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match &self {
                Self::Black => 'b',
                Self::White => 'w',
            }
        )
    }
}

/// Number of half-moves since the start of the game.
pub type Ply = u16;

/// Opaque move identifier understood by [`GameState::apply`]. The node record
/// stores these for its children and hands them back during retention.
pub type MoveId = u16;

/// Mutable game state owned by the rules engine.
///
/// The hash is expected to be maintained incrementally (e.g. [Zobrist
/// hashing]) so querying it is cheap.
///
/// [Zobrist hashing]: https://www.chessprogramming.org/Zobrist_Hashing
pub trait GameState {
    /// Positional hash of the current board.
    fn hash(&self) -> Key;

    /// Player to move in the current position.
    fn side_to_move(&self) -> Player;

    /// Number of half-moves played since the start of the game.
    fn ply(&self) -> Ply;

    /// Plays the move identified by `id` in the current position.
    fn apply(&mut self, id: MoveId);

    /// Takes back the most recently applied move.
    fn undo(&mut self);
}
