//! Position identity and node storage for [UCT] (Monte Carlo Tree Search) in
//! two-player board games.
//!
//! [`tree::NodeTable`] associates a position, identified by its hash, side to
//! move and ply, with a slot of a fixed-capacity open-addressed table and with
//! the [`tree::Node`] record holding the search statistics of that position.
//! Between moves, [`tree::NodeTable::delete_old_hash`] keeps the subtree that
//! is still reachable from the new root and releases everything else.
//!
//! The search loop, the evaluator and the game rules are not part of this
//! crate. The rules are plugged in through [`environment::GameState`].
//!
//! ```
//! use uct_table::config::TableConfig;
//! use uct_table::environment::Player;
//! use uct_table::tree::NodeTable;
//!
//! let mut table = NodeTable::new(TableConfig::with_capacity(1024)).unwrap();
//! let root = table.find_or_insert(0xDEAD_BEEF, Player::Black, 0);
//! assert!(table.is_valid(root));
//! assert_eq!(table.find_same_hash_index(0xDEAD_BEEF, Player::Black, 0), root);
//!
//! table.node_mut(root).expand(&[7, 11, 42]);
//! table.node_mut(root).set_evaluation(&[0.5, 0.25, 0.25], 0.6);
//! table.node_mut(root).update(1.0);
//! assert_eq!(table.node(root).win_rate(), Some(1.0));
//! ```
//!
//! [UCT]: https://www.chessprogramming.org/UCT

#![warn(missing_docs, variant_size_differences)]
// Rustc lints.
#![warn(
    absolute_paths_not_starting_with_crate,
    keyword_idents,
    macro_use_extern_crate,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unused_extern_crates,
    unused_import_braces,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]
// Rustdoc lints.
#![warn(
    rustdoc::private_doc_tests,
    rustdoc::missing_crate_level_docs,
    rustdoc::broken_intra_doc_links,
    rustdoc::invalid_codeblock_attributes,
    rustdoc::invalid_html_tags,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::bare_urls
)]
// Clippy lints.
#![warn(
    clippy::correctness,
    clippy::suspicious,
    clippy::style,
    clippy::complexity,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo
)]
// The table sits on the hot path of every simulation.
#![deny(clippy::perf)]

pub mod config;
pub mod environment;
pub mod tree;

use shadow_rs::shadow;

shadow!(build);

/// Returns the full crate version that can be used to identify how it was
/// built in the first place.
#[must_use]
pub fn version() -> String {
    format!(
        "{} (commit {}, branch {})",
        build::PKG_VERSION,
        build::SHORT_COMMIT,
        build::BRANCH
    )
}
