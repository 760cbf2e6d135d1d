//! Crossword generation as a constraint-satisfaction problem: slots derived from a grid of open
//! and blocked cells are filled from a word list by node consistency, AC-3 and heuristic
//! backtracking search.

pub mod consistency;
pub mod domains;
pub mod errors;
pub mod grid;
pub mod log;
pub mod parse;
pub mod render;
pub mod search;
pub mod word_list;

pub use grid::{generate_crossword_from_template_string, Crossword, Direction, Overlap, Variable, VariableId};
pub use search::{find_fill, Assignment, FillFailure, FillOptions, FillSuccess, SearchLimits, Statistics};
pub use word_list::{Word, WordId, WordList};

/// The expected maximum length for a single slot.
pub const MAX_SLOT_LENGTH: usize = 21;

/// The expected maximum number of slots appearing in a grid.
pub const MAX_SLOT_COUNT: usize = 256;
