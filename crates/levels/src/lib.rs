//! Level packs, puzzle sessions and campaign progress.
//!
//! Levels ask the player to rebuild a reference gate kind out of a restricted
//! set of permitted kinds. Solving a level unlocks new kinds for later levels
//! and the sandbox.

#![deny(missing_docs, unreachable_pub, unused_must_use)]
#![deny(clippy::all)]
#![forbid(unsafe_code)]

mod campaign;
mod error;
mod level;
mod puzzle;

pub use campaign::Campaign;
pub use error::{ErrorKind, LevelError};
pub use level::{Chapter, Level, LevelPack};
pub use puzzle::{Puzzle, Submission};
