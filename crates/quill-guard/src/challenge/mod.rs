//! Single-use arithmetic challenges for comment forms.

mod puzzle;
mod store;

pub use puzzle::{Operator, Puzzle};
pub use store::{ChallengeStore, ChallengeTicket};
