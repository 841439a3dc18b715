//! Shared vocabulary for the gridworld engine: cell coordinates, discrete
//! headings, the splittable seed and the error taxonomy.
//!
//! # Invariants
//! - A [`Seed`] is consumed by every split or draw; it cannot be reused.
//! - [`Direction`] indices are part of the public contract (0 = East, clockwise).

mod error;
mod seed;
mod types;

pub use error::{GridError, Result};
pub use seed::Seed;
pub use types::{Direction, Position};

pub fn crate_info() -> &'static str {
    "gridworld-common v0.1.0"
}
