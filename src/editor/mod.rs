pub mod diff;

pub use diff::{compute_changes, format_diff};
