pub mod format;
pub mod planner;
pub mod scanner;

pub use format::{derive_filename, FILENAME_TEMPLATE, MAX_FILENAME_BYTES};
pub use planner::{plan_rename, RenamePlan};
pub use scanner::scan_paths;
