pub mod check;
pub mod erase;
pub mod fields;
pub mod init;
pub mod search;
pub mod tag;
