mod fields;
mod reader;
mod writer;
pub mod xml;

pub use fields::{ComicInfo, Field, ListField, ScalarField, SCHEMA_ORDER};
pub use reader::{has_comic_info, read_comic_info, COMIC_INFO_ENTRY};
pub use writer::{erase_comic_info, write_comic_info};
