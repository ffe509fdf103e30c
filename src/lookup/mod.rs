pub mod api;
pub mod mapper;
pub mod merge;

pub use api::{ComicVineClient, CvVolume, VolumeQuery};
pub use mapper::{map, SourceRecord};
pub use merge::{reconcile, WriteMode};
