//! Persistent storage.
//!
//! The bot keeps exactly one value on disk: the file id of the video
//! currently being distributed.

mod video_store;

pub use video_store::{StoreError, VideoStore};
