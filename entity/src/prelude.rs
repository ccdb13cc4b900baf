pub use super::album::{AlbumSpec, NotebookCopy, SyncAlbum};
pub use super::metadata::{PullBucketMetadata, SyncMetadata, TrackMetadata};
