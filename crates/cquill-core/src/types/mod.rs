mod blob;
mod duration;
mod timestamp;

pub use blob::Blob;
pub use duration::Duration;
pub use timestamp::Timestamp;
