pub mod clock;
pub mod errors;
pub mod frame;
pub mod manager;
pub mod page_table;
pub mod stats;

pub use errors::{BufferError, BufferResult};
pub use frame::{FrameDescriptor, FrameId, FrameOwner};
pub use manager::BufferManager;
pub use stats::BufStats;
