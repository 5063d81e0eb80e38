pub mod badge;
pub mod extractor;
pub mod guard;
pub mod memory;
pub mod tree;
pub mod watcher;

pub use extractor::PageExtractor;
pub use memory::{MemoryDocument, SharedDocument, SnapshotNode};
pub use tree::{DocumentTree, NodeId};
