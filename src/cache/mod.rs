pub mod refresher;
pub mod resolver;
pub mod snapshot;

pub use refresher::Refresher;
pub use resolver::Resolver;
pub use snapshot::SnapshotStore;
