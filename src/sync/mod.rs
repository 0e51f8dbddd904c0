//! Sync engine: mutation pipeline, live demultiplexer, and the coordinator
//! that drives bootstrap, delta catch-up, and live tailing.

pub mod coordinator;
pub mod live;
pub mod pipeline;

pub use coordinator::{SyncCoordinator, SyncPhase};
pub use live::LiveDemultiplexer;
pub use pipeline::MutationPipeline;
