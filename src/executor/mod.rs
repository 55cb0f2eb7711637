//! Executor module: provider evaluation and entry staging

pub mod copy;
pub mod pool;
pub mod stage;

pub use copy::copy_file_atomic;
pub use pool::{CancelHandle, PoolJob, PoolOutput, PoolStats, ProviderPool};
pub use stage::{stage_entries, StageCallback, StageEvent, StageStats};
