pub mod batch;
pub mod pool;

pub use batch::{run_trial_batches, trial_blocks, TrialBlock};
pub use pool::WorkerPool;
