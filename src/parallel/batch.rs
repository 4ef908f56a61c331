//! Batch distribution for parallel trial execution.
//!
//! The harness normally runs one trial per Rayon task; this module carves a
//! trial range into contiguous blocks for chunked execution or progress
//! reporting, giving each block an independently derived seed so parallel
//! batches stay uncorrelated.

use crate::combat::rng::stream_seed;
use crate::cost::CostModel;
use crate::data::config::ScenarioConfig;
use crate::generate::FleetGenerator;
use crate::montecarlo::{run_trials_parallel, TrialRecord};
use crate::parallel::pool::WorkerPool;

/// A contiguous `[start, end)` slice of the trial range with its own stream
/// seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrialBlock {
    pub start: usize,
    pub end: usize,
    pub seed: u64,
}

/// Split `total` trials into up to `num_blocks` blocks, as equal in size as
/// possible (later blocks may be one trial smaller). Each block's seed is
/// derived from `base_seed` and the block index.
pub fn trial_blocks(total: usize, num_blocks: usize, base_seed: u64) -> Vec<TrialBlock> {
    if total == 0 || num_blocks == 0 {
        return Vec::new();
    }
    let num_blocks = num_blocks.min(total);
    let base = total / num_blocks;
    let remainder = total % num_blocks;
    let mut blocks = Vec::with_capacity(num_blocks);
    let mut start = 0;
    for i in 0..num_blocks {
        let size = base + usize::from(i < remainder);
        let end = start + size;
        blocks.push(TrialBlock {
            start,
            end,
            seed: stream_seed(base_seed, i as u64),
        });
        start = end;
    }
    blocks
}

/// Run a parallel trial batch on a configured worker pool. Convenience that
/// calls [run_trials_parallel] inside [WorkerPool::install] when a custom
/// worker count is set.
pub fn run_trial_batches<G, C>(
    config: &ScenarioConfig,
    generator: &G,
    cost_model: &C,
    pool: &WorkerPool,
) -> Vec<TrialRecord>
where
    G: FleetGenerator + Sync,
    C: CostModel + Sync,
{
    pool.install(|| run_trials_parallel(config, generator, cost_model))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_cover_the_range_without_overlap() {
        let blocks = trial_blocks(100, 4, 7);
        assert_eq!(blocks.len(), 4);
        assert_eq!(blocks[0].start, 0);
        assert_eq!(blocks[3].end, 100);
        for pair in blocks.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
    }

    #[test]
    fn remainder_spreads_over_the_leading_blocks() {
        let blocks = trial_blocks(10, 3, 7);
        let sizes: Vec<usize> = blocks.iter().map(|b| b.end - b.start).collect();
        assert_eq!(sizes, vec![4, 3, 3]);
    }

    #[test]
    fn more_blocks_than_trials_collapses_to_one_each() {
        let blocks = trial_blocks(3, 10, 7);
        assert_eq!(blocks.len(), 3);
        assert!(blocks.iter().all(|b| b.end - b.start == 1));
    }

    #[test]
    fn empty_inputs_produce_no_blocks() {
        assert!(trial_blocks(0, 5, 7).is_empty());
        assert!(trial_blocks(10, 0, 7).is_empty());
    }

    #[test]
    fn block_seeds_are_distinct_and_reproducible() {
        let first = trial_blocks(100, 4, 7);
        let second = trial_blocks(100, 4, 7);
        assert_eq!(first, second);
        for pair in first.windows(2) {
            assert_ne!(pair[0].seed, pair[1].seed);
        }
    }
}
