//! Proof-of-work miner
//!
//! The nonce search is a pure loop: canonicalize, hash, test the leading
//! zero predicate, increment. `Miner` carries a stop signal so a search can
//! be cancelled; `MinerPool` bounds how many searches run at once and puts
//! a timeout on each so one slow submission cannot starve the node.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::debug;

use crate::ledger::Block;

/// Mining errors surfaced to the request path
#[derive(Debug, Error)]
pub enum MiningError {
    #[error("mining timed out")]
    Timeout,
    #[error("mining was interrupted")]
    Interrupted,
}

/// Mining outcome
#[derive(Debug)]
pub enum MiningResult {
    /// Found a satisfying nonce
    Success(Block),
    /// The stop signal was raised before a nonce was found
    Interrupted,
}

/// Single proof-of-work search with a stop signal
#[derive(Clone)]
pub struct Miner {
    stop_signal: Arc<AtomicBool>,
}

impl Miner {
    pub fn new() -> Self {
        Self {
            stop_signal: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Raise the stop signal; the running search returns `Interrupted`
    pub fn stop(&self) {
        self.stop_signal.store(true, Ordering::SeqCst);
    }

    /// Find a nonce whose hash meets the difficulty predicate.
    ///
    /// Starts at the candidate's nonce (0 for fresh candidates) and
    /// increments by 1, so the search is fully reproducible. Blocks the
    /// calling thread until success or interruption.
    pub fn mine_block(&self, mut block: Block, difficulty: usize) -> MiningResult {
        loop {
            if self.stop_signal.load(Ordering::SeqCst) {
                return MiningResult::Interrupted;
            }

            block.hash = block.compute_hash();
            if block.hash.meets_difficulty(difficulty) {
                return MiningResult::Success(block);
            }

            block.nonce = block.nonce.wrapping_add(1);
        }
    }
}

impl Default for Miner {
    fn default() -> Self {
        Self::new()
    }
}

/// Bounded pool of blocking mining workers.
///
/// Each job runs on the blocking thread pool behind a semaphore permit and
/// is cancelled when the timeout elapses or the awaiting request goes away.
pub struct MinerPool {
    permits: Arc<Semaphore>,
    timeout: Duration,
}

impl MinerPool {
    pub fn new(workers: usize, timeout: Duration) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(workers.max(1))),
            timeout,
        }
    }

    /// Mine a candidate block, waiting for a free worker if necessary.
    pub async fn mine(&self, block: Block, difficulty: usize) -> Result<Block, MiningError> {
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| MiningError::Interrupted)?;

        let miner = Miner::new();
        // Stops the worker if this future is dropped mid-search, e.g. when
        // the client disconnects.
        let _guard = StopGuard(miner.clone());

        let handle = tokio::task::spawn_blocking(move || {
            let result = miner.mine_block(block, difficulty);
            drop(permit);
            result
        });

        match tokio::time::timeout(self.timeout, handle).await {
            Ok(Ok(MiningResult::Success(block))) => {
                debug!(index = block.index, nonce = block.nonce, "proof of work found");
                Ok(block)
            }
            Ok(Ok(MiningResult::Interrupted)) => Err(MiningError::Interrupted),
            Ok(Err(_)) => Err(MiningError::Interrupted),
            Err(_) => Err(MiningError::Timeout),
        }
    }
}

struct StopGuard(Miner);

impl Drop for StopGuard {
    fn drop(&mut self) {
        self.0.stop();
    }
}
