//! Worker-count resolution and per-call thread pools
//
// Each parallel entry point runs inside its own rayon pool so that a caller's
// worker count never leaks into (or depends on) the global pool.

use std::env;
use std::sync::OnceLock;

use log::debug;
use rayon::{ThreadPool, ThreadPoolBuilder};
use voxcorr_core::FieldError;

const THREAD_ENV: &str = "VOXCORR_NUM_THREADS";

static THREAD_OVERRIDE: OnceLock<Option<usize>> = OnceLock::new();

/// `VOXCORR_NUM_THREADS`, read once. Zero, empty or unparsable values are ignored.
pub fn thread_override() -> Option<usize> {
    *THREAD_OVERRIDE.get_or_init(|| {
        env::var(THREAD_ENV)
            .ok()
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .filter(|&n| n > 0)
    })
}

/// Explicit request, then the environment, then rayon's platform default.
#[must_use]
pub fn resolve_workers(requested: Option<usize>) -> usize {
    requested
        .filter(|&n| n > 0)
        .or_else(thread_override)
        .unwrap_or_else(rayon::current_num_threads)
}

/// Build a dedicated pool with `workers` threads.
///
/// # Errors
/// `ThreadPool` if the OS refuses to spawn the workers.
pub fn build_pool(workers: usize) -> Result<ThreadPool, FieldError> {
    ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("voxcorr-{i}"))
        .build()
        .map_err(|e| FieldError::ThreadPool(e.to_string()))
}

/// Run `op` on a pool sized by [`resolve_workers`].
///
/// # Errors
/// Propagates pool construction failures; `op` itself is infallible.
pub fn install<R, F>(workers: Option<usize>, op: F) -> Result<R, FieldError>
where
    R: Send,
    F: FnOnce() -> R + Send,
{
    let n = resolve_workers(workers);
    debug!("running on {n} worker thread(s)");
    let pool = build_pool(n)?;
    Ok(pool.install(op))
}
