//! Dynamic-chunk node iteration shared by all three build stages.
//!
//! Mirrors the atomic-next-chunk / `rayon::scope` pattern used by
//! `graph_builder`'s sibling `algos` crate in `page_rank.rs` and
//! `triangle_count.rs`: rather than handing `rayon` a `par_iter` and letting
//! it split work statically, each worker repeatedly claims the next block of
//! node ids from a shared atomic counter. This reproduces the original
//! OpenMP `schedule(dynamic, 100)` behavior, which matters here because the
//! per-node cost in every stage is data-dependent (detour counts, reverse
//! bucket contention), so static splitting would leave some workers idle
//! while others are still grinding through a skewed chunk.

use std::sync::atomic::{AtomicI32, Ordering};

const CHUNK_SIZE: i32 = 100;

/// Runs `f` once per node in `0..n`, spread dynamically across the rayon
/// thread pool in chunks of [`CHUNK_SIZE`] nodes.
pub(crate) fn for_each_node<F>(n: i32, f: F)
where
    F: Fn(i32) + Sync,
{
    for_each_node_with_state(n, || (), |_, u| f(u));
}

/// Like [`for_each_node`], but `init` is called once per worker to create a
/// piece of scratch state that is reused across every node that worker
/// processes, rather than being reallocated on every call to `f`.
pub(crate) fn for_each_node_with_state<T, Init, F>(n: i32, init: Init, f: F)
where
    Init: Fn() -> T + Sync,
    F: Fn(&mut T, i32) + Sync,
{
    if n <= 0 {
        return;
    }

    let next_chunk = AtomicI32::new(0);

    rayon::scope(|scope| {
        for _ in 0..rayon::current_num_threads() {
            scope.spawn(|_| {
                let mut state = init();
                loop {
                    let start = next_chunk.fetch_add(CHUNK_SIZE, Ordering::AcqRel);
                    if start >= n {
                        break;
                    }
                    let end = (start + CHUNK_SIZE).min(n);
                    for u in start..end {
                        f(&mut state, u);
                    }
                }
            });
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn visits_every_node_exactly_once() {
        let n = 1_000;
        let seen: Vec<AtomicUsize> = (0..n).map(|_| AtomicUsize::new(0)).collect();
        for_each_node(n as i32, |u| {
            seen[u as usize].fetch_add(1, Ordering::Relaxed);
        });
        assert!(seen.iter().all(|c| c.load(Ordering::Relaxed) == 1));
    }

    #[test]
    fn empty_range_is_a_no_op() {
        for_each_node(0, |_| panic!("should never be called"));
    }
}
