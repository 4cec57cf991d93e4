//! Builds the reverse-edge graph: for every forward edge `x -> y` in the
//! reordered graph, tries to insert `x` into `y`'s reverse row, unless `y`
//! already points back at `x` (which would duplicate an edge already present
//! once the two graphs are merged).
//!
//! Insertion position is claimed with a single atomic fetch-and-add per
//! target node, so two threads processing edges that land on the same `y`
//! never race for the same slot. A claimed position past the row's capacity
//! is simply dropped — `counts[y]` still reflects the true number of
//! candidates that wanted a slot, which [`crate::merge`] uses to decide how
//! much of the budget to give to reverse edges.
//!
//! Rows start out filled with [`crate::graph::EMPTY`], so slots no insertion
//! ever claims are already `-1`; there is no separate fill pass needed after
//! all insertions land.

use std::sync::atomic::{AtomicU32, Ordering};

use crate::builder::GraphInfo;
use crate::graph::FixedDegreeGraph;
use crate::parallel::for_each_node;
use crate::{Error, SharedMut};

pub(crate) fn run(
    reordered: &FixedDegreeGraph,
    info: GraphInfo,
) -> Result<(FixedDegreeGraph, Vec<u32>), Error> {
    let n = info.n;
    let r = info.r as usize;

    let mut reversed = FixedDegreeGraph::new(n, info.r)?;
    let dst_ptr = SharedMut::new(reversed.as_mut_ptr());

    let counts: Vec<AtomicU32> = (0..n).map(|_| AtomicU32::new(0)).collect();

    for_each_node(n, |x| {
        for &y in reordered.row(x) {
            if y < 0 {
                continue;
            }
            if reordered.row(y).contains(&x) {
                continue;
            }

            let pos = counts[y as usize].fetch_add(1, Ordering::AcqRel) as usize;
            if pos < r {
                let dst_row =
                    unsafe { std::slice::from_raw_parts_mut(dst_ptr.add(y as usize * r), r) };
                dst_row[pos] = x;
            }
        }
    });

    let counts = counts.into_iter().map(AtomicU32::into_inner).collect();
    Ok((reversed, counts))
}
