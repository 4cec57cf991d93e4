//! Packs each node's final row from a budget-balanced mix of its reordered
//! forward edges and its reverse edges.
//!
//! Reverse edges are only worth keeping up to how many a node actually
//! received (`counts[x]`, capped at `R`); the rest of the row's budget goes
//! to forward edges. When a node received fewer reverse edges than half its
//! budget, it gets all of them plus forward edges filling the remainder;
//! otherwise it gets exactly half reverse and half forward, so no single
//! node's row is dominated by one source.

use crate::builder::GraphInfo;
use crate::graph::FixedDegreeGraph;
use crate::parallel::for_each_node;
use crate::{Error, SharedMut};

pub(crate) fn run(
    reordered: &FixedDegreeGraph,
    reversed: &FixedDegreeGraph,
    counts: &[u32],
    info: GraphInfo,
) -> Result<FixedDegreeGraph, Error> {
    let n = info.n;
    let r = info.r as usize;

    let mut merged = FixedDegreeGraph::new(n, info.r)?;
    let dst_ptr = SharedMut::new(merged.as_mut_ptr());

    for_each_node(n, |x| {
        let r_size = (counts[x as usize] as usize).min(r);
        let s_size = r;

        let (reverse_take, forward_take) = if r_size < s_size / 2 {
            (r_size, s_size - r_size)
        } else {
            let reverse_take = s_size / 2;
            (reverse_take, s_size - reverse_take)
        };

        let dst_row = unsafe { std::slice::from_raw_parts_mut(dst_ptr.add(x as usize * r), r) };
        dst_row[..forward_take].copy_from_slice(&reordered.row(x)[..forward_take]);
        dst_row[forward_take..forward_take + reverse_take]
            .copy_from_slice(&reversed.row(x)[..reverse_take]);
    });

    Ok(merged)
}
