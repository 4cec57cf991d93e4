//! Detour-redundancy ranking: for each node, scores its `R_INIT` KNNG
//! candidates by how many "detourable" triangles they complete, then keeps
//! the `R` least redundant candidates.
//!
//! A candidate `y` at rank `i` from node `x` is made redundant by another
//! candidate `z` at rank `j` whenever `x -> y -> z` forms a shorter detour
//! than `x -> z` directly, approximated here purely from ranks: `y` is
//! penalized once for every pair `(y, z)` both present in `x`'s candidate
//! pool where `max(i, j)` is less than `z`'s own rank from `x`. Candidates
//! are then stably sorted by that penalty count, so ties keep their
//! original KNNG rank order.

use std::collections::HashMap;

use crate::builder::GraphInfo;
use crate::graph::FixedDegreeGraph;
use crate::parallel::for_each_node_with_state;
use crate::{Error, SharedMut};

const CACHE_LINE: usize = 64;

pub(crate) fn run(knng: &FixedDegreeGraph, info: GraphInfo) -> Result<FixedDegreeGraph, Error> {
    let n = info.n;
    let r = info.r as usize;
    let r_init = info.r_init as usize;
    let r_knng = info.r_knng as usize;

    let mut reordered = FixedDegreeGraph::new(n, info.r)?;
    let dst_ptr = SharedMut::new(reordered.as_mut_ptr());

    let lines = ((r_init * std::mem::size_of::<i32>()) / CACHE_LINE).max(1);

    for_each_node_with_state(
        n,
        || {
            (
                HashMap::<i32, usize>::with_capacity(r_init),
                Vec::<(u32, i32)>::with_capacity(r_init),
            )
        },
        |(rank_of, counts), x| {
            rank_of.clear();
            counts.clear();

            knng.prefetch(x, lines);
            let row_x = knng.row(x);

            for (rank, &y) in row_x.iter().take(r_init).enumerate() {
                rank_of.insert(y, rank);
                counts.push((0, y));
            }

            for (i, &y) in row_x.iter().take(r_init).enumerate() {
                let lookahead_rank = (i + 1).min(r_knng - 1);
                knng.prefetch(knng.at(x, lookahead_rank as i32), lines);

                let row_y = knng.row(y);
                for (j, &z) in row_y.iter().take(r_init).enumerate() {
                    if let Some(&dist_x_z) = rank_of.get(&z) {
                        if i.max(j) < dist_x_z {
                            counts[dist_x_z].0 += 1;
                        }
                    }
                }
            }

            counts.sort_by_key(|&(penalty, _)| penalty);

            let dst_row =
                unsafe { std::slice::from_raw_parts_mut(dst_ptr.add(x as usize * r), r) };
            for (slot, &(_, y)) in dst_row.iter_mut().zip(counts.iter()) {
                *slot = y;
            }
        },
    );

    Ok(reordered)
}
