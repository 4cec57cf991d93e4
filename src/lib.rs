//! Offline builder for a CAGRA-family proximity graph.
//!
//! Given a precomputed k-nearest-neighbor graph (KNNG), [`Builder::build`]
//! produces a fixed out-degree, directed, navigable graph through three
//! sequential, internally-parallel stages:
//!
//! 1. [`reorder`] ranks each node's candidate neighbors by detour redundancy
//!    and keeps the least redundant `R` of them.
//! 2. [`reverse`] builds a deduplicated reverse-edge graph from the reordered
//!    forward graph via lock-free atomic bucket insertion.
//! 3. [`merge`] packs a budget-balanced mix of forward and reverse edges into
//!    the final graph.
//!
//! The graph itself is represented as a flat, row-major `N x K` array of node
//! ids (see [`graph::FixedDegreeGraph`]), the same representation CAGRA's
//! downstream search expects on disk.
//!
//! This crate only builds the graph; it does not construct the input KNNG,
//! compute distances, or perform online mutation, incremental updates or
//! distributed builds. It also does not perform downstream ANN search — the
//! graph's `eps` (entry points) are carried through only as inert data.

pub mod builder;
pub mod config;
pub mod graph;
mod mem;
mod merge;
mod parallel;
mod reorder;
mod reverse;

pub use crate::builder::{Builder, GraphInfo};
pub use crate::config::{BuildConfig, KnngFormat};
pub use crate::graph::FixedDegreeGraph;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("precondition violated: {detail}")]
    PreconditionError { detail: String },

    #[error("I/O error")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    #[error("format error: {detail}")]
    FormatError { detail: String },

    #[error("allocation error: {detail}")]
    AllocError { detail: String },
}

/// A raw-pointer wrapper that allows disjoint rows of a single allocation to
/// be written from multiple threads at once.
///
/// Every stage in this crate allocates its output graph up front and then
/// has each worker write only the rows it owns; no two workers ever touch the
/// same row, so the data race the compiler would otherwise worry about never
/// happens in practice.
#[repr(transparent)]
pub(crate) struct SharedMut<T>(*mut T);

unsafe impl<T: Send> Send for SharedMut<T> {}
unsafe impl<T: Sync> Sync for SharedMut<T> {}

impl<T> SharedMut<T> {
    pub(crate) fn new(ptr: *mut T) -> Self {
        SharedMut(ptr)
    }

    /// # Safety
    ///
    /// `count` must stay within the bounds of the allocation `ptr` points to.
    pub(crate) unsafe fn add(&self, count: usize) -> *mut T {
        self.0.add(count)
    }
}
