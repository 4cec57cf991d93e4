//! Orchestrates the reorder → reverse → merge pipeline.

use std::time::Instant;

use crate::graph::FixedDegreeGraph;
use crate::{merge, reorder, reverse, Error};

/// Parameters shared by all three stages, validated once up front.
#[derive(Debug, Clone, Copy)]
pub struct GraphInfo {
    /// Number of nodes.
    pub n: i32,
    /// Target out-degree of the final graph.
    pub r: i32,
    /// Candidate pool width used by the reorder stage.
    pub r_init: i32,
    /// Out-degree of the input KNNG.
    pub r_knng: i32,
}

impl GraphInfo {
    fn validate(self) -> Result<Self, Error> {
        if self.n <= 0 {
            return Err(Error::PreconditionError {
                detail: format!("N must be positive, got {}", self.n),
            });
        }
        if self.r <= 0 {
            return Err(Error::PreconditionError {
                detail: format!("R must be positive, got {}", self.r),
            });
        }
        if !(self.r <= self.r_init && self.r_init <= self.r_knng) {
            return Err(Error::PreconditionError {
                detail: format!(
                    "requires R <= R_INIT <= R_KNNG, got R={}, R_INIT={}, R_KNNG={}",
                    self.r, self.r_init, self.r_knng
                ),
            });
        }
        Ok(self)
    }
}

/// Builds a fixed-degree CAGRA graph from a precomputed KNNG.
pub struct Builder {
    info: GraphInfo,
}

impl Builder {
    pub fn new(info: GraphInfo) -> Result<Self, Error> {
        Ok(Self {
            info: info.validate()?,
        })
    }

    /// Runs the reorder, reverse and merge stages in sequence, returning the
    /// final fixed-degree graph.
    ///
    /// `knng` is consumed and dropped once the reorder stage has produced its
    /// output, so its memory is freed before the reverse stage starts.
    pub fn build(&self, knng: FixedDegreeGraph) -> Result<FixedDegreeGraph, Error> {
        if knng.node_count() != self.info.n {
            return Err(Error::PreconditionError {
                detail: format!(
                    "KNNG has {} nodes, expected {}",
                    knng.node_count(),
                    self.info.n
                ),
            });
        }
        if knng.degree() != self.info.r_knng {
            return Err(Error::PreconditionError {
                detail: format!(
                    "KNNG has degree {}, expected R_KNNG={}",
                    knng.degree(),
                    self.info.r_knng
                ),
            });
        }

        let start = Instant::now();
        let reordered = reorder::run(&knng, self.info)?;
        log::info!("reorder stage finished in {:?}", start.elapsed());
        drop(knng);

        let start = Instant::now();
        let (reversed, counts) = reverse::run(&reordered, self.info)?;
        log::info!("reverse stage finished in {:?}", start.elapsed());

        let start = Instant::now();
        let merged = merge::run(&reordered, &reversed, &counts, self.info)?;
        log::info!("merge stage finished in {:?}", start.elapsed());

        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(n: i32, r: i32, r_init: i32, r_knng: i32) -> GraphInfo {
        GraphInfo {
            n,
            r,
            r_init,
            r_knng,
        }
    }

    #[test]
    fn rejects_non_positive_node_count() {
        assert!(Builder::new(info(0, 2, 4, 8)).is_err());
    }

    #[test]
    fn rejects_non_positive_degree() {
        assert!(Builder::new(info(10, 0, 4, 8)).is_err());
    }

    #[test]
    fn rejects_degree_ordering_violation() {
        assert!(Builder::new(info(10, 6, 4, 8)).is_err());
        assert!(Builder::new(info(10, 4, 10, 8)).is_err());
    }

    #[test]
    fn accepts_valid_info() {
        assert!(Builder::new(info(10, 2, 4, 8)).is_ok());
    }
}
