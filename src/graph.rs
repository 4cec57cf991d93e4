//! The fixed-degree graph: a flat, row-major `N x K` array of `i32` node ids
//! with `-1` marking an unfilled slot.
//!
//! This is the single data structure all three build stages read and write.
//! Every stage allocates a fresh graph, has its workers fill disjoint rows in
//! parallel (see [`crate::parallel`]), and hands the finished graph to the
//! next stage.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use byte_slice_cast::{AsByteSlice, AsSliceOf};
use memmap2::MmapOptions;

use crate::mem::AlignedBuffer;
use crate::Error;

/// Sentinel marking an unfilled neighbor slot.
pub const EMPTY: i32 = -1;

/// A flat `N x K` row-major array of node ids, 64-byte aligned.
///
/// `eps` carries CAGRA entry points through to the NSG save format; the
/// build stages never read or write it.
pub struct FixedDegreeGraph {
    n: i32,
    k: i32,
    data: AlignedBuffer,
    eps: Vec<i32>,
}

impl FixedDegreeGraph {
    /// Allocates a graph with `n` rows of `k` slots each, every slot set to
    /// [`EMPTY`].
    pub fn new(n: i32, k: i32) -> Result<Self, Error> {
        if n < 0 || k < 0 {
            return Err(Error::PreconditionError {
                detail: format!("node count and degree must be non-negative, got n={n}, k={k}"),
            });
        }
        let len = n as usize * k as usize;
        let data = AlignedBuffer::new(len, EMPTY)?;
        Ok(Self {
            n,
            k,
            data,
            eps: Vec::new(),
        })
    }

    pub fn node_count(&self) -> i32 {
        self.n
    }

    pub fn degree(&self) -> i32 {
        self.k
    }

    pub fn eps(&self) -> &[i32] {
        &self.eps
    }

    pub fn set_eps(&mut self, eps: Vec<i32>) {
        self.eps = eps;
    }

    pub fn row(&self, u: i32) -> &[i32] {
        let start = u as usize * self.k as usize;
        &self.data.as_slice()[start..start + self.k as usize]
    }

    pub fn row_mut(&mut self, u: i32) -> &mut [i32] {
        let k = self.k as usize;
        let start = u as usize * k;
        &mut self.data.as_mut_slice()[start..start + k]
    }

    pub fn at(&self, u: i32, j: i32) -> i32 {
        self.row(u)[j as usize]
    }

    /// Raw pointer to the start of the backing allocation, for wrapping in a
    /// [`crate::SharedMut`] before handing it to concurrent workers that each
    /// own disjoint rows.
    pub(crate) fn as_mut_ptr(&mut self) -> *mut i32 {
        self.data.as_mut_ptr()
    }

    /// Best-effort cache prefetch of `lines` cache lines starting at row
    /// `u`'s address. Purely a performance hint — never panics, never
    /// affects the result of a build.
    pub fn prefetch(&self, u: i32, lines: usize) {
        #[cfg(target_arch = "x86_64")]
        {
            use std::arch::x86_64::{_mm_prefetch, _MM_HINT_T0};

            let row = self.row(u);
            let max_bytes = row.len() * std::mem::size_of::<i32>();
            let bytes = (lines * 64).min(max_bytes);
            let base = row.as_ptr() as *const i8;
            let mut offset = 0;
            while offset < bytes {
                unsafe { _mm_prefetch(base.add(offset), _MM_HINT_T0) };
                offset += 64;
            }
        }
        #[cfg(not(target_arch = "x86_64"))]
        {
            let _ = (u, lines);
        }
    }

    /// Loads a graph from the "efanna"-style KNNG format: each row is stored
    /// as the row's width `k` (repeated once per row) followed by `k` node
    /// ids. The node count is inferred from the file size.
    pub fn load_knng<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let file = File::open(path)?;
        let mmap = unsafe { MmapOptions::new().populate().map(&file)? };
        let words = mmap.as_slice_of::<i32>().map_err(|e| Error::FormatError {
            detail: format!("KNNG file is not a whole number of i32 words: {e}"),
        })?;

        if words.is_empty() {
            return Err(Error::FormatError {
                detail: "KNNG file is empty".into(),
            });
        }

        let k = words[0];
        if k <= 0 {
            return Err(Error::FormatError {
                detail: format!("KNNG record width must be positive, got {k}"),
            });
        }

        let record_len = k as usize + 1;
        if words.len() % record_len != 0 {
            return Err(Error::FormatError {
                detail: format!(
                    "KNNG file word count {} is not a multiple of the record length {}",
                    words.len(),
                    record_len
                ),
            });
        }
        let n = (words.len() / record_len) as i32;

        let mut graph = FixedDegreeGraph::new(n, k)?;
        for row_idx in 0..n as usize {
            let record = &words[row_idx * record_len..(row_idx + 1) * record_len];
            graph.row_mut(row_idx as i32).copy_from_slice(&record[1..]);
        }
        Ok(graph)
    }

    /// Loads a graph from the "fbin" format: an `(n, k)` header followed by
    /// the `n * k` id payload, with no per-row repetition of `k`.
    pub fn load_knng_fbin<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let file = File::open(path)?;
        let mmap = unsafe { MmapOptions::new().populate().map(&file)? };
        let words = mmap.as_slice_of::<i32>().map_err(|e| Error::FormatError {
            detail: format!("fbin file is not a whole number of i32 words: {e}"),
        })?;

        if words.len() < 2 {
            return Err(Error::FormatError {
                detail: "fbin file is too short to contain a header".into(),
            });
        }
        let (n, k) = (words[0], words[1]);
        if n < 0 || k <= 0 {
            return Err(Error::FormatError {
                detail: format!("fbin header has invalid n={n}, k={k}"),
            });
        }

        let payload = &words[2..];
        let expected = n as usize * k as usize;
        if payload.len() != expected {
            return Err(Error::FormatError {
                detail: format!(
                    "fbin payload has {} words, expected n*k = {}",
                    payload.len(),
                    expected
                ),
            });
        }

        let mut graph = FixedDegreeGraph::new(n, k)?;
        graph.data.as_mut_slice().copy_from_slice(payload);
        Ok(graph)
    }

    /// Writes the graph in the same "efanna"-style KNNG format [`Self::load_knng`]
    /// reads: per row, the row's width repeated, then the row's ids verbatim
    /// (including any trailing `-1`s).
    pub fn save_knng<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        let k = [self.k];
        for u in 0..self.n {
            writer.write_all(k.as_byte_slice())?;
            writer.write_all(self.row(u).as_byte_slice())?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Writes the graph in NSG format: a `(k, ep)` header, where `ep` is the
    /// single entry point required by the format (the first of `eps`, or `0`
    /// if none were set), followed by per-node `(edge_num, ids[..edge_num])`
    /// records. `edge_num` is always `K`, per row width, regardless of
    /// sentinel content.
    pub fn save_nsg<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        let ep = self.eps.first().copied().unwrap_or(0);
        let header = [self.k, ep];
        writer.write_all(header.as_byte_slice())?;

        for u in 0..self.n {
            writer.write_all([self.k].as_byte_slice())?;
            writer.write_all(self.row(u).as_byte_slice())?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl std::fmt::Debug for FixedDegreeGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixedDegreeGraph")
            .field("n", &self.n)
            .field("k", &self.k)
            .field("eps", &self.eps)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn new_graph_is_all_sentinel() {
        let graph = FixedDegreeGraph::new(4, 3).unwrap();
        for u in 0..4 {
            assert_eq!(graph.row(u), &[EMPTY, EMPTY, EMPTY]);
        }
    }

    #[test]
    fn row_mut_writes_are_visible_through_row() {
        let mut graph = FixedDegreeGraph::new(2, 2).unwrap();
        graph.row_mut(1).copy_from_slice(&[5, 6]);
        assert_eq!(graph.row(1), &[5, 6]);
        assert_eq!(graph.row(0), &[EMPTY, EMPTY]);
    }

    #[test]
    fn knng_round_trips() {
        let mut graph = FixedDegreeGraph::new(3, 2).unwrap();
        graph.row_mut(0).copy_from_slice(&[1, 2]);
        graph.row_mut(1).copy_from_slice(&[0, EMPTY]);
        graph.row_mut(2).copy_from_slice(&[0, 1]);

        let file = NamedTempFile::new().unwrap();
        graph.save_knng(file.path()).unwrap();
        let loaded = FixedDegreeGraph::load_knng(file.path()).unwrap();

        assert_eq!(loaded.node_count(), 3);
        assert_eq!(loaded.degree(), 2);
        for u in 0..3 {
            assert_eq!(loaded.row(u), graph.row(u));
        }
    }

    #[test]
    fn fbin_round_trips() {
        let mut graph = FixedDegreeGraph::new(3, 2).unwrap();
        graph.row_mut(0).copy_from_slice(&[1, 2]);
        graph.row_mut(1).copy_from_slice(&[0, 2]);
        graph.row_mut(2).copy_from_slice(&[0, 1]);

        let file = NamedTempFile::new().unwrap();
        {
            let mut writer = BufWriter::new(File::create(file.path()).unwrap());
            let header = [graph.node_count(), graph.degree()];
            writer.write_all(header.as_byte_slice()).unwrap();
            for u in 0..graph.node_count() {
                writer.write_all(graph.row(u).as_byte_slice()).unwrap();
            }
        }

        let loaded = FixedDegreeGraph::load_knng_fbin(file.path()).unwrap();
        assert_eq!(loaded.node_count(), 3);
        assert_eq!(loaded.degree(), 2);
        for u in 0..3 {
            assert_eq!(loaded.row(u), graph.row(u));
        }
    }

    #[test]
    fn nsg_save_writes_edge_num_equal_to_k_regardless_of_sentinels() {
        let mut graph = FixedDegreeGraph::new(1, 3).unwrap();
        graph.row_mut(0).copy_from_slice(&[7, 8, EMPTY]);
        graph.set_eps(vec![0]);

        let file = NamedTempFile::new().unwrap();
        graph.save_nsg(file.path()).unwrap();

        let bytes = std::fs::read(file.path()).unwrap();
        let words = bytes.as_slice().as_slice_of::<i32>().unwrap();
        // header: k, ep
        assert_eq!(&words[0..2], &[3, 0]);
        // record: edge_num (= k, always), ids[..k]
        assert_eq!(&words[2..], &[3, 7, 8, EMPTY]);
    }
}
