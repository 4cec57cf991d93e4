//! 64-byte-aligned heap storage for [`crate::graph::FixedDegreeGraph`] rows.
//!
//! The original CAGRA builder allocates its graphs with `posix_memalign` at a
//! 2 MiB boundary and advises the kernel to back them with huge pages. This
//! crate keeps the 64-byte alignment — one cache line, which is all that
//! correctness of the prefetch hints in [`crate::graph`] actually requires —
//! but skips the huge-page `madvise` call. That's a Linux-specific, libc-
//! mediated syscall with no precedent anywhere in this crate's dependency
//! stack, which reaches for safe wrappers (`memmap2`, `rayon`) rather than raw
//! `libc` calls everywhere else it touches the OS.

use std::alloc::{alloc, dealloc, Layout};

use crate::Error;

const ALIGNMENT: usize = 64;

/// An owned, 64-byte-aligned buffer of `i32`s.
///
/// Unlike `Vec<i32>` or `Box<[i32]>`, this type does not route through
/// `std::alloc::handle_alloc_error` on allocation failure: it checks the
/// returned pointer itself and reports failure as an [`Error::AllocError`],
/// per this crate's rule that nothing in the build path aborts the process.
pub(crate) struct AlignedBuffer {
    ptr: *mut i32,
    len: usize,
    layout: Layout,
}

unsafe impl Send for AlignedBuffer {}
unsafe impl Sync for AlignedBuffer {}

impl AlignedBuffer {
    pub(crate) fn new(len: usize, fill: i32) -> Result<Self, Error> {
        let layout = Layout::array::<i32>(len)
            .and_then(|layout| layout.align_to(ALIGNMENT))
            .map_err(|e| Error::AllocError {
                detail: format!("invalid layout for {len} i32 slots: {e}"),
            })?;

        let ptr = if layout.size() == 0 {
            std::ptr::NonNull::<i32>::dangling().as_ptr()
        } else {
            let raw = unsafe { alloc(layout) };
            if raw.is_null() {
                return Err(Error::AllocError {
                    detail: format!(
                        "failed to allocate {len} i32 slots aligned to {ALIGNMENT} bytes"
                    ),
                });
            }
            raw as *mut i32
        };

        if layout.size() != 0 {
            unsafe {
                for i in 0..len {
                    ptr.add(i).write(fill);
                }
            }
        }

        Ok(Self { ptr, len, layout })
    }

    pub(crate) fn as_slice(&self) -> &[i32] {
        unsafe { std::slice::from_raw_parts(self.ptr, self.len) }
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [i32] {
        unsafe { std::slice::from_raw_parts_mut(self.ptr, self.len) }
    }

    pub(crate) fn as_mut_ptr(&self) -> *mut i32 {
        self.ptr
    }
}

impl Drop for AlignedBuffer {
    fn drop(&mut self) {
        if self.layout.size() != 0 {
            unsafe { dealloc(self.ptr as *mut u8, self.layout) };
        }
    }
}
