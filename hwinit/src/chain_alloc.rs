//! Chained allocation for chainload buffers.
//!
//! Images handed to the next stage can be large. The pool allocator is tried
//! first; when it is exhausted and the firmware offers page allocation (EFI
//! only) the request falls through to whole pages.
//!
//! ```text
//!   alloc_chain(size)
//!        │
//!        ├─► PoolAllocator::allocate(size)          ok ─► ptr
//!        │         │ exhausted
//!        │         ▼
//!        └─► PageAllocator::allocate_any_pages(⌈size / 4K⌉)   (EFI only)
//! ```

use core::alloc::Layout;
use core::fmt;
use core::ptr::NonNull;

use linked_list_allocator::Heap;

use crate::memory::PAGE_SIZE;

/// Alignment of pool allocations.
pub const POOL_ALIGN: usize = 16;

/// Allocation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocError {
    /// Neither the pool nor the firmware could satisfy the request
    OutOfMemory,
    /// Zero-byte request
    ZeroSize,
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocError::OutOfMemory => f.write_str("out of memory"),
            AllocError::ZeroSize => f.write_str("zero-sized allocation"),
        }
    }
}

/// Byte-granular primary allocator.
pub trait PoolAllocator {
    fn allocate(&mut self, size: usize) -> Option<NonNull<u8>>;
}

/// Firmware page allocator (`AllocatePages`, AllocateAnyPages).
pub trait PageAllocator {
    fn allocate_any_pages(&mut self, pages: usize) -> Option<NonNull<u8>>;
}

impl PoolAllocator for Heap {
    fn allocate(&mut self, size: usize) -> Option<NonNull<u8>> {
        let layout = Layout::from_size_align(size, POOL_ALIGN).ok()?;
        self.allocate_first_fit(layout).ok()
    }
}

/// Pages needed to hold `bytes`.
#[inline]
pub const fn bytes_to_pages(bytes: usize) -> usize {
    bytes.div_ceil(PAGE_SIZE as usize)
}

/// Allocate `size` bytes from `pool`, falling back to firmware pages.
///
/// Pass `pages` only when running under EFI-class firmware.
pub fn alloc_chain<P>(
    pool: &mut P,
    pages: Option<&mut dyn PageAllocator>,
    size: usize,
) -> Result<NonNull<u8>, AllocError>
where
    P: PoolAllocator + ?Sized,
{
    if size == 0 {
        return Err(AllocError::ZeroSize);
    }

    if let Some(ptr) = pool.allocate(size) {
        return Ok(ptr);
    }

    let Some(pages) = pages else {
        log::warn!("alloc_chain: pool exhausted for {} bytes", size);
        return Err(AllocError::OutOfMemory);
    };

    let count = bytes_to_pages(size);
    vtoy_core::vtoy_dbg!("alloc_chain: pool exhausted, {} pages from firmware", count);
    pages
        .allocate_any_pages(count)
        .ok_or(AllocError::OutOfMemory)
}
