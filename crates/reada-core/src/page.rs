//! Page-boundary arithmetic for sizing refills.
//!
//! Offsets are `u64` file positions; they are reduced modulo the page size
//! before narrowing to `usize`, so nothing here wraps.

/// Number of bytes to request for a refill starting at file `offset` so that
/// the read ends on a page boundary.
///
/// `capacity` must be a multiple of `page` spanning at least two pages. The
/// result always satisfies `capacity - page < n <= capacity`, so a refill
/// covers at least one full page beyond the current one.
pub fn refill_len(offset: u64, capacity: usize, page: usize) -> usize {
    debug_assert!(page > 0 && capacity >= 2 * page && capacity % page == 0);
    // `offset % page` is below `page <= capacity`, so the narrowing and the
    // subtraction cannot overflow.
    let into_page = (offset % page as u64) as usize;
    capacity - into_page
}

/// Whether `offset` sits exactly on a page boundary.
pub fn is_aligned(offset: u64, page: usize) -> bool {
    offset % page as u64 == 0
}
