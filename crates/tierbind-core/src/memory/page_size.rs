use lazy_static::lazy_static;

lazy_static! {
    static ref PAGE_SIZE: usize = {
        let raw = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
        if raw > 0 { raw as usize } else { 4096 }
    };
}

/// Returns the system memory page size in bytes.
///
/// Resolved from `sysconf(_SC_PAGESIZE)` on first use and cached for the
/// process lifetime. Falls back to 4096 if the query fails or returns a
/// non-positive value, so a usable value is always returned.
pub fn page_size() -> usize {
    *PAGE_SIZE
}
