use std::ptr::null;

use itertools::Itertools;
use libc::{c_int, c_ulong, c_void};
use log::{log, warn};
use serde::Serialize;

use super::page_size;
use super::region::Region;
use crate::error::{Error, Result};

/// Where the kernel reports a single page to be resident.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum PageResidency {
    /// The page is physically backed by memory on this node.
    Node(u32),
    /// Negative kernel status: the page is not resident, faulted out, or in
    /// another special state. A normal result, not a query failure.
    Status(i32),
}

impl From<i32> for PageResidency {
    fn from(status: i32) -> Self {
        if status >= 0 {
            PageResidency::Node(status as u32)
        } else {
            PageResidency::Status(status)
        }
    }
}

/// Batched per-page residency query.
///
/// Reports which physical NUMA node currently backs every page of an address
/// range, in a single `move_pages` call with no migration requested.
pub trait NodeResidency {
    /// Current residency of every page, in address order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::QueryFailed`] only if the batched query call itself
    /// fails; per-page special states are reported inside the result.
    fn page_nodes(&self) -> Result<Vec<PageResidency>>;

    /// Logs the residency of the range at the specified log level.
    fn log_residency(&self, level: log::Level) {
        match self.page_nodes() {
            Ok(pages) => log!(level, "residency: {}", pages.format_residency()),
            Err(e) => warn!("Failed to query residency: {:?}", e),
        }
    }
}

impl NodeResidency for Region {
    fn page_nodes(&self) -> Result<Vec<PageResidency>> {
        (self.ptr() as *const u8, self.mapped_len()).page_nodes()
    }
}

impl<T> NodeResidency for (*const T, usize) {
    fn page_nodes(&self) -> Result<Vec<PageResidency>> {
        let (addr, len) = *self;
        let pages = len.div_ceil(page_size());
        if pages == 0 {
            return Ok(vec![]);
        }
        let page_addrs: Vec<*const c_void> = (0..pages)
            .map(|idx| unsafe { (addr as *const u8).add(idx * page_size()) as *const c_void })
            .collect();
        let mut status = vec![-1 as c_int; pages];
        let rc = unsafe {
            libc::syscall(
                libc::SYS_move_pages,
                0 as libc::pid_t,
                pages as c_ulong,
                page_addrs.as_ptr(),
                null::<c_int>(),
                status.as_mut_ptr(),
                0 as c_int,
            )
        };
        if rc != 0 {
            return Err(Error::QueryFailed(std::io::Error::last_os_error()));
        }
        Ok(status.into_iter().map(PageResidency::from).collect())
    }
}

/// Formats per-page residency as compressed node runs.
pub trait FormatResidency {
    /// Formats residency as a human-readable string, merging equal neighbors.
    fn format_residency(&self) -> String;
}

impl FormatResidency for [PageResidency] {
    fn format_residency(&self) -> String {
        self.iter()
            .dedup_with_count()
            .map(|(count, residency)| match residency {
                PageResidency::Node(node) => format!("{}x node {}", count, node),
                PageResidency::Status(status) => format!("{}x status {}", count, status),
            })
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::{FormatResidency, PageResidency};

    #[test]
    fn test_residency_from_status() {
        assert_eq!(PageResidency::from(0), PageResidency::Node(0));
        assert_eq!(PageResidency::from(3), PageResidency::Node(3));
        // -ENOENT, the kernel's "page not present"
        assert_eq!(PageResidency::from(-2), PageResidency::Status(-2));
        assert_eq!(PageResidency::from(-14), PageResidency::Status(-14));
    }

    #[test]
    fn test_format_residency_merges_runs() {
        let pages = [
            PageResidency::Node(0),
            PageResidency::Node(0),
            PageResidency::Node(1),
            PageResidency::Status(-2),
        ];
        assert_eq!(
            pages.format_residency(),
            "2x node 0, 1x node 1, 1x status -2"
        );
    }

    #[test]
    fn test_format_residency_empty() {
        let pages: [PageResidency; 0] = [];
        assert_eq!(pages.format_residency(), "");
    }
}
