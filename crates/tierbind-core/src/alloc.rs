//! Tiered region allocation.
//!
//! [`TieredAllocator`] is the main entry point: it reserves an anonymous
//! region, applies a per-page [`PlacementMap`], and hands out a [`Region`]
//! handle. Allocation is all-or-nothing: on any failure the just-reserved
//! region is released before the error propagates, so a caller never sees a
//! partially bound region.

use std::ptr::null_mut;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{debug, info, warn};

use crate::error::{Error, Result};
use crate::memory::{Region, local_node, page_size};
use crate::placement::{self, PlacementMap};
use crate::util::round_to_pages;

/// Allocator for regions whose pages are split between a local and a remote
/// memory tier.
///
/// The local node is auto-detected per allocation from the calling thread's
/// memory policy; the remote node is named explicitly by the caller on every
/// call.
///
/// # Examples
///
/// ```no_run
/// use tierbind_core::{PlacementMap, Tier, TieredAllocator};
///
/// let allocator = TieredAllocator::new().prefault(true);
/// let tiers = [Tier::Local, Tier::Remote];
/// let region = allocator
///     .alloc(2 * 4096, PlacementMap::new(&tiers), 1)?
///     .expect("non-zero size");
/// // ... use the region ...
/// region.dealloc();
/// # Ok::<(), tierbind_core::Error>(())
/// ```
#[derive(Default)]
pub struct TieredAllocator {
    prefault: bool,
    progress: Option<MultiProgress>,
}

impl TieredAllocator {
    /// Constructor; prefaulting is off by default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forces immediate physical backing of every page before `alloc`
    /// returns.
    ///
    /// Trades an up-front cost proportional to the region size for the
    /// guarantee that binding errors surface at allocation time rather than
    /// on the consumer's first access.
    pub fn prefault(mut self, prefault: bool) -> Self {
        self.prefault = prefault;
        self
    }

    /// Reports prefault progress on the given [`MultiProgress`].
    pub fn progress(mut self, progress: MultiProgress) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Reserves `size` bytes rounded up to whole pages and places every page
    /// on the tier named by `map`.
    ///
    /// Returns `Ok(None)` for `size == 0` without any side effect. The map
    /// must cover at least the rounded page count; extra entries are ignored.
    ///
    /// # Errors
    ///
    /// * [`Error::UndersizedPlacement`] - map shorter than the region's page
    ///   count; nothing is bound.
    /// * [`Error::NodeOutOfRange`] - `remote_node` (or the detected local
    ///   node) exceeds the mask capacity.
    /// * [`Error::ReservationFailed`] - the anonymous mapping could not be
    ///   reserved.
    /// * [`Error::PolicyRejected`] - the kernel refused a binding.
    ///
    /// On every error path the region is released in full; repeated failing
    /// calls do not leak mappings.
    pub fn alloc(
        &self,
        size: usize,
        map: PlacementMap<'_>,
        remote_node: usize,
    ) -> Result<Option<Region>> {
        if size == 0 {
            return Ok(None);
        }
        let mapped_len = round_to_pages(size);
        let base = unsafe {
            libc::mmap(
                null_mut(),
                mapped_len,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
                -1,
                0,
            )
        };
        if base == libc::MAP_FAILED {
            return Err(Error::ReservationFailed(std::io::Error::last_os_error()));
        }
        // Transparent hugepages would merge several logical pages into one
        // physical unit and defeat per-page tier placement.
        if unsafe { libc::madvise(base, mapped_len, libc::MADV_NOHUGEPAGE) } != 0 {
            warn!(
                "madvise(MADV_NOHUGEPAGE) failed: {}",
                std::io::Error::last_os_error()
            );
        }
        let base = base as *mut u8;

        let local = local_node();
        debug!(
            "placing {} pages, local node {}, remote node {}",
            mapped_len / page_size(),
            local,
            remote_node
        );
        if let Err(e) = placement::apply(base, mapped_len, map, local, remote_node) {
            unsafe { libc::munmap(base as *mut libc::c_void, mapped_len) };
            return Err(e);
        }

        if self.prefault {
            self.prefault_pages(base, mapped_len);
        }
        info!("allocated {} bytes at 0x{:x}", mapped_len, base as usize);
        Ok(Some(Region::new(base, size)))
    }

    /// Touches one byte per page (read-modify-write of the same value) so the
    /// kernel resolves every page fault, and with it the node binding, before
    /// the region is handed out.
    fn prefault_pages(&self, base: *mut u8, mapped_len: usize) {
        let bar = self.progress.as_ref().map(|progress| {
            let style = ProgressStyle::with_template(
                "prefault {wide_bar:40.cyan/blue} {pos:>6}/{len:<6} pages",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar());
            progress.add(ProgressBar::new((mapped_len / page_size()) as u64).with_style(style))
        });
        for offset in (0..mapped_len).step_by(page_size()) {
            unsafe {
                let page = base.add(offset);
                let value = std::ptr::read_volatile(page);
                std::ptr::write_volatile(page, value);
            }
            if let Some(bar) = &bar {
                bar.inc(1);
            }
        }
        if let Some(bar) = bar {
            bar.finish_and_clear();
        }
    }
}
