//! # Tierbind Core
//!
//! `tierbind-core` implements page-granularity tiered-memory placement for
//! heterogeneous NUMA systems, such as local DRAM combined with a slower
//! CXL-attached tier exposed as an additional NUMA node. A caller reserves a
//! contiguous anonymous region and decides, per page, whether that page is
//! physically backed by the local tier or by an explicitly named remote node.
//!
//! ## Main Components
//!
//! - [`TieredAllocator`] - Reserves a region, disables transparent hugepages
//!   on it, applies a per-page [`PlacementMap`], and optionally prefaults
//!   every page so binding errors surface at allocation time.
//!
//! - [`memory`] module - Low-level building blocks: the process-wide cached
//!   page size, the fixed-capacity [`memory::NodeMask`], the raw mempolicy
//!   syscall layer, the [`memory::Region`] handle, and the batched
//!   [`memory::NodeResidency`] query.
//!
//! - [`placement`] module - The [`Tier`] tags, the [`PlacementMap`], and the
//!   run-length encoding that turns a per-page map into a minimal number of
//!   binding calls.
//!
//! ## Platform Support
//!
//! Linux only. Node binding and residency queries go through the `mbind`,
//! `get_mempolicy`, and `move_pages` syscalls; on kernels or filesystems
//! without mempolicy support these operations fail with
//! [`Error::PolicyRejected`] or [`Error::QueryFailed`] instead of degrading.

#![warn(missing_docs)]

pub mod alloc;
mod error;
pub mod memory;
pub mod placement;
pub mod util;

pub use crate::alloc::TieredAllocator;
pub use crate::error::{Error, Result};
pub use crate::placement::{PlacementMap, Tier};
