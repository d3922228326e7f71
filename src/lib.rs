//! # Tierbind
//!
//! Tierbind places anonymous memory page by page across the tiers of a
//! heterogeneous NUMA system: local DRAM on one side, a slower explicitly
//! named node (e.g. CXL-attached memory) on the other. A per-page placement
//! map decides, for every page of a region, which tier physically backs it,
//! and a batched residency query reports afterwards which node actually
//! backs each page.
//!
//! ## Quickstart
//!
//! ```no_run
//! use tierbind::memory::NodeResidency;
//! use tierbind::{PlacementMap, Tier, TieredAllocator};
//!
//! // one local page, one page on remote node 1, faulted in immediately
//! let tiers = [Tier::Local, Tier::Remote];
//! let region = TieredAllocator::new()
//!     .prefault(true)
//!     .alloc(2 * 4096, PlacementMap::new(&tiers), 1)?
//!     .expect("non-zero size");
//! println!("{:?}", region.page_nodes()?);
//! region.dealloc();
//! # Ok::<(), tierbind::Error>(())
//! ```
//!
//! ## Crates
//!
//! - `tierbind-core`: the allocation, placement, and query logic, re-exported
//!   here.
//! - `tierbind-bin`: the `eval_placement` driver binary.
//!
//! ## Platform Support
//!
//! Linux only; requires kernel mempolicy support (`mbind`, `get_mempolicy`,
//! `move_pages`). Without it, binding and query operations fail with
//! [`Error::PolicyRejected`] / [`Error::QueryFailed`] instead of degrading.

pub use tierbind_core::{Error, PlacementMap, Result, Tier, TieredAllocator};

pub use tierbind_core::alloc;
pub use tierbind_core::memory;
pub use tierbind_core::placement;
pub use tierbind_core::util;
