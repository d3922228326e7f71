//! Memory-level primitives for tiered placement.
//!
//! The `memory` module provides the following abstractions:
//! - [`page_size`]: The system page size, resolved once per process.
//! - [`NodeMask`]: A fixed-capacity, validated NUMA node bitset.
//! - [`local_node`] / [`bind_to_node`]: The raw mempolicy syscall layer.
//! - [`Region`]: A handle pairing a placed mapping with its requested size,
//!   so exactly one release matches every allocation.
//! - [`NodeResidency`]: A batched "which node backs this page" query for
//!   regions and raw address ranges.

mod node_mask;
mod page_size;
mod policy;
mod region;
mod residency;

pub use self::node_mask::{MAX_NODES, NodeMask};
pub use self::page_size::page_size;
pub use self::policy::{bind_to_node, local_node};
pub use self::region::Region;
pub use self::residency::{FormatResidency, NodeResidency, PageResidency};
