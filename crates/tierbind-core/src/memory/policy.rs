//! Raw mempolicy syscall layer.
//!
//! glibc does not wrap `mbind` or `get_mempolicy` (they live in libnuma), so
//! both are issued through `libc::syscall` directly.

use std::ptr::null;

use libc::{c_int, c_ulong, c_void};
use log::{debug, trace};

use super::node_mask::{MAX_NODES, NodeMask};
use crate::error::{Error, Result};

// Policy modes from <linux/mempolicy.h>.
const MPOL_PREFERRED: c_int = 1;
const MPOL_BIND: c_int = 2;

/// Best-effort detection of the calling thread's local NUMA node.
///
/// Reads the thread's current default memory policy. If the mode is
/// `MPOL_PREFERRED`, the preferred node is returned; for every other mode
/// (or if the query fails) node 0 is assumed. This reflects only the memory
/// policy state, not CPU affinity or hardware topology.
pub fn local_node() -> usize {
    let mut mode: c_int = 0;
    let mut mask = NodeMask::empty();
    let rc = unsafe {
        libc::syscall(
            libc::SYS_get_mempolicy,
            &mut mode as *mut c_int,
            mask.as_mut_ptr(),
            MAX_NODES as c_ulong,
            null::<c_void>(),
            0 as c_ulong,
        )
    };
    if rc == 0 && mode == MPOL_PREFERRED {
        if let Some(node) = mask.first_set() {
            return node;
        }
    }
    debug!("thread policy is not preferred-node, assuming local node 0");
    0
}

/// Strictly binds an address range to a single NUMA node.
///
/// The range must start page-aligned and span whole pages. No move flags are
/// passed: the range is expected to be freshly reserved and unpopulated, so
/// there are no existing pages to migrate.
///
/// # Errors
///
/// Returns [`Error::NodeOutOfRange`] for node ids the mask cannot address and
/// [`Error::PolicyRejected`] if the kernel refuses the binding (unknown node,
/// node without admissible memory, missing mempolicy support).
pub fn bind_to_node(addr: *mut u8, len: usize, node: usize) -> Result<()> {
    let mask = NodeMask::single(node)?;
    trace!(
        "mbind 0x{:x}..0x{:x} to node {}",
        addr as usize,
        addr as usize + len,
        node
    );
    let rc = unsafe {
        libc::syscall(
            libc::SYS_mbind,
            addr as *mut c_void,
            len as c_ulong,
            MPOL_BIND,
            mask.as_ptr(),
            MAX_NODES as c_ulong,
            0 as c_ulong,
        )
    };
    if rc != 0 {
        return Err(Error::PolicyRejected(std::io::Error::last_os_error()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{bind_to_node, local_node};
    use crate::error::Error;
    use crate::memory::MAX_NODES;

    #[test]
    fn test_local_node_never_fails() {
        let node = local_node();
        assert!(node < MAX_NODES);
    }

    #[test]
    fn test_bind_rejects_out_of_range_node() {
        // validation fires before the syscall, the bogus pointer is never used
        let err = bind_to_node(0x1000 as *mut u8, 4096, MAX_NODES).unwrap_err();
        assert!(matches!(err, Error::NodeOutOfRange { .. }));
    }
}
