use std::fs;

use tierbind::memory::{NodeResidency, PageResidency, local_node, page_size};
use tierbind::util::round_to_pages;
use tierbind::{Error, PlacementMap, Tier, TieredAllocator};

/// True if `/proc/self/maps` contains a mapping covering `addr`.
fn maps_contain(addr: usize) -> bool {
    let maps = fs::read_to_string("/proc/self/maps").expect("read /proc/self/maps");
    maps.lines().any(|line| {
        let Some(range) = line.split_whitespace().next() else {
            return false;
        };
        let Some((start, end)) = range.split_once('-') else {
            return false;
        };
        let start = usize::from_str_radix(start, 16).unwrap_or(usize::MAX);
        let end = usize::from_str_radix(end, 16).unwrap_or(0);
        start <= addr && addr < end
    })
}

#[test]
fn test_rounding_matches_mapping() -> anyhow::Result<()> {
    let allocator = TieredAllocator::new();
    let tiers = vec![Tier::Local; 5];
    for size in [1, page_size() - 1, page_size(), 4 * page_size() + 17] {
        let region = allocator
            .alloc(size, PlacementMap::new(&tiers), 0)?
            .expect("non-zero size");
        assert_eq!(region.len(), size);
        assert_eq!(region.mapped_len(), round_to_pages(size));
        assert_eq!(region.mapped_len() % page_size(), 0);
        // last byte of the rounded range is usable
        unsafe {
            let last = region.ptr().add(region.mapped_len() - 1);
            *last = 0x5A;
            assert_eq!(*last, 0x5A);
        }
        region.dealloc();
    }
    Ok(())
}

#[test]
fn test_zero_size_returns_no_region() -> anyhow::Result<()> {
    let allocator = TieredAllocator::new().prefault(true);
    assert!(allocator.alloc(0, PlacementMap::new(&[]), 1)?.is_none());
    Ok(())
}

#[test]
fn test_prefault_forces_residency() -> anyhow::Result<()> {
    let tiers = vec![Tier::Local; 4];

    // without prefault nothing is resident yet
    let lazy = TieredAllocator::new()
        .alloc(4 * page_size(), PlacementMap::new(&tiers), 0)?
        .expect("non-zero size");
    for page in lazy.page_nodes()? {
        assert!(matches!(page, PageResidency::Status(_)), "got {:?}", page);
    }
    lazy.dealloc();

    // with prefault every page reports a node
    let eager = TieredAllocator::new()
        .prefault(true)
        .alloc(4 * page_size(), PlacementMap::new(&tiers), 0)?
        .expect("non-zero size");
    let nodes = eager.page_nodes()?;
    assert_eq!(nodes.len(), 4);
    for page in nodes {
        assert!(matches!(page, PageResidency::Node(_)), "got {:?}", page);
    }
    eager.dealloc();
    Ok(())
}

#[test]
fn test_dealloc_unmaps_region() -> anyhow::Result<()> {
    let tiers = vec![Tier::Local; 2];
    let region = TieredAllocator::new()
        .prefault(true)
        .alloc(2 * page_size(), PlacementMap::new(&tiers), 0)?
        .expect("non-zero size");
    let addr = region.ptr() as usize;
    assert!(maps_contain(addr));
    region.dealloc();
    assert!(!maps_contain(addr));
    Ok(())
}

#[test]
fn test_failed_allocations_leak_nothing() -> anyhow::Result<()> {
    let allocator = TieredAllocator::new();
    let short = [Tier::Local];
    let remote_only = vec![Tier::Remote; 2];

    // warm up lazily initialized process state before counting mappings
    let _ = allocator.alloc(2 * page_size(), PlacementMap::new(&short), 0);
    let _ = allocator.alloc(2 * page_size(), PlacementMap::new(&remote_only), 999);

    let before = fs::read_to_string("/proc/self/maps")?.lines().count();
    for _ in 0..256 {
        let err = allocator
            .alloc(2 * page_size(), PlacementMap::new(&short), 0)
            .unwrap_err();
        assert!(matches!(err, Error::UndersizedPlacement { .. }));

        // node 999 passes mask validation but no platform admits memory there
        let err = allocator
            .alloc(2 * page_size(), PlacementMap::new(&remote_only), 999)
            .unwrap_err();
        assert!(matches!(err, Error::PolicyRejected(_)));
    }
    let after = fs::read_to_string("/proc/self/maps")?.lines().count();
    assert_eq!(before, after);
    Ok(())
}

#[test]
fn test_residency_of_raw_range() -> anyhow::Result<()> {
    // any compatible anonymous mapping can be queried, not only Region
    let len = 2 * page_size();
    let base = unsafe {
        libc::mmap(
            std::ptr::null_mut(),
            len,
            libc::PROT_READ | libc::PROT_WRITE,
            libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
            -1,
            0,
        )
    };
    anyhow::ensure!(base != libc::MAP_FAILED, "mmap failed");
    unsafe { std::ptr::write_bytes(base as *mut u8, 0x11, len) };

    let nodes = (base as *const u8, len).page_nodes()?;
    assert_eq!(nodes.len(), 2);
    for page in nodes {
        assert!(matches!(page, PageResidency::Node(_)));
    }
    unsafe { libc::munmap(base, len) };
    Ok(())
}

#[test]
#[ignore = "requires a second NUMA node with admissible memory"]
fn test_split_placement_roundtrip() -> anyhow::Result<()> {
    env_logger::builder().is_test(true).try_init().ok();
    const REMOTE: u32 = 1;
    let tiers = [Tier::Local, Tier::Remote];
    let region = TieredAllocator::new()
        .prefault(true)
        .alloc(2 * page_size(), PlacementMap::new(&tiers), REMOTE as usize)?
        .expect("non-zero size");
    let nodes = region.page_nodes()?;
    assert_eq!(nodes[0], PageResidency::Node(local_node() as u32));
    assert_eq!(nodes[1], PageResidency::Node(REMOTE));
    region.dealloc();
    Ok(())
}
