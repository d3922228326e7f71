//! Per-page tier placement and its run-length application.
//!
//! A [`PlacementMap`] carries one [`Tier`] tag per page. Before binding, the
//! map is partitioned into maximal runs of identical tier, so the number of
//! `mbind` round-trips equals the number of tag transitions instead of the
//! number of pages.

use std::ops::Range;

use log::trace;

use crate::error::{Error, Result};
use crate::memory::{bind_to_node, page_size};

/// Memory tier backing a single page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tier {
    /// The caller's nearby node, auto-detected from the thread policy.
    Local,
    /// The explicitly named far node, e.g. CXL-attached memory.
    Remote,
}

/// Per-page placement map: one tier tag per page, in page order.
///
/// The map is an immutable snapshot, only read while the allocation runs.
/// It must cover at least the page count of the rounded region; extra
/// trailing entries are ignored.
#[derive(Clone, Copy, Debug)]
pub struct PlacementMap<'a> {
    tiers: &'a [Tier],
}

impl<'a> PlacementMap<'a> {
    /// Wraps a per-page tier slice.
    pub fn new(tiers: &'a [Tier]) -> Self {
        PlacementMap { tiers }
    }

    /// Number of pages the map describes.
    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    /// Returns true if the map describes no pages.
    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    /// Maximal same-tier runs over the first `pages` entries.
    pub(crate) fn runs(&self, pages: usize) -> Runs<'a> {
        Runs {
            tiers: &self.tiers[..pages],
            next: 0,
        }
    }
}

/// Iterator over maximal half-open page-index runs sharing one tier.
pub(crate) struct Runs<'a> {
    tiers: &'a [Tier],
    next: usize,
}

impl Iterator for Runs<'_> {
    type Item = (Range<usize>, Tier);

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.next;
        let tier = *self.tiers.get(start)?;
        let mut end = start + 1;
        while self.tiers.get(end) == Some(&tier) {
            end += 1;
        }
        self.next = end;
        Some((start..end, tier))
    }
}

/// Applies a placement map over a freshly reserved region, one binding call
/// per run.
///
/// Stops at the first run whose binding fails and propagates that failure.
/// Runs already bound stay bound; the caller discards the whole region on
/// failure, so a half-bound state never outlives the failed allocation.
pub(crate) fn apply(
    base: *mut u8,
    mapped_len: usize,
    map: PlacementMap<'_>,
    local_node: usize,
    remote_node: usize,
) -> Result<()> {
    apply_with(base, mapped_len, map, local_node, remote_node, bind_to_node)
}

fn apply_with(
    base: *mut u8,
    mapped_len: usize,
    map: PlacementMap<'_>,
    local_node: usize,
    remote_node: usize,
    mut bind: impl FnMut(*mut u8, usize, usize) -> Result<()>,
) -> Result<()> {
    let pages = mapped_len / page_size();
    if map.len() < pages {
        return Err(Error::UndersizedPlacement {
            have: map.len(),
            need: pages,
        });
    }
    for (run, tier) in map.runs(pages) {
        let node = match tier {
            Tier::Local => local_node,
            Tier::Remote => remote_node,
        };
        trace!("run {:?} on {:?} -> node {}", run, tier, node);
        let run_addr = unsafe { base.add(run.start * page_size()) };
        let run_len = run.len() * page_size();
        bind(run_addr, run_len, node)?;
    }
    Ok(())
}
