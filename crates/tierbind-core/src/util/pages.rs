use crate::memory::page_size;

/// Rounds a byte count up to a whole number of pages.
///
/// Pure in `bytes` and the process page size; allocation and deallocation
/// both recompute the mapped length through this function, so the two always
/// agree.
pub fn round_to_pages(bytes: usize) -> usize {
    pages_for(bytes) * page_size()
}

/// Number of pages spanned by `bytes`.
pub fn pages_for(bytes: usize) -> usize {
    bytes.div_ceil(page_size())
}

#[cfg(test)]
mod tests {
    use super::{pages_for, round_to_pages};
    use crate::memory::page_size;

    #[test]
    fn test_round_to_pages() {
        let page = page_size();
        assert_eq!(round_to_pages(0), 0);
        assert_eq!(round_to_pages(1), page);
        assert_eq!(round_to_pages(page - 1), page);
        assert_eq!(round_to_pages(page), page);
        assert_eq!(round_to_pages(page + 1), 2 * page);
        assert_eq!(round_to_pages(7 * page), 7 * page);
    }

    #[test]
    fn test_pages_for() {
        let page = page_size();
        assert_eq!(pages_for(0), 0);
        assert_eq!(pages_for(1), 1);
        assert_eq!(pages_for(page), 1);
        assert_eq!(pages_for(page + 1), 2);
        assert_eq!(pages_for(3 * page - 1), 3);
    }

    #[test]
    fn test_rounding_is_idempotent() {
        for bytes in [0, 1, 4095, 4096, 123_456] {
            let rounded = round_to_pages(bytes);
            assert_eq!(round_to_pages(rounded), rounded);
            assert!(rounded >= bytes);
        }
    }
}
