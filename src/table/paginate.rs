/// `ceil(n / page_size)`; an empty collection has zero pages.
pub fn page_count(n: usize, page_size: usize) -> usize {
    let p = page_size.max(1);
    n.div_ceil(p)
}

/// Clamp a 1-based page into the valid range. With zero pages the page is 1.
pub fn clamp_page(page: usize, pages: usize) -> usize {
    page.max(1).min(pages.max(1))
}

/// Items on a 1-based page; out-of-range pages are empty.
pub fn page_slice<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    let p = page_size.max(1);
    let start = page.saturating_sub(1).saturating_mul(p);
    if start >= items.len() { return &[]; }
    let end = (start + p).min(items.len());
    &items[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_and_last_page_sizes() {
        for n in 0..60usize {
            for p in 1..13usize {
                let pages = page_count(n, p);
                assert_eq!(pages, (n + p - 1) / p);
                if n > 0 {
                    let items: Vec<usize> = (0..n).collect();
                    let last = page_slice(&items, pages, p).len();
                    let expect = if n % p == 0 { p } else { n % p };
                    assert_eq!(last, expect, "n={} p={}", n, p);
                }
            }
        }
    }

    #[test]
    fn clamping() {
        assert_eq!(clamp_page(0, 3), 1);
        assert_eq!(clamp_page(9, 3), 3);
        assert_eq!(clamp_page(5, 0), 1);
        assert!(page_slice(&[1, 2, 3], 4, 2).is_empty());
        assert_eq!(page_count(5, 0), 5);
    }
}
