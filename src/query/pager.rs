// region:    --- Imports
use serde::Serialize;

// endregion: --- Imports

// region:    --- Pager

/// 페이지 응답: `{items, num_pages, total}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub num_pages: usize,
    pub total: usize,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            num_pages: self.num_pages,
            total: self.total,
        }
    }
}

/// 조회 범위 (OFFSET / LIMIT)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub offset: usize,
    pub limit: usize,
}

impl Window {
    pub fn offset_i64(&self) -> i64 {
        i64::try_from(self.offset).unwrap_or(i64::MAX)
    }

    pub fn limit_i64(&self) -> i64 {
        i64::try_from(self.limit).unwrap_or(i64::MAX)
    }
}

/// 고정 크기 페이지 분할기. 페이지 번호는 1부터 시작
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    page_size: usize,
}

impl Pager {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
        }
    }

    pub fn num_pages(&self, total: usize) -> usize {
        total.div_ceil(self.page_size)
    }

    /// 페이지 번호에 해당하는 범위. 0 은 1페이지로 취급
    pub fn window(&self, page: usize) -> Window {
        let page = page.max(1);
        Window {
            offset: (page - 1).saturating_mul(self.page_size),
            limit: self.page_size,
        }
    }

    /// 이미 잘라낸 항목과 전체 개수로 페이지 구성
    pub fn page<T>(&self, items: Vec<T>, total: usize) -> Page<T> {
        Page {
            items,
            num_pages: self.num_pages(total),
            total,
        }
    }

    /// 메모리 상의 정렬된 목록을 잘라 페이지 구성.
    /// 마지막 페이지를 넘으면 빈 페이지
    pub fn paginate<T>(&self, items: Vec<T>, page: usize) -> Page<T> {
        let total = items.len();
        let window = self.window(page);
        let items = items
            .into_iter()
            .skip(window.offset)
            .take(window.limit)
            .collect();
        self.page(items, total)
    }
}

/// `page` 파라미터 해석. 없거나 숫자가 아니거나 1 미만이면 1
pub fn parse_page(raw: Option<&str>) -> usize {
    raw.and_then(|s| s.trim().parse::<usize>().ok())
        .filter(|page| *page >= 1)
        .unwrap_or(1)
}

// endregion: --- Pager

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_page_of_five_with_size_two() {
        let pager = Pager::new(2);
        let page = pager.paginate(vec![1, 2, 3, 4, 5], 1);
        assert_eq!(page.items, vec![1, 2]);
        assert_eq!(page.total, 5);
        assert_eq!(page.num_pages, 3);
    }

    #[test]
    fn last_partial_page() {
        let page = Pager::new(2).paginate(vec![1, 2, 3, 4, 5], 3);
        assert_eq!(page.items, vec![5]);
    }

    #[test]
    fn page_beyond_last_is_empty_not_error() {
        let page = Pager::new(2).paginate(vec![1, 2, 3, 4, 5], 4);
        assert!(page.items.is_empty());
        assert_eq!(page.total, 5);
        assert_eq!(page.num_pages, 3);

        let page = Pager::new(2).paginate(vec![1, 2, 3], usize::MAX);
        assert!(page.items.is_empty());
    }

    #[test]
    fn num_pages_is_ceiling() {
        let pager = Pager::new(10);
        assert_eq!(pager.num_pages(0), 0);
        assert_eq!(pager.num_pages(1), 1);
        assert_eq!(pager.num_pages(10), 1);
        assert_eq!(pager.num_pages(11), 2);
    }

    #[test]
    fn zero_page_size_is_clamped() {
        let pager = Pager::new(0);
        assert_eq!(pager.window(2), Window { offset: 1, limit: 1 });
        assert_eq!(pager.num_pages(3), 3);
    }

    #[test]
    fn window_offsets() {
        let pager = Pager::new(10);
        assert_eq!(pager.window(1), Window { offset: 0, limit: 10 });
        assert_eq!(pager.window(3), Window { offset: 20, limit: 10 });
        assert_eq!(pager.window(0), Window { offset: 0, limit: 10 });
        assert_eq!(pager.window(usize::MAX).offset_i64(), i64::MAX);
    }

    #[test]
    fn page_parameter_defaults_to_one() {
        assert_eq!(parse_page(None), 1);
        assert_eq!(parse_page(Some("")), 1);
        assert_eq!(parse_page(Some("abc")), 1);
        assert_eq!(parse_page(Some("0")), 1);
        assert_eq!(parse_page(Some("-2")), 1);
        assert_eq!(parse_page(Some("3")), 3);
    }

    #[test]
    fn map_keeps_metadata() {
        let page = Pager::new(2).paginate(vec![1, 2, 3], 1).map(|n| n * 10);
        assert_eq!(page.items, vec![10, 20]);
        assert_eq!(page.num_pages, 2);
        assert_eq!(page.total, 3);
    }
}
// endregion: --- Tests
