//! 광고 목록 쿼리 문자열 해석
//!
//! `cat` 은 반복 가능한 파라미터라 axum `Query` 대신 원본 쿼리 문자열을 직접 해석한다.

use crate::error::{Error, Result};
use crate::query::filter::AdFilter;
use crate::query::pager::parse_page;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdSearch {
    pub filter: AdFilter,
    pub page: usize,
}

impl AdSearch {
    pub fn from_query(raw: Option<&str>) -> Result<Self> {
        let pairs: Vec<(String, String)> = match raw {
            Some(raw) => serde_urlencoded::from_str(raw)
                .map_err(|e| Error::bad_request(format!("Invalid query string: {e}")))?,
            None => Vec::new(),
        };

        let mut filter = AdFilter::default();
        let mut page = None;

        for (key, value) in pairs {
            if value.is_empty() {
                continue;
            }
            match key.as_str() {
                "cat" => filter.categories.push(parse_number("cat", &value)?),
                "text" => filter.text = Some(value),
                "location" => filter.location = Some(value),
                "price_from" => filter.price_from = Some(parse_number("price_from", &value)?),
                "price_to" => filter.price_to = Some(parse_number("price_to", &value)?),
                "page" => page = Some(value),
                _ => {}
            }
        }

        Ok(Self {
            filter,
            page: parse_page(page.as_deref()),
        })
    }
}

/// `page` 만 해석 (사용자 목록 등)
pub fn page_from_query(raw: Option<&str>) -> usize {
    let pairs: Vec<(String, String)> = raw
        .and_then(|raw| serde_urlencoded::from_str(raw).ok())
        .unwrap_or_default();
    let page = pairs
        .into_iter()
        .rev()
        .find(|(key, _)| key == "page")
        .map(|(_, value)| value);
    parse_page(page.as_deref())
}

fn parse_number(name: &str, value: &str) -> Result<i64> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| Error::bad_request(format!("Query parameter '{name}' must be an integer, got '{value}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_query_means_no_restriction() {
        let search = AdSearch::from_query(None).unwrap();
        assert_eq!(search.filter, AdFilter::default());
        assert_eq!(search.page, 1);
    }

    #[test]
    fn repeated_cat_and_all_filters() {
        let search = AdSearch::from_query(Some(
            "cat=1&cat=3&text=Bike&location=mos&price_from=50&price_to=150&page=2",
        ))
        .unwrap();
        assert_eq!(search.filter.categories, vec![1, 3]);
        assert_eq!(search.filter.text.as_deref(), Some("Bike"));
        assert_eq!(search.filter.location.as_deref(), Some("mos"));
        assert_eq!(search.filter.price_from, Some(50));
        assert_eq!(search.filter.price_to, Some(150));
        assert_eq!(search.page, 2);
    }

    #[test]
    fn empty_values_are_ignored() {
        let search = AdSearch::from_query(Some("cat=&text=&location=&price_from=&price_to=&page=")).unwrap();
        assert_eq!(search.filter, AdFilter::default());
        assert_eq!(search.page, 1);
    }

    #[test]
    fn url_encoded_text_is_decoded() {
        let search = AdSearch::from_query(Some("text=red%20bike&location=Saint+Petersburg")).unwrap();
        assert_eq!(search.filter.text.as_deref(), Some("red bike"));
        assert_eq!(search.filter.location.as_deref(), Some("Saint Petersburg"));
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        assert!(matches!(
            AdSearch::from_query(Some("price_from=cheap")),
            Err(Error::BadRequest { .. })
        ));
        assert!(matches!(
            AdSearch::from_query(Some("cat=books")),
            Err(Error::BadRequest { .. })
        ));
    }

    #[test]
    fn malformed_page_falls_back_to_first() {
        assert_eq!(AdSearch::from_query(Some("page=last")).unwrap().page, 1);
        assert_eq!(page_from_query(Some("page=x")), 1);
        assert_eq!(page_from_query(Some("page=4")), 4);
        assert_eq!(page_from_query(None), 1);
    }
}
