//! 광고 검색 조건
//!
//! 모든 조건은 AND 로 결합되며, 값이 있는 조건만 적용된다.
//! 같은 조건을 두 가지 방식으로 평가한다.
//! - `matches` / `apply`: 메모리 상의 광고 목록에 대한 순수 함수
//! - `push_conditions`: Postgres `WHERE` 절 조각
//!
//! 결과는 항상 가격 내림차순, 같은 가격이면 id 오름차순이다.

// region:    --- Imports
use sqlx::{Postgres, QueryBuilder};

use crate::ads::model::{Ad, AdRow};

// endregion: --- Imports

// region:    --- Ad Filter

/// 비공개(is_published = false) 광고 노출 범위
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Visibility {
    /// 모든 광고
    #[default]
    All,
    /// 게시된 광고 + 해당 사용자가 작성한 광고
    PublishedOrAuthoredBy(Option<i64>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdFilter {
    /// 카테고리 id 집합. 비어 있으면 제한 없음
    pub categories: Vec<i64>,
    /// 광고 이름 부분 일치 (대소문자 무시)
    pub text: Option<String>,
    /// 작성자 지역 이름 부분 일치 (대소문자 무시)
    pub location: Option<String>,
    pub price_from: Option<i64>,
    pub price_to: Option<i64>,
    pub visibility: Visibility,
}

/// 메모리 평가용 후보: 광고 행과 작성자의 지역 목록
#[derive(Debug, Clone)]
pub struct Candidate {
    pub row: AdRow,
    pub author_locations: Vec<String>,
}

impl AdFilter {
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// 단일 광고가 모든 조건을 만족하는지
    pub fn matches(&self, ad: &Ad, author_locations: &[String]) -> bool {
        if !self.categories.is_empty() && !self.categories.contains(&ad.category_id) {
            return false;
        }
        if let Some(text) = &self.text {
            if !contains_ignore_case(&ad.name, text) {
                return false;
            }
        }
        if let Some(location) = &self.location {
            if !author_locations
                .iter()
                .any(|name| contains_ignore_case(name, location))
            {
                return false;
            }
        }
        if self.price_from.is_some_and(|from| ad.price < from) {
            return false;
        }
        if self.price_to.is_some_and(|to| ad.price > to) {
            return false;
        }
        match self.visibility {
            Visibility::All => true,
            Visibility::PublishedOrAuthoredBy(viewer) => {
                ad.is_published || viewer == Some(ad.author_id)
            }
        }
    }

    /// 후보 목록을 걸러내고 정렬한 결과
    pub fn apply(&self, candidates: Vec<Candidate>) -> Vec<AdRow> {
        let mut rows: Vec<AdRow> = candidates
            .into_iter()
            .filter(|c| self.matches(&c.row.ad, &c.author_locations))
            .map(|c| c.row)
            .collect();
        sort_by_price_desc(&mut rows);
        rows
    }

    /// `WHERE 1=1` 뒤에 붙일 조건 추가. 광고 테이블 별칭은 `a`
    pub fn push_conditions(&self, query: &mut QueryBuilder<'_, Postgres>) {
        if !self.categories.is_empty() {
            query.push(" AND a.category_id = ANY(");
            query.push_bind(self.categories.clone());
            query.push(")");
        }
        if let Some(text) = &self.text {
            query.push(" AND a.name ILIKE ");
            query.push_bind(like_pattern(text));
        }
        if let Some(location) = &self.location {
            query.push(
                " AND EXISTS (SELECT 1 FROM user_locations ul \
                 JOIN locations l ON l.id = ul.location_id \
                 WHERE ul.user_id = a.author_id AND l.name ILIKE ",
            );
            query.push_bind(like_pattern(location));
            query.push(")");
        }
        if let Some(from) = self.price_from {
            query.push(" AND a.price >= ");
            query.push_bind(from);
        }
        if let Some(to) = self.price_to {
            query.push(" AND a.price <= ");
            query.push_bind(to);
        }
        if let Visibility::PublishedOrAuthoredBy(viewer) = self.visibility {
            match viewer {
                Some(user_id) => {
                    query.push(" AND (a.is_published OR a.author_id = ");
                    query.push_bind(user_id);
                    query.push(")");
                }
                None => {
                    query.push(" AND a.is_published");
                }
            }
        }
    }
}

/// 가격 내림차순, 동일 가격은 id 오름차순
pub fn sort_by_price_desc(rows: &mut [AdRow]) {
    rows.sort_by(|a, b| {
        b.ad.price
            .cmp(&a.ad.price)
            .then_with(|| a.ad.id.cmp(&b.ad.id))
    });
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// ILIKE 부분 일치 패턴. 와일드카드 문자는 이스케이프
fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

// endregion: --- Ad Filter

// endregion: --- Tests
