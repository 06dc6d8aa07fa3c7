//! 응답(wire) 표현
//!
//! 광고는 목록/상세/생성/수정/이미지 업로드 응답 모두 `AdView` 하나로 직렬화한다.

use serde::Serialize;

use crate::ads::model::{AdRow, Category, Selection};
use crate::media::FileStorage;
use crate::users::model::{User, UserRole};

// 광고 응답
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdView {
    pub id: i64,
    pub name: String,
    pub author_id: i64,
    pub author: String,
    pub price: i64,
    pub description: String,
    pub is_published: bool,
    pub category_id: i64,
    pub image: Option<String>,
}

impl AdView {
    pub fn project(row: &AdRow, media: &dyn FileStorage) -> Self {
        let ad = &row.ad;
        Self {
            id: ad.id,
            name: ad.name.clone(),
            author_id: ad.author_id,
            author: row.author.clone(),
            price: ad.price,
            description: ad.description.clone(),
            is_published: ad.is_published,
            category_id: ad.category_id,
            image: ad.image.as_deref().map(|key| media.public_url(key)),
        }
    }

    pub fn project_all(rows: &[AdRow], media: &dyn FileStorage) -> Vec<Self> {
        rows.iter().map(|row| Self::project(row, media)).collect()
    }
}

// 카테고리 응답
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryView {
    pub id: i64,
    pub name: String,
}

impl From<Category> for CategoryView {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
        }
    }
}

// 셀렉션 목록 응답
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionListView {
    pub id: i64,
    pub name: String,
}

impl From<&Selection> for SelectionListView {
    fn from(selection: &Selection) -> Self {
        Self {
            id: selection.id,
            name: selection.name.clone(),
        }
    }
}

// 셀렉션 상세 응답: 소유자 username 과 광고 전체
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionDetailView {
    pub id: i64,
    pub name: String,
    pub owner: String,
    pub items: Vec<AdView>,
}

// 셀렉션 생성/수정 응답
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionView {
    pub id: i64,
    pub name: String,
    pub owner_id: i64,
    pub items: Vec<i64>,
}

impl From<Selection> for SelectionView {
    fn from(selection: Selection) -> Self {
        Self {
            id: selection.id,
            name: selection.name,
            owner_id: selection.owner_id,
            items: selection.items,
        }
    }
}

// 사용자 응답 (비밀번호 해시는 제외)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserView {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub locations: Vec<String>,
    pub total_ads: i64,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            role: user.role,
            locations: user.locations,
            total_ads: user.total_ads,
        }
    }
}
