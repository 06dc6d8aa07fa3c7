//! 프로세스 메모리 저장소
//!
//! Postgres 스키마의 제약(고유 username, 카테고리 참조 보호, CASCADE 삭제)을 그대로 흉내 낸다.
//! 테스트와 로컬 데모용이며 재시작하면 데이터가 사라진다.

// region:    --- Imports
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::debug;

use super::{display_name, generate_token, Store};
use crate::ads::model::{
    normalize_items, Ad, AdRow, Category, NewAd, NewSelection, Selection, UpdateAdRequest,
};
use crate::error::{Error, Result};
use crate::query::filter::{AdFilter, Candidate};
use crate::query::pager::Window;
use crate::users::model::{normalize_locations, NewUser, User, UserChanges};

// endregion: --- Imports

// region:    --- Tables
#[derive(Default)]
struct Tables {
    last_category_id: i64,
    last_ad_id: i64,
    last_selection_id: i64,
    last_user_id: i64,
    categories: BTreeMap<i64, Category>,
    ads: BTreeMap<i64, Ad>,
    selections: BTreeMap<i64, Selection>,
    users: BTreeMap<i64, User>,
    tokens: HashMap<String, i64>,
}

impl Tables {
    fn ad_row(&self, ad: &Ad) -> AdRow {
        let author = self
            .users
            .get(&ad.author_id)
            .map(display_name)
            .unwrap_or_default();
        AdRow {
            ad: ad.clone(),
            author,
        }
    }

    /// 조회 시점의 계산 필드(total_ads, 지역 정렬)를 채운 사용자
    fn user_snapshot(&self, user: &User) -> User {
        let mut user = user.clone();
        user.total_ads = self
            .ads
            .values()
            .filter(|ad| ad.author_id == user.id && ad.is_published)
            .count() as i64;
        user.locations.sort();
        user
    }

    fn remove_ad(&mut self, id: i64) -> Option<Ad> {
        let ad = self.ads.remove(&id)?;
        for selection in self.selections.values_mut() {
            selection.items.retain(|item| *item != id);
        }
        Some(ad)
    }
}

// endregion: --- Tables

// region:    --- In-Memory Store
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn list_categories(&self) -> Result<Vec<Category>> {
        let tables = self.tables.read();
        let mut categories: Vec<Category> = tables.categories.values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(categories)
    }

    async fn get_category(&self, id: i64) -> Result<Option<Category>> {
        Ok(self.tables.read().categories.get(&id).cloned())
    }

    async fn create_category(&self, name: &str) -> Result<Category> {
        let mut tables = self.tables.write();
        tables.last_category_id += 1;
        let category = Category {
            id: tables.last_category_id,
            name: name.to_string(),
        };
        tables.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn update_category(&self, id: i64, name: &str) -> Result<Option<Category>> {
        let mut tables = self.tables.write();
        Ok(tables.categories.get_mut(&id).map(|category| {
            category.name = name.to_string();
            category.clone()
        }))
    }

    async fn delete_category(&self, id: i64) -> Result<bool> {
        let mut tables = self.tables.write();
        if !tables.categories.contains_key(&id) {
            return Ok(false);
        }
        if tables.ads.values().any(|ad| ad.category_id == id) {
            return Err(Error::conflict("Category is in use"));
        }
        tables.categories.remove(&id);
        Ok(true)
    }

    async fn search_ads(&self, filter: &AdFilter, window: Window) -> Result<(Vec<AdRow>, usize)> {
        let tables = self.tables.read();
        let candidates = tables
            .ads
            .values()
            .map(|ad| Candidate {
                row: tables.ad_row(ad),
                author_locations: tables
                    .users
                    .get(&ad.author_id)
                    .map(|user| user.locations.clone())
                    .unwrap_or_default(),
            })
            .collect();
        let rows = filter.apply(candidates);
        let total = rows.len();
        let page = rows
            .into_iter()
            .skip(window.offset)
            .take(window.limit)
            .collect();
        debug!("{:<12} --> 광고 검색: 전체 {}건", "InMemory", total);
        Ok((page, total))
    }

    async fn get_ad(&self, id: i64) -> Result<Option<AdRow>> {
        let tables = self.tables.read();
        Ok(tables.ads.get(&id).map(|ad| tables.ad_row(ad)))
    }

    async fn ads_by_ids(&self, ids: &[i64]) -> Result<Vec<AdRow>> {
        let tables = self.tables.read();
        Ok(normalize_items(ids.to_vec())
            .into_iter()
            .filter_map(|id| tables.ads.get(&id).map(|ad| tables.ad_row(ad)))
            .collect())
    }

    async fn create_ad(&self, new_ad: NewAd) -> Result<AdRow> {
        let mut tables = self.tables.write();
        tables.last_ad_id += 1;
        let ad = Ad {
            id: tables.last_ad_id,
            name: new_ad.name,
            author_id: new_ad.author_id,
            price: new_ad.price,
            description: new_ad.description,
            is_published: new_ad.is_published,
            category_id: new_ad.category_id,
            image: None,
        };
        tables.ads.insert(ad.id, ad.clone());
        Ok(tables.ad_row(&ad))
    }

    async fn update_ad(&self, id: i64, changes: &UpdateAdRequest) -> Result<Option<AdRow>> {
        let mut tables = self.tables.write();
        let Some(ad) = tables.ads.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = &changes.name {
            ad.name = name.clone();
        }
        if let Some(price) = changes.price {
            ad.price = price;
        }
        if let Some(description) = &changes.description {
            ad.description = description.clone();
        }
        if let Some(is_published) = changes.is_published {
            ad.is_published = is_published;
        }
        if let Some(category_id) = changes.category_id {
            ad.category_id = category_id;
        }
        let ad = ad.clone();
        Ok(Some(tables.ad_row(&ad)))
    }

    async fn set_ad_image(&self, id: i64, image: Option<String>) -> Result<Option<Option<String>>> {
        let mut tables = self.tables.write();
        Ok(tables
            .ads
            .get_mut(&id)
            .map(|ad| std::mem::replace(&mut ad.image, image)))
    }

    async fn delete_ad(&self, id: i64) -> Result<bool> {
        Ok(self.tables.write().remove_ad(id).is_some())
    }

    async fn list_selections(&self) -> Result<Vec<Selection>> {
        Ok(self.tables.read().selections.values().cloned().collect())
    }

    async fn get_selection(&self, id: i64) -> Result<Option<Selection>> {
        Ok(self.tables.read().selections.get(&id).cloned())
    }

    async fn create_selection(&self, new_selection: NewSelection) -> Result<Selection> {
        let mut tables = self.tables.write();
        tables.last_selection_id += 1;
        let selection = Selection {
            id: tables.last_selection_id,
            name: new_selection.name,
            owner_id: new_selection.owner_id,
            items: normalize_items(new_selection.items),
        };
        tables.selections.insert(selection.id, selection.clone());
        Ok(selection)
    }

    async fn update_selection(
        &self,
        id: i64,
        name: Option<String>,
        items: Option<Vec<i64>>,
    ) -> Result<Option<Selection>> {
        let mut tables = self.tables.write();
        Ok(tables.selections.get_mut(&id).map(|selection| {
            if let Some(name) = name {
                selection.name = name;
            }
            if let Some(items) = items {
                selection.items = normalize_items(items);
            }
            selection.clone()
        }))
    }

    async fn delete_selection(&self, id: i64) -> Result<bool> {
        Ok(self.tables.write().selections.remove(&id).is_some())
    }

    async fn list_users(&self, window: Window) -> Result<(Vec<User>, usize)> {
        let tables = self.tables.read();
        let mut users: Vec<&User> = tables.users.values().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        let total = users.len();
        let page = users
            .into_iter()
            .skip(window.offset)
            .take(window.limit)
            .map(|user| tables.user_snapshot(user))
            .collect();
        Ok((page, total))
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>> {
        let tables = self.tables.read();
        Ok(tables.users.get(&id).map(|user| tables.user_snapshot(user)))
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let tables = self.tables.read();
        Ok(tables
            .users
            .values()
            .find(|user| user.username == username)
            .map(|user| tables.user_snapshot(user)))
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User> {
        let mut tables = self.tables.write();
        if tables
            .users
            .values()
            .any(|user| user.username == new_user.username)
        {
            return Err(Error::conflict("A user with that username already exists"));
        }
        tables.last_user_id += 1;
        let user = User {
            id: tables.last_user_id,
            username: new_user.username,
            password_hash: new_user.password_hash,
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            role: new_user.role,
            locations: normalize_locations(new_user.locations),
            total_ads: 0,
        };
        tables.users.insert(user.id, user.clone());
        Ok(tables.user_snapshot(&user))
    }

    async fn update_user(&self, id: i64, changes: UserChanges) -> Result<Option<User>> {
        let mut tables = self.tables.write();
        let Some(user) = tables.users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(first_name) = changes.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = changes.last_name {
            user.last_name = last_name;
        }
        if let Some(password_hash) = changes.password_hash {
            user.password_hash = password_hash;
        }
        if let Some(locations) = changes.locations {
            user.locations = normalize_locations(locations);
        }
        let user = user.clone();
        Ok(Some(tables.user_snapshot(&user)))
    }

    async fn delete_user(&self, id: i64) -> Result<Option<Vec<String>>> {
        let mut tables = self.tables.write();
        if tables.users.remove(&id).is_none() {
            return Ok(None);
        }
        let authored: Vec<i64> = tables
            .ads
            .values()
            .filter(|ad| ad.author_id == id)
            .map(|ad| ad.id)
            .collect();
        let mut images = Vec::new();
        for ad_id in authored {
            if let Some(image) = tables.remove_ad(ad_id).and_then(|ad| ad.image) {
                images.push(image);
            }
        }
        tables.selections.retain(|_, selection| selection.owner_id != id);
        tables.tokens.retain(|_, user_id| *user_id != id);
        Ok(Some(images))
    }

    async fn issue_token(&self, user_id: i64) -> Result<String> {
        let mut tables = self.tables.write();
        if let Some((token, _)) = tables.tokens.iter().find(|(_, owner)| **owner == user_id) {
            return Ok(token.clone());
        }
        let token = generate_token();
        tables.tokens.insert(token.clone(), user_id);
        Ok(token)
    }

    async fn user_for_token(&self, token: &str) -> Result<Option<User>> {
        let tables = self.tables.read();
        Ok(tables
            .tokens
            .get(token)
            .and_then(|user_id| tables.users.get(user_id))
            .map(|user| tables.user_snapshot(user)))
    }
}

// endregion: --- In-Memory Store

// endregion: --- Tests
