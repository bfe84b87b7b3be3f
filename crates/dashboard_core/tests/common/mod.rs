#![allow(dead_code)]

use async_trait::async_trait;
use dashboard_core::repo::SqlRecord;
use dashboard_core::{
    CategoryItem, Entity, LinkItem, NoteItem, SqliteStore, StoreAdapter, StoreError,
};
use std::collections::HashSet;

pub fn link(id: &str, category: &str, order: Option<i64>) -> LinkItem {
    LinkItem {
        id: id.to_string(),
        url: format!("https://{id}.test"),
        title: id.to_uppercase(),
        category: category.to_string(),
        created_at: 1_700_000_000_000,
        order,
    }
}

pub fn note(id: &str, order: Option<i64>) -> NoteItem {
    NoteItem {
        id: id.to_string(),
        title: id.to_uppercase(),
        content: String::new(),
        created_at: 1_700_000_000_000,
        order,
    }
}

pub fn category(id: &str, name: &str, order: Option<i64>) -> CategoryItem {
    CategoryItem {
        id: id.to_string(),
        name: name.to_string(),
        color: None,
        created_at: 1_700_000_000_000,
        order,
    }
}

pub fn ids<T: Entity>(items: &[T]) -> Vec<String> {
    items.iter().map(|item| item.id().to_string()).collect()
}

/// Store that rejects writes for selected ids and delegates everything else.
pub struct FlakyStore {
    pub inner: SqliteStore,
    pub failing_ids: HashSet<String>,
}

impl FlakyStore {
    pub fn failing_on(ids: &[&str]) -> Self {
        Self {
            inner: SqliteStore::in_memory(),
            failing_ids: ids.iter().map(|id| id.to_string()).collect(),
        }
    }

    fn check(&self, id: &str) -> Result<(), StoreError> {
        if self.failing_ids.contains(id) {
            return Err(StoreError::InvalidData(format!("rejected write for {id}")));
        }
        Ok(())
    }
}

#[async_trait]
impl<T: SqlRecord> StoreAdapter<T> for FlakyStore {
    async fn get_all(&self) -> Result<Vec<T>, StoreError> {
        StoreAdapter::<T>::get_all(&self.inner).await
    }

    async fn add(&self, entity: &T) -> Result<(), StoreError> {
        self.check(entity.id())?;
        StoreAdapter::<T>::add(&self.inner, entity).await
    }

    async fn update(&self, entity: &T) -> Result<(), StoreError> {
        self.check(entity.id())?;
        StoreAdapter::<T>::update(&self.inner, entity).await
    }

    async fn remove(&self, id: &str) -> Result<(), StoreError> {
        self.check(id)?;
        StoreAdapter::<T>::remove(&self.inner, id).await
    }

    async fn clear(&self) -> Result<(), StoreError> {
        StoreAdapter::<T>::clear(&self.inner).await
    }
}
