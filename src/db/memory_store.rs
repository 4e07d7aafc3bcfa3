// src/db/memory_store.rs

//! Armazenamento em memória, usado em desenvolvimento e nos testes.
//!
//! Uma transação segura o mutex durante toda a sua vida (um escritor por vez)
//! e trabalha sobre uma cópia do estado, que só substitui o original no commit.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::common::error::AppError;
use crate::db::store::{
    document_id, Collection, DocumentStore, Filter, FoundPage, StoreTx, Update, Window,
};

#[derive(Debug, Clone)]
struct StoredDoc {
    doc: Value,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
struct State {
    collections: HashMap<Collection, BTreeMap<Uuid, StoredDoc>>,
    last_tick: Option<DateTime<Utc>>,
}

impl State {
    // Relógio estritamente crescente: duas escritas nunca empatam em `updatedAt`.
    fn tick(&mut self) -> DateTime<Utc> {
        let mut now = Utc::now();
        if let Some(last) = self.last_tick {
            if now <= last {
                now = last + Duration::microseconds(1);
            }
        }
        self.last_tick = Some(now);
        now
    }

    // Documentos que casam com o filtro, na ordem canônica (updatedAt desc, id desc).
    fn matching(&self, collection: Collection, filter: &Filter) -> Vec<(Uuid, &StoredDoc)> {
        let mut found: Vec<(Uuid, &StoredDoc)> = self
            .collections
            .get(&collection)
            .map(|docs| {
                docs.iter()
                    .filter(|(_, stored)| filter.matches(&stored.doc))
                    .map(|(id, stored)| (*id, stored))
                    .collect()
            })
            .unwrap_or_default();

        found.sort_by(|(a_id, a), (b_id, b)| {
            b.updated_at.cmp(&a.updated_at).then_with(|| b_id.cmp(a_id))
        });
        found
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Leitura privilegiada, sem filtro de visibilidade (enxerga documentos excluídos).
    pub async fn raw_get(&self, collection: Collection, id: Uuid) -> Option<Value> {
        let state = self.state.lock().await;
        state
            .collections
            .get(&collection)
            .and_then(|docs| docs.get(&id))
            .map(|stored| stored.doc.clone())
    }

    /// Quantidade de documentos gravados na coleção, excluídos inclusive.
    pub async fn raw_count(&self, collection: Collection) -> usize {
        let state = self.state.lock().await;
        state.collections.get(&collection).map_or(0, BTreeMap::len)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn StoreTx>, AppError> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryTx { guard, working }))
    }
}

pub struct MemoryTx {
    guard: OwnedMutexGuard<State>,
    working: State,
}

#[async_trait]
impl StoreTx for MemoryTx {
    async fn find_one(
        &mut self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Option<Value>, AppError> {
        Ok(self
            .working
            .matching(collection, filter)
            .first()
            .map(|(_, stored)| stored.doc.clone()))
    }

    async fn find_many(
        &mut self,
        collection: Collection,
        filter: &Filter,
        window: Window,
    ) -> Result<FoundPage, AppError> {
        let found = self.working.matching(collection, filter);
        let total = found.len() as u64;

        let skip = usize::try_from(window.skip).unwrap_or(usize::MAX);
        let take = window
            .limit
            .map_or(usize::MAX, |limit| usize::try_from(limit).unwrap_or(usize::MAX));

        let docs = found
            .into_iter()
            .skip(skip)
            .take(take)
            .map(|(_, stored)| stored.doc.clone())
            .collect();

        Ok(FoundPage { docs, total })
    }

    async fn insert(&mut self, collection: Collection, mut doc: Value) -> Result<Value, AppError> {
        let id = document_id(&doc)?;
        let now = self.working.tick();

        let exists = self
            .working
            .collections
            .get(&collection)
            .is_some_and(|docs| docs.contains_key(&id));
        if exists {
            return Err(AppError::Conflict(format!(
                "Documento {id} já existe em {}",
                collection.as_str()
            )));
        }

        let stamp = serde_json::to_value(now)?;
        Update::new()
            .set("createdAt", stamp.clone())
            .set("updatedAt", stamp)
            .apply(&mut doc);

        self.working.collections.entry(collection).or_default().insert(
            id,
            StoredDoc {
                doc: doc.clone(),
                updated_at: now,
            },
        );

        Ok(doc)
    }

    async fn find_one_and_update(
        &mut self,
        collection: Collection,
        filter: &Filter,
        update: &Update,
    ) -> Result<Option<Value>, AppError> {
        let Some(id) = self
            .working
            .matching(collection, filter)
            .first()
            .map(|(id, _)| *id)
        else {
            return Ok(None);
        };

        let now = self.working.tick();
        let stamp = serde_json::to_value(now)?;

        let Some(stored) = self
            .working
            .collections
            .get_mut(&collection)
            .and_then(|docs| docs.get_mut(&id))
        else {
            return Ok(None);
        };

        update.apply(&mut stored.doc);
        Update::new().set("updatedAt", stamp).apply(&mut stored.doc);
        stored.updated_at = now;

        Ok(Some(stored.doc.clone()))
    }

    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        let MemoryTx { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), AppError> {
        // Descartar a cópia de trabalho é o rollback; o guard libera o lock no drop.
        Ok(())
    }
}
