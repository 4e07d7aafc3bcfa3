// src/db/postgres_store.rs

//! Armazenamento de documentos sobre Postgres/JSONB.
//!
//! Todas as coleções vivem na tabela `documents (collection, id, doc, created_at,
//! updated_at)`. Filtros viram predicados JSONB; `find_one_and_update` trava a
//! linha (`FOR UPDATE`), aplica a mutação e regrava o documento na mesma transação.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use sqlx::{types::Json, PgPool, Postgres, QueryBuilder, Transaction};
use uuid::Uuid;

use crate::common::error::AppError;
use crate::db::store::{
    document_id, Collection, Condition, DocumentStore, Filter, FoundPage, StoreTx, Update, Window,
};

#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentStore for PostgresStore {
    async fn begin(&self) -> Result<Box<dyn StoreTx>, AppError> {
        let mut tx = self.pool.begin().await?;

        // Corridas entre requisições são resolvidas pelo isolamento do banco;
        // um conflito de serialização sobe como erro, sem retry.
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut *tx)
            .await?;

        Ok(Box::new(PostgresTx { tx }))
    }
}

pub struct PostgresTx {
    tx: Transaction<'static, Postgres>,
}

/// `WHERE collection = $1 AND <condições>`
fn push_where(qb: &mut QueryBuilder<'static, Postgres>, collection: Collection, filter: &Filter) {
    qb.push(" WHERE collection = ").push_bind(collection.as_str());

    for condition in filter.conditions() {
        match condition {
            Condition::Eq(field, value) => {
                qb.push(" AND doc -> ")
                    .push_bind(*field)
                    .push(" = ")
                    .push_bind(Json(value.clone()));
            }
            Condition::Ne(field, value) => {
                qb.push(" AND doc -> ")
                    .push_bind(*field)
                    .push(" IS DISTINCT FROM ")
                    .push_bind(Json(value.clone()));
            }
            Condition::Contains(field, value) => {
                qb.push(" AND doc -> ")
                    .push_bind(*field)
                    .push(" @> ")
                    .push_bind(Json(json!([value])));
            }
            Condition::In(field, values) => {
                qb.push(" AND ")
                    .push_bind(Json(Value::Array(values.clone())))
                    .push(" @> jsonb_build_array(doc -> ")
                    .push_bind(*field)
                    .push(")");
            }
        }
    }
}

const CANONICAL_ORDER: &str = " ORDER BY updated_at DESC, id DESC";

fn select_query(collection: Collection, filter: &Filter, window: Window) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT doc FROM documents");
    push_where(&mut qb, collection, filter);
    qb.push(CANONICAL_ORDER);

    if let Some(limit) = window.limit {
        qb.push(" LIMIT ").push_bind(to_i64(limit));
    }
    if window.skip > 0 {
        qb.push(" OFFSET ").push_bind(to_i64(window.skip));
    }
    qb
}

fn count_query(collection: Collection, filter: &Filter) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM documents");
    push_where(&mut qb, collection, filter);
    qb
}

fn lock_query(collection: Collection, filter: &Filter) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT id, doc FROM documents");
    push_where(&mut qb, collection, filter);
    qb.push(CANONICAL_ORDER).push(" LIMIT 1 FOR UPDATE");
    qb
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[async_trait]
impl StoreTx for PostgresTx {
    async fn find_one(
        &mut self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Option<Value>, AppError> {
        let window = Window { skip: 0, limit: Some(1) };
        let row = select_query(collection, filter, window)
            .build_query_scalar::<Json<Value>>()
            .fetch_optional(&mut *self.tx)
            .await?;

        Ok(row.map(|Json(doc)| doc))
    }

    async fn find_many(
        &mut self,
        collection: Collection,
        filter: &Filter,
        window: Window,
    ) -> Result<FoundPage, AppError> {
        let total: i64 = count_query(collection, filter)
            .build_query_scalar()
            .fetch_one(&mut *self.tx)
            .await?;

        let rows = select_query(collection, filter, window)
            .build_query_scalar::<Json<Value>>()
            .fetch_all(&mut *self.tx)
            .await?;

        Ok(FoundPage {
            docs: rows.into_iter().map(|Json(doc)| doc).collect(),
            total: u64::try_from(total).unwrap_or_default(),
        })
    }

    async fn insert(&mut self, collection: Collection, mut doc: Value) -> Result<Value, AppError> {
        let id = document_id(&doc)?;
        let now: DateTime<Utc> = Utc::now();
        let stamp = serde_json::to_value(now)?;

        Update::new()
            .set("createdAt", stamp.clone())
            .set("updatedAt", stamp)
            .apply(&mut doc);

        sqlx::query(
            r#"
            INSERT INTO documents (collection, id, doc, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            "#,
        )
        .bind(collection.as_str())
        .bind(id)
        .bind(Json(&doc))
        .bind(now)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::Conflict(format!(
                        "Documento {id} já existe em {}",
                        collection.as_str()
                    ));
                }
            }
            e.into()
        })?;

        Ok(doc)
    }

    async fn find_one_and_update(
        &mut self,
        collection: Collection,
        filter: &Filter,
        update: &Update,
    ) -> Result<Option<Value>, AppError> {
        // 1. Trava o alvo (se existir e casar com o filtro)
        let locked: Option<(Uuid, Json<Value>)> = lock_query(collection, filter)
            .build_query_as()
            .fetch_optional(&mut *self.tx)
            .await?;

        let Some((id, Json(mut doc))) = locked else {
            return Ok(None);
        };

        // 2. Aplica a mutação
        let now: DateTime<Utc> = Utc::now();
        update.apply(&mut doc);
        Update::new()
            .set("updatedAt", serde_json::to_value(now)?)
            .apply(&mut doc);

        // 3. Regrava
        sqlx::query(
            r#"
            UPDATE documents SET doc = $3, updated_at = $4
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection.as_str())
        .bind(id)
        .bind(Json(&doc))
        .bind(now)
        .execute(&mut *self.tx)
        .await?;

        Ok(Some(doc))
    }

    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), AppError> {
        self.tx.rollback().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_translates_every_condition() {
        let filter = Filter::new()
            .eq("app", "a")
            .ne("status", "deleted")
            .contains("resources", "r")
            .one_of("role", vec![json!("owner")]);

        let qb = select_query(Collection::Apps, &filter, Window { skip: 20, limit: Some(10) });

        assert_eq!(
            qb.sql(),
            "SELECT doc FROM documents WHERE collection = $1 \
             AND doc -> $2 = $3 \
             AND doc -> $4 IS DISTINCT FROM $5 \
             AND doc -> $6 @> $7 \
             AND $8 @> jsonb_build_array(doc -> $9) \
             ORDER BY updated_at DESC, id DESC LIMIT $10 OFFSET $11"
        );
    }

    #[test]
    fn lock_query_targets_a_single_row() {
        let qb = lock_query(Collection::Resources, &Filter::by_id(Uuid::nil()));
        assert!(qb.sql().ends_with("ORDER BY updated_at DESC, id DESC LIMIT 1 FOR UPDATE"));
    }

    #[test]
    fn count_has_no_window() {
        let qb = count_query(Collection::Users, &Filter::new());
        assert_eq!(qb.sql(), "SELECT COUNT(*) FROM documents WHERE collection = $1");
    }
}
