// src/services/transaction.rs

//! Unidade de trabalho transacional.
//!
//! `TransactionRunner::run` abre uma transação, entrega um `TxContext` para a
//! closure e decide o destino pelo resultado: `Ok` faz commit, `Err` faz
//! rollback e devolve o erro original intacto.

use std::sync::Arc;

use futures::future::BoxFuture;

use crate::common::error::AppError;
use crate::db::store::{Document, DocumentStore, Filter, StoreTx, Update, Window};

tokio::task_local! {
    // Marca a task que já está dentro de uma unidade de trabalho.
    static IN_UNIT_OF_WORK: ();
}

/// Handle de transação visto pelos serviços. Todas as leituras e escritas de
/// uma unidade de trabalho passam por aqui.
pub struct TxContext {
    tx: Box<dyn StoreTx>,
}

impl TxContext {
    pub async fn find_one<D: Document>(&mut self, filter: &Filter) -> Result<Option<D>, AppError> {
        match self.tx.find_one(D::COLLECTION, filter).await? {
            Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
            None => Ok(None),
        }
    }

    /// Janela de documentos na ordem canônica, com o total que casa com o filtro.
    pub async fn find_page<D: Document>(
        &mut self,
        filter: &Filter,
        window: Window,
    ) -> Result<(Vec<D>, u64), AppError> {
        let found = self.tx.find_many(D::COLLECTION, filter, window).await?;
        let docs = found
            .docs
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<D>, _>>()?;
        Ok((docs, found.total))
    }

    pub async fn insert<D: Document>(&mut self, doc: &D) -> Result<D, AppError> {
        let value = serde_json::to_value(doc)?;
        let stored = self.tx.insert(D::COLLECTION, value).await?;
        Ok(serde_json::from_value(stored)?)
    }

    pub async fn find_one_and_update<D: Document>(
        &mut self,
        filter: &Filter,
        update: &Update,
    ) -> Result<Option<D>, AppError> {
        match self.tx.find_one_and_update(D::COLLECTION, filter, update).await? {
            Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
            None => Ok(None),
        }
    }
}

#[derive(Clone)]
pub struct TransactionRunner {
    store: Arc<dyn DocumentStore>,
}

impl TransactionRunner {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Executa `work` dentro de uma transação.
    ///
    /// A closure só pode capturar valores próprios (clones), nunca `&self`
    /// do serviço chamador. Chamadas aninhadas falham na hora com
    /// `AppError::NestedTransaction`, sem abrir uma segunda transação.
    pub async fn run<R, F>(&self, work: F) -> Result<R, AppError>
    where
        R: Send,
        F: for<'t> FnOnce(&'t mut TxContext) -> BoxFuture<'t, Result<R, AppError>> + Send,
    {
        if IN_UNIT_OF_WORK.try_with(|_| ()).is_ok() {
            return Err(AppError::NestedTransaction);
        }

        IN_UNIT_OF_WORK.scope((), self.run_scoped(work)).await
    }

    async fn run_scoped<R, F>(&self, work: F) -> Result<R, AppError>
    where
        R: Send,
        F: for<'t> FnOnce(&'t mut TxContext) -> BoxFuture<'t, Result<R, AppError>> + Send,
    {
        // 1. Inicia a transação
        let tx = self.store.begin().await?;
        let mut ctx = TxContext { tx };

        // 2. Executa a unidade de trabalho
        let outcome = work(&mut ctx).await;

        // 3. Commit ou rollback conforme o resultado
        match outcome {
            Ok(value) => {
                ctx.tx.commit().await?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = ctx.tx.rollback().await {
                    tracing::warn!(error = ?rollback_err, original = %err, "Falha no rollback da transação");
                }
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory_store::MemoryStore;
    use crate::db::store::Collection;
    use crate::models::organization::Organization;
    use uuid::Uuid;

    fn runner() -> (MemoryStore, TransactionRunner) {
        let store = MemoryStore::new();
        let runner = TransactionRunner::new(Arc::new(store.clone()));
        (store, runner)
    }

    #[tokio::test]
    async fn ok_commits_and_returns_value() {
        let (store, runner) = runner();
        let org = Organization::new("Acme".into(), Uuid::new_v4());
        let id = org.id;

        let name = runner
            .run(move |tx| {
                Box::pin(async move {
                    let saved = tx.insert(&org).await?;
                    Ok(saved.name)
                })
            })
            .await
            .unwrap();

        assert_eq!(name, "Acme");
        assert!(store.raw_get(Collection::Organizations, id).await.is_some());
    }

    #[tokio::test]
    async fn err_rolls_back_and_keeps_the_error() {
        let (store, runner) = runner();
        let org = Organization::new("Acme".into(), Uuid::new_v4());

        let result: Result<(), AppError> = runner
            .run(move |tx| {
                Box::pin(async move {
                    tx.insert(&org).await?;
                    Err(AppError::Conflict("boom".into()))
                })
            })
            .await;

        assert!(matches!(result, Err(AppError::Conflict(msg)) if msg == "boom"));
        assert_eq!(store.raw_count(Collection::Organizations).await, 0);
    }

    #[tokio::test]
    async fn nested_run_fails_fast() {
        let (_store, runner) = runner();
        let inner = runner.clone();

        let result: Result<(), AppError> = runner
            .run(move |_tx| {
                Box::pin(async move {
                    inner.run(|_tx| Box::pin(async { Ok(()) })).await
                })
            })
            .await;

        assert!(matches!(result, Err(AppError::NestedTransaction)));
    }

    #[tokio::test]
    async fn sequential_runs_are_independent() {
        let (_store, runner) = runner();

        for _ in 0..3 {
            runner.run(|_tx| Box::pin(async { Ok(()) })).await.unwrap();
        }
    }
}
