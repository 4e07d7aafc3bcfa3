// src/services/cross_reference.rs

//! Listas de referência pai -> filho (`App.resources`, `Organization.apps`, ...).
//!
//! O vínculo é gravado antes do filho e dentro da mesma transação; se o pai não
//! existe (ou foi excluído) nada é escrito e a unidade de trabalho falha.

use anyhow::anyhow;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::db::store::{Document, Filter, Update};
use crate::models::app::ChildList;
use crate::services::soft_delete::SoftDeleteFilter;
use crate::services::transaction::TxContext;

pub struct CrossReferenceMaintainer;

impl CrossReferenceMaintainer {
    /// Acrescenta `child` à lista do container e devolve o container atualizado.
    pub async fn link_child<C: Document>(
        tx: &mut TxContext,
        container: Uuid,
        list: ChildList,
        child: Uuid,
    ) -> Result<C, AppError> {
        let update = Update::new().push(list.field(), child.to_string());
        Self::apply::<C>(tx, container, list, &update).await
    }

    /// Retira `child` da lista do container (exclusão lógica do filho).
    pub async fn unlink_child<C: Document>(
        tx: &mut TxContext,
        container: Uuid,
        list: ChildList,
        child: Uuid,
    ) -> Result<C, AppError> {
        let update = Update::new().pull(list.field(), child.to_string());
        Self::apply::<C>(tx, container, list, &update).await
    }

    async fn apply<C: Document>(
        tx: &mut TxContext,
        container: Uuid,
        list: ChildList,
        update: &Update,
    ) -> Result<C, AppError> {
        if list.container() != C::COLLECTION {
            return Err(AppError::InternalServerError(anyhow!(
                "a lista `{}` não pertence à coleção {}",
                list.field(),
                C::COLLECTION.as_str()
            )));
        }

        let filter = SoftDeleteFilter::visible(Filter::by_id(container));
        tx.find_one_and_update::<C>(&filter, update)
            .await?
            .ok_or_else(|| AppError::not_found(C::ENTITY))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::db::memory_store::MemoryStore;
    use crate::db::store::Collection;
    use crate::models::app::App;
    use crate::models::organization::Organization;
    use crate::services::transaction::TransactionRunner;

    async fn seeded_app(runner: &TransactionRunner) -> App {
        let app = App::new("Vendas".into(), None, None, Uuid::new_v4());
        runner
            .run(move |tx| Box::pin(async move { tx.insert(&app).await }))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn link_then_unlink_round_trips_the_list() {
        let store = MemoryStore::new();
        let runner = TransactionRunner::new(Arc::new(store.clone()));
        let app = seeded_app(&runner).await;
        let (app_id, screen) = (app.id, Uuid::new_v4());

        let linked: App = runner
            .run(move |tx| {
                Box::pin(async move {
                    CrossReferenceMaintainer::link_child::<App>(tx, app_id, ChildList::Screens, screen)
                        .await
                })
            })
            .await
            .unwrap();
        assert_eq!(linked.screens, vec![screen]);

        let unlinked: App = runner
            .run(move |tx| {
                Box::pin(async move {
                    CrossReferenceMaintainer::unlink_child::<App>(tx, app_id, ChildList::Screens, screen)
                        .await
                })
            })
            .await
            .unwrap();
        assert!(unlinked.screens.is_empty());
    }

    #[tokio::test]
    async fn missing_container_is_not_found_and_writes_nothing() {
        let store = MemoryStore::new();
        let runner = TransactionRunner::new(Arc::new(store.clone()));

        let result = runner
            .run(|tx| {
                Box::pin(async move {
                    CrossReferenceMaintainer::link_child::<App>(
                        tx,
                        Uuid::new_v4(),
                        ChildList::Resources,
                        Uuid::new_v4(),
                    )
                    .await
                })
            })
            .await;

        assert!(matches!(result, Err(AppError::NotFound { entity: "App" })));
        assert_eq!(store.raw_count(Collection::Apps).await, 0);
    }

    #[tokio::test]
    async fn list_of_another_collection_is_rejected() {
        let store = MemoryStore::new();
        let runner = TransactionRunner::new(Arc::new(store.clone()));
        let app = seeded_app(&runner).await;
        let app_id = app.id;

        let result = runner
            .run(move |tx| {
                Box::pin(async move {
                    CrossReferenceMaintainer::link_child::<Organization>(
                        tx,
                        app_id,
                        ChildList::Resources,
                        Uuid::new_v4(),
                    )
                    .await
                })
            })
            .await;

        assert!(matches!(result, Err(AppError::InternalServerError(_))));
    }
}
