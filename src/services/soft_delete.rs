// src/services/soft_delete.rs

//! Visibilidade de documentos com exclusão lógica.
//!
//! Nada é apagado fisicamente: excluir move `status` para `deleted`, e toda
//! leitura comum passa por `visible`. Só `MemoryStore::raw_get` enxerga o resto.

use serde_json::Value;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::common::pagination::{Page, PageLimits, PageParams};
use crate::db::store::{Document, Filter, Update, Window};
use crate::services::transaction::TxContext;

pub const DELETED: &str = "deleted";

pub struct SoftDeleteFilter;

impl SoftDeleteFilter {
    /// Restringe o filtro aos documentos não excluídos.
    pub fn visible(filter: Filter) -> Filter {
        filter.ne("status", DELETED)
    }

    /// Alvo de uma exclusão: só casa com quem ainda não foi excluído, então
    /// excluir duas vezes cai em `NotFound`.
    pub fn deletable(filter: Filter) -> Filter {
        filter.ne("status", DELETED)
    }

    pub fn mark_deleted() -> Update {
        Update::new().set("status", DELETED)
    }

    /// Página normalizada + janela de leitura na ordem canônica.
    pub fn list_window(limits: &PageLimits, params: &PageParams) -> (Page, Window) {
        let page = limits.clamp(params);
        let window = Window {
            skip: page.skip(),
            limit: Some(page.limit),
        };
        (page, window)
    }

    /// Atualizações mudam entre estados visíveis; `deleted` só pela exclusão.
    pub fn reject_deleted_status(status: Option<&str>) -> Result<(), AppError> {
        match status {
            Some(DELETED) => Err(AppError::InvalidInput(
                "Use a exclusão para remover o registro".into(),
            )),
            _ => Ok(()),
        }
    }

    /// Nomes são únicos dentro do escopo, contando só os não excluídos.
    pub async fn ensure_name_available<D: Document>(
        tx: &mut TxContext,
        scope: Filter,
        name: &str,
        except: Option<Uuid>,
    ) -> Result<(), AppError> {
        let mut filter = Self::visible(scope.eq("name", name));
        if let Some(id) = except {
            filter = filter.ne("id", Value::String(id.to_string()));
        }

        if tx.find_one::<D>(&filter).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "{}: o nome '{name}' já está em uso",
                D::ENTITY
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn visible_hides_deleted_documents() {
        let filter = SoftDeleteFilter::visible(Filter::new());
        assert!(filter.matches(&json!({ "status": "enabled" })));
        assert!(!filter.matches(&json!({ "status": "deleted" })));
    }

    #[test]
    fn list_window_clamps_the_limit() {
        let limits = PageLimits::default();
        let (page, window) = SoftDeleteFilter::list_window(
            &limits,
            &PageParams {
                page: Some(2),
                limit: Some(1_000),
            },
        );

        assert_eq!(page.limit, 100);
        assert_eq!(window.skip, 200);
        assert_eq!(window.limit, Some(100));

        let (page, _) = SoftDeleteFilter::list_window(
            &limits,
            &PageParams {
                page: None,
                limit: Some(0),
            },
        );
        assert_eq!(page.limit, 1);
        assert_eq!(page.page, 0);
    }

    #[test]
    fn deleted_is_not_a_valid_update_status() {
        assert!(SoftDeleteFilter::reject_deleted_status(Some("deleted")).is_err());
        assert!(SoftDeleteFilter::reject_deleted_status(Some("disabled")).is_ok());
        assert!(SoftDeleteFilter::reject_deleted_status(None).is_ok());
    }
}
