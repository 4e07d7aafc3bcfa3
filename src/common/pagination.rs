// src/common/pagination.rs

use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

/// Limites de paginação carregados da configuração.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub min: u64,
    pub max: u64,
    pub default: u64,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            min: 1,
            max: 100,
            default: 20,
        }
    }
}

impl PageLimits {
    /// Normaliza os parâmetros recebidos: `page >= 0` e `limit` em `[min, max]`.
    pub fn clamp(&self, params: &PageParams) -> Page {
        let limit = params
            .limit
            .unwrap_or(self.default)
            .clamp(self.min, self.max);

        Page {
            page: params.page.unwrap_or(0),
            limit,
        }
    }
}

// Query string `?page=&limit=` dos endpoints de listagem
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageParams {
    /// Página (começa em 0)
    pub page: Option<u64>,
    /// Itens por página
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: u64,
    pub limit: u64,
}

impl Page {
    pub fn skip(&self) -> u64 {
        self.page.saturating_mul(self.limit)
    }
}

// Resposta padrão das listagens
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, total: u64, page: Page) -> Self {
        Self {
            items,
            total,
            page: page.page,
            limit: page.limit,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_is_clamped_into_configured_range() {
        let limits = PageLimits::default();

        let too_big = limits.clamp(&PageParams { page: Some(2), limit: Some(10_000) });
        assert_eq!(too_big, Page { page: 2, limit: 100 });

        let zero = limits.clamp(&PageParams { page: None, limit: Some(0) });
        assert_eq!(zero, Page { page: 0, limit: 1 });

        let missing = limits.clamp(&PageParams::default());
        assert_eq!(missing.limit, 20);
    }

    #[test]
    fn skip_is_page_times_limit() {
        assert_eq!(Page { page: 3, limit: 25 }.skip(), 75);
        assert_eq!(Page { page: u64::MAX, limit: 2 }.skip(), u64::MAX);
    }
}
