// src/db/store.rs

//! Contrato do armazenamento de documentos usado pelo núcleo transacional.
//!
//! Qualquer backend (Postgres/JSONB ou memória) precisa oferecer:
//! transações multi-documento com rollback, `find_one_and_update` guardado por
//! filtro (incluindo push/pull em campos de lista) e buscas paginadas com
//! ordenação determinística (`updatedAt` desc, `id` desc).

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::common::error::AppError;

/// Coleções persistidas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Users,
    Organizations,
    Memberships,
    Apps,
    Resources,
    Queries,
    SourceFiles,
    Screens,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Organizations => "organizations",
            Collection::Memberships => "memberships",
            Collection::Apps => "apps",
            Collection::Resources => "resources",
            Collection::Queries => "queries",
            Collection::SourceFiles => "source_files",
            Collection::Screens => "screens",
        }
    }
}

/// Um tipo que vive numa coleção. Serializado em camelCase, com `id` e `status`.
pub trait Document: Serialize + DeserializeOwned + Send + Sync + 'static {
    const COLLECTION: Collection;
    /// Nome usado nas mensagens de erro.
    const ENTITY: &'static str;

    fn id(&self) -> Uuid;
}

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Eq(&'static str, Value),
    Ne(&'static str, Value),
    /// O campo é uma lista que contém o valor.
    Contains(&'static str, Value),
    /// O valor do campo está entre os valores dados.
    In(&'static str, Vec<Value>),
}

impl Condition {
    fn matches(&self, doc: &Value) -> bool {
        match self {
            Condition::Eq(field, value) => field_equals(doc, field, value),
            Condition::Ne(field, value) => !field_equals(doc, field, value),
            Condition::Contains(field, value) => doc
                .get(*field)
                .and_then(Value::as_array)
                .is_some_and(|items| items.contains(value)),
            Condition::In(field, values) => {
                let current = doc.get(*field).unwrap_or(&Value::Null);
                values.contains(current)
            }
        }
    }
}

// Campo ausente conta como `null`, igual ao `doc -> 'campo'` do Postgres.
fn field_equals(doc: &Value, field: &str, value: &Value) -> bool {
    match doc.get(field) {
        Some(current) => current == value,
        None => value.is_null(),
    }
}

/// Conjunção de condições sobre campos de primeiro nível.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn by_id(id: Uuid) -> Self {
        Self::new().eq("id", id.to_string())
    }

    pub fn eq(mut self, field: &'static str, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::Eq(field, value.into()));
        self
    }

    pub fn ne(mut self, field: &'static str, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::Ne(field, value.into()));
        self
    }

    pub fn contains(mut self, field: &'static str, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::Contains(field, value.into()));
        self
    }

    pub fn one_of(mut self, field: &'static str, values: Vec<Value>) -> Self {
        self.conditions.push(Condition::In(field, values));
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn matches(&self, doc: &Value) -> bool {
        self.conditions.iter().all(|c| c.matches(doc))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOp {
    Set(&'static str, Value),
    /// Acrescenta ao fim da lista (cria a lista se ausente).
    Push(&'static str, Value),
    /// Remove todas as ocorrências do valor da lista.
    Pull(&'static str, Value),
}

/// Mutação aplicada por `find_one_and_update`. O backend sempre atualiza `updatedAt`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Update {
    ops: Vec<UpdateOp>,
}

impl Update {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, field: &'static str, value: impl Into<Value>) -> Self {
        self.ops.push(UpdateOp::Set(field, value.into()));
        self
    }

    pub fn set_if(self, field: &'static str, value: Option<impl Into<Value>>) -> Self {
        match value {
            Some(value) => self.set(field, value),
            None => self,
        }
    }

    pub fn push(mut self, field: &'static str, value: impl Into<Value>) -> Self {
        self.ops.push(UpdateOp::Push(field, value.into()));
        self
    }

    pub fn pull(mut self, field: &'static str, value: impl Into<Value>) -> Self {
        self.ops.push(UpdateOp::Pull(field, value.into()));
        self
    }

    pub fn ops(&self) -> &[UpdateOp] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn apply(&self, doc: &mut Value) {
        let Value::Object(map) = doc else {
            return;
        };

        for op in &self.ops {
            match op {
                UpdateOp::Set(field, value) => {
                    map.insert((*field).to_string(), value.clone());
                }
                UpdateOp::Push(field, value) => {
                    let entry = map
                        .entry((*field).to_string())
                        .or_insert_with(|| Value::Array(Vec::new()));
                    match entry {
                        Value::Array(items) => items.push(value.clone()),
                        other => *other = Value::Array(vec![value.clone()]),
                    }
                }
                UpdateOp::Pull(field, value) => {
                    if let Some(Value::Array(items)) = map.get_mut(*field) {
                        items.retain(|item| item != value);
                    }
                }
            }
        }
    }
}

/// Janela de leitura: `skip` + `limit` opcional, sempre na ordem canônica.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Window {
    pub skip: u64,
    pub limit: Option<u64>,
}

impl Window {
    pub fn all() -> Self {
        Self::default()
    }
}

/// Resultado de `find_many`: a janela pedida e o total que casa com o filtro.
#[derive(Debug, Clone, Default)]
pub struct FoundPage {
    pub docs: Vec<Value>,
    pub total: u64,
}

/// Handle de transação. Toda operação de uma unidade de trabalho passa por aqui.
#[async_trait]
pub trait StoreTx: Send {
    async fn find_one(
        &mut self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Option<Value>, AppError>;

    async fn find_many(
        &mut self,
        collection: Collection,
        filter: &Filter,
        window: Window,
    ) -> Result<FoundPage, AppError>;

    /// Insere o documento (que precisa ter `id`) e devolve a versão gravada,
    /// com `createdAt`/`updatedAt` preenchidos pelo backend.
    async fn insert(&mut self, collection: Collection, doc: Value) -> Result<Value, AppError>;

    /// Atualiza atomicamente o primeiro documento (na ordem canônica) que casa
    /// com o filtro. `None` quando nenhum casa; nesse caso nada é escrito.
    async fn find_one_and_update(
        &mut self,
        collection: Collection,
        filter: &Filter,
        update: &Update,
    ) -> Result<Option<Value>, AppError>;

    async fn commit(self: Box<Self>) -> Result<(), AppError>;

    async fn rollback(self: Box<Self>) -> Result<(), AppError>;
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn StoreTx>, AppError>;
}

/// Lê o `id` de um documento cru.
pub(crate) fn document_id(doc: &Value) -> Result<Uuid, AppError> {
    doc.get("id")
        .and_then(Value::as_str)
        .and_then(|raw| Uuid::parse_str(raw).ok())
        .ok_or_else(|| AppError::InternalServerError(anyhow::anyhow!("documento sem `id` válido")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn filter_treats_missing_field_as_null() {
        let doc = json!({ "id": "a", "status": "active" });

        assert!(Filter::new().eq("organization", Value::Null).matches(&doc));
        assert!(Filter::new().ne("status", "deleted").matches(&doc));
        assert!(!Filter::new().eq("status", "deleted").matches(&doc));
    }

    #[test]
    fn filter_contains_and_one_of() {
        let doc = json!({ "id": "a", "resources": ["r1", "r2"], "role": "member" });

        assert!(Filter::new().contains("resources", "r2").matches(&doc));
        assert!(!Filter::new().contains("resources", "r3").matches(&doc));
        assert!(Filter::new()
            .one_of("role", vec![json!("owner"), json!("member")])
            .matches(&doc));
        assert!(!Filter::new().one_of("role", vec![json!("viewer")]).matches(&doc));
    }

    #[test]
    fn update_push_creates_list_and_pull_removes_every_copy() {
        let mut doc = json!({ "id": "a" });

        Update::new()
            .push("screens", "s1")
            .push("screens", "s2")
            .push("screens", "s1")
            .apply(&mut doc);
        assert_eq!(doc["screens"], json!(["s1", "s2", "s1"]));

        Update::new().pull("screens", "s1").set("name", "x").apply(&mut doc);
        assert_eq!(doc["screens"], json!(["s2"]));
        assert_eq!(doc["name"], json!("x"));
    }

    #[test]
    fn set_if_skips_absent_values() {
        let update = Update::new().set_if("name", None::<String>).set_if("status", Some("public"));
        assert_eq!(update.ops(), &[UpdateOp::Set("status", json!("public"))]);
    }
}
