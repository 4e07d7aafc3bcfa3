pub mod memory_store;
pub use memory_store::MemoryStore;
pub mod postgres_store;
pub use postgres_store::PostgresStore;
pub mod store;
pub use store::{Collection, Document, DocumentStore, Filter, StoreTx, Update, Window};
