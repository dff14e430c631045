pub mod error;
pub mod gateway;
pub mod kv;

pub use error::StoreError;
pub use gateway::{GatewayConfig, KvGateway, MAX_SAVED_DOCUMENTS, PersistenceGateway};
pub use kv::{FileStore, KeyValueStore, MemoryStore};
