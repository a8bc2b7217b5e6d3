// datacheck-core/src/ports/mod.rs

pub mod accessor;
pub mod gateway;
pub mod store;

pub use accessor::{DatasetAccessor, ValueCount};
pub use gateway::{RelationalGateway, RelationalSession};
pub use store::{ConnectionRegistry, DatasetRegistry, DefinitionStore};
