// datacheck-core/src/domain/sql/mod.rs

pub mod builder;
pub mod quoter;

pub use builder::{GROUP_COUNT_ALIAS, GROUP_VALUE_ALIAS, QueryBuilder, SelectQuery};
pub use quoter::{IdentifierQuoter, QuotedIdent};
