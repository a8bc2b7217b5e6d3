// datacheck-core/src/application/evaluators/mod.rs

pub mod duplicate;
pub mod missing;

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::check::{CheckDefinition, CheckKind, Evaluation, Parameters};
use crate::domain::error::DomainError;
use crate::error::DataCheckError;
use crate::ports::accessor::DatasetAccessor;

pub use duplicate::DuplicateValueCheck;
pub use missing::MissingValueCheck;

/// The slice of a check definition an evaluator is allowed to see.
#[derive(Debug, Clone, Copy)]
pub struct CheckTarget<'a> {
    pub check_id: &'a str,
    pub table: Option<&'a str>,
    pub column: Option<&'a str>,
    pub parameters: &'a Parameters,
}

impl<'a> CheckTarget<'a> {
    pub fn of(check: &'a CheckDefinition) -> Self {
        Self {
            check_id: &check.id,
            table: check.table.as_deref(),
            column: check.column.as_deref(),
            parameters: &check.parameters,
        }
    }

    pub fn require_column(&self) -> Result<&'a str, DataCheckError> {
        self.column.ok_or_else(|| {
            DomainError::InvalidDefinition(format!("check '{}' has no target column", self.check_id))
                .into()
        })
    }
}

/// One implementation per check kind. Evaluators only measure and classify;
/// ids, timestamps and timing are stamped by the engine.
#[async_trait]
pub trait CheckEvaluator: Send + Sync {
    fn kind(&self) -> CheckKind;

    async fn evaluate(
        &self,
        accessor: &dyn DatasetAccessor,
        target: &CheckTarget<'_>,
    ) -> Result<Evaluation, DataCheckError>;
}

/// Dispatch table from check kind to evaluator, fixed once the engine starts.
#[derive(Clone, Default)]
pub struct EvaluatorRegistry {
    evaluators: BTreeMap<CheckKind, Arc<dyn CheckEvaluator>>,
}

impl EvaluatorRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_builtin() -> Self {
        Self::empty()
            .register(Arc::new(MissingValueCheck))
            .register(Arc::new(DuplicateValueCheck))
    }

    /// Later registrations for the same kind replace earlier ones.
    pub fn register(mut self, evaluator: Arc<dyn CheckEvaluator>) -> Self {
        self.evaluators.insert(evaluator.kind(), evaluator);
        self
    }

    pub fn get(&self, kind: CheckKind) -> Result<Arc<dyn CheckEvaluator>, DataCheckError> {
        self.evaluators
            .get(&kind)
            .cloned()
            .ok_or_else(|| DomainError::UnsupportedCheckKind(kind.to_string()).into())
    }

    pub fn supported_kinds(&self) -> Vec<CheckKind> {
        self.evaluators.keys().copied().collect()
    }
}

impl std::fmt::Debug for EvaluatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvaluatorRegistry")
            .field("kinds", &self.supported_kinds())
            .finish()
    }
}
