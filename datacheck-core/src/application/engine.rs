// datacheck-core/src/application/engine.rs

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, instrument, warn};

use crate::application::accessor::{LiveTableAccessor, PreviewSampleAccessor};
use crate::application::evaluators::{CheckTarget, EvaluatorRegistry};
use crate::domain::check::{CheckDefinition, CheckKind, CheckOutcome, DatasetReference};
use crate::domain::error::DomainError;
use crate::error::DataCheckError;
use crate::ports::accessor::DatasetAccessor;
use crate::ports::gateway::RelationalGateway;
use crate::ports::store::{ConnectionRegistry, DatasetRegistry, DefinitionStore};

/// Collaborators the engine reads from and writes to.
#[derive(Clone)]
pub struct EngineDeps {
    pub definitions: Arc<dyn DefinitionStore>,
    pub connections: Arc<dyn ConnectionRegistry>,
    pub datasets: Arc<dyn DatasetRegistry>,
    pub gateway: Arc<dyn RelationalGateway>,
}

struct Job {
    check: CheckDefinition,
    reply: oneshot::Sender<CheckOutcome>,
}

struct EngineCore {
    deps: EngineDeps,
    registry: EvaluatorRegistry,
}

/// Runs validation checks in the background.
///
/// Built once at startup and shared by handle. Submitted runs go through a
/// bounded queue to a dispatcher that spawns one task per run; runs are not
/// de-duplicated and there is no limit on how many execute at once.
#[derive(Clone)]
pub struct ValidationEngine {
    core: Arc<EngineCore>,
    queue: mpsc::Sender<Job>,
}

/// Acknowledgement of a submitted run. Dropping it detaches the run, which
/// still completes and persists its outcome.
#[derive(Debug)]
pub struct RunTicket {
    check_id: String,
    receiver: oneshot::Receiver<CheckOutcome>,
}

impl RunTicket {
    pub fn check_id(&self) -> &str {
        &self.check_id
    }

    /// Waits for the run to finish and returns the outcome it persisted.
    pub async fn wait(self) -> Result<CheckOutcome, DataCheckError> {
        self.receiver.await.map_err(|_| {
            DataCheckError::InternalError(format!(
                "validation run for '{}' ended without an outcome",
                self.check_id
            ))
        })
    }
}

impl ValidationEngine {
    /// Starts the dispatcher on the current Tokio runtime.
    pub fn start(deps: EngineDeps, registry: EvaluatorRegistry, queue_capacity: usize) -> Self {
        let unsupported: Vec<&str> = CheckKind::ALL
            .iter()
            .filter(|kind| registry.get(**kind).is_err())
            .map(CheckKind::as_str)
            .collect();
        if !unsupported.is_empty() {
            debug!(kinds = ?unsupported, "Check kinds without an evaluator will record an error outcome");
        }

        let core = Arc::new(EngineCore { deps, registry });
        let (queue, receiver) = mpsc::channel(queue_capacity.max(1));
        tokio::spawn(dispatch(core.clone(), receiver));

        info!(queue_capacity, "Validation engine started");
        Self { core, queue }
    }

    pub fn registry(&self) -> &EvaluatorRegistry {
        &self.core.registry
    }

    /// Queues a run of `check_id`.
    ///
    /// Never waits on the queue: when it is full the run is refused with
    /// [`DataCheckError::QueueFull`]. An unknown check is rejected here and
    /// nothing is queued. Anything that goes wrong after that ends up in a
    /// persisted error outcome.
    #[instrument(skip(self))]
    pub async fn submit(&self, check_id: &str) -> Result<RunTicket, DataCheckError> {
        let check = self
            .core
            .deps
            .definitions
            .get_check(check_id)
            .await?
            .ok_or_else(|| DomainError::CheckNotFound(check_id.to_string()))?;

        let (reply, receiver) = oneshot::channel();
        self.queue
            .try_send(Job { check, reply })
            .map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => {
                    warn!("Validation queue full, run refused");
                    DataCheckError::QueueFull(self.queue.max_capacity())
                }
                mpsc::error::TrySendError::Closed(_) => {
                    DataCheckError::InternalError("validation engine has stopped".into())
                }
            })?;

        debug!("Validation run queued");
        Ok(RunTicket {
            check_id: check_id.to_string(),
            receiver,
        })
    }

    /// Executes `check` on the caller's task, bypassing the queue.
    pub async fn run_now(&self, check: &CheckDefinition) -> CheckOutcome {
        self.core.execute(check).await
    }
}

async fn dispatch(core: Arc<EngineCore>, mut receiver: mpsc::Receiver<Job>) {
    while let Some(job) = receiver.recv().await {
        let core = core.clone();
        tokio::spawn(async move {
            let outcome = core.execute(&job.check).await;
            // The trigger may have dropped its ticket.
            let _ = job.reply.send(outcome);
        });
    }
    debug!("Validation queue closed");
}

impl EngineCore {
    #[instrument(name = "validation_run", skip_all, fields(check.id = %check.id, check.kind = %check.kind))]
    async fn execute(&self, check: &CheckDefinition) -> CheckOutcome {
        let outcome = match self.evaluate(check).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "Validation run failed");
                CheckOutcome::errored(check, e.to_string())
            }
        };

        if let Err(e) = self.deps.definitions.put_outcome(&outcome).await {
            error!(outcome.id = %outcome.id, error = %e, "Could not persist validation outcome");
        }

        info!(
            outcome.id = %outcome.id,
            status = %outcome.status,
            "Validation run finished"
        );
        outcome
    }

    async fn evaluate(&self, check: &CheckDefinition) -> Result<CheckOutcome, DataCheckError> {
        // Looked up first so an unsupported kind never touches the dataset.
        let evaluator = self.registry.get(check.kind)?;
        let accessor = self.resolve(check).await?;

        let started = Instant::now();
        let evaluation = evaluator
            .evaluate(accessor.as_ref(), &CheckTarget::of(check))
            .await?;
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        Ok(CheckOutcome::completed(check, evaluation, elapsed_ms))
    }

    /// Fresh accessor per run. A live accessor owns its session, so the
    /// connection closes when the run drops it, on every exit path.
    async fn resolve(
        &self,
        check: &CheckDefinition,
    ) -> Result<Box<dyn DatasetAccessor>, DataCheckError> {
        match &check.dataset {
            DatasetReference::Relational { connection_id } => {
                let connection = self
                    .deps
                    .connections
                    .get_connection(connection_id)
                    .await?
                    .ok_or_else(|| DomainError::ConnectionNotFound(connection_id.clone()))?;
                let table = check.table.as_deref().ok_or_else(|| {
                    DomainError::InvalidDefinition(format!(
                        "check '{}' targets a relational dataset without a table",
                        check.id
                    ))
                })?;
                let accessor =
                    LiveTableAccessor::open(self.deps.gateway.as_ref(), &connection, table).await?;
                Ok(Box::new(accessor))
            }
            DatasetReference::Tabular { file_dataset_id } => {
                let dataset = self
                    .deps
                    .datasets
                    .get_dataset(file_dataset_id)
                    .await?
                    .ok_or_else(|| DomainError::DatasetNotFound(file_dataset_id.clone()))?;
                Ok(Box::new(PreviewSampleAccessor::new(dataset.id, dataset.preview)))
            }
        }
    }
}
