mod engine;
pub mod repo;

use parking_lot::RwLock;
use sched_core::Generator;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::error;
use types::{GenerationMethod, GenerationParams, GenerationSummary, Scope};
use utoipa::ToSchema;
use uuid::Uuid;

pub use engine::Engine;
pub use repo::{Dataset, InMemRepository, Repository, Versioned};

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, ToSchema)]
pub struct JobId(pub String);

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, ToSchema)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Running,
    Completed { summary: GenerationSummary },
    Failed { kind: String, message: String },
}

/// Background generation runs with pollable status.
pub struct InMemJobs<G: Generator, R: Repository> {
    inner: Arc<RwLock<HashMap<String, JobStatus>>>,
    engine: Arc<Engine<G, R>>,
}

impl<G: Generator, R: Repository> Clone for InMemJobs<G, R> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            engine: self.engine.clone(),
        }
    }
}

impl<G: Generator, R: Repository> InMemJobs<G, R> {
    pub fn new(engine: Arc<Engine<G, R>>) -> Self {
        Self {
            inner: Default::default(),
            engine,
        }
    }

    pub fn engine(&self) -> &Arc<Engine<G, R>> {
        &self.engine
    }

    pub fn enqueue(&self, scope: Scope, method: GenerationMethod, params: Option<GenerationParams>) -> JobId {
        let id = Uuid::new_v4().to_string();
        self.inner.write().insert(id.clone(), JobStatus::Queued);

        let map = self.inner.clone();
        let engine = self.engine.clone();
        let id_for_task = id.clone();

        tokio::spawn(async move {
            {
                let mut w = map.write();
                w.insert(id_for_task.clone(), JobStatus::Running);
            }
            match engine.generate(scope, method, params).await {
                Ok(summary) => {
                    map.write()
                        .insert(id_for_task, JobStatus::Completed { summary });
                }
                Err(e) => {
                    error!(error = %e, job = %id_for_task, "job failed");
                    map.write().insert(
                        id_for_task,
                        JobStatus::Failed {
                            kind: e.kind().to_string(),
                            message: e.to_string(),
                        },
                    );
                }
            }
        });

        JobId(id)
    }

    pub fn get(&self, id: &str) -> Option<JobStatus> {
        self.inner.read().get(id).cloned()
    }
}
