use std::sync::Arc;

use jobs::{Engine, InMemJobs, InMemRepository};
use solver_heur::HeurGenerator;

use crate::config::Config;

pub type TimetableEngine = Engine<HeurGenerator, InMemRepository>;

#[derive(Clone)]
pub struct AppState {
    pub jobs: InMemJobs<HeurGenerator, InMemRepository>,
}

impl AppState {
    pub fn new(repo: InMemRepository, config: &Config) -> Self {
        let engine = Engine::new(HeurGenerator::new(), Arc::new(repo))
            .with_defaults(config.generation.clone());
        Self {
            jobs: InMemJobs::new(Arc::new(engine)),
        }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self::new(config.load_repository()?, config))
    }

    pub fn engine(&self) -> &TimetableEngine {
        self.jobs.engine()
    }
}
