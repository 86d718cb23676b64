use std::path::PathBuf;

use anyhow::{Context, Result};
use jobs::{Dataset, InMemRepository};
use types::GenerationParams;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;

/// Process configuration, read from `TIMETABLE__<SECTION>__<KEY>` variables.
#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub body_limit: usize,
    /// JSON dataset (catalog plus optional entries) seeding the store.
    pub data_path: Option<PathBuf>,
    pub generation: GenerationParams,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut generation = GenerationParams::default();
        if let Some(seed) = parse(&get, "TIMETABLE__GENERATION__SEED")? {
            generation.seed = seed;
        }
        if let Some(n) = parse(&get, "TIMETABLE__GENERATION__REPAIR_ITERATIONS")? {
            generation.repair_iterations = n;
        }
        generation.timeout_ms = parse(&get, "TIMETABLE__GENERATION__TIMEOUT_MS")?;

        Ok(Self {
            port: parse(&get, "TIMETABLE__SERVER__PORT")?.unwrap_or(DEFAULT_PORT),
            body_limit: parse(&get, "TIMETABLE__SERVER__BODY_LIMIT")?.unwrap_or(DEFAULT_BODY_LIMIT),
            data_path: get("TIMETABLE__DATA__PATH")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            generation,
        })
    }

    /// Builds the store from `data_path`, or an empty one when unset. The
    /// catalog is validated up front so a bad dataset stops the process.
    pub fn load_repository(&self) -> Result<InMemRepository> {
        let Some(path) = &self.data_path else {
            return Ok(InMemRepository::default());
        };
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading dataset {}", path.display()))?;
        let data: Dataset = serde_json::from_str(&raw)
            .with_context(|| format!("parsing dataset {}", path.display()))?;
        sched_core::validate(&data.catalog)
            .with_context(|| format!("validating dataset {}", path.display()))?;
        let repo = InMemRepository::from_dataset(data)?;
        Ok(repo)
    }
}

fn parse<T>(get: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match get(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{key}={raw:?} is not valid")),
    }
}
