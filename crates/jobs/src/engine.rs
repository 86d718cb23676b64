use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;
use sched_core::{
    compute_soft_scores, detect, detect_indexed, view, ConstraintCatalog, DetectOptions,
    EngineError, EntryIndex, EvalContext, GenerationRequest, Generator, Snapshot,
};
use tracing::{info, warn};
use types::{
    CommitOutcome, Conflict, EngineStats, EntryId, GenerationMethod, GenerationParams,
    GenerationRecord, GenerationStatus, GenerationSummary, MoveRequest, MoveVerdict, Scope,
    SoftBreakdown, TimetableEntry, ViewFilter,
};
use uuid::Uuid;

use crate::repo::Repository;

pub(crate) fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// The timetable service over a storage collaborator.
///
/// Each scope has one async lock. Generation takes it with `try_lock` so a
/// second run for the same scope is refused rather than queued; commits wait
/// for it. Reads (conflicts, validation, view) never take it and work on
/// whatever entry set the repository returns.
pub struct Engine<G: Generator, R: Repository> {
    generator: Arc<G>,
    repo: Arc<R>,
    catalog: Arc<ConstraintCatalog>,
    defaults: GenerationParams,
    locks: Mutex<HashMap<Scope, Arc<tokio::sync::Mutex<()>>>>,
}

impl<G: Generator, R: Repository> Engine<G, R> {
    pub fn new(generator: G, repo: Arc<R>) -> Self {
        Self {
            generator: Arc::new(generator),
            repo,
            catalog: Arc::new(ConstraintCatalog::standard()),
            defaults: GenerationParams::default(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Parameters used when a request carries none.
    pub fn with_defaults(mut self, params: GenerationParams) -> Self {
        self.defaults = params;
        self
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repo
    }

    fn scope_lock(&self, scope: &Scope) -> Arc<tokio::sync::Mutex<()>> {
        self.locks.lock().entry(scope.clone()).or_default().clone()
    }

    async fn snapshot(&self) -> Result<Snapshot, EngineError> {
        Ok(Snapshot::new(self.repo.catalog().await?)?)
    }

    async fn locate(&self, id: &EntryId) -> Result<Scope, EngineError> {
        self.repo
            .find_entry(id)
            .await?
            .map(|(scope, _)| scope)
            .ok_or_else(|| EngineError::EntryNotFound(id.clone()))
    }

    fn check(
        &self,
        snapshot: &Snapshot,
        entries: &[TimetableEntry],
        req: &MoveRequest,
    ) -> Result<(MoveVerdict, TimetableEntry), EngineError> {
        let index = EntryIndex::build(entries.iter().cloned());
        sched_core::validate_move(snapshot, &self.catalog, &index, req)
    }

    pub async fn generate(
        &self,
        scope: Scope,
        method: GenerationMethod,
        params: Option<GenerationParams>,
    ) -> Result<GenerationSummary, EngineError> {
        let lock = self.scope_lock(&scope);
        let Ok(_guard) = lock.try_lock_owned() else {
            warn!(%scope, "generation refused, scope busy");
            return Err(EngineError::ScopeBusy(scope));
        };

        let params = params.unwrap_or_else(|| self.defaults.clone());
        let snapshot = Arc::new(self.snapshot().await?);
        let current = self.repo.entries(&scope).await?;
        let started = Instant::now();
        let generation_id = Uuid::new_v4().to_string();
        let req = GenerationRequest {
            scope: scope.clone(),
            method,
            params: params.clone(),
            existing: current.value,
        };

        let record = |status, total_classes, total_units, success_rate| GenerationRecord {
            id: generation_id.clone(),
            scope: scope.clone(),
            method,
            status,
            total_classes,
            total_units,
            success_rate,
            elapsed_ms: started.elapsed().as_millis() as u64,
            seed: params.seed,
            created_at: now_secs(),
        };

        let outcome = match self.generator.generate(snapshot.clone(), req).await {
            Ok(o) => o,
            Err(e) => {
                warn!(%scope, error = %e, "generation failed");
                self.repo
                    .record_generation(record(GenerationStatus::Failed, 0, 0, 0.0))
                    .await?;
                return Err(e);
            }
        };

        if method != GenerationMethod::Manual {
            self.repo.replace_entries(&scope, outcome.entries.clone()).await?;
        }
        let index = EntryIndex::build(outcome.entries.iter().cloned());
        let conflicts = detect_indexed(
            &snapshot,
            &self.catalog,
            &index,
            DetectOptions {
                include_soft: false,
                detected_at: now_secs(),
            },
        );
        let conflict_count = conflicts.len();
        self.repo.append_conflicts(&scope, conflicts).await?;

        let status = if outcome.total_classes < outcome.total_units || outcome.exhausted {
            GenerationStatus::Partial
        } else {
            GenerationStatus::Completed
        };
        self.repo
            .record_generation(record(
                status,
                outcome.total_classes,
                outcome.total_units,
                outcome.success_rate,
            ))
            .await?;

        info!(
            %scope,
            %method,
            generation_id = %generation_id,
            placed = outcome.total_classes,
            success_rate = outcome.success_rate,
            conflicts = conflict_count,
            "generation stored"
        );

        Ok(GenerationSummary {
            generation_id,
            scope,
            method,
            total_classes: outcome.total_classes,
            success_rate: outcome.success_rate,
            unscheduled: outcome.unscheduled,
            exhausted: outcome.exhausted,
            conflicts: conflict_count,
        })
    }

    /// Runs the detector over the stored entries and appends what it finds.
    pub async fn list_conflicts(&self, scope: &Scope, include_soft: bool) -> Result<Vec<Conflict>, EngineError> {
        let snapshot = self.snapshot().await?;
        let entries = self.repo.entries(scope).await?;
        let conflicts = detect(
            &snapshot,
            &self.catalog,
            &entries.value,
            DetectOptions {
                include_soft,
                detected_at: now_secs(),
            },
        )?;
        self.repo.append_conflicts(scope, conflicts.clone()).await?;
        Ok(conflicts)
    }

    pub async fn validate_move(&self, req: &MoveRequest) -> Result<MoveVerdict, EngineError> {
        let snapshot = self.snapshot().await?;
        let scope = self.locate(&req.entry_id).await?;
        let entries = self.repo.entries(&scope).await?;
        Ok(self.check(&snapshot, &entries.value, req)?.0)
    }

    /// Validate, then apply under the scope lock. A move that fails its first
    /// validation comes back with `ok = false`; one that passed but is no
    /// longer legal against a newer entry set is a `ConcurrentModification`.
    pub async fn commit_move(&self, req: &MoveRequest) -> Result<CommitOutcome, EngineError> {
        let snapshot = self.snapshot().await?;
        let scope = self.locate(&req.entry_id).await?;
        let seen = self.repo.entries(&scope).await?;
        let (verdict, candidate) = self.check(&snapshot, &seen.value, req)?;
        if !verdict.ok {
            return Ok(CommitOutcome {
                ok: false,
                violations: verdict.violations,
                entry: None,
                version: seen.version,
            });
        }

        let lock = self.scope_lock(&scope);
        let _guard = lock.lock().await;
        let fresh = self.repo.entries(&scope).await?;
        let candidate = if fresh.version == seen.version {
            candidate
        } else {
            match self.check(&snapshot, &fresh.value, req) {
                Ok((v, c)) if v.ok => c,
                Ok((v, _)) => {
                    let detail = v
                        .violations
                        .iter()
                        .map(|x| x.description.as_str())
                        .collect::<Vec<_>>()
                        .join("; ");
                    warn!(%scope, entry = %req.entry_id, "move lost a race");
                    return Err(EngineError::ConcurrentModification { scope, detail });
                }
                Err(EngineError::EntryNotFound(id)) => {
                    return Err(EngineError::ConcurrentModification {
                        scope,
                        detail: format!("entry {id} was removed"),
                    });
                }
                Err(e) => return Err(e),
            }
        };

        let version = self
            .repo
            .update_entry(&scope, fresh.version, candidate.clone())
            .await?;
        info!(%scope, entry = %candidate.id, slot = %candidate.time_slot_id, version, "move committed");
        Ok(CommitOutcome {
            ok: true,
            violations: Vec::new(),
            entry: Some(candidate),
            version,
        })
    }

    pub async fn remove_entry(&self, id: &EntryId) -> Result<u64, EngineError> {
        let scope = self.locate(id).await?;
        let lock = self.scope_lock(&scope);
        let _guard = lock.lock().await;
        let version = self.repo.delete_entry(&scope, id).await?;
        info!(%scope, entry = %id, version, "entry removed");
        Ok(version)
    }

    pub async fn view(&self, scope: &Scope, filter: &ViewFilter) -> Result<Vec<TimetableEntry>, EngineError> {
        let snapshot = self.snapshot().await?;
        let entries = self.repo.entries(scope).await?;
        Ok(view::project(&snapshot, &entries.value, filter))
    }

    pub async fn explain(&self, scope: &Scope) -> Result<SoftBreakdown, EngineError> {
        let snapshot = self.snapshot().await?;
        let entries = self.repo.entries(scope).await?;
        snapshot.check_entries(&entries.value)?;
        let index = EntryIndex::build(entries.value);
        Ok(compute_soft_scores(
            &self.catalog,
            &EvalContext::new(&snapshot, &index),
        ))
    }

    pub async fn generations(&self) -> Result<Vec<GenerationRecord>, EngineError> {
        self.repo.generations().await
    }

    pub async fn stats(&self) -> Result<EngineStats, EngineError> {
        let cat = self.repo.catalog().await?;
        let history = self.repo.generations().await?;
        let last_generation = history
            .iter()
            .rev()
            .find(|g| g.status != GenerationStatus::Failed)
            .cloned();
        Ok(EngineStats {
            teachers: cat.teachers.len(),
            subjects: cat.subjects.len(),
            classrooms: cat.classrooms.len(),
            groups: cat.groups.len(),
            time_slots: cat.time_slots.len(),
            entries: self.repo.entry_count().await?,
            generations: history.len(),
            last_generation,
        })
    }
}
