//! Storage collaborator: entity pools, versioned entry sets per scope,
//! append-only conflict and generation history.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use parking_lot::RwLock;
use sched_core::EngineError;
use serde::{Deserialize, Serialize};
use types::{Catalog, Conflict, ConflictId, EntryId, GenerationRecord, Scope, TimetableEntry};

/// A value read together with the version it was read at.
#[derive(Clone, Debug)]
pub struct Versioned<T> {
    pub version: u64,
    pub value: T,
}

#[async_trait]
pub trait Repository: Send + Sync + 'static {
    async fn catalog(&self) -> Result<Catalog, EngineError>;

    async fn entries(&self, scope: &Scope) -> Result<Versioned<Vec<TimetableEntry>>, EngineError>;

    /// Full replace of a scope's entry set; returns the new version.
    async fn replace_entries(&self, scope: &Scope, entries: Vec<TimetableEntry>) -> Result<u64, EngineError>;

    async fn find_entry(&self, id: &EntryId) -> Result<Option<(Scope, TimetableEntry)>, EngineError>;

    /// Writes one entry if the scope is still at `expected`.
    async fn update_entry(&self, scope: &Scope, expected: u64, entry: TimetableEntry) -> Result<u64, EngineError>;

    async fn delete_entry(&self, scope: &Scope, id: &EntryId) -> Result<u64, EngineError>;

    async fn append_conflicts(&self, scope: &Scope, conflicts: Vec<Conflict>) -> Result<(), EngineError>;

    async fn record_generation(&self, record: GenerationRecord) -> Result<(), EngineError>;

    /// Oldest first.
    async fn generations(&self) -> Result<Vec<GenerationRecord>, EngineError>;

    async fn entry_count(&self) -> Result<usize, EngineError>;
}

/// Seed data for the in-memory store.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(flatten)]
    pub catalog: Catalog,
    #[serde(default)]
    pub entries: Vec<TimetableEntry>,
}

#[derive(Default)]
struct ScopeState {
    version: u64,
    entries: Vec<TimetableEntry>,
    conflicts: BTreeMap<ConflictId, Conflict>,
}

#[derive(Default)]
struct Store {
    catalog: Catalog,
    scopes: HashMap<Scope, ScopeState>,
    generations: Vec<GenerationRecord>,
}

#[derive(Default)]
pub struct InMemRepository {
    inner: RwLock<Store>,
}

impl InMemRepository {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            inner: RwLock::new(Store {
                catalog,
                ..Default::default()
            }),
        }
    }

    /// Entries are filed under their group's scope; entries whose group is
    /// unknown are rejected.
    pub fn from_dataset(data: Dataset) -> Result<Self, EngineError> {
        let mut store = Store {
            catalog: data.catalog,
            ..Default::default()
        };
        let scope_of: HashMap<_, _> = store
            .catalog
            .groups
            .iter()
            .map(|g| (g.id.clone(), g.scope()))
            .collect();
        for e in data.entries {
            let Some(scope) = scope_of.get(&e.group_id) else {
                return Err(sched_core::InputError::single(format!(
                    "entry {} references unknown group {}",
                    e.id, e.group_id
                ))
                .into());
            };
            let state = store.scopes.entry(scope.clone()).or_default();
            state.entries.push(e);
            state.version = 1;
        }
        Ok(Self {
            inner: RwLock::new(store),
        })
    }

    pub fn set_catalog(&self, catalog: Catalog) {
        self.inner.write().catalog = catalog;
    }

    /// Conflicts appended for a scope, one per id.
    pub fn stored_conflicts(&self, scope: &Scope) -> Vec<Conflict> {
        self.inner
            .read()
            .scopes
            .get(scope)
            .map(|s| s.conflicts.values().cloned().collect())
            .unwrap_or_default()
    }
}

fn stale(scope: &Scope, expected: u64, actual: u64) -> EngineError {
    EngineError::ConcurrentModification {
        scope: scope.clone(),
        detail: format!("expected version {expected}, found {actual}"),
    }
}

#[async_trait]
impl Repository for InMemRepository {
    async fn catalog(&self) -> Result<Catalog, EngineError> {
        Ok(self.inner.read().catalog.clone())
    }

    async fn entries(&self, scope: &Scope) -> Result<Versioned<Vec<TimetableEntry>>, EngineError> {
        let r = self.inner.read();
        Ok(r.scopes.get(scope).map_or(
            Versioned {
                version: 0,
                value: Vec::new(),
            },
            |s| Versioned {
                version: s.version,
                value: s.entries.clone(),
            },
        ))
    }

    async fn replace_entries(&self, scope: &Scope, entries: Vec<TimetableEntry>) -> Result<u64, EngineError> {
        let mut w = self.inner.write();
        let state = w.scopes.entry(scope.clone()).or_default();
        state.entries = entries;
        state.version += 1;
        Ok(state.version)
    }

    async fn find_entry(&self, id: &EntryId) -> Result<Option<(Scope, TimetableEntry)>, EngineError> {
        let r = self.inner.read();
        Ok(r.scopes.iter().find_map(|(scope, s)| {
            s.entries
                .iter()
                .find(|e| &e.id == id)
                .map(|e| (scope.clone(), e.clone()))
        }))
    }

    async fn update_entry(&self, scope: &Scope, expected: u64, entry: TimetableEntry) -> Result<u64, EngineError> {
        let mut w = self.inner.write();
        let state = w.scopes.entry(scope.clone()).or_default();
        if state.version != expected {
            return Err(stale(scope, expected, state.version));
        }
        let Some(slot) = state.entries.iter_mut().find(|e| e.id == entry.id) else {
            return Err(EngineError::EntryNotFound(entry.id));
        };
        *slot = entry;
        state.version += 1;
        Ok(state.version)
    }

    async fn delete_entry(&self, scope: &Scope, id: &EntryId) -> Result<u64, EngineError> {
        let mut w = self.inner.write();
        let state = w.scopes.entry(scope.clone()).or_default();
        let before = state.entries.len();
        state.entries.retain(|e| &e.id != id);
        if state.entries.len() == before {
            return Err(EngineError::EntryNotFound(id.clone()));
        }
        state.version += 1;
        Ok(state.version)
    }

    async fn append_conflicts(&self, scope: &Scope, conflicts: Vec<Conflict>) -> Result<(), EngineError> {
        let mut w = self.inner.write();
        let state = w.scopes.entry(scope.clone()).or_default();
        for c in conflicts {
            state.conflicts.insert(c.id.clone(), c);
        }
        Ok(())
    }

    async fn record_generation(&self, record: GenerationRecord) -> Result<(), EngineError> {
        self.inner.write().generations.push(record);
        Ok(())
    }

    async fn generations(&self) -> Result<Vec<GenerationRecord>, EngineError> {
        Ok(self.inner.read().generations.clone())
    }

    async fn entry_count(&self) -> Result<usize, EngineError> {
        Ok(self.inner.read().scopes.values().map(|s| s.entries.len()).sum())
    }
}
