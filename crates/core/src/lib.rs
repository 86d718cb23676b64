pub mod constraints;
pub mod detect;
pub mod error;
pub mod index;
pub mod moves;
pub mod requirements;
pub mod scoring;
pub mod snapshot;
pub mod view;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use async_trait::async_trait;

pub use constraints::{ConstraintCatalog, EvalContext, HardConstraint};
pub use detect::{detect, detect_indexed, hard_conflicts, DetectOptions};
pub use error::{EngineError, InputError};
pub use index::EntryIndex;
pub use moves::{relocated, validate_move};
pub use requirements::{expand, Expansion, RequirementUnit};
pub use scoring::{compute_soft_scores, SoftConstraint};
pub use snapshot::{validate, Snapshot};
pub use types::{
    Catalog, Conflict, GenerationMethod, GenerationOutcome, GenerationParams, MoveRequest,
    MoveVerdict, Scope, TimetableEntry,
};

#[derive(Clone, Debug)]
pub struct GenerationRequest {
    pub scope: Scope,
    pub method: GenerationMethod,
    pub params: GenerationParams,
    /// The scope's current entries; hybrid runs keep the manual ones.
    pub existing: Vec<TimetableEntry>,
}

#[async_trait]
pub trait Generator: Send + Sync + 'static {
    async fn generate(
        &self,
        snapshot: Arc<Snapshot>,
        req: GenerationRequest,
    ) -> Result<GenerationOutcome, EngineError>;
}
