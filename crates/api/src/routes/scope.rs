use serde::Deserialize;
use types::Scope;
use utoipa::IntoParams;

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ScopeQuery {
    /// e.g. `2024-25`
    pub academic_year: String,
    pub semester: u8,
}

impl From<ScopeQuery> for Scope {
    fn from(q: ScopeQuery) -> Self {
        Scope::new(q.academic_year, q.semester)
    }
}
