use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use types::{Scope, TimetableEntry, ViewFilter};
use utoipa::{IntoParams, ToSchema};

use crate::error::{ApiError, ErrorBody};
use crate::state::AppState;

#[derive(Debug, Clone, Copy, Default, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ViewBy {
    #[default]
    All,
    Group,
    Teacher,
    Classroom,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ViewQuery {
    pub academic_year: String,
    pub semester: u8,
    #[serde(default)]
    #[param(inline)]
    pub by: ViewBy,
    /// Required unless `by=all`.
    #[serde(default)]
    pub id: Option<String>,
}

impl ViewQuery {
    fn filter(&self) -> Result<ViewFilter, ApiError> {
        let id = || {
            self.id
                .clone()
                .filter(|s| !s.is_empty())
                .ok_or_else(|| ApiError::bad_request("view filter needs an id"))
        };
        Ok(match self.by {
            ViewBy::All => ViewFilter::All,
            ViewBy::Group => ViewFilter::Group(id()?.as_str().into()),
            ViewBy::Teacher => ViewFilter::Teacher(id()?.as_str().into()),
            ViewBy::Classroom => ViewFilter::Classroom(id()?.as_str().into()),
        })
    }
}

#[utoipa::path(
    get,
    path = "/api/timetable/view",
    params(ViewQuery),
    responses(
        (status = 200, description = "Entries in grid order (day, period, group)", body = [TimetableEntry]),
        (status = 400, description = "Filter without an id", body = ErrorBody)
    )
)]
pub async fn view(
    State(state): State<AppState>,
    Query(q): Query<ViewQuery>,
) -> Result<Json<Vec<TimetableEntry>>, ApiError> {
    let filter = q.filter()?;
    let scope = Scope::new(q.academic_year, q.semester);
    Ok(Json(state.engine().view(&scope, &filter).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(by: ViewBy, id: Option<&str>) -> ViewQuery {
        ViewQuery {
            academic_year: "2024-25".into(),
            semester: 1,
            by,
            id: id.map(String::from),
        }
    }

    #[test]
    fn filter_needs_an_id_except_for_all() {
        assert!(matches!(query(ViewBy::All, None).filter(), Ok(ViewFilter::All)));
        assert!(matches!(
            query(ViewBy::Teacher, Some("t1")).filter(),
            Ok(ViewFilter::Teacher(t)) if t.as_str() == "t1"
        ));
        assert!(query(ViewBy::Group, None).filter().is_err());
        assert!(query(ViewBy::Classroom, Some("")).filter().is_err());
    }
}
