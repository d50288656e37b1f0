use serde::{Deserialize, Deserializer};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::auth::ownership;
use crate::clock::Clock;
use crate::database::models::issue::{DEFAULT_PRIORITY, DEFAULT_STATUS};
use crate::database::models::Issue;
use crate::database::repository::select_clause;
use crate::database::{QueryContext, Repository};
use crate::error::ApiError;
use crate::filter::{Filter, FilterField, FilterSet, Page, PageRequest, Scope};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct NewIssue {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub project_id: Uuid,
    pub assigned_to: Option<Uuid>,
}

/// Partial update. `assigned_to` distinguishes absent (keep) from `null` (unassign).
#[derive(Debug, Default, Deserialize)]
pub struct IssueChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub assigned_to: Option<Option<Uuid>>,
}

/// Raw listing parameters as they arrive on the query string
#[derive(Debug, Default, Deserialize)]
pub struct IssueQuery {
    pub project_id: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub assigned_to: Option<String>,
    pub search: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

pub struct IssueService {
    pool: PgPool,
    clock: Arc<dyn Clock>,
}

impl IssueService {
    pub fn new(state: &AppState) -> Self {
        Self { pool: state.pool.clone(), clock: state.clock.clone() }
    }

    fn repository(&self) -> Repository<Issue> {
        Repository::new(self.pool.clone())
    }

    /// Scoped to `project_id` when given, otherwise to issues the caller created
    pub async fn list(&self, actor: Uuid, query: IssueQuery, page: PageRequest) -> Result<Page<Issue>, ApiError> {
        let scope = match query.project_id.as_deref().filter(|p| !p.is_empty()) {
            Some(raw) => Scope { column: "project_id", value: FilterField::uuid("project_id").parse(raw)? },
            None => Scope::new("created_by", actor),
        };
        let filters = FilterSet::new()
            .equal("status", query.status)
            .equal("priority", query.priority)
            .equal("assigned_to", query.assigned_to)
            .search(query.search);

        let filter = Filter::for_entity::<Issue>()?.scope(scope)?.apply(&filters)?;
        Ok(self.repository().list(filter, page).await?)
    }

    pub async fn create(&self, actor: Uuid, input: NewIssue) -> Result<Issue, ApiError> {
        let query = format!(
            "INSERT INTO issues (id, title, description, status, priority, project_id, created_by, assigned_to, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9) RETURNING {}",
            select_clause::<Issue>()
        );
        let id = Uuid::new_v4();
        let issue = sqlx::query_as::<_, Issue>(&query)
            .bind(id)
            .bind(input.title.trim())
            .bind(&input.description)
            .bind(non_empty(input.status).unwrap_or_else(|| DEFAULT_STATUS.to_string()))
            .bind(non_empty(input.priority).unwrap_or_else(|| DEFAULT_PRIORITY.to_string()))
            .bind(input.project_id)
            .bind(actor)
            .bind(input.assigned_to)
            .bind(self.clock.now())
            .fetch_one(&self.pool)
            .await
            .context("insert", "issues", Some(id))?;

        info!("User {} created issue {} in project {}", actor, issue.id, issue.project_id);
        Ok(issue)
    }

    pub async fn get(&self, id: Uuid) -> Result<Issue, ApiError> {
        Ok(self.repository().select_404(id).await?)
    }

    pub async fn update(&self, actor: Uuid, id: Uuid, changes: IssueChanges) -> Result<Issue, ApiError> {
        let existing = self.get(id).await?;
        ownership::ISSUE_UPDATE.enforce(actor, existing.created_by, "You can only update your own issues")?;

        let query = format!(
            "UPDATE issues SET title = COALESCE($2, title), description = COALESCE($3, description), \
             status = COALESCE($4, status), priority = COALESCE($5, priority), \
             assigned_to = CASE WHEN $6 THEN $7 ELSE assigned_to END, updated_at = $8 \
             WHERE id = $1 RETURNING {}",
            select_clause::<Issue>()
        );
        let (assign, assignee) = match changes.assigned_to {
            Some(value) => (true, value),
            None => (false, None),
        };
        sqlx::query_as::<_, Issue>(&query)
            .bind(id)
            .bind(changes.title.as_deref().map(str::trim))
            .bind(changes.description)
            .bind(non_empty(changes.status))
            .bind(non_empty(changes.priority))
            .bind(assign)
            .bind(assignee)
            .bind(self.clock.now())
            .fetch_optional(&self.pool)
            .await
            .context("update", "issues", Some(id))?
            .ok_or_else(|| ApiError::not_found("Issue not found"))
    }

    pub async fn delete(&self, actor: Uuid, id: Uuid) -> Result<(), ApiError> {
        let existing = self.get(id).await?;
        ownership::ISSUE_DELETE.enforce(actor, existing.created_by, "You can only delete your own issues")?;
        self.repository().delete_404(id).await?;
        info!("User {} deleted issue {}", actor, id);
        Ok(())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn absent_assignee_keeps_current() {
        let changes: IssueChanges = serde_json::from_value(json!({ "title": "x" })).unwrap();
        assert_eq!(changes.assigned_to, None);
    }

    #[test]
    fn null_assignee_unassigns() {
        let changes: IssueChanges = serde_json::from_value(json!({ "assigned_to": null })).unwrap();
        assert_eq!(changes.assigned_to, Some(None));
    }

    #[test]
    fn assignee_is_set() {
        let id = Uuid::new_v4();
        let changes: IssueChanges = serde_json::from_value(json!({ "assigned_to": id })).unwrap();
        assert_eq!(changes.assigned_to, Some(Some(id)));
    }

    #[test]
    fn blank_status_uses_default() {
        assert_eq!(non_empty(Some("  ".into())), None);
        assert_eq!(non_empty(Some(" closed ".into())), Some("closed".into()));
    }
}
