use serde::Deserialize;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::auth::ownership;
use crate::clock::Clock;
use crate::database::models::Project;
use crate::database::repository::select_clause;
use crate::database::{QueryContext, Repository};
use crate::error::ApiError;
use crate::filter::{Filter, FilterSet, Page, PageRequest, Scope};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct NewProject {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProjectChanges {
    pub name: Option<String>,
    pub description: Option<String>,
}

pub struct ProjectService {
    pool: PgPool,
    clock: Arc<dyn Clock>,
}

impl ProjectService {
    pub fn new(state: &AppState) -> Self {
        Self { pool: state.pool.clone(), clock: state.clock.clone() }
    }

    fn repository(&self) -> Repository<Project> {
        Repository::new(self.pool.clone())
    }

    /// Projects created by `owner`, newest first
    pub async fn list(&self, owner: Uuid, search: Option<String>, page: PageRequest) -> Result<Page<Project>, ApiError> {
        let filter = Filter::for_entity::<Project>()?
            .scope(Scope::new("created_by", owner))?
            .apply(&FilterSet::new().search(search))?;
        Ok(self.repository().list(filter, page).await?)
    }

    pub async fn create(&self, owner: Uuid, input: NewProject) -> Result<Project, ApiError> {
        let query = format!(
            "INSERT INTO projects (id, name, description, created_by, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $5) RETURNING {}",
            select_clause::<Project>()
        );
        let id = Uuid::new_v4();
        let project = sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(input.name.trim())
            .bind(&input.description)
            .bind(owner)
            .bind(self.clock.now())
            .fetch_one(&self.pool)
            .await
            .context("insert", "projects", Some(id))?;

        info!("User {} created project {}", owner, project.id);
        Ok(project)
    }

    pub async fn get(&self, id: Uuid) -> Result<Project, ApiError> {
        Ok(self.repository().select_404(id).await?)
    }

    pub async fn update(&self, actor: Uuid, id: Uuid, changes: ProjectChanges) -> Result<Project, ApiError> {
        let existing = self.get(id).await?;
        ownership::PROJECT_UPDATE.enforce(actor, existing.created_by, "You can only update your own projects")?;

        let query = format!(
            "UPDATE projects SET name = COALESCE($2, name), description = COALESCE($3, description), \
             updated_at = $4 WHERE id = $1 RETURNING {}",
            select_clause::<Project>()
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(changes.name.as_deref().map(str::trim))
            .bind(changes.description)
            .bind(self.clock.now())
            .fetch_optional(&self.pool)
            .await
            .context("update", "projects", Some(id))?
            .ok_or_else(|| ApiError::not_found("Project not found"))
    }

    /// Issues and their comments go with the project
    pub async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        self.repository().delete_404(id).await?;
        info!("Deleted project {}", id);
        Ok(())
    }
}
