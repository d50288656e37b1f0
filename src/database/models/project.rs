use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::filter::{FilterField, Listable};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Listable for Project {
    const NAME: &'static str = "Project";
    const TABLE: &'static str = "projects";
    const COLUMNS: &'static [&'static str] =
        &["id", "name", "description", "created_by", "created_at", "updated_at"];
    const SCOPES: &'static [FilterField] = &[FilterField::uuid("created_by")];
    const EQUALITY_FILTERS: &'static [FilterField] = &[];
    const SEARCH_FIELDS: &'static [&'static str] = &["name", "description"];
}
