use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::filter::{FilterField, Listable};

pub const DEFAULT_STATUS: &str = "open";
pub const DEFAULT_PRIORITY: &str = "medium";

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Issue {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: String,
    pub priority: String,
    pub project_id: Uuid,
    pub created_by: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Listable for Issue {
    const NAME: &'static str = "Issue";
    const TABLE: &'static str = "issues";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "title",
        "description",
        "status",
        "priority",
        "project_id",
        "created_by",
        "assigned_to",
        "created_at",
        "updated_at",
    ];
    const SCOPES: &'static [FilterField] =
        &[FilterField::uuid("project_id"), FilterField::uuid("created_by")];
    const EQUALITY_FILTERS: &'static [FilterField] = &[
        FilterField::text("status"),
        FilterField::text("priority"),
        FilterField::uuid("assigned_to"),
    ];
    const SEARCH_FIELDS: &'static [&'static str] = &["title", "description"];
}
