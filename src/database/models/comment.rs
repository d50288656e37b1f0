use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::filter::{FilterField, Listable, SortDirection};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub issue_id: Uuid,
    /// Author
    pub user_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Listable for Comment {
    const NAME: &'static str = "Comment";
    const TABLE: &'static str = "comments";
    const COLUMNS: &'static [&'static str] =
        &["id", "issue_id", "user_id", "content", "created_at", "updated_at"];
    const SCOPES: &'static [FilterField] = &[FilterField::uuid("issue_id")];
    const EQUALITY_FILTERS: &'static [FilterField] = &[];
    const SEARCH_FIELDS: &'static [&'static str] = &[];
    const ORDER: SortDirection = SortDirection::Asc;
}
