use sqlx::{self, postgres::PgRow, FromRow, PgPool};
use uuid::Uuid;

use crate::database::manager::{DatabaseError, QueryContext};
use crate::database::query_builder::QueryBuilder;
use crate::filter::{Filter, Listable, Page, PageRequest};

/// Generic read/delete access for a listable entity
pub struct Repository<T> {
    pool: PgPool,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Repository<T>
where
    T: Listable + for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _phantom: std::marker::PhantomData,
        }
    }

    /// Count and page from one read-only snapshot so `total` agrees with `items`
    pub async fn list(&self, filter: Filter, page: PageRequest) -> Result<Page<T>, DatabaseError> {
        let builder = QueryBuilder::<T>::new(filter);

        let mut tx = self.pool.begin().await.context("begin list", T::TABLE, None)?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await
            .context("begin list", T::TABLE, None)?;
        let total = builder.count(&mut *tx).await?;
        let items = builder.select_page(&mut *tx, &page).await?;
        tx.commit().await.context("commit list", T::TABLE, None)?;

        Ok(Page::new(items, total, page))
    }

    /// Every matching row, unpaged
    pub async fn select_all(&self, filter: Filter) -> Result<Vec<T>, DatabaseError> {
        QueryBuilder::<T>::new(filter).select_all(&self.pool).await
    }

    pub async fn select_optional(&self, id: Uuid) -> Result<Option<T>, DatabaseError> {
        let query = format!("SELECT {} FROM \"{}\" WHERE \"id\" = $1", select_clause::<T>(), T::TABLE);
        let row = sqlx::query_as::<_, T>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("select", T::TABLE, Some(id))?;
        Ok(row)
    }

    pub async fn select_404(&self, id: Uuid) -> Result<T, DatabaseError> {
        self.select_optional(id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("{} not found", T::NAME)))
    }

    pub async fn delete_404(&self, id: Uuid) -> Result<(), DatabaseError> {
        let query = format!("DELETE FROM \"{}\" WHERE \"id\" = $1", T::TABLE);
        let result = sqlx::query(&query)
            .bind(id)
            .execute(&self.pool)
            .await
            .context("delete", T::TABLE, Some(id))?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("{} not found", T::NAME)));
        }
        Ok(())
    }
}

/// Quoted column list for `T`, used by single-row statements in services
pub fn select_clause<T: Listable>() -> String {
    if T::COLUMNS.is_empty() {
        return "*".to_string();
    }
    T::COLUMNS.iter().map(|c| format!("\"{}\"", c)).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{Comment, Issue, Project};
    use sqlx::postgres::PgPoolOptions;
    use std::time::Duration;

    fn unreachable_pool() -> PgPool {
        PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(300))
            .connect_lazy("postgres://nobody@127.0.0.1:1/none")
            .unwrap()
    }

    #[test]
    fn select_clause_quotes_entity_columns() {
        let clause = select_clause::<Comment>();
        assert_eq!(clause, "\"id\", \"issue_id\", \"user_id\", \"content\", \"created_at\", \"updated_at\"");
        assert!(select_clause::<Issue>().contains("\"assigned_to\""));
    }

    #[tokio::test]
    async fn failed_lookup_names_table_and_id() {
        let id = Uuid::new_v4();
        let err = Repository::<Project>::new(unreachable_pool()).select_404(id).await.unwrap_err();
        assert!(matches!(
            err,
            DatabaseError::Storage { op: "select", entity: "projects", id: Some(got), .. } if got == id
        ));
    }

    #[tokio::test]
    async fn failed_listing_names_table() {
        let filter = Filter::for_entity::<Issue>().unwrap();
        let err = Repository::<Issue>::new(unreachable_pool())
            .list(filter, PageRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Storage { entity: "issues", id: None, .. }));
    }
}
