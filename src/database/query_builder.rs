use sqlx::{self, postgres::{PgArguments, PgRow}, FromRow, PgExecutor, Row};

use crate::database::manager::{DatabaseError, QueryContext};
use crate::filter::{Filter, PageRequest, SqlParam};

/// Executes a rendered `Filter` against any Postgres executor (pool, connection or transaction)
pub struct QueryBuilder<T> {
    filter: Filter,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> QueryBuilder<T>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    pub fn new(filter: Filter) -> Self {
        Self {
            filter,
            _phantom: std::marker::PhantomData,
        }
    }

    pub async fn select_all<'c, E>(&self, executor: E) -> Result<Vec<T>, DatabaseError>
    where
        E: PgExecutor<'c>,
    {
        let sql_result = self.filter.to_sql();
        let mut q = sqlx::query_as::<_, T>(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query_as(q, p);
        }
        q.fetch_all(executor).await.context("select", self.filter.table_name(), None)
    }

    pub async fn select_page<'c, E>(&self, executor: E, page: &PageRequest) -> Result<Vec<T>, DatabaseError>
    where
        E: PgExecutor<'c>,
    {
        let sql_result = self.filter.to_page_sql(page);
        tracing::debug!("{} page query: {}", self.filter.table_name(), sql_result.query);
        let mut q = sqlx::query_as::<_, T>(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query_as(q, p);
        }
        q.fetch_all(executor).await.context("select page", self.filter.table_name(), None)
    }

    pub async fn count<'c, E>(&self, executor: E) -> Result<i64, DatabaseError>
    where
        E: PgExecutor<'c>,
    {
        let sql_result = self.filter.to_count_sql();
        let mut q = sqlx::query(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query(q, p);
        }
        let table = self.filter.table_name();
        let row = q.fetch_one(executor).await.context("count", table, None)?;
        row.try_get::<i64, _>("count").context("count", table, None)
    }
}

fn bind_param_query<'q>(
    q: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    v: &SqlParam,
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
    match v {
        SqlParam::Text(s) => q.bind(s.clone()),
        SqlParam::Uuid(u) => q.bind(*u),
        SqlParam::Int(i) => q.bind(*i),
    }
}

fn bind_param_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>,
    v: &SqlParam,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, PgRow>,
{
    match v {
        SqlParam::Text(s) => q.bind(s.clone()),
        SqlParam::Uuid(u) => q.bind(*u),
        SqlParam::Int(i) => q.bind(*i),
    }
}
