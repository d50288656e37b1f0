use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::pagination::PageRequest;
use super::types::{FilterField, FilterOrderInfo, FilterSet, Listable, Scope, SqlParam, SqlResult};

/// A listing query over one entity table. Identifiers come from the entity's
/// static metadata; caller values only ever become bound parameters.
#[derive(Debug, Clone)]
pub struct Filter {
    table_name: &'static str,
    select_columns: &'static [&'static str],
    scopes: &'static [FilterField],
    equality_fields: &'static [FilterField],
    search_fields: &'static [&'static str],
    scope: Option<Scope>,
    equals: Vec<(&'static str, SqlParam)>,
    search: Option<String>,
    order_data: Vec<FilterOrderInfo>,
}

impl Filter {
    pub fn for_entity<T: Listable>() -> Result<Self, FilterError> {
        Self::validate_table_name(T::TABLE)?;
        Ok(Self {
            table_name: T::TABLE,
            select_columns: T::COLUMNS,
            scopes: T::SCOPES,
            equality_fields: T::EQUALITY_FILTERS,
            search_fields: T::SEARCH_FIELDS,
            scope: None,
            equals: vec![],
            search: None,
            order_data: FilterOrder::chronological(T::ORDER),
        })
    }

    pub fn table_name(&self) -> &'static str {
        self.table_name
    }

    /// Restrict the listing to one owner or parent
    pub fn scope(mut self, scope: Scope) -> Result<Self, FilterError> {
        if !self.scopes.iter().any(|f| f.name == scope.column) {
            return Err(FilterError::UnknownField(scope.column.to_string()));
        }
        self.scope = Some(scope);
        Ok(self)
    }

    pub fn apply(mut self, set: &FilterSet) -> Result<Self, FilterError> {
        for (name, raw) in &set.equals {
            let field = self
                .equality_fields
                .iter()
                .find(|f| f.name == *name)
                .ok_or_else(|| FilterError::UnknownField(name.to_string()))?;
            self.equals.push((field.name, field.parse(raw)?));
        }
        if let Some(term) = &set.search {
            if self.search_fields.is_empty() {
                return Err(FilterError::UnknownField("search".to_string()));
            }
            self.search = Some(term.clone());
        }
        Ok(self)
    }

    pub fn to_where_sql(&self) -> SqlResult {
        let mut filter_where = FilterWhere::new(0);
        if let Some(scope) = &self.scope {
            filter_where.eq(scope.column, scope.value.clone());
        }
        for (column, value) in &self.equals {
            filter_where.eq(column, value.clone());
        }
        if let Some(term) = &self.search {
            filter_where.search(self.search_fields, term);
        }
        let (query, params) = filter_where.finish();
        SqlResult { query, params }
    }

    pub fn to_count_sql(&self) -> SqlResult {
        let where_result = self.to_where_sql();
        let query = if where_result.query.is_empty() {
            format!("SELECT COUNT(*) AS count FROM \"{}\"", self.table_name)
        } else {
            format!("SELECT COUNT(*) AS count FROM \"{}\" WHERE {}", self.table_name, where_result.query)
        };
        SqlResult { query, params: where_result.params }
    }

    pub fn to_sql(&self) -> SqlResult {
        let where_result = self.to_where_sql();
        let query = [
            format!("SELECT {}", self.build_select_clause()),
            format!("FROM \"{}\"", self.table_name),
            if where_result.query.is_empty() { String::new() } else { format!("WHERE {}", where_result.query) },
            FilterOrder::generate(&self.order_data),
        ].into_iter().filter(|s| !s.is_empty()).collect::<Vec<_>>().join(" ");

        SqlResult { query, params: where_result.params }
    }

    /// `to_sql` with bound `LIMIT` / `OFFSET` appended after the predicate params
    pub fn to_page_sql(&self, page: &PageRequest) -> SqlResult {
        let SqlResult { query, mut params } = self.to_sql();
        let limit_index = params.len() + 1;
        params.push(SqlParam::Int(page.limit));
        params.push(SqlParam::Int(page.offset));
        SqlResult {
            query: format!("{} LIMIT ${} OFFSET ${}", query, limit_index, limit_index + 1),
            params,
        }
    }

    fn validate_table_name(name: &str) -> Result<(), FilterError> {
        let mut chars = name.chars();
        let valid_start = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_');
        if !valid_start || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(FilterError::InvalidTableName(format!("Invalid table name format: {}", name)));
        }
        Ok(())
    }

    fn build_select_clause(&self) -> String {
        if self.select_columns.is_empty() {
            "*".to_string()
        } else {
            self.select_columns.iter().map(|c| format!("\"{}\"", c)).collect::<Vec<_>>().join(", ")
        }
    }
}
