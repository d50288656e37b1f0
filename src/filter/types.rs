use uuid::Uuid;

use super::error::FilterError;

/// A bound query parameter. User-supplied values only ever travel as one of these.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    Uuid(Uuid),
    Int(i64),
}

impl From<String> for SqlParam {
    fn from(value: String) -> Self {
        SqlParam::Text(value)
    }
}

impl From<&str> for SqlParam {
    fn from(value: &str) -> Self {
        SqlParam::Text(value.to_string())
    }
}

impl From<Uuid> for SqlParam {
    fn from(value: Uuid) -> Self {
        SqlParam::Uuid(value)
    }
}

impl From<i64> for SqlParam {
    fn from(value: i64) -> Self {
        SqlParam::Int(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Uuid,
}

/// A column that callers may constrain by equality
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterField {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FilterField {
    pub const fn text(name: &'static str) -> Self {
        Self { name, kind: FieldKind::Text }
    }

    pub const fn uuid(name: &'static str) -> Self {
        Self { name, kind: FieldKind::Uuid }
    }

    /// Convert a raw caller value into a typed parameter for this column
    pub fn parse(&self, raw: &str) -> Result<SqlParam, FilterError> {
        match self.kind {
            FieldKind::Text => Ok(SqlParam::Text(raw.to_string())),
            FieldKind::Uuid => Uuid::parse_str(raw)
                .map(SqlParam::Uuid)
                .map_err(|_| FilterError::InvalidValue {
                    field: self.name.to_string(),
                    value: raw.to_string(),
                }),
        }
    }
}

/// Listing metadata an entity declares to get filtering, search and pagination
pub trait Listable {
    /// Human label used in not-found messages
    const NAME: &'static str = "Record";
    const TABLE: &'static str;
    const COLUMNS: &'static [&'static str];
    /// Columns a listing may be restricted to (owner, parent)
    const SCOPES: &'static [FilterField];
    const EQUALITY_FILTERS: &'static [FilterField];
    /// Text columns matched case-insensitively by `search`
    const SEARCH_FIELDS: &'static [&'static str];
    const ORDER: SortDirection = SortDirection::Desc;
}

/// Ownership or parent boundary of a listing
#[derive(Debug, Clone, PartialEq)]
pub struct Scope {
    pub column: &'static str,
    pub value: SqlParam,
}

impl Scope {
    pub fn new(column: &'static str, value: impl Into<SqlParam>) -> Self {
        Self { column, value: value.into() }
    }
}

/// Raw caller-supplied filters. Absent and empty values mean "no filter".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSet {
    pub equals: Vec<(&'static str, String)>,
    pub search: Option<String>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn equal(mut self, field: &'static str, value: Option<String>) -> Self {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            self.equals.push((field, value));
        }
        self
    }

    pub fn search(mut self, term: Option<String>) -> Self {
        self.search = term.filter(|t| !t.is_empty());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone)]
pub struct FilterOrderInfo {
    pub column: &'static str,
    pub sort: SortDirection,
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<SqlParam>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_values_are_not_filters() {
        let set = FilterSet::new()
            .equal("status", Some(String::new()))
            .equal("priority", None)
            .equal("assigned_to", Some("x".into()))
            .search(Some(String::new()));
        assert_eq!(set.equals, vec![("assigned_to", "x".to_string())]);
        assert_eq!(set.search, None);
    }

    #[test]
    fn uuid_fields_reject_garbage() {
        let field = FilterField::uuid("assigned_to");
        assert!(matches!(
            field.parse("not-a-uuid"),
            Err(FilterError::InvalidValue { ref field, .. }) if field == "assigned_to"
        ));

        let id = Uuid::new_v4();
        assert_eq!(field.parse(&id.to_string()).unwrap(), SqlParam::Uuid(id));
    }

    #[test]
    fn text_fields_take_value_verbatim() {
        let field = FilterField::text("status");
        assert_eq!(field.parse("In Progress").unwrap(), SqlParam::Text("In Progress".into()));
    }
}
