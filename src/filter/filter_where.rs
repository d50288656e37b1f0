use super::types::SqlParam;

/// Accumulates `AND`-joined conditions and their positional `$n` parameters
pub struct FilterWhere {
    param_values: Vec<SqlParam>,
    param_index: usize,
    conditions: Vec<String>,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
            conditions: vec![],
        }
    }

    /// `"column" = $n`
    pub fn eq(&mut self, column: &str, value: SqlParam) -> &mut Self {
        let placeholder = self.param(value);
        self.conditions.push(format!("\"{}\" = {}", column, placeholder));
        self
    }

    /// Case-insensitive substring match over any of `columns`, sharing one parameter
    pub fn search(&mut self, columns: &[&str], term: &str) -> &mut Self {
        if columns.is_empty() { return self; }
        let placeholder = self.param(SqlParam::Text(format!("%{}%", Self::escape_like(term))));
        let alternatives: Vec<String> = columns
            .iter()
            .map(|c| format!("\"{}\" ILIKE {} ESCAPE '\\'", c, placeholder))
            .collect();
        self.conditions.push(format!("({})", alternatives.join(" OR ")));
        self
    }

    /// Returns the predicate without the `WHERE` keyword; empty when nothing was added
    pub fn finish(self) -> (String, Vec<SqlParam>) {
        (self.conditions.join(" AND "), self.param_values)
    }

    pub fn escape_like(term: &str) -> String {
        let mut escaped = String::with_capacity(term.len());
        for c in term.chars() {
            if matches!(c, '\\' | '%' | '_') { escaped.push('\\'); }
            escaped.push(c);
        }
        escaped
    }

    fn param(&mut self, value: SqlParam) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }
}
