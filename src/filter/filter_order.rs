use super::types::{FilterOrderInfo, SortDirection};

pub struct FilterOrder;

impl FilterOrder {
    /// `created_at` in the given direction with `id` as tie-breaker, so the order is total
    pub fn chronological(sort: SortDirection) -> Vec<FilterOrderInfo> {
        vec![
            FilterOrderInfo { column: "created_at", sort },
            FilterOrderInfo { column: "id", sort },
        ]
    }

    pub fn generate(infos: &[FilterOrderInfo]) -> String {
        if infos.is_empty() { return String::new(); }
        let parts: Vec<String> = infos
            .iter()
            .map(|i| format!("\"{}\" {}", i.column, i.sort.to_sql()))
            .collect();
        format!("ORDER BY {}", parts.join(", "))
    }
}
