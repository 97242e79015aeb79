//! Case-insensitive substring search over table rows.

use tracing::debug;

use super::{Result, Row, Table};

/// Result of a search: either the matching rows or an explicit "nothing".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Matching rows, in table order.
    Found(Vec<Row>),
    /// No row matched the query.
    NoMatches,
}

impl SearchOutcome {
    fn from_rows(rows: Vec<Row>) -> Self {
        if rows.is_empty() {
            SearchOutcome::NoMatches
        } else {
            SearchOutcome::Found(rows)
        }
    }

    /// Matching rows; empty for `NoMatches`.
    pub fn rows(&self) -> &[Row] {
        match self {
            SearchOutcome::Found(rows) => rows,
            SearchOutcome::NoMatches => &[],
        }
    }

    /// Number of matching rows.
    pub fn match_count(&self) -> usize {
        self.rows().len()
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, SearchOutcome::NoMatches)
    }
}

impl Table {
    /// Find rows where any field contains `query`, ignoring case.
    ///
    /// Each matching row appears once, in table order.
    pub fn search(&self, query: &str) -> SearchOutcome {
        let query_lower = query.to_lowercase();
        let rows: Vec<Row> = self
            .rows()
            .iter()
            .filter(|row| row.iter().any(|field| contains_ignore_case(field, &query_lower)))
            .cloned()
            .collect();

        debug!(query, matches = rows.len(), "Whole-row search");
        SearchOutcome::from_rows(rows)
    }

    /// Find rows whose field at `column_index` contains `query`, ignoring case.
    pub fn search_column(&self, column_index: usize, query: &str) -> Result<SearchOutcome> {
        self.check_column(column_index)?;

        let query_lower = query.to_lowercase();
        let rows: Vec<Row> = self
            .rows()
            .iter()
            .filter(|row| contains_ignore_case(&row[column_index], &query_lower))
            .cloned()
            .collect();

        debug!(query, column = column_index, matches = rows.len(), "Column search");
        Ok(SearchOutcome::from_rows(rows))
    }
}

/// `query_lower` must already be lowercased.
fn contains_ignore_case(field: &str, query_lower: &str) -> bool {
    field.to_lowercase().contains(query_lower)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::TableError;

    fn table() -> Table {
        let mut table = Table::new(["Reg No", "Name", "Course"]);
        for fields in [
            ["A1", "Alice", "CS"],
            ["A2", "Bob", "EE"],
            ["B7", "Carla", "Chemistry"],
        ] {
            table
                .insert(fields.iter().map(|f| f.to_string()).collect())
                .unwrap();
        }
        table
    }

    #[test]
    fn test_search_case_insensitive() {
        let outcome = table().search("ALI");
        assert_eq!(outcome.match_count(), 1);
        assert_eq!(outcome.rows()[0][1], "Alice");
    }

    #[test]
    fn test_search_scans_every_field() {
        // "c" hits Alice (Alice, CS) and Carla; each row only once.
        let outcome = table().search("c");
        let names: Vec<&str> = outcome.rows().iter().map(|r| r[1].as_str()).collect();
        assert_eq!(names, ["Alice", "Carla"]);
    }

    #[test]
    fn test_search_no_matches() {
        let outcome = table().search("zzz");
        assert_eq!(outcome, SearchOutcome::NoMatches);
        assert!(outcome.is_empty());
        assert!(outcome.rows().is_empty());
    }

    #[test]
    fn test_empty_query_matches_all() {
        assert_eq!(table().search("").match_count(), 3);
    }

    #[test]
    fn test_search_column_restricts_fields() {
        let table = table();
        let outcome = table.search_column(2, "c").unwrap();
        let names: Vec<&str> = outcome.rows().iter().map(|r| r[1].as_str()).collect();
        assert_eq!(names, ["Alice", "Carla"]);

        let outcome = table.search_column(0, "b").unwrap();
        assert_eq!(outcome.rows()[0][0], "B7");
        assert_eq!(outcome.match_count(), 1);
    }

    #[test]
    fn test_search_column_out_of_range() {
        let err = table().search_column(5, "x").unwrap_err();
        assert!(matches!(err, TableError::IndexOutOfRange { index: 5, len: 3 }));
    }

    #[test]
    fn test_search_non_ascii() {
        let mut table = Table::new(["name"]);
        table.insert(vec!["ÉLODIE".to_string()]).unwrap();
        assert_eq!(table.search("élo").match_count(), 1);
    }
}
