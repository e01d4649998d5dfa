//! Choosing the ride-log table among the tables found on one page.

use crate::table::DataTable;

/// Decides whether a table scraped from a ride-log page is the ride-log
/// table itself rather than an unrelated table rendered next to it.
///
/// Consulted only when a page holds more than one table; a lone table is
/// always taken. Closures `Fn(&DataTable) -> bool` implement this trait.
pub trait TableClassifier: Send + Sync {
    fn is_ridelog_table(&self, table: &DataTable) -> bool;
}

impl<F> TableClassifier for F
where
    F: Fn(&DataTable) -> bool + Send + Sync,
{
    fn is_ridelog_table(&self, table: &DataTable) -> bool {
        self(table)
    }
}

/// Rejects tables that carry a given column. The default rejects the
/// location table, which has a `city` column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExcludeColumn(pub String);

impl Default for ExcludeColumn {
    fn default() -> Self {
        Self("city".to_owned())
    }
}

impl TableClassifier for ExcludeColumn {
    fn is_ridelog_table(&self, table: &DataTable) -> bool {
        !table.has_column(&self.0)
    }
}

/// Applies the per-page selection rule: a single table is kept as is,
/// otherwise every table `classifier` accepts is kept, in page order.
pub fn select_tables(tables: Vec<DataTable>, classifier: &dyn TableClassifier) -> Vec<DataTable> {
    if tables.len() == 1 {
        return tables;
    }
    tables
        .into_iter()
        .filter(|t| classifier.is_ridelog_table(t))
        .collect()
}
