//! In-memory tables scraped from HTML `<table>` markup.
//!
//! Cells are kept as trimmed text; no type inference is attempted.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use crate::error::ScraperError;

static TABLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table").expect("valid table selector"));
static ROW_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr").expect("valid row selector"));

/// A header row plus string cells, every row as wide as the header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl DataTable {
    /// Builds a table, widening the header with `Unnamed: {i}` columns and
    /// padding short rows with empty cells so the shape is rectangular.
    ///
    /// Column names are made unique afterwards: a repeated name gets the
    /// first free `.1`, `.2`, ... suffix.
    #[must_use]
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(columns.len()))
            .max()
            .unwrap_or(0);

        let mut columns = columns;
        for i in columns.len()..width {
            columns.push(format!("Unnamed: {i}"));
        }
        let columns = unique_names(columns);

        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();

        Self { columns, rows }
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Stacks `tables` row-wise.
    ///
    /// The result's columns are the union of all input columns in order of
    /// first appearance; cells for columns a table lacks are left empty.
    #[must_use]
    pub fn concat<I>(tables: I) -> Self
    where
        I: IntoIterator<Item = DataTable>,
    {
        let tables: Vec<DataTable> = tables.into_iter().collect();

        let mut columns: Vec<String> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();
        for table in &tables {
            for column in &table.columns {
                if !positions.contains_key(column) {
                    positions.insert(column.clone(), columns.len());
                    columns.push(column.clone());
                }
            }
        }

        let mut rows = Vec::with_capacity(tables.iter().map(DataTable::len).sum());
        for table in tables {
            let mapping: Vec<usize> = table.columns.iter().map(|c| positions[c]).collect();
            for row in table.rows {
                let mut out = vec![String::new(); columns.len()];
                for (cell, &target) in row.into_iter().zip(&mapping) {
                    out[target] = cell;
                }
                rows.push(out);
            }
        }

        Self { columns, rows }
    }

    /// Serialises the table as CSV with a leading, unnamed, 0-based index
    /// column, e.g. `,Date,Rider` followed by `0,2024-05-01,alice`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Csv`] if the writer fails.
    pub fn to_csv_bytes(&self) -> Result<Vec<u8>, ScraperError> {
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        let header = std::iter::once("").chain(self.columns.iter().map(String::as_str));
        writer.write_record(header)?;

        for (index, row) in self.rows.iter().enumerate() {
            let index = index.to_string();
            let record = std::iter::once(index.as_str()).chain(row.iter().map(String::as_str));
            writer.write_record(record)?;
        }

        writer
            .into_inner()
            .map_err(|e| ScraperError::Csv(e.into_error().into()))
    }
}

/// Parses every `<table>` in `html`, using each table's first row as header.
///
/// Rows of nested tables are attributed only to the innermost table. Tables
/// without any row are skipped. Blank header cells become `Unnamed: {i}` and
/// repeated names get a `.1`, `.2`, ... suffix.
#[must_use]
pub fn parse_tables(html: &str) -> Vec<DataTable> {
    let document = Html::parse_document(html);
    document
        .select(&TABLE_SELECTOR)
        .filter_map(parse_table)
        .collect()
}

fn parse_table(table: ElementRef<'_>) -> Option<DataTable> {
    let mut rows = table
        .select(&ROW_SELECTOR)
        .filter(|tr| innermost_table(*tr).is_some_and(|t| t.id() == table.id()))
        .map(row_cells);

    let header = rows.next()?;
    let body: Vec<Vec<String>> = rows.collect();
    Some(DataTable::new(header_names(header), body))
}

fn innermost_table(row: ElementRef<'_>) -> Option<ElementRef<'_>> {
    row.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "table")
}

fn row_cells(row: ElementRef<'_>) -> Vec<String> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|el| matches!(el.value().name(), "th" | "td"))
        .map(|cell| cell_text(&cell))
        .collect()
}

fn cell_text(cell: &ElementRef<'_>) -> String {
    let raw: String = cell.text().collect();
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn header_names(raw: Vec<String>) -> Vec<String> {
    raw.into_iter()
        .enumerate()
        .map(|(i, name)| {
            if name.is_empty() {
                format!("Unnamed: {i}")
            } else {
                name
            }
        })
        .collect()
}

fn unique_names(names: Vec<String>) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::with_capacity(names.len());
    let mut suffixes: HashMap<String, usize> = HashMap::new();
    names
        .into_iter()
        .map(|name| {
            if taken.insert(name.clone()) {
                return name;
            }
            let suffix = suffixes.entry(name.clone()).or_insert(0);
            loop {
                *suffix += 1;
                let candidate = format!("{name}.{suffix}");
                if taken.insert(candidate.clone()) {
                    break candidate;
                }
            }
        })
        .collect()
}
