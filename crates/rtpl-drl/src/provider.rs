//! Template data providers: where template keys get their values.

use rtpl_model::Row;

/// Resolves template keys to values for one marshal pass.
///
/// `None` and the empty string both mean the key has no value.
pub trait TemplateDataProvider {
    fn template_key_value(&self, key: &str) -> Option<&str>;
}

/// Resolves keys against one row, matching keys to column names.
#[derive(Debug, Clone, Copy)]
pub struct RowDataProvider<'a> {
    columns: &'a [String],
    row: &'a Row,
}

impl<'a> RowDataProvider<'a> {
    pub fn new(columns: &'a [String], row: &'a Row) -> Self {
        Self { columns, row }
    }
}

impl TemplateDataProvider for RowDataProvider<'_> {
    fn template_key_value(&self, key: &str) -> Option<&str> {
        self.columns
            .iter()
            .position(|column| column == key)
            .and_then(|index| self.row.get(index))
            .filter(|value| !value.is_empty())
    }
}

/// A provider with no values at all. Every template fragment is suppressed.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyDataProvider;

impl TemplateDataProvider for EmptyDataProvider {
    fn template_key_value(&self, _key: &str) -> Option<&str> {
        None
    }
}

/// Iterates a table of rows in order.
#[derive(Debug, Clone)]
pub struct ArrayDataProvider<'a> {
    rows: &'a [Row],
    next: usize,
}

impl<'a> ArrayDataProvider<'a> {
    pub fn new(rows: &'a [Row]) -> Self {
        Self { rows, next: 0 }
    }

    pub fn has_next(&self) -> bool {
        self.next < self.rows.len()
    }
}

impl<'a> Iterator for ArrayDataProvider<'a> {
    type Item = &'a Row;

    fn next(&mut self) -> Option<Self::Item> {
        let row = self.rows.get(self.next)?;
        self.next += 1;
        Some(row)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.rows.len() - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ArrayDataProvider<'_> {}
