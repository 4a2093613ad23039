#![deny(unsafe_code)]

use serde::{Deserialize, Serialize};

use crate::rule::RuleModel;

/// One row of template data. Cells line up positionally with the rule's
/// template columns; `None` means no value was supplied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    pub cells: Vec<Option<String>>,
}

impl Row {
    pub fn new(cells: Vec<Option<String>>) -> Self {
        Self { cells }
    }

    /// Build a row from borrowed cells, e.g. `Row::from_cells(&[Some("foo"), None])`.
    pub fn from_cells(cells: &[Option<&str>]) -> Self {
        Self {
            cells: cells
                .iter()
                .map(|cell| cell.map(ToString::to_string))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cell at `index`; out-of-range and null cells are both `None`.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.cells.get(index).and_then(|cell| cell.as_deref())
    }
}

impl From<Vec<Option<String>>> for Row {
    fn from(cells: Vec<Option<String>>) -> Self {
        Self::new(cells)
    }
}

/// A rule paired with the table rows it is expanded over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateModel {
    pub rule: RuleModel,
    #[serde(default)]
    pub rows: Vec<Row>,
}

impl TemplateModel {
    pub fn new(rule: RuleModel) -> Self {
        Self {
            rule,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: impl Into<Row>) {
        self.rows.push(row.into());
    }

    pub fn with_row(mut self, row: impl Into<Row>) -> Self {
        self.push_row(row);
        self
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}
