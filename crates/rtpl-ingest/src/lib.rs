//! Input loading for rule templates.
//!
//! A rule model (optionally with its rows) is read from JSON; row tables are
//! read from CSV and aligned to the rule's template columns.

pub mod error;
pub mod model;
pub mod table;

// === Errors ===
pub use error::{IngestError, Result};

// === Models ===
pub use model::{MAX_MODEL_FILE_SIZE, load_rule_model, load_template_model};

// === Row tables ===
pub use table::read_row_table;
