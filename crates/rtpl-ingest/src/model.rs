//! Rule model loading from JSON.

use std::fs;
use std::path::Path;

use rtpl_model::{RuleModel, TemplateModel};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::error::{IngestError, Result};

/// Largest model file accepted, in bytes.
pub const MAX_MODEL_FILE_SIZE: u64 = 16 * 1024 * 1024;

fn read_model_text(path: &Path) -> Result<String> {
    let metadata = fs::metadata(path).map_err(|e| IngestError::io(path, e))?;
    if metadata.len() > MAX_MODEL_FILE_SIZE {
        return Err(IngestError::FileTooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            max_size: MAX_MODEL_FILE_SIZE,
        });
    }
    fs::read_to_string(path).map_err(|e| IngestError::io(path, e))
}

fn parse<T: DeserializeOwned>(path: &Path, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|source| IngestError::ModelParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a template model. A file holding a bare rule (no top-level `rule`
/// key) yields a model with no rows.
pub fn load_template_model(path: &Path) -> Result<TemplateModel> {
    let text = read_model_text(path)?;
    let value: Value = serde_json::from_str(&text).map_err(|source| IngestError::ModelParse {
        path: path.to_path_buf(),
        source,
    })?;
    let model = if value.get("rule").is_some() {
        parse::<TemplateModel>(path, value)?
    } else {
        TemplateModel::new(parse::<RuleModel>(path, value)?)
    };
    debug!(
        path = %path.display(),
        rule = %model.rule.name,
        rows = model.row_count(),
        "loaded template model"
    );
    Ok(model)
}

/// Load just the rule of a model file, discarding any embedded rows.
pub fn load_rule_model(path: &Path) -> Result<RuleModel> {
    Ok(load_template_model(path)?.rule)
}
