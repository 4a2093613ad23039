use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use comfy_table::Table;
use rtpl_drl::{MarshalOptions, TemplateMarshaller, marshal_template, template_columns};
use rtpl_ingest::{load_rule_model, load_template_model, read_row_table};
use rtpl_model::TemplateModel;
use tracing::{info, info_span, warn};

use crate::cli::{RenderArgs, TemplateArgs, VariablesArgs};
use crate::summary::variable_table;

pub fn run_render(args: &RenderArgs) -> Result<()> {
    let model = load_model(&args.model, args.rows.as_deref())?;
    let drl = render(&model, args.options())?;
    write_output(&drl, args.output.as_deref())
}

pub fn run_template(args: &TemplateArgs) -> Result<()> {
    let rule = load_rule_model(&args.model)
        .with_context(|| format!("load model {}", args.model.display()))?;
    let template = marshal_template(&rule, &args.options())
        .with_context(|| format!("marshal template for rule '{}'", rule.name))?;
    write_output(&template, args.output.as_deref())
}

pub fn run_variables(args: &VariablesArgs) -> Result<()> {
    let table = variables(&args.model)?;
    println!("{table}");
    Ok(())
}

/// Load a model file, replacing its rows with the CSV table when one is given.
pub fn load_model(model_path: &Path, rows_path: Option<&Path>) -> Result<TemplateModel> {
    let mut model = load_template_model(model_path)
        .with_context(|| format!("load model {}", model_path.display()))?;

    if let Some(rows_path) = rows_path {
        if !model.rows.is_empty() {
            warn!(
                embedded = model.row_count(),
                rows = %rows_path.display(),
                "CSV rows replace the rows embedded in the model"
            );
        }
        let columns = template_columns(&model.rule);
        model.rows = read_row_table(rows_path, &columns)
            .with_context(|| format!("read rows {}", rows_path.display()))?;
    }
    Ok(model)
}

/// Marshal a loaded model with the given options.
pub fn render(model: &TemplateModel, options: MarshalOptions) -> Result<String> {
    let span = info_span!("render", rule = %model.rule.name);
    let _guard = span.enter();

    let mode = options.mode;
    let drl = TemplateMarshaller::new(options)
        .marshal(model)
        .with_context(|| format!("marshal rule '{}' ({mode} mode)", model.rule.name))?;
    info!(rows = model.row_count(), "render complete");
    Ok(drl)
}

pub fn variables(model_path: &Path) -> Result<Table> {
    let rule = load_rule_model(model_path)
        .with_context(|| format!("load model {}", model_path.display()))?;
    Ok(variable_table(&rule))
}

/// Write text to `output`, or to stdout when none is given.
pub fn write_output(text: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("write {}", path.display()))?;
            info!(path = %path.display(), bytes = text.len(), "output written");
        }
        None => print!("{text}"),
    }
    Ok(())
}
