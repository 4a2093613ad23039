use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use rtpl_drl::template_columns;
use rtpl_model::{DataType, RuleModel};

/// One row per template column, in the order row cells bind to them.
pub fn variable_table(rule: &RuleModel) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Variable"),
        header_cell("Source"),
        header_cell("Type"),
        header_cell("Fact"),
        header_cell("Field"),
    ]);
    apply_table_style(&mut table);
    if let Some(column) = table.column_mut(0) {
        column.set_cell_alignment(CellAlignment::Right);
    }

    if rule.interpolation_variables.is_empty() {
        for (index, name) in template_columns(rule).into_iter().enumerate() {
            table.add_row(vec![
                Cell::new(index),
                Cell::new(name),
                dim_cell("template key"),
                dim_cell("-"),
                dim_cell("-"),
                dim_cell("-"),
            ]);
        }
    } else {
        for (index, variable) in rule.interpolation_variables.iter().enumerate() {
            table.add_row(vec![
                Cell::new(index),
                Cell::new(&variable.var_name),
                Cell::new("declared").fg(Color::Green),
                optional_cell(variable.data_type.as_ref().map(DataType::as_str)),
                optional_cell(variable.fact_type.as_deref()),
                optional_cell(variable.field.as_deref()),
            ]);
        }
    }
    table
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label).add_attribute(Attribute::Bold)
}

fn dim_cell(value: impl ToString) -> Cell {
    Cell::new(value.to_string()).add_attribute(Attribute::Dim)
}

fn optional_cell(value: Option<&str>) -> Cell {
    match value {
        Some(value) => Cell::new(value),
        None => dim_cell("-"),
    }
}
