//! Marshal orchestration: pick a strategy, run the pass, expand rows.

use std::fmt;
use std::str::FromStr;

use rtpl_model::{Row, RuleModel, TemplateModel};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span};

use crate::columns::template_columns;
use crate::conditional::MacroConditional;
use crate::direct::DirectSubstitution;
use crate::error::Result;
use crate::expand::{RowExpander, TemplateCompiler};
use crate::provider::{ArrayDataProvider, EmptyDataProvider, RowDataProvider, TemplateDataProvider};
use crate::walker::{RuleWalker, Substitution};

/// Dialect declared on rules that do not name one.
pub const DEFAULT_DIALECT: &str = "mvel";

/// How a template model with rows is turned into rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarshalMode {
    /// Write a conditional rule template once, then expand it per row.
    #[default]
    Macro,
    /// Resolve values while walking, one pass per row.
    Direct,
}

impl MarshalMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarshalMode::Macro => "macro",
            MarshalMode::Direct => "direct",
        }
    }
}

impl fmt::Display for MarshalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MarshalMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "macro" => Ok(MarshalMode::Macro),
            "direct" => Ok(MarshalMode::Direct),
            other => Err(format!("unknown marshal mode '{other}'")),
        }
    }
}

/// Options shared by every marshal pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarshalOptions {
    pub mode: MarshalMode,
    /// Written as `dialect "<d>"` when the rule declares no dialect.
    pub default_dialect: Option<String>,
}

impl Default for MarshalOptions {
    fn default() -> Self {
        Self {
            mode: MarshalMode::Macro,
            default_dialect: Some(DEFAULT_DIALECT.to_string()),
        }
    }
}

impl MarshalOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mut self, mode: MarshalMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_default_dialect(mut self, dialect: Option<impl Into<String>>) -> Self {
        self.default_dialect = dialect.map(Into::into);
        self
    }

    fn walker<'m, 's, S>(&'s self, strategy: &'s S) -> RuleWalker<'m, 's, S>
    where
        S: Substitution + ?Sized,
    {
        RuleWalker::new(strategy).with_default_dialect(self.default_dialect.as_deref())
    }
}

/// Marshal one rule, resolving template keys against `provider`.
pub fn marshal_rule<P>(rule: &RuleModel, provider: &P, options: &MarshalOptions) -> Result<String>
where
    P: TemplateDataProvider + ?Sized,
{
    let strategy = DirectSubstitution::new(provider);
    options.walker(&strategy).marshal(rule)
}

/// Write the rule template for `rule`: values stay `@{key}` placeholders and
/// keyed fragments are wrapped in `@if{..}` .. `@end{}`.
pub fn marshal_template(rule: &RuleModel, options: &MarshalOptions) -> Result<String> {
    let columns = template_columns(rule);
    let strategy = MacroConditional::new(&columns);
    let template = options.walker(&strategy).marshal(rule)?;
    debug!(rule = %rule.name, columns = columns.len(), "generated rule template:\n{template}");
    Ok(template)
}

/// Marshals template models into final rule text.
#[derive(Debug, Clone, Default)]
pub struct TemplateMarshaller<E = TemplateCompiler> {
    expander: E,
    options: MarshalOptions,
}

impl TemplateMarshaller<TemplateCompiler> {
    pub fn new(options: MarshalOptions) -> Self {
        Self {
            expander: TemplateCompiler::new(),
            options,
        }
    }
}

impl<E: RowExpander> TemplateMarshaller<E> {
    pub fn with_expander(expander: E, options: MarshalOptions) -> Self {
        Self { expander, options }
    }

    pub fn options(&self) -> &MarshalOptions {
        &self.options
    }

    /// Marshal in the configured mode. Direct-mode rules are joined by a blank line.
    pub fn marshal(&self, model: &TemplateModel) -> Result<String> {
        let span = info_span!(
            "marshal",
            rule = %model.rule.name,
            rows = model.row_count(),
            mode = self.options.mode.as_str()
        );
        let _guard = span.enter();

        let drl = match self.options.mode {
            MarshalMode::Macro => self.marshal_macro(model)?,
            MarshalMode::Direct => self.marshal_direct(model)?.join("\n"),
        };
        info!(bytes = drl.len(), "rule marshalled");
        Ok(drl)
    }

    /// Write the rule template and expand it over the model's rows. Zero
    /// rows expand to empty text.
    pub fn marshal_macro(&self, model: &TemplateModel) -> Result<String> {
        let template = marshal_template(&model.rule, &self.options)?;
        let drl = if model.rows.is_empty() {
            let mut rows = std::iter::empty::<&Row>();
            self.expander.expand(&template, &mut rows)?
        } else {
            let mut rows = ArrayDataProvider::new(&model.rows);
            self.expander.expand(&template, &mut rows)?
        };
        debug!("expanded rules:\n{drl}");
        Ok(drl)
    }

    /// One direct pass per row, naming each rule `<name>_<row>`. Without
    /// rows a single pass runs with no template values, keeping the plain name.
    pub fn marshal_direct(&self, model: &TemplateModel) -> Result<Vec<String>> {
        if model.rows.is_empty() {
            return Ok(vec![marshal_rule(
                &model.rule,
                &EmptyDataProvider,
                &self.options,
            )?]);
        }

        let columns = template_columns(&model.rule);
        model
            .rows
            .iter()
            .enumerate()
            .map(|(row_number, row)| {
                let provider = RowDataProvider::new(&columns, row);
                let mut strategy = DirectSubstitution::new(&provider).for_row(row_number);
                if row_number > 0 {
                    strategy = strategy.without_package_header();
                }
                let drl = self.options.walker(&strategy).marshal(&model.rule)?;
                debug!(row = row_number, "marshalled row:\n{drl}");
                Ok(drl)
            })
            .collect()
    }
}
