//! Macro-conditional substitution: defer every template decision to the
//! row expander by wrapping fragments in `@if{..}` .. `@end{}`.

use std::borrow::Cow;

use rtpl_model::RuleModel;

use crate::guard::{Condition, Guard};
use crate::walker::{Substitution, write_package_header};

/// Header variable written when the rule has no template columns.
pub const PLACEHOLDER_VARIABLE: &str = "test_var";

/// Rule-name suffix the expander replaces with the zero-based row index.
pub const ROW_NUMBER_SUFFIX: &str = "_@{row.rowNumber}";

/// Tokens of the `@if{..}` condition syntax; a key containing one could not
/// be read back out of a condition.
const CONDITION_TOKENS: [&str; 4] = ["&&", "||", "!=", "=="];

/// Emits a rule template: values stay as `@{key}` placeholders and every
/// keyed fragment is written under a condition on its keys.
#[derive(Debug, Clone, Copy)]
pub struct MacroConditional<'c> {
    columns: &'c [String],
}

impl<'c> MacroConditional<'c> {
    /// `columns` become the `template header` variables, in order.
    pub fn new(columns: &'c [String]) -> Self {
        Self { columns }
    }
}

impl Substitution for MacroConditional<'_> {
    fn guard(&self, keys: &[&str]) -> Guard {
        if keys.is_empty() {
            Guard::Always
        } else {
            Guard::When(Condition::all_of(keys.iter().copied()))
        }
    }

    fn template_value(&self, key: &str) -> Option<String> {
        Some(format!("@{{{key}}}"))
    }

    fn free_form_text<'t>(&self, text: &'t str) -> Option<Cow<'t, str>> {
        Some(Cow::Borrowed(text))
    }

    fn key_problem(&self, key: &str) -> Option<&'static str> {
        CONDITION_TOKENS
            .iter()
            .any(|token| key.contains(token))
            .then_some("template key contains a condition operator")
    }

    fn write_preamble(&self, rule: &RuleModel, out: &mut String) {
        out.push_str("template header\n");
        if self.columns.is_empty() {
            out.push_str(PLACEHOLDER_VARIABLE);
            out.push('\n');
        }
        for column in self.columns {
            out.push_str(column);
            out.push('\n');
        }
        out.push('\n');
        write_package_header(rule, out);
        out.push_str("\ntemplate \"");
        out.push_str(&rule.name);
        out.push_str("\"\n\n");
    }

    fn rule_name(&self, rule: &RuleModel) -> String {
        format!("{}{ROW_NUMBER_SUFFIX}", rule.name)
    }

    fn write_footer(&self, out: &mut String) {
        out.push_str("end\n\nend template\n");
    }
}
