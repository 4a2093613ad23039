//! Direct substitution: resolve template keys against one row while walking.

use std::borrow::Cow;

use rtpl_model::RuleModel;

use crate::guard::Guard;
use crate::placeholder;
use crate::provider::TemplateDataProvider;
use crate::walker::{Substitution, write_package_header};

/// Resolves every template key immediately and drops any fragment whose
/// keys are not all present in the row.
pub struct DirectSubstitution<'p, P: ?Sized> {
    provider: &'p P,
    row_number: Option<usize>,
    package_header: bool,
}

impl<'p, P: TemplateDataProvider + ?Sized> DirectSubstitution<'p, P> {
    pub fn new(provider: &'p P) -> Self {
        Self {
            provider,
            row_number: None,
            package_header: true,
        }
    }

    /// Name the rule `<name>_<row_number>`.
    pub fn for_row(mut self, row_number: usize) -> Self {
        self.row_number = Some(row_number);
        self
    }

    /// Leave out the package and import lines, e.g. for every row but the first.
    pub fn without_package_header(mut self) -> Self {
        self.package_header = false;
        self
    }

    fn value(&self, key: &str) -> Option<&str> {
        self.provider
            .template_key_value(key)
            .filter(|value| !value.is_empty())
    }
}

impl<P: TemplateDataProvider + ?Sized> Substitution for DirectSubstitution<'_, P> {
    fn guard(&self, keys: &[&str]) -> Guard {
        if keys.iter().all(|key| self.value(key).is_some()) {
            Guard::Always
        } else {
            Guard::Skip
        }
    }

    fn template_value(&self, key: &str) -> Option<String> {
        self.value(key).map(ToString::to_string)
    }

    fn free_form_text<'t>(&self, text: &'t str) -> Option<Cow<'t, str>> {
        if placeholder::find_all(text).is_empty() {
            return Some(Cow::Borrowed(text));
        }
        placeholder::substitute_all(text, |name| self.template_value(name)).map(Cow::Owned)
    }

    fn write_preamble(&self, rule: &RuleModel, out: &mut String) {
        if self.package_header {
            write_package_header(rule, out);
        }
    }

    fn rule_name(&self, rule: &RuleModel) -> String {
        match self.row_number {
            Some(row_number) => format!("{}_{row_number}", rule.name),
            None => rule.name.clone(),
        }
    }
}
