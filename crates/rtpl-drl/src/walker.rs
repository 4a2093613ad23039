//! The base rule walker.
//!
//! [`RuleWalker`] owns traversal of a [`RuleModel`] and the rule-language
//! syntax. Every decision that depends on template data is delegated to a
//! [`Substitution`] strategy: resolve values now ([`DirectSubstitution`]) or
//! wrap fragments in `@if{..}` directives for later row expansion
//! ([`MacroConditional`]).
//!
//! [`DirectSubstitution`]: crate::direct::DirectSubstitution
//! [`MacroConditional`]: crate::conditional::MacroConditional

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

use rtpl_model::{
    ActionFieldValue, ActionInsertFact, ActionRetractFact, ActionSetField, CollectSource,
    DataType, FactPattern, FieldConstraint, FreeFormLine, FromCollectPattern, Junction, LhsItem,
    RhsItem, RuleModel, SingleFieldConstraint, ValueKind,
};
use tracing::{trace, warn};

use crate::error::{MarshalError, Result};
use crate::guard::Guard;
use crate::placeholder;
use crate::value::{setter_name, write_action_value, write_constraint_value};

const INDENT: &str = "\t\t";
const CONSTRAINT_SEPARATOR: &str = ", ";
const DSL_PREFIX: char = '>';

/// Extension points a marshal strategy plugs into the walker.
pub trait Substitution {
    /// Emission decision for a fragment referencing `keys` (in order, repeats kept).
    fn guard(&self, keys: &[&str]) -> Guard;

    /// Text standing in for a template key inside a rendered value.
    fn template_value(&self, key: &str) -> Option<String>;

    /// Free-form text as it should be written; `None` drops the whole line.
    fn free_form_text<'t>(&self, text: &'t str) -> Option<Cow<'t, str>>;

    /// Why `key` cannot be used by this strategy, if it cannot.
    fn key_problem(&self, _key: &str) -> Option<&'static str> {
        None
    }

    /// Everything written before the `rule` line.
    fn write_preamble(&self, rule: &RuleModel, out: &mut String) {
        write_package_header(rule, out);
    }

    fn rule_name(&self, rule: &RuleModel) -> String {
        rule.name.clone()
    }

    fn write_footer(&self, out: &mut String) {
        out.push_str("end\n");
    }
}

/// `package p;` and one `import i;` per import.
pub fn write_package_header(rule: &RuleModel, out: &mut String) {
    if let Some(package) = rule.package_name.as_deref().filter(|p| !p.is_empty()) {
        out.push_str("package ");
        out.push_str(package);
        out.push_str(";\n\n");
    }
    if !rule.imports.is_empty() {
        for import in &rule.imports {
            out.push_str("import ");
            out.push_str(import);
            out.push_str(";\n");
        }
        out.push('\n');
    }
}

/// Progress of one marshal pass. Phases only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    HeaderEmitted,
    LhsEmitted,
    RhsEmitted,
    Complete,
}

impl Phase {
    pub fn next(self) -> Option<Phase> {
        match self {
            Phase::Idle => Some(Phase::HeaderEmitted),
            Phase::HeaderEmitted => Some(Phase::LhsEmitted),
            Phase::LhsEmitted => Some(Phase::RhsEmitted),
            Phase::RhsEmitted => Some(Phase::Complete),
            Phase::Complete => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::HeaderEmitted => "header",
            Phase::LhsEmitted => "lhs",
            Phase::RhsEmitted => "rhs",
            Phase::Complete => "complete",
        }
    }
}

/// Guards of the constraints already written in one group.
///
/// The separator in front of a constraint is needed exactly when some earlier
/// sibling made it into the output, so its guard is the disjunction of theirs.
#[derive(Debug, Default)]
struct EmittedSiblings {
    guards: Vec<Guard>,
}

impl EmittedSiblings {
    fn separator_guard(&self) -> Option<Guard> {
        if self.guards.is_empty() {
            None
        } else {
            Some(Guard::any(self.guards.iter().cloned()))
        }
    }
}

/// Walks one rule model and writes its rule-language text.
pub struct RuleWalker<'m, 's, S: ?Sized> {
    strategy: &'s S,
    default_dialect: Option<&'s str>,
    out: String,
    phase: Phase,
    dsl: bool,
    pattern_bindings: HashMap<&'m str, &'m FactPattern>,
    field_bindings: HashMap<&'m str, &'m SingleFieldConstraint>,
    declared: HashSet<&'m str>,
    fact_count: usize,
}

impl<'m, 's, S: Substitution + ?Sized> RuleWalker<'m, 's, S> {
    pub fn new(strategy: &'s S) -> Self {
        Self {
            strategy,
            default_dialect: None,
            out: String::new(),
            phase: Phase::Idle,
            dsl: false,
            pattern_bindings: HashMap::new(),
            field_bindings: HashMap::new(),
            declared: HashSet::new(),
            fact_count: 0,
        }
    }

    /// Dialect written when the rule declares none.
    pub fn with_default_dialect(mut self, dialect: Option<&'s str>) -> Self {
        self.default_dialect = dialect;
        self
    }

    /// Run the full pass. Any error discards the partial text.
    pub fn marshal(mut self, rule: &'m RuleModel) -> Result<String> {
        self.dsl = rule.has_dsl_sentences;

        self.strategy.write_preamble(rule, &mut self.out);
        self.write_rule_header(rule);
        self.advance(Phase::HeaderEmitted);

        self.out.push_str("\twhen\n");
        for item in &rule.lhs {
            self.visit_lhs_item(item)?;
        }
        self.advance(Phase::LhsEmitted);

        self.out.push_str("\tthen\n");
        for item in &rule.rhs {
            self.visit_rhs_item(item)?;
        }
        self.advance(Phase::RhsEmitted);

        self.strategy.write_footer(&mut self.out);
        self.advance(Phase::Complete);
        Ok(self.out)
    }

    fn advance(&mut self, next: Phase) {
        debug_assert_eq!(self.phase.next(), Some(next));
        self.phase = next;
        trace!(phase = next.as_str(), "marshal phase reached");
    }

    fn write_rule_header(&mut self, rule: &RuleModel) {
        let name = self.strategy.rule_name(rule);
        self.out.push_str("rule \"");
        self.out.push_str(&name);
        self.out.push_str("\"\n");

        for meta in &rule.metadata {
            self.out.push_str("\t@");
            self.out.push_str(&meta.name);
            self.out.push('(');
            self.out.push_str(&meta.value);
            self.out.push_str(")\n");
        }
        for attribute in &rule.attributes {
            self.out.push('\t');
            self.out.push_str(&attribute.name);
            self.out.push(' ');
            if attribute.is_unquoted() {
                self.out.push_str(&attribute.value);
            } else {
                self.out.push('"');
                self.out.push_str(&attribute.value);
                self.out.push('"');
            }
            self.out.push('\n');
        }
        if let Some(dialect) = self.default_dialect
            && rule.attribute("dialect").is_none()
        {
            self.out.push_str("\tdialect \"");
            self.out.push_str(dialect);
            self.out.push_str("\"\n");
        }
    }

    fn line_start(&mut self) {
        self.out.push_str(INDENT);
        if self.dsl {
            self.out.push(DSL_PREFIX);
        }
    }

    fn open(&mut self, guard: &Guard) {
        if let Guard::When(condition) = guard {
            self.out.push_str("@if{");
            self.out.push_str(&condition.to_string());
            self.out.push('}');
        }
    }

    fn close(&mut self, guard: &Guard) {
        if let Guard::When(_) = guard {
            self.out.push_str("@end{}");
        }
    }

    // --- when ---

    fn visit_lhs_item(&mut self, item: &'m LhsItem) -> Result<()> {
        match item {
            LhsItem::Fact(pattern) => {
                self.line_start();
                self.write_fact_pattern(pattern)?;
                self.out.push('\n');
            }
            LhsItem::FreeForm(line) => self.visit_free_form_line(line)?,
            LhsItem::FromCollect(pattern) => self.visit_from_collect(pattern)?,
        }
        Ok(())
    }

    fn write_fact_pattern(&mut self, pattern: &'m FactPattern) -> Result<()> {
        if pattern.negated {
            self.out.push_str("not ");
        }
        if let Some(bound) = pattern.bound_name.as_deref() {
            self.pattern_bindings.insert(bound, pattern);
            self.out.push_str(bound);
            self.out.push_str(" : ");
        }
        self.out.push_str(&pattern.fact_type);
        self.out.push_str("( ");
        let mut siblings = EmittedSiblings::default();
        for constraint in &pattern.constraints {
            self.emit_constraint(&pattern.fact_type, &mut siblings, constraint)?;
        }
        self.out.push_str(" )");
        Ok(())
    }

    /// Write one pattern-level constraint.
    fn emit_constraint(
        &mut self,
        fact_type: &str,
        siblings: &mut EmittedSiblings,
        constraint: &'m FieldConstraint,
    ) -> Result<()> {
        self.emit_in_group(fact_type, siblings, constraint, CONSTRAINT_SEPARATOR, false)
    }

    /// Write one child of a composite constraint.
    fn emit_nested_constraint(
        &mut self,
        fact_type: &str,
        siblings: &mut EmittedSiblings,
        constraint: &'m FieldConstraint,
        junction: Junction,
    ) -> Result<()> {
        let separator = match junction {
            Junction::And => " && ",
            Junction::Or => " || ",
        };
        self.emit_in_group(fact_type, siblings, constraint, separator, true)
    }

    fn emit_in_group(
        &mut self,
        fact_type: &str,
        siblings: &mut EmittedSiblings,
        constraint: &'m FieldConstraint,
        separator: &str,
        nested: bool,
    ) -> Result<()> {
        let guard = self.constraint_guard(fact_type, constraint)?;
        if guard.is_skip() {
            trace!(fact_type, "constraint suppressed");
            return Ok(());
        }

        self.open(&guard);
        if let Some(separator_guard) = siblings.separator_guard() {
            self.open(&separator_guard);
            self.out.push_str(separator);
            self.close(&separator_guard);
        }
        match constraint {
            FieldConstraint::Single(single) => self.write_single_constraint(fact_type, single)?,
            FieldConstraint::Composite(composite) => {
                if nested {
                    self.out.push_str("( ");
                }
                let mut children = EmittedSiblings::default();
                for child in &composite.constraints {
                    self.emit_nested_constraint(fact_type, &mut children, child, composite.junction)?;
                }
                if nested {
                    self.out.push_str(" )");
                }
            }
        }
        self.close(&guard);

        siblings.guards.push(guard);
        Ok(())
    }

    /// A composite is written when any of its children is. A composite whose
    /// children are all suppressed is left out entirely rather than written
    /// as an empty `( )` group, which the rule language does not accept.
    fn constraint_guard(&self, fact_type: &str, constraint: &FieldConstraint) -> Result<Guard> {
        match constraint {
            FieldConstraint::Single(single) if single.is_template() => {
                let key = template_key(single.value.as_deref(), || {
                    location(fact_type, &single.field_name)
                })?;
                self.keyed_guard(&[key], || location(fact_type, &single.field_name))
            }
            FieldConstraint::Single(_) => Ok(Guard::Always),
            FieldConstraint::Composite(composite) => {
                let guards = composite
                    .constraints
                    .iter()
                    .map(|child| self.constraint_guard(fact_type, child))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Guard::any(guards))
            }
        }
    }

    fn write_single_constraint(
        &mut self,
        fact_type: &str,
        constraint: &'m SingleFieldConstraint,
    ) -> Result<()> {
        if let Some(binding) = constraint.field_binding.as_deref() {
            self.field_bindings.insert(binding, constraint);
            self.out.push_str(binding);
            self.out.push_str(" : ");
        }
        self.out.push_str(&constraint.field_name);

        let at = || location(fact_type, &constraint.field_name);
        if let Some(operator) = constraint.operator.as_deref().filter(|op| !op.is_empty()) {
            self.write_comparison(
                operator,
                constraint.value.as_deref(),
                constraint.value_kind,
                constraint.data_type,
                at,
            )?;
        }

        for connective in &constraint.connectives {
            let guard = if connective.is_template() {
                let key = template_key(connective.value.as_deref(), at)?;
                self.keyed_guard(&[key], at)?
            } else {
                Guard::Always
            };
            if guard.is_skip() {
                trace!(fact_type, field = %constraint.field_name, "connective suppressed");
                continue;
            }
            self.open(&guard);
            self.write_comparison(
                &connective.operator,
                connective.value.as_deref(),
                connective.value_kind,
                constraint.data_type,
                at,
            )?;
            self.close(&guard);
        }
        Ok(())
    }

    fn write_comparison(
        &mut self,
        operator: &str,
        value: Option<&str>,
        kind: ValueKind,
        data_type: Option<DataType>,
        at: impl Fn() -> String,
    ) -> Result<()> {
        self.out.push(' ');
        self.out.push_str(operator);
        if takes_no_value(operator) {
            return Ok(());
        }
        let value = value.ok_or_else(|| {
            MarshalError::malformed(at(), format!("operator '{operator}' has no value"))
        })?;
        self.out.push(' ');
        if kind == ValueKind::Template {
            let key = template_key(Some(value), &at)?;
            let resolved = self.emit_template_field_value(key, &at)?;
            write_constraint_value(&mut self.out, kind, data_type, &resolved);
        } else {
            write_constraint_value(&mut self.out, kind, data_type, value);
        }
        Ok(())
    }

    /// The text a template key renders as, before data-type formatting.
    fn emit_template_field_value(&self, key: &str, at: impl Fn() -> String) -> Result<String> {
        self.strategy
            .template_value(key)
            .ok_or_else(|| MarshalError::malformed(at(), format!("template key '{key}' has no value")))
    }

    fn visit_free_form_line(&mut self, line: &FreeFormLine) -> Result<()> {
        let keys = placeholder::names(&line.text);
        let guard = self.keyed_guard(&keys, || free_form_location(&line.text))?;
        if guard.is_skip() {
            trace!(text = %line.text, "free-form line suppressed");
            return Ok(());
        }
        let Some(text) = self.strategy.free_form_text(&line.text) else {
            trace!(text = %line.text, "free-form line suppressed");
            return Ok(());
        };
        self.open(&guard);
        self.line_start();
        self.out.push_str(&text);
        self.out.push('\n');
        self.close(&guard);
        Ok(())
    }

    /// `Outer( .. ) from collect ( inner )`. A free-form inner line decides
    /// for the whole construct: it is written with all of its values or not
    /// at all.
    fn visit_from_collect(&mut self, pattern: &'m FromCollectPattern) -> Result<()> {
        let (guard, inner_text) = match &pattern.source {
            CollectSource::FreeForm(line) => {
                let keys = placeholder::names(&line.text);
                let guard = self.keyed_guard(&keys, || free_form_location(&line.text))?;
                let text = if guard.is_skip() {
                    None
                } else {
                    self.strategy.free_form_text(&line.text)
                };
                let Some(text) = text else {
                    trace!(fact_type = %pattern.fact.fact_type, "from collect suppressed");
                    return Ok(());
                };
                (guard, Some(text))
            }
            CollectSource::Fact(_) => (Guard::Always, None),
        };

        self.open(&guard);
        self.line_start();
        self.write_fact_pattern(&pattern.fact)?;
        self.out.push_str(" from collect ( ");
        match (&pattern.source, inner_text) {
            (_, Some(text)) => {
                self.open(&guard);
                self.out.push_str(&text);
                self.close(&guard);
            }
            (CollectSource::Fact(inner), None) => self.write_fact_pattern(inner)?,
            (CollectSource::FreeForm(_), None) => {}
        }
        self.out.push_str(" )\n");
        self.close(&guard);
        Ok(())
    }

    // --- then ---

    fn visit_rhs_item(&mut self, item: &'m RhsItem) -> Result<()> {
        match item {
            RhsItem::InsertFact(action) => self.visit_insert_fact(action),
            RhsItem::SetField(action) => self.visit_set_field(action),
            RhsItem::RetractFact(action) => {
                self.visit_retract(action);
                Ok(())
            }
            RhsItem::FreeForm(line) => self.visit_free_form_line(line),
        }
    }

    fn visit_insert_fact(&mut self, action: &'m ActionInsertFact) -> Result<()> {
        if action.bound_name.is_none() && action.field_values.is_empty() {
            self.line_start();
            self.out.push_str("insert( new ");
            self.out.push_str(&action.fact_type);
            self.out.push_str("() );\n");
            return Ok(());
        }

        let variable = match action.bound_name.as_deref() {
            Some(bound) => {
                self.declared.insert(bound);
                bound.to_string()
            }
            None => {
                let variable = format!("fact{}", self.fact_count);
                self.fact_count += 1;
                variable
            }
        };

        self.line_start();
        self.out.push_str(&action.fact_type);
        self.out.push(' ');
        self.out.push_str(&variable);
        self.out.push_str(" = new ");
        self.out.push_str(&action.fact_type);
        self.out.push_str("();\n");
        for value in &action.field_values {
            self.emit_set_field_call(&variable, value)?;
        }
        self.line_start();
        self.out.push_str("insert( ");
        self.out.push_str(&variable);
        self.out.push_str(" );\n");
        Ok(())
    }

    fn visit_set_field(&mut self, action: &'m ActionSetField) -> Result<()> {
        self.check_binding(&action.variable);
        for value in &action.field_values {
            self.emit_set_field_call(&action.variable, value)?;
        }
        Ok(())
    }

    fn visit_retract(&mut self, action: &ActionRetractFact) {
        self.check_binding(&action.variable);
        self.line_start();
        self.out.push_str("retract( ");
        self.out.push_str(&action.variable);
        self.out.push_str(" );\n");
    }

    /// `variable.setField( value );`, dropped or wrapped per the strategy
    /// when the value is a template key.
    fn emit_set_field_call(&mut self, variable: &str, value: &ActionFieldValue) -> Result<()> {
        let at = || format!("{variable}.{}", value.field);
        let guard = if value.is_template() {
            let key = template_key(value.value.as_deref(), at)?;
            self.keyed_guard(&[key], at)?
        } else {
            Guard::Always
        };
        if guard.is_skip() {
            trace!(variable, field = %value.field, "field assignment suppressed");
            return Ok(());
        }

        let raw = value
            .value
            .as_deref()
            .ok_or_else(|| MarshalError::malformed(at(), "field value is missing"))?;
        let rendered = if value.is_template() {
            Cow::Owned(self.emit_template_field_value(raw, at)?)
        } else {
            Cow::Borrowed(raw)
        };

        self.open(&guard);
        self.line_start();
        self.out.push_str(variable);
        self.out.push('.');
        self.out.push_str(&setter_name(&value.field));
        self.out.push_str("( ");
        write_action_value(&mut self.out, value.nature, value.data_type, &rendered);
        self.out.push_str(" );\n");
        self.close(&guard);
        Ok(())
    }

    /// The strategy's guard for `keys`, after the strategy has accepted each key.
    fn keyed_guard(&self, keys: &[&str], at: impl FnOnce() -> String) -> Result<Guard> {
        let rejected = keys
            .iter()
            .find_map(|key| self.strategy.key_problem(key).map(|problem| (key, problem)));
        if let Some((key, problem)) = rejected {
            return Err(MarshalError::malformed(at(), format!("{problem}: '{key}'")));
        }
        Ok(self.strategy.guard(keys))
    }

    fn check_binding(&self, variable: &str) {
        if let Some(pattern) = self.pattern_bindings.get(variable) {
            trace!(variable, fact_type = %pattern.fact_type, "action on bound fact");
        } else if let Some(constraint) = self.field_bindings.get(variable) {
            trace!(variable, field = %constraint.field_name, "action on bound field");
        } else if !self.declared.contains(variable) {
            warn!(variable, "action references a variable no pattern or insert binds");
        }
    }
}

fn location(fact_type: &str, field: &str) -> String {
    format!("{fact_type}.{field}")
}

fn free_form_location(text: &str) -> String {
    format!("free-form line '{}'", text.trim())
}

/// Validate the key carried by a template value.
fn template_key(value: Option<&str>, at: impl FnOnce() -> String) -> Result<&str> {
    let problem = match value {
        None => "template value has no key",
        Some(key) if key.trim().is_empty() => "template key is empty",
        Some(key) if key.contains(['}', '\n', '\r']) => {
            "template key contains a closing brace or line break"
        }
        Some(key) => return Ok(key),
    };
    Err(MarshalError::malformed(at(), problem))
}

/// `== null` and `!= null` carry no value operand.
fn takes_no_value(operator: &str) -> bool {
    operator.trim_end().ends_with("null")
}
