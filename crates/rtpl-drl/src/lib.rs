//! Marshal rule template models into DRL text.
//!
//! A [`RuleModel`](rtpl_model::RuleModel) is written in one of two ways:
//!
//! - **direct**: every template key is resolved against a concrete row while
//!   walking the model ([`marshal_rule`]). Constraints, lines and actions whose
//!   values are missing are left out entirely.
//! - **macro**: the rule is written once as a template in which every keyed
//!   fragment sits inside `@if{key != empty}` .. `@end{}` ([`marshal_template`]),
//!   and a [`RowExpander`] later produces one rule per row.
//!
//! [`TemplateMarshaller`] drives either mode over a
//! [`TemplateModel`](rtpl_model::TemplateModel).

pub mod columns;
pub mod conditional;
pub mod direct;
pub mod error;
pub mod expand;
pub mod guard;
pub mod marshal;
pub mod placeholder;
pub mod provider;
pub mod value;
pub mod walker;

pub use columns::{template_columns, template_keys};
pub use conditional::MacroConditional;
pub use direct::DirectSubstitution;
pub use error::{ExpandError, MarshalError, Result};
pub use expand::{RowExpander, TemplateCompiler};
pub use guard::{Condition, Guard};
pub use marshal::{
    DEFAULT_DIALECT, MarshalMode, MarshalOptions, TemplateMarshaller, marshal_rule,
    marshal_template,
};
pub use provider::{ArrayDataProvider, EmptyDataProvider, RowDataProvider, TemplateDataProvider};
pub use walker::{Phase, RuleWalker, Substitution};
