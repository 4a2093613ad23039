//! Rule template model definitions.
//!
//! A [`RuleModel`] is a tree of left-hand side pattern items and right-hand
//! side actions. Values of kind `template` name a column of the row data the
//! rule is later expanded over; a [`TemplateModel`] pairs a rule with those rows.

pub mod action;
pub mod enums;
pub mod error;
pub mod pattern;
pub mod rule;
pub mod table;

pub use action::{ActionFieldValue, ActionInsertFact, ActionRetractFact, ActionSetField, RhsItem};
pub use enums::{DataType, FieldNature, Junction, ValueKind};
pub use error::{ModelError, Result};
pub use pattern::{
    CollectSource, CompositeFieldConstraint, ConnectiveConstraint, FactPattern, FieldConstraint,
    FreeFormLine, FromCollectPattern, LhsItem, SingleFieldConstraint,
};
pub use rule::{InterpolationVariable, RuleAttribute, RuleMetadata, RuleModel};
pub use table::{Row, TemplateModel};
