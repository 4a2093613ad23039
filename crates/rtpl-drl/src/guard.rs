//! Emission guards for template-dependent fragments.

use std::fmt;

/// A disjunction of conjunctions of template keys, each read as
/// "the key has a value". Renders in the expander's condition syntax:
/// `$a != empty && $b != empty || $c != empty`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    alternatives: Vec<Vec<String>>,
}

impl Condition {
    /// Holds when every key has a value. Repeated keys are kept.
    pub fn all_of<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            alternatives: vec![keys.into_iter().map(Into::into).collect()],
        }
    }

    /// Holds when any of the conditions holds.
    pub fn any_of<I>(conditions: I) -> Self
    where
        I: IntoIterator<Item = Condition>,
    {
        Self {
            alternatives: conditions
                .into_iter()
                .flat_map(|condition| condition.alternatives)
                .collect(),
        }
    }

    pub fn alternatives(&self) -> &[Vec<String>] {
        &self.alternatives
    }

    /// Evaluate against a key lookup.
    pub fn holds(&self, mut has_value: impl FnMut(&str) -> bool) -> bool {
        self.alternatives
            .iter()
            .any(|keys| keys.iter().all(|key| has_value(key)))
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (alt_idx, keys) in self.alternatives.iter().enumerate() {
            if alt_idx > 0 {
                f.write_str(" || ")?;
            }
            for (key_idx, key) in keys.iter().enumerate() {
                if key_idx > 0 {
                    f.write_str(" && ")?;
                }
                write!(f, "{key} != empty")?;
            }
        }
        Ok(())
    }
}

/// Whether, and under what condition, a fragment is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guard {
    /// Written unconditionally.
    Always,
    /// Not written at all.
    Skip,
    /// Written inside `@if{condition}` .. `@end{}`.
    When(Condition),
}

impl Guard {
    /// Combine sibling guards: a group is written when any member is.
    pub fn any<I>(guards: I) -> Guard
    where
        I: IntoIterator<Item = Guard>,
    {
        let mut conditions = Vec::new();
        for guard in guards {
            match guard {
                Guard::Always => return Guard::Always,
                Guard::Skip => {}
                Guard::When(condition) => conditions.push(condition),
            }
        }
        if conditions.is_empty() {
            Guard::Skip
        } else {
            Guard::When(Condition::any_of(conditions))
        }
    }

    pub fn is_skip(&self) -> bool {
        matches!(self, Guard::Skip)
    }
}
