//! Row expansion of rule templates.
//!
//! A rule template is the text written by the macro-conditional pass:
//!
//! ```text
//! template header
//! $f1
//! $f2
//!
//! package org.acme;
//!
//! template "t1"
//! rule "t1_@{row.rowNumber}"
//! ...
//! end
//! end template
//! ```
//!
//! [`TemplateCompiler`] binds each row's cells to the header variables and
//! writes one copy of every template body per row, resolving `@{name}`
//! substitutions and `@if{cond}` .. `@end{}` blocks along the way. Names
//! are matched exactly, the way the placeholder scanner reads them; a name
//! with no header column reads as empty.

use rtpl_model::Row;
use tracing::{debug, warn};

use crate::error::ExpandError;
use crate::placeholder;

const HEADER: &str = "template header";
const END_TEMPLATE: &str = "end template";
const IF_OPEN: &str = "@if{";
const END: &str = "@end{}";
const ROW_NUMBER: &str = "row.rowNumber";

/// Turns a rule template plus row data into concrete rule text.
pub trait RowExpander {
    fn expand(
        &self,
        template: &str,
        rows: &mut dyn Iterator<Item = &Row>,
    ) -> Result<String, ExpandError>;
}

/// The built-in expander for templates produced by the macro pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateCompiler;

impl TemplateCompiler {
    pub fn new() -> Self {
        Self
    }
}

impl RowExpander for TemplateCompiler {
    fn expand(
        &self,
        template: &str,
        rows: &mut dyn Iterator<Item = &Row>,
    ) -> Result<String, ExpandError> {
        let parsed = ParsedTemplate::parse(template)?;
        for name in parsed.unknown_names() {
            warn!(name, "template variable has no column; it reads as empty");
        }
        let mut out = String::new();
        let mut row_count = 0usize;

        for (row_number, row) in rows.enumerate() {
            if row.len() > parsed.columns.len() {
                return Err(ExpandError::RowLengthMismatch {
                    row: row_number,
                    expected: parsed.columns.len(),
                    actual: row.len(),
                });
            }
            if row_number == 0 {
                out.push_str(&parsed.preamble);
            }
            let scope = RowScope {
                columns: &parsed.columns,
                row,
                row_number: row_number.to_string(),
            };
            for block in &parsed.blocks {
                render(&block.body, &scope, &mut out);
            }
            row_count += 1;
        }

        debug!(
            rows = row_count,
            templates = parsed.blocks.len(),
            "expanded rule template"
        );
        Ok(out)
    }
}

struct ParsedTemplate<'t> {
    columns: Vec<&'t str>,
    preamble: String,
    blocks: Vec<TemplateBlock<'t>>,
}

struct TemplateBlock<'t> {
    body: Vec<Node<'t>>,
}

enum Node<'t> {
    Text(&'t str),
    Value(&'t str),
    If {
        condition: DirectiveCondition<'t>,
        body: Vec<Node<'t>>,
    },
}

impl<'t> ParsedTemplate<'t> {
    fn parse(text: &'t str) -> Result<Self, ExpandError> {
        let mut lines = LineCursor::new(text);

        loop {
            match lines.next_line() {
                Some(line) if line.trim().is_empty() => {}
                Some(line) if line.trim() == HEADER => break,
                _ => return Err(ExpandError::MissingHeader),
            }
        }

        let mut columns = Vec::new();
        while let Some(line) = lines.next_line() {
            let name = line.strip_suffix('\n').unwrap_or(line);
            let name = name.strip_suffix('\r').unwrap_or(name);
            if name.is_empty() {
                break;
            }
            columns.push(name);
        }

        let mut preamble = String::new();
        let mut blocks = Vec::new();
        while let Some(line) = lines.next_line() {
            let Some(name) = template_name(line) else {
                if blocks.is_empty() {
                    preamble.push_str(line);
                }
                continue;
            };
            let body_start = lines.offset();
            let body_end = loop {
                let line_start = lines.offset();
                match lines.next_line() {
                    Some(line) if line.trim() == END_TEMPLATE => break line_start,
                    Some(_) => {}
                    None => {
                        return Err(ExpandError::UnterminatedTemplate {
                            name: name.to_string(),
                        });
                    }
                }
            };
            blocks.push(TemplateBlock {
                body: parse_body(&text[body_start..body_end], body_start)?,
            });
        }

        if blocks.is_empty() {
            return Err(ExpandError::MissingTemplate);
        }
        Ok(Self {
            columns,
            preamble,
            blocks,
        })
    }

    /// Names used by the bodies that no header column declares, first use first.
    fn unknown_names(&self) -> Vec<&'t str> {
        let mut unknown = Vec::new();
        for block in &self.blocks {
            collect_unknown(&block.body, &self.columns, &mut unknown);
        }
        unknown
    }
}

fn collect_unknown<'t>(nodes: &[Node<'t>], columns: &[&str], unknown: &mut Vec<&'t str>) {
    for node in nodes {
        match node {
            Node::Text(_) => {}
            Node::Value(name) => note_unknown(name, columns, unknown),
            Node::If { condition, body } => {
                for clause in condition.alternatives.iter().flatten() {
                    note_unknown(clause.name, columns, unknown);
                }
                collect_unknown(body, columns, unknown);
            }
        }
    }
}

fn note_unknown<'t>(name: &'t str, columns: &[&str], unknown: &mut Vec<&'t str>) {
    if name != ROW_NUMBER && !columns.contains(&name) && !unknown.contains(&name) {
        unknown.push(name);
    }
}

/// Line iteration that keeps line endings and byte offsets.
struct LineCursor<'t> {
    text: &'t str,
    offset: usize,
}

impl<'t> LineCursor<'t> {
    fn new(text: &'t str) -> Self {
        Self { text, offset: 0 }
    }

    fn offset(&self) -> usize {
        self.offset
    }

    fn next_line(&mut self) -> Option<&'t str> {
        let rest = self.text.get(self.offset..).filter(|rest| !rest.is_empty())?;
        let len = rest.find('\n').map_or(rest.len(), |idx| idx + 1);
        self.offset += len;
        Some(&rest[..len])
    }
}

/// `template "name"` → `name`.
fn template_name(line: &str) -> Option<&str> {
    let rest = line.trim().strip_prefix("template")?.trim_start();
    rest.strip_prefix('"')?.strip_suffix('"')
}

struct OpenIf<'t> {
    condition: DirectiveCondition<'t>,
    nodes: Vec<Node<'t>>,
    offset: usize,
}

fn innermost<'a, 't>(
    root: &'a mut Vec<Node<'t>>,
    open: &'a mut [OpenIf<'t>],
) -> &'a mut Vec<Node<'t>> {
    match open.last_mut() {
        Some(frame) => &mut frame.nodes,
        None => root,
    }
}

fn parse_body(body: &str, base: usize) -> Result<Vec<Node<'_>>, ExpandError> {
    let mut root = Vec::new();
    let mut open: Vec<OpenIf<'_>> = Vec::new();
    let mut text_start = 0;
    let mut idx = 0;

    while idx < body.len() {
        let rest = &body[idx..];
        if rest.starts_with(IF_OPEN) {
            push_text(innermost(&mut root, &mut open), &body[text_start..idx]);
            let cond_start = idx + IF_OPEN.len();
            let cond_end = body[cond_start..]
                .find('}')
                .map(|end| cond_start + end)
                .ok_or(ExpandError::UnterminatedDirective { offset: base + idx })?;
            open.push(OpenIf {
                condition: DirectiveCondition::parse(&body[cond_start..cond_end])?,
                nodes: Vec::new(),
                offset: base + idx,
            });
            idx = cond_end + 1;
            text_start = idx;
        } else if rest.starts_with(END) {
            push_text(innermost(&mut root, &mut open), &body[text_start..idx]);
            let Some(frame) = open.pop() else {
                return Err(ExpandError::UnmatchedEnd { offset: base + idx });
            };
            innermost(&mut root, &mut open).push(Node::If {
                condition: frame.condition,
                body: frame.nodes,
            });
            idx += END.len();
            text_start = idx;
        } else if let Some(found) = placeholder::leading(rest) {
            push_text(innermost(&mut root, &mut open), &body[text_start..idx]);
            innermost(&mut root, &mut open).push(Node::Value(found.name));
            idx += found.span.end;
            text_start = idx;
        } else {
            idx += rest.chars().next().map_or(1, char::len_utf8);
        }
    }
    push_text(innermost(&mut root, &mut open), &body[text_start..]);

    if let Some(frame) = open.last() {
        return Err(ExpandError::UnclosedIf {
            offset: frame.offset,
        });
    }
    Ok(root)
}

fn push_text<'t>(nodes: &mut Vec<Node<'t>>, text: &'t str) {
    if !text.is_empty() {
        nodes.push(Node::Text(text));
    }
}

/// `a != empty && b == empty || c != empty`, spaced exactly as written by
/// [`Condition`](crate::guard::Condition); names are kept verbatim.
struct DirectiveCondition<'t> {
    alternatives: Vec<Vec<Clause<'t>>>,
}

struct Clause<'t> {
    name: &'t str,
    wants_value: bool,
}

impl<'t> DirectiveCondition<'t> {
    fn parse(text: &'t str) -> Result<Self, ExpandError> {
        let invalid = || ExpandError::InvalidCondition {
            condition: text.to_string(),
        };
        let mut alternatives = Vec::new();
        for alternative in text.split(" || ") {
            let mut clauses = Vec::new();
            for clause in alternative.split(" && ") {
                let (name, wants_value) = if let Some(name) = clause.strip_suffix(" != empty") {
                    (name, true)
                } else if let Some(name) = clause.strip_suffix(" == empty") {
                    (name, false)
                } else {
                    return Err(invalid());
                };
                if name.is_empty() {
                    return Err(invalid());
                }
                clauses.push(Clause { name, wants_value });
            }
            alternatives.push(clauses);
        }
        Ok(Self { alternatives })
    }

    fn holds(&self, scope: &RowScope<'_>) -> bool {
        self.alternatives.iter().any(|clauses| {
            clauses.iter().all(|clause| {
                let has_value = scope.lookup(clause.name).is_some_and(|value| !value.is_empty());
                has_value == clause.wants_value
            })
        })
    }
}

struct RowScope<'r> {
    columns: &'r [&'r str],
    row: &'r Row,
    row_number: String,
}

impl RowScope<'_> {
    /// Cell bound to `name`; names without a column read as absent.
    fn lookup(&self, name: &str) -> Option<&str> {
        if name == ROW_NUMBER {
            return Some(self.row_number.as_str());
        }
        let index = self.columns.iter().position(|column| *column == name)?;
        self.row.get(index)
    }
}

fn render(nodes: &[Node<'_>], scope: &RowScope<'_>, out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Value(name) => out.push_str(scope.lookup(name).unwrap_or_default()),
            Node::If { condition, body } => {
                if condition.holds(scope) {
                    render(body, scope, out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE: &str = "template header\n\
        $f1\n\
        $f2\n\
        \n\
        package org.acme;\n\
        \n\
        template \"t1\"\n\
        rule \"t1_@{row.rowNumber}\"\n\
        \twhen\n\
        \t\tPerson( @if{$f1 != empty}field1 == \"@{$f1}\"@end{}\
        @if{$f2 != empty}@if{$f1 != empty}, @end{}field2 == \"@{$f2}\"@end{} )\n\
        \tthen\n\
        end\n\
        end template\n";

    fn expand(template: &str, rows: &[Row]) -> Result<String, ExpandError> {
        TemplateCompiler::new().expand(template, &mut rows.iter())
    }

    #[test]
    fn expands_one_rule_per_row() {
        let rows = vec![
            Row::from_cells(&[Some("foo"), Some("bar")]),
            Row::from_cells(&[None, Some("bar")]),
            Row::from_cells(&[Some("foo"), Some("")]),
        ];
        let out = expand(TEMPLATE, &rows).expect("expand");
        assert_eq!(out.matches("package org.acme;").count(), 1);
        assert!(out.contains("rule \"t1_0\""));
        assert!(out.contains("Person( field1 == \"foo\", field2 == \"bar\" )"));
        assert!(out.contains("rule \"t1_1\""));
        assert!(out.contains("Person( field2 == \"bar\" )"));
        assert!(out.contains("rule \"t1_2\""));
        assert!(out.contains("Person( field1 == \"foo\" )"));
    }

    #[test]
    fn zero_rows_expand_to_nothing() {
        assert_eq!(expand(TEMPLATE, &[]).expect("expand"), "");
    }

    #[test]
    fn short_rows_read_as_empty() {
        let rows = vec![Row::from_cells(&[Some("foo")])];
        let out = expand(TEMPLATE, &rows).expect("expand");
        assert!(out.contains("Person( field1 == \"foo\" )"), "{out}");
    }

    #[test]
    fn long_rows_are_rejected() {
        let rows = vec![Row::from_cells(&[Some("a"), Some("b"), Some("c")])];
        assert_eq!(
            expand(TEMPLATE, &rows),
            Err(ExpandError::RowLengthMismatch {
                row: 0,
                expected: 2,
                actual: 3
            })
        );
    }

    #[test]
    fn equality_clauses_test_for_empty() {
        let template = "template header\na\n\ntemplate \"x\"\n@if{a == empty}none@end{}@if{a != empty}some@end{}\nend template\n";
        let rows = vec![Row::from_cells(&[None]), Row::from_cells(&[Some("1")])];
        assert_eq!(expand(template, &rows).expect("expand"), "none\nsome\n");
    }

    #[test]
    fn reports_structural_errors() {
        assert_eq!(expand("rule \"x\"\nend\n", &[]), Err(ExpandError::MissingHeader));
        assert_eq!(
            expand("template header\na\n\npackage p;\n", &[]),
            Err(ExpandError::MissingTemplate)
        );
        assert_eq!(
            expand("template header\na\n\ntemplate \"x\"\nrule\n", &[]),
            Err(ExpandError::UnterminatedTemplate {
                name: "x".to_string()
            })
        );
        assert!(matches!(
            expand("template header\na\n\ntemplate \"x\"\n@if{a != empty}\nend template\n", &[]),
            Err(ExpandError::UnclosedIf { .. })
        ));
        assert!(matches!(
            expand("template header\na\n\ntemplate \"x\"\n@end{}\nend template\n", &[]),
            Err(ExpandError::UnmatchedEnd { .. })
        ));
        assert!(matches!(
            expand("template header\na\n\ntemplate \"x\"\n@if{a}x@end{}\nend template\n", &[]),
            Err(ExpandError::InvalidCondition { .. })
        ));
        assert!(matches!(
            expand("template header\na\n\ntemplate \"x\"\n@if{a != empty\nend template\n", &[]),
            Err(ExpandError::UnterminatedDirective { .. })
        ));
    }

    #[test]
    fn unknown_variables_read_as_empty() {
        let template = "template header\na\n\ntemplate \"x\"\n\
            [@{b}]@if{b != empty}has b@end{}@if{b == empty}no b@end{}\nend template\n";
        let rows = vec![Row::from_cells(&[Some("1")])];
        assert_eq!(expand(template, &rows).expect("expand"), "[]no b\n");
    }

    #[test]
    fn unclosed_placeholder_is_plain_text() {
        let template = "template header\na\n\ntemplate \"x\"\n\
            eval( @{a} != \"@{\" )\nend template\n";
        let rows = vec![Row::from_cells(&[Some("1")])];
        assert_eq!(expand(template, &rows).expect("expand"), "eval( 1 != \"@{\" )\n");
    }

    #[test]
    fn names_match_without_trimming() {
        let template = "template header\n a \n\ntemplate \"x\"\n\
            @if{ a  != empty}@{ a }@end{}|@{a}\nend template\n";
        let rows = vec![Row::from_cells(&[Some("5")])];
        assert_eq!(expand(template, &rows).expect("expand"), "5|\n");
    }
}
