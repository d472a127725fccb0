//! Column templates: derive new cells from existing ones.
//!
//! Template format:
//! ```text
//! {first} {last};{id}-{dept};constant
//! ```
//!
//! - `;` separates independent column definitions (there is no escape)
//! - `{name}` inserts the cell of column `name` (header name or `_N` alias)
//! - anything else is copied literally
//!
//! The same definitions are evaluated against the header row, which gives
//! the new columns their labels, and against every data row.

use tracing::debug;

use crate::error::{PipelineError, Result, Stage};
use crate::row::{ColumnLookup, Row};
use crate::source::RowSource;

/// Text produced for a reference past the end of a short row.
pub const MISSING: &str = "missing";

/// One piece of a column definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    /// Text copied as-is.
    Literal(String),
    /// Cell at this index of the row being evaluated.
    ColumnReference(usize),
}

impl Expression {
    fn evaluate<'a>(&'a self, row: &'a [String]) -> &'a str {
        match self {
            Expression::Literal(text) => text.as_str(),
            Expression::ColumnReference(index) => row.get(*index).map_or(MISSING, String::as_str),
        }
    }
}

/// Ordered expressions that together build one derived cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnDefinition {
    pub expressions: Vec<Expression>,
}

impl ColumnDefinition {
    /// Concatenate every expression's contribution for `row`.
    pub fn evaluate(&self, row: &[String]) -> String {
        self.expressions.iter().map(|e| e.evaluate(row)).collect()
    }
}

/// Lexer output: literal text runs and unresolved `{name}` references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Text(String),
    Reference(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexState {
    InLiteral,
    InReference,
}

fn template_error(template: &str, reason: &str) -> PipelineError {
    PipelineError::TemplateParse {
        template: template.to_string(),
        reason: reason.to_string(),
    }
}

/// Split one definition into tokens.
///
/// A `{` always flushes the pending text, even when empty, and the text left
/// at the end is always emitted, so a definition never lexes to nothing.
pub fn lex(template: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut state = LexState::InLiteral;
    let mut buf = String::new();

    for c in template.chars() {
        match (c, state) {
            ('{', LexState::InLiteral) => {
                tokens.push(Token::Text(std::mem::take(&mut buf)));
                state = LexState::InReference;
            }
            ('{', LexState::InReference) => {
                return Err(template_error(
                    template,
                    "`{` opened before previous one closed",
                ));
            }
            ('}', LexState::InReference) => {
                tokens.push(Token::Reference(std::mem::take(&mut buf)));
                state = LexState::InLiteral;
            }
            ('}', LexState::InLiteral) => {
                return Err(template_error(
                    template,
                    "`}` found without an opening brace",
                ));
            }
            _ => buf.push(c),
        }
    }

    if state == LexState::InReference {
        return Err(template_error(
            template,
            "column reference opened but never closed",
        ));
    }
    tokens.push(Token::Text(buf));
    Ok(tokens)
}

/// Parse one definition, resolving references against the header.
pub fn parse_definition(template: &str, lookup: &ColumnLookup) -> Result<ColumnDefinition> {
    let expressions = lex(template)?
        .into_iter()
        .map(|token| match token {
            Token::Text(text) => Ok(Expression::Literal(text)),
            Token::Reference(name) => lookup
                .resolve(&name)
                .map(Expression::ColumnReference)
                .ok_or_else(|| PipelineError::column_not_found(Stage::Template, &name)),
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(ColumnDefinition { expressions })
}

/// Parse a full `expr;expr;...` spec. An empty spec defines no columns.
pub fn parse_definitions(spec: &str, lookup: &ColumnLookup) -> Result<Vec<ColumnDefinition>> {
    if spec.is_empty() {
        return Ok(Vec::new());
    }
    let definitions = spec
        .split(';')
        .map(|template| parse_definition(template, lookup))
        .collect::<Result<Vec<_>>>()?;
    debug!(count = definitions.len(), "parsed column definitions");
    Ok(definitions)
}

/// Evaluate every definition against `row`, one new cell per definition.
pub fn synthesize(definitions: &[ColumnDefinition], row: &[String]) -> Vec<String> {
    definitions.iter().map(|d| d.evaluate(row)).collect()
}

/// Appends synthesized cells to every row pulled from upstream.
pub struct ColumnSynthesizer<S> {
    source: S,
    definitions: Vec<ColumnDefinition>,
}

impl<S: RowSource> ColumnSynthesizer<S> {
    pub fn new(source: S, definitions: Vec<ColumnDefinition>) -> Self {
        Self {
            source,
            definitions,
        }
    }

    /// Header extended with the labels the definitions produce for it.
    pub fn extend_header(&self, header: &[String]) -> Row {
        let mut extended = header.to_vec();
        extended.extend(synthesize(&self.definitions, header));
        extended
    }
}

impl<S: RowSource> RowSource for ColumnSynthesizer<S> {
    fn next_row(&mut self) -> Result<Option<Row>> {
        let Some(mut row) = self.source.next_row()? else {
            return Ok(None);
        };
        if !self.definitions.is_empty() {
            let cells = synthesize(&self.definitions, &row);
            row.extend(cells);
        }
        Ok(Some(row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::row_of;
    use crate::source::from_rows;

    fn abc() -> (Row, ColumnLookup) {
        let header = row_of(&["a", "b", "c"]);
        let lookup = ColumnLookup::new(&header);
        (header, lookup)
    }

    fn reason(err: PipelineError) -> String {
        match err {
            PipelineError::TemplateParse { reason, .. } => reason,
            other => panic!("Expected TemplateParse, got {other:?}"),
        }
    }

    #[test]
    fn test_lex_mixed() {
        let tokens = lex("id-{a}:{b}").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Text("id-".to_string()),
                Token::Reference("a".to_string()),
                Token::Text(":".to_string()),
                Token::Reference("b".to_string()),
                Token::Text(String::new()),
            ]
        );
    }

    #[test]
    fn test_lex_plain_text() {
        assert_eq!(lex("abc").unwrap(), vec![Token::Text("abc".to_string())]);
        assert_eq!(lex("").unwrap(), vec![Token::Text(String::new())]);
    }

    #[test]
    fn test_lex_nested_open() {
        let err = lex("{a{b}}").unwrap_err();
        assert!(reason(err).contains("before previous one closed"));
    }

    #[test]
    fn test_lex_close_without_open() {
        let err = lex("a}").unwrap_err();
        assert!(reason(err).contains("without an opening brace"));
    }

    #[test]
    fn test_lex_unclosed() {
        let err = lex("x{a").unwrap_err();
        assert!(reason(err).contains("never closed"));
    }

    #[test]
    fn test_parse_unknown_column() {
        let (_, lookup) = abc();
        let err = parse_definition("{zzz}", &lookup).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::ColumnNotFound { stage: Stage::Template, name } if name == "zzz"
        ));
    }

    #[test]
    fn test_parse_resolves_aliases() {
        let (_, lookup) = abc();
        let def = parse_definition("{_3}", &lookup).unwrap();
        assert!(def.expressions.contains(&Expression::ColumnReference(2)));
    }

    #[test]
    fn test_header_and_row_round_trip() {
        let (header, lookup) = abc();
        let def = parse_definition("{a}-{b}", &lookup).unwrap();
        assert_eq!(def.evaluate(&header), "a-b");
        assert_eq!(def.evaluate(&row_of(&["1", "2", "3"])), "1-2");
    }

    #[test]
    fn test_adjacent_references() {
        let (header, lookup) = abc();
        let defs = parse_definitions("{a}{b}", &lookup).unwrap();
        assert_eq!(synthesize(&defs, &header), vec!["ab"]);
        assert_eq!(synthesize(&defs, &row_of(&["1", "2", "3"])), vec!["12"]);
    }

    #[test]
    fn test_short_row_yields_missing() {
        let (_, lookup) = abc();
        let def = parse_definition("<{c}>", &lookup).unwrap();
        assert_eq!(def.evaluate(&row_of(&["1"])), "<missing>");
    }

    #[test]
    fn test_multiple_definitions() {
        let (_, lookup) = abc();
        let defs = parse_definitions("{a};{c}!;fixed", &lookup).unwrap();
        assert_eq!(defs.len(), 3);
        assert_eq!(
            synthesize(&defs, &row_of(&["1", "2", "3"])),
            vec!["1", "3!", "fixed"]
        );
    }

    #[test]
    fn test_empty_spec_defines_nothing() {
        let (_, lookup) = abc();
        assert!(parse_definitions("", &lookup).unwrap().is_empty());
    }

    #[test]
    fn test_one_bad_definition_fails_all() {
        let (_, lookup) = abc();
        assert!(parse_definitions("{a};{nope}", &lookup).is_err());
    }

    #[test]
    fn test_synthesizer_appends_cells() {
        let (header, lookup) = abc();
        let defs = parse_definitions("{c}{a}", &lookup).unwrap();
        let rows = vec![row_of(&["1", "2", "3"]), row_of(&["4", "5", "6"])];
        let mut synth = ColumnSynthesizer::new(from_rows(rows), defs);

        assert_eq!(synth.extend_header(&header), row_of(&["a", "b", "c", "ca"]));
        assert_eq!(
            synth.next_row().unwrap(),
            Some(row_of(&["1", "2", "3", "31"]))
        );
        assert_eq!(
            synth.next_row().unwrap(),
            Some(row_of(&["4", "5", "6", "64"]))
        );
        assert_eq!(synth.next_row().unwrap(), None);
    }

    #[test]
    fn test_synthesizer_without_definitions_passes_through() {
        let mut synth = ColumnSynthesizer::new(from_rows(vec![row_of(&["x"])]), Vec::new());
        assert_eq!(synth.next_row().unwrap(), Some(row_of(&["x"])));
    }
}
