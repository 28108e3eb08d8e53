//! pest-based parser producing the script syntax tree
//!
//! Parsing never fails outright. A script that does not match the grammar is
//! split into its top-level statements, each statement is parsed on its own,
//! and every statement that fails contributes one [`ParseError`].

use pest::error::InputLocation;
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;
use tracing::debug;

use crate::ast::{CommandExpression, Expression, Script, Span};
use crate::error::{line_col, ParseError};

#[derive(Parser)]
#[grammar = "grammar.pest"]
pub struct ScriptParser;

/// Parse a script, returning the best-effort tree and every syntax error found
pub fn parse(source: &str) -> (Script, Vec<ParseError>) {
    match ScriptParser::parse(Rule::script, source) {
        Ok(pairs) => {
            let builder = AstBuilder { source, offset: 0 };
            let mut script = Script::default();
            let mut errors = Vec::new();
            for pair in pairs {
                match builder.commands_of(pair) {
                    Ok(commands) => script.commands.extend(commands),
                    Err(err) => errors.push(err),
                }
            }
            (script, errors)
        }
        Err(_) => recover(source),
    }
}

fn recover(source: &str) -> (Script, Vec<ParseError>) {
    let mut script = Script::default();
    let mut errors = Vec::new();

    for (offset, chunk) in split_statements(source) {
        let builder = AstBuilder { source, offset };
        match ScriptParser::parse(Rule::statement, chunk) {
            Ok(pairs) => {
                for pair in pairs {
                    match builder.commands_of(pair) {
                        Ok(commands) => script.commands.extend(commands),
                        Err(err) => errors.push(err),
                    }
                }
            }
            Err(err) => {
                let local = match err.location {
                    InputLocation::Pos(pos) => pos,
                    InputLocation::Span((start, _)) => start,
                };
                let message = err.renamed_rules(describe_rule).variant.message().into_owned();
                errors.push(ParseError::new(message, source, offset + local));
            }
        }
    }

    debug!(
        statements = script.commands.len(),
        errors = errors.len(),
        "Recovered from syntax errors"
    );
    (script, errors)
}

/// Split a script into top-level statements: a newline ends a statement unless
/// it sits inside parentheses or brackets. Blank and comment-only chunks are
/// dropped.
fn split_statements(source: &str) -> Vec<(usize, &str)> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut depth: i32 = 0;
    let mut quote: Option<char> = None;
    let mut in_comment = false;

    for (i, ch) in source.char_indices() {
        if in_comment {
            if ch != '\n' {
                continue;
            }
            in_comment = false;
        } else if let Some(q) = quote {
            if ch == q {
                quote = None;
                continue;
            }
            if ch != '\n' {
                continue;
            }
            quote = None;
        }

        match ch {
            '"' | '\'' => quote = Some(ch),
            '#' => in_comment = true,
            '(' | '[' => depth += 1,
            ')' | ']' => depth -= 1,
            '\n' if depth <= 0 => {
                chunks.push((start, &source[start..i]));
                start = i + 1;
                depth = 0;
            }
            _ => {}
        }
    }
    chunks.push((start, &source[start..]));

    chunks.into_iter().filter(|(_, chunk)| !is_blank(chunk)).collect()
}

fn is_blank(chunk: &str) -> bool {
    chunk.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#')
    })
}

fn describe_rule(rule: &Rule) -> String {
    let name = match rule {
        Rule::command | Rule::command_head | Rule::command_name => "command",
        Rule::module_alias => "module alias",
        Rule::block => "block",
        Rule::helper_call | Rule::helper_name => "helper",
        Rule::helper_args => "helper arguments",
        Rule::array => "array",
        Rule::address => "address",
        Rule::bytes => "hex bytes",
        Rule::number => "number",
        Rule::boolean => "boolean",
        Rule::string | Rule::double_quoted | Rule::single_quoted => "string",
        Rule::variable => "variable",
        Rule::identifier => "identifier",
        Rule::EOI => "end of input",
        other => return format!("{:?}", other),
    };
    name.to_string()
}

/// Converts pest pairs into syntax tree nodes. `offset` is the position of
/// the parsed text inside the whole script.
struct AstBuilder<'s> {
    source: &'s str,
    offset: usize,
}

impl<'s> AstBuilder<'s> {
    fn span(&self, pair: &Pair<'_, Rule>) -> Span {
        let span = pair.as_span();
        let start = self.offset + span.start();
        let (line, column) = line_col(self.source, start);
        Span {
            start,
            end: self.offset + span.end(),
            line,
            column,
        }
    }

    fn error(&self, message: impl Into<String>, pair: &Pair<'_, Rule>) -> ParseError {
        ParseError::new(message, self.source, self.offset + pair.as_span().start())
    }

    fn commands_of(&self, pair: Pair<'_, Rule>) -> Result<Vec<CommandExpression>, ParseError> {
        pair.into_inner()
            .filter(|inner| inner.as_rule() == Rule::command)
            .map(|inner| self.command(inner))
            .collect()
    }

    fn command(&self, pair: Pair<'_, Rule>) -> Result<CommandExpression, ParseError> {
        let span = self.span(&pair);
        let head_error = self.error("missing command name", &pair);

        let mut module = None;
        let mut name = None;
        let mut args = Vec::new();
        let mut block = None;

        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::command_head => {
                    for part in inner.into_inner() {
                        match part.as_rule() {
                            Rule::module_alias => module = Some(part.as_str().to_string()),
                            Rule::command_name => name = Some(part.as_str().to_string()),
                            _ => {}
                        }
                    }
                }
                Rule::block => block = Some(self.commands_of(inner)?),
                _ => args.push(self.expression(inner)?),
            }
        }

        Ok(CommandExpression {
            module,
            name: name.ok_or(head_error)?,
            args,
            block,
            span,
        })
    }

    fn expressions(&self, pair: Pair<'_, Rule>) -> Result<Vec<Expression>, ParseError> {
        pair.into_inner().map(|inner| self.expression(inner)).collect()
    }

    fn expression(&self, pair: Pair<'_, Rule>) -> Result<Expression, ParseError> {
        let text = pair.as_str();
        match pair.as_rule() {
            Rule::helper_call => {
                let mut name = String::new();
                let mut args = Vec::new();
                for part in pair.into_inner() {
                    match part.as_rule() {
                        Rule::helper_name => name = part.as_str().trim_start_matches('@').to_string(),
                        Rule::helper_args => args = self.expressions(part)?,
                        _ => {}
                    }
                }
                Ok(Expression::HelperFunctionCall { name, args })
            }
            Rule::array => Ok(Expression::ArrayLiteral(self.expressions(pair)?)),
            Rule::address => Ok(Expression::AddressLiteral(text.to_string())),
            Rule::bytes => Ok(Expression::BytesLiteral(text.to_string())),
            Rule::number => Ok(Expression::NumberLiteral(text.to_string())),
            Rule::boolean => Ok(Expression::BoolLiteral(text == "true")),
            Rule::string => {
                let inner = pair
                    .into_inner()
                    .next()
                    .map(|p| p.as_str().to_string())
                    .unwrap_or_default();
                Ok(Expression::StringLiteral(inner))
            }
            Rule::variable => Ok(Expression::VariableIdentifier(
                text.trim_start_matches('$').to_string(),
            )),
            Rule::identifier => Ok(Expression::ProbableIdentifier(text.to_string())),
            other => Err(self.error(format!("unexpected {}", describe_rule(&other)), &pair)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ident(s: &str) -> Expression {
        Expression::ProbableIdentifier(s.to_string())
    }

    #[test]
    fn test_parse_connect_block() {
        let source = "load aragonos as ar\nar:connect 0x1c06257469514574c0868fdcb83c5509b5513870 (\n  grant @me vault TRANSFER_ROLE\n)\n";
        let (script, errors) = parse(source);
        assert!(errors.is_empty(), "{:?}", errors);
        assert_eq!(script.commands.len(), 2);

        let load = &script.commands[0];
        assert_eq!(load.module, None);
        assert_eq!(load.name, "load");
        assert_eq!(load.args, vec![ident("aragonos"), ident("as"), ident("ar")]);
        assert!(load.block.is_none());

        let connect = &script.commands[1];
        assert_eq!(connect.qualified_name(), "ar:connect");
        assert_eq!(
            connect.args,
            vec![Expression::AddressLiteral(
                "0x1c06257469514574c0868fdcb83c5509b5513870".to_string()
            )]
        );
        assert_eq!(connect.span.line, 2);

        let block = connect.block.as_ref().unwrap();
        assert_eq!(block.len(), 1);
        assert_eq!(block[0].name, "grant");
        assert_eq!(
            block[0].args,
            vec![
                Expression::HelperFunctionCall { name: "me".to_string(), args: vec![] },
                ident("vault"),
                ident("TRANSFER_ROLE"),
            ]
        );
        assert_eq!(block[0].span.line, 3);
        assert_eq!(block[0].span.column, 3);
    }

    #[test]
    fn test_parse_literals() {
        let (script, errors) =
            parse("set $x [1.5e18, true, 'single', \"double\", 0xdead, $y, vault:1]");
        assert!(errors.is_empty(), "{:?}", errors);
        let args = &script.commands[0].args;
        assert_eq!(args[0], Expression::VariableIdentifier("x".to_string()));
        assert_eq!(
            args[1],
            Expression::ArrayLiteral(vec![
                Expression::NumberLiteral("1.5e18".to_string()),
                Expression::BoolLiteral(true),
                Expression::StringLiteral("single".to_string()),
                Expression::StringLiteral("double".to_string()),
                Expression::BytesLiteral("0xdead".to_string()),
                Expression::VariableIdentifier("y".to_string()),
                ident("vault:1"),
            ])
        );
    }

    #[test]
    fn test_nested_helpers_and_blocks() {
        let source = "connect @ens(\"dao.aragonid.eth\", @ens(registry.eth)) voting (\n  connect other (\n    revoke ANY_ENTITY vault ROLE true\n  )\n)";
        let (script, errors) = parse(source);
        assert!(errors.is_empty(), "{:?}", errors);

        let outer = &script.commands[0];
        assert_eq!(
            outer.args[0],
            Expression::HelperFunctionCall {
                name: "ens".to_string(),
                args: vec![
                    Expression::StringLiteral("dao.aragonid.eth".to_string()),
                    Expression::HelperFunctionCall {
                        name: "ens".to_string(),
                        args: vec![ident("registry.eth")],
                    },
                ],
            }
        );
        let inner = &outer.block.as_ref().unwrap()[0];
        assert_eq!(inner.name, "connect");
        let revoke = &inner.block.as_ref().unwrap()[0];
        assert_eq!(revoke.args[3], Expression::BoolLiteral(true));
    }

    #[test]
    fn test_comments_and_blank_lines() {
        let source = "# header\n\nload aragonos # trailing\n\n   # indented\nswitch 100\n";
        let (script, errors) = parse(source);
        assert!(errors.is_empty(), "{:?}", errors);
        assert_eq!(script.commands.len(), 2);
        assert_eq!(script.commands[1].args, vec![Expression::NumberLiteral("100".to_string())]);
    }

    #[test]
    fn test_empty_block() {
        let (script, errors) = parse("connect dao (\n)");
        assert!(errors.is_empty(), "{:?}", errors);
        assert_eq!(script.commands[0].block, Some(vec![]));
    }

    #[test]
    fn test_errors_are_collected_with_best_effort_tree() {
        let source = "load aragonos\ngrant @me vault ROLE }\nswitch 1\n";
        let (script, errors) = parse(source);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].line, 2);
        assert!(errors[0].column > 1);

        let names: Vec<_> = script.commands.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["load", "switch"]);
    }

    #[test]
    fn test_unclosed_block_reports_error() {
        let (script, errors) = parse("connect dao (\n  grant a b c\n");
        assert!(script.commands.is_empty());
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.starts_with("expected"), "{}", errors[0].message);
    }

    #[test]
    fn test_split_statements_respects_nesting() {
        let source = "a (\n b\n)\nc \"x\ny\"";
        let chunks = split_statements(source);
        assert_eq!(chunks[0], (0, "a (\n b\n)"));
        assert_eq!(chunks[1].1, "c \"x");
    }
}
