//! Syntax tree produced by the parser

use std::fmt;

use serde::{Deserialize, Serialize};

/// Location of a node in the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Span {
    /// Byte offset of the first character
    pub start: usize,
    /// Byte offset one past the last character
    pub end: usize,
    /// 1-based line of `start`
    pub line: usize,
    /// 1-based column of `start`
    pub column: usize,
}

/// A parsed script: top-level commands in document order
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Script {
    pub commands: Vec<CommandExpression>,
}

/// `[module:]name arg* [( block )]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandExpression {
    /// Module alias when the command is qualified (`ar:connect`)
    pub module: Option<String>,
    pub name: String,
    pub args: Vec<Expression>,
    /// Nested commands between parentheses
    pub block: Option<Vec<CommandExpression>>,
    pub span: Span,
}

impl CommandExpression {
    /// Name as written, including the module qualifier
    pub fn qualified_name(&self) -> String {
        match &self.module {
            Some(module) => format!("{}:{}", module, self.name),
            None => self.name.clone(),
        }
    }
}

/// Argument expressions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    StringLiteral(String),
    /// Numeric text as written; converted to an integer on evaluation
    NumberLiteral(String),
    BoolLiteral(bool),
    AddressLiteral(String),
    BytesLiteral(String),
    ArrayLiteral(Vec<Expression>),
    /// Bare word resolved late against the address bindings
    ProbableIdentifier(String),
    /// `@name(args)`
    HelperFunctionCall { name: String, args: Vec<Expression> },
    /// `$name`, stored without the sigil
    VariableIdentifier(String),
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[Expression]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::StringLiteral(s) => write!(f, "\"{}\"", s),
            Expression::NumberLiteral(n) => write!(f, "{}", n),
            Expression::BoolLiteral(b) => write!(f, "{}", b),
            Expression::AddressLiteral(a) => write!(f, "{}", a),
            Expression::BytesLiteral(b) => write!(f, "{}", b),
            Expression::ArrayLiteral(items) => {
                write!(f, "[")?;
                write_list(f, items)?;
                write!(f, "]")
            }
            Expression::ProbableIdentifier(id) => write!(f, "{}", id),
            Expression::HelperFunctionCall { name, args } => {
                write!(f, "@{}", name)?;
                if !args.is_empty() {
                    write!(f, "(")?;
                    write_list(f, args)?;
                    write!(f, ")")?;
                }
                Ok(())
            }
            Expression::VariableIdentifier(name) => write!(f, "${}", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expression_display_matches_source_form() {
        let expr = Expression::HelperFunctionCall {
            name: "ens".to_string(),
            args: vec![
                Expression::StringLiteral("dao.eth".to_string()),
                Expression::VariableIdentifier("registry".to_string()),
            ],
        };
        assert_eq!(expr.to_string(), "@ens(\"dao.eth\", $registry)");
        assert_eq!(
            Expression::HelperFunctionCall { name: "me".to_string(), args: vec![] }.to_string(),
            "@me"
        );
    }
}
