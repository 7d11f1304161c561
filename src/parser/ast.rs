//! Syntax tree produced by the parser and walked by the interpreter.
//!
//! Nodes are immutable after parsing and carry the token they were read
//! from. `Display` renders the canonical text form: statements joined by a
//! single space, expressions fully parenthesized.

use std::fmt;

use crate::token::{Token, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixOperator {
    Not,
    Negate,
}

impl fmt::Display for PrefixOperator {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Not => formatter.write_str("!"),
            Self::Negate => formatter.write_str("-"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfixOperator {
    Plus,
    Minus,
    Asterisk,
    Slash,
    Equals,
    NotEquals,
    Greater,
    GreaterOrEquals,
    Less,
    LessOrEquals,
}

impl InfixOperator {
    pub(crate) fn from_token_kind(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Plus => Some(Self::Plus),
            TokenKind::Minus => Some(Self::Minus),
            TokenKind::Asterisk => Some(Self::Asterisk),
            TokenKind::Slash => Some(Self::Slash),
            TokenKind::Equals => Some(Self::Equals),
            TokenKind::NotEquals => Some(Self::NotEquals),
            TokenKind::Greater => Some(Self::Greater),
            TokenKind::GreaterOrEquals => Some(Self::GreaterOrEquals),
            TokenKind::Less => Some(Self::Less),
            TokenKind::LessOrEquals => Some(Self::LessOrEquals),
            _ => None,
        }
    }
}

impl fmt::Display for InfixOperator {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Asterisk => "*",
            Self::Slash => "/",
            Self::Equals => "==",
            Self::NotEquals => "!=",
            Self::Greater => ">",
            Self::GreaterOrEquals => ">=",
            Self::Less => "<",
            Self::LessOrEquals => "<=",
        };
        formatter.write_str(symbol)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    pub token: Token,
    pub name: String,
}

impl fmt::Display for Identifier {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.name)
    }
}

/// Ordered sequence of statements; the program root and every braced block.
#[derive(Debug, Clone, PartialEq)]
pub struct Compound {
    pub token: Token,
    pub statements: Vec<Statement>,
}

impl fmt::Display for Compound {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&join(&self.statements, " "))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Let {
        token: Token,
        identifier: Identifier,
        value: Option<Expression>,
    },
    Return {
        token: Token,
        value: Option<Expression>,
    },
    Expression {
        token: Token,
        expression: Expression,
    },
}

impl fmt::Display for Statement {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Let {
                token,
                identifier,
                value,
            } => {
                write!(formatter, "{} {identifier}", token.literal)?;
                if let Some(value) = value {
                    write!(formatter, " = {value}")?;
                }
                formatter.write_str(";")
            }
            Self::Return { token, value } => {
                formatter.write_str(&token.literal)?;
                if let Some(value) = value {
                    write!(formatter, " {value}")?;
                }
                formatter.write_str(";")
            }
            Self::Expression { expression, .. } => write!(formatter, "{expression};"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Integer {
        token: Token,
        value: i64,
    },
    Boolean {
        token: Token,
        value: bool,
    },
    String {
        token: Token,
        value: String,
    },
    Identifier(Identifier),
    Prefix {
        token: Token,
        operator: PrefixOperator,
        right: Box<Expression>,
    },
    Infix {
        token: Token,
        left: Box<Expression>,
        operator: InfixOperator,
        right: Box<Expression>,
    },
    Array {
        token: Token,
        items: Vec<Expression>,
    },
    Hash {
        token: Token,
        pairs: Vec<(Expression, Expression)>,
    },
    Index {
        token: Token,
        left: Box<Expression>,
        index: Box<Expression>,
    },
    FunctionDefinition {
        token: Token,
        parameters: Vec<Identifier>,
        body: Compound,
    },
    FunctionCall {
        token: Token,
        function: Box<Expression>,
        arguments: Vec<Expression>,
    },
    IfElse {
        token: Token,
        condition: Box<Expression>,
        then_branch: Compound,
        else_branch: Option<Compound>,
    },
    /// Placeholder emitted where an expression was required but none could
    /// be parsed; the statement that contains it also carries a diagnostic.
    Invalid {
        token: Token,
    },
}

impl fmt::Display for Expression {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer { value, .. } => write!(formatter, "{value}"),
            Self::Boolean { value, .. } => write!(formatter, "{value}"),
            Self::String { value, .. } => write!(formatter, "\"{value}\""),
            Self::Identifier(identifier) => write!(formatter, "{identifier}"),
            Self::Prefix {
                operator, right, ..
            } => write!(formatter, "({operator}{right})"),
            Self::Infix {
                left,
                operator,
                right,
                ..
            } => write!(formatter, "({left} {operator} {right})"),
            Self::Array { items, .. } => write!(formatter, "[{}]", join(items, ", ")),
            Self::Hash { pairs, .. } => {
                let rendered = pairs
                    .iter()
                    .map(|(key, value)| format!("{key}: {value}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(formatter, "{{{rendered}}}")
            }
            Self::Index { left, index, .. } => write!(formatter, "{left}[{index}]"),
            Self::FunctionDefinition {
                token,
                parameters,
                body,
            } => {
                write!(
                    formatter,
                    "{} ({}) {{ {body} }}",
                    token.literal,
                    join(parameters, ", ")
                )
            }
            Self::FunctionCall {
                function,
                arguments,
                ..
            } => write!(formatter, "{function}({})", join(arguments, ", ")),
            Self::IfElse {
                token,
                condition,
                then_branch,
                else_branch,
            } => {
                write!(
                    formatter,
                    "{} ({condition}) {{ {then_branch} }}",
                    token.literal
                )?;
                if let Some(else_branch) = else_branch {
                    write!(formatter, " else {{ {else_branch} }}")?;
                }
                Ok(())
            }
            Self::Invalid { .. } => Ok(()),
        }
    }
}

fn join<T: fmt::Display>(items: &[T], separator: &str) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(separator)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tok(kind: TokenKind, literal: &str) -> Token {
        Token::new(kind, literal)
    }

    fn ident(name: &str) -> Identifier {
        Identifier {
            token: tok(TokenKind::Identifier, name),
            name: name.to_string(),
        }
    }

    fn int(value: i64) -> Expression {
        Expression::Integer {
            token: tok(TokenKind::Integer, &value.to_string()),
            value,
        }
    }

    #[test]
    fn renders_let_with_and_without_initializer() {
        let with_value = Statement::Let {
            token: tok(TokenKind::Let, "let"),
            identifier: ident("a"),
            value: Some(int(2)),
        };
        assert_eq!(with_value.to_string(), "let a = 2;");

        let without_value = Statement::Let {
            token: tok(TokenKind::Let, "let"),
            identifier: ident("a"),
            value: None,
        };
        assert_eq!(without_value.to_string(), "let a;");
    }

    #[test]
    fn renders_function_definition_and_call() {
        let body = Compound {
            token: tok(TokenKind::Return, "return"),
            statements: vec![Statement::Return {
                token: tok(TokenKind::Return, "return"),
                value: Some(Expression::Identifier(ident("a"))),
            }],
        };
        let definition = Expression::FunctionDefinition {
            token: tok(TokenKind::Function, "fn"),
            parameters: vec![ident("a"), ident("b")],
            body,
        };
        assert_eq!(definition.to_string(), "fn (a, b) { return a; }");

        let call = Expression::FunctionCall {
            token: tok(TokenKind::OpenParen, "("),
            function: Box::new(Expression::Identifier(ident("add"))),
            arguments: vec![int(1), int(2)],
        };
        assert_eq!(call.to_string(), "add(1, 2)");
    }

    #[test]
    fn renders_if_without_else_branch() {
        let if_else = Expression::IfElse {
            token: tok(TokenKind::If, "if"),
            condition: Box::new(Expression::Boolean {
                token: tok(TokenKind::True, "true"),
                value: true,
            }),
            then_branch: Compound {
                token: tok(TokenKind::Integer, "1"),
                statements: vec![Statement::Expression {
                    token: tok(TokenKind::Integer, "1"),
                    expression: int(1),
                }],
            },
            else_branch: None,
        };
        assert_eq!(if_else.to_string(), "if (true) { 1; }");
    }

    #[test]
    fn renders_hash_pairs_in_source_order() {
        let hash = Expression::Hash {
            token: tok(TokenKind::OpenBrace, "{"),
            pairs: vec![
                (
                    Expression::String {
                        token: tok(TokenKind::String, "b"),
                        value: "b".to_string(),
                    },
                    int(1),
                ),
                (
                    Expression::String {
                        token: tok(TokenKind::String, "a"),
                        value: "a".to_string(),
                    },
                    int(2),
                ),
            ],
        };
        assert_eq!(hash.to_string(), "{\"b\": 1, \"a\": 2}");
    }
}
