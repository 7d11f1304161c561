//! Pratt-style recursive-descent parser.
//!
//! The parser drains the lexer once at construction and then drives itself
//! by position into the token vector. It always returns a tree; diagnostics
//! accumulate on the side (one per statement) and callers check
//! [`Parser::has_errors`] before trusting the tree.

use thiserror::Error;

use crate::lexer::Lexer;
use crate::parser::ast::{
    Compound, Expression, Identifier, InfixOperator, PrefixOperator, Statement,
};
use crate::token::{Token, TokenKind};

pub mod ast;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Lowest,
    Equals,
    LessGreater,
    Sum,
    Product,
    Prefix,
    Index,
    Call,
}

fn precedence_of(kind: TokenKind) -> Precedence {
    match kind {
        TokenKind::Equals | TokenKind::NotEquals => Precedence::Equals,
        TokenKind::Greater
        | TokenKind::GreaterOrEquals
        | TokenKind::Less
        | TokenKind::LessOrEquals => Precedence::LessGreater,
        TokenKind::Plus | TokenKind::Minus => Precedence::Sum,
        TokenKind::Asterisk | TokenKind::Slash => Precedence::Product,
        TokenKind::OpenBracket => Precedence::Index,
        TokenKind::OpenParen => Precedence::Call,
        _ => Precedence::Lowest,
    }
}

/// Renders a token literal for diagnostics: double-quoted, control bytes
/// escaped (NUL as `\x00`), printable ASCII kept as-is.
fn quote(literal: &str) -> String {
    let mut quoted = String::with_capacity(literal.len() + 2);
    quoted.push('"');
    for character in literal.chars() {
        match character {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\x07' => quoted.push_str("\\a"),
            '\x08' => quoted.push_str("\\b"),
            '\x0c' => quoted.push_str("\\f"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            '\x0b' => quoted.push_str("\\v"),
            character if (character as u32) < 0x20 || character as u32 == 0x7f => {
                quoted.push_str(&format!("\\x{:02x}", character as u32));
            }
            character => quoted.push(character),
        }
    }
    quoted.push('"');
    quoted
}

/// Host-facing failure carrying every diagnostic the parser committed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{}", .diagnostics.join("\n"))]
pub struct ParseError {
    pub diagnostics: Vec<String>,
}

/// Parses one source text into a root [`Compound`], or the diagnostics.
pub fn parse_source(input: &str) -> Result<Compound, ParseError> {
    let mut parser = Parser::new(Lexer::new(input));
    let program = parser.parse();
    if parser.has_errors() {
        return Err(ParseError {
            diagnostics: parser.errors().to_vec(),
        });
    }
    Ok(program)
}

pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
    errors: Vec<String>,
    pending_error: Option<String>,
}

impl Parser {
    pub fn new(mut lexer: Lexer) -> Self {
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        Self {
            tokens,
            position: 0,
            errors: Vec::new(),
            pending_error: None,
        }
    }

    pub fn parse(&mut self) -> Compound {
        let compound = self.parse_compound();
        self.expect(&[TokenKind::Eof]);
        self.commit_error();
        compound
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    fn current(&self) -> &Token {
        &self.tokens[self.position]
    }

    fn current_kind(&self) -> TokenKind {
        self.tokens[self.position].kind
    }

    fn advance(&mut self) {
        // The vector ends with the end-of-input token; stay on it.
        if self.position + 1 < self.tokens.len() {
            self.position += 1;
        }
    }

    // Only the first mismatch per statement is kept; commit_error flushes it
    // at each statement boundary.
    fn error(&mut self, message: String) {
        if self.pending_error.is_none() {
            self.pending_error = Some(message);
        }
    }

    fn commit_error(&mut self) {
        if let Some(message) = self.pending_error.take() {
            self.errors.push(message);
        }
    }

    fn expect(&mut self, kinds: &[TokenKind]) {
        if kinds.contains(&self.current_kind()) {
            return;
        }
        let expected = kinds
            .iter()
            .map(|kind| kind.name())
            .collect::<Vec<_>>()
            .join(", ");
        let message = format!(
            "Expected token of type {expected}. Found token {} of type {}.",
            quote(&self.current().literal),
            self.current_kind().name(),
        );
        self.error(message);
    }

    fn parse_identifier(&mut self) -> Identifier {
        let token = self.current().clone();
        let name = token.literal.clone();
        self.advance();
        Identifier { token, name }
    }

    fn parse_integer_literal(&mut self) -> Expression {
        let token = self.current().clone();
        let value = token.literal.parse().unwrap_or_default();
        self.advance();
        Expression::Integer { token, value }
    }

    fn parse_boolean_literal(&mut self) -> Expression {
        let token = self.current().clone();
        let value = token.kind == TokenKind::True;
        self.advance();
        Expression::Boolean { token, value }
    }

    fn parse_string_literal(&mut self) -> Expression {
        let token = self.current().clone();
        let value = token.literal.clone();
        self.advance();
        Expression::String { token, value }
    }

    fn parse_prefix_expression(&mut self) -> Expression {
        let token = self.current().clone();
        let operator = if token.kind == TokenKind::Bang {
            PrefixOperator::Not
        } else {
            PrefixOperator::Negate
        };
        self.advance();
        let right = Box::new(self.parse_expression(Precedence::Prefix));
        Expression::Prefix {
            token,
            operator,
            right,
        }
    }

    fn parse_infix_expression(&mut self, left: Expression, operator: InfixOperator) -> Expression {
        let token = self.current().clone();
        let precedence = precedence_of(token.kind);
        self.advance();
        let right = Box::new(self.parse_expression(precedence));
        Expression::Infix {
            token,
            left: Box::new(left),
            operator,
            right,
        }
    }

    fn parse_grouped_expression(&mut self) -> Expression {
        self.advance();
        let expression = self.parse_expression(Precedence::Lowest);
        self.advance();
        expression
    }

    fn parse_array_literal(&mut self) -> Expression {
        let token = self.current().clone();
        let mut items = Vec::new();
        self.advance();
        while self.current_kind() != TokenKind::CloseBracket {
            items.push(self.parse_expression(Precedence::Lowest));
            if self.current_kind() != TokenKind::CloseBracket {
                self.expect(&[TokenKind::Comma]);
                if self.current_kind() == TokenKind::Comma {
                    self.advance();
                } else {
                    self.advance();
                    break;
                }
            }
        }

        self.expect(&[TokenKind::CloseBracket]);
        self.advance();

        self.commit_error();
        Expression::Array { token, items }
    }

    fn parse_hash_literal(&mut self) -> Expression {
        let token = self.current().clone();
        let mut pairs = Vec::new();
        self.advance();
        while self.current_kind() != TokenKind::CloseBrace {
            let key = self.parse_expression(Precedence::Lowest);

            self.expect(&[TokenKind::Colon]);
            self.advance();

            let value = self.parse_expression(Precedence::Lowest);
            pairs.push((key, value));

            if self.current_kind() != TokenKind::CloseBrace {
                self.expect(&[TokenKind::Comma]);
                if self.current_kind() == TokenKind::Comma {
                    self.advance();
                } else {
                    self.advance();
                    break;
                }
            }
        }

        self.expect(&[TokenKind::CloseBrace]);
        self.advance();

        self.commit_error();
        Expression::Hash { token, pairs }
    }

    fn parse_function_definition(&mut self) -> Expression {
        let token = self.current().clone();
        let mut parameters = Vec::new();

        self.advance();
        self.advance();

        while self.current_kind() != TokenKind::CloseParen {
            self.expect(&[TokenKind::Identifier]);
            parameters.push(self.parse_identifier());

            if self.current_kind() != TokenKind::CloseParen {
                self.expect(&[TokenKind::Comma]);
                if self.current_kind() == TokenKind::Comma {
                    self.advance();
                } else {
                    self.advance();
                    break;
                }
            }
        }

        self.expect(&[TokenKind::CloseParen]);
        self.advance();

        self.expect(&[TokenKind::OpenBrace]);
        self.advance();

        let body = self.parse_compound();

        self.expect(&[TokenKind::CloseBrace]);
        self.advance();

        self.commit_error();
        Expression::FunctionDefinition {
            token,
            parameters,
            body,
        }
    }

    fn parse_if_else(&mut self) -> Expression {
        let token = self.current().clone();
        self.advance();

        self.expect(&[TokenKind::OpenParen]);
        self.advance();

        let condition = Box::new(self.parse_expression(Precedence::Lowest));

        self.expect(&[TokenKind::CloseParen]);
        self.advance();

        self.expect(&[TokenKind::OpenBrace]);
        self.advance();

        let then_branch = self.parse_compound();

        self.expect(&[TokenKind::CloseBrace]);
        self.advance();

        if self.current_kind() != TokenKind::Else {
            self.commit_error();
            return Expression::IfElse {
                token,
                condition,
                then_branch,
                else_branch: None,
            };
        }

        self.advance();

        self.expect(&[TokenKind::OpenBrace]);
        self.advance();

        let else_branch = self.parse_compound();

        self.expect(&[TokenKind::CloseBrace]);
        self.advance();

        self.commit_error();
        Expression::IfElse {
            token,
            condition,
            then_branch,
            else_branch: Some(else_branch),
        }
    }

    fn parse_function_call(&mut self, left: Expression) -> Expression {
        let token = self.current().clone();
        let mut arguments = Vec::new();
        self.advance();

        while self.current_kind() != TokenKind::CloseParen {
            arguments.push(self.parse_expression(Precedence::Lowest));
            if self.current_kind() != TokenKind::CloseParen {
                self.expect(&[TokenKind::Comma]);
                if self.current_kind() == TokenKind::Comma {
                    self.advance();
                } else {
                    self.advance();
                    break;
                }
            }
        }

        self.expect(&[TokenKind::CloseParen]);
        self.advance();

        self.commit_error();
        Expression::FunctionCall {
            token,
            function: Box::new(left),
            arguments,
        }
    }

    fn parse_index(&mut self, left: Expression) -> Expression {
        let token = self.current().clone();
        self.advance();

        let index = Box::new(self.parse_expression(Precedence::Lowest));

        self.expect(&[TokenKind::CloseBracket]);
        self.advance();

        self.commit_error();
        Expression::Index {
            token,
            left: Box::new(left),
            index,
        }
    }

    fn parse_expression(&mut self, precedence: Precedence) -> Expression {
        let mut left = match self.current_kind() {
            TokenKind::Integer => self.parse_integer_literal(),
            TokenKind::True | TokenKind::False => self.parse_boolean_literal(),
            TokenKind::Identifier => Expression::Identifier(self.parse_identifier()),
            TokenKind::String => self.parse_string_literal(),
            TokenKind::OpenParen => self.parse_grouped_expression(),
            TokenKind::OpenBrace => self.parse_hash_literal(),
            TokenKind::OpenBracket => self.parse_array_literal(),
            TokenKind::Function => self.parse_function_definition(),
            TokenKind::If => self.parse_if_else(),
            TokenKind::Bang | TokenKind::Minus => self.parse_prefix_expression(),
            _ => {
                let token = self.current().clone();
                self.error(format!(
                    "Expected expression. Found token {} of type {}.",
                    quote(&token.literal),
                    token.kind.name(),
                ));
                Expression::Invalid { token }
            }
        };

        loop {
            let kind = self.current_kind();
            if precedence >= precedence_of(kind) {
                break;
            }
            left = match kind {
                TokenKind::OpenParen => self.parse_function_call(left),
                TokenKind::OpenBracket => self.parse_index(left),
                _ => match InfixOperator::from_token_kind(kind) {
                    Some(operator) => self.parse_infix_expression(left, operator),
                    // precedence_of only promotes call, index, and infix
                    // operator tokens above Lowest.
                    None => unreachable!("token {kind:?} has a precedence but no production"),
                },
            };
        }

        left
    }

    fn parse_compound(&mut self) -> Compound {
        let token = self.current().clone();
        let mut statements = Vec::new();

        while !matches!(self.current_kind(), TokenKind::CloseBrace | TokenKind::Eof) {
            statements.push(self.parse_statement());
        }

        Compound { token, statements }
    }

    fn parse_expression_statement(&mut self) -> Statement {
        let token = self.current().clone();
        let expression = self.parse_expression(Precedence::Lowest);

        self.expect(&[TokenKind::Semicolon]);
        self.advance();

        self.commit_error();
        Statement::Expression { token, expression }
    }

    fn parse_let_statement(&mut self) -> Statement {
        let token = self.current().clone();
        self.advance();

        let identifier = self.parse_identifier();

        // `let x;` declares without an initializer.
        if self.current_kind() == TokenKind::Semicolon {
            self.advance();
            self.commit_error();
            return Statement::Let {
                token,
                identifier,
                value: None,
            };
        }

        self.expect(&[TokenKind::Assign]);
        self.advance();

        let value = self.parse_expression(Precedence::Lowest);

        self.expect(&[TokenKind::Semicolon]);
        self.advance();

        self.commit_error();
        Statement::Let {
            token,
            identifier,
            value: Some(value),
        }
    }

    fn parse_return_statement(&mut self) -> Statement {
        let token = self.current().clone();
        self.advance();

        if self.current_kind() == TokenKind::Semicolon {
            self.advance();
            self.commit_error();
            return Statement::Return { token, value: None };
        }

        let value = self.parse_expression(Precedence::Lowest);

        self.expect(&[TokenKind::Semicolon]);
        self.advance();

        self.commit_error();
        Statement::Return {
            token,
            value: Some(value),
        }
    }

    fn parse_statement(&mut self) -> Statement {
        match self.current_kind() {
            TokenKind::Let => self.parse_let_statement(),
            TokenKind::Return => self.parse_return_statement(),
            _ => self.parse_expression_statement(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_display(input: &str) -> String {
        let mut parser = Parser::new(Lexer::new(input));
        parser.parse().to_string()
    }

    fn parse_errors(input: &str) -> Vec<String> {
        let mut parser = Parser::new(Lexer::new(input));
        parser.parse();
        parser.errors().to_vec()
    }

    #[test]
    fn renders_expressions_with_explicit_precedence() {
        let expectations = [
            ("-1", "(-1);"),
            ("2 + 2 * 4", "(2 + (2 * 4));"),
            ("2 - -2", "(2 - (-2));"),
            ("2 + 2 < 2 + 2", "((2 + 2) < (2 + 2));"),
            ("2 == 2 <= 2 + 2 * 2", "(2 == (2 <= (2 + (2 * 2))));"),
            ("2 < 3 == !false", "((2 < 3) == (!false));"),
            ("(2 + 2) * 6", "((2 + 2) * 6);"),
            ("2 - 2 + 2", "((2 - 2) + 2);"),
            ("2 - -my_variable + 2", "((2 - (-my_variable)) + 2);"),
            ("2 + add(1, 2 + 3)", "(2 + add(1, (2 + 3)));"),
        ];

        for (input, expected) in expectations {
            assert_eq!(parse_display(input), expected, "input: {input}");
        }
    }

    #[test]
    fn parses_statements_and_literals() {
        let expectations = [
            ("let a = 2;", "let a = 2;"),
            ("let a;", "let a;"),
            ("return;", "return;"),
            ("return 2 + 2;", "return (2 + 2);"),
            ("fn (a, b) { return a; };", "fn (a, b) { return a; };"),
            ("fn () {  };", "fn () {  };"),
            (
                "if (a < b) { a; } else { b; };",
                "if ((a < b)) { a; } else { b; };",
            ),
            ("if (a) { b; };", "if (a) { b; };"),
            ("[1, 2, 3];", "[1, 2, 3];"),
            ("{1: 2, \"a\": \"b\", true: false};", "{1: 2, \"a\": \"b\", true: false};"),
            ("d[\"hello\"];", "d[\"hello\"];"),
            ("add(1, 2)[0];", "add(1, 2)[0];"),
            ("let a = 1; a; 2 + 2;", "let a = 1; a; (2 + 2);"),
        ];

        for (input, expected) in expectations {
            let mut parser = Parser::new(Lexer::new(input));
            let program = parser.parse();
            assert!(
                !parser.has_errors(),
                "input {input:?} produced {:?}",
                parser.errors()
            );
            assert_eq!(program.to_string(), expected, "input: {input}");
        }
    }

    #[test]
    fn builds_the_expected_tree_for_a_let_statement() {
        let mut parser = Parser::new(Lexer::new("let a = 1;"));
        let program = parser.parse();
        assert!(!parser.has_errors());

        let expected = Compound {
            token: Token::new(TokenKind::Let, "let"),
            statements: vec![Statement::Let {
                token: Token::new(TokenKind::Let, "let"),
                identifier: Identifier {
                    token: Token::new(TokenKind::Identifier, "a"),
                    name: "a".to_string(),
                },
                value: Some(Expression::Integer {
                    token: Token::new(TokenKind::Integer, "1"),
                    value: 1,
                }),
            }],
        };
        assert_eq!(program, expected);
    }

    #[test]
    fn display_form_reparses_to_the_same_display() {
        let sources = [
            "let a = 2;",
            "let a;",
            "return;",
            "return 2 + 2 * 4;",
            "fn (a, b) { return a; };",
            "fn () {  };",
            "if (a < b) { a; } else { b; };",
            "if (a) { b; };",
            "[1, true, \"x\"];",
            "{1: 2, \"a\": \"b\"};",
            "add(1, 2)[0];",
            "-1;",
            "!true == false;",
            "let adder = fn (a) { return fn (b) { return a + b; }; }; adder(2)(1);",
        ];

        for source in sources {
            let mut first = Parser::new(Lexer::new(source));
            let first_program = first.parse();
            assert!(
                !first.has_errors(),
                "source {source:?} produced {:?}",
                first.errors()
            );
            let rendered = first_program.to_string();

            let mut second = Parser::new(Lexer::new(&rendered));
            let second_program = second.parse();
            assert!(
                !second.has_errors(),
                "rendered {rendered:?} produced {:?}",
                second.errors()
            );
            assert_eq!(second_program.to_string(), rendered, "source: {source}");
        }
    }

    #[test]
    fn reports_missing_terminator_at_end_of_input() {
        assert_eq!(
            parse_errors("-1"),
            vec!["Expected token of type semicolon. Found token \"\\x00\" of type eof."]
        );
    }

    #[test]
    fn reports_missing_assign_in_let_statement() {
        assert_eq!(
            parse_errors("let a 2;"),
            vec!["Expected token of type assign. Found token \"2\" of type integer."]
        );
    }

    #[test]
    fn keeps_only_the_first_error_per_statement() {
        // The missing comma is recorded; the later mismatches in the same
        // statement are suppressed.
        assert_eq!(
            parse_errors("[1 2];"),
            vec!["Expected token of type comma. Found token \"2\" of type integer."]
        );
    }

    #[test]
    fn accumulates_one_error_per_statement() {
        assert_eq!(
            parse_errors("let a 2; let b 3;"),
            vec![
                "Expected token of type assign. Found token \"2\" of type integer.",
                "Expected token of type assign. Found token \"3\" of type integer.",
            ]
        );
    }

    #[test]
    fn reports_missing_expression() {
        assert_eq!(
            parse_errors("@;"),
            vec![
                "Expected expression. Found token \"@\" of type illegal.",
                "Expected expression. Found token \";\" of type semicolon.",
            ]
        );
    }

    #[test]
    fn continues_past_errors() {
        let mut parser = Parser::new(Lexer::new("let a 2; a + 1;"));
        let program = parser.parse();
        assert!(parser.has_errors());
        assert_eq!(program.statements.len(), 2);
    }

    #[test]
    fn quotes_control_characters_in_diagnostics() {
        assert_eq!(quote("\0"), "\"\\x00\"");
        assert_eq!(quote("\n"), "\"\\n\"");
        assert_eq!(quote("a"), "\"a\"");
        assert_eq!(quote("\""), "\"\\\"\"");
        assert_eq!(quote("\x01"), "\"\\x01\"");
    }

    #[test]
    fn parse_source_wraps_diagnostics() {
        let error = parse_source("-1").expect_err("expected diagnostics");
        assert_eq!(
            error.to_string(),
            "Expected token of type semicolon. Found token \"\\x00\" of type eof."
        );
        assert!(parse_source("-1;").is_ok());
    }
}
