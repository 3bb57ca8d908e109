use thiserror::Error;

use crate::ast::{BinaryOperator, Expression, Param, Program, Statement};
use crate::token::{Keyword, Symbol, Token, TokenKind};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("Expected {expected}, found {found} at line {line}, column {column}")]
    UnexpectedToken {
        expected: String,
        found: String,
        line: usize,
        column: usize,
    },
}

pub struct Parser<'a> {
    tokens: Vec<Token<'a>>,
    position: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: Vec<Token<'a>>) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    pub fn parse_program(mut self) -> Result<Program, SyntaxError> {
        let mut statements = Vec::new();
        self.consume_newlines();
        while !matches!(self.current().kind, TokenKind::EOF) {
            statements.push(self.parse_statement()?);
            self.consume_newlines();
        }
        Ok(Program { statements })
    }

    fn parse_statement(&mut self) -> Result<Statement, SyntaxError> {
        match self.current().kind {
            TokenKind::Keyword(Keyword::Var) => self.parse_var_decl(),
            TokenKind::Keyword(Keyword::Func) => self.parse_function_def(),
            TokenKind::Keyword(Keyword::Class) => self.parse_class_def(),
            TokenKind::Keyword(Keyword::If) => self.parse_if(),
            TokenKind::Keyword(Keyword::While) => self.parse_while(),
            TokenKind::Identifier(_)
                if matches!(self.peek().kind, TokenKind::Symbol(Symbol::Equal)) =>
            {
                self.parse_assignment()
            }
            _ => Err(self.error("statement")),
        }
    }

    fn parse_var_decl(&mut self) -> Result<Statement, SyntaxError> {
        self.expect_keyword(Keyword::Var)?;
        let name = self.expect_identifier()?;
        self.expect_symbol(Symbol::Colon)?;
        let ty = self.expect_identifier()?;
        self.expect_symbol(Symbol::Equal)?;
        let value = self.parse_expression()?;
        self.expect_symbol(Symbol::Semicolon)?;
        Ok(Statement::VarDecl { name, ty, value })
    }

    fn parse_assignment(&mut self) -> Result<Statement, SyntaxError> {
        let name = self.expect_identifier()?;
        self.expect_symbol(Symbol::Equal)?;
        let value = self.parse_expression()?;
        self.expect_symbol(Symbol::Semicolon)?;
        Ok(Statement::Assign { name, value })
    }

    fn parse_function_def(&mut self) -> Result<Statement, SyntaxError> {
        self.expect_keyword(Keyword::Func)?;
        let name = self.expect_identifier()?;
        self.expect_symbol(Symbol::LParen)?;
        let params = self.parse_param_list()?;
        self.expect_symbol(Symbol::RParen)?;
        self.expect_symbol(Symbol::Arrow)?;
        let return_type = self.expect_identifier()?;
        let body = self.parse_block()?;
        Ok(Statement::FunctionDef {
            name,
            params,
            return_type,
            body,
        })
    }

    fn parse_param_list(&mut self) -> Result<Vec<Param>, SyntaxError> {
        let mut params = Vec::new();
        if matches!(self.current().kind, TokenKind::Symbol(Symbol::RParen)) {
            return Ok(params);
        }
        params.push(self.parse_param()?);
        while matches!(self.current().kind, TokenKind::Symbol(Symbol::Comma)) {
            self.advance();
            params.push(self.parse_param()?);
        }
        Ok(params)
    }

    fn parse_param(&mut self) -> Result<Param, SyntaxError> {
        let name = self.expect_identifier()?;
        self.expect_symbol(Symbol::Colon)?;
        let ty = self.expect_identifier()?;
        let default = if matches!(self.current().kind, TokenKind::Symbol(Symbol::Equal)) {
            self.advance();
            Some(self.parse_expression()?)
        } else {
            None
        };
        Ok(Param { name, ty, default })
    }

    fn parse_class_def(&mut self) -> Result<Statement, SyntaxError> {
        self.expect_keyword(Keyword::Class)?;
        let name = self.expect_identifier()?;
        let body = self.parse_block()?;
        Ok(Statement::ClassDef { name, body })
    }

    fn parse_if(&mut self) -> Result<Statement, SyntaxError> {
        self.expect_keyword(Keyword::If)?;
        let condition = self.parse_expression()?;
        let then_body = self.parse_block()?;
        let else_body = if matches!(self.current().kind, TokenKind::Keyword(Keyword::Else)) {
            self.advance();
            self.parse_block()?
        } else {
            Vec::new()
        };
        Ok(Statement::If {
            condition,
            then_body,
            else_body,
        })
    }

    fn parse_while(&mut self) -> Result<Statement, SyntaxError> {
        self.expect_keyword(Keyword::While)?;
        let condition = self.parse_expression()?;
        let body = self.parse_block()?;
        Ok(Statement::While { condition, body })
    }

    fn parse_block(&mut self) -> Result<Vec<Statement>, SyntaxError> {
        self.expect_symbol(Symbol::LBrace)?;
        let mut statements = Vec::new();
        self.consume_newlines();
        while !matches!(self.current().kind, TokenKind::Symbol(Symbol::RBrace)) {
            statements.push(self.parse_statement()?);
            self.consume_newlines();
        }
        self.expect_symbol(Symbol::RBrace)?;
        Ok(statements)
    }

    fn parse_expression(&mut self) -> Result<Expression, SyntaxError> {
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expression, SyntaxError> {
        let left = self.parse_term()?;
        let op = match self.current().kind {
            TokenKind::Symbol(Symbol::Greater) => BinaryOperator::Greater,
            TokenKind::Symbol(Symbol::Less) => BinaryOperator::Less,
            TokenKind::Symbol(Symbol::GreaterEqual) => BinaryOperator::GreaterEqual,
            TokenKind::Symbol(Symbol::LessEqual) => BinaryOperator::LessEqual,
            TokenKind::Symbol(Symbol::EqualEqual) => BinaryOperator::Equal,
            TokenKind::Symbol(Symbol::NotEqual) => BinaryOperator::NotEqual,
            _ => return Ok(left),
        };
        self.advance();
        let right = self.parse_term()?;
        Ok(Expression::BinaryOp {
            left: Box::new(left),
            op,
            right: Box::new(right),
        })
    }

    fn parse_term(&mut self) -> Result<Expression, SyntaxError> {
        let mut expr = self.parse_factor()?;
        loop {
            let op = match self.current().kind {
                TokenKind::Symbol(Symbol::Plus) => BinaryOperator::Add,
                TokenKind::Symbol(Symbol::Minus) => BinaryOperator::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_factor()?;
            expr = Expression::BinaryOp {
                left: Box::new(expr),
                op,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn parse_factor(&mut self) -> Result<Expression, SyntaxError> {
        let mut expr = self.parse_primary()?;
        loop {
            let op = match self.current().kind {
                TokenKind::Symbol(Symbol::Star) => BinaryOperator::Mul,
                TokenKind::Symbol(Symbol::Slash) => BinaryOperator::Div,
                _ => break,
            };
            self.advance();
            let right = self.parse_primary()?;
            expr = Expression::BinaryOp {
                left: Box::new(expr),
                op,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expression, SyntaxError> {
        match self.current().kind {
            TokenKind::Integer(value) => {
                self.advance();
                Ok(Expression::Integer(value))
            }
            TokenKind::Identifier(name) => {
                let name = name.to_string();
                self.advance();
                Ok(Expression::Identifier(name))
            }
            TokenKind::Symbol(Symbol::LParen) => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect_symbol(Symbol::RParen)?;
                Ok(expr)
            }
            _ => Err(self.error("expression")),
        }
    }

    fn consume_newlines(&mut self) {
        while matches!(self.current().kind, TokenKind::Newline) {
            self.advance();
        }
    }

    fn expect_identifier(&mut self) -> Result<String, SyntaxError> {
        if let TokenKind::Identifier(name) = self.current().kind {
            let name = name.to_string();
            self.advance();
            Ok(name)
        } else {
            Err(self.error("identifier"))
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> Result<(), SyntaxError> {
        if self.current().kind == TokenKind::Keyword(keyword) {
            self.advance();
            Ok(())
        } else {
            Err(self.error(&format!("keyword '{}'", keyword.as_str())))
        }
    }

    fn expect_symbol(&mut self, symbol: Symbol) -> Result<(), SyntaxError> {
        if self.current().kind == TokenKind::Symbol(symbol) {
            self.advance();
            Ok(())
        } else {
            Err(self.error(&format!("'{}'", symbol.as_str())))
        }
    }

    fn current(&self) -> &Token<'a> {
        &self.tokens[self.position]
    }

    fn peek(&self) -> &Token<'a> {
        // The token stream always ends in EOF, so clamp instead of running off.
        let last = self.tokens.len() - 1;
        &self.tokens[(self.position + 1).min(last)]
    }

    fn advance(&mut self) {
        if self.position + 1 < self.tokens.len() {
            self.position += 1;
        }
    }

    fn error(&self, expected: &str) -> SyntaxError {
        let token = self.current();
        SyntaxError::UnexpectedToken {
            expected: expected.to_string(),
            found: token.kind.to_string(),
            line: token.span.line,
            column: token.span.column,
        }
    }
}

pub fn parse_tokens(tokens: Vec<Token<'_>>) -> Result<Program, SyntaxError> {
    Parser::new(tokens).parse_program()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use indoc::indoc;

    fn parse(input: &str) -> Result<Program, SyntaxError> {
        parse_tokens(tokenize(input).expect("tokenize should succeed"))
    }

    #[test]
    fn parses_variable_declaration() {
        let program = parse("var x: Int = 10;").expect("parse failed");
        assert_eq!(
            program.statements,
            vec![Statement::VarDecl {
                name: "x".to_string(),
                ty: "Int".to_string(),
                value: Expression::Integer(10),
            }]
        );
    }

    #[test]
    fn parses_function_declaration() {
        let input = indoc! {"
            func add(a: Int, b: Int) -> Int {
                var result: Int = a + b;
            }
        "};
        let program = parse(input).expect("parse failed");

        let expected = Statement::FunctionDef {
            name: "add".to_string(),
            params: vec![
                Param {
                    name: "a".to_string(),
                    ty: "Int".to_string(),
                    default: None,
                },
                Param {
                    name: "b".to_string(),
                    ty: "Int".to_string(),
                    default: None,
                },
            ],
            return_type: "Int".to_string(),
            body: vec![Statement::VarDecl {
                name: "result".to_string(),
                ty: "Int".to_string(),
                value: Expression::BinaryOp {
                    left: Box::new(Expression::Identifier("a".to_string())),
                    op: BinaryOperator::Add,
                    right: Box::new(Expression::Identifier("b".to_string())),
                },
            }],
        };
        assert_eq!(program.statements, vec![expected]);
    }

    #[test]
    fn parses_parameter_defaults() {
        let program = parse("func greet(count: Int = 1) -> Int { }").expect("parse failed");
        let Statement::FunctionDef { params, .. } = &program.statements[0] else {
            panic!("expected function definition");
        };
        assert_eq!(
            params,
            &vec![Param {
                name: "count".to_string(),
                ty: "Int".to_string(),
                default: Some(Expression::Integer(1)),
            }]
        );
    }

    #[test]
    fn parses_class_declaration() {
        let input = indoc! {"
            class Point {
                var x: Int = 0;
            }
        "};
        let program = parse(input).expect("parse failed");
        assert_eq!(
            program.statements,
            vec![Statement::ClassDef {
                name: "Point".to_string(),
                body: vec![Statement::VarDecl {
                    name: "x".to_string(),
                    ty: "Int".to_string(),
                    value: Expression::Integer(0),
                }],
            }]
        );
    }

    #[test]
    fn parses_if_with_else() {
        let input = indoc! {"
            var x: Int = 1;
            if x < 2 {
                x = 3;
            } else {
                x = 4;
            }
        "};
        let program = parse(input).expect("parse failed");
        let Statement::If {
            condition,
            then_body,
            else_body,
        } = &program.statements[1]
        else {
            panic!("expected if statement");
        };
        assert_eq!(
            condition,
            &Expression::BinaryOp {
                left: Box::new(Expression::Identifier("x".to_string())),
                op: BinaryOperator::Less,
                right: Box::new(Expression::Integer(2)),
            }
        );
        assert_eq!(then_body.len(), 1);
        assert_eq!(else_body.len(), 1);
    }

    #[test]
    fn parses_if_without_else() {
        let program = parse("if x > 0 { x = 1; }").expect("parse failed");
        let Statement::If { else_body, .. } = &program.statements[0] else {
            panic!("expected if statement");
        };
        assert!(else_body.is_empty());
    }

    #[test]
    fn parses_while_loop() {
        let program = parse("while x < 20 { x = x + 1; }").expect("parse failed");
        assert_eq!(
            program.statements,
            vec![Statement::While {
                condition: Expression::BinaryOp {
                    left: Box::new(Expression::Identifier("x".to_string())),
                    op: BinaryOperator::Less,
                    right: Box::new(Expression::Integer(20)),
                },
                body: vec![Statement::Assign {
                    name: "x".to_string(),
                    value: Expression::BinaryOp {
                        left: Box::new(Expression::Identifier("x".to_string())),
                        op: BinaryOperator::Add,
                        right: Box::new(Expression::Integer(1)),
                    },
                }],
            }]
        );
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let program = parse("x = 1 + 2 * 3;").expect("parse failed");
        let Statement::Assign { value, .. } = &program.statements[0] else {
            panic!("expected assignment");
        };
        assert_eq!(
            value,
            &Expression::BinaryOp {
                left: Box::new(Expression::Integer(1)),
                op: BinaryOperator::Add,
                right: Box::new(Expression::BinaryOp {
                    left: Box::new(Expression::Integer(2)),
                    op: BinaryOperator::Mul,
                    right: Box::new(Expression::Integer(3)),
                }),
            }
        );
    }

    #[test]
    fn parentheses_override_precedence() {
        let program = parse("x = (1 + 2) * 3;").expect("parse failed");
        let Statement::Assign { value, .. } = &program.statements[0] else {
            panic!("expected assignment");
        };
        assert_eq!(
            value,
            &Expression::BinaryOp {
                left: Box::new(Expression::BinaryOp {
                    left: Box::new(Expression::Integer(1)),
                    op: BinaryOperator::Add,
                    right: Box::new(Expression::Integer(2)),
                }),
                op: BinaryOperator::Mul,
                right: Box::new(Expression::Integer(3)),
            }
        );
    }

    #[test]
    fn errors_on_unterminated_block() {
        let err = parse("func add(a: Int, b: Int) -> Int {").expect_err("expected syntax error");
        assert!(matches!(err, SyntaxError::UnexpectedToken { .. }));
    }

    #[test]
    fn errors_on_return_statement() {
        let err = parse("return 1;").expect_err("expected syntax error");
        let SyntaxError::UnexpectedToken {
            expected, found, ..
        } = err;
        assert_eq!(expected, "statement");
        assert_eq!(found, "keyword 'return'");
    }

    #[test]
    fn errors_on_for_statement() {
        let err = parse("for x { }").expect_err("expected syntax error");
        assert!(matches!(err, SyntaxError::UnexpectedToken { .. }));
    }

    #[test]
    fn error_carries_expected_and_found() {
        let err = parse("var x Int = 10;").expect_err("expected syntax error");
        assert_eq!(
            err,
            SyntaxError::UnexpectedToken {
                expected: "':'".to_string(),
                found: "identifier 'Int'".to_string(),
                line: 1,
                column: 6,
            }
        );
    }
}
