use std::collections::HashMap;

use thiserror::Error;

use crate::ast::{Expression, Program, Statement};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SemanticError {
    #[error("Symbol '{name}' already declared")]
    AlreadyDeclared { name: String },
    #[error("Symbol '{name}' not declared")]
    NotDeclared { name: String },
}

/// Flat compile-time map from declared name to its type. Entries are
/// write-once and never removed; there are no nested scopes, so function
/// parameters land in the same table as top-level names.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SymbolTable {
    symbols: HashMap<String, String>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define(&mut self, name: &str, ty: &str) -> Result<(), SemanticError> {
        if self.symbols.contains_key(name) {
            return Err(SemanticError::AlreadyDeclared {
                name: name.to_string(),
            });
        }
        self.symbols.insert(name.to_string(), ty.to_string());
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.symbols.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// Single-pass validation walk over the AST. Purely a gate: it produces no
/// output for code generation, which assumes this pass has already succeeded.
#[derive(Debug, Default)]
pub struct SemanticAnalyzer {
    symbol_table: SymbolTable,
}

impl SemanticAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn symbol_table(&self) -> &SymbolTable {
        &self.symbol_table
    }

    pub fn analyze(&mut self, program: &Program) -> Result<(), SemanticError> {
        for statement in &program.statements {
            self.check_statement(statement)?;
        }
        Ok(())
    }

    fn check_statement(&mut self, statement: &Statement) -> Result<(), SemanticError> {
        match statement {
            Statement::VarDecl { name, ty, value } => {
                self.symbol_table.define(name, ty)?;
                self.check_expression(value)
            }
            Statement::Assign { name, value } => {
                if !self.symbol_table.contains(name) {
                    return Err(SemanticError::NotDeclared { name: name.clone() });
                }
                self.check_expression(value)
            }
            Statement::FunctionDef {
                name,
                params,
                return_type,
                body,
            } => {
                // The function name maps to its return type; parameters land
                // in the same flat table.
                self.symbol_table.define(name, return_type)?;
                for param in params {
                    self.symbol_table.define(&param.name, &param.ty)?;
                    if let Some(default) = &param.default {
                        self.check_expression(default)?;
                    }
                }
                for statement in body {
                    self.check_statement(statement)?;
                }
                Ok(())
            }
            Statement::ClassDef { name, body } => {
                // A class introduces the type it is named after.
                self.symbol_table.define(name, name)?;
                for statement in body {
                    self.check_statement(statement)?;
                }
                Ok(())
            }
            Statement::If {
                condition,
                then_body,
                else_body,
            } => {
                self.check_expression(condition)?;
                for statement in then_body.iter().chain(else_body) {
                    self.check_statement(statement)?;
                }
                Ok(())
            }
            Statement::While { condition, body } => {
                self.check_expression(condition)?;
                for statement in body {
                    self.check_statement(statement)?;
                }
                Ok(())
            }
        }
    }

    fn check_expression(&self, expression: &Expression) -> Result<(), SemanticError> {
        match expression {
            Expression::Integer(_) => Ok(()),
            Expression::Identifier(name) => {
                if self.symbol_table.contains(name) {
                    Ok(())
                } else {
                    Err(SemanticError::NotDeclared { name: name.clone() })
                }
            }
            Expression::BinaryOp { left, right, .. } => {
                self.check_expression(left)?;
                self.check_expression(right)
            }
        }
    }
}

pub fn analyze(program: &Program) -> Result<SymbolTable, SemanticError> {
    let mut analyzer = SemanticAnalyzer::new();
    analyzer.analyze(program)?;
    Ok(analyzer.symbol_table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parser::parse_tokens;
    use indoc::indoc;

    fn check(input: &str) -> Result<SymbolTable, SemanticError> {
        let program =
            parse_tokens(tokenize(input).expect("tokenize should succeed")).expect("parse failed");
        analyze(&program)
    }

    #[test]
    fn registers_variable_declaration() {
        let table = check("var x: Int = 10;").expect("analysis failed");
        assert_eq!(table.lookup("x"), Some("Int"));
    }

    #[test]
    fn registers_function_and_parameters_in_same_table() {
        let input = indoc! {"
            func add(a: Int, b: Int) -> Int {
                var result: Int = a + b;
            }
        "};
        let table = check(input).expect("analysis failed");
        assert_eq!(table.lookup("add"), Some("Int"));
        assert_eq!(table.lookup("a"), Some("Int"));
        assert_eq!(table.lookup("b"), Some("Int"));
        assert_eq!(table.lookup("result"), Some("Int"));
    }

    #[test]
    fn registers_class_as_its_own_type() {
        let table = check("class Point { }").expect("analysis failed");
        assert_eq!(table.lookup("Point"), Some("Point"));
    }

    #[test]
    fn rejects_redeclared_variable() {
        let err = check("var x: Int = 1;\nvar x: Int = 2;").expect_err("expected semantic error");
        assert_eq!(
            err,
            SemanticError::AlreadyDeclared {
                name: "x".to_string()
            }
        );
    }

    #[test]
    fn rejects_function_shadowing_variable() {
        let input = indoc! {"
            var add: Int = 1;
            func add(a: Int) -> Int { }
        "};
        let err = check(input).expect_err("expected semantic error");
        assert_eq!(
            err,
            SemanticError::AlreadyDeclared {
                name: "add".to_string()
            }
        );
    }

    #[test]
    fn rejects_assignment_to_undeclared_name() {
        let err = check("x = 10;").expect_err("expected semantic error");
        assert_eq!(
            err,
            SemanticError::NotDeclared {
                name: "x".to_string()
            }
        );
    }

    #[test]
    fn rejects_use_of_undeclared_identifier() {
        let err = check("var x: Int = y;").expect_err("expected semantic error");
        assert_eq!(
            err,
            SemanticError::NotDeclared {
                name: "y".to_string()
            }
        );
    }

    #[test]
    fn rejects_undeclared_name_in_condition() {
        let err = check("while n < 10 { }").expect_err("expected semantic error");
        assert_eq!(
            err,
            SemanticError::NotDeclared {
                name: "n".to_string()
            }
        );
    }
}
