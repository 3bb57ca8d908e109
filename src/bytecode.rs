use crate::ast::{BinaryOperator, Expression, Program, Statement};

/// Flat bytecode operations. Jump targets are concrete 0-based indices into
/// the same instruction sequence, resolved by backpatching before generation
/// of the enclosing construct completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    Push(i64),
    Load(String),
    Store(String),
    StoreDefault(String),
    BinOp(BinaryOperator),
    Jump(usize),
    JumpIfFalse(usize),
    Func(String),
    Param(String),
    EndFunc,
    Class(String),
    EndClass,
    Halt,
}

const PLACEHOLDER: usize = usize::MAX;

/// Lowers a validated AST to a flat instruction sequence by depth-first
/// traversal. A pure builder: no execution side effects.
#[derive(Debug, Default)]
pub struct CodeGenerator {
    instructions: Vec<Instruction>,
}

impl CodeGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generate(mut self, program: &Program) -> Vec<Instruction> {
        for statement in &program.statements {
            self.generate_statement(statement);
        }
        self.emit(Instruction::Halt);
        self.instructions
    }

    fn generate_statement(&mut self, statement: &Statement) {
        match statement {
            Statement::VarDecl { name, value, .. } | Statement::Assign { name, value } => {
                self.generate_expression(value);
                self.emit(Instruction::Store(name.clone()));
            }
            Statement::FunctionDef {
                name, params, body, ..
            } => {
                self.emit(Instruction::Func(name.clone()));
                for param in params {
                    self.emit(Instruction::Param(param.name.clone()));
                    if let Some(default) = &param.default {
                        self.generate_expression(default);
                        self.emit(Instruction::StoreDefault(param.name.clone()));
                    }
                }
                for statement in body {
                    self.generate_statement(statement);
                }
                self.emit(Instruction::EndFunc);
            }
            Statement::ClassDef { name, body } => {
                self.emit(Instruction::Class(name.clone()));
                for statement in body {
                    self.generate_statement(statement);
                }
                self.emit(Instruction::EndClass);
            }
            Statement::If {
                condition,
                then_body,
                else_body,
            } => {
                self.generate_expression(condition);
                let exit_jump = self.emit(Instruction::JumpIfFalse(PLACEHOLDER));
                for statement in then_body {
                    self.generate_statement(statement);
                }
                if else_body.is_empty() {
                    self.patch_jump(exit_jump);
                } else {
                    let end_jump = self.emit(Instruction::Jump(PLACEHOLDER));
                    self.patch_jump(exit_jump);
                    for statement in else_body {
                        self.generate_statement(statement);
                    }
                    self.patch_jump(end_jump);
                }
            }
            Statement::While { condition, body } => {
                let loop_start = self.instructions.len();
                self.generate_expression(condition);
                let exit_jump = self.emit(Instruction::JumpIfFalse(PLACEHOLDER));
                for statement in body {
                    self.generate_statement(statement);
                }
                self.emit(Instruction::Jump(loop_start));
                self.patch_jump(exit_jump);
            }
        }
    }

    fn generate_expression(&mut self, expression: &Expression) {
        match expression {
            Expression::Integer(value) => {
                self.emit(Instruction::Push(*value));
            }
            Expression::Identifier(name) => {
                self.emit(Instruction::Load(name.clone()));
            }
            Expression::BinaryOp { left, op, right } => {
                self.generate_expression(left);
                self.generate_expression(right);
                self.emit(Instruction::BinOp(*op));
            }
        }
    }

    fn emit(&mut self, instruction: Instruction) -> usize {
        self.instructions.push(instruction);
        self.instructions.len() - 1
    }

    /// Points the placeholder jump at `at` to the next instruction index.
    fn patch_jump(&mut self, at: usize) {
        let target = self.instructions.len();
        match &mut self.instructions[at] {
            Instruction::Jump(addr) | Instruction::JumpIfFalse(addr) => *addr = target,
            other => unreachable!("patched instruction {other:?} is not a jump"),
        }
    }
}

pub fn compile(program: &Program) -> Vec<Instruction> {
    CodeGenerator::new().generate(program)
}
