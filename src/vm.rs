use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

use crate::ast::BinaryOperator;
use crate::bytecode::Instruction;

pub type VmResult<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RuntimeError {
    #[error("Stack underflow")]
    StackUnderflow,
    #[error("Undefined variable '{name}'")]
    UndefinedVariable { name: String },
    #[error("Expected integer, got {got}")]
    ExpectedIntegerType { got: String },
    #[error("Division by zero")]
    DivisionByZero,
    #[error("Invalid jump target {target}")]
    InvalidJumpTarget { target: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i64),
    Boolean(bool),
    /// Bound by `Class`: an empty attribute map standing in for the class.
    Class(HashMap<String, Value>),
}

impl Value {
    fn as_int(&self) -> VmResult<i64> {
        match self {
            Value::Integer(value) => Ok(*value),
            Value::Boolean(_) | Value::Class(_) => Err(RuntimeError::ExpectedIntegerType {
                got: format!("{self:?}"),
            }),
        }
    }

    fn is_truthy(&self) -> bool {
        match self {
            Value::Integer(value) => *value != 0,
            Value::Boolean(value) => *value,
            Value::Class(_) => true,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(value) => write!(f, "{value}"),
            Value::Boolean(value) => write!(f, "{value}"),
            Value::Class(attrs) => {
                let rendered = attrs
                    .iter()
                    .map(|(name, value)| format!("{name}: {value}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{{{rendered}}}")
            }
        }
    }
}

/// Stack machine over a flat instruction sequence: an instruction pointer,
/// an operand stack for intermediate values, and a single shared memory map.
/// One VM instance owns its state exclusively; the instruction sequence is
/// read-only during execution.
#[derive(Debug, Default)]
pub struct VM {
    memory: HashMap<String, Value>,
    stack: Vec<Value>,
}

impl VM {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn memory(&self) -> &HashMap<String, Value> {
        &self.memory
    }

    pub fn stack(&self) -> &[Value] {
        &self.stack
    }

    pub fn run(&mut self, instructions: &[Instruction]) -> VmResult<()> {
        let mut ip = 0;
        while ip < instructions.len() {
            let instruction = &instructions[ip];
            ip += 1;
            match instruction {
                Instruction::Push(value) => self.stack.push(Value::Integer(*value)),
                Instruction::Load(name) => {
                    let value = self
                        .memory
                        .get(name)
                        .cloned()
                        .ok_or_else(|| RuntimeError::UndefinedVariable { name: name.clone() })?;
                    self.stack.push(value);
                }
                Instruction::Store(name) | Instruction::StoreDefault(name) => {
                    let value = self.pop()?;
                    self.memory.insert(name.clone(), value);
                }
                Instruction::BinOp(op) => {
                    let right = self.pop()?;
                    let left = self.pop()?;
                    let result = Self::apply_bin_op(*op, &left, &right)?;
                    self.stack.push(result);
                }
                Instruction::Jump(target) => {
                    ip = Self::checked_target(*target, instructions.len())?;
                }
                Instruction::JumpIfFalse(target) => {
                    let condition = self.pop()?;
                    if !condition.is_truthy() {
                        ip = Self::checked_target(*target, instructions.len())?;
                    }
                }
                Instruction::Class(name) => {
                    self.memory.insert(name.clone(), Value::Class(HashMap::new()));
                }
                // Function scaffolding is structurally present in the stream
                // but never invoked; these execute as no-ops.
                Instruction::Func(_)
                | Instruction::Param(_)
                | Instruction::EndFunc
                | Instruction::EndClass => {}
                Instruction::Halt => return Ok(()),
            }
        }
        Ok(())
    }

    fn apply_bin_op(op: BinaryOperator, left: &Value, right: &Value) -> VmResult<Value> {
        let left = left.as_int()?;
        let right = right.as_int()?;
        let result = match op {
            BinaryOperator::Add => Value::Integer(left + right),
            BinaryOperator::Sub => Value::Integer(left - right),
            BinaryOperator::Mul => Value::Integer(left * right),
            BinaryOperator::Div => {
                if right == 0 {
                    return Err(RuntimeError::DivisionByZero);
                }
                Value::Integer(left / right)
            }
            BinaryOperator::Greater => Value::Boolean(left > right),
            BinaryOperator::Less => Value::Boolean(left < right),
            BinaryOperator::GreaterEqual => Value::Boolean(left >= right),
            BinaryOperator::LessEqual => Value::Boolean(left <= right),
            BinaryOperator::Equal => Value::Boolean(left == right),
            BinaryOperator::NotEqual => Value::Boolean(left != right),
        };
        Ok(result)
    }

    fn checked_target(target: usize, len: usize) -> VmResult<usize> {
        // A target equal to len is a jump straight past the last instruction.
        if target > len {
            return Err(RuntimeError::InvalidJumpTarget { target });
        }
        Ok(target)
    }

    fn pop(&mut self) -> VmResult<Value> {
        self.stack.pop().ok_or(RuntimeError::StackUnderflow)
    }
}
