//! FusionLang: a miniature toolchain for a small statically-typed imperative
//! language. Source text is tokenized, parsed into an AST, validated against
//! a flat symbol table, lowered to flat bytecode with backpatched jump
//! addresses, and executed on a stack-based virtual machine.

pub mod ast;
pub mod bytecode;
pub mod lexer;
pub mod parser;
pub mod semantic;
pub mod token;
pub mod vm;
