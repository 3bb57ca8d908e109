use std::fs;
use std::io::{self, Read};

use anyhow::{Context, Result, bail};

use fusionlang::{bytecode, lexer, parser, semantic, vm};

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let input_path = args.next();
    if args.next().is_some() {
        bail!("Only one source file is supported");
    }

    let source = if let Some(path) = input_path {
        fs::read_to_string(&path).with_context(|| format!("Reading {path}"))?
    } else {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Reading stdin")?;
        buffer
    };

    let tokens = lexer::tokenize(&source)?;
    let program = parser::parse_tokens(tokens)?;
    semantic::analyze(&program)?;
    let instructions = bytecode::compile(&program);

    let mut vm = vm::VM::new();
    vm.run(&instructions)?;

    let mut bindings: Vec<_> = vm.memory().iter().collect();
    bindings.sort_by(|a, b| a.0.cmp(b.0));
    for (name, value) in bindings {
        println!("{name} = {value}");
    }
    if let Some(top) = vm.stack().last() {
        println!("stack top: {top}");
    }

    Ok(())
}
