//! The `parse` command: dump the syntax tree of a file.

use kry_parse::{parse, ParseOptions};

use super::read_file;

pub fn parse_file(path: &str) {
    let source = read_file(path);
    let parsed = parse(&source, &ParseOptions::default());

    println!("Parse result for '{path}':");
    println!("  Nodes: {}", parsed.ast.node_count());
    println!("  Diagnostics: {}", parsed.diagnostics.len());
    println!();
    print!("{}", parsed.ast.dump());

    if !parsed.diagnostics.is_empty() {
        println!();
        println!("Diagnostics:");
        for diag in parsed.diagnostics.iter() {
            println!("  {}", diag.render(path));
        }
    }
}
