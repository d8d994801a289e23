// SQL module - SQL parsing and AST representation

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::*;
pub use lexer::Lexer;
pub use parser::Parser;
pub use token::*;

use anyhow::Result;

/// Parse one SELECT statement
pub fn parse(sql: &str) -> Result<SelectStatement> {
    Parser::new(sql)?.parse()
}
