//! BUILD file language: lexer, syntax tree, parser and renderer
pub mod ast;
pub mod lexer;
pub mod parser;
pub mod render;
pub mod token;

pub use ast::*;
pub use lexer::tokenize;
pub use parser::{ParseError, ParseOutput, parse, parse_source};
pub use render::{Render, choose_layout, relayout_rule_arguments};
pub use token::{StringFlavor, Token, TokenKind};
