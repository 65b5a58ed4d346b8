pub mod ast_cache;

pub use ast_cache::{AstCache, ParsedFile};
