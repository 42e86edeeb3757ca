//! WKT and WKT2 input.
//!
//! Text flows through three stages, each usable on its own: [`parse`] turns it into a
//! bracket tree, [`structure`] groups each node's children by tag, and [`normalize`]
//! reduces the result to a [`CrsDefinition`](crate::CrsDefinition).

mod normalize;
mod parser;
mod sexpr;
mod tokenizer;

pub use normalize::normalize;
pub use parser::{SExpr, SExprNode, WktParser, parse};
pub use sexpr::{Scalar, SemanticObject, structure};
pub use tokenizer::{Token, TokenKind, tokenize};

use crate::crs::CrsDefinition;
use crate::error::Result;

/// Parse WKT1 or WKT2 text straight into a validated CRS definition.
pub fn parse_wkt(text: &str) -> Result<CrsDefinition> {
    let root = parse(text)?;
    normalize(&structure(&root))
}
