use super::tokenizer::{Token, TokenKind, tokenize};
use crate::error::{CrsError, ParseError};

/// One WKT bracket node: its tag followed by its arguments, in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct SExprNode {
    pub tag: String,
    pub items: Vec<SExpr>,
    /// Byte offset of the tag.
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SExpr {
    Node(SExprNode),
    Ident(String),
    Str(String),
    Number(f64),
}

/// Single-pass recursive-descent parser over a WKT token stream.
#[derive(Debug)]
pub struct WktParser<'a> {
    source: &'a str,
}

impl<'a> WktParser<'a> {
    pub fn new(source: &'a str) -> Self {
        WktParser { source }
    }

    /// Build a parser from a source that may be absent.
    pub fn from_source(source: Option<&'a str>) -> Result<Self, CrsError> {
        source
            .map(WktParser::new)
            .ok_or_else(|| CrsError::InvalidInput("WKT source is missing".to_string()))
    }

    /// Parse the whole source into its single root node.
    pub fn parse(&self) -> Result<SExprNode, ParseError> {
        if self.source.trim().is_empty() {
            return Err(ParseError::new(0, "empty WKT input"));
        }
        let tokens = tokenize(self.source)?;
        let mut cursor = Cursor {
            tokens: &tokens,
            pos: 0,
            end: self.source.len(),
        };
        let root = match cursor.next() {
            Some(Token {
                kind: TokenKind::Ident(tag),
                offset,
            }) => cursor.node(tag.clone(), *offset)?,
            Some(token) => {
                return Err(ParseError::new(
                    token.offset,
                    "expected a CRS keyword at the root",
                ));
            }
            None => return Err(ParseError::new(0, "empty WKT input")),
        };
        if let Some(extra) = cursor.next() {
            return Err(ParseError::new(
                extra.offset,
                "unexpected content after the root node",
            ));
        }
        Ok(root)
    }
}

/// Parse WKT text into its root node.
pub fn parse(text: &str) -> Result<SExprNode, ParseError> {
    WktParser::new(text).parse()
}

struct Cursor<'t> {
    tokens: &'t [Token],
    pos: usize,
    end: usize,
}

impl<'t> Cursor<'t> {
    fn next(&mut self) -> Option<&'t Token> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    /// Parse the bracketed body of a node whose tag has just been consumed.
    fn node(&mut self, tag: String, offset: usize) -> Result<SExprNode, ParseError> {
        let (open, open_at) = match self.next() {
            Some(Token {
                kind: TokenKind::Open(c),
                offset,
            }) => (*c, *offset),
            Some(token) => {
                return Err(ParseError::new(
                    token.offset,
                    format!("expected `[` after `{tag}`"),
                ));
            }
            None => {
                return Err(ParseError::new(
                    self.end,
                    format!("expected `[` after `{tag}`"),
                ));
            }
        };
        let close = if open == '[' { ']' } else { ')' };
        let mut items = Vec::new();

        if let Some(Token {
            kind: TokenKind::Close(c),
            offset: at,
        }) = self.peek()
        {
            self.pos += 1;
            return if *c == close {
                Ok(SExprNode { tag, items, offset })
            } else {
                Err(ParseError::new(*at, format!("expected `{close}`, found `{c}`")))
            };
        }

        loop {
            items.push(self.item(open_at)?);
            match self.next() {
                Some(Token {
                    kind: TokenKind::Comma,
                    ..
                }) => continue,
                Some(Token {
                    kind: TokenKind::Close(c),
                    offset: at,
                }) => {
                    if *c != close {
                        return Err(ParseError::new(
                            *at,
                            format!("expected `{close}`, found `{c}`"),
                        ));
                    }
                    return Ok(SExprNode { tag, items, offset });
                }
                Some(token) => {
                    return Err(ParseError::new(
                        token.offset,
                        "expected `,` or a closing bracket",
                    ));
                }
                None => {
                    return Err(ParseError::new(
                        open_at,
                        format!("unterminated bracket in `{tag}`"),
                    ));
                }
            }
        }
    }

    fn item(&mut self, open_at: usize) -> Result<SExpr, ParseError> {
        let Some(token) = self.next() else {
            return Err(ParseError::new(open_at, "unterminated bracket"));
        };
        match &token.kind {
            TokenKind::Str(s) => Ok(SExpr::Str(s.clone())),
            TokenKind::Number(n) => Ok(SExpr::Number(*n)),
            TokenKind::Ident(name) => match self.peek() {
                Some(Token {
                    kind: TokenKind::Open(_),
                    ..
                }) => Ok(SExpr::Node(self.node(name.clone(), token.offset)?)),
                _ => Ok(SExpr::Ident(name.clone())),
            },
            TokenKind::Open(_) | TokenKind::Close(_) | TokenKind::Comma => Err(ParseError::new(
                token.offset,
                "expected a value",
            )),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn nested_nodes_keep_order() {
        let root = parse(r#"GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563]],AXIS["Lat",NORTH]]"#)
            .unwrap();
        assert_eq!(root.tag, "GEOGCS");
        assert_eq!(root.items.len(), 3);
        assert_eq!(root.items[0], SExpr::Str("WGS 84".into()));
        let SExpr::Node(axis) = &root.items[2] else {
            panic!("expected AXIS node");
        };
        assert_eq!(axis.items[1], SExpr::Ident("NORTH".into()));
    }

    #[test]
    fn parentheses_are_brackets() {
        let root = parse("UNIT(\"metre\", 1)").unwrap();
        assert_eq!(root.items, vec![SExpr::Str("metre".into()), SExpr::Number(1.0)]);
    }

    #[test]
    fn mismatched_bracket_kinds() {
        let err = parse("UNIT[\"metre\",1)").unwrap_err();
        assert_eq!(err.position, 14);
    }

    #[test]
    fn empty_input_is_a_parse_error() {
        assert_eq!(parse("").unwrap_err().position, 0);
        assert_eq!(parse("  \n\t").unwrap_err().message, "empty WKT input");
    }

    #[test]
    fn unterminated_bracket() {
        let err = parse("INVALID[").unwrap_err();
        assert_eq!(err.position, 7);
        let err = parse(r#"GEOGCS["x",DATUM["y""#).unwrap_err();
        assert!(err.message.contains("unterminated"));
    }

    #[test]
    fn root_must_be_a_single_node() {
        assert!(parse("\"just a string\"").is_err());
        assert!(parse("GEOGCS").is_err());
        let err = parse("UNIT[\"m\",1] UNIT[\"m\",1]").unwrap_err();
        assert_eq!(err.position, 12);
    }

    #[test]
    fn missing_source_is_invalid_input() {
        assert!(matches!(
            WktParser::from_source(None),
            Err(CrsError::InvalidInput(_))
        ));
        assert!(WktParser::from_source(Some("UNIT[\"m\",1]")).is_ok());
    }

    #[test]
    fn empty_node_body() {
        let root = parse("EXTENSION[]").unwrap();
        assert!(root.items.is_empty());
    }
}
