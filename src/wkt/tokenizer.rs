use crate::error::ParseError;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// A bare keyword such as `GEOGCS` or `EAST`.
    Ident(String),
    /// A double-quoted literal, with `""` escapes already collapsed.
    Str(String),
    Number(f64),
    /// `[` or `(`.
    Open(char),
    /// `]` or `)`.
    Close(char),
    Comma,
}

/// A lexical unit together with the byte offset it starts at.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub offset: usize,
}

/// Split WKT text into tokens.
pub fn tokenize(text: &str) -> Result<Vec<Token>, ParseError> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        let start = i;
        let kind = match c {
            b' ' | b'\t' | b'\r' | b'\n' => {
                i += 1;
                continue;
            }
            b'[' | b'(' => {
                i += 1;
                TokenKind::Open(c as char)
            }
            b']' | b')' => {
                i += 1;
                TokenKind::Close(c as char)
            }
            b',' => {
                i += 1;
                TokenKind::Comma
            }
            b'"' => {
                let (s, end) = quoted(text, start)?;
                i = end;
                TokenKind::Str(s)
            }
            b'0'..=b'9' | b'-' | b'+' | b'.' => {
                while i < bytes.len() && matches!(bytes[i], b'0'..=b'9' | b'-' | b'+' | b'.' | b'e' | b'E') {
                    i += 1;
                }
                let literal = &text[start..i];
                let value = literal.parse::<f64>().map_err(|_| {
                    ParseError::new(start, format!("malformed number `{literal}`"))
                })?;
                TokenKind::Number(value)
            }
            c if c.is_ascii_alphabetic() || c == b'_' => {
                while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                    i += 1;
                }
                TokenKind::Ident(text[start..i].to_string())
            }
            _ => {
                let ch = text[start..].chars().next().unwrap_or('?');
                return Err(ParseError::new(
                    start,
                    format!("unexpected character `{ch}`"),
                ));
            }
        };
        tokens.push(Token {
            kind,
            offset: start,
        });
    }
    Ok(tokens)
}

/// Read a quoted literal starting at the `"` at `start`, returning it and the offset just
/// past the closing quote.
fn quoted(text: &str, start: usize) -> Result<(String, usize), ParseError> {
    let mut out = String::new();
    let mut chars = text[start + 1..].char_indices().peekable();
    while let Some((idx, ch)) = chars.next() {
        if ch == '"' {
            if let Some((_, '"')) = chars.peek() {
                chars.next();
                out.push('"');
                continue;
            }
            return Ok((out, start + 1 + idx + 1));
        }
        out.push(ch);
    }
    Err(ParseError::new(start, "unterminated quoted string"))
}

#[cfg(test)]
mod test {
    use super::*;

    fn kinds(text: &str) -> Vec<TokenKind> {
        tokenize(text)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn tokenizes_a_node() {
        assert_eq!(
            kinds(r#"UNIT["degree",0.0174532925199433]"#),
            vec![
                TokenKind::Ident("UNIT".into()),
                TokenKind::Open('['),
                TokenKind::Str("degree".into()),
                TokenKind::Comma,
                TokenKind::Number(0.0174532925199433),
                TokenKind::Close(']'),
            ]
        );
    }

    #[test]
    fn offsets_are_byte_positions() {
        let tokens = tokenize("AXIS[\"Lat\", NORTH]").unwrap();
        assert_eq!(tokens[4].offset, 12);
        assert_eq!(tokens[4].kind, TokenKind::Ident("NORTH".into()));
    }

    #[test]
    fn doubled_quotes_escape() {
        assert_eq!(
            kinds(r#""say ""hi""""#),
            vec![TokenKind::Str(r#"say "hi""#.into())]
        );
    }

    #[test]
    fn scientific_and_signed_numbers() {
        assert_eq!(
            kinds("-1.5E-06, +2"),
            vec![
                TokenKind::Number(-1.5e-6),
                TokenKind::Comma,
                TokenKind::Number(2.0)
            ]
        );
    }

    #[test]
    fn unterminated_quote() {
        let err = tokenize(r#"GEOGCS["WGS 84"#).unwrap_err();
        assert_eq!(err.position, 7);
    }

    #[test]
    fn unexpected_character() {
        let err = tokenize("GEOGCS[;]").unwrap_err();
        assert_eq!(err.position, 7);
        assert!(err.message.contains(';'));
    }

    #[test]
    fn non_ascii_inside_quotes() {
        assert_eq!(kinds("\"Réseau\""), vec![TokenKind::Str("Réseau".into())]);
    }
}
