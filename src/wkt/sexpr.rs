use std::collections::BTreeMap;

use super::parser::{SExpr, SExprNode};

/// A leaf argument of a WKT node.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Number(f64),
    /// A quoted string, kept as written. Plain decimal text such as `"4326"` still reads as a
    /// number through [`Scalar::as_f64`].
    Text(String),
    /// A bare enumeration keyword such as `EAST`.
    Keyword(String),
}

impl Scalar {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Number(n) => Some(*n),
            Scalar::Text(s) => decimal_literal(s),
            Scalar::Keyword(_) => None,
        }
    }

    /// Textual form; integral numbers render without a fractional part so that
    /// `ID["EPSG",4326]` and `ID["EPSG","4326"]` read the same. Quoted text is returned
    /// verbatim.
    pub fn as_text(&self) -> String {
        match self {
            Scalar::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            Scalar::Number(n) => n.to_string(),
            Scalar::Text(s) | Scalar::Keyword(s) => s.clone(),
        }
    }
}

/// `[+-]digits[.digits]`, with surrounding whitespace. Anything else, including `inf`, `nan`
/// and exponents, stays text.
fn decimal_literal(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    let digits = trimmed.strip_prefix(['+', '-']).unwrap_or(trimmed);
    let (int, frac) = digits.split_once('.').unwrap_or((digits, ""));
    let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if int.len() + frac.len() == 0 || !all_digits(int) || !all_digits(frac) {
        return None;
    }
    trimmed.parse().ok()
}

/// A WKT node with its scalar arguments separated from its child nodes.
///
/// Children are grouped by upper-cased tag. Siblings sharing a tag (`PARAMETER`, `AXIS`)
/// stay in encounter order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SemanticObject {
    pub tag: String,
    pub args: Vec<Scalar>,
    pub children: BTreeMap<String, Vec<SemanticObject>>,
}

/// Walk a parsed node into its keyed semantic form.
pub fn structure(node: &SExprNode) -> SemanticObject {
    let mut obj = SemanticObject {
        tag: node.tag.to_ascii_uppercase(),
        ..Default::default()
    };
    for item in &node.items {
        match item {
            SExpr::Node(child) => {
                let child = structure(child);
                obj.children.entry(child.tag.clone()).or_default().push(child);
            }
            SExpr::Number(n) => obj.args.push(Scalar::Number(*n)),
            SExpr::Str(s) => obj.args.push(Scalar::Text(s.clone())),
            SExpr::Ident(s) => obj.args.push(Scalar::Keyword(s.clone())),
        }
    }
    obj
}

impl SemanticObject {
    /// All children with `tag`, possibly none.
    pub fn children(&self, tag: &str) -> &[SemanticObject] {
        self.children.get(tag).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn child(&self, tag: &str) -> Option<&SemanticObject> {
        self.children(tag).first()
    }

    /// The first child whose tag is any of `tags`, tried in order.
    pub fn child_any(&self, tags: &[&str]) -> Option<&SemanticObject> {
        tags.iter().find_map(|tag| self.child(tag))
    }

    /// The node's label, conventionally its first argument.
    pub fn name(&self) -> Option<String> {
        self.args.first().map(Scalar::as_text)
    }

    pub fn number(&self, index: usize) -> Option<f64> {
        self.args.get(index).and_then(Scalar::as_f64)
    }

    pub fn keyword(&self, index: usize) -> Option<&str> {
        match self.args.get(index)? {
            Scalar::Keyword(k) => Some(k),
            _ => None,
        }
    }

    /// All numeric arguments, in order.
    pub fn numbers(&self) -> Vec<f64> {
        self.args.iter().filter_map(Scalar::as_f64).collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::wkt::parser::parse;

    #[test]
    fn repeated_tags_collect_in_order() {
        let root = parse(
            r#"PROJCS["x",PARAMETER["a",1],UNIT["metre",1],PARAMETER["b",2],PARAMETER["c",3]]"#,
        )
        .unwrap();
        let obj = structure(&root);
        let names: Vec<_> = obj
            .children("PARAMETER")
            .iter()
            .filter_map(SemanticObject::name)
            .collect();
        assert_eq!(names, ["a", "b", "c"]);
        assert_eq!(obj.children("AXIS").len(), 0);
        assert_eq!(obj.child("UNIT").and_then(|u| u.number(1)), Some(1.0));
    }

    #[test]
    fn numeric_strings_are_coerced() {
        let obj = structure(&parse(r#"AUTHORITY["EPSG","4326"]"#).unwrap());
        assert_eq!(obj.args[1].as_f64(), Some(4326.0));
        assert_eq!(obj.args[1].as_text(), "4326");
        assert_eq!(obj.args[0], Scalar::Text("EPSG".into()));
        assert_eq!(obj.args[0].as_f64(), None);

        let obj = structure(&parse(r#"TOWGS84[" -87.5","+0.25","1."]"#).unwrap());
        assert_eq!(obj.numbers(), [-87.5, 0.25, 1.0]);
    }

    #[test]
    fn quoted_names_keep_their_text() {
        for name in ["Infinity", "inf", "NaN", "1e3", "0x10", "007", "-", "."] {
            let obj = structure(&parse(&format!(r#"GEOGCS["{name}"]"#)).unwrap());
            assert_eq!(obj.name().as_deref(), Some(name));
        }
        let obj = structure(&parse(r#"DATUM["1e3",SPHEROID["inf",6378137,298.257223563]]"#).unwrap());
        assert_eq!(obj.args[0].as_f64(), None);
        assert_eq!(obj.child("SPHEROID").and_then(SemanticObject::name).as_deref(), Some("inf"));
    }

    #[test]
    fn keywords_and_tags_are_distinguished() {
        let obj = structure(&parse(r#"axis["Easting",east]"#).unwrap());
        assert_eq!(obj.tag, "AXIS");
        assert_eq!(obj.keyword(1), Some("east"));
        assert_eq!(obj.number(1), None);
    }
}
