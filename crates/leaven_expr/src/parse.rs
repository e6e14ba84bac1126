//! Recursive-descent parser for type expressions.
//!
//! Grammar: `Expr := Ident ('<' Expr (',' Expr)* '>')?`. The special token
//! `*` normalizes to the builtin `mixed` type. A bare identifier matching a
//! bound type variable is replaced by its bound expression, so nested
//! generics inside a substituted variable are preserved structurally.

use crate::error::ParseError;
use crate::expr::{Bindings, TypeExpr};

/// Parse a single type expression.
///
/// Deterministic and side-effect-free: the same text and bindings always
/// yield the same canonical form.
pub fn parse(text: &str, bindings: &Bindings) -> Result<TypeExpr, ParseError> {
    let mut parser = Parser::new(text);
    let expr = parser.expr(bindings)?;
    parser.skip_ws();
    if !parser.at_end() {
        return Err(ParseError::trailing(text, parser.pos));
    }
    Ok(expr)
}

/// Parse a declared union like `int|string|Service<T>` into its
/// alternatives, in declaration order.
///
/// `|` only splits at the top level; generic arguments never contain
/// unions.
pub fn parse_union(text: &str, bindings: &Bindings) -> Result<Vec<TypeExpr>, ParseError> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;

    for (i, c) in text.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            '|' if depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);

    parts.into_iter().map(|part| parse(part, bindings)).collect()
}

struct Parser<'a> {
    text: &'a str,
    pos: usize,
}

fn is_delimiter(c: char) -> bool {
    matches!(c, '<' | '>' | ',' | '|')
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        Parser { text, pos: 0 }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.text.len()
    }

    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn bump(&mut self, c: char) {
        self.pos += c.len_utf8();
    }

    fn skip_ws(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.bump(c);
        }
    }

    fn identifier(&mut self) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_whitespace() || is_delimiter(c) {
                break;
            }
            self.bump(c);
        }
        &self.text[start..self.pos]
    }

    fn expr(&mut self, bindings: &Bindings) -> Result<TypeExpr, ParseError> {
        self.skip_ws();

        let ident = self.identifier();
        if ident.is_empty() {
            return Err(ParseError::empty(self.text));
        }
        let name = if ident == "*" { "mixed" } else { ident };

        self.skip_ws();
        let mut args = Vec::new();
        if self.peek() == Some('<') {
            self.bump('<');
            loop {
                args.push(self.expr(bindings)?);
                self.skip_ws();
                match self.peek() {
                    Some(',') => self.bump(','),
                    Some('>') => {
                        self.bump('>');
                        break;
                    }
                    Some(c) => return Err(ParseError::unexpected(self.text, c)),
                    None => return Err(ParseError::unclosed(self.text)),
                }
            }
        }

        // A bare identifier matching a bound variable is the variable
        // itself; the bound expression stands in unchanged.
        if args.is_empty() {
            if let Some(bound) = bindings.get(name) {
                return Ok(bound.clone());
            }
        }

        Ok(TypeExpr::new(name, args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn bind(pairs: &[(&str, &str)]) -> Bindings {
        let empty = Bindings::default();
        pairs
            .iter()
            .map(|(var, ty)| {
                let expr = parse(ty, &empty).unwrap_or_else(|e| panic!("bad binding: {e}"));
                ((*var).to_owned(), expr)
            })
            .collect()
    }

    #[test]
    fn parses_bare_identifier() {
        let expr = parse("Service", &Bindings::default()).unwrap();
        assert_eq!(expr.base(), "Service");
        assert!(expr.args().is_empty());
        assert_eq!(expr.canonical(), "Service");
    }

    #[test]
    fn parses_nested_generics() {
        let expr = parse("A<B,C<D>>", &Bindings::default()).unwrap();
        assert_eq!(expr.base(), "A");
        assert_eq!(expr.args().len(), 2);
        assert_eq!(expr.args()[0].canonical(), "B");
        assert_eq!(expr.args()[1].canonical(), "C<D>");
        assert_eq!(expr.canonical(), "A<B,C<D>>");
    }

    #[test]
    fn whitespace_is_insignificant() {
        let expr = parse("map< string , list<int> >", &Bindings::default()).unwrap();
        assert_eq!(expr.canonical(), "map<string,list<int>>");
    }

    #[test]
    fn star_normalizes_to_mixed() {
        let expr = parse("*", &Bindings::default()).unwrap();
        assert_eq!(expr.canonical(), "mixed");

        let expr = parse("map<*>", &Bindings::default()).unwrap();
        assert_eq!(expr.canonical(), "map<mixed>");
    }

    #[test]
    fn substitutes_bound_variables() {
        let bindings = bind(&[("T", "int")]);
        let expr = parse("A<T>", &bindings).unwrap();
        assert_eq!(expr.canonical(), "A<int>");
    }

    #[test]
    fn substituted_variable_keeps_its_generics() {
        let bindings = bind(&[("T", "Endpoint<string>")]);
        let expr = parse("list<T>", &bindings).unwrap();
        assert_eq!(expr.canonical(), "list<Endpoint<string>>");
        assert_eq!(expr.args()[0].args()[0].canonical(), "string");
    }

    #[test]
    fn same_text_same_canonical_form() {
        let bindings = bind(&[("T", "int"), ("U", "map<string,int>")]);
        let a = parse("Pair<T,U>", &bindings).unwrap();
        let b = parse("Pair<T,U>", &bindings).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.canonical(), "Pair<int,map<string,int>>");
    }

    #[test]
    fn missing_close_is_an_error() {
        let err = parse("A<B", &Bindings::default()).unwrap_err();
        assert_eq!(err, ParseError::unclosed("A<B"));

        let err = parse("A<B,C<D>", &Bindings::default()).unwrap_err();
        assert_eq!(err, ParseError::unclosed("A<B,C<D>"));
    }

    #[test]
    fn empty_name_is_an_error() {
        assert!(parse("", &Bindings::default()).is_err());
        assert!(parse("A<>", &Bindings::default()).is_err());
        assert!(parse("A<B,>", &Bindings::default()).is_err());
    }

    #[test]
    fn trailing_input_is_an_error() {
        assert!(parse("A<B>x", &Bindings::default()).is_err());
        assert!(parse("A|B", &Bindings::default()).is_err());
    }

    #[test]
    fn splits_unions_at_top_level_only() {
        let tys = parse_union("int|string|Service<T>", &Bindings::default()).unwrap();
        let names: Vec<String> = tys.iter().map(TypeExpr::canonical).collect();
        assert_eq!(names, ["int", "string", "Service<T>"]);

        let tys = parse_union("map<string,int>", &Bindings::default()).unwrap();
        assert_eq!(tys.len(), 1);
    }
}
