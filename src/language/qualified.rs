//! Import-qualified names such as `context.TODO` or `*net/http.Request`.

use nom::{
    bytes::complete::{take_while, take_while1},
    character::complete::char,
    combinator::{all_consuming, opt, recognize},
    error::{Error, ErrorKind},
    multi::many0,
    sequence::{pair, terminated},
    Finish, IResult,
};
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    /// Import path, `net/http`.
    pub path: String,
    /// Exported name inside the package, `Request`.
    pub name: String,
}

impl QualifiedName {
    pub fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        all_consuming(qualified_name)(text.trim())
            .finish()
            .ok()
            .map(|(_, name)| name)
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.path, self.name)
    }
}

/// A named type, optionally behind one pointer.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypePattern {
    pub pointer: bool,
    pub name: QualifiedName,
}

impl TypePattern {
    pub fn parse(text: &str) -> Option<Self> {
        all_consuming(type_pattern)(text.trim())
            .finish()
            .ok()
            .map(|(_, pattern)| pattern)
    }

    pub fn value(name: QualifiedName) -> Self {
        Self {
            pointer: false,
            name,
        }
    }

    pub fn pointer(name: QualifiedName) -> Self {
        Self {
            pointer: true,
            name,
        }
    }
}

impl fmt::Display for TypePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.pointer {
            write!(f, "*")?;
        }
        write!(f, "{}", self.name)
    }
}

pub fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        take_while1(|ch: char| ch.is_alphabetic() || ch == '_'),
        take_while(|ch: char| ch.is_alphanumeric() || ch == '_'),
    ))(input)
}

pub fn is_identifier(text: &str) -> bool {
    all_consuming(identifier)(text).is_ok()
}

fn dir_prefix(input: &str) -> IResult<&str, &str> {
    recognize(many0(terminated(
        take_while1(|ch: char| ch != '/'),
        char('/'),
    )))(input)
}

fn qualified_name(input: &str) -> IResult<&str, QualifiedName> {
    let (rest, dir) = dir_prefix(input)?;
    let (rest, last) = take_while1(|ch: char| ch != '/' && !ch.is_whitespace())(rest)?;
    let Some((package, name)) = last.rsplit_once('.') else {
        return Err(nom::Err::Error(Error::new(last, ErrorKind::Char)));
    };
    if package.is_empty() || !is_identifier(name) {
        return Err(nom::Err::Error(Error::new(last, ErrorKind::Verify)));
    }
    Ok((rest, QualifiedName::new(format!("{dir}{package}"), name)))
}

fn type_pattern(input: &str) -> IResult<&str, TypePattern> {
    let (rest, star) = opt(char('*'))(input)?;
    let (rest, name) = qualified_name(rest)?;
    Ok((
        rest,
        TypePattern {
            pointer: star.is_some(),
            name,
        },
    ))
}

/// The name a package is referred to by when imported without an alias.
///
/// Follows the usual layout conventions: the last path element, skipping a
/// trailing major-version element (`/v2`) and dropping a `.vN` suffix
/// (`gopkg.in/yaml.v3`).
pub fn default_local_name(path: &str) -> String {
    let mut segments = path.rsplit('/');
    let mut last = segments.next().unwrap_or(path);
    if is_major_version(last) {
        if let Some(previous) = segments.next() {
            last = previous;
        }
    }
    let base = last.split('.').next().unwrap_or(last);
    let base = base.strip_prefix("go-").unwrap_or(base);
    base.replace('-', "_")
}

fn is_major_version(segment: &str) -> bool {
    segment
        .strip_prefix('v')
        .is_some_and(|digits| !digits.is_empty() && digits.chars().all(|ch| ch.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_standard_library_names() {
        let name = QualifiedName::parse("context.TODO").expect("name");
        assert_eq!(name, QualifiedName::new("context", "TODO"));
        let name = QualifiedName::parse("net/http.Request").expect("name");
        assert_eq!(name.path, "net/http");
        assert_eq!(name.name, "Request");
    }

    #[test]
    fn parses_dotted_module_paths() {
        let name = QualifiedName::parse("go.opentelemetry.io/otel.Tracer").expect("name");
        assert_eq!(name.path, "go.opentelemetry.io/otel");
        assert_eq!(name.name, "Tracer");
    }

    #[test]
    fn parses_pointer_patterns() {
        let pattern = TypePattern::parse("*net/http.Request").expect("pattern");
        assert!(pattern.pointer);
        assert_eq!(pattern.to_string(), "*net/http.Request");
        assert!(!TypePattern::parse("context.Context").expect("pattern").pointer);
    }

    #[test]
    fn rejects_malformed_names() {
        assert!(QualifiedName::parse("context").is_none());
        assert!(QualifiedName::parse("context.").is_none());
        assert!(QualifiedName::parse("net/http.9x").is_none());
        assert!(QualifiedName::parse("a/b.C extra").is_none());
    }

    #[test]
    fn local_names_follow_path_conventions() {
        assert_eq!(default_local_name("context"), "context");
        assert_eq!(default_local_name("go.opentelemetry.io/otel"), "otel");
        assert_eq!(default_local_name("github.com/jackc/pgx/v5"), "pgx");
        assert_eq!(default_local_name("gopkg.in/yaml.v3"), "yaml");
        assert_eq!(default_local_name("github.com/go-chi/chi"), "chi");
    }

    #[test]
    fn identifiers() {
        assert!(is_identifier("detachedCtx"));
        assert!(is_identifier("_x1"));
        assert!(!is_identifier("1x"));
        assert!(!is_identifier("a-b"));
    }
}
