use crate::language::qualified::{is_identifier, QualifiedName, TypePattern};
use crate::rewrite::Options;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

pub const CONFIG_FILE: &str = "ctxscope.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {error}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },
    #[error("{}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },
    #[error("{}: invalid {field} `{value}`", .path.display())]
    Invalid {
        path: PathBuf,
        field: &'static str,
        value: String,
    },
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    resource: RawResource,
    fallback: RawFallback,
    detached: RawDetached,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawResource {
    name: Option<String>,
    #[serde(rename = "type")]
    ty: Option<String>,
    placeholders: Option<Vec<String>>,
    constructors: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawFallback {
    names: Option<Vec<String>>,
    types: Option<Vec<String>>,
    accessor: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawDetached {
    enabled: Option<bool>,
    derived_name: Option<String>,
    decouple: Option<String>,
    tracer: Option<String>,
    tracer_name: Option<String>,
    span_name: Option<String>,
    span_var: Option<String>,
    span_end: Option<String>,
}

/// Nearest `ctxscope.toml` at or above `start`.
pub fn find_config(start: &Path) -> Option<PathBuf> {
    let mut current = if start.is_dir() {
        start.to_path_buf()
    } else {
        start
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
    };
    loop {
        let candidate = current.join(CONFIG_FILE);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !current.pop() {
            break;
        }
    }
    None
}

pub fn load_options(path: &Path) -> Result<Options, ConfigError> {
    let content = fs::read_to_string(path).map_err(|error| ConfigError::Io {
        path: path.to_path_buf(),
        error,
    })?;
    parse_options(&content, path)
}

/// Options from the text of a config file; unset keys keep their defaults.
pub fn parse_options(content: &str, path: &Path) -> Result<Options, ConfigError> {
    let raw: ConfigFile = toml::from_str(content).map_err(|error| ConfigError::Parse {
        path: path.to_path_buf(),
        message: error.to_string(),
    })?;
    let checker = Checker { path };
    let mut options = Options::default();

    let resource = raw.resource;
    if let Some(name) = resource.name {
        options.resource.name = checker.identifier("resource.name", name)?;
    }
    if let Some(ty) = resource.ty {
        options.resource.ty = checker.qualified("resource.type", &ty)?;
    }
    if let Some(placeholders) = resource.placeholders {
        options.resource.placeholders = placeholders
            .iter()
            .map(|text| checker.qualified("resource.placeholders", text))
            .collect::<Result<_, _>>()?;
    }
    if let Some(constructors) = resource.constructors {
        options.resource.constructors = constructors
            .into_iter()
            .map(|name| checker.identifier("resource.constructors", name))
            .collect::<Result<_, _>>()?;
    }

    let fallback = raw.fallback;
    if let Some(names) = fallback.names {
        options.fallback.names = names
            .into_iter()
            .map(|name| checker.identifier("fallback.names", name))
            .collect::<Result<_, _>>()?;
    }
    if let Some(types) = fallback.types {
        options.fallback.types = types
            .iter()
            .map(|text| checker.pattern("fallback.types", text))
            .collect::<Result<_, _>>()?;
    }
    if let Some(accessor) = fallback.accessor {
        options.fallback.accessor = checker.identifier("fallback.accessor", accessor)?;
    }

    let detached = raw.detached;
    let target = &mut options.detached;
    if let Some(enabled) = detached.enabled {
        target.enabled = enabled;
    }
    if let Some(name) = detached.derived_name {
        target.derived_name = checker.identifier("detached.derived_name", name)?;
    }
    if let Some(decouple) = detached.decouple {
        target.decouple = checker.qualified("detached.decouple", &decouple)?;
    }
    if let Some(tracer) = detached.tracer {
        target.tracer = checker.qualified("detached.tracer", &tracer)?;
    }
    if let Some(name) = detached.tracer_name {
        target.tracer_name = checker.literal("detached.tracer_name", name)?;
    }
    if let Some(name) = detached.span_name {
        target.span_name = checker.literal("detached.span_name", name)?;
    }
    if let Some(name) = detached.span_var {
        target.span_var = checker.identifier("detached.span_var", name)?;
    }
    if let Some(name) = detached.span_end {
        target.span_end = checker.identifier("detached.span_end", name)?;
    }
    Ok(options)
}

struct Checker<'p> {
    path: &'p Path,
}

impl Checker<'_> {
    fn invalid(&self, field: &'static str, value: &str) -> ConfigError {
        ConfigError::Invalid {
            path: self.path.to_path_buf(),
            field,
            value: value.to_string(),
        }
    }

    fn identifier(&self, field: &'static str, value: String) -> Result<String, ConfigError> {
        if is_identifier(&value) {
            Ok(value)
        } else {
            Err(self.invalid(field, &value))
        }
    }

    fn qualified(&self, field: &'static str, value: &str) -> Result<QualifiedName, ConfigError> {
        QualifiedName::parse(value).ok_or_else(|| self.invalid(field, value))
    }

    fn pattern(&self, field: &'static str, value: &str) -> Result<TypePattern, ConfigError> {
        TypePattern::parse(value).ok_or_else(|| self.invalid(field, value))
    }

    /// Text emitted inside a Go string literal.
    fn literal(&self, field: &'static str, value: String) -> Result<String, ConfigError> {
        if value.chars().any(|ch| matches!(ch, '"' | '\\' | '\n' | '\r')) {
            Err(self.invalid(field, &value))
        } else {
            Ok(value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn empty_file_keeps_defaults() {
        let options = parse_options("", Path::new(CONFIG_FILE)).expect("options");
        assert_eq!(options, Options::default());
    }

    #[test]
    fn overrides_names_and_types() {
        let text = r#"
[resource]
name = "c"
placeholders = ["context.TODO", "context.Background"]

[fallback]
names = ["req", "r"]
types = ["*net/http.Request", "github.com/labstack/echo/v4.Context"]

[detached]
enabled = false
tracer = "example.com/trace.Tracer"
"#;
        let options = parse_options(text, Path::new(CONFIG_FILE)).expect("options");
        assert_eq!(options.resource.name, "c");
        assert_eq!(options.resource.placeholders.len(), 2);
        assert_eq!(options.fallback.names, vec!["req", "r"]);
        assert_eq!(
            options.fallback.types[1].name,
            QualifiedName::new("github.com/labstack/echo/v4", "Context")
        );
        assert!(!options.fallback.types[1].pointer);
        assert!(!options.detached.enabled);
        assert_eq!(options.detached.tracer.path, "example.com/trace");
    }

    #[test]
    fn rejects_invalid_values() {
        let err = parse_options("[resource]\nname = \"not valid\"\n", Path::new(CONFIG_FILE))
            .expect_err("invalid name");
        assert!(matches!(err, ConfigError::Invalid { field: "resource.name", .. }));

        let err = parse_options("[detached]\ndecouple = \"WithoutCancel\"\n", Path::new(CONFIG_FILE))
            .expect_err("unqualified");
        assert!(matches!(err, ConfigError::Invalid { .. }));

        let err = parse_options("[detached]\nspan_name = \"a\\\"b\"\n", Path::new(CONFIG_FILE))
            .expect_err("quote");
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = parse_options("[resource]\nnmae = \"ctx\"\n", Path::new(CONFIG_FILE))
            .expect_err("unknown key");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn finds_config_in_ancestors() {
        let dir = tempdir().expect("tempdir");
        let nested = dir.path().join("svc/handlers");
        fs::create_dir_all(&nested).expect("mkdir");
        fs::write(dir.path().join(CONFIG_FILE), "").expect("write config");
        let file = nested.join("h.go");
        fs::write(&file, "package handlers\n").expect("write go");

        assert_eq!(find_config(&file), Some(dir.path().join(CONFIG_FILE)));
        assert_eq!(find_config(&nested), Some(dir.path().join(CONFIG_FILE)));
    }
}
