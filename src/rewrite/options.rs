use crate::language::qualified::{QualifiedName, TypePattern};

/// Resolved rewrite settings. Built from defaults, `ctxscope.toml` and CLI
/// flags by `project::config`.
#[derive(Clone, Debug, PartialEq)]
pub struct Options {
    pub resource: ResourceOptions,
    pub fallback: FallbackOptions,
    pub detached: DetachedOptions,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ResourceOptions {
    /// Primary binding name, `ctx`.
    pub name: String,
    /// Type of a Value binding; its pointer form makes a Pointer binding.
    pub ty: QualifiedName,
    /// Zero-argument calls that stand in for a missing resource.
    pub placeholders: Vec<QualifiedName>,
    /// Functions in the resource's package whose first result is a resource.
    pub constructors: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FallbackOptions {
    /// Secondary binding names, tried in order.
    pub names: Vec<String>,
    pub types: Vec<TypePattern>,
    pub accessor: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DetachedOptions {
    pub enabled: bool,
    pub derived_name: String,
    pub decouple: QualifiedName,
    pub tracer: QualifiedName,
    pub tracer_name: String,
    pub span_name: String,
    pub span_var: String,
    pub span_end: String,
}

pub const CONTEXT_PACKAGE: &str = "context";
pub const OTEL_PACKAGE: &str = "go.opentelemetry.io/otel";

const CONSTRUCTORS: &[&str] = &[
    "Background",
    "TODO",
    "WithCancel",
    "WithCancelCause",
    "WithDeadline",
    "WithDeadlineCause",
    "WithTimeout",
    "WithTimeoutCause",
    "WithValue",
    "WithoutCancel",
];

impl Default for Options {
    fn default() -> Self {
        Self {
            resource: ResourceOptions {
                name: "ctx".into(),
                ty: QualifiedName::new(CONTEXT_PACKAGE, "Context"),
                placeholders: vec![QualifiedName::new(CONTEXT_PACKAGE, "TODO")],
                constructors: CONSTRUCTORS.iter().map(|name| name.to_string()).collect(),
            },
            fallback: FallbackOptions {
                names: vec!["r".into()],
                types: vec![TypePattern::pointer(QualifiedName::new(
                    "net/http", "Request",
                ))],
                accessor: "Context".into(),
            },
            detached: DetachedOptions {
                enabled: true,
                derived_name: "detachedCtx".into(),
                decouple: QualifiedName::new(CONTEXT_PACKAGE, "WithoutCancel"),
                tracer: QualifiedName::new(OTEL_PACKAGE, "Tracer"),
                tracer_name: "ctxscope".into(),
                span_name: "detached".into(),
                span_var: "detachedSpan".into(),
                span_end: "End".into(),
            },
        }
    }
}

impl Options {
    /// Also treat `context.Background()` as a placeholder.
    pub fn with_background(mut self) -> Self {
        let background = QualifiedName::new(self.resource.ty.path.clone(), "Background");
        if !self.resource.placeholders.contains(&background) {
            self.resource.placeholders.push(background);
        }
        self
    }

    pub fn without_detached(mut self) -> Self {
        self.detached.enabled = false;
        self
    }

    pub fn value_type(&self) -> TypePattern {
        TypePattern::value(self.resource.ty.clone())
    }

    pub fn pointer_type(&self) -> TypePattern {
        TypePattern::pointer(self.resource.ty.clone())
    }

    /// Import paths whose local names the rewriter qualifies or matches.
    pub fn referenced_paths(&self) -> Vec<&str> {
        let mut paths = vec![self.resource.ty.path.as_str()];
        paths.extend(self.resource.placeholders.iter().map(|p| p.path.as_str()));
        paths.extend(self.fallback.types.iter().map(|t| t.name.path.as_str()));
        paths.push(self.detached.decouple.path.as_str());
        paths.push(self.detached.tracer.path.as_str());
        paths.sort_unstable();
        paths.dedup();
        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn background_is_opt_in() {
        let options = Options::default();
        assert_eq!(options.resource.placeholders.len(), 1);
        let options = options.with_background().with_background();
        assert_eq!(options.resource.placeholders.len(), 2);
        assert_eq!(options.resource.placeholders[1].name, "Background");
    }

    #[test]
    fn referenced_paths_are_unique() {
        let options = Options::default();
        assert_eq!(
            options.referenced_paths(),
            vec!["context", "go.opentelemetry.io/otel", "net/http"]
        );
    }
}
