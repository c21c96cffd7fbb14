use std::fmt;

/// How a binding turns into a resource expression at a placeholder site.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BindingKind {
    /// The name is the resource itself: `ctx`.
    Value,
    /// The name points at the resource: `*ctx`.
    Pointer,
    /// The resource hangs off the name: `r.Context()`.
    Accessor,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Origin {
    Param,
    Receiver,
    Result,
    Local,
    /// Installed by the launch transformer; `source` is the kind of the
    /// binding it was derived from.
    Derived { source: BindingKind },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Binding {
    pub name: String,
    pub kind: BindingKind,
    /// Identifier emitted at substitution sites. Differs from `name` only for
    /// derived bindings.
    pub target: String,
    /// Byte offset from which the binding is in scope.
    pub visible_from: usize,
    pub origin: Origin,
}

impl Binding {
    pub fn new(name: impl Into<String>, kind: BindingKind, visible_from: usize, origin: Origin) -> Self {
        let name = name.into();
        Self {
            target: name.clone(),
            name,
            kind,
            visible_from,
            origin,
        }
    }

    pub fn derived(
        name: impl Into<String>,
        target: impl Into<String>,
        visible_from: usize,
        source: BindingKind,
    ) -> Self {
        Self {
            name: name.into(),
            kind: BindingKind::Value,
            target: target.into(),
            visible_from,
            origin: Origin::Derived { source },
        }
    }

    pub fn is_derived(&self) -> bool {
        matches!(self.origin, Origin::Derived { .. })
    }

    /// Text that replaces a placeholder resolved to this binding.
    pub fn substitution(&self, accessor: &str) -> String {
        match self.kind {
            BindingKind::Value => self.target.clone(),
            BindingKind::Pointer => format!("*{}", self.target),
            BindingKind::Accessor => format!("{}.{}()", self.target, accessor),
        }
    }
}

impl fmt::Display for BindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            BindingKind::Value => "value",
            BindingKind::Pointer => "pointer",
            BindingKind::Accessor => "accessor",
        };
        f.write_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitution_per_kind() {
        let value = Binding::new("ctx", BindingKind::Value, 0, Origin::Param);
        assert_eq!(value.substitution("Context"), "ctx");
        let pointer = Binding::new("ctx", BindingKind::Pointer, 0, Origin::Param);
        assert_eq!(pointer.substitution("Context"), "*ctx");
        let accessor = Binding::new("r", BindingKind::Accessor, 0, Origin::Param);
        assert_eq!(accessor.substitution("Context"), "r.Context()");
    }

    #[test]
    fn derived_bindings_emit_their_target() {
        let derived = Binding::derived("ctx", "detachedCtx", 10, BindingKind::Pointer);
        assert!(derived.is_derived());
        assert_eq!(derived.kind, BindingKind::Value);
        assert_eq!(derived.substitution("Context"), "detachedCtx");
    }
}
