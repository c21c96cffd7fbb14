use super::*;

/// Picks the binding that replaces a placeholder at `at`: the primary name
/// as a value, then the primary name through a pointer, then the first
/// secondary name that offers an accessor.
pub fn resolve_site<'s>(scopes: &'s ScopeStack, options: &Options, at: usize) -> Option<&'s Binding> {
    if let Some(binding) = scopes.resolve(&options.resource.name, at) {
        if matches!(binding.kind, BindingKind::Value | BindingKind::Pointer) {
            return Some(binding);
        }
    }
    options
        .fallback
        .names
        .iter()
        .filter_map(|name| scopes.resolve(name, at))
        .find(|binding| binding.kind == BindingKind::Accessor)
}

impl<'a> Rewriter<'a> {
    /// Whether `call` is one of the configured placeholder calls.
    pub(super) fn is_placeholder(&self, call: &CallExpr) -> bool {
        if !call.args.is_empty() || call.spread {
            return false;
        }
        let at = call.span.start;
        self.options.resource.placeholders.iter().any(|placeholder| {
            self.imports
                .qualifier(&call.fun, placeholder)
                .is_some_and(|qualifier| !self.scopes.is_declared(qualifier, at))
        })
    }

    pub(super) fn replace_placeholder(&mut self, call: &CallExpr) {
        let at = call.span.start;
        let Some(binding) = resolve_site(&self.scopes, self.options, at) else {
            debug!(line = self.lines.line(at), "no resource in scope, placeholder kept");
            return;
        };
        let with = binding.substitution(&self.options.fallback.accessor);
        if binding.is_derived() {
            self.derived_uses += 1;
        }
        let placeholder = call.span.slice(self.source).to_string();
        self.edits.replace(call, with.clone());
        self.notice(at, NoticeKind::Replaced { placeholder, with });
    }

    /// `ctx` inside a launch body that now runs on the derived resource.
    pub(super) fn redirect_ident(&mut self, ident: &Ident) {
        if ident.name != self.options.resource.name {
            return;
        }
        let Some(binding) = self.scopes.resolve(&ident.name, ident.span.start) else {
            return;
        };
        if binding.origin != (Origin::Derived { source: BindingKind::Value }) {
            return;
        }
        let target = binding.target.clone();
        self.derived_uses += 1;
        self.edits.replace(ident, target.clone());
        self.notice(
            ident.span.start,
            NoticeKind::Redirected {
                from: ident.name.clone(),
                to: target,
            },
        );
    }

    /// `*ctx` where the derived resource came from a pointer binding.
    pub(super) fn redirect_deref(&mut self, star: &StarExpr) -> bool {
        let Some(ident) = star.x.unparen().as_ident() else {
            return false;
        };
        if ident.name != self.options.resource.name {
            return false;
        }
        let Some(binding) = self.scopes.resolve(&ident.name, ident.span.start) else {
            return false;
        };
        if binding.origin != (Origin::Derived { source: BindingKind::Pointer }) {
            return false;
        }
        let target = binding.target.clone();
        self.derived_uses += 1;
        self.edits.replace(&star.span, target.clone());
        self.notice(
            star.span.start,
            NoticeKind::Redirected {
                from: star.span.slice(self.source).to_string(),
                to: target,
            },
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack() -> ScopeStack {
        let mut scopes = ScopeStack::new();
        scopes.push_root();
        scopes
    }

    #[test]
    fn value_binding_wins() {
        let mut scopes = stack();
        scopes.bind("r", BindingKind::Accessor, 0, Origin::Param);
        scopes.bind("ctx", BindingKind::Value, 0, Origin::Param);
        let binding = resolve_site(&scopes, &Options::default(), 10).expect("binding");
        assert_eq!(binding.name, "ctx");
    }

    #[test]
    fn pointer_binding_is_dereferenced() {
        let mut scopes = stack();
        scopes.bind("ctx", BindingKind::Pointer, 0, Origin::Param);
        let binding = resolve_site(&scopes, &Options::default(), 10).expect("binding");
        assert_eq!(binding.substitution("Context"), "*ctx");
    }

    #[test]
    fn falls_back_to_accessor() {
        let mut scopes = stack();
        scopes.bind("r", BindingKind::Accessor, 0, Origin::Param);
        let binding = resolve_site(&scopes, &Options::default(), 10).expect("binding");
        assert_eq!(binding.substitution("Context"), "r.Context()");
    }

    #[test]
    fn shadowed_primary_falls_through_to_accessor() {
        let mut scopes = stack();
        scopes.bind("ctx", BindingKind::Value, 0, Origin::Param);
        scopes.bind("r", BindingKind::Accessor, 0, Origin::Param);
        scopes.push();
        scopes.shadow("ctx", 5);
        let binding = resolve_site(&scopes, &Options::default(), 10).expect("binding");
        assert_eq!(binding.name, "r");
    }

    #[test]
    fn nothing_in_scope_resolves_to_none() {
        let mut scopes = stack();
        scopes.bind("r", BindingKind::Value, 0, Origin::Param);
        assert!(resolve_site(&scopes, &Options::default(), 10).is_none());
    }
}
