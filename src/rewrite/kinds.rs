use super::*;

/// Kind of a binding declared with type `ty`, or `None` when the type is not
/// one the rewriter knows. `shadowed` reports package names hidden by locals.
pub fn type_kind(
    ty: &Expr,
    imports: &ImportTable,
    options: &Options,
    shadowed: &dyn Fn(&str) -> bool,
) -> Option<BindingKind> {
    if matches_pattern(ty, &options.value_type(), imports, shadowed) {
        return Some(BindingKind::Value);
    }
    if matches_pattern(ty, &options.pointer_type(), imports, shadowed) {
        return Some(BindingKind::Pointer);
    }
    options
        .fallback
        .types
        .iter()
        .any(|pattern| matches_pattern(ty, pattern, imports, shadowed))
        .then_some(BindingKind::Accessor)
}

fn matches_pattern(
    ty: &Expr,
    pattern: &TypePattern,
    imports: &ImportTable,
    shadowed: &dyn Fn(&str) -> bool,
) -> bool {
    let (pointer, named) = match ty.unparen() {
        Expr::Star(star) => (true, star.x.unparen()),
        other => (false, other),
    };
    pointer == pattern.pointer
        && imports
            .qualifier(named, &pattern.name)
            .is_some_and(|qualifier| !shadowed(qualifier))
}

impl<'a> Rewriter<'a> {
    pub(super) fn declared_type_kind(&self, ty: &Expr, at: usize) -> Option<BindingKind> {
        type_kind(ty, &self.imports, self.options, &|name| {
            self.scopes.is_declared(name, at)
        })
    }

    /// Kind of the `result`-th value produced by the initializer `expr`.
    pub(super) fn init_kind(&self, expr: &Expr, result: usize, at: usize) -> Option<BindingKind> {
        match expr.unparen() {
            Expr::Call(call) => self.call_result_kind(call, result, at),
            Expr::Unary(unary) if unary.op == UnaryOp::Ref && result == 0 => {
                match self.init_kind(&unary.x, 0, at) {
                    Some(BindingKind::Value) => Some(BindingKind::Pointer),
                    _ => None,
                }
            }
            Expr::Star(star) if result == 0 => match self.init_kind(&star.x, 0, at) {
                Some(BindingKind::Pointer) => Some(BindingKind::Value),
                _ => None,
            },
            Expr::Ident(ident) if result == 0 => {
                self.scopes.resolve(&ident.name, at).map(|binding| binding.kind)
            }
            Expr::TypeAssert(assert) if result == 0 => assert
                .ty
                .as_ref()
                .and_then(|ty| self.declared_type_kind(ty, at)),
            _ => None,
        }
    }

    fn call_result_kind(&self, call: &CallExpr, result: usize, at: usize) -> Option<BindingKind> {
        match call.fun.unparen() {
            Expr::Selector(selector) => {
                if let Expr::Ident(qualifier) = &selector.x {
                    let package = self
                        .imports
                        .path_of(&qualifier.name)
                        .filter(|_| !self.scopes.is_declared(&qualifier.name, at));
                    if let Some(package) = package {
                        let resource = &self.options.resource;
                        if package != resource.ty.path || result != 0 {
                            return None;
                        }
                        let name = selector.sel.name.as_str();
                        let known = name == resource.ty.name
                            || resource.constructors.iter().any(|ctor| ctor == name);
                        return known.then_some(BindingKind::Value);
                    }
                }
                if selector.sel.name == self.options.fallback.accessor
                    && call.args.is_empty()
                    && result == 0
                {
                    return Some(BindingKind::Value);
                }
                self.index
                    .unique_method(&selector.sel.name)
                    .and_then(|(_, signature)| signature.result(result))
            }
            Expr::Ident(ident) => self
                .index
                .function(&ident.name)
                .and_then(|signature| signature.result(result)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::parser::parse_file;

    fn param_kinds(source: &str) -> Vec<Option<BindingKind>> {
        let file = parse_file(source).expect("parse");
        let imports = ImportTable::from_file(&file);
        let options = Options::default();
        let func = file.functions().next().expect("func");
        func.ty
            .params
            .fields
            .iter()
            .map(|field| type_kind(&field.ty, &imports, &options, &|_| false))
            .collect()
    }

    #[test]
    fn declared_types_map_to_kinds() {
        let kinds = param_kinds(
            "package p\nimport (\n\t\"context\"\n\t\"net/http\"\n)\nfunc f(a context.Context, b *context.Context, c *http.Request, d http.Request, e int) {}\n",
        );
        assert_eq!(
            kinds,
            vec![
                Some(BindingKind::Value),
                Some(BindingKind::Pointer),
                Some(BindingKind::Accessor),
                None,
                None,
            ]
        );
    }

    #[test]
    fn aliased_packages_are_matched_by_path() {
        let kinds = param_kinds(
            "package p\nimport stdctx \"context\"\nfunc f(a stdctx.Context, b context.Context) {}\n",
        );
        assert_eq!(kinds, vec![Some(BindingKind::Value), None]);
    }

    #[test]
    fn shadowed_package_names_do_not_match() {
        let source = "package p\nimport \"context\"\nfunc f(a context.Context) {}\n";
        let file = parse_file(source).expect("parse");
        let imports = ImportTable::from_file(&file);
        let func = file.functions().next().expect("func");
        let ty = &func.ty.params.fields[0].ty;
        let kind = type_kind(ty, &imports, &Options::default(), &|name| name == "context");
        assert_eq!(kind, None);
    }
}
