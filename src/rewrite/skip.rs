use crate::language::{
    ast::*,
    visit::{walk_expr, walk_file, walk_func_type, walk_stmt, Visitor},
};
use crate::rewrite::{
    binding::BindingKind,
    imports::ImportTable,
    kinds::type_kind,
    launch::is_marker,
    options::Options,
};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Static identity of a function declared in the file being rewritten.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FunctionId {
    /// Receiver base type for methods.
    pub receiver: Option<String>,
    pub name: String,
}

impl FunctionId {
    pub fn function(name: impl Into<String>) -> Self {
        Self {
            receiver: None,
            name: name.into(),
        }
    }

    pub fn method(receiver: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            receiver: Some(receiver.into()),
            name: name.into(),
        }
    }

    pub fn of(func: &FuncDecl) -> Self {
        match func.receiver_type_name() {
            Some(receiver) => Self::method(receiver, &func.name.name),
            None => Self::function(&func.name.name),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Signature {
    results: Vec<Option<BindingKind>>,
}

impl Signature {
    pub fn result(&self, idx: usize) -> Option<BindingKind> {
        self.results.get(idx).copied().flatten()
    }
}

/// Top-level functions and methods of one file, with the kinds of their results.
#[derive(Debug, Default)]
pub struct FileIndex {
    functions: HashMap<String, Signature>,
    methods: HashMap<String, Vec<(String, Signature)>>,
}

impl FileIndex {
    pub fn build(file: &SourceFile, imports: &ImportTable, options: &Options) -> Self {
        let mut index = Self::default();
        for func in file.functions() {
            let signature = Signature {
                results: result_kinds(&func.ty, imports, options),
            };
            match (&func.recv, func.receiver_type_name()) {
                (None, _) => {
                    index.functions.insert(func.name.name.clone(), signature);
                }
                (Some(_), Some(receiver)) => index
                    .methods
                    .entry(func.name.name.clone())
                    .or_default()
                    .push((receiver.to_string(), signature)),
                (Some(_), None) => {}
            }
        }
        index
    }

    pub fn function(&self, name: &str) -> Option<&Signature> {
        self.functions.get(name)
    }

    /// The method called `name`, if exactly one type in the file declares it.
    pub fn unique_method(&self, name: &str) -> Option<(&str, &Signature)> {
        match self.methods.get(name).map(Vec::as_slice) {
            Some([(receiver, signature)]) => Some((receiver.as_str(), signature)),
            _ => None,
        }
    }
}

fn result_kinds(ty: &FuncType, imports: &ImportTable, options: &Options) -> Vec<Option<BindingKind>> {
    let Some(results) = &ty.results else {
        return Vec::new();
    };
    let mut kinds = Vec::new();
    for field in &results.fields {
        let kind = type_kind(&field.ty, imports, options, &|_| false);
        let count = field.names.len().max(1);
        kinds.extend(std::iter::repeat(kind).take(count));
    }
    kinds
}

/// Functions that only ever run as the target of a `go` statement.
#[derive(Clone, Debug, Default)]
pub struct SkipSet {
    ids: HashSet<FunctionId>,
}

impl SkipSet {
    pub fn analyze(
        file: &SourceFile,
        index: &FileIndex,
        imports: &ImportTable,
        options: &Options,
    ) -> Self {
        let mut uses = UseCollector {
            index,
            imports,
            options,
            launched: HashSet::new(),
            synchronous: HashSet::new(),
        };
        walk_file(&mut uses, file);
        let ids: HashSet<FunctionId> = uses
            .launched
            .difference(&uses.synchronous)
            .cloned()
            .collect();
        for id in &ids {
            debug!(function = %id.name, receiver = ?id.receiver, "launch-only function");
        }
        Self { ids }
    }

    pub fn contains(&self, id: &FunctionId) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

struct UseCollector<'a> {
    index: &'a FileIndex,
    imports: &'a ImportTable,
    options: &'a Options,
    launched: HashSet<FunctionId>,
    synchronous: HashSet<FunctionId>,
}

impl UseCollector<'_> {
    fn identity(&self, expr: &Expr) -> Option<FunctionId> {
        match expr.unparen() {
            Expr::Ident(ident) => self
                .index
                .function(&ident.name)
                .map(|_| FunctionId::function(&ident.name)),
            Expr::Selector(selector) => {
                if let Expr::Ident(operand) = &selector.x {
                    if self.imports.path_of(&operand.name).is_some() {
                        return None;
                    }
                }
                self.index
                    .unique_method(&selector.sel.name)
                    .map(|(receiver, _)| FunctionId::method(receiver, &selector.sel.name))
            }
            _ => None,
        }
    }

    fn launch_callee(&mut self, call: &CallExpr) {
        if let Some(id) = self.identity(&call.fun) {
            self.launched.insert(id);
        }
        if let Expr::Selector(selector) = call.fun.unparen() {
            self.visit_expr(&selector.x);
        }
        for arg in &call.args {
            self.visit_expr(arg);
        }
    }

    /// An inline launch; a body that opens with the derived-resource marker
    /// and ends in a call was produced by wrapping that call.
    fn launch_inline(&mut self, lit: &FuncLit, args: &[Expr]) {
        for arg in args {
            self.visit_expr(arg);
        }
        walk_func_type(self, &lit.ty);
        let stmts = &lit.body.stmts;
        let wrapped = stmts.len() > 1
            && stmts
                .first()
                .is_some_and(|first| is_marker(first, self.imports, self.options));
        for (idx, stmt) in stmts.iter().enumerate() {
            match stmt {
                Stmt::Expr(ExprStmt {
                    expr: Expr::Call(call),
                }) if wrapped && idx + 1 == stmts.len() => self.launch_callee(call),
                _ => self.visit_stmt(stmt),
            }
        }
    }
}

impl<'ast> Visitor<'ast> for UseCollector<'_> {
    fn visit_stmt(&mut self, stmt: &'ast Stmt) {
        match stmt {
            Stmt::Go(go) => match go.call.func_lit() {
                Some(lit) => self.launch_inline(lit, &go.call.args),
                None => self.launch_callee(&go.call),
            },
            _ => walk_stmt(self, stmt),
        }
    }

    fn visit_expr(&mut self, expr: &'ast Expr) {
        if let Some(id) = self.identity(expr) {
            self.synchronous.insert(id);
        }
        walk_expr(self, expr);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::parser::parse_file;

    fn skip_set(source: &str) -> SkipSet {
        let file = parse_file(source).expect("parse");
        let imports = ImportTable::from_file(&file);
        let options = Options::default();
        let index = FileIndex::build(&file, &imports, &options);
        SkipSet::analyze(&file, &index, &imports, &options)
    }

    #[test]
    fn launch_only_functions_are_skipped() {
        let set = skip_set(
            "package p\nfunc worker(ctx context.Context) {}\nfunc run(ctx context.Context) {\n\tgo worker(ctx)\n}\n",
        );
        assert!(set.contains(&FunctionId::function("worker")));
        assert!(!set.contains(&FunctionId::function("run")));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn synchronous_calls_keep_functions_out() {
        let set = skip_set(
            "package p\nfunc worker() {}\nfunc run() {\n\tgo worker()\n\tworker()\n}\n",
        );
        assert!(set.is_empty());
    }

    #[test]
    fn references_as_values_count_as_synchronous() {
        let set = skip_set(
            "package p\nfunc worker() {}\nfunc run() {\n\tgo worker()\n\tregister(worker)\n}\n",
        );
        assert!(set.is_empty());
    }

    #[test]
    fn unique_methods_are_identified_by_receiver() {
        let set = skip_set(
            "package p\ntype S struct{}\nfunc (s *S) loop() {}\nfunc (s *S) Start() {\n\tgo s.loop()\n}\n",
        );
        assert!(set.contains(&FunctionId::method("S", "loop")));
    }

    #[test]
    fn ambiguous_method_names_are_never_skipped() {
        let set = skip_set(
            "package p\ntype A struct{}\ntype B struct{}\nfunc (A) loop() {}\nfunc (B) loop() {}\nfunc run(a A) {\n\tgo a.loop()\n}\n",
        );
        assert!(set.is_empty());
    }

    #[test]
    fn package_qualified_launches_are_ignored() {
        let set = skip_set(
            "package p\nimport \"worker\"\nfunc Run() {}\nfunc run() {\n\tgo worker.Run()\n}\n",
        );
        assert!(set.is_empty());
    }

    #[test]
    fn wrapped_launches_still_count_as_launches() {
        let set = skip_set(
            "package p\nimport \"context\"\nfunc worker(ctx context.Context) {}\nfunc run(ctx context.Context) {\n\tgo func() {\n\t\tdetachedCtx := context.WithoutCancel(ctx)\n\t\tdetachedCtx, detachedSpan := otel.Tracer(\"ctxscope\").Start(detachedCtx, \"detached\")\n\t\tdefer detachedSpan.End()\n\t\tworker(detachedCtx)\n\t}()\n}\n",
        );
        assert!(set.contains(&FunctionId::function("worker")));
    }

    #[test]
    fn index_records_result_kinds() {
        let source = "package p\nimport \"context\"\nfunc make() (a, b context.Context, err error) { return }\nfunc (s *S) ctx() *context.Context { return nil }\n";
        let file = parse_file(source).expect("parse");
        let imports = ImportTable::from_file(&file);
        let index = FileIndex::build(&file, &imports, &Options::default());
        let make = index.function("make").expect("make");
        assert_eq!(make.result(1), Some(BindingKind::Value));
        assert_eq!(make.result(2), None);
        let (receiver, method) = index.unique_method("ctx").expect("method");
        assert_eq!(receiver, "S");
        assert_eq!(method.result(0), Some(BindingKind::Pointer));
    }
}
