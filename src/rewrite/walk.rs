use super::*;

impl<'a> Rewriter<'a> {
    pub(super) fn walk_func_decl(&mut self, func: &FuncDecl) {
        let Some(body) = &func.body else {
            return;
        };
        if self.skip.contains(&FunctionId::of(func)) {
            debug!(function = %func.name.name, "launch-only function left as is");
            return;
        }
        self.scopes.push_root();
        let pos = body.lbrace.start;
        if let Some(recv) = &func.recv {
            self.declare_fields(recv, Origin::Receiver, pos);
        }
        self.declare_fields(&func.ty.params, Origin::Param, pos);
        if let Some(results) = &func.ty.results {
            self.declare_fields(results, Origin::Result, pos);
        }
        self.walk_stmts(&body.stmts);
        self.scopes.pop();
    }

    /// Package-level declarations only matter for the function literals
    /// in their initializers.
    pub(super) fn walk_package_decl(&mut self, decl: &GenDecl) {
        for spec in &decl.specs {
            if let Spec::Value(spec) = spec {
                for value in &spec.values {
                    self.walk_expr(value);
                }
            }
        }
    }

    pub(super) fn walk_func_lit(&mut self, lit: &FuncLit) {
        self.scopes.push();
        self.declare_params(&lit.ty);
        self.walk_stmts(&lit.body.stmts);
        self.scopes.pop();
    }

    pub(super) fn declare_params(&mut self, ty: &FuncType) {
        let pos = ty.span.end;
        self.declare_fields(&ty.params, Origin::Param, pos);
        if let Some(results) = &ty.results {
            self.declare_fields(results, Origin::Result, pos);
        }
    }

    fn declare_fields(&mut self, fields: &FieldList, origin: Origin, pos: usize) {
        // Types are resolved before any of the names are in scope.
        let kinds: Vec<Option<BindingKind>> = fields
            .fields
            .iter()
            .map(|field| self.declared_type_kind(&field.ty, pos))
            .collect();
        for (field, kind) in fields.fields.iter().zip(kinds) {
            for name in &field.names {
                self.declare(&name.name, kind, pos, origin);
            }
        }
    }

    fn declare(&mut self, name: &str, kind: Option<BindingKind>, pos: usize, origin: Origin) {
        if name == "_" || !self.tracked.contains(name) {
            return;
        }
        match kind {
            Some(kind) => {
                debug!(binding = name, %kind, ?origin, line = self.lines.line(pos), "bind");
                self.scopes.bind(name, kind, pos, origin);
            }
            None => self.scopes.shadow(name, pos),
        }
    }

    pub(super) fn walk_stmts(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            self.walk_stmt(stmt);
        }
    }

    fn walk_block(&mut self, block: &Block) {
        self.scopes.push();
        self.walk_stmts(&block.stmts);
        self.scopes.pop();
    }

    pub(super) fn walk_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Decl(decl) => self.walk_local_decl(decl),
            Stmt::Empty(_) | Stmt::Branch(_) => {}
            Stmt::Labeled(labeled) => self.walk_stmt(&labeled.stmt),
            Stmt::Expr(stmt) => self.walk_expr(&stmt.expr),
            Stmt::Send(send) => {
                self.walk_expr(&send.chan);
                self.walk_expr(&send.value);
            }
            Stmt::IncDec(stmt) => self.walk_expr(&stmt.x),
            Stmt::Assign(assign) => self.walk_assign(assign),
            Stmt::Go(go) => self.walk_go(go),
            Stmt::Defer(defer) => self.walk_call(&defer.call),
            Stmt::Return(ret) => {
                for result in &ret.results {
                    self.walk_expr(result);
                }
            }
            Stmt::Block(block) => self.walk_block(block),
            Stmt::If(stmt) => self.walk_if(stmt),
            Stmt::Switch(switch) => {
                self.scopes.push();
                if let Some(init) = &switch.init {
                    self.walk_stmt(init);
                }
                if let Some(tag) = &switch.tag {
                    self.walk_expr(tag);
                }
                for clause in &switch.clauses {
                    for expr in &clause.exprs {
                        self.walk_expr(expr);
                    }
                    self.scopes.push();
                    self.walk_stmts(&clause.body);
                    self.scopes.pop();
                }
                self.scopes.pop();
            }
            Stmt::TypeSwitch(switch) => self.walk_type_switch(switch),
            Stmt::Select(select) => {
                for clause in &select.clauses {
                    self.scopes.push();
                    if let Some(comm) = &clause.comm {
                        self.walk_stmt(comm);
                    }
                    self.walk_stmts(&clause.body);
                    self.scopes.pop();
                }
            }
            Stmt::For(stmt) => {
                self.scopes.push();
                if let Some(init) = &stmt.init {
                    self.walk_stmt(init);
                }
                if let Some(cond) = &stmt.cond {
                    self.walk_expr(cond);
                }
                if let Some(post) = &stmt.post {
                    self.walk_stmt(post);
                }
                self.walk_block(&stmt.body);
                self.scopes.pop();
            }
            Stmt::Range(range) => self.walk_range(range),
        }
    }

    fn walk_if(&mut self, stmt: &IfStmt) {
        self.scopes.push();
        if let Some(init) = &stmt.init {
            self.walk_stmt(init);
        }
        self.walk_expr(&stmt.cond);
        self.walk_block(&stmt.then);
        if let Some(els) = &stmt.els {
            self.walk_stmt(els);
        }
        self.scopes.pop();
    }

    fn walk_type_switch(&mut self, switch: &TypeSwitchStmt) {
        self.scopes.push();
        if let Some(init) = &switch.init {
            self.walk_stmt(init);
        }
        self.walk_expr(&switch.subject);
        for clause in &switch.clauses {
            self.scopes.push();
            if let Some(binding) = &switch.binding {
                let kind = match clause.exprs.as_slice() {
                    [ty] => self.declared_type_kind(ty, clause.span.start),
                    _ => None,
                };
                self.declare(&binding.name, kind, clause.span.start, Origin::Local);
            }
            self.walk_stmts(&clause.body);
            self.scopes.pop();
        }
        self.scopes.pop();
    }

    fn walk_range(&mut self, range: &RangeStmt) {
        self.walk_expr(&range.expr);
        self.scopes.push();
        let targets = [&range.key, &range.value];
        for target in targets.into_iter().flatten() {
            match target.as_ident() {
                Some(ident) if range.define => {
                    self.declare(&ident.name, None, range.body.lbrace.start, Origin::Local)
                }
                Some(_) => {}
                None => self.walk_expr(target),
            }
        }
        self.walk_block(&range.body);
        self.scopes.pop();
    }

    fn walk_local_decl(&mut self, decl: &GenDecl) {
        for spec in &decl.specs {
            match spec {
                Spec::Value(spec) => {
                    let targets: Vec<&str> = spec.names.iter().map(|n| n.name.as_str()).collect();
                    self.walk_values(&targets, &spec.values);
                    let at = spec.span.start;
                    let end = spec.span.end;
                    for (idx, name) in spec.names.iter().enumerate() {
                        let kind = match &spec.ty {
                            Some(ty) => self.declared_type_kind(ty, at),
                            None => self.local_kind(&name.name, &spec.values, spec.names.len(), idx, at),
                        };
                        self.declare(&name.name, kind, end, Origin::Local);
                    }
                }
                Spec::Type(spec) => self.declare(&spec.name.name, None, spec.span.start, Origin::Local),
            }
        }
    }

    fn walk_assign(&mut self, assign: &AssignStmt) {
        let targets: Vec<&str> = assign
            .lhs
            .iter()
            .map(|lhs| lhs.as_ident().map_or("", |ident| ident.name.as_str()))
            .collect();
        match assign.op {
            AssignOp::Define => {
                self.walk_values(&targets, &assign.rhs);
                let at = assign.span.start;
                let end = assign.span.end;
                for (idx, lhs) in assign.lhs.iter().enumerate() {
                    let Some(ident) = lhs.as_ident() else {
                        continue;
                    };
                    // `:=` only assigns names the same block already declared.
                    if self.scopes.declared_here(&ident.name) {
                        continue;
                    }
                    let kind = self.local_kind(&ident.name, &assign.rhs, assign.lhs.len(), idx, at);
                    self.declare(&ident.name, kind, end, Origin::Local);
                }
            }
            AssignOp::Assign => {
                self.walk_values(&targets, &assign.rhs);
                self.walk_targets(&assign.lhs);
            }
            AssignOp::Op(_) => {
                for value in &assign.rhs {
                    self.walk_expr(value);
                }
                self.walk_targets(&assign.lhs);
            }
        }
    }

    fn walk_targets(&mut self, lhs: &[Expr]) {
        for target in lhs {
            if target.as_ident().is_none() {
                self.walk_expr(target);
            }
        }
    }

    /// Initializers paired with their targets. A placeholder assigned
    /// straight to the primary name is the resource being created, and
    /// stays.
    fn walk_values(&mut self, targets: &[&str], values: &[Expr]) {
        let paired = targets.len() == values.len();
        for (idx, value) in values.iter().enumerate() {
            let initializes_primary =
                paired && targets[idx] == self.options.resource.name;
            if initializes_primary {
                if let Expr::Call(call) = value {
                    if self.is_placeholder(call) {
                        debug!(line = self.lines.line(call.span.start), "resource initializer left as is");
                        continue;
                    }
                }
            }
            self.walk_expr(value);
        }
    }

    fn value_kind(&self, values: &[Expr], targets: usize, idx: usize, at: usize) -> Option<BindingKind> {
        if values.len() == targets {
            self.init_kind(&values[idx], 0, at)
        } else if let [single] = values {
            self.init_kind(single, idx, at)
        } else {
            None
        }
    }

    /// Kind of a local introduced without a type. The primary name taken
    /// from a call whose result cannot be resolved still holds a context,
    /// so it is bound as a value and reported.
    fn local_kind(
        &mut self,
        name: &str,
        values: &[Expr],
        targets: usize,
        idx: usize,
        at: usize,
    ) -> Option<BindingKind> {
        if let Some(kind) = self.value_kind(values, targets, idx, at) {
            return Some(kind);
        }
        if name != self.options.resource.name {
            return None;
        }
        let init = match values {
            _ if values.len() == targets => &values[idx],
            [single] => single,
            _ => return None,
        };
        let Expr::Call(call) = init.unparen() else {
            return None;
        };
        let callee = call.fun.span().slice(self.source).to_string();
        debug!(binding = name, %callee, line = self.lines.line(at), "unresolved kind, assuming value");
        self.notice(
            at,
            NoticeKind::AssumedValue {
                name: name.to_string(),
                callee,
            },
        );
        Some(BindingKind::Value)
    }

    pub(super) fn walk_call(&mut self, call: &CallExpr) {
        if self.is_placeholder(call) {
            self.replace_placeholder(call);
            return;
        }
        self.walk_expr(&call.fun);
        for arg in &call.args {
            self.walk_expr(arg);
        }
    }

    pub(super) fn walk_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Ident(ident) => self.redirect_ident(ident),
            Expr::Call(call) => self.walk_call(call),
            Expr::FuncLit(lit) => self.walk_func_lit(lit),
            Expr::Star(star) => {
                if !self.redirect_deref(star) {
                    self.walk_expr(&star.x);
                }
            }
            Expr::CompositeLit(lit) => {
                for elt in &lit.elts {
                    match elt {
                        // Struct field names are not references.
                        Expr::KeyValue(kv) if kv.key.as_ident().is_some() => {
                            self.walk_expr(&kv.value)
                        }
                        other => self.walk_expr(other),
                    }
                }
            }
            Expr::Paren(paren) => self.walk_expr(&paren.x),
            Expr::Selector(selector) => self.walk_expr(&selector.x),
            Expr::Index(index) => {
                self.walk_expr(&index.x);
                for idx in &index.indices {
                    self.walk_expr(idx);
                }
            }
            Expr::Slice(slice) => {
                self.walk_expr(&slice.x);
                for bound in [&slice.low, &slice.high, &slice.max].into_iter().flatten() {
                    self.walk_expr(bound);
                }
            }
            Expr::TypeAssert(assert) => self.walk_expr(&assert.x),
            Expr::Unary(unary) => self.walk_expr(&unary.x),
            Expr::Binary(binary) => {
                self.walk_expr(&binary.x);
                self.walk_expr(&binary.y);
            }
            Expr::KeyValue(kv) => {
                self.walk_expr(&kv.key);
                self.walk_expr(&kv.value);
            }
            Expr::BasicLit(_)
            | Expr::ArrayType(_)
            | Expr::MapType(_)
            | Expr::ChanType(_)
            | Expr::FuncType(_)
            | Expr::StructType(_)
            | Expr::InterfaceType(_)
            | Expr::Ellipsis(_) => {}
        }
    }
}
