use super::*;

/// `detachedCtx := context.WithoutCancel(...)`, the first statement of an
/// instrumented launch body.
pub fn is_marker(stmt: &Stmt, imports: &ImportTable, options: &Options) -> bool {
    let Stmt::Assign(assign) = stmt else {
        return false;
    };
    assign.op == AssignOp::Define
        && matches!(assign.lhs.as_slice(), [lhs] if lhs.is_ident(&options.detached.derived_name))
        && matches!(
            assign.rhs.as_slice(),
            [Expr::Call(call)]
                if call.args.len() == 1
                    && imports.qualifier(&call.fun, &options.detached.decouple).is_some()
        )
}

enum LaunchShape<'c> {
    Inline(&'c FuncLit),
    Named,
    Unrecognized,
}

fn launch_shape(call: &CallExpr) -> LaunchShape<'_> {
    match call.fun.unparen() {
        Expr::FuncLit(lit) => LaunchShape::Inline(lit),
        other if is_static_name(other) => LaunchShape::Named,
        _ => LaunchShape::Unrecognized,
    }
}

fn is_static_name(expr: &Expr) -> bool {
    match expr.unparen() {
        Expr::Ident(_) => true,
        Expr::Selector(selector) => is_static_name(&selector.x),
        _ => false,
    }
}

/// Where the derived resource comes from in the launching frame.
struct Derivation {
    text: String,
    kind: BindingKind,
    derived: bool,
}

impl<'a> Rewriter<'a> {
    pub(super) fn walk_go(&mut self, stmt: &GoStmt) {
        if !self.options.detached.enabled {
            return;
        }
        match launch_shape(&stmt.call) {
            LaunchShape::Inline(lit) => self.launch_inline(stmt, lit),
            LaunchShape::Named => self.launch_named(stmt),
            LaunchShape::Unrecognized => {
                let callee = stmt.call.fun.span().slice(self.source).to_string();
                debug!(line = self.lines.line(stmt.span.start), %callee, "unrecognized launch");
                self.notice(stmt.span.start, NoticeKind::UnrecognizedLaunch { callee });
            }
        }
    }

    fn derivation(&self, at: usize) -> Option<Derivation> {
        let binding = resolve_site(&self.scopes, self.options, at)?;
        Some(Derivation {
            text: binding.substitution(&self.options.fallback.accessor),
            kind: binding.kind,
            derived: binding.is_derived(),
        })
    }

    /// Names for the decoupling and tracer packages, unless a local
    /// declaration hides one of them at `at`.
    fn instrumentation_packages(&self, at: usize) -> Option<(ImportName, ImportName)> {
        let detached = &self.options.detached;
        let decouple = self.imports.name_for(&detached.decouple.path);
        let tracer = self.imports.name_for(&detached.tracer.path);
        for name in [&decouple, &tracer] {
            let local = name.local()?;
            if self.scopes.is_declared(local, at) {
                return None;
            }
        }
        Some((decouple, tracer))
    }

    fn require_import(&mut self, name: &ImportName, path: &str) -> String {
        if matches!(name, ImportName::Missing(_)) && !self.missing_imports.iter().any(|p| p == path) {
            self.missing_imports.push(path.to_string());
        }
        name.local().unwrap_or_default().to_string()
    }

    fn instrumentation(&mut self, source: &Derivation, packages: &(ImportName, ImportName)) -> [String; 3] {
        let detached = self.options.detached.clone();
        let decouple = self.require_import(&packages.0, &detached.decouple.path);
        let tracer = self.require_import(&packages.1, &detached.tracer.path);
        if source.derived {
            self.derived_uses += 1;
        }
        [
            format!(
                "{} := {}.{}({})",
                detached.derived_name, decouple, detached.decouple.name, source.text
            ),
            format!(
                "{derived}, {span} := {tracer}.{func}(\"{name}\").Start({derived}, \"{label}\")",
                derived = detached.derived_name,
                span = detached.span_var,
                func = detached.tracer.name,
                name = detached.tracer_name,
                label = detached.span_name,
            ),
            format!("defer {}.{}()", detached.span_var, detached.span_end),
        ]
    }

    fn launch_inline(&mut self, stmt: &GoStmt, lit: &FuncLit) {
        let at = stmt.span.start;
        for arg in &stmt.call.args {
            self.walk_expr(arg);
        }

        if let Some(marker) = lit
            .body
            .stmts
            .first()
            .filter(|first| is_marker(first, &self.imports, self.options))
        {
            debug!(line = self.lines.line(at), "launch already instrumented");
            self.walk_instrumented(lit, marker);
            return;
        }

        let Some(source) = self.derivation(at) else {
            self.walk_func_lit(lit);
            return;
        };
        let Some(packages) = self.instrumentation_packages(at) else {
            debug!(line = self.lines.line(at), "instrumentation packages hidden by locals");
            self.walk_func_lit(lit);
            return;
        };

        let primary = self.options.resource.name.clone();
        let derived = self.options.detached.derived_name.clone();
        let trial = self.trial(|this| {
            this.scopes.push();
            this.scopes
                .bind_derived(&primary, &derived, lit.body.lbrace.end, source.kind);
            this.declare_params(&lit.ty);
            this.walk_stmts(&lit.body.stmts);
            this.scopes.pop();
        });
        if trial.derived_uses == 0 {
            self.commit(trial);
            return;
        }

        let lines = self.instrumentation(&source, &packages);
        let body = &lit.body;
        let nl = line_ending(self.source, body.lbrace.start);
        let indent = self.body_indent(body);
        let mut text: String = lines.iter().map(|line| format!("{nl}{indent}{line}")).collect();
        let first_line = self.lines.line(body.lbrace.start);
        match body.stmts.first() {
            Some(first) if self.lines.line(first.span().start) == first_line => {
                text.push_str(nl);
                text.push_str(&indent);
                match self.blank_between(body.lbrace.end, first.span().start) {
                    Some(gap) => self.edits.replace(&gap, text),
                    None => self.edits.insert_after(&body.lbrace, text),
                }
            }
            _ => self.edits.insert_after(&body.lbrace, text),
        }
        if let Some(last) = body.stmts.last() {
            if self.lines.line(last.span().end) == self.lines.line(body.rbrace.start) {
                let close = format!("{nl}{}", self.lines.indentation(self.source, body.lbrace.start));
                match self.blank_between(last.span().end, body.rbrace.start) {
                    Some(gap) => self.edits.replace(&gap, close),
                    None => self.edits.insert_before(&body.rbrace, close),
                }
            }
        }
        debug!(line = self.lines.line(at), uses = trial.derived_uses, "instrumenting inline launch");
        self.notice(at, NoticeKind::Instrumented { derived });
        self.commit(trial);
    }

    /// Body of a launch instrumented by an earlier run; the derived binding
    /// takes over after the marker.
    fn walk_instrumented(&mut self, lit: &FuncLit, marker: &Stmt) {
        let primary = self.options.resource.name.clone();
        let derived = self.options.detached.derived_name.clone();
        let source = marker_source_kind(marker, &primary);
        self.scopes.push();
        self.declare_params(&lit.ty);
        self.walk_stmt(marker);
        if !self.scopes.declared_here(&primary) {
            self.scopes
                .bind_derived(&primary, &derived, marker.span().end, source);
        }
        self.walk_stmts(&lit.body.stmts[1..]);
        self.scopes.pop();
    }

    fn launch_named(&mut self, stmt: &GoStmt) {
        let at = stmt.span.start;
        let call = &stmt.call;
        let Some(source) = self.derivation(at) else {
            self.walk_args(call);
            return;
        };
        let Some(packages) = self.instrumentation_packages(at) else {
            self.walk_args(call);
            return;
        };

        let primary = self.options.resource.name.clone();
        let derived = self.options.detached.derived_name.clone();
        let trial = self.trial(|this| {
            this.scopes.push();
            this.scopes.bind_derived(&primary, &derived, at, source.kind);
            this.walk_args(call);
            this.scopes.pop();
        });
        if trial.derived_uses == 0 {
            self.commit(trial);
            return;
        }

        let forwarded = match trial.edits.render(self.source, call.span) {
            Ok(text) => text,
            Err(conflict) => {
                self.conflict.get_or_insert(conflict);
                return;
            }
        };
        let lines = self.instrumentation(&source, &packages);
        let indent = self.lines.indentation(self.source, at).to_string();
        let nl = line_ending(self.source, at);
        let mut text = format!("func() {{{nl}");
        for line in lines.iter().chain(std::iter::once(&forwarded)) {
            text.push_str(&indent);
            text.push('\t');
            text.push_str(line);
            text.push_str(nl);
        }
        text.push_str(&indent);
        text.push_str("}()");

        let callee = call.fun.span().slice(self.source).to_string();
        debug!(line = self.lines.line(at), %callee, "wrapping named launch");
        self.edits.replace(call, text);
        self.notices.extend(trial.notices);
        self.notice(at, NoticeKind::Wrapped { callee });
    }

    fn walk_args(&mut self, call: &CallExpr) {
        for arg in &call.args {
            self.walk_expr(arg);
        }
    }

    /// The span from `start` to `end` when it holds only spaces and tabs.
    fn blank_between(&self, start: usize, end: usize) -> Option<Span> {
        let gap = self.source.get(start..end)?;
        gap.chars()
            .all(|ch| ch == ' ' || ch == '\t')
            .then(|| Span::new(start, end))
    }

    /// Indentation for statements inserted at the top of `body`.
    fn body_indent(&self, body: &Block) -> String {
        let open = body.lbrace.start;
        match body.stmts.first() {
            Some(first) if self.lines.line(first.span().start) != self.lines.line(open) => self
                .lines
                .indentation(self.source, first.span().start)
                .to_string(),
            _ => format!("{}\t", self.lines.indentation(self.source, open)),
        }
    }
}

/// Kind of the binding a marker was derived from: `*ctx`, `ctx` or an accessor.
fn marker_source_kind(marker: &Stmt, primary: &str) -> BindingKind {
    let Stmt::Assign(assign) = marker else {
        return BindingKind::Value;
    };
    let Some(Expr::Call(call)) = assign.rhs.first() else {
        return BindingKind::Value;
    };
    match call.args.first().map(Expr::unparen) {
        Some(Expr::Star(star)) if star.x.is_ident(primary) => BindingKind::Pointer,
        Some(Expr::Ident(_)) => BindingKind::Value,
        _ => BindingKind::Accessor,
    }
}
