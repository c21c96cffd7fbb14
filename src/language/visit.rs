//! Read-only traversal over the syntax tree.
//!
//! Implementors override the hooks they care about and call the matching
//! `walk_*` function to keep descending.

use crate::language::ast::*;

pub trait Visitor<'ast>: Sized {
    fn visit_func_decl(&mut self, func: &'ast FuncDecl) {
        walk_func_decl(self, func);
    }

    fn visit_block(&mut self, block: &'ast Block) {
        walk_block(self, block);
    }

    fn visit_stmt(&mut self, stmt: &'ast Stmt) {
        walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &'ast Expr) {
        walk_expr(self, expr);
    }
}

pub fn walk_file<'ast, V: Visitor<'ast>>(visitor: &mut V, file: &'ast SourceFile) {
    for decl in &file.decls {
        match decl {
            Decl::Func(func) => visitor.visit_func_decl(func),
            Decl::Gen(decl) => walk_gen_decl(visitor, decl),
        }
    }
}

pub fn walk_func_decl<'ast, V: Visitor<'ast>>(visitor: &mut V, func: &'ast FuncDecl) {
    if let Some(recv) = &func.recv {
        walk_fields(visitor, recv);
    }
    walk_func_type(visitor, &func.ty);
    if let Some(body) = &func.body {
        visitor.visit_block(body);
    }
}

pub fn walk_func_type<'ast, V: Visitor<'ast>>(visitor: &mut V, ty: &'ast FuncType) {
    walk_fields(visitor, &ty.params);
    if let Some(results) = &ty.results {
        walk_fields(visitor, results);
    }
}

pub fn walk_fields<'ast, V: Visitor<'ast>>(visitor: &mut V, fields: &'ast FieldList) {
    for field in &fields.fields {
        visitor.visit_expr(&field.ty);
    }
}

pub fn walk_gen_decl<'ast, V: Visitor<'ast>>(visitor: &mut V, decl: &'ast GenDecl) {
    for spec in &decl.specs {
        match spec {
            Spec::Value(spec) => {
                if let Some(ty) = &spec.ty {
                    visitor.visit_expr(ty);
                }
                for value in &spec.values {
                    visitor.visit_expr(value);
                }
            }
            Spec::Type(spec) => visitor.visit_expr(&spec.ty),
        }
    }
}

pub fn walk_block<'ast, V: Visitor<'ast>>(visitor: &mut V, block: &'ast Block) {
    for stmt in &block.stmts {
        visitor.visit_stmt(stmt);
    }
}

fn walk_stmts<'ast, V: Visitor<'ast>>(visitor: &mut V, stmts: &'ast [Stmt]) {
    for stmt in stmts {
        visitor.visit_stmt(stmt);
    }
}

fn walk_opt_stmt<'ast, V: Visitor<'ast>>(visitor: &mut V, stmt: &'ast Option<Stmt>) {
    if let Some(stmt) = stmt {
        visitor.visit_stmt(stmt);
    }
}

fn walk_opt_expr<'ast, V: Visitor<'ast>>(visitor: &mut V, expr: &'ast Option<Expr>) {
    if let Some(expr) = expr {
        visitor.visit_expr(expr);
    }
}

pub fn walk_call<'ast, V: Visitor<'ast>>(visitor: &mut V, call: &'ast CallExpr) {
    visitor.visit_expr(&call.fun);
    for arg in &call.args {
        visitor.visit_expr(arg);
    }
}

pub fn walk_stmt<'ast, V: Visitor<'ast>>(visitor: &mut V, stmt: &'ast Stmt) {
    match stmt {
        Stmt::Decl(decl) => walk_gen_decl(visitor, decl),
        Stmt::Empty(_) | Stmt::Branch(_) => {}
        Stmt::Labeled(stmt) => visitor.visit_stmt(&stmt.stmt),
        Stmt::Expr(stmt) => visitor.visit_expr(&stmt.expr),
        Stmt::Send(stmt) => {
            visitor.visit_expr(&stmt.chan);
            visitor.visit_expr(&stmt.value);
        }
        Stmt::IncDec(stmt) => visitor.visit_expr(&stmt.x),
        Stmt::Assign(stmt) => {
            for expr in stmt.lhs.iter().chain(&stmt.rhs) {
                visitor.visit_expr(expr);
            }
        }
        Stmt::Go(stmt) => walk_call(visitor, &stmt.call),
        Stmt::Defer(stmt) => walk_call(visitor, &stmt.call),
        Stmt::Return(stmt) => {
            for expr in &stmt.results {
                visitor.visit_expr(expr);
            }
        }
        Stmt::Block(block) => visitor.visit_block(block),
        Stmt::If(stmt) => {
            walk_opt_stmt(visitor, &stmt.init);
            visitor.visit_expr(&stmt.cond);
            visitor.visit_block(&stmt.then);
            walk_opt_stmt(visitor, &stmt.els);
        }
        Stmt::Switch(stmt) => {
            walk_opt_stmt(visitor, &stmt.init);
            walk_opt_expr(visitor, &stmt.tag);
            for clause in &stmt.clauses {
                for expr in &clause.exprs {
                    visitor.visit_expr(expr);
                }
                walk_stmts(visitor, &clause.body);
            }
        }
        Stmt::TypeSwitch(stmt) => {
            walk_opt_stmt(visitor, &stmt.init);
            visitor.visit_expr(&stmt.subject);
            for clause in &stmt.clauses {
                for expr in &clause.exprs {
                    visitor.visit_expr(expr);
                }
                walk_stmts(visitor, &clause.body);
            }
        }
        Stmt::Select(stmt) => {
            for clause in &stmt.clauses {
                walk_opt_stmt(visitor, &clause.comm);
                walk_stmts(visitor, &clause.body);
            }
        }
        Stmt::For(stmt) => {
            walk_opt_stmt(visitor, &stmt.init);
            walk_opt_expr(visitor, &stmt.cond);
            walk_opt_stmt(visitor, &stmt.post);
            visitor.visit_block(&stmt.body);
        }
        Stmt::Range(stmt) => {
            walk_opt_expr(visitor, &stmt.key);
            walk_opt_expr(visitor, &stmt.value);
            visitor.visit_expr(&stmt.expr);
            visitor.visit_block(&stmt.body);
        }
    }
}

pub fn walk_expr<'ast, V: Visitor<'ast>>(visitor: &mut V, expr: &'ast Expr) {
    match expr {
        Expr::Ident(_) | Expr::BasicLit(_) => {}
        Expr::CompositeLit(lit) => {
            walk_opt_expr(visitor, &lit.ty);
            for elt in &lit.elts {
                visitor.visit_expr(elt);
            }
        }
        Expr::FuncLit(lit) => {
            walk_func_type(visitor, &lit.ty);
            visitor.visit_block(&lit.body);
        }
        Expr::Paren(paren) => visitor.visit_expr(&paren.x),
        Expr::Selector(selector) => visitor.visit_expr(&selector.x),
        Expr::Index(index) => {
            visitor.visit_expr(&index.x);
            for idx in &index.indices {
                visitor.visit_expr(idx);
            }
        }
        Expr::Slice(slice) => {
            visitor.visit_expr(&slice.x);
            walk_opt_expr(visitor, &slice.low);
            walk_opt_expr(visitor, &slice.high);
            walk_opt_expr(visitor, &slice.max);
        }
        Expr::TypeAssert(assert) => {
            visitor.visit_expr(&assert.x);
            walk_opt_expr(visitor, &assert.ty);
        }
        Expr::Call(call) => walk_call(visitor, call),
        Expr::Star(star) => visitor.visit_expr(&star.x),
        Expr::Unary(unary) => visitor.visit_expr(&unary.x),
        Expr::Binary(binary) => {
            visitor.visit_expr(&binary.x);
            visitor.visit_expr(&binary.y);
        }
        Expr::KeyValue(kv) => {
            visitor.visit_expr(&kv.key);
            visitor.visit_expr(&kv.value);
        }
        Expr::ArrayType(ty) => {
            walk_opt_expr(visitor, &ty.len);
            visitor.visit_expr(&ty.elem);
        }
        Expr::MapType(ty) => {
            visitor.visit_expr(&ty.key);
            visitor.visit_expr(&ty.value);
        }
        Expr::ChanType(ty) => visitor.visit_expr(&ty.value),
        Expr::FuncType(ty) => walk_func_type(visitor, ty),
        Expr::StructType(ty) => walk_fields(visitor, &ty.fields),
        Expr::InterfaceType(ty) => walk_fields(visitor, &ty.elems),
        Expr::Ellipsis(ellipsis) => walk_opt_expr(visitor, &ellipsis.elt),
    }
}
