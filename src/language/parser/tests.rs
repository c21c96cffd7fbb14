use super::*;

fn parse(source: &str) -> SourceFile {
    parse_file(source).expect("parse")
}

fn body(file: &SourceFile, name: &str) -> Vec<Stmt> {
    file.functions()
        .find(|func| func.name.name == name)
        .and_then(|func| func.body.clone())
        .expect("function body")
        .stmts
}

#[test]
fn parses_package_and_grouped_imports() {
    let file = parse("package main\n\nimport (\n\t\"context\"\n\tlog \"github.com/sirupsen/logrus\"\n)\n");
    assert_eq!(file.package.name, "main");
    let specs: Vec<_> = file.import_specs().collect();
    assert_eq!(specs.len(), 2);
    assert_eq!(specs[0].path, "context");
    assert_eq!(
        specs[1].name.as_ref().map(|n| n.name.as_str()),
        Some("log")
    );
    assert!(file.imports[0].group.is_some());
}

#[test]
fn groups_parameter_names_with_shared_type() {
    let file = parse("package p\nfunc f(a, b int, ctx context.Context, rest ...string) {}\n");
    let func = file.functions().next().expect("func");
    let fields = &func.ty.params.fields;
    assert_eq!(fields.len(), 3);
    assert_eq!(fields[0].names.len(), 2);
    assert_eq!(fields[1].names[0].name, "ctx");
    assert!(matches!(fields[1].ty, Expr::Selector(_)));
    assert!(matches!(fields[2].ty, Expr::Ellipsis(_)));
}

#[test]
fn unnamed_parameters_are_types() {
    let file = parse("package p\nfunc f(int, string) (List[int], error) { return nil, nil }\n");
    let func = file.functions().next().expect("func");
    assert_eq!(func.ty.params.fields.len(), 2);
    assert!(func.ty.params.fields.iter().all(|f| f.names.is_empty()));
    let results = func.ty.results.as_ref().expect("results");
    assert!(matches!(results.fields[0].ty, Expr::Index(_)));
}

#[test]
fn method_receiver_type_name() {
    let file = parse("package p\nfunc (s *Server[K]) Handle(ctx *context.Context) {}\n");
    let func = file.functions().next().expect("func");
    assert_eq!(func.receiver_type_name(), Some("Server"));
    assert!(matches!(func.ty.params.fields[0].ty, Expr::Star(_)));
}

#[test]
fn composite_literal_is_not_taken_in_if_header() {
    let file = parse(
        "package p\nfunc f() {\n\tif x == y {\n\t\tz()\n\t}\n\tv := T{A: ctx}\n\t_ = v\n}\n",
    );
    let stmts = body(&file, "f");
    assert_eq!(stmts.len(), 3);
    let Stmt::If(stmt) = &stmts[0] else {
        panic!("expected if, got {:?}", stmts[0]);
    };
    assert!(matches!(stmt.cond, Expr::Binary(_)));
    let Stmt::Assign(assign) = &stmts[1] else {
        panic!("expected assignment");
    };
    assert!(matches!(assign.rhs[0], Expr::CompositeLit(_)));
}

#[test]
fn slice_literal_allowed_in_range_header() {
    let file = parse("package p\nfunc f() {\n\tfor _, v := range []T{{1}, {2}} {\n\t\t_ = v\n\t}\n}\n");
    let stmts = body(&file, "f");
    let Stmt::Range(range) = &stmts[0] else {
        panic!("expected range");
    };
    assert!(range.define);
    assert!(matches!(range.expr, Expr::CompositeLit(_)));
}

#[test]
fn go_statement_with_function_literal() {
    let file = parse("package p\nfunc f() {\n\tgo func(n int) {\n\t\twork(n)\n\t}(1)\n}\n");
    let stmts = body(&file, "f");
    let Stmt::Go(stmt) = &stmts[0] else {
        panic!("expected go");
    };
    let lit = stmt.call.func_lit().expect("func lit");
    assert_eq!(lit.body.stmts.len(), 1);
    assert_eq!(stmt.call.args.len(), 1);
}

#[test]
fn go_requires_a_call() {
    let err = parse_file("package p\nfunc f() {\n\tgo x\n}\n").unwrap_err();
    assert!(err.errors[0].message.contains("function call"));
}

#[test]
fn type_switch_with_binding() {
    let file = parse(
        "package p\nfunc f(v any) {\n\tswitch x := v.(type) {\n\tcase int, *T:\n\t\t_ = x\n\tdefault:\n\t}\n}\n",
    );
    let stmts = body(&file, "f");
    let Stmt::TypeSwitch(stmt) = &stmts[0] else {
        panic!("expected type switch");
    };
    assert_eq!(stmt.binding.as_ref().map(|b| b.name.as_str()), Some("x"));
    assert_eq!(stmt.clauses.len(), 2);
    assert!(stmt.clauses[1].is_default);
}

#[test]
fn for_clause_and_select() {
    let source = "package p\nfunc f(ch chan int) {\n\tfor i := 0; i < 3; i++ {\n\t}\n\tselect {\n\tcase v := <-ch:\n\t\t_ = v\n\tcase ch <- 1:\n\tdefault:\n\t}\n}\n";
    let stmts = body(&parse(source), "f");
    let Stmt::For(stmt) = &stmts[0] else {
        panic!("expected for");
    };
    assert!(stmt.init.is_some() && stmt.cond.is_some() && stmt.post.is_some());
    let Stmt::Select(select) = &stmts[1] else {
        panic!("expected select");
    };
    assert_eq!(select.clauses.len(), 3);
    assert!(matches!(select.clauses[1].comm, Some(Stmt::Send(_))));
}

#[test]
fn labels_and_branches() {
    let source = "package p\nfunc f() {\nouter:\n\tfor {\n\t\tbreak outer\n\t}\n}\n";
    let stmts = body(&parse(source), "f");
    let Stmt::Labeled(stmt) = &stmts[0] else {
        panic!("expected label");
    };
    assert_eq!(stmt.label.name, "outer");
    assert!(matches!(stmt.stmt, Stmt::For(_)));
}

#[test]
fn generic_declarations() {
    let source = "package p\ntype Set[T comparable] map[T]struct{}\ntype Buf [4]byte\nfunc Map[S ~[]E, E any](s S) S { return s }\n";
    let file = parse(source);
    let Decl::Gen(decl) = &file.decls[0] else {
        panic!("expected type decl");
    };
    let Spec::Type(spec) = &decl.specs[0] else {
        panic!("expected type spec");
    };
    assert!(spec.type_params.is_some());
    let Decl::Gen(decl) = &file.decls[1] else {
        panic!("expected type decl");
    };
    let Spec::Type(spec) = &decl.specs[0] else {
        panic!("expected type spec");
    };
    assert!(spec.type_params.is_none());
    assert!(matches!(spec.ty, Expr::ArrayType(_)));
    let func = file.functions().next().expect("func");
    assert_eq!(func.type_params.as_ref().map(|p| p.fields.len()), Some(2));
}

#[test]
fn struct_and_interface_types() {
    let source = "package p\ntype S struct {\n\tio.Reader\n\t*Base\n\tName, Alias string `json:\"name\"`\n}\ntype I interface {\n\tDo(ctx context.Context) error\n\t~int | ~string\n}\n";
    let file = parse(source);
    assert_eq!(file.decls.len(), 2);
}

#[test]
fn spans_cover_source_text() {
    let source = "package p\nfunc f() {\n\tcall(context.TODO(), x)\n}\n";
    let stmts = body(&parse(source), "f");
    let Stmt::Expr(stmt) = &stmts[0] else {
        panic!("expected expression");
    };
    assert_eq!(stmt.expr.span().slice(source), "call(context.TODO(), x)");
    let Expr::Call(call) = &stmt.expr else {
        panic!("expected call");
    };
    assert_eq!(call.args[0].span().slice(source), "context.TODO()");
}

#[test]
fn reports_missing_package_clause() {
    let err = parse_file("func main() {}\n").unwrap_err();
    assert_eq!(err.errors.len(), 1);
    assert!(err.errors[0].help.is_some());
}

#[test]
fn recovers_at_next_declaration() {
    let err = parse_file("package p\nfunc f() { x := }\nfunc g() { y := }\n").unwrap_err();
    assert_eq!(err.errors.len(), 2);
}

#[test]
fn lexer_errors_become_syntax_errors() {
    let err = parse_file("package p\nvar s = \"open\n").unwrap_err();
    assert!(!err.errors.is_empty());
}
