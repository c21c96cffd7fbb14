use crate::language::{
    ast::*,
    errors::{SyntaxError, SyntaxErrors},
    lexer::lex,
    span::{Span, Spanned},
    token::{BinaryOp, Token, TokenKind},
};

pub fn parse_file(source: &str) -> Result<SourceFile, SyntaxErrors> {
    let tokens = match lex(source) {
        Ok(tokens) => tokens,
        Err(errors) => {
            let errs = errors
                .into_iter()
                .map(|err| SyntaxError::new(err.message, err.span))
                .collect();
            return Err(SyntaxErrors::new(errs));
        }
    };
    Parser::new(tokens).parse()
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    errors: Vec<SyntaxError>,
    last_end: usize,
    /// Below zero inside control clauses, where `T {` opens a block.
    expr_lev: i32,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum SimpleMode {
    Basic,
    LabelOk,
    RangeOk,
}

struct RangeHeader {
    key: Option<Expr>,
    value: Option<Expr>,
    define: bool,
    expr: Expr,
}

enum Simple {
    Stmt(Stmt),
    Range(RangeHeader),
}

enum ParamEntry {
    Named(Ident, Expr),
    Bare(Expr),
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            errors: Vec::new(),
            last_end: 0,
            expr_lev: 0,
        }
    }

    fn parse(mut self) -> Result<SourceFile, SyntaxErrors> {
        self.skip_semis();
        let start = self.current_span().start;
        let package = match self.parse_package() {
            Ok(package) => package,
            Err(err) => return Err(SyntaxErrors::new(vec![err])),
        };

        let mut imports = Vec::new();
        loop {
            self.skip_semis();
            if !self.check(&TokenKind::Import) {
                break;
            }
            match self.parse_import_decl() {
                Ok(import) => imports.push(import),
                Err(err) => {
                    self.report(err);
                    self.synchronize_decl();
                }
            }
        }

        let mut decls = Vec::new();
        while !self.is_eof() {
            if self.is_semi() {
                self.advance();
                continue;
            }
            match self.parse_decl() {
                Ok(decl) => decls.push(decl),
                Err(err) => {
                    self.report(err);
                    self.synchronize_decl();
                }
            }
        }

        if self.errors.is_empty() {
            Ok(SourceFile {
                package,
                imports,
                decls,
                span: Span::new(start, self.last_end),
            })
        } else {
            Err(SyntaxErrors::new(self.errors))
        }
    }

    fn parse_package(&mut self) -> Result<Ident, SyntaxError> {
        self.expect(TokenKind::Package).map_err(|err| {
            err.with_help("a Go source file must start with a `package` clause")
        })?;
        let name = self.expect_identifier("Expected package name")?;
        self.expect_semi()?;
        Ok(name)
    }

    fn parse_import_decl(&mut self) -> Result<ImportDecl, SyntaxError> {
        let start = self.expect(TokenKind::Import)?.start;
        let mut specs = Vec::new();
        let mut group = None;
        if self.check(&TokenKind::LParen) {
            let lparen = self.advance();
            while !self.check(&TokenKind::RParen) && !self.is_eof() {
                if self.is_semi() {
                    self.advance();
                    continue;
                }
                specs.push(self.parse_import_spec()?);
                if !self.check(&TokenKind::RParen) {
                    self.expect_semi()?;
                }
            }
            let rparen = self.expect(TokenKind::RParen)?;
            group = Some(Group { lparen, rparen });
        } else {
            specs.push(self.parse_import_spec()?);
        }
        self.expect_semi()?;
        Ok(ImportDecl {
            specs,
            group,
            span: Span::new(start, self.last_end),
        })
    }

    fn parse_import_spec(&mut self) -> Result<ImportSpec, SyntaxError> {
        let start = self.current_span().start;
        let name = match self.peek().clone() {
            TokenKind::Identifier(name) => {
                let span = self.advance();
                Some(Ident { name, span })
            }
            TokenKind::Dot => {
                let span = self.advance();
                Some(Ident {
                    name: ".".into(),
                    span,
                })
            }
            _ => None,
        };
        match self.peek().clone() {
            TokenKind::String(raw) => {
                let path_span = self.advance();
                Ok(ImportSpec {
                    name,
                    path: unquote(&raw),
                    path_span,
                    span: Span::new(start, path_span.end),
                })
            }
            _ => Err(self.error_here("Expected import path string")),
        }
    }

    fn parse_decl(&mut self) -> Result<Decl, SyntaxError> {
        let decl = match self.peek() {
            TokenKind::Func => Decl::Func(self.parse_func_decl()?),
            TokenKind::Var | TokenKind::Const | TokenKind::Type => {
                Decl::Gen(self.parse_gen_decl()?)
            }
            TokenKind::Import => {
                return Err(self
                    .error_here("Unexpected import")
                    .with_help("imports must appear before other declarations"));
            }
            _ => return Err(self.error_here("Expected declaration")),
        };
        self.expect_semi()?;
        Ok(decl)
    }

    fn parse_func_decl(&mut self) -> Result<FuncDecl, SyntaxError> {
        let start = self.expect(TokenKind::Func)?.start;
        let recv = if self.check(&TokenKind::LParen) {
            Some(self.parse_params()?)
        } else {
            None
        };
        let name = self.expect_identifier("Expected function name")?;
        let type_params = if self.check(&TokenKind::LBracket) {
            Some(self.parse_type_params()?)
        } else {
            None
        };
        let ty = self.parse_signature(start)?;
        let body = if self.check(&TokenKind::LBrace) {
            Some(self.parse_block()?)
        } else {
            None
        };
        Ok(FuncDecl {
            recv,
            name,
            type_params,
            ty,
            body,
            span: Span::new(start, self.last_end),
        })
    }

    fn parse_signature(&mut self, start: usize) -> Result<FuncType, SyntaxError> {
        let params = self.parse_params()?;
        let results = if self.check(&TokenKind::LParen) {
            Some(self.parse_params()?)
        } else if self.can_start_type() {
            let ty = self.parse_type()?;
            let span = ty.span();
            Some(FieldList {
                fields: vec![Field {
                    names: Vec::new(),
                    ty,
                    tag: None,
                    span,
                }],
                span,
            })
        } else {
            None
        };
        Ok(FuncType {
            params,
            results,
            span: Span::new(start, self.last_end),
        })
    }

    fn parse_params(&mut self) -> Result<FieldList, SyntaxError> {
        let lparen = self.expect(TokenKind::LParen)?;
        let mut entries = Vec::new();
        while !self.check(&TokenKind::RParen) && !self.is_eof() {
            entries.push(self.parse_param_entry()?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        let rparen = self.expect(TokenKind::RParen)?;
        let span = lparen.union(rparen);

        let named = entries
            .iter()
            .any(|entry| matches!(entry, ParamEntry::Named(..)));
        let mut fields = Vec::new();
        if !named {
            for entry in entries {
                if let ParamEntry::Bare(ty) = entry {
                    let span = ty.span();
                    fields.push(Field {
                        names: Vec::new(),
                        ty,
                        tag: None,
                        span,
                    });
                }
            }
            return Ok(FieldList { fields, span });
        }

        let mut pending: Vec<Ident> = Vec::new();
        for entry in entries {
            match entry {
                ParamEntry::Named(name, ty) => {
                    let start = pending.first().map(|n| n.span.start).unwrap_or(name.span.start);
                    let field_span = Span::new(start, ty.span().end);
                    pending.push(name);
                    fields.push(Field {
                        names: std::mem::take(&mut pending),
                        ty,
                        tag: None,
                        span: field_span,
                    });
                }
                ParamEntry::Bare(Expr::Ident(name)) => pending.push(name),
                ParamEntry::Bare(other) => {
                    return Err(SyntaxError::new(
                        "Mixed named and unnamed parameters",
                        other.span(),
                    ));
                }
            }
        }
        if let Some(name) = pending.first() {
            return Err(SyntaxError::new("Missing parameter type", name.span));
        }
        Ok(FieldList { fields, span })
    }

    fn parse_param_entry(&mut self) -> Result<ParamEntry, SyntaxError> {
        if let TokenKind::Identifier(name) = self.peek().clone() {
            let named_follows = match self.peek_at(1) {
                TokenKind::Dot | TokenKind::Comma | TokenKind::RParen => false,
                TokenKind::LBracket => !self.bracket_closes_entry(1),
                _ => true,
            };
            if named_follows {
                let span = self.advance();
                let ty = self.parse_param_type()?;
                return Ok(ParamEntry::Named(Ident { name, span }, ty));
            }
        }
        Ok(ParamEntry::Bare(self.parse_param_type()?))
    }

    /// Whether the bracket at `offset` closes right before `,` or `)`, as in `List[T]`.
    fn bracket_closes_entry(&self, offset: usize) -> bool {
        let mut depth = 0usize;
        let mut idx = self.pos + offset;
        while let Some(token) = self.tokens.get(idx) {
            match token.kind {
                TokenKind::LBracket | TokenKind::LParen | TokenKind::LBrace => depth += 1,
                TokenKind::RBracket | TokenKind::RParen | TokenKind::RBrace => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return matches!(
                            self.tokens.get(idx + 1).map(|t| &t.kind),
                            Some(TokenKind::Comma) | Some(TokenKind::RParen)
                        );
                    }
                }
                TokenKind::Eof => return false,
                _ => {}
            }
            idx += 1;
        }
        false
    }

    fn parse_param_type(&mut self) -> Result<Expr, SyntaxError> {
        if self.check(&TokenKind::Ellipsis) {
            let start = self.advance().start;
            let elt = self.parse_type()?;
            let span = Span::new(start, elt.span().end);
            return Ok(Expr::Ellipsis(Box::new(Ellipsis {
                elt: Some(elt),
                span,
            })));
        }
        self.parse_type()
    }

    fn parse_type_params(&mut self) -> Result<FieldList, SyntaxError> {
        let lbrack = self.expect(TokenKind::LBracket)?;
        let mut fields = Vec::new();
        let mut pending = Vec::new();
        while !self.check(&TokenKind::RBracket) && !self.is_eof() {
            let name = self.expect_identifier("Expected type parameter name")?;
            if self.eat(TokenKind::Comma) {
                pending.push(name);
                continue;
            }
            let constraint = self.parse_constraint()?;
            pending.push(name);
            let start = pending[0].span.start;
            let span = Span::new(start, constraint.span().end);
            fields.push(Field {
                names: std::mem::take(&mut pending),
                ty: constraint,
                tag: None,
                span,
            });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        if let Some(name) = pending.first() {
            return Err(SyntaxError::new("Missing type constraint", name.span));
        }
        let rbrack = self.expect(TokenKind::RBracket)?;
        Ok(FieldList {
            fields,
            span: lbrack.union(rbrack),
        })
    }

    /// `~int | string`, or any plain type.
    fn parse_constraint(&mut self) -> Result<Expr, SyntaxError> {
        let mut x = self.parse_constraint_term()?;
        while self.check(&TokenKind::Binary(BinaryOp::Or)) {
            self.advance();
            let y = self.parse_constraint_term()?;
            let span = x.span().union(y.span());
            x = Expr::Binary(Box::new(BinaryExpr {
                op: BinaryOp::Or,
                x,
                y,
                span,
            }));
        }
        Ok(x)
    }

    fn parse_constraint_term(&mut self) -> Result<Expr, SyntaxError> {
        if self.check(&TokenKind::Tilde) {
            let start = self.advance().start;
            let x = self.parse_type()?;
            let span = Span::new(start, x.span().end);
            return Ok(Expr::Unary(Box::new(UnaryExpr {
                op: UnaryOp::Tilde,
                x,
                span,
            })));
        }
        self.parse_type()
    }

    fn parse_gen_decl(&mut self) -> Result<GenDecl, SyntaxError> {
        let kind = match self.peek() {
            TokenKind::Var => GenKind::Var,
            TokenKind::Const => GenKind::Const,
            TokenKind::Type => GenKind::Type,
            _ => return Err(self.error_here("Expected declaration")),
        };
        let start = self.advance().start;
        let mut specs = Vec::new();
        let mut group = None;
        if self.check(&TokenKind::LParen) {
            let lparen = self.advance();
            while !self.check(&TokenKind::RParen) && !self.is_eof() {
                if self.is_semi() {
                    self.advance();
                    continue;
                }
                specs.push(self.parse_spec(kind)?);
                if !self.check(&TokenKind::RParen) {
                    self.expect_semi()?;
                }
            }
            let rparen = self.expect(TokenKind::RParen)?;
            group = Some(Group { lparen, rparen });
        } else {
            specs.push(self.parse_spec(kind)?);
        }
        Ok(GenDecl {
            kind,
            specs,
            group,
            span: Span::new(start, self.last_end),
        })
    }

    fn parse_spec(&mut self, kind: GenKind) -> Result<Spec, SyntaxError> {
        match kind {
            GenKind::Type => self.parse_type_spec().map(Spec::Type),
            GenKind::Var | GenKind::Const => self.parse_value_spec().map(Spec::Value),
        }
    }

    fn parse_value_spec(&mut self) -> Result<ValueSpec, SyntaxError> {
        let start = self.current_span().start;
        let mut names = vec![self.expect_identifier("Expected name")?];
        while self.eat(TokenKind::Comma) {
            names.push(self.expect_identifier("Expected name")?);
        }
        let ty = if !self.check(&TokenKind::Assign)
            && !self.is_semi()
            && !self.check(&TokenKind::RParen)
        {
            Some(self.parse_type()?)
        } else {
            None
        };
        let values = if self.eat(TokenKind::Assign) {
            self.parse_expr_list()?
        } else {
            Vec::new()
        };
        Ok(ValueSpec {
            names,
            ty,
            values,
            span: Span::new(start, self.last_end),
        })
    }

    fn parse_type_spec(&mut self) -> Result<TypeSpec, SyntaxError> {
        let name = self.expect_identifier("Expected type name")?;
        let type_params = if self.check(&TokenKind::LBracket) && self.looks_like_type_params() {
            Some(self.parse_type_params()?)
        } else {
            None
        };
        let alias = self.eat(TokenKind::Assign);
        let ty = self.parse_type()?;
        Ok(TypeSpec {
            span: Span::new(name.span.start, self.last_end),
            name,
            type_params,
            alias,
            ty,
        })
    }

    /// `type A[T any] ...` versus the array type in `type A [N]int`.
    fn looks_like_type_params(&self) -> bool {
        matches!(self.peek_at(1), TokenKind::Identifier(_))
            && matches!(
                self.peek_at(2),
                TokenKind::Identifier(_)
                    | TokenKind::Comma
                    | TokenKind::Tilde
                    | TokenKind::Interface
                    | TokenKind::LBracket
                    | TokenKind::Map
                    | TokenKind::Chan
                    | TokenKind::Func
                    | TokenKind::Struct
                    | TokenKind::LParen
            )
    }

    // ---- types ----

    fn can_start_type(&self) -> bool {
        matches!(
            self.peek(),
            TokenKind::Identifier(_)
                | TokenKind::LBracket
                | TokenKind::Struct
                | TokenKind::Map
                | TokenKind::Chan
                | TokenKind::Func
                | TokenKind::Interface
                | TokenKind::Binary(BinaryOp::Mul)
                | TokenKind::Arrow
                | TokenKind::LParen
        )
    }

    fn parse_type(&mut self) -> Result<Expr, SyntaxError> {
        let start = self.current_span().start;
        match self.peek().clone() {
            TokenKind::Identifier(_) => self.parse_type_name(),
            TokenKind::Binary(BinaryOp::Mul) => {
                self.advance();
                let x = self.parse_type()?;
                let span = Span::new(start, x.span().end);
                Ok(Expr::Star(Box::new(StarExpr { x, span })))
            }
            TokenKind::LBracket => self.parse_array_type(),
            TokenKind::Map => {
                self.advance();
                self.expect(TokenKind::LBracket)?;
                let key = self.parse_type()?;
                self.expect(TokenKind::RBracket)?;
                let value = self.parse_type()?;
                let span = Span::new(start, value.span().end);
                Ok(Expr::MapType(Box::new(MapType { key, value, span })))
            }
            TokenKind::Chan => {
                self.advance();
                let dir = if self.eat(TokenKind::Arrow) {
                    ChanDir::Send
                } else {
                    ChanDir::Both
                };
                let value = self.parse_type()?;
                let span = Span::new(start, value.span().end);
                Ok(Expr::ChanType(Box::new(ChanType { dir, value, span })))
            }
            TokenKind::Arrow => {
                self.advance();
                self.expect(TokenKind::Chan)?;
                let value = self.parse_type()?;
                let span = Span::new(start, value.span().end);
                Ok(Expr::ChanType(Box::new(ChanType {
                    dir: ChanDir::Recv,
                    value,
                    span,
                })))
            }
            TokenKind::Func => {
                self.advance();
                let ty = self.parse_signature(start)?;
                Ok(Expr::FuncType(Box::new(ty)))
            }
            TokenKind::Struct => self.parse_struct_type(),
            TokenKind::Interface => self.parse_interface_type(),
            TokenKind::LParen => {
                self.advance();
                let x = self.parse_type()?;
                let end = self.expect(TokenKind::RParen)?.end;
                Ok(Expr::Paren(Box::new(ParenExpr {
                    x,
                    span: Span::new(start, end),
                })))
            }
            _ => Err(self.error_here("Expected type")),
        }
    }

    fn parse_type_name(&mut self) -> Result<Expr, SyntaxError> {
        let ident = self.expect_identifier("Expected type name")?;
        let mut ty = Expr::Ident(ident);
        if self.check(&TokenKind::Dot) {
            self.advance();
            let sel = self.expect_identifier("Expected qualified type name")?;
            let span = ty.span().union(sel.span);
            ty = Expr::Selector(Box::new(SelectorExpr { x: ty, sel, span }));
        }
        if self.check(&TokenKind::LBracket) {
            self.advance();
            let mut indices = Vec::new();
            while !self.check(&TokenKind::RBracket) && !self.is_eof() {
                indices.push(self.parse_type()?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
            let end = self.expect(TokenKind::RBracket)?.end;
            let span = Span::new(ty.span().start, end);
            ty = Expr::Index(Box::new(IndexExpr {
                x: ty,
                indices,
                span,
            }));
        }
        Ok(ty)
    }

    fn parse_array_type(&mut self) -> Result<Expr, SyntaxError> {
        let start = self.expect(TokenKind::LBracket)?.start;
        let len = if self.eat(TokenKind::RBracket) {
            None
        } else if self.check(&TokenKind::Ellipsis)
            && matches!(self.peek_at(1), TokenKind::RBracket)
        {
            let span = self.advance();
            self.advance();
            Some(Expr::Ellipsis(Box::new(Ellipsis { elt: None, span })))
        } else {
            self.expr_lev += 1;
            let len = self.parse_expr();
            self.expr_lev -= 1;
            let len = len?;
            self.expect(TokenKind::RBracket)?;
            Some(len)
        };
        let elem = self.parse_type()?;
        let span = Span::new(start, elem.span().end);
        Ok(Expr::ArrayType(Box::new(ArrayType { len, elem, span })))
    }

    fn parse_struct_type(&mut self) -> Result<Expr, SyntaxError> {
        let start = self.expect(TokenKind::Struct)?.start;
        let lbrace = self.expect(TokenKind::LBrace)?;
        let mut fields = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_eof() {
            if self.is_semi() {
                self.advance();
                continue;
            }
            fields.push(self.parse_struct_field()?);
            if !self.check(&TokenKind::RBrace) {
                self.expect_semi()?;
            }
        }
        let rbrace = self.expect(TokenKind::RBrace)?;
        Ok(Expr::StructType(Box::new(StructType {
            fields: FieldList {
                fields,
                span: lbrace.union(rbrace),
            },
            span: Span::new(start, rbrace.end),
        })))
    }

    fn parse_struct_field(&mut self) -> Result<Field, SyntaxError> {
        let start = self.current_span().start;
        let embedded = match self.peek() {
            TokenKind::Binary(BinaryOp::Mul) => true,
            TokenKind::Identifier(_) => matches!(
                self.peek_at(1),
                TokenKind::Dot
                    | TokenKind::Semi { .. }
                    | TokenKind::RBrace
                    | TokenKind::String(_)
            ),
            _ => return Err(self.error_here("Expected field declaration")),
        };
        let mut names = Vec::new();
        if !embedded {
            names.push(self.expect_identifier("Expected field name")?);
            while self.eat(TokenKind::Comma) {
                names.push(self.expect_identifier("Expected field name")?);
            }
        }
        let ty = self.parse_type()?;
        let tag = match self.peek().clone() {
            TokenKind::String(raw) => {
                self.advance();
                Some(raw)
            }
            _ => None,
        };
        Ok(Field {
            names,
            ty,
            tag,
            span: Span::new(start, self.last_end),
        })
    }

    fn parse_interface_type(&mut self) -> Result<Expr, SyntaxError> {
        let start = self.expect(TokenKind::Interface)?.start;
        let lbrace = self.expect(TokenKind::LBrace)?;
        let mut elems = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_eof() {
            if self.is_semi() {
                self.advance();
                continue;
            }
            let elem_start = self.current_span().start;
            let is_method = matches!(self.peek(), TokenKind::Identifier(_))
                && matches!(self.peek_at(1), TokenKind::LParen);
            if is_method {
                let name = self.expect_identifier("Expected method name")?;
                let ty = self.parse_signature(name.span.start)?;
                elems.push(Field {
                    names: vec![name],
                    ty: Expr::FuncType(Box::new(ty)),
                    tag: None,
                    span: Span::new(elem_start, self.last_end),
                });
            } else {
                let ty = self.parse_constraint()?;
                elems.push(Field {
                    names: Vec::new(),
                    ty,
                    tag: None,
                    span: Span::new(elem_start, self.last_end),
                });
            }
            if !self.check(&TokenKind::RBrace) {
                self.expect_semi()?;
            }
        }
        let rbrace = self.expect(TokenKind::RBrace)?;
        Ok(Expr::InterfaceType(Box::new(InterfaceType {
            elems: FieldList {
                fields: elems,
                span: lbrace.union(rbrace),
            },
            span: Span::new(start, rbrace.end),
        })))
    }

    // ---- statements ----

    fn parse_block(&mut self) -> Result<Block, SyntaxError> {
        let lbrace = self.expect(TokenKind::LBrace)?;
        let prev_lev = self.expr_lev;
        self.expr_lev = 0;
        let stmts = self.parse_stmt_list();
        self.expr_lev = prev_lev;
        let stmts = stmts?;
        let rbrace = self.expect(TokenKind::RBrace)?;
        Ok(Block {
            lbrace,
            stmts,
            rbrace,
        })
    }

    fn parse_stmt_list(&mut self) -> Result<Vec<Stmt>, SyntaxError> {
        let mut stmts = Vec::new();
        while !self.at_list_end() {
            if self.is_semi() {
                self.advance();
                continue;
            }
            stmts.push(self.parse_stmt()?);
            if !self.at_list_end() {
                self.expect_semi()?;
            }
        }
        Ok(stmts)
    }

    fn at_list_end(&self) -> bool {
        matches!(
            self.peek(),
            TokenKind::RBrace | TokenKind::Case | TokenKind::Default | TokenKind::Eof
        )
    }

    fn parse_stmt(&mut self) -> Result<Stmt, SyntaxError> {
        let start = self.current_span().start;
        match self.peek() {
            TokenKind::Var | TokenKind::Const | TokenKind::Type => {
                Ok(Stmt::Decl(self.parse_gen_decl()?))
            }
            TokenKind::Go => {
                self.advance();
                let call = self.parse_call_operand("go")?;
                Ok(Stmt::Go(GoStmt {
                    call,
                    span: Span::new(start, self.last_end),
                }))
            }
            TokenKind::Defer => {
                self.advance();
                let call = self.parse_call_operand("defer")?;
                Ok(Stmt::Defer(DeferStmt {
                    call,
                    span: Span::new(start, self.last_end),
                }))
            }
            TokenKind::Return => {
                self.advance();
                let results = if self.is_semi() || self.check(&TokenKind::RBrace) {
                    Vec::new()
                } else {
                    self.parse_expr_list()?
                };
                Ok(Stmt::Return(ReturnStmt {
                    results,
                    span: Span::new(start, self.last_end),
                }))
            }
            TokenKind::Break | TokenKind::Continue | TokenKind::Goto | TokenKind::Fallthrough => {
                let kind = match self.peek() {
                    TokenKind::Break => BranchKind::Break,
                    TokenKind::Continue => BranchKind::Continue,
                    TokenKind::Goto => BranchKind::Goto,
                    _ => BranchKind::Fallthrough,
                };
                self.advance();
                let label = match (kind, self.peek().clone()) {
                    (BranchKind::Fallthrough, _) => None,
                    (_, TokenKind::Identifier(name)) => {
                        let span = self.advance();
                        Some(Ident { name, span })
                    }
                    _ => None,
                };
                Ok(Stmt::Branch(BranchStmt {
                    kind,
                    label,
                    span: Span::new(start, self.last_end),
                }))
            }
            TokenKind::LBrace => Ok(Stmt::Block(self.parse_block()?)),
            TokenKind::If => self.parse_if(),
            TokenKind::Switch => self.parse_switch(),
            TokenKind::Select => self.parse_select(),
            TokenKind::For => self.parse_for(),
            _ => match self.parse_simple_stmt(SimpleMode::LabelOk)? {
                Simple::Stmt(stmt) => Ok(stmt),
                Simple::Range(_) => Err(self.error_here("Unexpected range clause")),
            },
        }
    }

    fn parse_call_operand(&mut self, keyword: &str) -> Result<CallExpr, SyntaxError> {
        let expr = self.parse_expr()?;
        match expr {
            Expr::Call(call) => Ok(*call),
            other => Err(SyntaxError::new(
                format!("Expression in {keyword} must be function call"),
                other.span(),
            )),
        }
    }

    fn parse_simple_stmt(&mut self, mode: SimpleMode) -> Result<Simple, SyntaxError> {
        let start = self.current_span().start;
        if mode == SimpleMode::RangeOk && self.check(&TokenKind::Range) {
            self.advance();
            let expr = self.parse_expr()?;
            return Ok(Simple::Range(RangeHeader {
                key: None,
                value: None,
                define: false,
                expr,
            }));
        }

        let mut lhs = self.parse_expr_list()?;
        match self.peek().clone() {
            TokenKind::Define | TokenKind::Assign | TokenKind::OpAssign(_) => {
                let op = match self.peek() {
                    TokenKind::Define => AssignOp::Define,
                    TokenKind::Assign => AssignOp::Assign,
                    TokenKind::OpAssign(op) => AssignOp::Op(*op),
                    _ => unreachable!(),
                };
                self.advance();
                if mode == SimpleMode::RangeOk
                    && self.check(&TokenKind::Range)
                    && !matches!(op, AssignOp::Op(_))
                {
                    self.advance();
                    let expr = self.parse_expr()?;
                    let mut keys = lhs.into_iter();
                    return Ok(Simple::Range(RangeHeader {
                        key: keys.next(),
                        value: keys.next(),
                        define: op == AssignOp::Define,
                        expr,
                    }));
                }
                let rhs = self.parse_expr_list()?;
                Ok(Simple::Stmt(Stmt::Assign(AssignStmt {
                    lhs,
                    op,
                    rhs,
                    span: Span::new(start, self.last_end),
                })))
            }
            TokenKind::Colon
                if mode == SimpleMode::LabelOk && lhs.len() == 1 && lhs[0].as_ident().is_some() =>
            {
                self.advance();
                let Some(Expr::Ident(label)) = lhs.pop() else {
                    unreachable!()
                };
                let stmt = if self.at_list_end() {
                    Stmt::Empty(Span::empty(self.last_end))
                } else {
                    self.parse_stmt()?
                };
                Ok(Simple::Stmt(Stmt::Labeled(Box::new(LabeledStmt {
                    label,
                    stmt,
                    span: Span::new(start, self.last_end),
                }))))
            }
            TokenKind::Arrow => {
                let chan = self.single(lhs, "Expected single channel in send")?;
                self.advance();
                let value = self.parse_expr()?;
                Ok(Simple::Stmt(Stmt::Send(SendStmt {
                    chan,
                    value,
                    span: Span::new(start, self.last_end),
                })))
            }
            TokenKind::Inc | TokenKind::Dec => {
                let inc = self.check(&TokenKind::Inc);
                let x = self.single(lhs, "Expected single operand")?;
                self.advance();
                Ok(Simple::Stmt(Stmt::IncDec(IncDecStmt {
                    x,
                    inc,
                    span: Span::new(start, self.last_end),
                })))
            }
            _ => {
                let expr = self.single(lhs, "Expected 1 expression")?;
                Ok(Simple::Stmt(Stmt::Expr(ExprStmt { expr })))
            }
        }
    }

    fn single(&self, mut list: Vec<Expr>, message: &str) -> Result<Expr, SyntaxError> {
        if list.len() == 1 {
            Ok(list.remove(0))
        } else {
            Err(self.error_here(message))
        }
    }

    fn parse_if(&mut self) -> Result<Stmt, SyntaxError> {
        let start = self.expect(TokenKind::If)?.start;
        let prev_lev = self.expr_lev;
        self.expr_lev = -1;
        let header = self.parse_if_header();
        self.expr_lev = prev_lev;
        let (init, cond) = header?;
        let then = self.parse_block()?;
        let els = if self.eat(TokenKind::Else) {
            match self.peek() {
                TokenKind::If => Some(self.parse_if()?),
                TokenKind::LBrace => Some(Stmt::Block(self.parse_block()?)),
                _ => return Err(self.error_here("Expected if statement or block after else")),
            }
        } else {
            None
        };
        Ok(Stmt::If(Box::new(IfStmt {
            init,
            cond,
            then,
            els,
            span: Span::new(start, self.last_end),
        })))
    }

    fn parse_if_header(&mut self) -> Result<(Option<Stmt>, Expr), SyntaxError> {
        if self.check(&TokenKind::LBrace) {
            return Err(self.error_here("Missing condition in if statement"));
        }
        let mut init = None;
        if !self.is_semi() {
            init = Some(self.parse_simple_basic()?);
        }
        if self.is_semi() {
            self.advance();
            let cond = self.parse_expr()?;
            return Ok((init, cond));
        }
        match init {
            Some(Stmt::Expr(stmt)) => Ok((None, stmt.expr)),
            _ => Err(self.error_here("Expected condition in if statement")),
        }
    }

    fn parse_simple_basic(&mut self) -> Result<Stmt, SyntaxError> {
        match self.parse_simple_stmt(SimpleMode::Basic)? {
            Simple::Stmt(stmt) => Ok(stmt),
            Simple::Range(_) => Err(self.error_here("Unexpected range clause")),
        }
    }

    fn parse_switch(&mut self) -> Result<Stmt, SyntaxError> {
        let start = self.expect(TokenKind::Switch)?.start;
        let prev_lev = self.expr_lev;
        self.expr_lev = -1;
        let header = self.parse_switch_header();
        self.expr_lev = prev_lev;
        let (init, tag) = header?;

        self.expect(TokenKind::LBrace)?;
        let mut clauses = Vec::new();
        while self.check(&TokenKind::Case) || self.check(&TokenKind::Default) {
            clauses.push(self.parse_case_clause()?);
        }
        self.expect(TokenKind::RBrace)?;
        let span = Span::new(start, self.last_end);

        if let Some((binding, subject)) = tag.as_ref().and_then(type_switch_guard) {
            return Ok(Stmt::TypeSwitch(Box::new(TypeSwitchStmt {
                init,
                binding,
                subject,
                clauses,
                span,
            })));
        }
        let tag = match tag {
            None => None,
            Some(Stmt::Expr(stmt)) => Some(stmt.expr),
            Some(other) => {
                return Err(SyntaxError::new(
                    "Switch tag must be an expression",
                    other.span(),
                ))
            }
        };
        Ok(Stmt::Switch(Box::new(SwitchStmt {
            init,
            tag,
            clauses,
            span,
        })))
    }

    fn parse_switch_header(&mut self) -> Result<(Option<Stmt>, Option<Stmt>), SyntaxError> {
        let mut init = None;
        let mut tag = None;
        if self.check(&TokenKind::LBrace) {
            return Ok((init, tag));
        }
        if !self.is_semi() {
            tag = Some(self.parse_simple_basic()?);
        }
        if self.is_semi() {
            self.advance();
            init = tag.take();
            if !self.check(&TokenKind::LBrace) {
                tag = Some(self.parse_simple_basic()?);
            }
        }
        Ok((init, tag))
    }

    fn parse_case_clause(&mut self) -> Result<CaseClause, SyntaxError> {
        let start = self.current_span().start;
        let (exprs, is_default) = if self.eat(TokenKind::Case) {
            (self.parse_expr_list()?, false)
        } else {
            self.expect(TokenKind::Default)?;
            (Vec::new(), true)
        };
        self.expect(TokenKind::Colon)?;
        let body = self.parse_stmt_list()?;
        Ok(CaseClause {
            exprs,
            is_default,
            body,
            span: Span::new(start, self.last_end),
        })
    }

    fn parse_select(&mut self) -> Result<Stmt, SyntaxError> {
        let start = self.expect(TokenKind::Select)?.start;
        self.expect(TokenKind::LBrace)?;
        let mut clauses = Vec::new();
        while self.check(&TokenKind::Case) || self.check(&TokenKind::Default) {
            let clause_start = self.current_span().start;
            let comm = if self.eat(TokenKind::Case) {
                Some(self.parse_simple_basic()?)
            } else {
                self.expect(TokenKind::Default)?;
                None
            };
            self.expect(TokenKind::Colon)?;
            let body = self.parse_stmt_list()?;
            clauses.push(CommClause {
                comm,
                body,
                span: Span::new(clause_start, self.last_end),
            });
        }
        self.expect(TokenKind::RBrace)?;
        Ok(Stmt::Select(Box::new(SelectStmt {
            clauses,
            span: Span::new(start, self.last_end),
        })))
    }

    fn parse_for(&mut self) -> Result<Stmt, SyntaxError> {
        let start = self.expect(TokenKind::For)?.start;
        let prev_lev = self.expr_lev;
        self.expr_lev = -1;
        let header = self.parse_for_header();
        self.expr_lev = prev_lev;
        let header = header?;
        let body = self.parse_block()?;
        let span = Span::new(start, self.last_end);
        match header {
            ForHeader::Range(range) => Ok(Stmt::Range(Box::new(RangeStmt {
                key: range.key,
                value: range.value,
                define: range.define,
                expr: range.expr,
                body,
                span,
            }))),
            ForHeader::Loop { init, cond, post } => Ok(Stmt::For(Box::new(ForStmt {
                init,
                cond,
                post,
                body,
                span,
            }))),
        }
    }

    fn parse_for_header(&mut self) -> Result<ForHeader, SyntaxError> {
        let mut init = None;
        let mut cond = None;
        let mut post = None;
        if self.check(&TokenKind::LBrace) {
            return Ok(ForHeader::Loop { init, cond, post });
        }
        let mut first = None;
        if !self.is_semi() {
            match self.parse_simple_stmt(SimpleMode::RangeOk)? {
                Simple::Range(range) => return Ok(ForHeader::Range(range)),
                Simple::Stmt(stmt) => first = Some(stmt),
            }
        }
        if self.is_semi() {
            self.advance();
            init = first;
            if !self.is_semi() {
                cond = Some(self.parse_expr()?);
            }
            self.expect_semi()?;
            if !self.check(&TokenKind::LBrace) {
                post = Some(self.parse_simple_basic()?);
            }
        } else {
            match first {
                Some(Stmt::Expr(stmt)) => cond = Some(stmt.expr),
                Some(other) => {
                    return Err(SyntaxError::new(
                        "Expected for loop condition",
                        other.span(),
                    ))
                }
                None => {}
            }
        }
        Ok(ForHeader::Loop { init, cond, post })
    }

    // ---- expressions ----

    fn parse_expr_list(&mut self) -> Result<Vec<Expr>, SyntaxError> {
        let mut list = vec![self.parse_expr()?];
        while self.eat(TokenKind::Comma) {
            list.push(self.parse_expr()?);
        }
        Ok(list)
    }

    fn parse_expr(&mut self) -> Result<Expr, SyntaxError> {
        self.parse_binary(1)
    }

    fn parse_binary(&mut self, min_prec: u8) -> Result<Expr, SyntaxError> {
        let mut x = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                TokenKind::Binary(op) => *op,
                _ => break,
            };
            let prec = op.precedence();
            if prec < min_prec {
                break;
            }
            self.advance();
            let y = self.parse_binary(prec + 1)?;
            let span = x.span().union(y.span());
            x = Expr::Binary(Box::new(BinaryExpr { op, x, y, span }));
        }
        Ok(x)
    }

    fn parse_unary(&mut self) -> Result<Expr, SyntaxError> {
        let start = self.current_span().start;
        let op = match self.peek() {
            TokenKind::Binary(BinaryOp::Add) => Some(UnaryOp::Pos),
            TokenKind::Binary(BinaryOp::Sub) => Some(UnaryOp::Neg),
            TokenKind::Binary(BinaryOp::Xor) => Some(UnaryOp::Xor),
            TokenKind::Binary(BinaryOp::And) => Some(UnaryOp::Ref),
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Tilde => Some(UnaryOp::Tilde),
            TokenKind::Arrow => {
                if matches!(self.peek_at(1), TokenKind::Chan) {
                    let ty = self.parse_type()?;
                    return self.parse_postfix(ty);
                }
                Some(UnaryOp::Recv)
            }
            TokenKind::Binary(BinaryOp::Mul) => {
                self.advance();
                let x = self.parse_unary()?;
                let span = Span::new(start, x.span().end);
                return Ok(Expr::Star(Box::new(StarExpr { x, span })));
            }
            _ => None,
        };
        match op {
            Some(op) => {
                self.advance();
                let x = self.parse_unary()?;
                let span = Span::new(start, x.span().end);
                Ok(Expr::Unary(Box::new(UnaryExpr { op, x, span })))
            }
            None => {
                let operand = self.parse_operand()?;
                self.parse_postfix(operand)
            }
        }
    }

    fn parse_operand(&mut self) -> Result<Expr, SyntaxError> {
        let start = self.current_span().start;
        match self.peek().clone() {
            TokenKind::Identifier(name) => {
                let span = self.advance();
                Ok(Expr::Ident(Ident { name, span }))
            }
            TokenKind::Number(raw) => self.basic_lit(LitKind::Number, raw),
            TokenKind::String(raw) => self.basic_lit(LitKind::String, raw),
            TokenKind::Rune(raw) => self.basic_lit(LitKind::Rune, raw),
            TokenKind::LParen => {
                self.advance();
                self.expr_lev += 1;
                let x = self.parse_expr();
                self.expr_lev -= 1;
                let x = x?;
                let end = self.expect(TokenKind::RParen)?.end;
                Ok(Expr::Paren(Box::new(ParenExpr {
                    x,
                    span: Span::new(start, end),
                })))
            }
            TokenKind::Func => {
                self.advance();
                let ty = self.parse_signature(start)?;
                if self.check(&TokenKind::LBrace) {
                    let body = self.parse_block()?;
                    Ok(Expr::FuncLit(Box::new(FuncLit {
                        ty,
                        body,
                        span: Span::new(start, self.last_end),
                    })))
                } else {
                    Ok(Expr::FuncType(Box::new(ty)))
                }
            }
            TokenKind::LBracket
            | TokenKind::Map
            | TokenKind::Chan
            | TokenKind::Struct
            | TokenKind::Interface => self.parse_type(),
            _ => Err(self.error_here("Expected expression")),
        }
    }

    fn basic_lit(&mut self, kind: LitKind, raw: String) -> Result<Expr, SyntaxError> {
        let span = self.advance();
        Ok(Expr::BasicLit(BasicLit { kind, raw, span }))
    }

    fn parse_postfix(&mut self, mut x: Expr) -> Result<Expr, SyntaxError> {
        loop {
            match self.peek() {
                TokenKind::Dot => {
                    self.advance();
                    match self.peek().clone() {
                        TokenKind::Identifier(name) => {
                            let sel_span = self.advance();
                            let span = x.span().union(sel_span);
                            x = Expr::Selector(Box::new(SelectorExpr {
                                x,
                                sel: Ident {
                                    name,
                                    span: sel_span,
                                },
                                span,
                            }));
                        }
                        TokenKind::LParen => {
                            self.advance();
                            let ty = if self.eat(TokenKind::Type) {
                                None
                            } else {
                                Some(self.parse_type()?)
                            };
                            let end = self.expect(TokenKind::RParen)?.end;
                            let span = Span::new(x.span().start, end);
                            x = Expr::TypeAssert(Box::new(TypeAssertExpr { x, ty, span }));
                        }
                        _ => return Err(self.error_here("Expected selector or type assertion")),
                    }
                }
                TokenKind::LBracket => x = self.parse_index_or_slice(x)?,
                TokenKind::LParen => x = self.parse_call(x)?,
                TokenKind::LBrace => {
                    let composite = match x.unparen() {
                        Expr::Ident(_) | Expr::Selector(_) | Expr::Index(_) => self.expr_lev >= 0,
                        Expr::ArrayType(_) | Expr::StructType(_) | Expr::MapType(_) => true,
                        _ => false,
                    };
                    if !composite {
                        break;
                    }
                    x = self.parse_composite_lit(Some(x))?;
                }
                _ => break,
            }
        }
        Ok(x)
    }

    fn parse_index_or_slice(&mut self, x: Expr) -> Result<Expr, SyntaxError> {
        self.expect(TokenKind::LBracket)?;
        self.expr_lev += 1;
        let result = self.parse_index_body();
        self.expr_lev -= 1;
        let (parts, colons, extra) = result?;
        let end = self.expect(TokenKind::RBracket)?.end;
        let span = Span::new(x.span().start, end);
        let [low, high, max] = parts;
        if colons > 0 {
            return Ok(Expr::Slice(Box::new(SliceExpr {
                x,
                low,
                high,
                max,
                span,
            })));
        }
        let mut indices = Vec::new();
        match low {
            Some(first) => indices.push(first),
            None => return Err(self.error_here("Expected operand")),
        }
        indices.extend(extra);
        Ok(Expr::Index(Box::new(IndexExpr { x, indices, span })))
    }

    #[allow(clippy::type_complexity)]
    fn parse_index_body(&mut self) -> Result<([Option<Expr>; 3], usize, Vec<Expr>), SyntaxError> {
        let mut parts: [Option<Expr>; 3] = [None, None, None];
        let mut colons = 0;
        let mut extra = Vec::new();
        if !self.check(&TokenKind::Colon) {
            parts[0] = Some(self.parse_index_element()?);
        }
        while colons < 2 && self.eat(TokenKind::Colon) {
            colons += 1;
            if !self.check(&TokenKind::Colon) && !self.check(&TokenKind::RBracket) {
                parts[colons] = Some(self.parse_expr()?);
            }
        }
        if colons == 0 {
            while self.eat(TokenKind::Comma) {
                if self.check(&TokenKind::RBracket) {
                    break;
                }
                extra.push(self.parse_index_element()?);
            }
        }
        Ok((parts, colons, extra))
    }

    /// Index expressions double as type arguments, so accept `*T` and friends.
    fn parse_index_element(&mut self) -> Result<Expr, SyntaxError> {
        if self.check(&TokenKind::Func) && !self.func_lit_follows() {
            return self.parse_type();
        }
        self.parse_expr()
    }

    fn func_lit_follows(&self) -> bool {
        let mut depth = 0usize;
        let mut idx = self.pos + 1;
        while let Some(token) = self.tokens.get(idx) {
            match token.kind {
                TokenKind::LParen | TokenKind::LBracket => depth += 1,
                TokenKind::RParen | TokenKind::RBracket => {
                    if depth == 0 {
                        return false;
                    }
                    depth -= 1;
                }
                TokenKind::LBrace if depth == 0 => return true,
                TokenKind::Comma if depth == 0 => return false,
                TokenKind::Eof => return false,
                _ => {}
            }
            idx += 1;
        }
        false
    }

    fn parse_call(&mut self, fun: Expr) -> Result<Expr, SyntaxError> {
        let lparen = self.expect(TokenKind::LParen)?;
        self.expr_lev += 1;
        let result = self.parse_call_args();
        self.expr_lev -= 1;
        let (args, spread) = result?;
        let rparen = self.expect(TokenKind::RParen)?;
        let span = Span::new(fun.span().start, rparen.end);
        Ok(Expr::Call(Box::new(CallExpr {
            fun,
            args,
            spread,
            lparen,
            rparen,
            span,
        })))
    }

    fn parse_call_args(&mut self) -> Result<(Vec<Expr>, bool), SyntaxError> {
        let mut args = Vec::new();
        let mut spread = false;
        while !self.check(&TokenKind::RParen) && !self.is_eof() {
            args.push(self.parse_expr()?);
            if self.eat(TokenKind::Ellipsis) {
                spread = true;
            }
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        Ok((args, spread))
    }

    fn parse_composite_lit(&mut self, ty: Option<Expr>) -> Result<Expr, SyntaxError> {
        let lbrace = self.expect(TokenKind::LBrace)?;
        let start = ty.as_ref().map(|t| t.span().start).unwrap_or(lbrace.start);
        let prev_lev = self.expr_lev;
        self.expr_lev = 1;
        let elts = self.parse_elements();
        self.expr_lev = prev_lev;
        let elts = elts?;
        let rbrace = self.expect(TokenKind::RBrace)?;
        Ok(Expr::CompositeLit(Box::new(CompositeLit {
            ty,
            elts,
            lbrace,
            rbrace,
            span: Span::new(start, rbrace.end),
        })))
    }

    fn parse_elements(&mut self) -> Result<Vec<Expr>, SyntaxError> {
        let mut elts = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_eof() {
            let key = self.parse_element()?;
            let elt = if self.eat(TokenKind::Colon) {
                let value = self.parse_element()?;
                let span = key.span().union(value.span());
                Expr::KeyValue(Box::new(KeyValueExpr { key, value, span }))
            } else {
                key
            };
            elts.push(elt);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        Ok(elts)
    }

    fn parse_element(&mut self) -> Result<Expr, SyntaxError> {
        if self.check(&TokenKind::LBrace) {
            return self.parse_composite_lit(None);
        }
        self.parse_expr()
    }

    // ---- token helpers ----

    fn expect_identifier(&mut self, msg: &str) -> Result<Ident, SyntaxError> {
        match self.peek().clone() {
            TokenKind::Identifier(name) => {
                let span = self.advance();
                Ok(Ident { name, span })
            }
            _ => Err(self.error_here(msg)),
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Span, SyntaxError> {
        if self.check(&kind) {
            Ok(self.advance())
        } else {
            Err(self.error_here(&format!("Expected {}", kind.describe())))
        }
    }

    fn expect_semi(&mut self) -> Result<(), SyntaxError> {
        if self.is_semi() {
            self.advance();
            Ok(())
        } else if matches!(self.peek(), TokenKind::RParen | TokenKind::RBrace) {
            Ok(())
        } else {
            Err(self.error_here("Expected ';' or newline"))
        }
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(&kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.peek() == kind
    }

    fn is_semi(&self) -> bool {
        matches!(self.peek(), TokenKind::Semi { .. })
    }

    fn skip_semis(&mut self) {
        while self.is_semi() {
            self.advance();
        }
    }

    fn peek(&self) -> &TokenKind {
        self.peek_at(0)
    }

    fn peek_at(&self, n: usize) -> &TokenKind {
        self.tokens
            .get(self.pos + n)
            .or_else(|| self.tokens.last())
            .map(|t| &t.kind)
            .unwrap_or(&TokenKind::Eof)
    }

    fn current_span(&self) -> Span {
        self.tokens
            .get(self.pos)
            .map(|t| t.span)
            .unwrap_or_else(|| Span::empty(self.last_end))
    }

    fn advance(&mut self) -> Span {
        let Some(token) = self.tokens.get(self.pos) else {
            return Span::empty(self.last_end);
        };
        let span = token.span;
        if !matches!(token.kind, TokenKind::Semi { implicit: true } | TokenKind::Eof) {
            self.last_end = span.end;
        }
        self.pos = (self.pos + 1).min(self.tokens.len());
        span
    }

    fn is_eof(&self) -> bool {
        matches!(self.peek(), TokenKind::Eof)
    }

    fn error_here(&self, message: &str) -> SyntaxError {
        let found = self.peek().describe();
        SyntaxError::new(format!("{message}, found {found}"), self.current_span())
    }

    fn report(&mut self, err: SyntaxError) {
        self.errors.push(err);
    }

    fn synchronize_decl(&mut self) {
        self.advance();
        while !self.is_eof() {
            let after_semi = self.pos > 0
                && matches!(self.tokens[self.pos - 1].kind, TokenKind::Semi { .. });
            if after_semi
                && matches!(
                    self.peek(),
                    TokenKind::Func | TokenKind::Var | TokenKind::Const | TokenKind::Type
                )
            {
                return;
            }
            self.advance();
        }
    }
}

enum ForHeader {
    Range(RangeHeader),
    Loop {
        init: Option<Stmt>,
        cond: Option<Expr>,
        post: Option<Stmt>,
    },
}

/// Recognizes `v := x.(type)` and `x.(type)` as a type switch guard.
fn type_switch_guard(stmt: &Stmt) -> Option<(Option<Ident>, Expr)> {
    match stmt {
        Stmt::Expr(ExprStmt {
            expr: Expr::TypeAssert(assert),
        }) if assert.ty.is_none() => Some((None, assert.x.clone())),
        Stmt::Assign(assign)
            if assign.op == AssignOp::Define && assign.lhs.len() == 1 && assign.rhs.len() == 1 =>
        {
            let binding = assign.lhs[0].as_ident()?.clone();
            match &assign.rhs[0] {
                Expr::TypeAssert(assert) if assert.ty.is_none() => {
                    Some((Some(binding), assert.x.clone()))
                }
                _ => None,
            }
        }
        _ => None,
    }
}

fn unquote(raw: &str) -> String {
    raw.trim_matches(|ch| ch == '"' || ch == '`').to_string()
}

#[cfg(test)]
mod tests;
