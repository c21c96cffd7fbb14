use crate::language::{
    span::{Span, Spanned},
    token::BinaryOp,
};

#[derive(Clone, Debug, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn is_blank(&self) -> bool {
        self.name == "_"
    }
}

#[derive(Clone, Debug)]
pub struct SourceFile {
    pub package: Ident,
    pub imports: Vec<ImportDecl>,
    pub decls: Vec<Decl>,
    pub span: Span,
}

impl SourceFile {
    pub fn functions(&self) -> impl Iterator<Item = &FuncDecl> {
        self.decls.iter().filter_map(|decl| match decl {
            Decl::Func(func) => Some(func),
            Decl::Gen(_) => None,
        })
    }

    pub fn import_specs(&self) -> impl Iterator<Item = &ImportSpec> {
        self.imports.iter().flat_map(|decl| decl.specs.iter())
    }
}

/// Parenthesised declaration group, `import ( ... )`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Group {
    pub lparen: Span,
    pub rparen: Span,
}

#[derive(Clone, Debug)]
pub struct ImportDecl {
    pub specs: Vec<ImportSpec>,
    pub group: Option<Group>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct ImportSpec {
    pub name: Option<Ident>,
    /// Import path without quotes.
    pub path: String,
    pub path_span: Span,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub enum Decl {
    Func(FuncDecl),
    Gen(GenDecl),
}

#[derive(Clone, Debug)]
pub struct FuncDecl {
    pub recv: Option<FieldList>,
    pub name: Ident,
    pub type_params: Option<FieldList>,
    pub ty: FuncType,
    pub body: Option<Block>,
    pub span: Span,
}

impl FuncDecl {
    /// Name of the receiver's base type, `T` for both `(t T)` and `(t *T[K])`.
    pub fn receiver_type_name(&self) -> Option<&str> {
        let field = self.recv.as_ref()?.fields.first()?;
        base_type_name(&field.ty)
    }
}

fn base_type_name(ty: &Expr) -> Option<&str> {
    match ty {
        Expr::Ident(ident) => Some(&ident.name),
        Expr::Star(star) => base_type_name(&star.x),
        Expr::Paren(paren) => base_type_name(&paren.x),
        Expr::Index(index) => base_type_name(&index.x),
        _ => None,
    }
}

#[derive(Clone, Debug)]
pub struct FuncType {
    pub params: FieldList,
    pub results: Option<FieldList>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct FieldList {
    pub fields: Vec<Field>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct Field {
    pub names: Vec<Ident>,
    pub ty: Expr,
    pub tag: Option<String>,
    pub span: Span,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GenKind {
    Var,
    Const,
    Type,
}

#[derive(Clone, Debug)]
pub struct GenDecl {
    pub kind: GenKind,
    pub specs: Vec<Spec>,
    pub group: Option<Group>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub enum Spec {
    Value(ValueSpec),
    Type(TypeSpec),
}

#[derive(Clone, Debug)]
pub struct ValueSpec {
    pub names: Vec<Ident>,
    pub ty: Option<Expr>,
    pub values: Vec<Expr>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct TypeSpec {
    pub name: Ident,
    pub type_params: Option<FieldList>,
    pub alias: bool,
    pub ty: Expr,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct Block {
    pub lbrace: Span,
    pub stmts: Vec<Stmt>,
    pub rbrace: Span,
}

#[derive(Clone, Debug)]
pub enum Stmt {
    Decl(GenDecl),
    Empty(Span),
    Labeled(Box<LabeledStmt>),
    Expr(ExprStmt),
    Send(SendStmt),
    IncDec(IncDecStmt),
    Assign(AssignStmt),
    Go(GoStmt),
    Defer(DeferStmt),
    Return(ReturnStmt),
    Branch(BranchStmt),
    Block(Block),
    If(Box<IfStmt>),
    Switch(Box<SwitchStmt>),
    TypeSwitch(Box<TypeSwitchStmt>),
    Select(Box<SelectStmt>),
    For(Box<ForStmt>),
    Range(Box<RangeStmt>),
}

#[derive(Clone, Debug)]
pub struct LabeledStmt {
    pub label: Ident,
    pub stmt: Stmt,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct ExprStmt {
    pub expr: Expr,
}

#[derive(Clone, Debug)]
pub struct SendStmt {
    pub chan: Expr,
    pub value: Expr,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct IncDecStmt {
    pub x: Expr,
    pub inc: bool,
    pub span: Span,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    Define,
    Op(BinaryOp),
}

#[derive(Clone, Debug)]
pub struct AssignStmt {
    pub lhs: Vec<Expr>,
    pub op: AssignOp,
    pub rhs: Vec<Expr>,
    pub span: Span,
}

/// `go f(x)`: the launched call.
#[derive(Clone, Debug)]
pub struct GoStmt {
    pub call: CallExpr,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct DeferStmt {
    pub call: CallExpr,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct ReturnStmt {
    pub results: Vec<Expr>,
    pub span: Span,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BranchKind {
    Break,
    Continue,
    Goto,
    Fallthrough,
}

#[derive(Clone, Debug)]
pub struct BranchStmt {
    pub kind: BranchKind,
    pub label: Option<Ident>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct IfStmt {
    pub init: Option<Stmt>,
    pub cond: Expr,
    pub then: Block,
    pub els: Option<Stmt>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct CaseClause {
    /// Empty for `default:`.
    pub exprs: Vec<Expr>,
    pub is_default: bool,
    pub body: Vec<Stmt>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct SwitchStmt {
    pub init: Option<Stmt>,
    pub tag: Option<Expr>,
    pub clauses: Vec<CaseClause>,
    pub span: Span,
}

/// `switch v := x.(type) { ... }`
#[derive(Clone, Debug)]
pub struct TypeSwitchStmt {
    pub init: Option<Stmt>,
    pub binding: Option<Ident>,
    pub subject: Expr,
    pub clauses: Vec<CaseClause>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct CommClause {
    /// `None` for `default:`.
    pub comm: Option<Stmt>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct SelectStmt {
    pub clauses: Vec<CommClause>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct ForStmt {
    pub init: Option<Stmt>,
    pub cond: Option<Expr>,
    pub post: Option<Stmt>,
    pub body: Block,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct RangeStmt {
    pub key: Option<Expr>,
    pub value: Option<Expr>,
    pub define: bool,
    pub expr: Expr,
    pub body: Block,
    pub span: Span,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LitKind {
    Number,
    String,
    Rune,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Pos,
    Neg,
    Not,
    Xor,
    Ref,
    Recv,
    Tilde,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChanDir {
    Both,
    Send,
    Recv,
}

#[derive(Clone, Debug)]
pub enum Expr {
    Ident(Ident),
    BasicLit(BasicLit),
    CompositeLit(Box<CompositeLit>),
    FuncLit(Box<FuncLit>),
    Paren(Box<ParenExpr>),
    Selector(Box<SelectorExpr>),
    Index(Box<IndexExpr>),
    Slice(Box<SliceExpr>),
    TypeAssert(Box<TypeAssertExpr>),
    Call(Box<CallExpr>),
    Star(Box<StarExpr>),
    Unary(Box<UnaryExpr>),
    Binary(Box<BinaryExpr>),
    KeyValue(Box<KeyValueExpr>),
    ArrayType(Box<ArrayType>),
    MapType(Box<MapType>),
    ChanType(Box<ChanType>),
    FuncType(Box<FuncType>),
    StructType(Box<StructType>),
    InterfaceType(Box<InterfaceType>),
    Ellipsis(Box<Ellipsis>),
}

#[derive(Clone, Debug)]
pub struct BasicLit {
    pub kind: LitKind,
    pub raw: String,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct CompositeLit {
    /// `None` for literals whose type is elided inside an outer literal.
    pub ty: Option<Expr>,
    pub elts: Vec<Expr>,
    pub lbrace: Span,
    pub rbrace: Span,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct FuncLit {
    pub ty: FuncType,
    pub body: Block,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct ParenExpr {
    pub x: Expr,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct SelectorExpr {
    pub x: Expr,
    pub sel: Ident,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct IndexExpr {
    pub x: Expr,
    pub indices: Vec<Expr>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct SliceExpr {
    pub x: Expr,
    pub low: Option<Expr>,
    pub high: Option<Expr>,
    pub max: Option<Expr>,
    pub span: Span,
}

/// `x.(T)`, or `x.(type)` when `ty` is `None`.
#[derive(Clone, Debug)]
pub struct TypeAssertExpr {
    pub x: Expr,
    pub ty: Option<Expr>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct CallExpr {
    pub fun: Expr,
    pub args: Vec<Expr>,
    pub spread: bool,
    pub lparen: Span,
    pub rparen: Span,
    pub span: Span,
}

impl CallExpr {
    /// The function literal being called, for `func() { ... }()`.
    pub fn func_lit(&self) -> Option<&FuncLit> {
        match self.fun.unparen() {
            Expr::FuncLit(lit) => Some(lit),
            _ => None,
        }
    }

    /// `(x, name)` for calls shaped like `x.name(...)` with an identifier operand.
    pub fn qualified_callee(&self) -> Option<(&Ident, &Ident)> {
        match &self.fun {
            Expr::Selector(selector) => match &selector.x {
                Expr::Ident(qualifier) => Some((qualifier, &selector.sel)),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Pointer type `*T` or dereference `*p`; the parser cannot tell them apart.
#[derive(Clone, Debug)]
pub struct StarExpr {
    pub x: Expr,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct UnaryExpr {
    pub op: UnaryOp,
    pub x: Expr,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct BinaryExpr {
    pub op: BinaryOp,
    pub x: Expr,
    pub y: Expr,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct KeyValueExpr {
    pub key: Expr,
    pub value: Expr,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct ArrayType {
    /// `None` for slices; `Some(Ellipsis)` for `[...]T`.
    pub len: Option<Expr>,
    pub elem: Expr,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct MapType {
    pub key: Expr,
    pub value: Expr,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct ChanType {
    pub dir: ChanDir,
    pub value: Expr,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct StructType {
    pub fields: FieldList,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct InterfaceType {
    /// Methods carry one name; embedded types and unions carry none.
    pub elems: FieldList,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct Ellipsis {
    pub elt: Option<Expr>,
    pub span: Span,
}

impl Expr {
    pub fn unparen(&self) -> &Expr {
        match self {
            Expr::Paren(paren) => paren.x.unparen(),
            other => other,
        }
    }

    pub fn as_ident(&self) -> Option<&Ident> {
        match self {
            Expr::Ident(ident) => Some(ident),
            _ => None,
        }
    }

    pub fn is_ident(&self, name: &str) -> bool {
        self.as_ident().is_some_and(|ident| ident.name == name)
    }
}

impl Spanned for Ident {
    fn span(&self) -> Span {
        self.span
    }
}

impl Spanned for Block {
    fn span(&self) -> Span {
        self.lbrace.union(self.rbrace)
    }
}

impl Spanned for CallExpr {
    fn span(&self) -> Span {
        self.span
    }
}

impl Spanned for FuncLit {
    fn span(&self) -> Span {
        self.span
    }
}

impl Spanned for FieldList {
    fn span(&self) -> Span {
        self.span
    }
}

impl Spanned for Expr {
    fn span(&self) -> Span {
        match self {
            Expr::Ident(ident) => ident.span,
            Expr::BasicLit(lit) => lit.span,
            Expr::CompositeLit(lit) => lit.span,
            Expr::FuncLit(lit) => lit.span,
            Expr::Paren(expr) => expr.span,
            Expr::Selector(expr) => expr.span,
            Expr::Index(expr) => expr.span,
            Expr::Slice(expr) => expr.span,
            Expr::TypeAssert(expr) => expr.span,
            Expr::Call(expr) => expr.span,
            Expr::Star(expr) => expr.span,
            Expr::Unary(expr) => expr.span,
            Expr::Binary(expr) => expr.span,
            Expr::KeyValue(expr) => expr.span,
            Expr::ArrayType(ty) => ty.span,
            Expr::MapType(ty) => ty.span,
            Expr::ChanType(ty) => ty.span,
            Expr::FuncType(ty) => ty.span,
            Expr::StructType(ty) => ty.span,
            Expr::InterfaceType(ty) => ty.span,
            Expr::Ellipsis(expr) => expr.span,
        }
    }
}

impl Spanned for Stmt {
    fn span(&self) -> Span {
        match self {
            Stmt::Decl(decl) => decl.span,
            Stmt::Empty(span) => *span,
            Stmt::Labeled(stmt) => stmt.span,
            Stmt::Expr(stmt) => stmt.expr.span(),
            Stmt::Send(stmt) => stmt.span,
            Stmt::IncDec(stmt) => stmt.span,
            Stmt::Assign(stmt) => stmt.span,
            Stmt::Go(stmt) => stmt.span,
            Stmt::Defer(stmt) => stmt.span,
            Stmt::Return(stmt) => stmt.span,
            Stmt::Branch(stmt) => stmt.span,
            Stmt::Block(block) => block.span(),
            Stmt::If(stmt) => stmt.span,
            Stmt::Switch(stmt) => stmt.span,
            Stmt::TypeSwitch(stmt) => stmt.span,
            Stmt::Select(stmt) => stmt.span,
            Stmt::For(stmt) => stmt.span,
            Stmt::Range(stmt) => stmt.span,
        }
    }
}
