//! Scope-aware placeholder replacement and launch instrumentation.
//!
//! A [`Rewriter`] walks one parsed file, tracking which names can stand in
//! for the resource at every point, and queues text edits anchored on AST
//! spans. Nothing is written until the whole file has been walked.

mod binding;
mod edits;
mod imports;
mod kinds;
mod launch;
mod notice;
mod options;
mod resolve;
mod scopes;
mod skip;
mod walk;


pub use binding::{Binding, BindingKind, Origin};
pub use edits::{EditConflict, EditSet};
pub use imports::{insert_imports, ImportName, ImportTable};
pub use kinds::type_kind;
pub use launch::is_marker;
pub use notice::{DisplayNotice, Notice, NoticeKind};
pub use options::{
    DetachedOptions, FallbackOptions, Options, ResourceOptions, CONTEXT_PACKAGE, OTEL_PACKAGE,
};
pub use resolve::resolve_site;
pub use scopes::ScopeStack;
pub use skip::{FileIndex, FunctionId, Signature, SkipSet};

use crate::language::{
    ast::*,
    errors::SyntaxErrors,
    parser::parse_file,
    qualified::{default_local_name, TypePattern},
    span::{line_ending, LineIndex, Span, Spanned},
};
use std::collections::HashSet;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("{0}")]
    Syntax(#[from] SyntaxErrors),
    #[error(transparent)]
    Conflict(#[from] EditConflict),
}

/// Result of rewriting one file.
#[derive(Clone, Debug)]
pub struct Rewrite {
    pub output: String,
    pub notices: Vec<Notice>,
    /// Whether `output` differs from the input.
    pub changed: bool,
}

pub fn rewrite_source(source: &str, options: &Options) -> Result<Rewrite, RewriteError> {
    let file = parse_file(source)?;
    rewrite_file(&file, source, options)
}

pub fn rewrite_file(
    file: &SourceFile,
    source: &str,
    options: &Options,
) -> Result<Rewrite, RewriteError> {
    let rewriter = Rewriter::new(file, source, options);
    let (edits, mut notices) = rewriter.run()?;
    let output = edits.apply(source)?;
    notices.sort_by_key(|notice| notice.line);
    Ok(Rewrite {
        changed: output != source,
        output,
        notices,
    })
}

/// Edits made while walking one launch body, kept apart until the
/// launch decides how to use them.
struct Trial {
    edits: EditSet,
    notices: Vec<Notice>,
    derived_uses: usize,
}

pub struct Rewriter<'a> {
    source: &'a str,
    file: &'a SourceFile,
    options: &'a Options,
    imports: ImportTable,
    index: FileIndex,
    skip: SkipSet,
    lines: LineIndex,
    /// Names whose declarations the scope stack records.
    tracked: HashSet<String>,
    scopes: ScopeStack,
    edits: EditSet,
    notices: Vec<Notice>,
    /// References to a derived binding seen by the walk in progress.
    derived_uses: usize,
    missing_imports: Vec<String>,
    conflict: Option<EditConflict>,
}

impl<'a> Rewriter<'a> {
    pub fn new(file: &'a SourceFile, source: &'a str, options: &'a Options) -> Self {
        let imports = ImportTable::from_file(file);
        let index = FileIndex::build(file, &imports, options);
        let skip = SkipSet::analyze(file, &index, &imports, options);

        let mut tracked: HashSet<String> = HashSet::new();
        tracked.insert(options.resource.name.clone());
        tracked.extend(options.fallback.names.iter().cloned());
        tracked.extend(imports.locals().map(str::to_string));
        tracked.extend(
            options
                .referenced_paths()
                .into_iter()
                .map(default_local_name),
        );

        Self {
            source,
            file,
            options,
            imports,
            index,
            skip,
            lines: LineIndex::new(source),
            tracked,
            scopes: ScopeStack::new(),
            edits: EditSet::new(),
            notices: Vec::new(),
            derived_uses: 0,
            missing_imports: Vec::new(),
            conflict: None,
        }
    }

    /// Walks the file and returns the queued edits with their notices.
    pub fn run(mut self) -> Result<(EditSet, Vec<Notice>), RewriteError> {
        debug!(
            package = %self.file.package.name,
            skipped = self.skip.len(),
            "rewriting file"
        );
        let file = self.file;
        for decl in &file.decls {
            match decl {
                Decl::Func(func) => self.walk_func_decl(func),
                Decl::Gen(decl) => {
                    self.scopes.push_root();
                    self.walk_package_decl(decl);
                    self.scopes.pop();
                }
            }
        }

        if let Some(at) = insert_imports(file, self.source, &self.missing_imports, &mut self.edits) {
            let line = self.lines.line(at);
            for path in std::mem::take(&mut self.missing_imports) {
                self.notices
                    .push(Notice::new(line, NoticeKind::ImportAdded { path }));
            }
        }

        match self.conflict {
            Some(conflict) => Err(conflict.into()),
            None => Ok((self.edits, self.notices)),
        }
    }

    fn notice(&mut self, at: usize, kind: NoticeKind) {
        let line = self.lines.line(at);
        self.notices.push(Notice::new(line, kind));
    }

    fn trial(&mut self, walk: impl FnOnce(&mut Self)) -> Trial {
        let edits = std::mem::take(&mut self.edits);
        let notices = std::mem::take(&mut self.notices);
        let uses = std::mem::replace(&mut self.derived_uses, 0);
        walk(self);
        Trial {
            edits: std::mem::replace(&mut self.edits, edits),
            notices: std::mem::replace(&mut self.notices, notices),
            derived_uses: std::mem::replace(&mut self.derived_uses, uses),
        }
    }

    fn commit(&mut self, trial: Trial) {
        self.edits.extend(trial.edits);
        self.notices.extend(trial.notices);
    }
}
