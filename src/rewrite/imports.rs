use crate::language::{
    ast::{Expr, SourceFile},
    qualified::{default_local_name, QualifiedName},
    span::{line_ending, Span},
};
use crate::rewrite::edits::EditSet;
use std::collections::HashMap;

/// Local package names of a file's imports.
#[derive(Clone, Debug, Default)]
pub struct ImportTable {
    by_local: HashMap<String, String>,
    by_path: HashMap<String, String>,
}

/// How a package would be referred to after making sure it is imported.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImportName {
    Present(String),
    Missing(String),
    /// The default local name already belongs to another import.
    Taken(String),
}

impl ImportName {
    pub fn local(&self) -> Option<&str> {
        match self {
            ImportName::Present(local) | ImportName::Missing(local) => Some(local),
            ImportName::Taken(_) => None,
        }
    }
}

impl ImportTable {
    pub fn from_file(file: &SourceFile) -> Self {
        let mut table = Self::default();
        for spec in file.import_specs() {
            let local = match &spec.name {
                Some(name) if name.name == "_" || name.name == "." => continue,
                Some(name) => name.name.clone(),
                None => default_local_name(&spec.path),
            };
            table.by_path.entry(spec.path.clone()).or_insert(local.clone());
            table.by_local.insert(local, spec.path.clone());
        }
        table
    }

    pub fn path_of(&self, local: &str) -> Option<&str> {
        self.by_local.get(local).map(String::as_str)
    }

    pub fn local_of(&self, path: &str) -> Option<&str> {
        self.by_path.get(path).map(String::as_str)
    }

    pub fn locals(&self) -> impl Iterator<Item = &str> {
        self.by_local.keys().map(String::as_str)
    }

    pub fn name_for(&self, path: &str) -> ImportName {
        if let Some(local) = self.local_of(path) {
            return ImportName::Present(local.to_string());
        }
        let local = default_local_name(path);
        if self.by_local.contains_key(&local) {
            ImportName::Taken(local)
        } else {
            ImportName::Missing(local)
        }
    }

    /// The package qualifier of `expr` when it has the shape `pkg.Name` and
    /// `pkg` is the file's local name for `name.path`.
    pub fn qualifier<'e>(&self, expr: &'e Expr, name: &QualifiedName) -> Option<&'e str> {
        let Expr::Selector(selector) = expr else {
            return None;
        };
        let Expr::Ident(qualifier) = &selector.x else {
            return None;
        };
        let matches = selector.sel.name == name.name
            && self.path_of(&qualifier.name) == Some(name.path.as_str());
        matches.then_some(qualifier.name.as_str())
    }
}

/// Queues import declarations for `paths`, returning where they land.
pub fn insert_imports(
    file: &SourceFile,
    source: &str,
    paths: &[String],
    edits: &mut EditSet,
) -> Option<usize> {
    if paths.is_empty() {
        return None;
    }
    let nl = line_ending(source, file.package.span.start);

    if let Some(group) = file.imports.iter().find_map(|decl| decl.group) {
        let before = &source[..group.rparen.start];
        let line_start = before.rfind('\n').map(|idx| idx + 1).unwrap_or(0);
        if before[line_start..].trim().is_empty() {
            let text: String = paths.iter().map(|path| format!("\t\"{path}\"{nl}")).collect();
            edits.insert_before(&Span::empty(line_start), text);
            return Some(line_start);
        }
        let text: String = paths.iter().map(|path| format!("; \"{path}\"")).collect();
        edits.insert_before(&group.rparen, text);
        return Some(group.rparen.start);
    }

    if let Some(last) = file.imports.last() {
        let text: String = paths
            .iter()
            .map(|path| format!("{nl}import \"{path}\""))
            .collect();
        edits.insert_after(&last.span, text);
        return Some(last.span.end);
    }

    let text = match paths {
        [only] => format!("{nl}{nl}import \"{only}\""),
        many => {
            let lines: String = many.iter().map(|path| format!("\t\"{path}\"{nl}")).collect();
            format!("{nl}{nl}import ({nl}{lines})")
        }
    };
    edits.insert_after(&file.package, text);
    Some(file.package.span.end)
}
