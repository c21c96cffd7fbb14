use crate::{
    language::errors::{SyntaxError, SyntaxErrors},
    project::ProcessError,
    rewrite::RewriteError,
};
use miette::{Diagnostic, NamedSource, Report, SourceSpan};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
pub struct SyntaxDiagnostic {
    #[source_code]
    src: NamedSource,
    #[label("{label}")]
    span: SourceSpan,
    #[help]
    help: Option<String>,
    message: String,
    label: String,
}

impl SyntaxDiagnostic {
    pub fn from_error(src: NamedSource, err: SyntaxError) -> Self {
        Self {
            src,
            span: err.to_source_span(),
            help: err.help.clone(),
            message: err.message.clone(),
            label: err.label,
        }
    }
}

pub fn emit_syntax_errors(path: &Path, text: &str, errors: &SyntaxErrors) {
    let name = path.display().to_string();
    for err in &errors.errors {
        let src = NamedSource::new(&name, text.to_string());
        let diagnostic = SyntaxDiagnostic::from_error(src, err.clone());
        eprintln!("{:?}", Report::new(diagnostic));
    }
}

pub fn report_failure(error: &ProcessError) {
    match error {
        ProcessError::Rewrite {
            path,
            text,
            error: RewriteError::Syntax(errors),
        } => emit_syntax_errors(path, text, errors),
        other => eprintln!("error: {other}"),
    }
}
