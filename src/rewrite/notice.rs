use std::{fmt, path::Path};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    /// A placeholder call was replaced.
    Replaced { placeholder: String, with: String },
    /// A reference to the primary resource now names the derived one.
    Redirected { from: String, to: String },
    /// An inline launch body gained the derived resource and its span.
    Instrumented { derived: String },
    /// A named launch was wrapped in an instrumented closure.
    Wrapped { callee: String },
    ImportAdded { path: String },
    /// The primary name came from a call of unknown result and is
    /// treated as a value.
    AssumedValue { name: String, callee: String },
    /// A launch the transformer cannot take apart; left as is.
    UnrecognizedLaunch { callee: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    /// 1-based line in the input file.
    pub line: usize,
    pub kind: NoticeKind,
}

impl Notice {
    pub fn new(line: usize, kind: NoticeKind) -> Self {
        Self { line, kind }
    }

    pub fn is_warning(&self) -> bool {
        matches!(
            self.kind,
            NoticeKind::UnrecognizedLaunch { .. } | NoticeKind::AssumedValue { .. }
        )
    }

    /// Whether the notice describes a change to the file.
    pub fn is_change(&self) -> bool {
        !self.is_warning()
    }

    pub fn display<'a>(&'a self, path: &'a Path) -> DisplayNotice<'a> {
        DisplayNotice { notice: self, path }
    }
}

impl fmt::Display for NoticeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoticeKind::Replaced { placeholder, with } => {
                write!(f, "replaced {placeholder} with {with}")
            }
            NoticeKind::Redirected { from, to } => write!(f, "replaced {from} with {to}"),
            NoticeKind::Instrumented { derived } => {
                write!(f, "instrumented go statement with {derived}")
            }
            NoticeKind::Wrapped { callee } => {
                write!(f, "wrapped go {callee}(...) in an instrumented closure")
            }
            NoticeKind::ImportAdded { path } => write!(f, "added import \"{path}\""),
            NoticeKind::AssumedValue { name, callee } => {
                write!(f, "warning: kind of {name} := {callee}(...) not resolved, using it as a context value")
            }
            NoticeKind::UnrecognizedLaunch { callee } => {
                write!(f, "warning: left go {callee}(...) unchanged, unrecognized launch shape")
            }
        }
    }
}

/// `path:line → message`
pub struct DisplayNotice<'a> {
    notice: &'a Notice,
    path: &'a Path,
}

impl fmt::Display for DisplayNotice<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} → {}",
            self.path.display(),
            self.notice.line,
            self.notice.kind
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_with_path_and_line() {
        let notice = Notice::new(
            12,
            NoticeKind::Replaced {
                placeholder: "context.TODO()".into(),
                with: "ctx".into(),
            },
        );
        assert_eq!(
            notice.display(Path::new("svc/handler.go")).to_string(),
            "svc/handler.go:12 → replaced context.TODO() with ctx"
        );
        assert!(notice.is_change());
    }

    #[test]
    fn unrecognized_launches_are_warnings() {
        let notice = Notice::new(
            3,
            NoticeKind::UnrecognizedLaunch {
                callee: "handlers[i]".into(),
            },
        );
        assert!(notice.is_warning());
        assert!(notice.kind.to_string().contains("unrecognized"));
    }
}
