//! Native kind to common kind normalization.

use std::fmt;

/// Coarse classification shared by every front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommonKind {
    Project,
    Dir,
    File,
    Func,
    Call,
    Var,
    Arg,
    Import,
    Block,
    Decl,
    Stmt,
    Class,
    Unknown,
}

impl CommonKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Dir => "dir",
            Self::File => "file",
            Self::Func => "func",
            Self::Call => "call",
            Self::Var => "var",
            Self::Arg => "arg",
            Self::Import => "import",
            Self::Block => "block",
            Self::Decl => "decl",
            Self::Stmt => "stmt",
            Self::Class => "class",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for CommonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Framing kinds every table maps to themselves.
const FRAMING: &[(&str, CommonKind)] = &[
    ("project", CommonKind::Project),
    ("dir", CommonKind::Dir),
    ("file", CommonKind::File),
];

/// Per-language lookup from emitted kind names to [`CommonKind`].
#[derive(Debug, Clone, Copy)]
pub struct KindNormalizer {
    table: &'static [(&'static str, CommonKind)],
    statement_prefix: Option<&'static str>,
}

impl KindNormalizer {
    pub const fn new(table: &'static [(&'static str, CommonKind)]) -> Self {
        Self {
            table,
            statement_prefix: None,
        }
    }

    /// Kinds starting with `prefix` collapse to `stmt` before the table lookup.
    pub const fn with_statement_prefix(mut self, prefix: &'static str) -> Self {
        self.statement_prefix = Some(prefix);
        self
    }

    /// Total lookup; unmapped kinds are [`CommonKind::Unknown`].
    pub fn common_kind(&self, kind: &str) -> CommonKind {
        let kind = match self.statement_prefix {
            Some(prefix) if kind.starts_with(prefix) => "stmt",
            _ => kind,
        };

        FRAMING
            .iter()
            .chain(self.table.iter())
            .find(|(name, _)| *name == kind)
            .map(|(_, common)| *common)
            .unwrap_or(CommonKind::Unknown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &[(&str, CommonKind)] = &[
        ("stmt", CommonKind::Stmt),
        ("expr_funccall", CommonKind::Call),
        ("stmt_function", CommonKind::Func),
    ];

    #[test]
    fn test_exact_lookup_and_default() {
        let normalizer = KindNormalizer::new(TABLE);
        assert_eq!(normalizer.common_kind("expr_funccall"), CommonKind::Call);
        assert_eq!(normalizer.common_kind("stmt_function"), CommonKind::Func);
        assert_eq!(normalizer.common_kind("scalar_lnumber"), CommonKind::Unknown);
        assert_eq!(normalizer.common_kind("dir"), CommonKind::Dir);
    }

    #[test]
    fn test_statement_prefix_applies_before_lookup() {
        let normalizer = KindNormalizer::new(TABLE).with_statement_prefix("stmt");
        assert_eq!(normalizer.common_kind("stmt_if"), CommonKind::Stmt);
        assert_eq!(normalizer.common_kind("stmt_function"), CommonKind::Stmt);
        assert_eq!(normalizer.common_kind("expr_funccall"), CommonKind::Call);
    }
}
