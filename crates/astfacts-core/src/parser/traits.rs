//! The per-language plug-in consumed by the shared walker.

use std::borrow::Cow;

use tree_sitter::{Language, Node};

use super::shape::Shape;
use crate::facts::{KindNormalizer, TypeNaming};

/// Language front end.
///
/// One implementation per source language bundles everything that differs
/// between languages: the grammar, the shaper deciding how each native node
/// becomes facts, the kind rename table, the common-kind table and the
/// spelling of property type names. The tree walker and project driver are
/// shared.
pub trait FrontEnd: Send + Sync {
    /// Namespace written into every fact's `kind.namespace`.
    fn namespace(&self) -> &'static str;

    /// Human-readable language name.
    fn language_name(&self) -> &'static str;

    /// Other names the front end answers to on the command line.
    fn aliases(&self) -> &[&'static str] {
        &[]
    }

    /// File extensions this front end handles.
    fn supported_extensions(&self) -> &[&'static str];

    /// Check if this front end can handle the given file extension.
    fn can_parse(&self, extension: &str) -> bool {
        self.supported_extensions()
            .iter()
            .any(|ext| ext.eq_ignore_ascii_case(extension))
    }

    /// Grammar used for files with this extension.
    fn grammar_for(&self, extension: &str) -> Language;

    /// Emission instructions for one native node.
    ///
    /// Must be a pure function of the node and source text.
    fn shape<'t>(&self, node: Node<'t>, source: &str) -> Shape<'t>;

    /// Emitted `kind.kind` for a native kind.
    fn rename(&self, native_kind: &str) -> Cow<'static, str>;

    fn normalizer(&self) -> KindNormalizer;

    fn type_naming(&self) -> TypeNaming;
}
