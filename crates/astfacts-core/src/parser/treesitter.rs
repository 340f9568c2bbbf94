//! Tree-sitter plumbing shared by the front ends.

use tree_sitter::{Language, Node, Parser as TSParser, Tree};

use crate::error::FactError;

/// Parse source code into a tree-sitter tree.
///
/// `Ok(None)` means the parser gave up without producing a tree.
pub fn parse_tree(
    language: &Language,
    language_name: &str,
    content: &str,
) -> Result<Option<Tree>, FactError> {
    let mut parser = TSParser::new();
    parser
        .set_language(language)
        .map_err(|e| FactError::Grammar {
            language: language_name.to_string(),
            message: e.to_string(),
        })?;

    Ok(parser.parse(content, None))
}

/// Syntax problems found in a parsed tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Diagnostics {
    pub errors: usize,
    pub missing: usize,
    /// 0-based row and column of the first `ERROR` node.
    pub first_error: Option<(usize, usize)>,
}

impl Diagnostics {
    pub fn is_clean(&self) -> bool {
        self.errors == 0 && self.missing == 0
    }
}

/// Count `ERROR` and `MISSING` nodes, visiting only subtrees that contain one.
pub fn diagnose(tree: &Tree) -> Diagnostics {
    let mut diagnostics = Diagnostics::default();
    if !tree.root_node().has_error() {
        return diagnostics;
    }

    let mut cursor = tree.walk();
    loop {
        let node = cursor.node();
        if node.is_error() {
            diagnostics.errors += 1;
            if diagnostics.first_error.is_none() {
                let at = node.start_position();
                diagnostics.first_error = Some((at.row, at.column));
            }
        } else if node.is_missing() {
            diagnostics.missing += 1;
        }

        if node.has_error() && cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return diagnostics;
            }
        }
    }
}

/// Source text of a node.
pub fn text<'s>(node: &Node, source: &'s str) -> &'s str {
    source.get(node.byte_range()).unwrap_or("")
}

/// Child by field name.
pub fn field<'t>(node: &Node<'t>, name: &str) -> Option<Node<'t>> {
    node.child_by_field_name(name)
}

/// All children carrying a field name, named ones only.
pub fn fields<'t>(node: &Node<'t>, name: &str) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.children_by_field_name(name, &mut cursor)
        .filter(|n| n.is_named() && !n.is_extra())
        .collect()
}

/// Named children, skipping extras such as comments.
pub fn named_children<'t>(node: &Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|n| !n.is_extra())
        .collect()
}

/// Named children of the given kinds.
pub fn children_of_kind<'t>(node: &Node<'t>, kinds: &[&str]) -> Vec<Node<'t>> {
    named_children(node)
        .into_iter()
        .filter(|n| kinds.contains(&n.kind()))
        .collect()
}

/// First named child of the given kind.
pub fn first_of_kind<'t>(node: &Node<'t>, kind: &str) -> Option<Node<'t>> {
    named_children(node).into_iter().find(|n| n.kind() == kind)
}

/// Whether the node has an anonymous child token such as `async` or `!`.
pub fn has_token(node: &Node, token: &str) -> bool {
    let mut cursor = node.walk();
    let found = node
        .children(&mut cursor)
        .any(|n| !n.is_named() && n.kind() == token);
    found
}

/// Text of an operator field, or `None` when absent.
pub fn operator<'s>(node: &Node, source: &'s str) -> Option<&'s str> {
    field(node, "operator").map(|op| text(&op, source))
}
