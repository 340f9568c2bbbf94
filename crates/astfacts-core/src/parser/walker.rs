//! Recursive descent over one file's syntax tree.

use std::borrow::Cow;
use std::collections::BTreeMap;

use tracing::{debug, warn};
use tree_sitter::Node;

use super::shape::{EmitInstructions, Shape, Slot};
use super::traits::FrontEnd;
use crate::error::WalkError;
use crate::facts::{
    make_common_properties, make_property, Emitter, Fact, KeyManager, Kind, PropValue, Span,
};

/// Parent key plus the keys already emitted under it.
#[derive(Debug, Clone)]
pub struct SiblingFrame {
    key: String,
    children: Vec<String>,
}

impl SiblingFrame {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            children: Vec::new(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Record a child and return its elder siblings.
    pub fn adopt(&mut self, child: &str) -> Vec<String> {
        let older = self.children.clone();
        self.children.push(child.to_string());
        older
    }
}

/// Totals for one walked file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    pub facts: usize,
    pub unhandled: usize,
}

/// Walks one file, turning shaped nodes into facts.
pub struct TreeWalker<'a> {
    front_end: &'a dyn FrontEnd,
    source: &'a str,
    filename: &'a str,
    keys: &'a mut KeyManager,
    emitter: &'a mut dyn Emitter,
    max_depth: usize,
    unhandled: BTreeMap<&'static str, usize>,
    facts: usize,
}

impl<'a> TreeWalker<'a> {
    pub fn new(
        front_end: &'a dyn FrontEnd,
        source: &'a str,
        filename: &'a str,
        keys: &'a mut KeyManager,
        emitter: &'a mut dyn Emitter,
    ) -> Self {
        Self {
            front_end,
            source,
            filename,
            keys,
            emitter,
            max_depth: usize::MAX,
            unhandled: BTreeMap::new(),
            facts: 0,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Walk `root` with its top-level facts parented to `parent_key`.
    pub fn walk(mut self, root: Node<'_>, parent_key: &str) -> Result<WalkStats, WalkError> {
        let mut frame = SiblingFrame::new(parent_key);
        let result = self.walk_node(root, &mut frame, false, 0);

        for (kind, count) in &self.unhandled {
            warn!(
                file = self.filename,
                kind = *kind,
                count = *count,
                "No shaper for node kind, subtree pruned"
            );
        }

        let stats = WalkStats {
            facts: self.facts,
            unhandled: self.unhandled.values().sum(),
        };
        match result {
            Ok(()) => Ok(stats),
            Err(WalkError::TooDeep { depth, .. }) => Err(WalkError::TooDeep { depth, stats }),
            Err(e) => Err(e),
        }
    }

    fn walk_node<'t>(
        &mut self,
        node: Node<'t>,
        frame: &mut SiblingFrame,
        grouped: bool,
        depth: usize,
    ) -> Result<(), WalkError> {
        if depth > self.max_depth {
            return Err(WalkError::TooDeep {
                depth: self.max_depth,
                stats: WalkStats::default(),
            });
        }
        if node.is_missing() || node.is_extra() {
            return Ok(());
        }
        if node.is_error() {
            let at = node.start_position();
            debug!(file = self.filename, line = at.row, column = at.column, "Skipping ERROR node");
            return Ok(());
        }

        let instructions = match self.front_end.shape(node, self.source) {
            Shape::Emit(instructions) => instructions,
            Shape::Elide => return Ok(()),
            Shape::Unhandled => {
                *self.unhandled.entry(node.kind()).or_default() += 1;
                return Ok(());
            }
        };

        if instructions.skip_emit {
            return self.walk_slots(node, instructions.children, frame, depth);
        }

        let EmitInstructions {
            kind,
            props,
            children,
            positional,
            ..
        } = instructions;
        let kind = match kind {
            Some(kind) => Cow::Borrowed(kind),
            None => self.front_end.rename(node.kind()),
        };

        let key = self.emit(&kind, frame, Span::of(&node), props, positional || grouped)?;
        let mut own = SiblingFrame::new(key);
        self.walk_slots(node, children, &mut own, depth)
    }

    fn walk_slots<'t>(
        &mut self,
        owner: Node<'t>,
        slots: Vec<Slot<'t>>,
        frame: &mut SiblingFrame,
        depth: usize,
    ) -> Result<(), WalkError> {
        for slot in slots {
            match slot {
                Slot::Node(child) => self.walk_node(child, frame, false, depth + 1)?,
                Slot::Group {
                    name,
                    nodes,
                    keep_when_empty,
                } => {
                    let live: Vec<Node<'t>> = nodes.into_iter().filter(is_live).collect();
                    if live.is_empty() && !keep_when_empty {
                        continue;
                    }

                    let span = match (live.first(), live.last()) {
                        (Some(first), Some(last)) => Span::covering(first, last),
                        _ => Span::of(&owner),
                    };
                    let key = self.emit(name, frame, span, Vec::new(), true)?;
                    let mut container = SiblingFrame::new(key);
                    for member in live {
                        self.walk_node(member, &mut container, true, depth + 2)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn emit(
        &mut self,
        kind: &str,
        frame: &mut SiblingFrame,
        span: Span,
        props: Vec<(Cow<'static, str>, PropValue)>,
        orderable: bool,
    ) -> Result<String, WalkError> {
        let naming = self.front_end.type_naming();
        let key = self.keys.next_key();

        let mut properties = make_common_properties(naming, self.filename, span);
        for (name, value) in props {
            properties.insert(name.into_owned(), make_property(naming, value));
        }

        let fact = Fact {
            common_kind: self.front_end.normalizer().common_kind(kind).as_str().to_string(),
            kind: Kind::new(kind, self.front_end.namespace(), orderable),
            parent_key: frame.key().to_string(),
            older_siblings: frame.adopt(&key),
            key: key.clone(),
            properties,
        };
        self.emitter.emit(fact)?;
        self.facts += 1;
        Ok(key)
    }
}

fn is_live(node: &Node) -> bool {
    !node.is_missing() && !node.is_extra() && !node.is_error()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::{CommonKind, KindNormalizer, TypeNaming};
    use crate::parser::treesitter::{field, named_children, parse_tree, text};
    use tree_sitter::Language;

    const COMMON: &[(&str, CommonKind)] = &[("call_expression", CommonKind::Call)];

    /// Statements pass through, calls and identifiers emit, anything else
    /// is unhandled.
    struct CallsOnly;

    impl FrontEnd for CallsOnly {
        fn namespace(&self) -> &'static str {
            "calls"
        }

        fn language_name(&self) -> &'static str {
            "calls"
        }

        fn supported_extensions(&self) -> &[&'static str] {
            &["js"]
        }

        fn grammar_for(&self, _extension: &str) -> Language {
            tree_sitter_javascript::LANGUAGE.into()
        }

        fn shape<'t>(&self, node: Node<'t>, source: &str) -> Shape<'t> {
            match node.kind() {
                "program" | "expression_statement" => {
                    EmitInstructions::skip().children(named_children(&node)).emit()
                }
                "call_expression" => {
                    let args = field(&node, "arguments")
                        .map(|a| named_children(&a))
                        .unwrap_or_default();
                    EmitInstructions::new()
                        .child(field(&node, "function"))
                        .group("args", args)
                        .emit()
                }
                "identifier" => EmitInstructions::new()
                    .prop("name", text(&node, source))
                    .emit(),
                _ => Shape::Unhandled,
            }
        }

        fn rename(&self, native_kind: &str) -> Cow<'static, str> {
            Cow::Owned(native_kind.to_string())
        }

        fn normalizer(&self) -> KindNormalizer {
            KindNormalizer::new(COMMON)
        }

        fn type_naming(&self) -> TypeNaming {
            TypeNaming::JavaScript
        }
    }

    fn walk(source: &str, max_depth: usize) -> (Vec<Fact>, Result<WalkStats, WalkError>) {
        let front_end = CallsOnly;
        let tree = parse_tree(&front_end.grammar_for("js"), "calls", source)
            .unwrap()
            .unwrap();
        let mut keys = KeyManager::new("1").unwrap();
        let mut facts: Vec<Fact> = Vec::new();
        let result = TreeWalker::new(&front_end, source, "./a.js", &mut keys, &mut facts)
            .with_max_depth(max_depth)
            .walk(tree.root_node(), "1_0");
        (facts, result)
    }

    fn names(facts: &[Fact]) -> Vec<&str> {
        facts.iter().filter_map(|f| f.prop("name")).collect()
    }

    #[test]
    fn test_unhandled_subtree_is_pruned_and_counted() {
        let (facts, result) = walk("a + b; c; 1; 2;", usize::MAX);
        let stats = result.unwrap();

        assert_eq!(names(&facts), vec!["c"]);
        assert_eq!(stats.facts, 1);
        // One binary expression and two numbers.
        assert_eq!(stats.unhandled, 3);
    }

    #[test]
    fn test_skipped_nodes_keep_sibling_order() {
        let (facts, result) = walk("a; b; c; d;", usize::MAX);
        assert_eq!(result.unwrap().facts, 4);

        let keys: Vec<&str> = facts.iter().map(|f| f.key.as_str()).collect();
        assert!(facts.iter().all(|f| f.parent_key == "1_0"));
        for (i, fact) in facts.iter().enumerate() {
            assert_eq!(fact.older_siblings, keys[..i].to_vec());
        }
        assert_eq!(facts[3].older_siblings.len(), 3);
    }

    #[test]
    fn test_empty_group_emits_no_container() {
        let (facts, _) = walk("f();", usize::MAX);
        assert!(facts.iter().all(|f| f.kind.kind != "args"));
        assert_eq!(facts.len(), 2);

        let (facts, _) = walk("f(x, y);", usize::MAX);
        let call = &facts[0];
        let args = facts.iter().find(|f| f.kind.kind == "args").unwrap();
        assert_eq!(call.kind.kind, "call_expression");
        assert_eq!(call.common_kind, "call");
        assert_eq!(args.parent_key, call.key);
        assert!(args.kind.orderable);

        let members: Vec<&Fact> = facts.iter().filter(|f| f.parent_key == args.key).collect();
        assert_eq!(members.len(), 2);
        assert!(members.iter().all(|f| f.kind.orderable));
        assert_eq!(members[1].older_siblings, vec![members[0].key.clone()]);
    }

    #[test]
    fn test_walk_is_deterministic() {
        let source = "f(a, g(b)); c; d + e;";
        let (first, first_stats) = walk(source, usize::MAX);
        let (second, second_stats) = walk(source, usize::MAX);
        assert_eq!(first, second);
        assert_eq!(first_stats.unwrap(), second_stats.unwrap());
    }

    #[test]
    fn test_too_deep_reports_partial_stats() {
        let (facts, result) = walk("f(g(h(i(1))));", 4);
        match result {
            Err(WalkError::TooDeep { depth, stats }) => {
                assert_eq!(depth, 4);
                assert!(!facts.is_empty());
                assert_eq!(stats.facts, facts.len());
            }
            other => panic!("expected TooDeep, got {other:?}"),
        }
    }
}
