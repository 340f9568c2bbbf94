//! Emission instructions produced by a front end's shaper.

use std::borrow::Cow;

use tree_sitter::Node;

use crate::facts::PropValue;

/// What the walker should do with one native node.
#[derive(Debug)]
pub enum Shape<'t> {
    /// Emit (or pass through) the node as described.
    Emit(EmitInstructions<'t>),
    /// Known node with no facts of its own and no descendants worth walking.
    Elide,
    /// No shaper entry; the subtree is pruned and the kind reported.
    Unhandled,
}

/// One child slot, visited in declaration order.
#[derive(Debug)]
pub enum Slot<'t> {
    /// Walked directly under the current fact.
    Node(Node<'t>),
    /// Walked under a synthetic container fact named `name`.
    Group {
        name: &'static str,
        nodes: Vec<Node<'t>>,
        keep_when_empty: bool,
    },
}

#[derive(Debug, Default)]
pub struct EmitInstructions<'t> {
    /// Walk the children under the incoming parent without a fact for this node.
    pub skip_emit: bool,
    /// Overrides the front end's rename table for this node.
    pub kind: Option<&'static str>,
    pub props: Vec<(Cow<'static, str>, PropValue)>,
    pub children: Vec<Slot<'t>>,
    /// Position among siblings is significant.
    pub positional: bool,
}

impl<'t> EmitInstructions<'t> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pass-through wrapper: children are walked, nothing is emitted.
    pub fn skip() -> Self {
        Self {
            skip_emit: true,
            ..Self::default()
        }
    }

    pub fn kind(mut self, kind: &'static str) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn prop(mut self, name: impl Into<Cow<'static, str>>, value: impl Into<PropValue>) -> Self {
        self.props.push((name.into(), value.into()));
        self
    }

    /// Direct child; `None` is dropped silently.
    pub fn child(mut self, node: Option<Node<'t>>) -> Self {
        if let Some(node) = node {
            self.children.push(Slot::Node(node));
        }
        self
    }

    pub fn children(mut self, nodes: impl IntoIterator<Item = Node<'t>>) -> Self {
        self.children.extend(nodes.into_iter().map(Slot::Node));
        self
    }

    /// Named group, omitted when it has no live members.
    pub fn group(self, name: &'static str, nodes: impl IntoIterator<Item = Node<'t>>) -> Self {
        self.push_group(name, nodes, false)
    }

    /// Named group emitted as a container even when empty.
    pub fn group_kept(self, name: &'static str, nodes: impl IntoIterator<Item = Node<'t>>) -> Self {
        self.push_group(name, nodes, true)
    }

    pub fn positional(mut self) -> Self {
        self.positional = true;
        self
    }

    pub fn emit(self) -> Shape<'t> {
        Shape::Emit(self)
    }

    fn push_group(
        mut self,
        name: &'static str,
        nodes: impl IntoIterator<Item = Node<'t>>,
        keep_when_empty: bool,
    ) -> Self {
        self.children.push(Slot::Group {
            name,
            nodes: nodes.into_iter().collect(),
            keep_when_empty,
        });
        self
    }
}
