use std::fmt;

use super::recipe::ModifierLevel;

/// Identifier of a node within one operation tree.
///
/// Ids are assigned in pre-order starting at 0 once the tree is final, so the
/// same recipe always yields the same ids.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a leaf stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LeafItem {
    /// The object receiving every modifier.
    Target,
    /// A book carrying exactly one modifier.
    Book(ModifierLevel),
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Leaf {
    pub id: NodeId,
    pub label: String,
    pub item: LeafItem,
}

/// One anvil operation: `consumed` is merged into `kept`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Combine {
    pub id: NodeId,
    pub kept: Box<OpNode>,
    pub consumed: Box<OpNode>,
    /// Level cost of this operation.
    pub cost: u32,
    /// `cost` converted to points.
    pub points: u64,
    /// Prior-work count of the combined output.
    pub prior_work: u32,
    pub label: String,
    /// Display strings of every modifier on the output, kept side first.
    pub modifiers: Vec<String>,
}

/// A node of the binary operation tree produced by the planner.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OpNode {
    Leaf(Leaf),
    Combine(Combine),
}

impl OpNode {
    #[must_use]
    pub fn id(&self) -> NodeId {
        match self {
            OpNode::Leaf(leaf) => leaf.id,
            OpNode::Combine(combine) => combine.id,
        }
    }

    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            OpNode::Leaf(leaf) => &leaf.label,
            OpNode::Combine(combine) => &combine.label,
        }
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self, OpNode::Leaf(_))
    }

    /// Display strings of the modifiers this node carries.
    #[must_use]
    pub fn modifiers(&self) -> Vec<String> {
        match self {
            OpNode::Leaf(Leaf {
                item: LeafItem::Book(m),
                ..
            }) => vec![m.to_string()],
            OpNode::Leaf(_) => Vec::new(),
            OpNode::Combine(combine) => combine.modifiers.clone(),
        }
    }

    /// Every node in pre-order (parent, kept subtree, consumed subtree).
    #[must_use]
    pub fn nodes(&self) -> Vec<&OpNode> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            out.push(node);
            if let OpNode::Combine(combine) = node {
                stack.push(&combine.consumed);
                stack.push(&combine.kept);
            }
        }
        out
    }

    /// Leaves in depth-first order, kept side first.
    #[must_use]
    pub fn leaves(&self) -> Vec<&Leaf> {
        self.nodes()
            .into_iter()
            .filter_map(|node| match node {
                OpNode::Leaf(leaf) => Some(leaf),
                OpNode::Combine(_) => None,
            })
            .collect()
    }

    /// Combine nodes in execution order: children always precede parents.
    #[must_use]
    pub fn steps(&self) -> Vec<&Combine> {
        let mut out = Vec::new();
        collect_steps(self, &mut out);
        out
    }

    #[must_use]
    pub fn find(&self, id: NodeId) -> Option<&OpNode> {
        self.nodes().into_iter().find(|node| node.id() == id)
    }

    pub(crate) fn assign_ids(&mut self) {
        let mut next = 0_u32;
        assign_ids_inner(self, &mut next);
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let pad = "  ".repeat(depth);
        match self {
            OpNode::Leaf(leaf) => writeln!(f, "{pad}{} {}", leaf.id, leaf.label),
            OpNode::Combine(combine) => {
                writeln!(
                    f,
                    "{pad}{} {} <- cost {} [{}]",
                    combine.id,
                    combine.label,
                    combine.cost,
                    combine.modifiers.join(", ")
                )?;
                combine.kept.fmt_indented(f, depth + 1)?;
                combine.consumed.fmt_indented(f, depth + 1)
            }
        }
    }
}

fn collect_steps<'a>(node: &'a OpNode, out: &mut Vec<&'a Combine>) {
    if let OpNode::Combine(combine) = node {
        collect_steps(&combine.kept, out);
        collect_steps(&combine.consumed, out);
        out.push(combine);
    }
}

fn assign_ids_inner(node: &mut OpNode, next: &mut u32) {
    let id = NodeId(*next);
    *next += 1;
    match node {
        OpNode::Leaf(leaf) => leaf.id = id,
        OpNode::Combine(combine) => {
            combine.id = id;
            assign_ids_inner(&mut combine.kept, next);
            assign_ids_inner(&mut combine.consumed, next);
        }
    }
}

impl fmt::Display for OpNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}
