//! Automaton graph model.
//!
//! Nodes live in an arena owned by [`Automaton`]; transitions reference them
//! through stable [`NodeId`] indices. A graph is therefore one self-contained
//! value: a new detection pass builds a fresh [`Automaton`] and replaces the
//! previous one wholesale, and no transition can outlive the nodes it points at.

use serde::{Deserialize, Serialize};

/// Placeholder symbol assigned to every detected transition.
///
/// Label recognition is out of scope for the detector, so all transitions
/// carry this symbol until an editor assigns real ones.
pub const PLACEHOLDER_SYMBOL: &str = "a";

/// Stable index of a node within one [`Automaton`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

/// A detected automaton state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Sequential label assigned at acceptance time ("q0", "q1", ...).
    pub name: String,
    /// Circle center x in image pixel coordinates.
    pub x: f32,
    /// Circle center y in image pixel coordinates.
    pub y: f32,
    /// Initial-state flag. Modeled but never set by the detector.
    pub is_initial: bool,
    /// Accepting-state flag. Modeled but never set by the detector.
    pub is_final: bool,
}

impl Node {
    /// Create a node at a detected circle center with both flags cleared.
    pub fn at(name: impl Into<String>, x: f32, y: f32) -> Self {
        Self {
            name: name.into(),
            x,
            y,
            is_initial: false,
            is_final: false,
        }
    }
}

/// A directed transition between two distinct nodes of the same graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// Source node index.
    pub from: NodeId,
    /// Target node index.
    pub to: NodeId,
    /// Transition symbol; always [`PLACEHOLDER_SYMBOL`] from the detector.
    pub symbol: String,
}

impl Transition {
    /// Build a transition carrying the placeholder symbol.
    pub fn placeholder(from: NodeId, to: NodeId) -> Self {
        Self {
            from,
            to,
            symbol: PLACEHOLDER_SYMBOL.to_owned(),
        }
    }
}

/// An assembled automaton: node arena plus transitions indexing into it.
///
/// Invariants (upheld by the detectors, debug-asserted here): every
/// transition's endpoints index into the node arena and `from != to`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Automaton {
    nodes: Vec<Node>,
    transitions: Vec<Transition>,
}

impl Automaton {
    /// Assemble a graph from detected nodes and transitions.
    pub fn new(nodes: Vec<Node>, transitions: Vec<Transition>) -> Self {
        debug_assert!(
            transitions
                .iter()
                .all(|t| t.from.0 < nodes.len() && t.to.0 < nodes.len() && t.from != t.to),
            "transition endpoints must be distinct nodes of this graph"
        );
        Self { nodes, transitions }
    }

    /// Nodes in detection order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Transitions in detection order.
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Resolve a node index.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// True when no nodes were detected.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assembles_and_resolves_ids() {
        let nodes = vec![Node::at("q0", 10.0, 20.0), Node::at("q1", 30.0, 40.0)];
        let transitions = vec![Transition::placeholder(NodeId(0), NodeId(1))];
        let graph = Automaton::new(nodes, transitions);

        assert_eq!(graph.nodes().len(), 2);
        assert_eq!(graph.transitions().len(), 1);
        let t = &graph.transitions()[0];
        assert_eq!(graph.node(t.from).name, "q0");
        assert_eq!(graph.node(t.to).name, "q1");
        assert_eq!(t.symbol, PLACEHOLDER_SYMBOL);
    }

    #[test]
    fn detector_defaults_leave_flags_cleared() {
        let node = Node::at("q0", 0.0, 0.0);
        assert!(!node.is_initial);
        assert!(!node.is_final);
    }

    #[test]
    fn empty_graph_reports_empty() {
        assert!(Automaton::default().is_empty());
        assert!(!Automaton::new(vec![Node::at("q0", 1.0, 1.0)], Vec::new()).is_empty());
    }
}
