//! Node
//!
//! A decision tree is a single root [`Node`]. Every node is one of four
//! variants, and every variant honours the same [`TreeNode`] contract:
//! classification, shape statistics and a payload writer. The tagged
//! envelope around the payload lives here, so decoding can dispatch on the
//! tag before it knows which variant it is building.
mod categorical;
mod leaf;
mod numerical;

pub use categorical::CategoricalNode;
pub use leaf::{Leaf, MockLeaf};
pub use numerical::NumericalNode;

use crate::codec::{DataSink, DataSource, Decoder};
use crate::config::{CodecConfig, ModelIO};
use crate::data::Instance;
use crate::errors::NodeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Cursor;

/// Wire discriminant of each node variant.
///
/// The numeric values are the tags written at the front of every encoded node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum NodeType {
    MockLeaf = 0,
    Leaf = 1,
    Numerical = 2,
    Categorical = 3,
}

impl TryFrom<i32> for NodeType {
    type Error = NodeError;

    fn try_from(tag: i32) -> Result<Self, Self::Error> {
        match tag {
            0 => Ok(NodeType::MockLeaf),
            1 => Ok(NodeType::Leaf),
            2 => Ok(NodeType::Numerical),
            3 => Ok(NodeType::Categorical),
            _ => Err(NodeError::UnknownNodeType(tag)),
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            NodeType::MockLeaf => "MOCKLEAF",
            NodeType::Leaf => "LEAF",
            NodeType::Numerical => "NUMERICAL",
            NodeType::Categorical => "CATEGORICAL",
        };
        f.write_str(name)
    }
}

/// Operations every node variant implements.
pub trait TreeNode {
    /// The variant's wire discriminant.
    fn node_type(&self) -> NodeType;

    /// Predict the label of `instance`, `None` if it cannot be predicted.
    fn classify<I: Instance + ?Sized>(&self, instance: &I) -> Option<usize>;

    /// Total number of nodes in the subtree rooted here.
    fn nb_nodes(&self) -> u64;

    /// Number of nodes on the longest root to leaf path, a lone leaf being 1.
    fn max_depth(&self) -> u64;

    /// Write everything that follows the tag.
    fn write_payload<S: DataSink + ?Sized>(&self, sink: &mut S) -> Result<(), NodeError>;

    /// Format the variant specific part of the debug description.
    fn fmt_payload(&self, f: &mut fmt::Formatter) -> fmt::Result;
}

/// A node of a decision tree.
///
/// Internal variants own their children, so a tree can be neither shared nor cyclic.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Node {
    MockLeaf(MockLeaf),
    Leaf(Leaf),
    Numerical(NumericalNode),
    Categorical(CategoricalNode),
}

impl Node {
    pub fn mock_leaf() -> Self {
        Node::MockLeaf(MockLeaf)
    }

    pub fn leaf(label: usize) -> Self {
        Node::Leaf(Leaf::new(label))
    }

    /// Binary split on a numerical attribute, `lo` taking values below `split`.
    pub fn numerical(attr: usize, split: f64, lo: Node, hi: Node) -> Self {
        Node::Numerical(NumericalNode::new(attr, split, lo, hi))
    }

    /// Split on a categorical attribute, category code `k` routing to `children[k]`.
    pub fn categorical(attr: usize, children: Vec<Node>) -> Self {
        Node::Categorical(CategoricalNode::new(attr, children))
    }

    /// Write the node's tag followed by its payload.
    pub fn encode<S: DataSink + ?Sized>(&self, sink: &mut S) -> Result<(), NodeError> {
        sink.write_i32(self.node_type() as i32)?;
        self.write_payload(sink)
    }

    /// Read one node, and all of its descendants, from `source` using the default limits.
    pub fn decode<R: DataSource + ?Sized>(source: &mut R) -> Result<Self, NodeError> {
        Self::decode_with(source, &CodecConfig::default())
    }

    /// Read one node from `source` under the limits in `config`.
    pub fn decode_with<R: DataSource + ?Sized>(source: &mut R, config: &CodecConfig) -> Result<Self, NodeError> {
        Decoder::new(config)?.decode(source)
    }

    /// Encode the node into a fresh buffer.
    pub fn to_bytes(&self) -> Result<Vec<u8>, NodeError> {
        let mut buf = Vec::new();
        self.encode(&mut buf)?;
        Ok(buf)
    }

    /// Decode a node that must span the whole of `bytes`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, NodeError> {
        let mut cursor = Cursor::new(bytes);
        let node = Self::decode(&mut cursor)?;
        let remaining = bytes.len() - cursor.position() as usize;
        if remaining > 0 {
            return Err(NodeError::TrailingBytes(remaining));
        }
        Ok(node)
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::MockLeaf(_) | Node::Leaf(_))
    }
}

impl TreeNode for Node {
    fn node_type(&self) -> NodeType {
        match self {
            Node::MockLeaf(n) => n.node_type(),
            Node::Leaf(n) => n.node_type(),
            Node::Numerical(n) => n.node_type(),
            Node::Categorical(n) => n.node_type(),
        }
    }

    fn classify<I: Instance + ?Sized>(&self, instance: &I) -> Option<usize> {
        match self {
            Node::MockLeaf(n) => n.classify(instance),
            Node::Leaf(n) => n.classify(instance),
            Node::Numerical(n) => n.classify(instance),
            Node::Categorical(n) => n.classify(instance),
        }
    }

    fn nb_nodes(&self) -> u64 {
        match self {
            Node::MockLeaf(n) => n.nb_nodes(),
            Node::Leaf(n) => n.nb_nodes(),
            Node::Numerical(n) => n.nb_nodes(),
            Node::Categorical(n) => n.nb_nodes(),
        }
    }

    fn max_depth(&self) -> u64 {
        match self {
            Node::MockLeaf(n) => n.max_depth(),
            Node::Leaf(n) => n.max_depth(),
            Node::Numerical(n) => n.max_depth(),
            Node::Categorical(n) => n.max_depth(),
        }
    }

    fn write_payload<S: DataSink + ?Sized>(&self, sink: &mut S) -> Result<(), NodeError> {
        match self {
            Node::MockLeaf(n) => n.write_payload(sink),
            Node::Leaf(n) => n.write_payload(sink),
            Node::Numerical(n) => n.write_payload(sink),
            Node::Categorical(n) => n.write_payload(sink),
        }
    }

    fn fmt_payload(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Node::MockLeaf(n) => n.fmt_payload(f),
            Node::Leaf(n) => n.fmt_payload(f),
            Node::Numerical(n) => n.fmt_payload(f),
            Node::Categorical(n) => n.fmt_payload(f),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:", self.node_type())?;
        self.fmt_payload(f)?;
        f.write_str(";")
    }
}

impl From<Leaf> for Node {
    fn from(leaf: Leaf) -> Self {
        Node::Leaf(leaf)
    }
}

impl From<MockLeaf> for Node {
    fn from(leaf: MockLeaf) -> Self {
        Node::MockLeaf(leaf)
    }
}

impl From<NumericalNode> for Node {
    fn from(node: NumericalNode) -> Self {
        Node::Numerical(node)
    }
}

impl From<CategoricalNode> for Node {
    fn from(node: CategoricalNode) -> Self {
        Node::Categorical(node)
    }
}

impl ModelIO for Node {}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_tree(rng: &mut StdRng, depth: usize) -> Node {
        if depth == 0 || rng.gen_bool(0.3) {
            return if rng.gen_bool(0.2) {
                Node::mock_leaf()
            } else {
                Node::leaf(rng.gen_range(0..5))
            };
        }
        if rng.gen_bool(0.5) {
            Node::numerical(
                rng.gen_range(0..4),
                rng.gen_range(-10.0..10.0),
                random_tree(rng, depth - 1),
                random_tree(rng, depth - 1),
            )
        } else {
            let n_children = rng.gen_range(0..4);
            let children = (0..n_children).map(|_| random_tree(rng, depth - 1)).collect();
            Node::categorical(rng.gen_range(0..4), children)
        }
    }

    fn children(node: &Node) -> Vec<&Node> {
        match node {
            Node::MockLeaf(_) | Node::Leaf(_) => Vec::new(),
            Node::Numerical(n) => vec![n.lo(), n.hi()],
            Node::Categorical(n) => n.children().iter().collect(),
        }
    }

    fn check_shape_laws(node: &Node) {
        let kids = children(node);
        if node.is_leaf() {
            assert_eq!(node.nb_nodes(), 1);
            assert_eq!(node.max_depth(), 1);
        } else {
            let count: u64 = kids.iter().map(|c| c.nb_nodes()).sum();
            assert_eq!(node.nb_nodes(), 1 + count);
            let deepest = kids.iter().map(|c| c.max_depth()).max().unwrap_or(0);
            assert_eq!(node.max_depth(), 1 + deepest);
            for c in &kids {
                assert!(node.max_depth() > c.max_depth());
            }
        }
        kids.into_iter().for_each(check_shape_laws);
    }

    #[test]
    fn test_node_type_tags() {
        for tag in 0..4 {
            let t = NodeType::try_from(tag).unwrap();
            assert_eq!(t as i32, tag);
        }
        assert!(matches!(NodeType::try_from(4), Err(NodeError::UnknownNodeType(4))));
        assert!(matches!(NodeType::try_from(-1), Err(NodeError::UnknownNodeType(-1))));
    }

    #[test]
    fn test_node_type_follows_variant() {
        assert_eq!(Node::mock_leaf().node_type(), NodeType::MockLeaf);
        assert_eq!(Node::leaf(1).node_type(), NodeType::Leaf);
        let n = Node::numerical(0, 1.0, Node::leaf(0), Node::leaf(1));
        assert_eq!(n.node_type(), NodeType::Numerical);
        assert_eq!(Node::categorical(0, vec![]).node_type(), NodeType::Categorical);
    }

    #[test]
    fn test_display_envelope() {
        assert_eq!(Node::leaf(3).to_string(), "LEAF:3;");
        assert_eq!(Node::mock_leaf().to_string(), "MOCKLEAF:;");
        let n = Node::numerical(0, 5.5, Node::leaf(1), Node::leaf(2));
        assert_eq!(n.to_string(), "NUMERICAL:0,5.5,LEAF:1;,LEAF:2;;");
        let n = Node::numerical(2, -1.0, Node::leaf(1), Node::leaf(2));
        assert_eq!(n.to_string(), "NUMERICAL:2,-1.0,LEAF:1;,LEAF:2;;");
        let c = Node::categorical(1, vec![Node::leaf(0), Node::mock_leaf()]);
        assert_eq!(c.to_string(), "CATEGORICAL:1,[LEAF:0;,MOCKLEAF:;];");
    }

    #[test]
    fn test_shape_laws_random_trees() {
        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..200 {
            let tree = random_tree(&mut rng, 6);
            check_shape_laws(&tree);
        }
    }

    #[test]
    fn test_round_trip_random_trees() {
        let mut rng = StdRng::seed_from_u64(42);
        let instances: Vec<Vec<f64>> = (0..50)
            .map(|_| (0..4).map(|_| rng.gen_range(-2..12) as f64).collect())
            .collect();
        for _ in 0..100 {
            let tree = random_tree(&mut rng, 5);
            let bytes = tree.to_bytes().unwrap();
            let decoded = Node::from_bytes(&bytes).unwrap();
            assert_eq!(tree, decoded);
            assert_eq!(tree.nb_nodes(), decoded.nb_nodes());
            assert_eq!(tree.max_depth(), decoded.max_depth());
            for x in &instances {
                assert_eq!(tree.classify(x), decoded.classify(x));
            }
        }
    }

    #[test]
    fn test_unknown_tag_constructs_nothing() {
        let mut bytes = 7_i32.to_be_bytes().to_vec();
        bytes.extend_from_slice(&3_i32.to_be_bytes());
        let err = Node::from_bytes(&bytes).unwrap_err();
        assert!(matches!(err, NodeError::UnknownNodeType(7)));
    }

    #[test]
    fn test_trailing_bytes() {
        let mut bytes = Node::leaf(2).to_bytes().unwrap();
        bytes.push(0);
        assert!(matches!(Node::from_bytes(&bytes), Err(NodeError::TrailingBytes(1))));
        // A plain decode leaves the rest of the stream to the caller.
        let mut cursor = Cursor::new(&bytes[..]);
        assert_eq!(Node::decode(&mut cursor).unwrap(), Node::leaf(2));
        assert_eq!(cursor.position(), 8);
    }

    #[test]
    fn test_json_dump() {
        let tree = Node::numerical(2, -0.5, Node::leaf(4), Node::categorical(0, vec![Node::mock_leaf()]));
        let json = serde_json::to_string(&tree).unwrap();
        let back: Node = serde_json::from_str(&json).unwrap();
        assert_eq!(tree, back);
    }
}
