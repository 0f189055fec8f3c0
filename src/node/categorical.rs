use super::{Node, NodeType, TreeNode};
use crate::codec::{read_index, write_index, DataSink, DataSource, Decoder};
use crate::data::Instance;
use crate::errors::NodeError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Multiway split on a categorical attribute.
///
/// The attribute is dictionary encoded: category code `k` is routed to
/// `children[k]`. Codes with no child are unpredictable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoricalNode {
    attr: usize,
    children: Vec<Node>,
}

impl CategoricalNode {
    pub fn new(attr: usize, children: Vec<Node>) -> Self {
        CategoricalNode { attr, children }
    }

    pub fn attr(&self) -> usize {
        self.attr
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub(crate) fn read_payload<R: DataSource + ?Sized>(
        source: &mut R,
        decoder: &Decoder,
        depth: usize,
    ) -> Result<Self, NodeError> {
        let attr = read_index(source, "attr")?;
        let n_children = read_index(source, "child count")?;
        let mut children = Vec::with_capacity(decoder.prealloc(n_children));
        for _ in 0..n_children {
            children.push(decoder.decode_child(source, depth)?);
        }
        Ok(CategoricalNode { attr, children })
    }
}

impl TreeNode for CategoricalNode {
    fn node_type(&self) -> NodeType {
        NodeType::Categorical
    }

    fn classify<I: Instance + ?Sized>(&self, instance: &I) -> Option<usize> {
        let code = instance.categorical(self.attr)?;
        self.children.get(code)?.classify(instance)
    }

    fn nb_nodes(&self) -> u64 {
        1 + self.children.iter().map(|c| c.nb_nodes()).sum::<u64>()
    }

    fn max_depth(&self) -> u64 {
        1 + self.children.iter().map(|c| c.max_depth()).max().unwrap_or(0)
    }

    fn write_payload<S: DataSink + ?Sized>(&self, sink: &mut S) -> Result<(), NodeError> {
        write_index(sink, "attr", self.attr)?;
        write_index(sink, "child count", self.children.len())?;
        for child in &self.children {
            child.encode(sink)?;
        }
        Ok(())
    }

    fn fmt_payload(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{},[", self.attr)?;
        for (i, child) in self.children.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", child)?;
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_way() -> CategoricalNode {
        CategoricalNode::new(1, vec![Node::leaf(0), Node::leaf(1), Node::mock_leaf()])
    }

    #[test]
    fn test_categorical_routing() {
        let node = three_way();
        assert_eq!(node.classify(&vec![9.9, 0.0]), Some(0));
        assert_eq!(node.classify(&vec![9.9, 1.0]), Some(1));
        assert_eq!(node.classify(&vec![9.9, 2.0]), None);
    }

    #[test]
    fn test_categorical_unmapped_value() {
        let node = three_way();
        assert_eq!(node.classify(&vec![0.0, 3.0]), None);
        assert_eq!(node.classify(&vec![0.0, -1.0]), None);
        assert_eq!(node.classify(&vec![0.0, 0.5]), None);
        assert_eq!(node.classify(&vec![0.0]), None);
    }

    #[test]
    fn test_categorical_shape() {
        let node = three_way();
        assert_eq!(node.nb_nodes(), 4);
        assert_eq!(node.max_depth(), 2);
        let empty = CategoricalNode::new(0, Vec::new());
        assert_eq!(empty.nb_nodes(), 1);
        assert_eq!(empty.max_depth(), 1);
        assert_eq!(empty.classify(&vec![0.0]), None);
    }

    #[test]
    fn test_categorical_bytes() {
        let bytes = Node::from(three_way()).to_bytes().unwrap();
        let expected: Vec<u8> = vec![
            0, 0, 0, 3, // tag
            0, 0, 0, 1, // attr
            0, 0, 0, 3, // child count
            0, 0, 0, 1, 0, 0, 0, 0, // LEAF 0
            0, 0, 0, 1, 0, 0, 0, 1, // LEAF 1
            0, 0, 0, 0, // MOCKLEAF
        ];
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_negative_child_count() {
        let mut bytes = 3_i32.to_be_bytes().to_vec();
        bytes.extend_from_slice(&0_i32.to_be_bytes());
        bytes.extend_from_slice(&(-2_i32).to_be_bytes());
        let err = Node::from_bytes(&bytes).unwrap_err();
        assert!(matches!(err, NodeError::InvalidField(ref name, -2) if name == "child count"));
    }

    #[test]
    fn test_forged_child_count() {
        let mut bytes = 3_i32.to_be_bytes().to_vec();
        bytes.extend_from_slice(&0_i32.to_be_bytes());
        bytes.extend_from_slice(&i32::MAX.to_be_bytes());
        bytes.extend_from_slice(&[0, 0, 0, 0]);
        assert!(matches!(Node::from_bytes(&bytes), Err(NodeError::Io(_))));
    }
}
