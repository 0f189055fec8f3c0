use super::{NodeType, TreeNode};
use crate::codec::{read_index, write_index, DataSink, DataSource};
use crate::data::Instance;
use crate::errors::NodeError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Terminal node predicting a fixed label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leaf {
    label: usize,
}

impl Leaf {
    pub fn new(label: usize) -> Self {
        Leaf { label }
    }

    pub fn label(&self) -> usize {
        self.label
    }

    pub(crate) fn read_payload<R: DataSource + ?Sized>(source: &mut R) -> Result<Self, NodeError> {
        let label = read_index(source, "label")?;
        Ok(Leaf { label })
    }
}

impl TreeNode for Leaf {
    fn node_type(&self) -> NodeType {
        NodeType::Leaf
    }

    #[inline]
    fn classify<I: Instance + ?Sized>(&self, _instance: &I) -> Option<usize> {
        Some(self.label)
    }

    fn nb_nodes(&self) -> u64 {
        1
    }

    fn max_depth(&self) -> u64 {
        1
    }

    fn write_payload<S: DataSink + ?Sized>(&self, sink: &mut S) -> Result<(), NodeError> {
        write_index(sink, "label", self.label)
    }

    fn fmt_payload(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}

/// Terminal node without a label. It never predicts, and carries no payload.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockLeaf;

impl MockLeaf {
    pub(crate) fn read_payload<R: DataSource + ?Sized>(_source: &mut R) -> Result<Self, NodeError> {
        Ok(MockLeaf)
    }
}

impl TreeNode for MockLeaf {
    fn node_type(&self) -> NodeType {
        NodeType::MockLeaf
    }

    #[inline]
    fn classify<I: Instance + ?Sized>(&self, _instance: &I) -> Option<usize> {
        None
    }

    fn nb_nodes(&self) -> u64 {
        1
    }

    fn max_depth(&self) -> u64 {
        1
    }

    fn write_payload<S: DataSink + ?Sized>(&self, _sink: &mut S) -> Result<(), NodeError> {
        Ok(())
    }

    fn fmt_payload(&self, _f: &mut fmt::Formatter) -> fmt::Result {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;

    #[test]
    fn test_leaf_ignores_instance() {
        let leaf = Leaf::new(3);
        assert_eq!(leaf.classify(&vec![1.0, 2.0]), Some(3));
        assert_eq!(leaf.classify(&Vec::<f64>::new()), Some(3));
        assert_eq!(leaf.nb_nodes(), 1);
        assert_eq!(leaf.max_depth(), 1);
    }

    #[test]
    fn test_mock_leaf_never_predicts() {
        let leaf = MockLeaf;
        assert_eq!(leaf.classify(&vec![0.0]), None);
        assert_eq!(leaf.nb_nodes(), 1);
        assert_eq!(leaf.max_depth(), 1);
    }

    #[test]
    fn test_leaf_bytes() {
        let bytes = Node::leaf(3).to_bytes().unwrap();
        assert_eq!(bytes, vec![0, 0, 0, 1, 0, 0, 0, 3]);
        let bytes = Node::mock_leaf().to_bytes().unwrap();
        assert_eq!(bytes, vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_negative_label_rejected() {
        let mut bytes = 1_i32.to_be_bytes().to_vec();
        bytes.extend_from_slice(&(-4_i32).to_be_bytes());
        let err = Node::from_bytes(&bytes).unwrap_err();
        assert!(matches!(err, NodeError::InvalidField(ref name, -4) if name == "label"));
    }

    #[test]
    fn test_truncated_label() {
        let bytes = vec![0, 0, 0, 1, 0, 0];
        let err = Node::from_bytes(&bytes).unwrap_err();
        match err {
            NodeError::Io(e) => assert_eq!(e.kind(), std::io::ErrorKind::UnexpectedEof),
            other => panic!("unexpected error {:?}", other),
        }
    }
}
