use super::{Node, NodeType, TreeNode};
use crate::codec::{read_index, write_index, DataSink, DataSource, Decoder};
use crate::config::{parse_float, serialize_float};
use crate::data::Instance;
use crate::errors::NodeError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Binary split on a numerical attribute.
///
/// Values strictly below `split` go to `lo`, everything else to `hi`.
/// A missing or NaN value cannot be routed, and is unpredictable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NumericalNode {
    attr: usize,
    #[serde(serialize_with = "serialize_float", deserialize_with = "parse_float")]
    split: f64,
    lo: Box<Node>,
    hi: Box<Node>,
}

impl NumericalNode {
    pub fn new(attr: usize, split: f64, lo: Node, hi: Node) -> Self {
        NumericalNode {
            attr,
            split,
            lo: Box::new(lo),
            hi: Box::new(hi),
        }
    }

    pub fn attr(&self) -> usize {
        self.attr
    }

    pub fn split(&self) -> f64 {
        self.split
    }

    pub fn lo(&self) -> &Node {
        &self.lo
    }

    pub fn hi(&self) -> &Node {
        &self.hi
    }

    /// The child an attribute value is routed to.
    #[inline]
    pub fn child_for(&self, value: f64) -> Option<&Node> {
        if value.is_nan() {
            None
        } else if value < self.split {
            Some(self.lo.as_ref())
        } else {
            Some(self.hi.as_ref())
        }
    }

    pub(crate) fn read_payload<R: DataSource + ?Sized>(
        source: &mut R,
        decoder: &Decoder,
        depth: usize,
    ) -> Result<Self, NodeError> {
        let attr = read_index(source, "attr")?;
        let split = source.read_f64()?;
        let lo = decoder.decode_child(source, depth)?;
        let hi = decoder.decode_child(source, depth)?;
        Ok(NumericalNode::new(attr, split, lo, hi))
    }
}

impl TreeNode for NumericalNode {
    fn node_type(&self) -> NodeType {
        NodeType::Numerical
    }

    fn classify<I: Instance + ?Sized>(&self, instance: &I) -> Option<usize> {
        let value = instance.numerical(self.attr)?;
        self.child_for(value)?.classify(instance)
    }

    fn nb_nodes(&self) -> u64 {
        1 + self.lo.nb_nodes() + self.hi.nb_nodes()
    }

    fn max_depth(&self) -> u64 {
        1 + self.lo.max_depth().max(self.hi.max_depth())
    }

    fn write_payload<S: DataSink + ?Sized>(&self, sink: &mut S) -> Result<(), NodeError> {
        write_index(sink, "attr", self.attr)?;
        sink.write_f64(self.split)?;
        self.lo.encode(sink)?;
        self.hi.encode(sink)
    }

    fn fmt_payload(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{},{:?},{},{}", self.attr, self.split, self.lo, self.hi)
    }
}
