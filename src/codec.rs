//! Codec
//!
//! Byte level primitives of the node wire format, and the decoder that
//! dispatches on the type tag.
//!
//! Every node is written as its tag (a big-endian `i32`) followed by the
//! variant's payload, children embedded recursively. Integers are 4 byte
//! and floats 8 byte IEEE-754, both big-endian, so the stream is readable by
//! any `DataInput` style reader. There is no header, version or length
//! prefix: the caller positions the source and knows where the stream ends.
use crate::config::CodecConfig;
use crate::errors::NodeError;
use crate::node::{CategoricalNode, Leaf, MockLeaf, Node, NodeType, NumericalNode, TreeNode};
use log::{debug, log_enabled, warn, Level};
use std::io::{Read, Write};

/// Sequential sink for the wire primitives.
pub trait DataSink {
    fn write_i32(&mut self, v: i32) -> Result<(), NodeError>;
    fn write_f64(&mut self, v: f64) -> Result<(), NodeError>;
}

/// Sequential source for the wire primitives.
///
/// A source that runs dry mid value fails with an `UnexpectedEof` I/O error.
pub trait DataSource {
    fn read_i32(&mut self) -> Result<i32, NodeError>;
    fn read_f64(&mut self) -> Result<f64, NodeError>;
}

impl<W: Write + ?Sized> DataSink for W {
    #[inline]
    fn write_i32(&mut self, v: i32) -> Result<(), NodeError> {
        self.write_all(&v.to_be_bytes())?;
        Ok(())
    }

    #[inline]
    fn write_f64(&mut self, v: f64) -> Result<(), NodeError> {
        self.write_all(&v.to_be_bytes())?;
        Ok(())
    }
}

impl<R: Read + ?Sized> DataSource for R {
    #[inline]
    fn read_i32(&mut self) -> Result<i32, NodeError> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok(i32::from_be_bytes(buf))
    }

    #[inline]
    fn read_f64(&mut self) -> Result<f64, NodeError> {
        let mut buf = [0u8; 8];
        self.read_exact(&mut buf)?;
        Ok(f64::from_be_bytes(buf))
    }
}

/// Write a non-negative index (attribute, label, count) as an `i32`.
pub(crate) fn write_index<S: DataSink + ?Sized>(sink: &mut S, field: &str, v: usize) -> Result<(), NodeError> {
    let v = i32::try_from(v).map_err(|_| NodeError::InvalidField(field.to_string(), v as i64))?;
    sink.write_i32(v)
}

/// Read an `i32` that must be a non-negative index.
pub(crate) fn read_index<R: DataSource + ?Sized>(source: &mut R, field: &str) -> Result<usize, NodeError> {
    let v = source.read_i32()?;
    usize::try_from(v).map_err(|_| NodeError::InvalidField(field.to_string(), i64::from(v)))
}

/// Tag dispatching decoder.
///
/// Tracks the nesting depth while it recurses, and refuses streams nested
/// deeper than `max_depth` rather than exhausting the call stack.
#[derive(Clone, Copy, Debug)]
pub struct Decoder {
    max_depth: usize,
    max_prealloc: usize,
}

impl Decoder {
    /// Build a decoder from validated limits.
    pub fn new(config: &CodecConfig) -> Result<Self, NodeError> {
        config.validate()?;
        Ok(Decoder {
            max_depth: config.max_depth,
            max_prealloc: config.max_prealloc,
        })
    }

    /// Decode one complete node from `source`.
    pub fn decode<R: DataSource + ?Sized>(&self, source: &mut R) -> Result<Node, NodeError> {
        let node = self.decode_node(source, 1)?;
        if log_enabled!(Level::Debug) {
            debug!("Decoded {} node tree of depth {}.", node.nb_nodes(), node.max_depth());
        }
        Ok(node)
    }

    /// Decode a child of a node sitting at `parent_depth`.
    pub(crate) fn decode_child<R: DataSource + ?Sized>(
        &self,
        source: &mut R,
        parent_depth: usize,
    ) -> Result<Node, NodeError> {
        self.decode_node(source, parent_depth + 1)
    }

    /// Capacity to reserve for a declared number of children.
    pub(crate) fn prealloc(&self, declared: usize) -> usize {
        declared.min(self.max_prealloc)
    }

    fn decode_node<R: DataSource + ?Sized>(&self, source: &mut R, depth: usize) -> Result<Node, NodeError> {
        if depth > self.max_depth {
            warn!("Rejecting node stream nested deeper than {} levels.", self.max_depth);
            return Err(NodeError::DepthLimitExceeded(self.max_depth));
        }
        let node = match NodeType::try_from(source.read_i32()?)? {
            NodeType::MockLeaf => Node::MockLeaf(MockLeaf::read_payload(source)?),
            NodeType::Leaf => Node::Leaf(Leaf::read_payload(source)?),
            NodeType::Numerical => Node::Numerical(NumericalNode::read_payload(source, self, depth)?),
            NodeType::Categorical => Node::Categorical(CategoricalNode::read_payload(source, self, depth)?),
        };
        Ok(node)
    }
}

impl Default for Decoder {
    fn default() -> Self {
        let config = CodecConfig::default();
        Decoder {
            max_depth: config.max_depth,
            max_prealloc: config.max_prealloc,
        }
    }
}
