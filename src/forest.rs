//! Forest
//!
//! A collection of decision trees voting on a label. Built on nothing but
//! the node contract, it is the reference consumer of [`Node`].
use crate::codec::{read_index, write_index, DataSink, DataSource, Decoder};
use crate::config::{CodecConfig, ModelIO};
use crate::data::{Instance, Matrix};
use crate::errors::NodeError;
use crate::node::{Node, TreeNode};
use log::info;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Cursor, Write};
use std::path::Path;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DecisionForest {
    trees: Vec<Node>,
}

impl DecisionForest {
    pub fn new(trees: Vec<Node>) -> Self {
        DecisionForest { trees }
    }

    pub fn trees(&self) -> &[Node] {
        &self.trees
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    /// Majority vote of the trees able to predict `instance`.
    ///
    /// Ties go to the smallest label. `None` when no tree predicts.
    pub fn classify<I: Instance + ?Sized>(&self, instance: &I) -> Option<usize> {
        let mut votes: BTreeMap<usize, usize> = BTreeMap::new();
        for label in self.trees.iter().filter_map(|t| t.classify(instance)) {
            *votes.entry(label).or_insert(0) += 1;
        }
        let mut best: Option<(usize, usize)> = None;
        for (label, count) in votes {
            match best {
                Some((_, c)) if c >= count => {}
                _ => best = Some((label, count)),
            }
        }
        best.map(|(label, _)| label)
    }

    /// Classify every row of `data`.
    ///
    /// * `parallel` - Spread the rows over the rayon thread pool.
    pub fn predict(&self, data: &Matrix<f64>, parallel: bool) -> Vec<Option<usize>> {
        if parallel {
            data.index.par_iter().map(|i| self.classify(&data.row(*i))).collect()
        } else {
            data.index.iter().map(|i| self.classify(&data.row(*i))).collect()
        }
    }

    /// Total number of nodes over all the trees.
    pub fn nb_nodes(&self) -> u64 {
        self.trees.iter().map(|t| t.nb_nodes()).sum()
    }

    pub fn mean_nb_nodes(&self) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        self.nb_nodes() as f64 / self.trees.len() as f64
    }

    pub fn mean_max_depth(&self) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        let sum: u64 = self.trees.iter().map(|t| t.max_depth()).sum();
        sum as f64 / self.trees.len() as f64
    }

    /// Write the number of trees, then every tree's node encoding.
    pub fn encode<S: DataSink + ?Sized>(&self, sink: &mut S) -> Result<(), NodeError> {
        write_index(sink, "tree count", self.trees.len())?;
        for tree in &self.trees {
            tree.encode(sink)?;
        }
        Ok(())
    }

    pub fn decode<R: DataSource + ?Sized>(source: &mut R) -> Result<Self, NodeError> {
        Self::decode_with(source, &CodecConfig::default())
    }

    pub fn decode_with<R: DataSource + ?Sized>(source: &mut R, config: &CodecConfig) -> Result<Self, NodeError> {
        let decoder = Decoder::new(config)?;
        let n_trees = read_index(source, "tree count")?;
        let mut trees = Vec::with_capacity(decoder.prealloc(n_trees));
        for _ in 0..n_trees {
            trees.push(decoder.decode(source)?);
        }
        Ok(DecisionForest { trees })
    }

    /// Decode a forest that must span the whole of `bytes`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, NodeError> {
        let mut cursor = Cursor::new(bytes);
        let forest = Self::decode(&mut cursor)?;
        let remaining = bytes.len() - cursor.position() as usize;
        if remaining > 0 {
            return Err(NodeError::TrailingBytes(remaining));
        }
        Ok(forest)
    }

    /// Encode and flush the forest into `writer`, any I/O failure being a write error.
    fn write_forest<W: Write>(&self, mut writer: W) -> Result<(), NodeError> {
        self.encode(&mut writer).map_err(|e| match e {
            NodeError::Io(e) => NodeError::UnableToWrite(e.to_string()),
            e => e,
        })?;
        writer.flush().map_err(|e| NodeError::UnableToWrite(e.to_string()))
    }

    /// Save the forest in the binary node format.
    ///
    /// * `path` - Path to save the forest to.
    pub fn save_forest<P: AsRef<Path>>(&self, path: P) -> Result<(), NodeError> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| NodeError::UnableToWrite(e.to_string()))?;
        self.write_forest(BufWriter::new(file))?;
        info!(
            "Saved forest of {} trees, {} nodes, to {}.",
            self.trees.len(),
            self.nb_nodes(),
            path.display()
        );
        Ok(())
    }

    /// Load a forest saved with [`DecisionForest::save_forest`].
    ///
    /// * `path` - Path to load the forest from.
    pub fn load_forest<P: AsRef<Path>>(path: P) -> Result<Self, NodeError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| NodeError::UnableToRead(e.to_string()))?;
        let forest = Self::from_bytes(&bytes)?;
        info!(
            "Loaded forest of {} trees, mean depth {:.2}, from {}.",
            forest.len(),
            forest.mean_max_depth(),
            path.display()
        );
        Ok(forest)
    }
}

impl ModelIO for DecisionForest {}
