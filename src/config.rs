//! Configuration
//!
//! Limits applied while decoding node streams, and the JSON IO shared by
//! every serializable model type in the crate.
use crate::constants::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_PREALLOC};
use crate::errors::NodeError;
use serde::{de::DeserializeOwned, de::Error, Deserialize, Deserializer, Serialize, Serializer};
use std::fs;
use std::path::Path;

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}
fn default_max_prealloc() -> usize {
    DEFAULT_MAX_PREALLOC
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonFloat {
    Number(f64),
    Text(String),
}

/// Write a float that JSON has no number for (NaN, infinities) as a string.
pub(crate) fn serialize_float<S>(v: &f64, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if v.is_finite() {
        s.serialize_f64(*v)
    } else {
        s.serialize_str(&v.to_string())
    }
}

/// Read a float written by `serialize_float`, a `null` being NaN.
pub(crate) fn parse_float<'de, D>(d: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<JsonFloat>::deserialize(d)? {
        None => Ok(f64::NAN),
        Some(JsonFloat::Number(v)) => Ok(v),
        Some(JsonFloat::Text(t)) => t.parse::<f64>().map_err(D::Error::custom),
    }
}

/// Decoder limits.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CodecConfig {
    /// Deepest node nesting a stream may contain, the root being at depth 1.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Most children reserved up front for a categorical node, whatever count the stream declares.
    #[serde(default = "default_max_prealloc")]
    pub max_prealloc: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        CodecConfig {
            max_depth: DEFAULT_MAX_DEPTH,
            max_prealloc: DEFAULT_MAX_PREALLOC,
        }
    }
}

impl CodecConfig {
    /// Check the limits can decode at least a single node.
    pub fn validate(&self) -> Result<(), NodeError> {
        if self.max_depth == 0 {
            return Err(NodeError::InvalidParameter(
                "max_depth".to_string(),
                "a positive depth".to_string(),
                self.max_depth.to_string(),
            ));
        }
        Ok(())
    }

    /// Read and validate a configuration from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, NodeError> {
        let config = Self::load_json(path)?;
        config.validate()?;
        Ok(config)
    }
}

/// IO
pub trait ModelIO: Serialize + DeserializeOwned + Sized {
    /// Save as a json object to a file.
    ///
    /// * `path` - Path to save to.
    fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<(), NodeError> {
        fs::write(path, self.json_dump()?).map_err(|e| NodeError::UnableToWrite(e.to_string()))
    }

    /// Dump as a json object
    fn json_dump(&self) -> Result<String, NodeError> {
        serde_json::to_string(self).map_err(|e| NodeError::UnableToWrite(e.to_string()))
    }

    /// Load from a json string
    ///
    /// * `json_str` - String object, which can be serialized to json.
    fn from_json(json_str: &str) -> Result<Self, NodeError> {
        serde_json::from_str::<Self>(json_str).map_err(|e| NodeError::UnableToRead(e.to_string()))
    }

    /// Load from a path to a json object.
    ///
    /// * `path` - Path to load from.
    fn load_json<P: AsRef<Path>>(path: P) -> Result<Self, NodeError> {
        let json_str = fs::read_to_string(path).map_err(|e| NodeError::UnableToRead(e.to_string()))?;
        Self::from_json(&json_str)
    }
}

impl ModelIO for CodecConfig {}
