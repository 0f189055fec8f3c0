mod predict;

// Modules
pub mod codec;
pub mod config;
pub mod constants;
pub mod data;
pub mod errors;
pub mod forest;
pub mod node;

// Individual classes, and functions
pub use config::{CodecConfig, ModelIO};
pub use data::{Instance, Matrix};
pub use errors::NodeError;
pub use forest::DecisionForest;
pub use node::{Node, NodeType, TreeNode};
