//! guise-scene-core: the node store behind a GUI component.
//!
//! A store owns every node record of one GUI instance: generation-tagged
//! handles, optional string ids, typed property slots addressed by
//! `PropertyPath`, and the parent/child hierarchy that fixes draw order.
//! Animation and scripting live in sibling crates and reach nodes only
//! through this API.

pub mod config;
pub mod error;
pub mod handle;
pub mod node;
pub mod property_path;
pub mod store;
pub mod template;
pub mod value;

pub use config::SceneConfig;
pub use error::SceneError;
pub use handle::NodeHandle;
pub use node::{Clamp, Node, NodeKind, PropertyDef};
pub use property_path::{Component, PropertyPath};
pub use store::NodeStore;
pub use template::NodeTemplate;
pub use value::{Value, ValueKind};
