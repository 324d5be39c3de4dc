//! Generation-tagged node handles.
//!
//! Handles are slotmap keys: a slot index plus a version that is bumped when the
//! slot is freed, so a handle to a destroyed node never aliases a newer node.

use slotmap::new_key_type;

new_key_type! {
    /// Stable reference to a node, distinct from its optional string id.
    pub struct NodeHandle;
}
