use slotmap::new_key_type;

new_key_type! {
    /// Handle of one scheduled tween. Never reused once the tween ends.
    pub struct TweenId;
}
