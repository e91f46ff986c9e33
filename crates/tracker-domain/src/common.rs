//! Shared traits and amount helpers for tracked entities.

/// Converts an entity into a user-facing display label.
pub trait Displayable {
    fn display_label(&self) -> String;
}

/// Tolerance used when comparing monetary amounts held as `f64`.
pub const AMOUNT_EPSILON: f64 = 0.005;

/// Returns `true` when two amounts are equal to within half a cent.
pub fn amounts_match(left: f64, right: f64) -> bool {
    (left - right).abs() < AMOUNT_EPSILON
}
