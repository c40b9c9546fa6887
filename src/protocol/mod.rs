//! protocol-level value types and the fee model.
pub mod amount;
pub mod fee;
pub mod keys;
pub mod mixin;
pub mod payment_id;
