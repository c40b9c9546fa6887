pub mod decoy_set;
pub mod fund_targets;
pub mod transaction;
pub mod unspent_output;
