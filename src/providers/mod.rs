//! Implementations of the PV client contract that ship with this crate

pub mod local;
pub use local::{LocalPv, LocalPvError, LocalPvs, PutStatus};
