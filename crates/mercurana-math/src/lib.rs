//! Mathematical primitives for the Mercurana N-body core.

pub mod eos;
pub mod roots;
pub mod switching;
