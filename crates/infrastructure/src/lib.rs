//! Banwatch Infrastructure Layer
pub mod dns;
pub mod hosts;
