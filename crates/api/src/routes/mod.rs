//! HTTP Routes

pub mod posture;
