//! Read entities definitions.

pub mod application;
