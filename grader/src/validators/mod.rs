//! Per-file rubric validators.

pub mod css;
pub mod html;
