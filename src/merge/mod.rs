//! Structural merge of configuration fragments
//!
//! The default composition joins fragments as text. When fragments are
//! merged structurally instead, each one is parsed into a document tree and
//! folded into the accumulated document. The logic for each document format
//! lives in its own submodule.
//!
//! ## Supported Formats
//!
//! - YAML (yaml.rs) - pre-commit and yamllint configuration

pub mod yaml;
