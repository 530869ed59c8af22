//! # doclib Core
//!
//! Pure decision logic for keeping a documentation corpus consistent:
//! the frontmatter record model, URL canonicalization, the ordered field
//! normalization pipeline, duplicate clustering, staleness classification,
//! and path naming rules.
//!
//! This crate contains no filesystem I/O, YAML parsing, or process exit
//! handling. Every operation is a synchronous function over in-memory
//! values, so callers may fan out over a document collection freely.

pub mod canonical;
pub mod cluster;
pub mod error;
pub mod models;
pub mod normalize;
pub mod paths;
pub mod stale;

pub use error::CoreError;
pub use models::{Breadcrumb, Field, FrontmatterRecord, Tags, Timestamp};
