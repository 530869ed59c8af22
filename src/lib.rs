//! # doclib
//!
//! Integrity checks and auto-fixes for a documentation corpus whose
//! documents carry YAML frontmatter.
//!
//! The pure logic (URL canonicalization, normalization rules, duplicate
//! clustering, staleness, path rules) lives in `doclib-core`. This crate
//! adds the filesystem side: config, discovery, frontmatter I/O, and one
//! module per CLI command.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   ┌──────────────┐   ┌──────────────┐
//! │ Discovery  │──▶│ Frontmatter  │──▶│ doclib-core  │
//! │ walk+glob  │   │ YAML ⇄ record│   │ pure checks  │
//! └────────────┘   └──────────────┘   └──────┬───────┘
//!                                           │
//!                                           ▼
//!                                   ┌──────────────┐
//!                                   │ Outcome      │
//!                                   │ human / JSON │
//!                                   └──────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! doclib fix --dry-run          # preview frontmatter fixes
//! doclib fix                    # apply them
//! doclib check                  # validate + paths + duplicates (+ sources)
//! doclib stale --days 90 --report stale.md
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`discover`] | Document discovery under the sources root |
//! | [`frontmatter`] | Frontmatter split, parse, and rewrite |
//! | [`corpus`] | Load every document, collecting parse failures |
//! | [`report`] | Findings, outcomes, output format |
//! | [`fix`] | `doclib fix` |
//! | [`duplicates`] | `doclib duplicates` |
//! | [`stale`] | `doclib stale` |
//! | [`paths`] | `doclib paths` |
//! | [`validate`] | `doclib validate` |
//! | [`sources`] | `doclib sources` |
//! | [`stats`] | `doclib stats` |
//! | [`check`] | `doclib check` |

pub mod check;
pub mod config;
pub mod corpus;
pub mod discover;
pub mod duplicates;
pub mod fix;
pub mod frontmatter;
pub mod paths;
pub mod report;
pub mod sources;
pub mod stale;
pub mod stats;
pub mod validate;
