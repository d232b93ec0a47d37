//! # Paper Harness
//!
//! Topic-scoped arXiv paper metadata stores and PDF text extraction,
//! exposed as tools over HTTP and MCP.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────────┐   ┌─────────────────────────┐
//! │  arXiv   │──▶│ Topic search │──▶│ <root>/<topic>/         │
//! │  (Atom)  │   │  normalize   │   │   papers_info.json      │
//! └──────────┘   └──────────────┘   └───────────┬─────────────┘
//!                                               │ scan all topics
//!                                               ▼
//!                                        ┌─────────────┐
//!                                        │  Resolver   │
//!                                        └─────────────┘
//!
//! ┌──────────┐   ┌──────────────┐   ┌──────────┐
//! │ file.pdf │──▶│  Extractor   │──▶│ file.txt │
//! └──────────┘   └──────────────┘   └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! papers search "quantum computing" --max-results 5
//! papers info 2301.07041v1
//! papers extract ./downloads/2301.07041v1.pdf
//! papers serve mcp
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`error`] | Library error type |
//! | [`models`] | `SearchHit` and `PaperRecord` |
//! | [`store`] | Per-topic JSON stores and merge |
//! | [`arxiv`] | `PaperSource` trait and the arXiv client |
//! | [`search`] | Topic search: provider → records → store |
//! | [`resolve`] | Cross-topic lookup by paper id |
//! | [`extract`] | PDF → text extraction |
//! | [`topics`] | Topic store listing |
//! | [`traits`] | `Tool` trait, built-in tools, registry, parameter validation |
//! | [`server`] | HTTP tool API and MCP endpoint (Axum) |
//! | [`mcp`] | MCP protocol bridge |

pub mod arxiv;
pub mod config;
pub mod error;
pub mod extract;
pub mod mcp;
pub mod models;
pub mod resolve;
pub mod search;
pub mod server;
pub mod store;
pub mod topics;
pub mod traits;

pub use arxiv::{ArxivClient, PaperSource};
pub use error::PaperError;
pub use models::{PaperRecord, SearchHit};
pub use store::PaperStore;
pub use traits::{Tool, ToolContext, ToolRegistry};
