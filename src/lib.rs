//! # docsim
//!
//! A document similarity service. Two documents go in, one score comes out.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐   ┌────────────┐   ┌──────────────┐   ┌──────────┐
//! │  HTTP /   │──▶│ Normalizer │──▶│   Chunked    │──▶│  score   │
//! │   CLI     │   │  (×2 docs) │   │   Scorer     │   │  × 100   │
//! └───────────┘   └────────────┘   └──────┬───────┘   └──────────┘
//!                                         │
//!                                   ┌─────▼──────┐
//!                                   │  Embedder  │
//!                                   │ local/API  │
//!                                   └────────────┘
//! ```
//!
//! The scoring pipeline itself lives in `docsim-core`; this crate adds
//! configuration, embedding backends, the HTTP server, and the CLI.
//!
//! ## Quick Start
//!
//! ```bash
//! docsim serve                          # start HTTP server
//! docsim compare a.txt b.txt            # score two files
//! docsim normalize a.txt                # show normalized text
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`embedding`] | Embedding backends |
//! | [`pipeline`] | Startup-time resource loading |
//! | [`server`] | HTTP server |
//! | [`compare_cmd`] | `compare` / `normalize` commands |

pub mod compare_cmd;
pub mod config;
pub mod embedding;
pub mod pipeline;
pub mod server;
