//! # Refrain
//!
//! A search-relevance layer for song lookup, sitting in front of an
//! Elasticsearch-compatible full-text backend.
//!
//! Given a free-text query, Refrain decides whether it reads as a
//! title/artist lookup or a lyric fragment, selects a matching relevance
//! configuration (field boosts, match strictness, score cutoff), and folds
//! a view-count popularity signal into the text score so well-known
//! originals rank above obscure covers.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────┐   ┌──────────────┐   ┌─────────────────┐   ┌───────────────┐
//! │  query  │──▶│    intent    │──▶│ scoring profile │──▶│ SearchBackend │
//! │ string  │   │  classifier  │   │  + popularity   │   │ (Elasticsearch)│
//! └─────────┘   └──────────────┘   └─────────────────┘   └──────┬────────┘
//!                                                               │
//!                                              ranked SongResult list
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Song document and result types |
//! | [`intent`] | Query-intent classification |
//! | [`scoring`] | Scoring profiles and popularity combination |
//! | [`backend`] | Search backend seam and Elasticsearch client |
//! | [`search`] | The hybrid scoring policy |
//! | [`load`] | Index provisioning and NDJSON bulk loading |
//! | [`server`] | HTTP API shim |

pub mod backend;
pub mod config;
pub mod intent;
pub mod load;
pub mod models;
pub mod scoring;
pub mod search;
pub mod server;
