//! Data layer: record types, loading, and the in-memory dataset service.
//!
//! Architecture:
//! ```text
//!  API  →  measurements.json / .csv  →  example data
//!        │   (loader: first success wins)
//!        ▼
//!   ┌──────────────┐
//!   │   Snapshot    │  Vec<Measurement>, Option<Vec<Sample>>
//!   └──────────────┘
//!        │
//!        ▼
//!   ┌────────────────┐
//!   │ DatasetService │  filter → sort → page; stats, histogram, groups
//!   └────────────────┘
//!        │
//!        ▼
//!   export (CSV / JSON)
//! ```

pub mod api;
pub mod example;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod service;
pub mod sort;
pub mod stats;
