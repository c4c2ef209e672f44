//! Metadata retrieval.
//!
//! Turns administrative command results into symbols.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         Assemblers                              │
//! │  tables             .show database <db> schema                  │
//! │  external tables    .show external tables       + per item      │
//! │  materialized views .show materialized-views    + per item      │
//! │  functions          .show functions                             │
//! │  entity groups      .show entity_groups                         │
//! └─────────────────────────────────────────────────────────────────┘
//!                           │
//!                           ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      CommandExecutor                            │
//! │  run::<Record>(command) -> Fetch<Vec<Record>>                   │
//! │  (cancellation, failure policy, typed row decoding)             │
//! └─────────────────────────────────────────────────────────────────┘
//!                           │
//!                           ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       dyn AdminClient                           │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod assemble;
pub mod commands;
mod executor;
pub mod records;

pub use executor::{CommandExecutor, FailurePolicy, Fetch};
