//! Metaplane — administrative control-plane for a multi-tenant metadata
//! platform.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌────────────────────────────────────────────────┐
//!                      │                  PLATFORM                       │
//!                      │                                                 │
//!   Admin Request      │  ┌──────┐   ┌─────────┐   ┌──────────────┐     │
//!   ───────────────────┼─▶│ http │──▶│  ops    │──▶│   editor     │     │
//!                      │  │router│   │ façade  │   │ (config RMW) │     │
//!                      │  └──────┘   └────┬────┘   └──────┬───────┘     │
//!                      │                  │               │             │
//!                      │                  ▼               ▼             │
//!                      │        ┌──────────────┐   ┌────────────┐       │
//!                      │        │ orchestrator │──▶│   store    │       │
//!                      │        │ (lifecycle)  │   │ (documents)│       │
//!                      │        └──────┬───────┘   └────────────┘       │
//!                      │               │                                │
//!                      │               ▼                                │
//!                      │        ┌──────────────┐                        │
//!                      │        │ instance map │  one runtime instance  │
//!                      │        │  + admins    │  per active server     │
//!                      │        └──────────────┘                        │
//!                      │                                                 │
//!                      │  ┌──────────────────────────────────────────┐  │
//!                      │  │          Cross-Cutting Concerns           │  │
//!                      │  │  validation │ security │ observability    │  │
//!                      │  └──────────────────────────────────────────┘  │
//!                      └────────────────────────────────────────────────┘
//! ```
//!
//! Each hosted metadata server is described by a versioned
//! [`ConfigurationDocument`](document::ConfigurationDocument). The `ops`
//! façade edits documents through the [`editor`] (replace-by-identity
//! merges, append-only audit trail) and starts or stops server instances
//! through the [`runtime`] orchestrator, which keeps at most one instance
//! per server name in the platform instance map.

// Domain model and persistence
pub mod document;
pub mod registry;
pub mod store;

// Configuration editing
pub mod editor;
pub mod validation;

// Server runtime
pub mod eventbus;
pub mod runtime;

// Operation surface
pub mod http;
pub mod ops;

// Cross-cutting concerns
pub mod error;
pub mod locks;
pub mod observability;
pub mod platform;

pub use document::ConfigurationDocument;
pub use error::{AdminError, AdminResult};
pub use ops::AdminServices;
pub use platform::PlatformConfig;
