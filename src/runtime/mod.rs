//! Server runtime subsystem.
//!
//! # Data Flow
//! ```text
//! activate(doc)
//!     → orchestrator.rs (ordered startup, failure attribution)
//!     → admins.rs (per-subsystem initialize via the admin registry)
//!     → instance.rs (RuntimeInstance owns every started handle)
//!     → instance_map.rs (at-most-one active instance per name)
//!
//! deactivate(name)
//!     → instance_map.rs (remove)
//!     → orchestrator.rs (reverse-order shutdown, collect-and-continue)
//! ```
//!
//! # Design Decisions
//! - The orchestrator consults only the document and the static registry
//! - Admin implementations form a closed, compile-time set
//! - Security checks run before any state changes hands

pub mod admins;
pub mod instance;
pub mod instance_map;
pub mod orchestrator;
pub mod security;
