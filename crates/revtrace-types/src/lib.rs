//! Process model for reconstructed peer-review workflows
//!
//! A review campaign is described by a handful of configured calendar
//! **phases** and a stream of logged actions. Reconstruction turns that
//! stream into the entities defined here; analysis then reads them back.
//!
//! # Key Concepts
//!
//! - **Phase**: a configured calendar window (inclusive dates).
//! - **ActionType**: static metadata about a named action (governing phase,
//!   expected actor role, meaning of its free-text parameter).
//! - **Actor**: a person appearing in the log, with a lifetime role tally.
//! - **ProcessInstance**: one submission's full event history, with a live
//!   role-assignment table and one thread per actor.
//! - **ProcessThread**: one actor's chronological actions within a process.
//! - **TaskInstance**: a single logged action occurrence.
//! - **ProcessModel**: the aggregate handed to downstream consumers.
//!
//! Actors are owned by the [`ProcessModel`]; threads and tasks refer to them
//! by [`ActorId`].

#![deny(unsafe_code)]

mod action;
mod actor;
mod interval;
mod model;
mod phase;
mod process;
pub mod roles;
mod task;
mod thread;

pub use action::*;
pub use actor::*;
pub use interval::*;
pub use model::*;
pub use phase::*;
pub use process::*;
pub use roles::RolePriority;
pub use task::*;
pub use thread::*;
