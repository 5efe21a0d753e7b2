//! # Planboard Projects
//!
//! The planning service for Planboard: projects, their sub-projects and
//! activities, the instances placed on the board grid, and the board
//! projection used to render it.

pub mod activities;
pub mod board;
pub mod error;
pub mod instances;
mod ordering;
pub mod projects;
pub mod service;
pub mod subprojects;

pub use board::{Board, DayEntry};
pub use error::{PlannerError, PlannerResult, Precondition, PreconditionCode};
pub use projects::{ProjectDeleteOutcome, ProjectUpdateOutcome};
pub use service::PlanningService;
pub use subprojects::{DeleteOutcome, DuplicateOutcome, ReorderOutcome, ShiftSummary};

// Re-export the domain types callers work with
pub use planboard_core::{
    Activity, ActivityPayload, DateKey, DayCell, DuplicatePayload, Instance, InstancePayload,
    MoveDirection, Project, ProjectPayload, SubProject, SubProjectPayload,
};
pub use planboard_storage::{Store, StoreConfig};
