//! Applicant tracking core.
//!
//! The [`workflows::recruitment`] module owns the job application lifecycle: candidates apply,
//! HR coordinators triage and schedule interviews, interviewers record feedback, and every
//! status change flows through a single role-gated lifecycle engine.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
