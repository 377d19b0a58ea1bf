//! Hybrid scoring engine for NSW Selective writing assessments.
//!
//! Two paths share one rubric: [`realtime`] recomputes heuristic levels as a
//! student types, and [`hybrid`] merges a rule-based grammar check with a
//! generative evaluation into a rubric-compliant, span-safe report.

pub mod config;
pub mod error;
pub mod essay;
pub mod hybrid;
pub mod realtime;
pub mod rubric;
pub mod telemetry;
