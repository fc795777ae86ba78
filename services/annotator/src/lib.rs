//! Interactive labeling of wind-field scans.
//!
//! Rows of an event table whose label is unknown or disputed are shown one
//! at a time as a quiver plot. The reviewer marks each as a closed ring, not
//! a closed ring, or excluded; the relabeled table is written once the last
//! candidate is decided.

pub mod config;
pub mod prompt;
pub mod runner;
pub mod session;

pub use config::AnnotatorConfig;
pub use prompt::{CandidateView, Command, Frontend, TerminalFrontend};
pub use runner::{missing_scans, run_session, write_outcome};
pub use session::{select_candidates, Action, AnnotationSession, SessionOutcome, Step};
