//! # ICPC Board
//!
//! A deterministic ICPC-style contest scoreboard with freeze and scroll.
//!
//! ## Design Principles
//!
//! - **Single-Writer**: One session object owns all state (no locks, no globals)
//! - **Deterministic**: The same command stream always yields the same events
//! - **Write-Once Solves**: The first applied `Accepted` latches a problem
//! - **Deferred Reveal**: Outcomes submitted while frozen stay hidden until scroll
//!
//! ## Architecture
//!
//! ```text
//! [Line Reader] --> [protocol::parse_line] --> [Engine] --> [Contest]
//!                                                 |
//!                                          [Output Events] --> [protocol::render]
//! ```

pub mod error;
pub mod ledger;
pub mod ranking;
pub mod scoreboard;
pub mod contest;
pub mod command;
pub mod protocol;
pub mod engine;

// Re-exports for convenience
pub use error::ContestError;
pub use ledger::{ProblemId, ProblemStatus, Standing, Submission, Team, TeamId};
pub use scoreboard::{Cell, Scoreboard, ScoreboardRow};
pub use contest::{BoardState, Contest, ProblemFilter, RankChange, RankQuery, ScrollReport, StatusFilter};
pub use command::{Command, Operation, OutputEvent, QuerySubmission, RankReport, Submit, SubmissionReport};
pub use protocol::{parse_line, render, ParseError};
pub use engine::Engine;
