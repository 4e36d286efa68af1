//! Rejection reasons for contest operations.
//!
//! Every failure is local: a rejected operation leaves the contest untouched.
//! Display strings are the reason fragments used by the text protocol.

use thiserror::Error;

/// Why a contest operation was rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContestError {
    /// A team with this name is already registered
    #[error("duplicated team name")]
    DuplicateTeam(String),

    /// Registration attempted after the contest started
    #[error("competition has started")]
    ContestAlreadyStarted,

    /// `start` called a second time
    #[error("competition has started")]
    AlreadyStarted,

    /// Submissions need the problem set, which exists only after `start`
    #[error("competition has not started")]
    NotStarted,

    #[error("scoreboard has been frozen")]
    AlreadyFrozen,

    #[error("scoreboard has not been frozen")]
    NotFrozen,

    #[error("cannot find the team")]
    TeamNotFound(String),

    /// Problem letter outside `A..A+problem_count`
    #[error("problem {0} is not part of the contest")]
    UnknownProblem(char),

    #[error("problem count must be between 1 and 26, got {0}")]
    InvalidProblemCount(u32),

    /// The session was closed by `end`
    #[error("competition has ended")]
    SessionEnded,
}
