//! Command and Event types for the contest engine.
//!
//! Commands are parsed inputs from the command reader.
//! Events are outputs for whatever prints or displays the board.

use std::fmt;

use crate::contest::{ProblemFilter, RankChange, StatusFilter};
use crate::error::ContestError;
use crate::scoreboard::Scoreboard;

// ============================================================================
// Input Commands
// ============================================================================

/// Record one submission
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Submit {
    /// Problem letter
    pub problem: char,
    pub team: String,
    /// Verdict string, e.g. "Accepted"
    pub status: String,
    /// Contest-relative minutes
    pub time: u32,
}

/// Look up the most recent matching submission of a team
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuerySubmission {
    pub team: String,
    pub problem: ProblemFilter,
    pub status: StatusFilter,
}

/// Input commands, already tokenized and typed
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    AddTeam(String),
    Start { duration: u32, problems: u32 },
    Submit(Submit),
    Flush,
    Freeze,
    Scroll,
    QueryRanking(String),
    QuerySubmission(QuerySubmission),
    End,
}

impl Command {
    /// Which operation this command performs
    pub fn operation(&self) -> Operation {
        match self {
            Command::AddTeam(_) => Operation::Add,
            Command::Start { .. } => Operation::Start,
            Command::Submit(_) => Operation::Submit,
            Command::Flush => Operation::Flush,
            Command::Freeze => Operation::Freeze,
            Command::Scroll => Operation::Scroll,
            Command::QueryRanking(_) => Operation::QueryRanking,
            Command::QuerySubmission(_) => Operation::QuerySubmission,
            Command::End => Operation::End,
        }
    }
}

/// Operation label, used when reporting rejections
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Operation {
    Add = 0,
    Start = 1,
    Submit = 2,
    Flush = 3,
    Freeze = 4,
    Scroll = 5,
    QueryRanking = 6,
    QuerySubmission = 7,
    End = 8,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Add => "Add",
            Operation::Start => "Start",
            Operation::Submit => "Submit",
            Operation::Flush => "Flush",
            Operation::Freeze => "Freeze",
            Operation::Scroll => "Scroll",
            Operation::QueryRanking => "Query ranking",
            Operation::QuerySubmission => "Query submission",
            Operation::End => "End",
        })
    }
}

// ============================================================================
// Output Events
// ============================================================================

/// Result of a rank query
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RankReport {
    pub team: String,
    pub rank: u32,
    /// Scoreboard frozen: rank may be stale
    pub frozen: bool,
}

/// Most recent matching submission
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmissionReport {
    pub team: String,
    pub problem: char,
    pub status: String,
    pub time: u32,
}

/// Output events from the engine
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutputEvent {
    TeamAdded(String),
    ContestStarted,
    Flushed,
    Frozen,
    /// Scroll accepted; board, rank changes and final board follow
    ScrollStarted,
    Scoreboard(Scoreboard),
    RankChanged(RankChange),
    Ranking(RankReport),
    /// `None` when nothing matched
    LastSubmission(Option<SubmissionReport>),
    Ended,
    /// Command rejected, state unchanged
    Rejected { op: Operation, reason: ContestError },
}
