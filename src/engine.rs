//! Engine - Applies commands to a contest and turns results into events.
//!
//! Rejections never escape as errors: they become `OutputEvent::Rejected`
//! so a driver can print every outcome in order.

use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;
use tracing::warn;

use crate::command::{Command, OutputEvent, QuerySubmission, RankReport, Submit, SubmissionReport};
use crate::contest::{self, Contest};

/// Single-writer front end over a `Contest`.
#[derive(Debug, Default)]
pub struct Engine {
    /// The underlying contest session
    pub contest: Contest,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a single command and return output events.
    ///
    /// This is the main entry point for drivers, tests and benchmarks.
    pub fn process_command(&mut self, cmd: Command) -> Vec<OutputEvent> {
        let op = cmd.operation();
        match self.apply(cmd) {
            Ok(events) => events,
            Err(reason) => {
                warn!(%op, %reason, "command rejected");
                vec![OutputEvent::Rejected { op, reason }]
            }
        }
    }

    fn apply(&mut self, cmd: Command) -> contest::Result<Vec<OutputEvent>> {
        let events = match cmd {
            Command::AddTeam(name) => {
                self.contest.register_team(&name)?;
                vec![OutputEvent::TeamAdded(name)]
            }
            Command::Start { duration, problems } => {
                self.contest.start(duration, problems)?;
                vec![OutputEvent::ContestStarted]
            }
            Command::Submit(Submit { problem, team, status, time }) => {
                self.contest.record_submission(problem, &team, &status, time)?;
                Vec::new()
            }
            Command::Flush => {
                self.contest.flush()?;
                vec![OutputEvent::Flushed]
            }
            Command::Freeze => {
                self.contest.freeze()?;
                vec![OutputEvent::Frozen]
            }
            Command::Scroll => {
                let report = self.contest.scroll()?;
                let mut events = Vec::with_capacity(report.changes.len() + 3);
                events.push(OutputEvent::ScrollStarted);
                events.push(OutputEvent::Scoreboard(report.before));
                events.extend(report.changes.into_iter().map(OutputEvent::RankChanged));
                events.push(OutputEvent::Scoreboard(report.after));
                events
            }
            Command::QueryRanking(team) => {
                let q = self.contest.query_rank(&team)?;
                vec![OutputEvent::Ranking(RankReport { team, rank: q.rank, frozen: q.frozen })]
            }
            Command::QuerySubmission(QuerySubmission { team, problem, status }) => {
                let found = self
                    .contest
                    .query_last_submission(&team, &problem, &status)?
                    .map(|s| SubmissionReport {
                        team: team.clone(),
                        problem: s.problem.letter(),
                        status: s.status.clone(),
                        time: s.time,
                    });
                vec![OutputEvent::LastSubmission(found)]
            }
            Command::End => {
                self.contest.end()?;
                vec![OutputEvent::Ended]
            }
        };
        Ok(events)
    }

    /// Whether `END` has been processed
    #[inline]
    pub fn is_ended(&self) -> bool {
        self.contest.is_ended()
    }

    /// Compute state hash for determinism testing.
    ///
    /// Covers the board state, ranking order, every standing and every
    /// per-problem counter.
    pub fn state_hash(&self) -> u64 {
        let mut hasher = FxHasher::default();

        self.contest.is_started().hash(&mut hasher);
        self.contest.is_frozen().hash(&mut hasher);
        self.contest.submission_count().hash(&mut hasher);

        for team in self.contest.ranked() {
            team.name().hash(&mut hasher);
            team.standing.rank.hash(&mut hasher);
            team.standing.solved.hash(&mut hasher);
            team.standing.penalty.hash(&mut hasher);
            for ps in team.problems() {
                ps.solved.hash(&mut hasher);
                ps.solve_time.hash(&mut hasher);
                ps.wrong_attempts.hash(&mut hasher);
                ps.pending.hash(&mut hasher);
            }
        }

        hasher.finish()
    }
}
