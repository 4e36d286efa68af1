//! Contest - The session object owning the ledger and the freeze/scroll
//! state machine.
//!
//! All operations are synchronous and run to completion. A rejected
//! operation returns an error and changes nothing.
//!
//! ```text
//!  LIVE --freeze--> FROZEN --scroll--> LIVE
//! ```

use rustc_hash::FxHashMap;
use tracing::{debug, info};

use crate::error::ContestError;
use crate::ledger::{ProblemId, Submission, Team, TeamId, MAX_PROBLEMS};
use crate::ranking::recompute_rankings;
use crate::scoreboard::{Scoreboard, ScoreboardRow};

pub type Result<T> = std::result::Result<T, ContestError>;

/// Visibility of new outcomes
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BoardState {
    /// Outcomes are applied immediately
    #[default]
    Live,
    /// Outcomes on unsolved problems are deferred until scroll
    Frozen,
}

/// Problem selector for submission queries
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProblemFilter {
    Any,
    Only(ProblemId),
}

/// Status selector for submission queries
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StatusFilter {
    Any,
    Only(String),
}

impl ProblemFilter {
    #[inline]
    fn matches(&self, problem: ProblemId) -> bool {
        match self {
            ProblemFilter::Any => true,
            ProblemFilter::Only(p) => *p == problem,
        }
    }
}

impl StatusFilter {
    #[inline]
    fn matches(&self, status: &str) -> bool {
        match self {
            StatusFilter::Any => true,
            StatusFilter::Only(s) => s == status,
        }
    }
}

/// Result of a rank query
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RankQuery {
    pub rank: u32,
    /// Set while frozen: hidden outcomes may change the rank
    pub frozen: bool,
}

/// A team overtaking another during scroll
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RankChange {
    pub team: String,
    /// Team that held the new rank before the reveal
    pub passed: String,
    pub solved: u32,
    pub penalty: u64,
}

/// Everything a scroll produces, in order
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScrollReport {
    /// Board before any reveal (frozen cells shown)
    pub before: Scoreboard,
    pub changes: Vec<RankChange>,
    /// Board after every reveal
    pub after: Scoreboard,
}

/// Process-wide contest state
#[derive(Debug, Default)]
pub struct Contest {
    /// Roster in registration order; `TeamId` indexes here
    teams: Vec<Team>,
    /// Name lookup
    index: FxHashMap<String, TeamId>,
    /// Team ids sorted by the last ranking (`order[rank - 1]`)
    order: Vec<TeamId>,
    duration: u32,
    problem_count: usize,
    started: bool,
    ended: bool,
    state: BoardState,
    next_seq: u64,
}

impl Contest {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[inline]
    pub fn is_started(&self) -> bool {
        self.started
    }

    #[inline]
    pub fn is_ended(&self) -> bool {
        self.ended
    }

    #[inline]
    pub fn is_frozen(&self) -> bool {
        self.state == BoardState::Frozen
    }

    #[inline]
    pub fn state(&self) -> BoardState {
        self.state
    }

    #[inline]
    pub fn duration(&self) -> u32 {
        self.duration
    }

    #[inline]
    pub fn problem_count(&self) -> usize {
        self.problem_count
    }

    #[inline]
    pub fn team_count(&self) -> usize {
        self.teams.len()
    }

    /// Total submissions recorded so far
    #[inline]
    pub fn submission_count(&self) -> u64 {
        self.next_seq
    }

    pub fn team(&self, name: &str) -> Option<&Team> {
        self.index.get(name).map(|&id| &self.teams[id])
    }

    /// Teams in registration order
    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    /// Teams in the order of the last ranking
    pub fn ranked(&self) -> impl Iterator<Item = &Team> {
        self.order.iter().map(|&id| &self.teams[id])
    }

    /// Unrevealed frozen submissions across the roster
    pub fn pending_count(&self) -> u64 {
        self.teams.iter().map(|t| t.pending_count() as u64).sum()
    }

    /// Snapshot of the last ranking; pending cells shown while frozen
    pub fn scoreboard(&self) -> Scoreboard {
        let frozen = self.is_frozen();
        Scoreboard {
            rows: self.ranked().map(|t| ScoreboardRow::of(t, frozen)).collect(),
        }
    }

    // ========================================================================
    // Ledger
    // ========================================================================

    /// Register a team before the contest starts.
    pub fn register_team(&mut self, name: &str) -> Result<()> {
        self.ensure_open()?;
        if self.started {
            return Err(ContestError::ContestAlreadyStarted);
        }
        if self.index.contains_key(name) {
            return Err(ContestError::DuplicateTeam(name.to_string()));
        }

        let id = self.teams.len();
        self.teams.push(Team::new(name));
        self.index.insert(name.to_string(), id);
        self.order.push(id);
        debug!(team = name, id, "team registered");
        Ok(())
    }

    /// Lock the roster, allocate problem slots and assign initial ranks.
    pub fn start(&mut self, duration: u32, problem_count: u32) -> Result<()> {
        self.ensure_open()?;
        if self.started {
            return Err(ContestError::AlreadyStarted);
        }
        if problem_count == 0 || problem_count as usize > MAX_PROBLEMS {
            return Err(ContestError::InvalidProblemCount(problem_count));
        }

        self.started = true;
        self.duration = duration;
        self.problem_count = problem_count as usize;
        for team in &mut self.teams {
            team.allocate_problems(self.problem_count);
        }
        // Nobody has solved anything, so this is alphabetical
        self.recompute();

        info!(teams = self.teams.len(), duration, problem_count, "contest started");
        Ok(())
    }

    /// Append a submission and apply its outcome unless frozen.
    pub fn record_submission(&mut self, problem: char, team: &str, status: &str, time: u32) -> Result<()> {
        self.ensure_open()?;
        if !self.started {
            return Err(ContestError::NotStarted);
        }
        let problem_id = ProblemId::from_letter(problem)
            .filter(|p| p.index() < self.problem_count)
            .ok_or(ContestError::UnknownProblem(problem))?;
        let id = self.lookup(team)?;

        let seq = self.next_seq;
        let frozen = self.is_frozen();
        let ps = self.teams[id]
            .problem_mut(problem_id)
            .ok_or(ContestError::UnknownProblem(problem))?;
        ps.record(
            Submission {
                problem: problem_id,
                status: status.to_string(),
                time,
                seq,
            },
            frozen,
        );
        self.next_seq += 1;

        debug!(team, problem = %problem, status, time, seq, frozen, "submission recorded");
        Ok(())
    }

    // ========================================================================
    // Ranking
    // ========================================================================

    /// Recompute standings and ranks from the current ledger.
    pub fn flush(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.recompute();
        Ok(())
    }

    #[inline]
    fn recompute(&mut self) {
        recompute_rankings(&mut self.teams, &mut self.order);
    }

    // ========================================================================
    // Freeze / Scroll
    // ========================================================================

    pub fn freeze(&mut self) -> Result<()> {
        self.ensure_open()?;
        if self.is_frozen() {
            return Err(ContestError::AlreadyFrozen);
        }
        self.state = BoardState::Frozen;
        info!(submissions = self.next_seq, "scoreboard frozen");
        Ok(())
    }

    /// Reveal frozen outcomes one problem at a time, worst-ranked team first.
    ///
    /// # Algorithm
    /// 1. Recompute and snapshot the frozen board
    /// 2. Pick the worst-ranked team with a pending problem, and its
    ///    lowest-lettered pending problem
    /// 3. Replay that problem's pending tail, recompute, and report the
    ///    team it passed if its rank improved
    /// 4. Repeat until nothing is pending, then snapshot and unfreeze
    pub fn scroll(&mut self) -> Result<ScrollReport> {
        self.ensure_open()?;
        if !self.is_frozen() {
            return Err(ContestError::NotFrozen);
        }

        self.recompute();
        let before = self.scoreboard();
        let mut changes = Vec::new();
        let mut revealed = 0u64;

        while let Some(id) = self.worst_pending_team() {
            let problem = match self.teams[id].first_pending_problem() {
                Some(p) => p,
                None => break,
            };
            let old_rank = self.teams[id].standing.rank;

            if let Some(ps) = self.teams[id].problem_mut(problem) {
                revealed += ps.reveal() as u64;
            }

            // Rank -> team before this reveal
            let previous = self.order.clone();
            self.recompute();

            let team = &self.teams[id];
            let new_rank = team.standing.rank;
            debug!(
                team = team.name(),
                problem = %problem.letter(),
                old_rank,
                new_rank,
                "problem revealed"
            );

            if new_rank < old_rank {
                let passed = &self.teams[previous[new_rank as usize - 1]];
                changes.push(RankChange {
                    team: team.name().to_string(),
                    passed: passed.name().to_string(),
                    solved: team.standing.solved,
                    penalty: team.standing.penalty,
                });
            }
        }

        self.recompute();
        self.state = BoardState::Live;
        let after = self.scoreboard();

        info!(revealed, rank_changes = changes.len(), "scoreboard scrolled");
        Ok(ScrollReport { before, changes, after })
    }

    /// The order is sorted by rank, so the last pending team is the worst.
    fn worst_pending_team(&self) -> Option<TeamId> {
        self.order
            .iter()
            .rev()
            .copied()
            .find(|&id| self.teams[id].has_pending())
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Rank from the last ranking, flagged while frozen.
    pub fn query_rank(&self, team: &str) -> Result<RankQuery> {
        self.ensure_open()?;
        let id = self.lookup(team)?;
        Ok(RankQuery {
            rank: self.teams[id].standing.rank,
            frozen: self.is_frozen(),
        })
    }

    /// Most recent submission matching both filters, including
    /// unrevealed frozen ones.
    pub fn query_last_submission(
        &self,
        team: &str,
        problem: &ProblemFilter,
        status: &StatusFilter,
    ) -> Result<Option<&Submission>> {
        self.ensure_open()?;
        let id = self.lookup(team)?;
        Ok(self.teams[id]
            .submissions()
            .filter(|s| problem.matches(s.problem) && status.matches(&s.status))
            .max_by_key(|s| s.seq))
    }

    /// Close the session; later operations are rejected.
    pub fn end(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.ended = true;
        info!(submissions = self.next_seq, "contest ended");
        Ok(())
    }

    #[inline]
    fn lookup(&self, team: &str) -> Result<TeamId> {
        self.index
            .get(team)
            .copied()
            .ok_or_else(|| ContestError::TeamNotFound(team.to_string()))
    }

    #[inline]
    fn ensure_open(&self) -> Result<()> {
        if self.ended {
            Err(ContestError::SessionEnded)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoreboard::Cell;

    fn contest(teams: &[&str], problems: u32) -> Contest {
        let mut c = Contest::new();
        for t in teams {
            c.register_team(t).unwrap();
        }
        c.start(300, problems).unwrap();
        c
    }

    fn rank(c: &Contest, team: &str) -> u32 {
        c.query_rank(team).unwrap().rank
    }

    #[test]
    fn test_registration_errors() {
        let mut c = Contest::new();
        c.register_team("a").unwrap();
        assert_eq!(c.register_team("a"), Err(ContestError::DuplicateTeam("a".into())));
        c.start(100, 3).unwrap();
        assert_eq!(c.register_team("b"), Err(ContestError::ContestAlreadyStarted));
        assert_eq!(c.start(100, 3), Err(ContestError::AlreadyStarted));
        assert_eq!(c.team_count(), 1);
    }

    #[test]
    fn test_team_names_are_case_sensitive() {
        let mut c = Contest::new();
        c.register_team("Team").unwrap();
        c.register_team("team").unwrap();
        assert_eq!(c.team_count(), 2);
    }

    #[test]
    fn test_start_ranks_alphabetically() {
        let c = contest(&["zeta", "alpha", "mid"], 2);
        assert_eq!(rank(&c, "alpha"), 1);
        assert_eq!(rank(&c, "mid"), 2);
        assert_eq!(rank(&c, "zeta"), 3);
    }

    #[test]
    fn test_invalid_problem_count() {
        let mut c = Contest::new();
        assert_eq!(c.start(10, 0), Err(ContestError::InvalidProblemCount(0)));
        assert_eq!(c.start(10, 27), Err(ContestError::InvalidProblemCount(27)));
        assert!(!c.is_started());
    }

    #[test]
    fn test_submission_validation() {
        let mut c = Contest::new();
        c.register_team("a").unwrap();
        assert_eq!(c.record_submission('A', "a", "Accepted", 1), Err(ContestError::NotStarted));
        c.start(100, 2).unwrap();
        assert_eq!(c.record_submission('C', "a", "Accepted", 1), Err(ContestError::UnknownProblem('C')));
        assert_eq!(
            c.record_submission('A', "b", "Accepted", 1),
            Err(ContestError::TeamNotFound("b".into()))
        );
        assert_eq!(c.submission_count(), 0);
    }

    #[test]
    fn test_flush_end_to_end() {
        let mut c = contest(&["A", "B"], 2);
        c.record_submission('A', "A", "Wrong_Answer", 10).unwrap();
        c.record_submission('A', "A", "Accepted", 15).unwrap();
        c.record_submission('A', "B", "Accepted", 5).unwrap();

        // Not visible until flush
        assert_eq!(rank(&c, "A"), 1);
        c.flush().unwrap();

        assert_eq!(rank(&c, "B"), 1);
        assert_eq!(rank(&c, "A"), 2);
        assert_eq!(c.team("B").unwrap().standing.penalty, 5);
        assert_eq!(c.team("A").unwrap().standing.penalty, 35);
    }

    #[test]
    fn test_freeze_state_errors() {
        let mut c = contest(&["a"], 1);
        assert_eq!(c.scroll().unwrap_err(), ContestError::NotFrozen);
        c.freeze().unwrap();
        assert_eq!(c.freeze(), Err(ContestError::AlreadyFrozen));
        c.scroll().unwrap();
        assert!(!c.is_frozen());
        c.freeze().unwrap();
        assert!(c.is_frozen());
    }

    #[test]
    fn test_freeze_hides_outcomes() {
        let mut c = contest(&["a", "b"], 1);
        c.freeze().unwrap();
        c.record_submission('A', "b", "Wrong_Answer", 200).unwrap();
        c.record_submission('A', "b", "Accepted", 210).unwrap();
        c.flush().unwrap();

        let b = c.team("b").unwrap();
        assert_eq!(b.standing.solved, 0);
        assert_eq!(b.problems()[0].wrong_attempts, 0);
        assert_eq!(b.problems()[0].pending, 2);
        assert_eq!(c.query_rank("b").unwrap(), RankQuery { rank: 2, frozen: true });
        assert_eq!(
            c.scoreboard().row("b").unwrap().cells,
            vec![Cell::Pending { wrong: 0, pending: 2 }]
        );
    }

    #[test]
    fn test_scroll_reports_passed_team() {
        let mut c = contest(&["a", "b", "c"], 2);
        c.record_submission('A', "a", "Accepted", 10).unwrap();
        c.record_submission('A', "b", "Accepted", 20).unwrap();
        c.flush().unwrap();
        c.freeze().unwrap();
        c.record_submission('B', "c", "Wrong_Answer", 100).unwrap();
        c.record_submission('B', "c", "Accepted", 110).unwrap();
        c.record_submission('A', "c", "Accepted", 120).unwrap();

        let report = c.scroll().unwrap();

        let before = report.before.row("c").unwrap();
        assert_eq!(before.rank, 3);
        assert_eq!(
            before.cells,
            vec![Cell::Pending { wrong: 0, pending: 1 }, Cell::Pending { wrong: 0, pending: 2 }]
        );

        // Reveal A: c ties a on solved count, penalty 120 > 10, 20 -> stays 3rd.
        // Reveal B: c has 2 solved, jumps to 1st past a.
        assert_eq!(
            report.changes,
            vec![RankChange { team: "c".into(), passed: "a".into(), solved: 2, penalty: 250 }]
        );

        let after = report.after.row("c").unwrap();
        assert_eq!(after.rank, 1);
        assert_eq!(after.cells, vec![Cell::Solved(0), Cell::Solved(1)]);
        assert!(!c.is_frozen());
        assert_eq!(c.pending_count(), 0);
    }

    #[test]
    fn test_scroll_no_change_no_event() {
        let mut c = contest(&["a", "b"], 1);
        c.record_submission('A', "a", "Accepted", 10).unwrap();
        c.flush().unwrap();
        c.freeze().unwrap();
        c.record_submission('A', "b", "Wrong_Answer", 100).unwrap();

        let report = c.scroll().unwrap();
        assert!(report.changes.is_empty());
        assert_eq!(report.after.row("b").unwrap().cells, vec![Cell::Failed(1)]);
    }

    #[test]
    fn test_scroll_reveals_worst_rank_first() {
        let mut c = contest(&["a", "b", "c"], 1);
        c.freeze().unwrap();
        c.record_submission('A', "b", "Accepted", 50).unwrap();
        c.record_submission('A', "c", "Accepted", 40).unwrap();

        // c (rank 3) goes first and passes a; then b (now rank 3) passes a.
        let report = c.scroll().unwrap();
        assert_eq!(
            report.changes,
            vec![
                RankChange { team: "c".into(), passed: "a".into(), solved: 1, penalty: 40 },
                RankChange { team: "b".into(), passed: "a".into(), solved: 1, penalty: 50 },
            ]
        );
        let order: Vec<&str> = c.ranked().map(Team::name).collect();
        assert_eq!(order, vec!["c", "b", "a"]);
    }

    #[test]
    fn test_solved_before_freeze_is_unaffected() {
        let mut c = contest(&["a"], 1);
        c.record_submission('A', "a", "Accepted", 10).unwrap();
        c.freeze().unwrap();
        c.record_submission('A', "a", "Wrong_Answer", 20).unwrap();
        assert_eq!(c.pending_count(), 0);

        let report = c.scroll().unwrap();
        assert_eq!(report.before.row("a").unwrap().cells, vec![Cell::Solved(0)]);
    }

    #[test]
    fn test_query_last_submission() {
        let mut c = contest(&["a", "b"], 2);
        assert_eq!(c.query_last_submission("a", &ProblemFilter::Any, &StatusFilter::Any), Ok(None));

        c.record_submission('A', "a", "Accepted", 5).unwrap();
        c.record_submission('B', "a", "Wrong_Answer", 6).unwrap();
        c.record_submission('A', "a", "Accepted", 7).unwrap();
        c.freeze().unwrap();
        c.record_submission('B', "a", "Time_Limit_Exceed", 8).unwrap();

        let last = c.query_last_submission("a", &ProblemFilter::Any, &StatusFilter::Any).unwrap().unwrap();
        assert_eq!((last.problem.letter(), last.status.as_str(), last.time), ('B', "Time_Limit_Exceed", 8));

        let a = ProblemId::from_letter('A').unwrap();
        let last = c
            .query_last_submission("a", &ProblemFilter::Only(a), &StatusFilter::Only("Accepted".into()))
            .unwrap()
            .unwrap();
        assert_eq!(last.time, 7);

        let none = c
            .query_last_submission("a", &ProblemFilter::Only(a), &StatusFilter::Only("Runtime_Error".into()))
            .unwrap();
        assert!(none.is_none());

        assert_eq!(
            c.query_last_submission("zz", &ProblemFilter::Any, &StatusFilter::Any),
            Err(ContestError::TeamNotFound("zz".into()))
        );
    }

    #[test]
    fn test_end_closes_session() {
        let mut c = contest(&["a"], 1);
        c.end().unwrap();
        assert_eq!(c.flush(), Err(ContestError::SessionEnded));
        assert_eq!(c.query_rank("a"), Err(ContestError::SessionEnded));
        assert_eq!(c.end(), Err(ContestError::SessionEnded));
    }
}
