//! Ledger - The authoritative record of submissions and solve state.
//!
//! Each team owns one `ProblemStatus` per problem letter, stored in a
//! `Vec` indexed by `ProblemId`. Submissions are append-only; the derived
//! fields (`solved`, `solve_time`, `wrong_attempts`) are a write-once latch
//! per problem.

use arrayvec::ArrayVec;

/// Problems are lettered `A..=Z`
pub const MAX_PROBLEMS: usize = 26;

/// Minutes added to the penalty for each wrong attempt on a solved problem
pub const PENALTY_PER_WRONG_ATTEMPT: u64 = 20;

/// The only status string with a special meaning
pub const ACCEPTED: &str = "Accepted";

/// Index of a team in registration order
pub type TeamId = usize;

/// Zero-based problem index (`A` -> 0)
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProblemId(u8);

impl ProblemId {
    /// Parse an upper-case problem letter
    #[inline]
    pub fn from_letter(letter: char) -> Option<Self> {
        if letter.is_ascii_uppercase() {
            Some(Self(letter as u8 - b'A'))
        } else {
            None
        }
    }

    /// Build from a zero-based index
    #[inline]
    pub fn from_index(index: usize) -> Option<Self> {
        if index < MAX_PROBLEMS {
            Some(Self(index as u8))
        } else {
            None
        }
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn letter(self) -> char {
        (b'A' + self.0) as char
    }
}

/// One submission, immutable once recorded
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Submission {
    pub problem: ProblemId,
    /// Opaque verdict string ("Accepted", "Wrong_Answer", ...)
    pub status: String,
    /// Contest-relative minutes
    pub time: u32,
    /// Global ingestion order, used only by "most recent" queries
    pub seq: u64,
}

impl Submission {
    #[inline]
    pub fn is_accepted(&self) -> bool {
        self.status == ACCEPTED
    }
}

/// Derived state of one (team, problem) pair
#[derive(Clone, Debug, Default)]
pub struct ProblemStatus {
    /// Latched by the first applied `Accepted`
    pub solved: bool,
    /// Time of the first applied `Accepted` (meaningful only if solved)
    pub solve_time: u32,
    /// Wrong attempts applied so far
    pub wrong_attempts: u32,
    /// Submissions received while frozen and not yet revealed
    pub pending: u32,
    submissions: Vec<Submission>,
}

impl ProblemStatus {
    /// Append a submission.
    ///
    /// While frozen the outcome is deferred and only `pending` grows.
    /// Submissions to an already-solved problem touch no counter.
    pub fn record(&mut self, submission: Submission, frozen: bool) {
        let accepted = submission.is_accepted();
        let time = submission.time;
        self.submissions.push(submission);

        if self.solved {
            return;
        }
        if frozen {
            self.pending += 1;
        } else {
            self.apply(accepted, time);
        }
    }

    /// Replay the pending tail of the submission list in original order.
    ///
    /// # Returns
    /// Number of submissions revealed
    pub fn reveal(&mut self) -> u32 {
        let count = self.pending;
        let start = self.submissions.len() - count as usize;

        for i in start..self.submissions.len() {
            let accepted = self.submissions[i].is_accepted();
            let time = self.submissions[i].time;
            self.apply(accepted, time);
        }
        self.pending = 0;

        count
    }

    /// Wrong attempts hidden in the pending tail
    pub fn pending_wrong_attempts(&self) -> u32 {
        let start = self.submissions.len() - self.pending as usize;
        self.submissions[start..]
            .iter()
            .filter(|s| !s.is_accepted())
            .count() as u32
    }

    /// Unsolved with unrevealed frozen submissions
    #[inline]
    pub fn is_pending(&self) -> bool {
        !self.solved && self.pending > 0
    }

    /// Every submission for this problem, oldest first
    #[inline]
    pub fn submissions(&self) -> &[Submission] {
        &self.submissions
    }

    /// Contribution to the penalty (zero if unsolved)
    #[inline]
    pub fn penalty(&self) -> u64 {
        if self.solved {
            self.solve_time as u64 + PENALTY_PER_WRONG_ATTEMPT * self.wrong_attempts as u64
        } else {
            0
        }
    }

    /// First-write-wins application of one outcome
    #[inline]
    fn apply(&mut self, accepted: bool, time: u32) {
        if self.solved {
            return;
        }
        if accepted {
            self.solved = true;
            self.solve_time = time;
        } else {
            self.wrong_attempts += 1;
        }
    }
}

/// Cached ranking inputs and result, rewritten by the ranking engine
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Standing {
    pub solved: u32,
    pub penalty: u64,
    /// Solve times, largest first
    pub solve_times: ArrayVec<u32, MAX_PROBLEMS>,
    /// 1-based; 0 until the first ranking
    pub rank: u32,
}

/// A registered team
#[derive(Clone, Debug)]
pub struct Team {
    name: String,
    problems: Vec<ProblemStatus>,
    pub standing: Standing,
}

impl Team {
    /// Create a team with no problem slots (allocated at contest start)
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            problems: Vec::new(),
            standing: Standing::default(),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Allocate one empty `ProblemStatus` per problem
    pub fn allocate_problems(&mut self, count: usize) {
        self.problems = vec![ProblemStatus::default(); count];
    }

    #[inline]
    pub fn problems(&self) -> &[ProblemStatus] {
        &self.problems
    }

    #[inline]
    pub fn problem(&self, id: ProblemId) -> Option<&ProblemStatus> {
        self.problems.get(id.index())
    }

    #[inline]
    pub fn problem_mut(&mut self, id: ProblemId) -> Option<&mut ProblemStatus> {
        self.problems.get_mut(id.index())
    }

    /// Recompute solved count, penalty and sorted solve times.
    ///
    /// Pure function of the per-problem derived fields; `rank` is untouched.
    pub fn refresh_standing(&mut self) {
        let mut solved = 0;
        let mut penalty = 0;
        let mut solve_times = ArrayVec::new();

        for ps in self.problems.iter().filter(|ps| ps.solved) {
            solved += 1;
            penalty += ps.penalty();
            solve_times.push(ps.solve_time);
        }
        solve_times.sort_unstable_by(|a, b| b.cmp(a));

        self.standing.solved = solved;
        self.standing.penalty = penalty;
        self.standing.solve_times = solve_times;
    }

    /// Lowest-lettered problem with unrevealed frozen submissions
    pub fn first_pending_problem(&self) -> Option<ProblemId> {
        self.problems
            .iter()
            .position(ProblemStatus::is_pending)
            .and_then(ProblemId::from_index)
    }

    #[inline]
    pub fn has_pending(&self) -> bool {
        self.problems.iter().any(ProblemStatus::is_pending)
    }

    /// Total unrevealed frozen submissions across all problems
    pub fn pending_count(&self) -> u32 {
        self.problems.iter().map(|ps| ps.pending).sum()
    }

    /// All submissions of this team, grouped by problem
    pub fn submissions(&self) -> impl Iterator<Item = &Submission> {
        self.problems.iter().flat_map(|ps| ps.submissions().iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sub(problem: char, status: &str, time: u32, seq: u64) -> Submission {
        Submission {
            problem: ProblemId::from_letter(problem).unwrap(),
            status: status.to_string(),
            time,
            seq,
        }
    }

    #[test]
    fn test_problem_id_letters() {
        let a = ProblemId::from_letter('A').unwrap();
        let z = ProblemId::from_letter('Z').unwrap();
        assert_eq!(a.index(), 0);
        assert_eq!(z.index(), 25);
        assert_eq!(z.letter(), 'Z');
        assert!(ProblemId::from_letter('a').is_none());
        assert!(ProblemId::from_index(26).is_none());
    }

    #[test]
    fn test_first_accept_wins() {
        let mut ps = ProblemStatus::default();
        ps.record(sub('A', "Wrong_Answer", 5, 0), false);
        ps.record(sub('A', ACCEPTED, 10, 1), false);
        ps.record(sub('A', ACCEPTED, 30, 2), false);
        ps.record(sub('A', "Runtime_Error", 40, 3), false);

        assert!(ps.solved);
        assert_eq!(ps.solve_time, 10);
        assert_eq!(ps.wrong_attempts, 1);
        assert_eq!(ps.submissions().len(), 4);
        assert_eq!(ps.penalty(), 30);
    }

    #[test]
    fn test_frozen_submissions_deferred() {
        let mut ps = ProblemStatus::default();
        ps.record(sub('A', "Wrong_Answer", 5, 0), false);
        ps.record(sub('A', "Time_Limit_Exceed", 50, 1), true);
        ps.record(sub('A', ACCEPTED, 60, 2), true);

        assert!(!ps.solved);
        assert_eq!(ps.wrong_attempts, 1);
        assert_eq!(ps.pending, 2);
        assert_eq!(ps.pending_wrong_attempts(), 1);
        assert!(ps.is_pending());

        assert_eq!(ps.reveal(), 2);
        assert!(ps.solved);
        assert_eq!(ps.solve_time, 60);
        assert_eq!(ps.wrong_attempts, 2);
        assert_eq!(ps.pending, 0);
    }

    #[test]
    fn test_solved_problem_ignores_freeze() {
        let mut ps = ProblemStatus::default();
        ps.record(sub('A', ACCEPTED, 5, 0), false);
        ps.record(sub('A', "Wrong_Answer", 50, 1), true);

        assert_eq!(ps.pending, 0);
        assert_eq!(ps.wrong_attempts, 0);
        assert!(!ps.is_pending());
    }

    #[test]
    fn test_penalty_example() {
        let mut team = Team::new("t");
        team.allocate_problems(2);
        team.problem_mut(ProblemId::from_letter('A').unwrap()).unwrap()
            .record(sub('A', "Wrong_Answer", 3, 0), false);
        team.problem_mut(ProblemId::from_letter('A').unwrap()).unwrap()
            .record(sub('A', ACCEPTED, 20, 1), false);
        team.problem_mut(ProblemId::from_letter('B').unwrap()).unwrap()
            .record(sub('B', ACCEPTED, 50, 2), false);

        team.refresh_standing();
        assert_eq!(team.standing.solved, 2);
        assert_eq!(team.standing.penalty, 90);
        assert_eq!(team.standing.solve_times.as_slice(), &[50, 20]);
    }

    #[test]
    fn test_wrong_attempts_on_unsolved_do_not_count() {
        let mut team = Team::new("t");
        team.allocate_problems(1);
        let a = ProblemId::from_letter('A').unwrap();
        team.problem_mut(a).unwrap().record(sub('A', "Wrong_Answer", 3, 0), false);

        team.refresh_standing();
        assert_eq!(team.standing.solved, 0);
        assert_eq!(team.standing.penalty, 0);
    }

    #[test]
    fn test_first_pending_problem() {
        let mut team = Team::new("t");
        team.allocate_problems(3);
        let b = ProblemId::from_letter('B').unwrap();
        let c = ProblemId::from_letter('C').unwrap();
        team.problem_mut(c).unwrap().record(sub('C', "Wrong_Answer", 1, 0), true);
        team.problem_mut(b).unwrap().record(sub('B', "Wrong_Answer", 2, 1), true);

        assert!(team.has_pending());
        assert_eq!(team.pending_count(), 2);
        assert_eq!(team.first_pending_problem(), Some(b));
    }
}
