//! Scoreboard snapshots and per-problem display tokens.

use std::fmt;
use std::io;

use serde::Serialize;

use crate::ledger::{ProblemStatus, Team};

/// Display state of one problem cell
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cell {
    /// `.` - no applied submission
    Untouched,
    /// `-k` - unsolved after k wrong attempts
    Failed(u32),
    /// `+` or `+k` - solved after k wrong attempts
    Solved(u32),
    /// `k/m` or `-k/m` - unsolved with m unrevealed frozen submissions
    Pending { wrong: u32, pending: u32 },
}

impl Cell {
    /// Cell for a problem; the pending form is shown only on a frozen board.
    pub fn of(ps: &ProblemStatus, frozen: bool) -> Self {
        if frozen && ps.is_pending() {
            Cell::Pending { wrong: ps.wrong_attempts, pending: ps.pending }
        } else if ps.solved {
            Cell::Solved(ps.wrong_attempts)
        } else if ps.wrong_attempts == 0 {
            Cell::Untouched
        } else {
            Cell::Failed(ps.wrong_attempts)
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Cell::Untouched => f.write_str("."),
            Cell::Failed(k) => write!(f, "-{k}"),
            Cell::Solved(0) => f.write_str("+"),
            Cell::Solved(k) => write!(f, "+{k}"),
            Cell::Pending { wrong: 0, pending } => write!(f, "0/{pending}"),
            Cell::Pending { wrong, pending } => write!(f, "-{wrong}/{pending}"),
        }
    }
}

/// One team's line of the scoreboard
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScoreboardRow {
    pub team: String,
    pub rank: u32,
    pub solved: u32,
    pub penalty: u64,
    pub cells: Vec<Cell>,
}

impl ScoreboardRow {
    pub fn of(team: &Team, frozen: bool) -> Self {
        Self {
            team: team.name().to_string(),
            rank: team.standing.rank,
            solved: team.standing.solved,
            penalty: team.standing.penalty,
            cells: team.problems().iter().map(|ps| Cell::of(ps, frozen)).collect(),
        }
    }

    /// Cells joined by single spaces
    pub fn cells_string(&self) -> String {
        self.cells
            .iter()
            .map(Cell::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for ScoreboardRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.team, self.rank, self.solved, self.penalty)?;
        for cell in &self.cells {
            write!(f, " {cell}")?;
        }
        Ok(())
    }
}

/// Every team in rank order
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Scoreboard {
    pub rows: Vec<ScoreboardRow>,
}

#[derive(Serialize)]
struct CsvRow<'a> {
    rank: u32,
    team: &'a str,
    solved: u32,
    penalty: u64,
    problems: String,
}

impl Scoreboard {
    /// Row of a team, if present
    pub fn row(&self, team: &str) -> Option<&ScoreboardRow> {
        self.rows.iter().find(|r| r.team == team)
    }

    /// Export as CSV with a header line
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut wtr = csv::Writer::from_writer(writer);
        for row in &self.rows {
            wtr.serialize(CsvRow {
                rank: row.rank,
                team: &row.team,
                solved: row.solved,
                penalty: row.penalty,
                problems: row.cells_string(),
            })?;
        }
        wtr.flush()?;
        Ok(())
    }
}

impl fmt::Display for Scoreboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            writeln!(f, "{row}")?;
        }
        Ok(())
    }
}
