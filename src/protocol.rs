//! Text protocol - Line parser for commands and printer for events.
//!
//! ```text
//! ADDTEAM <name>
//! START DURATION <minutes> PROBLEM <count>
//! SUBMIT <letter> BY <team> WITH <status> AT <time>
//! FLUSH | FREEZE | SCROLL | END
//! QUERY_RANKING <team>
//! QUERY_SUBMISSION <team> WHERE PROBLEM=<letter|ALL> AND STATUS=<status|ALL>
//! ```

use std::io::{self, Write};
use std::str::SplitWhitespace;

use thiserror::Error;

use crate::command::{Command, OutputEvent, QuerySubmission, Submit};
use crate::contest::{ProblemFilter, StatusFilter};
use crate::ledger::ProblemId;

/// Wildcard accepted by both submission-query filters
pub const ALL: &str = "ALL";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown command `{0}`")]
    UnknownCommand(String),
    #[error("{command}: missing {what}")]
    Missing { command: &'static str, what: &'static str },
    #[error("{command}: expected `{expected}`, found `{found}`")]
    Unexpected {
        command: &'static str,
        expected: &'static str,
        found: String,
    },
    #[error("{command}: invalid number `{value}`")]
    InvalidNumber { command: &'static str, value: String },
    #[error("invalid problem `{0}`")]
    InvalidProblem(String),
}

/// Token cursor for one command line
struct Tokens<'a> {
    command: &'static str,
    inner: SplitWhitespace<'a>,
}

impl<'a> Tokens<'a> {
    fn next(&mut self, what: &'static str) -> Result<&'a str, ParseError> {
        self.inner.next().ok_or(ParseError::Missing { command: self.command, what })
    }

    fn keyword(&mut self, expected: &'static str) -> Result<(), ParseError> {
        let found = self.next(expected)?;
        if found == expected {
            Ok(())
        } else {
            Err(ParseError::Unexpected {
                command: self.command,
                expected,
                found: found.to_string(),
            })
        }
    }

    fn number(&mut self, what: &'static str) -> Result<u32, ParseError> {
        let value = self.next(what)?;
        value.parse().map_err(|_| ParseError::InvalidNumber {
            command: self.command,
            value: value.to_string(),
        })
    }

    /// `KEY=value`, returning `value`
    fn assignment(&mut self, key: &'static str) -> Result<&'a str, ParseError> {
        let token = self.next(key)?;
        token
            .strip_prefix(key)
            .and_then(|rest| rest.strip_prefix('='))
            .ok_or_else(|| ParseError::Unexpected {
                command: self.command,
                expected: key,
                found: token.to_string(),
            })
    }
}

fn problem_letter(token: &str) -> Result<char, ParseError> {
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if ProblemId::from_letter(c).is_some() => Ok(c),
        _ => Err(ParseError::InvalidProblem(token.to_string())),
    }
}

/// Parse one input line. Blank lines yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<Command>, ParseError> {
    let mut words = line.split_whitespace();
    let Some(name) = words.next() else {
        return Ok(None);
    };

    let command = match name {
        "ADDTEAM" => {
            let mut t = Tokens { command: "ADDTEAM", inner: words };
            Command::AddTeam(t.next("team name")?.to_string())
        }
        "START" => {
            let mut t = Tokens { command: "START", inner: words };
            t.keyword("DURATION")?;
            let duration = t.number("duration")?;
            t.keyword("PROBLEM")?;
            let problems = t.number("problem count")?;
            Command::Start { duration, problems }
        }
        "SUBMIT" => {
            let mut t = Tokens { command: "SUBMIT", inner: words };
            let problem = problem_letter(t.next("problem")?)?;
            t.keyword("BY")?;
            let team = t.next("team name")?.to_string();
            t.keyword("WITH")?;
            let status = t.next("status")?.to_string();
            t.keyword("AT")?;
            let time = t.number("time")?;
            Command::Submit(Submit { problem, team, status, time })
        }
        "FLUSH" => Command::Flush,
        "FREEZE" => Command::Freeze,
        "SCROLL" => Command::Scroll,
        "END" => Command::End,
        "QUERY_RANKING" => {
            let mut t = Tokens { command: "QUERY_RANKING", inner: words };
            Command::QueryRanking(t.next("team name")?.to_string())
        }
        "QUERY_SUBMISSION" => {
            let mut t = Tokens { command: "QUERY_SUBMISSION", inner: words };
            let team = t.next("team name")?.to_string();
            t.keyword("WHERE")?;
            let problem = match t.assignment("PROBLEM")? {
                ALL => ProblemFilter::Any,
                p => {
                    let letter = problem_letter(p)?;
                    ProblemFilter::Only(
                        ProblemId::from_letter(letter).ok_or_else(|| ParseError::InvalidProblem(p.to_string()))?,
                    )
                }
            };
            t.keyword("AND")?;
            let status = match t.assignment("STATUS")? {
                ALL => StatusFilter::Any,
                s => StatusFilter::Only(s.to_string()),
            };
            Command::QuerySubmission(QuerySubmission { team, problem, status })
        }
        other => return Err(ParseError::UnknownCommand(other.to_string())),
    };

    Ok(Some(command))
}

/// Print one event as protocol lines.
pub fn render<W: Write>(event: &OutputEvent, out: &mut W) -> io::Result<()> {
    match event {
        OutputEvent::TeamAdded(_) => writeln!(out, "[Info]Add successfully."),
        OutputEvent::ContestStarted => writeln!(out, "[Info]Competition starts."),
        OutputEvent::Flushed => writeln!(out, "[Info]Flush scoreboard."),
        OutputEvent::Frozen => writeln!(out, "[Info]Freeze scoreboard."),
        OutputEvent::ScrollStarted => writeln!(out, "[Info]Scroll scoreboard."),
        OutputEvent::Scoreboard(board) => write!(out, "{board}"),
        OutputEvent::RankChanged(c) => {
            writeln!(out, "{} {} {} {}", c.team, c.passed, c.solved, c.penalty)
        }
        OutputEvent::Ranking(r) => {
            writeln!(out, "[Info]Complete query ranking.")?;
            if r.frozen {
                writeln!(
                    out,
                    "[Warning]Scoreboard is frozen. The ranking may be inaccurate until it were scrolled."
                )?;
            }
            writeln!(out, "{} NOW AT RANKING {}", r.team, r.rank)
        }
        OutputEvent::LastSubmission(found) => {
            writeln!(out, "[Info]Complete query submission.")?;
            match found {
                Some(s) => writeln!(out, "{} {} {} {}", s.team, s.problem, s.status, s.time),
                None => writeln!(out, "Cannot find any submission."),
            }
        }
        OutputEvent::Ended => writeln!(out, "[Info]Competition ends."),
        OutputEvent::Rejected { op, reason } => writeln!(out, "[Error]{op} failed: {reason}."),
    }
}
