//! Ranking - Comparator and rank assignment.
//!
//! Order of precedence:
//! 1. More problems solved
//! 2. Lower penalty time
//! 3. Smaller solve times, compared largest first
//! 4. Team name, ascending
//!
//! The name is unique, so the order is strict and ranks form a bijection
//! onto `1..=N`.

use std::cmp::Ordering;

use crate::ledger::{Team, TeamId};

/// Total order over teams; `Less` means `a` ranks better than `b`.
///
/// Reads only the cached `Standing`, so `refresh_standing` must run first.
pub fn compare(a: &Team, b: &Team) -> Ordering {
    let (sa, sb) = (&a.standing, &b.standing);

    sb.solved
        .cmp(&sa.solved)
        .then_with(|| sa.penalty.cmp(&sb.penalty))
        .then_with(|| compare_solve_times(&sa.solve_times, &sb.solve_times))
        .then_with(|| a.name().cmp(b.name()))
}

/// Lexicographic comparison of descending solve-time lists, up to the
/// shorter length.
#[inline]
fn compare_solve_times(a: &[u32], b: &[u32]) -> Ordering {
    a.iter()
        .zip(b)
        .map(|(x, y)| x.cmp(y))
        .find(|o| o.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Refresh every team's standing, sort `order` and write ranks back.
///
/// Idempotent: calling twice without intervening ledger changes produces
/// the same order and ranks.
pub fn recompute_rankings(teams: &mut [Team], order: &mut [TeamId]) {
    for team in teams.iter_mut() {
        team.refresh_standing();
    }

    order.sort_by(|&a, &b| compare(&teams[a], &teams[b]));

    for (pos, &id) in order.iter().enumerate() {
        teams[id].standing.rank = pos as u32 + 1;
    }
}
