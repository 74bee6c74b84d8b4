use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::Utc;
use sqlx::SqlitePool;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::db::{get_all_teams_with, get_played_matches_with, replace_standings};
use crate::error::AppResult;
use crate::models::{Match, RecalculationSummary, Standing, Team};

pub const POINTS_PER_WIN: i32 = 3;
pub const POINTS_PER_DRAW: i32 = 1;

/// A standings table is scoped to one (category, group) pair.
pub type ScopeKey = (String, String);

#[derive(Debug, Default, Clone, Copy)]
struct Tally {
    played: i32,
    won: i32,
    drawn: i32,
    lost: i32,
    goals_for: i32,
    goals_against: i32,
    points: i32,
}

impl Tally {
    // Stored scores are not trusted to be small.
    fn record(&mut self, scored: i32, conceded: i32) {
        self.played = self.played.saturating_add(1);
        self.goals_for = self.goals_for.saturating_add(scored);
        self.goals_against = self.goals_against.saturating_add(conceded);
        match scored.cmp(&conceded) {
            std::cmp::Ordering::Greater => {
                self.won = self.won.saturating_add(1);
                self.points = self.points.saturating_add(POINTS_PER_WIN);
            }
            std::cmp::Ordering::Equal => {
                self.drawn = self.drawn.saturating_add(1);
                self.points = self.points.saturating_add(POINTS_PER_DRAW);
            }
            std::cmp::Ordering::Less => self.lost = self.lost.saturating_add(1),
        }
    }
}

/// Builds the ranked table for one scope. Every team in `teams` gets a row,
/// played or not. Only matches with a final score between two teams of the
/// scope, filed under the teams' category, are folded in; the count of those
/// is returned alongside.
///
/// Ranking is points, then goal difference, then goals scored, all
/// descending. Teams equal on all three keep their order in `teams`.
pub fn compute_table(teams: &[Team], matches: &[Match]) -> (Vec<Standing>, usize) {
    let index: HashMap<&str, usize> = teams
        .iter()
        .enumerate()
        .map(|(i, team)| (team.id.as_str(), i))
        .collect();

    let mut tallies = vec![Tally::default(); teams.len()];
    let mut folded = 0;

    for m in matches {
        let Some((home, away, home_score, away_score)) = m.final_score() else {
            continue;
        };
        let (Some(&h), Some(&a)) = (index.get(home), index.get(away)) else {
            continue;
        };
        // A fixture filed under another category belongs to no table here.
        if m.category != teams[h].category || m.category != teams[a].category {
            continue;
        }
        tallies[h].record(home_score, away_score);
        tallies[a].record(away_score, home_score);
        folded += 1;
    }

    let updated_at = Utc::now();
    let mut rows: Vec<Standing> = teams
        .iter()
        .zip(tallies)
        .map(|(team, t)| Standing {
            id: Uuid::new_v4().to_string(),
            team_id: team.id.clone(),
            team_name: team.name.clone(),
            category: team.category.clone(),
            group_name: team.group_name.clone(),
            position: 0,
            points: t.points,
            played: t.played,
            won: t.won,
            drawn: t.drawn,
            lost: t.lost,
            goals_for: t.goals_for,
            goals_against: t.goals_against,
            // Only once everything is folded.
            goal_difference: t.goals_for.saturating_sub(t.goals_against),
            updated_at,
        })
        .collect();

    // sort_by is stable.
    rows.sort_by(|a, b| {
        (b.points, b.goal_difference, b.goals_for).cmp(&(a.points, a.goal_difference, a.goals_for))
    });
    for (i, row) in rows.iter_mut().enumerate() {
        row.position = i as i32 + 1;
    }

    (rows, folded)
}

/// Splits teams into their (category, group) scopes and ranks each one.
/// Scopes come out in (category, group) order.
pub fn compute_all(teams: &[Team], matches: &[Match]) -> (Vec<Standing>, RecalculationSummary) {
    let mut scopes: BTreeMap<ScopeKey, Vec<Team>> = BTreeMap::new();
    for team in teams {
        scopes
            .entry((team.category.clone(), team.group_name.clone()))
            .or_default()
            .push(team.clone());
    }

    let played = matches.iter().filter(|m| m.status.is_played()).count();
    let mut summary = RecalculationSummary {
        scopes: scopes.len(),
        teams: teams.len(),
        ..Default::default()
    };

    let mut standings = Vec::with_capacity(teams.len());
    for ((category, group), scope_teams) in &scopes {
        let (rows, folded) = compute_table(scope_teams, matches);
        tracing::debug!(
            "Scope {} / {:?}: {} teams, {} matches folded",
            category,
            group,
            rows.len(),
            folded
        );
        summary.matches_folded += folded;
        standings.extend(rows);
    }
    summary.matches_skipped = played.saturating_sub(summary.matches_folded);

    (standings, summary)
}

/// Recomputes the standings table from match results. Runs are serialized
/// and each one swaps the whole table inside a single transaction.
#[derive(Clone, Default)]
pub struct StandingsEngine {
    lock: Arc<Mutex<()>>,
}

impl StandingsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn recalculate(&self, pool: &SqlitePool) -> AppResult<RecalculationSummary> {
        let _guard = self.lock.lock().await;

        let mut tx = pool.begin().await?;
        let teams = get_all_teams_with(&mut *tx).await?;
        let matches = get_played_matches_with(&mut *tx).await?;

        let (standings, summary) = compute_all(&teams, &matches);
        replace_standings(&mut tx, &standings).await?;
        tx.commit().await?;

        tracing::info!(
            "Recalculated standings: {} scopes, {} teams, {} matches folded, {} skipped",
            summary.scopes,
            summary.teams,
            summary.matches_folded,
            summary.matches_skipped
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::models::MatchStatus;
    use chrono::NaiveDate;

    fn team(id: &str, category: &str, group: &str) -> Team {
        Team {
            id: id.to_string(),
            name: format!("Team {}", id),
            category: category.to_string(),
            group_name: group.to_string(),
            logo_url: None,
        }
    }

    fn played(id: &str, home: Option<&str>, away: Option<&str>, hs: i32, aws: i32) -> Match {
        Match {
            id: id.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 4, 6).unwrap(),
            time: None,
            category: "X".to_string(),
            round: None,
            location: None,
            status: MatchStatus::Completed,
            home_team_id: home.map(String::from),
            away_team_id: away.map(String::from),
            home_score: Some(hs),
            away_score: Some(aws),
            championship_id: None,
        }
    }

    fn row<'a>(rows: &'a [Standing], team_id: &str) -> &'a Standing {
        rows.iter().find(|r| r.team_id == team_id).unwrap()
    }

    #[test]
    fn test_fold_win_and_draw() {
        let teams = vec![team("A", "X", "G"), team("B", "X", "G"), team("C", "X", "G")];
        let matches = vec![
            played("m1", Some("A"), Some("B"), 3, 1),
            played("m2", Some("B"), Some("C"), 2, 2),
        ];

        let (rows, folded) = compute_table(&teams, &matches);
        assert_eq!(folded, 2);

        let a = row(&rows, "A");
        assert_eq!((a.played, a.won, a.points), (1, 1, 3));
        assert_eq!((a.goals_for, a.goals_against, a.goal_difference), (3, 1, 2));

        let b = row(&rows, "B");
        assert_eq!((b.played, b.won, b.drawn, b.lost, b.points), (2, 0, 1, 1, 1));
        assert_eq!((b.goals_for, b.goals_against, b.goal_difference), (3, 5, -2));

        let c = row(&rows, "C");
        assert_eq!((c.played, c.drawn, c.points), (1, 1, 1));
        assert_eq!((c.goals_for, c.goals_against, c.goal_difference), (2, 2, 0));

        let order: Vec<_> = rows.iter().map(|r| r.team_id.as_str()).collect();
        assert_eq!(order, vec!["A", "C", "B"]);
        let positions: Vec<_> = rows.iter().map(|r| r.position).collect();
        assert_eq!(positions, vec![1, 2, 3]);
    }

    #[test]
    fn test_team_without_matches_is_listed_with_zeros() {
        let teams = vec![team("Idle", "X", "G"), team("A", "X", "G"), team("B", "X", "G")];
        let matches = vec![played("m1", Some("A"), Some("B"), 1, 1)];

        let (rows, _) = compute_table(&teams, &matches);
        assert_eq!(rows.len(), 3);

        let idle = row(&rows, "Idle");
        assert_eq!(
            (idle.played, idle.points, idle.goals_for, idle.goals_against, idle.goal_difference),
            (0, 0, 0, 0, 0)
        );
        assert_eq!(idle.position, 3);
    }

    #[test]
    fn test_placeholder_fixture_is_not_folded() {
        let teams = vec![team("A", "X", "G"), team("B", "X", "G")];
        let matches = vec![
            played("final", None, Some("A"), 4, 0),
            played("semi", Some("B"), None, 0, 2),
        ];

        let (rows, folded) = compute_table(&teams, &matches);
        assert_eq!(folded, 0);
        assert!(rows.iter().all(|r| r.played == 0 && r.points == 0));
    }

    #[test]
    fn test_full_ties_keep_input_order() {
        let teams = vec![team("Z", "X", "G"), team("M", "X", "G"), team("A", "X", "G")];
        let (rows, _) = compute_table(&teams, &[]);
        let order: Vec<_> = rows.iter().map(|r| r.team_id.as_str()).collect();
        assert_eq!(order, vec!["Z", "M", "A"]);
    }

    #[test]
    fn test_goals_scored_breaks_goal_difference_tie() {
        let teams = vec![
            team("A", "X", "G"),
            team("B", "X", "G"),
            team("C", "X", "G"),
            team("D", "X", "G"),
        ];
        // A and C both win by one; C scores more.
        let matches = vec![
            played("m1", Some("A"), Some("B"), 1, 0),
            played("m2", Some("C"), Some("D"), 3, 2),
        ];
        let (rows, _) = compute_table(&teams, &matches);
        let order: Vec<_> = rows.iter().map(|r| r.team_id.as_str()).collect();
        assert_eq!(order, vec!["C", "A", "D", "B"]);
    }

    #[test]
    fn test_huge_stored_scores_saturate() {
        let teams = vec![team("A", "X", "G"), team("B", "X", "G")];
        let matches = vec![
            played("m1", Some("A"), Some("B"), 2_000_000_000, 0),
            played("m2", Some("A"), Some("B"), 2_000_000_000, 0),
        ];
        let (rows, folded) = compute_table(&teams, &matches);
        assert_eq!(folded, 2);
        let a = row(&rows, "A");
        assert_eq!(a.goals_for, i32::MAX);
        assert_eq!(a.points, 6);
        assert_eq!(row(&rows, "B").goal_difference, -i32::MAX);
    }

    #[test]
    fn test_pending_matches_are_ignored() {
        let teams = vec![team("A", "X", "G"), team("B", "X", "G")];
        let mut scheduled = played("m1", Some("A"), Some("B"), 0, 0);
        scheduled.status = MatchStatus::Scheduled;
        scheduled.home_score = None;
        scheduled.away_score = None;

        let (rows, folded) = compute_table(&teams, &[scheduled]);
        assert_eq!(folded, 0);
        assert!(rows.iter().all(|r| r.played == 0));
    }

    #[test]
    fn test_compute_all_splits_scopes() {
        let teams = vec![
            team("A", "SUB-11", "A"),
            team("B", "SUB-11", "A"),
            team("C", "SUB-11", "B"),
            team("D", "SUB-13", ""),
        ];
        let mut matches = vec![
            played("m1", Some("A"), Some("B"), 2, 0),
            // Cross-group fixture: belongs to no single table.
            played("m2", Some("B"), Some("C"), 1, 0),
            played("m3", None, Some("D"), 1, 0),
            played("m4", Some("B"), Some("A"), 5, 0),
        ];
        for m in matches.iter_mut() {
            m.category = "SUB-11".to_string();
        }
        // Two SUB-11 teams, but the fixture is filed under SUB-13.
        matches[3].category = "SUB-13".to_string();

        let (rows, summary) = compute_all(&teams, &matches);
        assert_eq!(summary.scopes, 3);
        assert_eq!(summary.teams, 4);
        assert_eq!(summary.matches_folded, 1);
        assert_eq!(summary.matches_skipped, 3);
        assert_eq!(row(&rows, "A").points, 3);

        assert_eq!(row(&rows, "A").position, 1);
        assert_eq!(row(&rows, "B").played, 1);
        assert_eq!(row(&rows, "C").position, 1);
        assert_eq!(row(&rows, "C").played, 0);
        assert_eq!(row(&rows, "D").group_name, "");
    }

    #[tokio::test]
    async fn test_recalculate_replaces_previous_table() {
        let pool = db::test_pool().await;
        for t in [team("A", "X", "G"), team("B", "X", "G")] {
            db::insert_team(&pool, &t).await.unwrap();
        }
        db::insert_match(&pool, &played("m1", Some("A"), Some("B"), 2, 1)).await.unwrap();

        let engine = StandingsEngine::new();
        engine.recalculate(&pool).await.unwrap();
        let first = db::get_standings(&pool).await.unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].team_id, "A");

        // Amend the score after the table was built; recalculation follows.
        db::update_match(&pool, &played("m1", Some("A"), Some("B"), 0, 3)).await.unwrap();
        let summary = engine.recalculate(&pool).await.unwrap();
        assert_eq!(summary.matches_folded, 1);

        let second = db::get_standings(&pool).await.unwrap();
        assert_eq!(second.len(), 2);
        assert_eq!(second[0].team_id, "B");
        assert_eq!(second[0].points, 3);
        assert_eq!(second[1].points, 0);
    }

    #[tokio::test]
    async fn test_concurrent_recalculations_do_not_interleave() {
        let pool = db::test_pool().await;
        for t in [team("A", "X", "G"), team("B", "X", "G"), team("C", "X", "G")] {
            db::insert_team(&pool, &t).await.unwrap();
        }
        db::insert_match(&pool, &played("m1", Some("A"), Some("C"), 1, 0)).await.unwrap();

        let engine = StandingsEngine::new();
        let (a, b) = tokio::join!(engine.recalculate(&pool), engine.recalculate(&pool));
        a.unwrap();
        b.unwrap();

        let rows = db::get_standings(&pool).await.unwrap();
        assert_eq!(rows.len(), 3);
    }
}
