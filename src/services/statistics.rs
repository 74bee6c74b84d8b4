use std::collections::HashMap;

use sqlx::SqlitePool;

use crate::db::{get_all_teams, get_players, get_stat_events};
use crate::error::AppResult;
use crate::models::{Player, StatEvent, StatKind, StatLeader, Team};

/// Grouping key for a leader row.
type LeaderKey = (String, String, String, Option<String>);

/// Sums `kind` events per (player, team, category, championship) and sorts
/// the totals in descending order. With `by_championship` off, totals are
/// global across championships and rows carry no championship id.
///
/// Rows with equal totals come out in order of first appearance, which is
/// not a ranking rule anyone should rely on.
pub fn leaders(
    kind: StatKind,
    events: &[StatEvent],
    players: &[Player],
    teams: &[Team],
    by_championship: bool,
) -> Vec<StatLeader> {
    let player_names: HashMap<&str, &str> =
        players.iter().map(|p| (p.id.as_str(), p.name.as_str())).collect();
    let team_names: HashMap<&str, &str> =
        teams.iter().map(|t| (t.id.as_str(), t.name.as_str())).collect();

    let mut slots: HashMap<LeaderKey, usize> = HashMap::new();
    let mut rows: Vec<StatLeader> = Vec::new();

    for event in events.iter().filter(|e| e.kind == kind) {
        let championship_id = if by_championship {
            event.championship_id.clone()
        } else {
            None
        };
        let key = (
            event.player_id.clone(),
            event.team_id.clone(),
            event.category.clone(),
            championship_id.clone(),
        );

        let slot = *slots.entry(key).or_insert_with(|| {
            rows.push(StatLeader {
                kind,
                player_id: event.player_id.clone(),
                player_name: player_names
                    .get(event.player_id.as_str())
                    .map_or_else(|| event.player_id.clone(), |n| n.to_string()),
                team_id: event.team_id.clone(),
                team_name: team_names
                    .get(event.team_id.as_str())
                    .map(|n| n.to_string())
                    .unwrap_or_default(),
                category: event.category.clone(),
                championship_id,
                total: 0,
            });
            rows.len() - 1
        });
        rows[slot].total = rows[slot].total.saturating_add(event.amount);
    }

    rows.sort_by(|a, b| b.total.cmp(&a.total));
    rows
}

pub async fn load_leaders(
    pool: &SqlitePool,
    kind: StatKind,
    by_championship: bool,
) -> AppResult<Vec<StatLeader>> {
    let events = get_stat_events(pool).await?;
    let players = get_players(pool, None).await?;
    let teams = get_all_teams(pool).await?;
    Ok(leaders(kind, &events, &players, &teams, by_championship))
}
