use anyhow::Result;
use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;

use crate::db::{insert_match, insert_player, insert_stat_event, insert_team};
use crate::models::{Match, MatchStatus, Player, StatEvent, StatKind, Team};
use crate::services::StandingsEngine;

const CHAMPIONSHIP_ID: &str = "copa_2024";

pub async fn seed_data(pool: &SqlitePool) -> Result<()> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM teams")
        .fetch_one(pool)
        .await?;

    if count > 0 {
        tracing::info!("Database already seeded ({} teams found), skipping.", count);
        return Ok(());
    }

    tracing::info!("Seeding database with the demo league...");

    seed_championship(pool).await?;
    seed_teams(pool).await?;
    seed_matches(pool).await?;
    seed_players_and_events(pool).await?;

    StandingsEngine::new().recalculate(pool).await?;

    tracing::info!("Database seeded successfully.");
    Ok(())
}

async fn seed_championship(pool: &SqlitePool) -> Result<()> {
    // Lists stored as JSON text, the way older rows look.
    sqlx::query(
        r#"INSERT INTO championships (id, name, year, start_date, end_date, categories, sponsors, status)
           VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
    )
    .bind(CHAMPIONSHIP_ID)
    .bind("Copa Municipal de Base")
    .bind(2024)
    .bind("2024-03-02")
    .bind("2024-06-29")
    .bind(r#"["SUB-11","SUB-13"]"#)
    .bind(r#"[{"name":"Padaria Central","logo":null},{"name":"Auto Peças Silva","logo":"sponsors/silva.png"}]"#)
    .bind("ongoing")
    .execute(pool)
    .await?;
    Ok(())
}

async fn seed_teams(pool: &SqlitePool) -> Result<()> {
    // (id, name, category, group)
    let teams: Vec<(&str, &str, &str, &str)> = vec![
        ("s11_fur", "Furacão",        "SUB-11", "Grupo A"),
        ("s11_fed", "Federal",        "SUB-11", "Grupo A"),
        ("s11_est", "Estrela do Sul", "SUB-11", "Grupo A"),
        ("s11_uni", "Unidos da Vila", "SUB-11", "Grupo A"),
        ("s11_atl", "Atlético Bairro","SUB-11", "Grupo B"),
        ("s11_pal", "Palmeirinha",    "SUB-11", "Grupo B"),
        ("s11_rea", "Real Ipiranga",  "SUB-11", "Grupo B"),
        ("s13_fur", "Furacão",        "SUB-13", ""),
        ("s13_fed", "Federal",        "SUB-13", ""),
        ("s13_est", "Estrela do Sul", "SUB-13", ""),
    ];

    for (id, name, category, group) in &teams {
        let team = Team {
            id: id.to_string(),
            name: name.to_string(),
            category: category.to_string(),
            group_name: group.to_string(),
            logo_url: None,
        };
        insert_team(pool, &team).await?;
    }
    Ok(())
}

async fn seed_matches(pool: &SqlitePool) -> Result<()> {
    // (id, date, category, round, home, away, score, status)
    let fixtures: Vec<(&str, &str, &str, &str, Option<&str>, Option<&str>, Option<(i32, i32)>, MatchStatus)> = vec![
        ("m01", "2024-03-02", "SUB-11", "1ª rodada", Some("s11_fur"), Some("s11_fed"), Some((3, 1)), MatchStatus::Finished),
        ("m02", "2024-03-02", "SUB-11", "1ª rodada", Some("s11_est"), Some("s11_uni"), Some((0, 0)), MatchStatus::Finished),
        ("m03", "2024-03-09", "SUB-11", "2ª rodada", Some("s11_fed"), Some("s11_est"), Some((2, 2)), MatchStatus::Completed),
        ("m04", "2024-03-09", "SUB-11", "2ª rodada", Some("s11_uni"), Some("s11_fur"), Some((1, 2)), MatchStatus::Completed),
        ("m05", "2024-03-16", "SUB-11", "3ª rodada", Some("s11_fur"), Some("s11_est"), None, MatchStatus::Scheduled),
        ("m06", "2024-03-16", "SUB-11", "3ª rodada", Some("s11_fed"), Some("s11_uni"), None, MatchStatus::Postponed),
        ("m07", "2024-03-02", "SUB-11", "1ª rodada", Some("s11_atl"), Some("s11_pal"), Some((1, 4)), MatchStatus::Finished),
        ("m08", "2024-03-09", "SUB-11", "2ª rodada", Some("s11_pal"), Some("s11_rea"), Some((2, 0)), MatchStatus::Finished),
        ("m09", "2024-03-03", "SUB-13", "1ª rodada", Some("s13_fur"), Some("s13_est"), Some((2, 3)), MatchStatus::Finished),
        ("m10", "2024-03-10", "SUB-13", "2ª rodada", Some("s13_fed"), Some("s13_fur"), None, MatchStatus::Scheduled),
        // Playoff slot waiting for the group winners.
        ("m11", "2024-06-29", "SUB-11", "Final",     None,            None,            None, MatchStatus::Scheduled),
    ];

    for (id, date, category, round, home, away, score, status) in &fixtures {
        let m = Match {
            id: id.to_string(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d")?,
            time: Some("09:00".to_string()),
            category: category.to_string(),
            round: Some(round.to_string()),
            location: Some("Estádio Municipal".to_string()),
            status: *status,
            home_team_id: home.map(String::from),
            away_team_id: away.map(String::from),
            home_score: score.map(|s| s.0),
            away_score: score.map(|s| s.1),
            championship_id: Some(CHAMPIONSHIP_ID.to_string()),
        };
        insert_match(pool, &m).await?;
    }
    Ok(())
}

async fn seed_players_and_events(pool: &SqlitePool) -> Result<()> {
    // (id, name, number, position, team)
    let players: Vec<(&str, &str, i32, &str, &str)> = vec![
        ("p01", "Lucas Almeida",   9, "Atacante", "s11_fur"),
        ("p02", "Gabriel Souza",  10, "Meia",     "s11_fur"),
        ("p03", "Rafael Lima",     7, "Atacante", "s11_fed"),
        ("p04", "Mateus Rocha",    4, "Zagueiro", "s11_est"),
        ("p05", "Pedro Henrique", 11, "Atacante", "s11_pal"),
        ("p06", "João Vitor",      9, "Atacante", "s13_est"),
    ];

    for (id, name, number, position, team_id) in &players {
        let player = Player {
            id: id.to_string(),
            name: name.to_string(),
            number: Some(*number),
            position: Some(position.to_string()),
            photo_url: None,
            team_id: team_id.to_string(),
        };
        insert_player(pool, &player).await?;
    }

    // (player, team, category, match, kind, amount)
    let events: Vec<(&str, &str, &str, &str, StatKind, i32)> = vec![
        ("p01", "s11_fur", "SUB-11", "m01", StatKind::Goal, 2),
        ("p02", "s11_fur", "SUB-11", "m01", StatKind::Goal, 1),
        ("p03", "s11_fed", "SUB-11", "m01", StatKind::Goal, 1),
        ("p03", "s11_fed", "SUB-11", "m03", StatKind::Goal, 2),
        ("p01", "s11_fur", "SUB-11", "m04", StatKind::Goal, 1),
        ("p02", "s11_fur", "SUB-11", "m04", StatKind::Goal, 1),
        ("p05", "s11_pal", "SUB-11", "m07", StatKind::Goal, 3),
        ("p06", "s13_est", "SUB-13", "m09", StatKind::Goal, 2),
        ("p04", "s11_est", "SUB-11", "m03", StatKind::YellowCard, 1),
        ("p04", "s11_est", "SUB-11", "m02", StatKind::YellowCard, 1),
        ("p03", "s11_fed", "SUB-11", "m03", StatKind::YellowCard, 1),
        ("p04", "s11_est", "SUB-11", "m03", StatKind::RedCard, 1),
    ];

    let now = Utc::now();
    for (i, (player_id, team_id, category, match_id, kind, amount)) in events.iter().enumerate() {
        let event = StatEvent {
            id: format!("ev{:02}", i + 1),
            kind: *kind,
            player_id: player_id.to_string(),
            team_id: team_id.to_string(),
            category: category.to_string(),
            championship_id: Some(CHAMPIONSHIP_ID.to_string()),
            match_id: Some(match_id.to_string()),
            minute: None,
            half: None,
            amount: *amount,
            created_at: now,
        };
        insert_stat_event(pool, &event).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    #[tokio::test]
    async fn test_seed_builds_consistent_tables() {
        let pool = db::test_pool().await;
        seed_data(&pool).await.unwrap();
        // Second run is a no-op.
        seed_data(&pool).await.unwrap();

        let standings = db::get_standings(&pool).await.unwrap();
        assert_eq!(standings.len(), 10);

        let group_a: Vec<_> = standings
            .iter()
            .filter(|s| s.category == "SUB-11" && s.group_name == "Grupo A")
            .collect();
        assert_eq!(group_a[0].team_name, "Furacão");
        assert_eq!(group_a[0].points, 6);

        let champ = db::get_championship_by_id(&pool, CHAMPIONSHIP_ID).await.unwrap().unwrap();
        assert_eq!(champ.categories, vec!["SUB-11", "SUB-13"]);
        assert_eq!(champ.sponsors.len(), 2);
    }
}
