pub mod seed;
pub use seed::seed_data;

use anyhow::{anyhow, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqliteRow};
use sqlx::{Executor, Row, Sqlite, SqlitePool, Transaction};
use std::str::FromStr;

use crate::models::*;
use crate::services::normalizer::{sponsor_list, string_list};

/// Tables the application expects to find.
pub const TABLES: [&str; 6] = [
    "teams",
    "matches",
    "players",
    "championships",
    "stat_events",
    "standings",
];

pub async fn clear_all_data(pool: &SqlitePool) -> Result<()> {
    for table in ["standings", "stat_events", "players", "matches", "championships", "teams"] {
        sqlx::query(&format!("DELETE FROM {}", table)).execute(pool).await?;
    }
    tracing::info!("All data cleared");
    Ok(())
}

pub async fn create_pool(database_url: &str) -> Result<SqlitePool> {
    // Strip the "sqlite:" prefix to get the file path, create parent dir if needed
    let file_path = database_url
        .strip_prefix("sqlite:///")
        .or_else(|| database_url.strip_prefix("sqlite://"))
        .or_else(|| database_url.strip_prefix("sqlite:"))
        .unwrap_or(database_url);

    if !file_path.starts_with(":memory:") {
        if let Some(parent) = std::path::Path::new(file_path).parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
        }
    }

    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

    let pool = SqlitePool::connect_with(options).await?;
    Ok(pool)
}

/// One long-lived connection to a private in-memory database, schema applied.
#[cfg(test)]
pub async fn test_pool() -> SqlitePool {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    init_database_with_pool(&pool).await.expect("schema");
    pool
}

/// Called from the CLI where no pool exists yet.
pub async fn init_database(database_url: &str) -> Result<()> {
    let pool = create_pool(database_url).await?;
    init_database_with_pool(&pool).await
}

/// Called from the server so schema creation shares the main pool.
pub async fn init_database_with_pool(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS teams (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            category TEXT NOT NULL,
            group_name TEXT NOT NULL DEFAULT '',
            logo_url TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS championships (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            year INTEGER,
            start_date TEXT,
            end_date TEXT,
            categories TEXT,
            sponsors TEXT,
            status TEXT NOT NULL DEFAULT 'upcoming'
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS matches (
            id TEXT PRIMARY KEY,
            date TEXT NOT NULL,
            time TEXT,
            category TEXT NOT NULL,
            round TEXT,
            location TEXT,
            status TEXT NOT NULL DEFAULT 'scheduled',
            home_team_id TEXT,
            away_team_id TEXT,
            home_score INTEGER,
            away_score INTEGER,
            championship_id TEXT,
            FOREIGN KEY (home_team_id) REFERENCES teams (id),
            FOREIGN KEY (away_team_id) REFERENCES teams (id),
            FOREIGN KEY (championship_id) REFERENCES championships (id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS players (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            number INTEGER,
            position TEXT,
            photo_url TEXT,
            team_id TEXT NOT NULL,
            FOREIGN KEY (team_id) REFERENCES teams (id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Append-only: corrections delete or edit the event itself.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS stat_events (
            id TEXT PRIMARY KEY,
            kind TEXT NOT NULL,
            player_id TEXT NOT NULL,
            team_id TEXT NOT NULL,
            category TEXT NOT NULL,
            championship_id TEXT,
            match_id TEXT,
            minute INTEGER,
            half INTEGER,
            amount INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            FOREIGN KEY (player_id) REFERENCES players (id),
            FOREIGN KEY (team_id) REFERENCES teams (id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Derived from matches; rewritten wholesale by every recalculation.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS standings (
            id TEXT PRIMARY KEY,
            team_id TEXT NOT NULL,
            team_name TEXT NOT NULL,
            category TEXT NOT NULL,
            group_name TEXT NOT NULL DEFAULT '',
            position INTEGER NOT NULL,
            points INTEGER NOT NULL DEFAULT 0,
            played INTEGER NOT NULL DEFAULT 0,
            won INTEGER NOT NULL DEFAULT 0,
            drawn INTEGER NOT NULL DEFAULT 0,
            lost INTEGER NOT NULL DEFAULT 0,
            goals_for INTEGER NOT NULL DEFAULT 0,
            goals_against INTEGER NOT NULL DEFAULT 0,
            goal_difference INTEGER NOT NULL DEFAULT 0,
            updated_at TEXT NOT NULL,
            UNIQUE (team_id, category, group_name)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_matches_date ON matches(date)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_matches_status ON matches(status)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_teams_category_group ON teams(category, group_name)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_stat_events_player ON stat_events(player_id)")
        .execute(pool)
        .await?;

    tracing::info!("Database initialized successfully");
    Ok(())
}

/// True when every application table is present.
pub async fn schema_exists(pool: &SqlitePool) -> Result<bool> {
    let rows = sqlx::query("SELECT name FROM sqlite_master WHERE type = 'table'")
        .fetch_all(pool)
        .await?;
    let present: Vec<String> = rows.iter().map(|r| r.get("name")).collect();
    Ok(TABLES.iter().all(|t| present.iter().any(|p| p == t)))
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    Ok(NaiveDate::parse_from_str(raw, "%Y-%m-%d")?)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    Ok(chrono::DateTime::parse_from_rfc3339(raw)?.with_timezone(&Utc))
}

// Team operations
pub async fn insert_team(pool: &SqlitePool, team: &Team) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO teams (id, name, category, group_name, logo_url)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&team.id)
    .bind(&team.name)
    .bind(&team.category)
    .bind(&team.group_name)
    .bind(&team.logo_url)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn update_team(pool: &SqlitePool, team: &Team) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE teams SET name = ?, category = ?, group_name = ?, logo_url = ? WHERE id = ?",
    )
    .bind(&team.name)
    .bind(&team.category)
    .bind(&team.group_name)
    .bind(&team.logo_url)
    .bind(&team.id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn get_team_by_id(pool: &SqlitePool, team_id: &str) -> Result<Option<Team>> {
    let team = sqlx::query_as::<_, Team>("SELECT id, name, category, group_name, logo_url FROM teams WHERE id = ?")
        .bind(team_id)
        .fetch_optional(pool)
        .await?;
    Ok(team)
}

pub async fn get_all_teams(pool: &SqlitePool) -> Result<Vec<Team>> {
    get_all_teams_with(pool).await
}

/// Same as [`get_all_teams`] but usable inside a transaction.
pub async fn get_all_teams_with<'e, E>(executor: E) -> Result<Vec<Team>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let teams = sqlx::query_as::<_, Team>(
        "SELECT id, name, category, group_name, logo_url FROM teams ORDER BY category, group_name, name",
    )
    .fetch_all(executor)
    .await?;
    Ok(teams)
}

/// Case-insensitive name search.
pub async fn find_teams_by_name(pool: &SqlitePool, name: &str) -> Result<Vec<Team>> {
    let teams = sqlx::query_as::<_, Team>(
        "SELECT id, name, category, group_name, logo_url FROM teams WHERE LOWER(name) LIKE LOWER(?) ORDER BY name, category",
    )
    .bind(format!("%{}%", name))
    .fetch_all(pool)
    .await?;
    Ok(teams)
}

pub async fn delete_team(pool: &SqlitePool, team_id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM teams WHERE id = ?")
        .bind(team_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

// Match operations
fn match_from_row(row: &SqliteRow) -> Result<Match> {
    let status: String = row.get("status");
    Ok(Match {
        id: row.get("id"),
        date: parse_date(&row.get::<String, _>("date"))?,
        time: row.get("time"),
        category: row.get("category"),
        round: row.get("round"),
        location: row.get("location"),
        status: MatchStatus::parse(&status).ok_or_else(|| anyhow!("unknown match status {:?}", status))?,
        home_team_id: row.get("home_team_id"),
        away_team_id: row.get("away_team_id"),
        home_score: row.get("home_score"),
        away_score: row.get("away_score"),
        championship_id: row.get("championship_id"),
    })
}

pub async fn insert_match(pool: &SqlitePool, match_data: &Match) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO matches
        (id, date, time, category, round, location, status,
         home_team_id, away_team_id, home_score, away_score, championship_id)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&match_data.id)
    .bind(match_data.date.to_string())
    .bind(&match_data.time)
    .bind(&match_data.category)
    .bind(&match_data.round)
    .bind(&match_data.location)
    .bind(match_data.status.as_str())
    .bind(&match_data.home_team_id)
    .bind(&match_data.away_team_id)
    .bind(match_data.home_score)
    .bind(match_data.away_score)
    .bind(&match_data.championship_id)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn update_match(pool: &SqlitePool, match_data: &Match) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE matches SET
            date = ?, time = ?, category = ?, round = ?, location = ?, status = ?,
            home_team_id = ?, away_team_id = ?, home_score = ?, away_score = ?,
            championship_id = ?
        WHERE id = ?
        "#,
    )
    .bind(match_data.date.to_string())
    .bind(&match_data.time)
    .bind(&match_data.category)
    .bind(&match_data.round)
    .bind(&match_data.location)
    .bind(match_data.status.as_str())
    .bind(&match_data.home_team_id)
    .bind(&match_data.away_team_id)
    .bind(match_data.home_score)
    .bind(match_data.away_score)
    .bind(&match_data.championship_id)
    .bind(&match_data.id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn get_match_by_id(pool: &SqlitePool, match_id: &str) -> Result<Option<Match>> {
    let row = sqlx::query("SELECT * FROM matches WHERE id = ?")
        .bind(match_id)
        .fetch_optional(pool)
        .await?;
    row.as_ref().map(match_from_row).transpose()
}

pub async fn get_matches(pool: &SqlitePool) -> Result<Vec<Match>> {
    let rows = sqlx::query("SELECT * FROM matches ORDER BY date, time, id")
        .fetch_all(pool)
        .await?;
    rows.iter().map(match_from_row).collect()
}

/// Matches in a terminal played state, oldest first.
pub async fn get_played_matches_with<'e, E>(executor: E) -> Result<Vec<Match>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query(
        "SELECT * FROM matches WHERE status IN ('completed', 'finished') ORDER BY date, time, id",
    )
    .fetch_all(executor)
    .await?;
    rows.iter().map(match_from_row).collect()
}

pub async fn delete_match(pool: &SqlitePool, match_id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM matches WHERE id = ?")
        .bind(match_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

// Player operations
pub async fn insert_player(pool: &SqlitePool, player: &Player) -> Result<()> {
    sqlx::query(
        "INSERT INTO players (id, name, number, position, photo_url, team_id) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&player.id)
    .bind(&player.name)
    .bind(player.number)
    .bind(&player.position)
    .bind(&player.photo_url)
    .bind(&player.team_id)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn update_player(pool: &SqlitePool, player: &Player) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE players SET name = ?, number = ?, position = ?, photo_url = ?, team_id = ? WHERE id = ?",
    )
    .bind(&player.name)
    .bind(player.number)
    .bind(&player.position)
    .bind(&player.photo_url)
    .bind(&player.team_id)
    .bind(&player.id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn get_player_by_id(pool: &SqlitePool, player_id: &str) -> Result<Option<Player>> {
    let player = sqlx::query_as::<_, Player>(
        "SELECT id, name, number, position, photo_url, team_id FROM players WHERE id = ?",
    )
    .bind(player_id)
    .fetch_optional(pool)
    .await?;
    Ok(player)
}

pub async fn get_players(pool: &SqlitePool, team_id: Option<&str>) -> Result<Vec<Player>> {
    let query = if team_id.is_some() {
        "SELECT id, name, number, position, photo_url, team_id FROM players WHERE team_id = ? ORDER BY number, name"
    } else {
        "SELECT id, name, number, position, photo_url, team_id FROM players ORDER BY team_id, number, name"
    };

    let mut query_builder = sqlx::query_as::<_, Player>(query);
    if let Some(team_id) = team_id {
        query_builder = query_builder.bind(team_id);
    }

    Ok(query_builder.fetch_all(pool).await?)
}

pub async fn delete_player(pool: &SqlitePool, player_id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM players WHERE id = ?")
        .bind(player_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

// Championship operations
fn championship_from_row(row: &SqliteRow) -> Result<Championship> {
    // List columns hold JSON text; whatever is in there goes through the normalizer.
    let categories: Option<String> = row.get("categories");
    let sponsors: Option<String> = row.get("sponsors");
    let status: String = row.get("status");
    let start_date: Option<String> = row.get("start_date");
    let end_date: Option<String> = row.get("end_date");

    Ok(Championship {
        id: row.get("id"),
        name: row.get("name"),
        year: row.get("year"),
        start_date: start_date.as_deref().map(parse_date).transpose()?,
        end_date: end_date.as_deref().map(parse_date).transpose()?,
        categories: string_list(categories.map(Value::String).as_ref()),
        sponsors: sponsor_list(sponsors.map(Value::String).as_ref()),
        status: ChampionshipStatus::parse(&status).unwrap_or_default(),
    })
}

fn championship_lists(championship: &Championship) -> Result<(String, String)> {
    Ok((
        serde_json::to_string(&championship.categories)?,
        serde_json::to_string(&championship.sponsors)?,
    ))
}

pub async fn insert_championship(pool: &SqlitePool, championship: &Championship) -> Result<()> {
    let (categories, sponsors) = championship_lists(championship)?;
    sqlx::query(
        r#"
        INSERT INTO championships (id, name, year, start_date, end_date, categories, sponsors, status)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&championship.id)
    .bind(&championship.name)
    .bind(championship.year)
    .bind(championship.start_date.map(|d| d.to_string()))
    .bind(championship.end_date.map(|d| d.to_string()))
    .bind(categories)
    .bind(sponsors)
    .bind(championship.status.as_str())
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn update_championship(pool: &SqlitePool, championship: &Championship) -> Result<bool> {
    let (categories, sponsors) = championship_lists(championship)?;
    let result = sqlx::query(
        r#"
        UPDATE championships SET
            name = ?, year = ?, start_date = ?, end_date = ?, categories = ?, sponsors = ?, status = ?
        WHERE id = ?
        "#,
    )
    .bind(&championship.name)
    .bind(championship.year)
    .bind(championship.start_date.map(|d| d.to_string()))
    .bind(championship.end_date.map(|d| d.to_string()))
    .bind(categories)
    .bind(sponsors)
    .bind(championship.status.as_str())
    .bind(&championship.id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn get_championship_by_id(pool: &SqlitePool, id: &str) -> Result<Option<Championship>> {
    let row = sqlx::query("SELECT * FROM championships WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    row.as_ref().map(championship_from_row).transpose()
}

pub async fn get_championships(pool: &SqlitePool) -> Result<Vec<Championship>> {
    let rows = sqlx::query("SELECT * FROM championships ORDER BY year DESC, name")
        .fetch_all(pool)
        .await?;
    rows.iter().map(championship_from_row).collect()
}

pub async fn delete_championship(pool: &SqlitePool, id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM championships WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

// Statistic event operations
fn stat_event_from_row(row: &SqliteRow) -> Result<StatEvent> {
    let kind: String = row.get("kind");
    Ok(StatEvent {
        id: row.get("id"),
        kind: StatKind::parse(&kind).ok_or_else(|| anyhow!("unknown statistic kind {:?}", kind))?,
        player_id: row.get("player_id"),
        team_id: row.get("team_id"),
        category: row.get("category"),
        championship_id: row.get("championship_id"),
        match_id: row.get("match_id"),
        minute: row.get("minute"),
        half: row.get("half"),
        amount: row.get("amount"),
        created_at: parse_timestamp(&row.get::<String, _>("created_at"))?,
    })
}

pub async fn insert_stat_event(pool: &SqlitePool, event: &StatEvent) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO stat_events
        (id, kind, player_id, team_id, category, championship_id, match_id, minute, half, amount, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&event.id)
    .bind(event.kind.as_str())
    .bind(&event.player_id)
    .bind(&event.team_id)
    .bind(&event.category)
    .bind(&event.championship_id)
    .bind(&event.match_id)
    .bind(event.minute)
    .bind(event.half)
    .bind(event.amount)
    .bind(event.created_at.to_rfc3339())
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn get_stat_events(pool: &SqlitePool) -> Result<Vec<StatEvent>> {
    let rows = sqlx::query("SELECT * FROM stat_events ORDER BY created_at, id")
        .fetch_all(pool)
        .await?;
    rows.iter().map(stat_event_from_row).collect()
}

pub async fn delete_stat_event(pool: &SqlitePool, id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM stat_events WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

// Standing operations
fn standing_from_row(row: &SqliteRow) -> Result<Standing> {
    Ok(Standing {
        id: row.get("id"),
        team_id: row.get("team_id"),
        team_name: row.get("team_name"),
        category: row.get("category"),
        group_name: row.get("group_name"),
        position: row.get("position"),
        points: row.get("points"),
        played: row.get("played"),
        won: row.get("won"),
        drawn: row.get("drawn"),
        lost: row.get("lost"),
        goals_for: row.get("goals_for"),
        goals_against: row.get("goals_against"),
        goal_difference: row.get("goal_difference"),
        updated_at: parse_timestamp(&row.get::<String, _>("updated_at"))?,
    })
}

pub async fn get_standings(pool: &SqlitePool) -> Result<Vec<Standing>> {
    let rows = sqlx::query("SELECT * FROM standings ORDER BY category, group_name, position")
        .fetch_all(pool)
        .await?;
    rows.iter().map(standing_from_row).collect()
}

pub async fn get_standing_by_id(pool: &SqlitePool, id: &str) -> Result<Option<Standing>> {
    let row = sqlx::query("SELECT * FROM standings WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    row.as_ref().map(standing_from_row).transpose()
}

/// Manual override of a derived row. The next recalculation discards it.
pub async fn update_standing(pool: &SqlitePool, standing: &Standing) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE standings SET
            position = ?, points = ?, played = ?, won = ?, drawn = ?, lost = ?,
            goals_for = ?, goals_against = ?, goal_difference = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(standing.position)
    .bind(standing.points)
    .bind(standing.played)
    .bind(standing.won)
    .bind(standing.drawn)
    .bind(standing.lost)
    .bind(standing.goals_for)
    .bind(standing.goals_against)
    .bind(standing.goal_difference)
    .bind(Utc::now().to_rfc3339())
    .bind(&standing.id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Swaps the whole standings table inside the caller's transaction.
pub async fn replace_standings(tx: &mut Transaction<'_, Sqlite>, standings: &[Standing]) -> Result<()> {
    sqlx::query("DELETE FROM standings").execute(&mut **tx).await?;

    for s in standings {
        sqlx::query(
            r#"
            INSERT INTO standings
            (id, team_id, team_name, category, group_name, position, points, played, won, drawn,
             lost, goals_for, goals_against, goal_difference, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&s.id)
        .bind(&s.team_id)
        .bind(&s.team_name)
        .bind(&s.category)
        .bind(&s.group_name)
        .bind(s.position)
        .bind(s.points)
        .bind(s.played)
        .bind(s.won)
        .bind(s.drawn)
        .bind(s.lost)
        .bind(s.goals_for)
        .bind(s.goals_against)
        .bind(s.goal_difference)
        .bind(s.updated_at.to_rfc3339())
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    fn sample_match(status: MatchStatus, scores: Option<(i32, i32)>) -> Match {
        Match {
            id: "m1".into(),
            date: NaiveDate::from_ymd_opt(2024, 4, 6).unwrap(),
            time: Some("09:00".into()),
            category: "SUB-11".into(),
            round: Some("1ª rodada".into()),
            location: Some("Campo do Bairro".into()),
            status,
            home_team_id: Some("a".into()),
            away_team_id: Some("b".into()),
            home_score: scores.map(|s| s.0),
            away_score: scores.map(|s| s.1),
            championship_id: None,
        }
    }

    #[tokio::test]
    async fn test_schema_check_and_creation() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        assert!(!schema_exists(&pool).await.unwrap());
        init_database_with_pool(&pool).await.unwrap();
        assert!(schema_exists(&pool).await.unwrap());
        // Idempotent.
        init_database_with_pool(&pool).await.unwrap();
    }

    #[tokio::test]
    async fn test_match_round_trip_keeps_score_pairing() {
        let pool = test_pool().await;
        for id in ["a", "b"] {
            let team = Team {
                id: id.into(),
                name: format!("Team {}", id),
                category: "SUB-11".into(),
                group_name: String::new(),
                logo_url: None,
            };
            insert_team(&pool, &team).await.unwrap();
        }
        insert_match(&pool, &sample_match(MatchStatus::Scheduled, None)).await.unwrap();

        let stored = get_match_by_id(&pool, "m1").await.unwrap().unwrap();
        assert_eq!(stored.status, MatchStatus::Scheduled);
        assert_eq!((stored.home_score, stored.away_score), (None, None));

        let completed = sample_match(MatchStatus::Completed, Some((2, 1)));
        assert!(update_match(&pool, &completed).await.unwrap());

        let stored = get_match_by_id(&pool, "m1").await.unwrap().unwrap();
        assert_eq!(stored, completed);
        assert_eq!(get_played_matches_with(&pool).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_championship_lists_tolerate_legacy_text() {
        let pool = test_pool().await;
        sqlx::query(
            "INSERT INTO championships (id, name, categories, sponsors, status) VALUES (?, ?, ?, ?, ?)",
        )
        .bind("c1")
        .bind("Copa Verão")
        .bind("{not valid json")
        .bind(Option::<String>::None)
        .bind("em_andamento")
        .execute(&pool)
        .await
        .unwrap();

        let champ = get_championship_by_id(&pool, "c1").await.unwrap().unwrap();
        assert!(champ.categories.is_empty());
        assert!(champ.sponsors.is_empty());
        assert_eq!(champ.status, ChampionshipStatus::Ongoing);
    }

    #[tokio::test]
    async fn test_update_and_delete_report_missing_rows() {
        let pool = test_pool().await;
        let ghost = Team {
            id: "nope".into(),
            name: "Ghost".into(),
            category: "SUB-11".into(),
            group_name: String::new(),
            logo_url: None,
        };
        assert!(!update_team(&pool, &ghost).await.unwrap());
        assert!(!delete_team(&pool, "nope").await.unwrap());

        insert_team(&pool, &ghost).await.unwrap();
        assert_eq!(find_teams_by_name(&pool, "GHO").await.unwrap().len(), 1);
        assert!(delete_team(&pool, "nope").await.unwrap());
    }
}
