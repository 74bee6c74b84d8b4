use anyhow::Result;
use sqlx::SqlitePool;
use std::path::Path;

use crate::config::AppConfig;
use crate::db::{
    clear_all_data, create_pool, find_teams_by_name, get_all_teams, get_matches, get_standings,
    seed_data,
};
use crate::models::{Standing, StatKind};
use crate::services::statistics::load_leaders;
use crate::services::{procedures::ensure_schema, FilterConfig, StandingsEngine};
use crate::utils::{format_goal_difference, points_percentage};

/// Names closer than this (Jaro-Winkler) are offered as suggestions.
const SUGGESTION_THRESHOLD: f64 = 0.8;

async fn open(config: &AppConfig) -> Result<SqlitePool> {
    let pool = create_pool(&config.database_url).await?;
    ensure_schema(&pool).await?;
    Ok(pool)
}

pub async fn seed(config: &AppConfig, reset: bool) -> Result<()> {
    let pool = open(config).await?;
    if reset {
        println!("🧹 Clearing existing data...");
        clear_all_data(&pool).await?;
    }
    seed_data(&pool).await?;
    println!("✅ Demo league ready. Try: league standings --category SUB-11");
    Ok(())
}

pub async fn recalculate(config: &AppConfig) -> Result<()> {
    let pool = open(config).await?;
    let summary = StandingsEngine::new().recalculate(&pool).await?;

    println!("📊 Standings recalculated:");
    println!("   Scopes: {}", summary.scopes);
    println!("   Teams: {}", summary.teams);
    println!("   Matches counted: {}", summary.matches_folded);
    if summary.matches_skipped > 0 {
        println!("   Matches skipped (cross-group or unassigned): {}", summary.matches_skipped);
    }
    Ok(())
}

fn print_table(rows: &[Standing]) {
    let mut scope: Option<(&str, &str)> = None;
    for row in rows {
        let current = (row.category.as_str(), row.group_name.as_str());
        if scope != Some(current) {
            let label = if row.group_name.is_empty() {
                row.category.clone()
            } else {
                format!("{} - {}", row.category, row.group_name)
            };
            println!("\n🏆 {}", label);
            println!(
                "   {:>3}  {:<24} {:>3} {:>3} {:>3} {:>3} {:>3} {:>5} {:>4} {:>6}",
                "#", "Team", "P", "W", "D", "L", "GF", "GD", "Pts", "%"
            );
            scope = Some(current);
        }
        println!(
            "   {:>3}  {:<24} {:>3} {:>3} {:>3} {:>3} {:>3} {:>5} {:>4} {:>5.1}%",
            row.position,
            row.team_name,
            row.played,
            row.won,
            row.drawn,
            row.lost,
            row.goals_for,
            format_goal_difference(row.goal_difference),
            row.points,
            points_percentage(row.points, row.played)
        );
    }
}

pub async fn show_standings(config: &AppConfig, filter: &FilterConfig) -> Result<()> {
    let pool = open(config).await?;
    let rows = filter.apply(&get_standings(&pool).await?);

    if rows.is_empty() {
        println!("📭 No standings found. Run 'league recalculate' after entering results.");
        return Ok(());
    }

    print_table(&rows);
    Ok(())
}

pub async fn show_leaders(config: &AppConfig, kind: StatKind, filter: &FilterConfig) -> Result<()> {
    let pool = open(config).await?;
    let rows = filter.apply(&load_leaders(&pool, kind, filter.has_championship()).await?);

    let (title, unit) = match kind {
        StatKind::Goal => ("⚽ Top Scorers", "goals"),
        _ => ("🟨 Yellow Card Leaders", "cards"),
    };
    println!("{}:\n", title);

    if rows.is_empty() {
        println!("   No records yet");
        return Ok(());
    }

    for (i, row) in rows.iter().take(20).enumerate() {
        println!(
            "{:>3}. {} ({}, {}) - {} {}",
            i + 1,
            row.player_name,
            row.team_name,
            row.category,
            row.total,
            unit
        );
    }
    Ok(())
}

/// Known names ranked by similarity to `query`.
fn suggestions<'a>(query: &str, names: &'a [String]) -> Vec<&'a str> {
    let query = query.to_lowercase();
    let mut scored: Vec<(f64, &str)> = names
        .iter()
        .map(|name| (strsim::jaro_winkler(&query, &name.to_lowercase()), name.as_str()))
        .filter(|(score, _)| *score >= SUGGESTION_THRESHOLD)
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));

    let mut out: Vec<&str> = Vec::new();
    for (_, name) in scored {
        if !out.contains(&name) {
            out.push(name);
        }
    }
    out.truncate(3);
    out
}

pub async fn query_team(config: &AppConfig, team_name: &str) -> Result<()> {
    let pool = open(config).await?;

    println!("🔍 Searching for team: {}", team_name);

    let teams = find_teams_by_name(&pool, team_name).await?;

    if teams.is_empty() {
        println!("❌ No teams found matching '{}'", team_name);

        let names: Vec<String> = get_all_teams(&pool).await?.into_iter().map(|t| t.name).collect();
        let similar = suggestions(team_name, &names);
        if !similar.is_empty() {
            println!("\n💡 Did you mean:");
            for name in similar {
                println!("   • {}", name);
            }
        }
        return Ok(());
    }

    let all_teams = get_all_teams(&pool).await?;
    let standings = get_standings(&pool).await?;
    let matches = get_matches(&pool).await?;

    let name_of = |id: Option<&str>| -> String {
        match id {
            Some(id) => all_teams
                .iter()
                .find(|t| t.id == id)
                .map_or_else(|| id.to_string(), |t| t.name.clone()),
            None => "TBD".to_string(),
        }
    };

    for team in &teams {
        let group = if team.group_name.is_empty() { "no group" } else { team.group_name.as_str() };
        println!("\n📋 {} ({}, {})", team.name, team.category, group);

        if let Some(row) = standings.iter().find(|s| s.team_id == team.id) {
            println!(
                "   Position {} | {} pts in {} games | {}W {}D {}L | GD {}",
                row.position,
                row.points,
                row.played,
                row.won,
                row.drawn,
                row.lost,
                format_goal_difference(row.goal_difference)
            );
        }

        let fixtures: Vec<_> = matches
            .iter()
            .filter(|m| {
                m.home_team_id.as_deref() == Some(team.id.as_str())
                    || m.away_team_id.as_deref() == Some(team.id.as_str())
            })
            .collect();

        if fixtures.is_empty() {
            println!("   No fixtures");
            continue;
        }

        for m in fixtures {
            let score = match (m.home_score, m.away_score) {
                (Some(h), Some(a)) => format!("{}-{}", h, a),
                _ => m.status.to_string(),
            };
            println!(
                "   {} {} vs {} ({})",
                m.date.format("%d/%m"),
                name_of(m.home_team_id.as_deref()),
                name_of(m.away_team_id.as_deref()),
                score
            );
        }
    }

    Ok(())
}

fn write_csv<W: std::io::Write>(writer: W, rows: &[Standing]) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record([
        "category", "group", "position", "team", "played", "won", "drawn", "lost",
        "goals_for", "goals_against", "goal_difference", "points", "points_pct",
    ])?;
    for row in rows {
        out.write_record([
            row.category.clone(),
            row.group_name.clone(),
            row.position.to_string(),
            row.team_name.clone(),
            row.played.to_string(),
            row.won.to_string(),
            row.drawn.to_string(),
            row.lost.to_string(),
            row.goals_for.to_string(),
            row.goals_against.to_string(),
            row.goal_difference.to_string(),
            row.points.to_string(),
            format!("{:.1}", points_percentage(row.points, row.played)),
        ])?;
    }
    out.flush()?;
    Ok(())
}

pub async fn export_standings(config: &AppConfig, out: &Path) -> Result<()> {
    let pool = open(config).await?;
    let rows = get_standings(&pool).await?;
    write_csv(std::fs::File::create(out)?, &rows)?;
    println!("💾 Exported {} standings rows to {}", rows.len(), out.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn row(team: &str, points: i32, played: i32, gd: i32) -> Standing {
        Standing {
            id: team.to_string(),
            team_id: team.to_string(),
            team_name: team.to_string(),
            category: "SUB-11".to_string(),
            group_name: "Grupo A".to_string(),
            position: 1,
            points,
            played,
            won: points / 3,
            drawn: points % 3,
            lost: 0,
            goals_for: 4,
            goals_against: 4 - gd,
            goal_difference: gd,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_suggestions_rank_close_names() {
        let names = vec![
            "Furacão".to_string(),
            "Federal".to_string(),
            "Furacão".to_string(),
            "Palmeirinha".to_string(),
        ];
        let similar = suggestions("furacao", &names);
        assert_eq!(similar.first(), Some(&"Furacão"));
        assert!(!similar.contains(&"Palmeirinha"));
        // Duplicated across categories, listed once.
        assert_eq!(similar.iter().filter(|n| **n == "Furacão").count(), 1);
    }

    #[test]
    fn test_csv_export_layout() {
        let mut buf = Vec::new();
        write_csv(&mut buf, &[row("Furacão", 6, 2, 3)]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("category,group,position,team"));
        assert_eq!(lines[1], "SUB-11,Grupo A,1,Furacão,2,2,0,0,4,1,3,6,100.0");
    }
}
