use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Team {
    pub id: String,
    pub name: String,
    pub category: String, // age bracket, e.g. "SUB-11"
    pub group_name: String, // empty when the category has a single table
    pub logo_url: Option<String>,
}

/// Match status. The stored vocabulary mixes English and Portuguese terms;
/// everything is folded into these variants on the way in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[serde(alias = "agendado", alias = "agendada")]
    Scheduled,
    #[serde(alias = "ao_vivo")]
    Live,
    #[serde(alias = "em_andamento", alias = "in-progress")]
    InProgress,
    #[serde(alias = "concluido", alias = "realizado", alias = "realizada")]
    Completed,
    #[serde(alias = "finalizado", alias = "finalizada", alias = "encerrado", alias = "encerrada")]
    Finished,
    #[serde(alias = "cancelado", alias = "cancelada", alias = "canceled")]
    Cancelled,
    #[serde(alias = "adiado", alias = "adiada")]
    Postponed,
}

impl MatchStatus {
    pub const ALL: [MatchStatus; 7] = [
        MatchStatus::Scheduled,
        MatchStatus::Live,
        MatchStatus::InProgress,
        MatchStatus::Completed,
        MatchStatus::Finished,
        MatchStatus::Cancelled,
        MatchStatus::Postponed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Scheduled => "scheduled",
            MatchStatus::Live => "live",
            MatchStatus::InProgress => "in_progress",
            MatchStatus::Completed => "completed",
            MatchStatus::Finished => "finished",
            MatchStatus::Cancelled => "cancelled",
            MatchStatus::Postponed => "postponed",
        }
    }

    /// Accepts canonical names and every known alias, case-insensitively.
    pub fn parse(raw: &str) -> Option<Self> {
        let key = raw.trim().to_lowercase().replace([' ', '-'], "_");
        let key = key
            .replace('í', "i")
            .replace('ú', "u")
            .replace('ã', "a");
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == key)
            .or_else(|| serde_json::from_value(serde_json::Value::String(key)).ok())
    }

    /// Terminal states that carry a final score.
    pub fn is_played(&self) -> bool {
        matches!(self, MatchStatus::Completed | MatchStatus::Finished)
    }
}

impl Default for MatchStatus {
    fn default() -> Self {
        MatchStatus::Scheduled
    }
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: String,
    pub date: NaiveDate,
    pub time: Option<String>,
    pub category: String,
    pub round: Option<String>,
    pub location: Option<String>,
    pub status: MatchStatus,
    pub home_team_id: Option<String>, // None for undetermined playoff slots
    pub away_team_id: Option<String>,
    pub home_score: Option<i32>, // None until played
    pub away_score: Option<i32>,
    pub championship_id: Option<String>,
}

impl Match {
    /// Both sides known and a final score recorded.
    pub fn final_score(&self) -> Option<(&str, &str, i32, i32)> {
        if !self.status.is_played() {
            return None;
        }
        match (
            self.home_team_id.as_deref(),
            self.away_team_id.as_deref(),
            self.home_score,
            self.away_score,
        ) {
            (Some(home), Some(away), Some(hs), Some(aws)) => Some((home, away, hs, aws)),
            _ => None,
        }
    }
}

/// A fixture with its team names resolved, as list views show it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchView {
    #[serde(flatten)]
    pub fixture: Match,
    pub home_team_name: Option<String>,
    pub away_team_name: Option<String>,
}

impl MatchView {
    pub fn resolve(matches: &[Match], teams: &[Team]) -> Vec<MatchView> {
        let name_of = |id: Option<&str>| {
            id.and_then(|id| teams.iter().find(|t| t.id == id))
                .map(|t| t.name.clone())
        };
        matches
            .iter()
            .map(|m| MatchView {
                fixture: m.clone(),
                home_team_name: name_of(m.home_team_id.as_deref()),
                away_team_name: name_of(m.away_team_id.as_deref()),
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    pub id: String,
    pub team_id: String,
    pub team_name: String,
    pub category: String,
    pub group_name: String,
    pub position: i32,
    pub points: i32,
    pub played: i32,
    pub won: i32,
    pub drawn: i32,
    pub lost: i32,
    pub goals_for: i32,
    pub goals_against: i32,
    pub goal_difference: i32,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Player {
    pub id: String,
    pub name: String,
    pub number: Option<i32>,
    pub position: Option<String>,
    pub photo_url: Option<String>,
    pub team_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKind {
    #[serde(alias = "gol", alias = "gols", alias = "goals")]
    Goal,
    #[serde(alias = "cartao_amarelo", alias = "yellow", alias = "yellow_cards")]
    YellowCard,
    #[serde(alias = "cartao_vermelho", alias = "red", alias = "red_cards")]
    RedCard,
}

impl StatKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatKind::Goal => "goal",
            StatKind::YellowCard => "yellow_card",
            StatKind::RedCard => "red_card",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let key = raw.trim().to_lowercase().replace([' ', '-'], "_").replace('ã', "a");
        serde_json::from_value(serde_json::Value::String(key)).ok()
    }
}

/// One immutable statistic entry: a goal or a card, or a manually entered
/// batch of them (`amount` > 1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatEvent {
    pub id: String,
    pub kind: StatKind,
    pub player_id: String,
    pub team_id: String,
    pub category: String,
    pub championship_id: Option<String>,
    pub match_id: Option<String>,
    pub minute: Option<i32>,
    pub half: Option<i32>,
    pub amount: i32,
    pub created_at: DateTime<Utc>,
}

/// A row of the top-scorer or card-leader view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatLeader {
    pub kind: StatKind,
    pub player_id: String,
    pub player_name: String,
    pub team_id: String,
    pub team_name: String,
    pub category: String,
    pub championship_id: Option<String>,
    pub total: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChampionshipStatus {
    #[serde(alias = "em_breve", alias = "proximo", alias = "agendado")]
    Upcoming,
    #[serde(alias = "em_andamento", alias = "ativo", alias = "in_progress")]
    Ongoing,
    #[serde(alias = "finalizado", alias = "encerrado", alias = "completed")]
    Finished,
}

impl ChampionshipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChampionshipStatus::Upcoming => "upcoming",
            ChampionshipStatus::Ongoing => "ongoing",
            ChampionshipStatus::Finished => "finished",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let key = raw.trim().to_lowercase().replace([' ', '-'], "_");
        serde_json::from_value(serde_json::Value::String(key)).ok()
    }
}

impl Default for ChampionshipStatus {
    fn default() -> Self {
        ChampionshipStatus::Upcoming
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sponsor {
    pub name: String,
    pub logo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Championship {
    pub id: String,
    pub name: String,
    pub year: Option<i32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub categories: Vec<String>,
    pub sponsors: Vec<Sponsor>,
    pub status: ChampionshipStatus,
}

/// Result of one standings recalculation pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecalculationSummary {
    pub scopes: usize,
    pub teams: usize,
    pub matches_folded: usize,
    pub matches_skipped: usize,
}

// API Response types
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: Utc::now(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: Utc::now(),
        }
    }
}
