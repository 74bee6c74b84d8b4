//! Shape normalization at the persistence boundary.
//!
//! Records reach us with keys in either snake_case or camelCase, list fields
//! as native arrays or JSON-encoded strings (or null), and numbers typed into
//! text inputs. Everything is folded into the canonical model types here and
//! nowhere else. Output goes back out through [`dual_named`], which writes
//! every key in both conventions.
//!
//! Malformed JSON in a list field is not an error: it reads as an empty list.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{
    Championship, ChampionshipStatus, Match, MatchStatus, Player, Sponsor, Standing, StatEvent,
    StatKind, Team,
};
use crate::utils::{validate_date_range, validate_team_name};

pub type RawRecord = Map<String, Value>;

/// Upper bounds for hand-entered numbers.
pub const MAX_SCORE: i32 = 99;
pub const MAX_AMOUNT: i32 = 50;
pub const MAX_MINUTE: i32 = 150;

/// Historical field names and the canonical key each one stands for.
const ALIASES: &[(&str, &str)] = &[
    ("group", "group_name"),
    ("logo", "logo_url"),
    ("photo", "photo_url"),
    ("match_date", "date"),
    ("type", "kind"),
    ("count", "amount"),
];

fn canonical_key(key: &str) -> &str {
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == key)
        .map_or(key, |&(_, canonical)| canonical)
}

// ── key conventions ─────────────────────────────────────────────────────────

pub fn snake_to_camel(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper_next = false;
    for c in key.chars() {
        if c == '_' {
            upper_next = !out.is_empty();
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

pub fn camel_to_snake(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        if c.is_uppercase() {
            if !out.is_empty() {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Rewrites every object key (recursively) to snake_case. When a record
/// carries both spellings of a key, the snake_case one wins.
pub fn snake_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            let mut native = Vec::new();
            for (key, v) in map {
                let snake = camel_to_snake(&key);
                if snake == key {
                    native.push((key, snake_keys(v)));
                } else {
                    out.insert(snake, snake_keys(v));
                }
            }
            for (key, v) in native {
                out.insert(key, v);
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(snake_keys).collect()),
        other => other,
    }
}

/// Emits every key under both naming conventions, recursively.
pub fn dual_named(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len() * 2);
            for (key, v) in map {
                let v = dual_named(v);
                for twin in [snake_to_camel(&key), camel_to_snake(&key)] {
                    if twin != key && !out.contains_key(&twin) {
                        out.insert(twin, v.clone());
                    }
                }
                out.insert(key, v);
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(dual_named).collect()),
        other => other,
    }
}

/// Serializes a canonical record and applies [`dual_named`].
pub fn to_dual_json<T: Serialize>(record: &T) -> AppResult<Value> {
    let value = serde_json::to_value(record).map_err(anyhow::Error::from)?;
    Ok(dual_named(value))
}

/// Overlays `patch` on `base` (top-level keys), after folding both to
/// snake_case and historical names to their canonical key, so any accepted
/// spelling in the patch replaces the stored value.
pub fn merge_patch(base: Value, patch: Value) -> AppResult<Value> {
    let Value::Object(mut base) = snake_keys(base) else {
        return Err(AppError::validation("expected a JSON object"));
    };
    let Value::Object(patch) = snake_keys(patch) else {
        return Err(AppError::validation("expected a JSON object"));
    };
    let (aliased, direct): (Vec<_>, Vec<_>) = patch
        .into_iter()
        .partition(|(key, _)| canonical_key(key) != key.as_str());
    // A canonical key in the same patch wins over its alias.
    for (key, value) in aliased.into_iter().chain(direct) {
        base.insert(canonical_key(&key).to_string(), value);
    }
    Ok(Value::Object(base))
}

// ── field readers ───────────────────────────────────────────────────────────

fn as_record(raw: &Value) -> AppResult<&RawRecord> {
    raw.as_object()
        .ok_or_else(|| AppError::validation("expected a JSON object"))
}

/// Looks a field up by its snake_case name, then its camelCase twin. Null
/// counts as absent.
fn field<'a>(record: &'a RawRecord, key: &str) -> Option<&'a Value> {
    record
        .get(key)
        .filter(|v| !v.is_null())
        .or_else(|| record.get(&snake_to_camel(key)).filter(|v| !v.is_null()))
}

/// First present field among several historical names for one concept.
fn field_any<'a>(record: &'a RawRecord, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| field(record, key))
}

/// Materializes a list field. Absent, null, malformed JSON, or a JSON value
/// that is not an array all read as an empty list.
pub fn json_list(value: Option<&Value>) -> Vec<Value> {
    match value {
        Some(Value::Array(items)) => items.clone(),
        Some(Value::String(encoded)) => {
            let trimmed = encoded.trim();
            if trimmed.is_empty() {
                return Vec::new();
            }
            match serde_json::from_str::<Value>(trimmed) {
                Ok(Value::Array(items)) => items,
                Ok(_) => Vec::new(),
                Err(e) => {
                    tracing::debug!("Treating malformed list field as empty: {}", e);
                    Vec::new()
                }
            }
        }
        _ => Vec::new(),
    }
}

/// [`json_list`] restricted to non-empty strings (numbers are stringified).
pub fn string_list(value: Option<&Value>) -> Vec<String> {
    json_list(value)
        .into_iter()
        .filter_map(|item| text(Some(&item)))
        .collect()
}

pub fn sponsor_list(value: Option<&Value>) -> Vec<Sponsor> {
    json_list(value)
        .into_iter()
        .filter_map(|item| match item {
            Value::String(name) if !name.trim().is_empty() => Some(Sponsor {
                name: name.trim().to_string(),
                logo: None,
            }),
            Value::Object(map) => {
                let name = text(field(&map, "name"))?;
                let logo = text(field_any(&map, &["logo", "logo_url"]));
                Some(Sponsor { name, logo })
            }
            _ => None,
        })
        .collect()
}

/// Numbers and numeric text become `i32`; anything else is `None`.
pub fn coerce_i32(value: Option<&Value>) -> Option<i32> {
    match value? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .and_then(|n| i32::try_from(n).ok()),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i32>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.fract() == 0.0 && f.abs() <= i32::MAX as f64)
                    .map(|f| f as i32)
            })
        }
        _ => None,
    }
}

/// Trimmed non-empty text. Numbers are accepted and stringified.
pub fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn required_text(record: &RawRecord, key: &str) -> AppResult<String> {
    text(field(record, key)).ok_or_else(|| AppError::validation(format!("{} is required", key)))
}

fn date(record: &RawRecord, keys: &[&str]) -> AppResult<Option<NaiveDate>> {
    let Some(raw) = text(field_any(record, keys)) else {
        return Ok(None);
    };
    // Accept full timestamps by keeping only the calendar part.
    let day = raw.get(..10).unwrap_or(raw.as_str());
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| AppError::validation(format!("{} is not a valid date: {}", keys[0], raw)))
}

fn timestamp(record: &RawRecord, key: &str) -> DateTime<Utc> {
    text(field(record, key))
        .and_then(|raw| DateTime::parse_from_rfc3339(&raw).ok())
        .map(|ts| ts.with_timezone(&Utc))
        .unwrap_or_else(Utc::now)
}

fn id_or_new(record: &RawRecord) -> String {
    text(field(record, "id")).unwrap_or_else(|| Uuid::new_v4().to_string())
}

fn non_negative(value: Option<i32>, what: &str) -> AppResult<Option<i32>> {
    match value {
        Some(n) if n < 0 => Err(AppError::validation(format!("{} cannot be negative", what))),
        other => Ok(other),
    }
}

fn at_most(value: Option<i32>, max: i32, what: &str) -> AppResult<Option<i32>> {
    match value {
        Some(n) if n > max => Err(AppError::validation(format!("{} cannot exceed {}", what, max))),
        other => Ok(other),
    }
}

// ── entity normalizers ──────────────────────────────────────────────────────

pub fn normalize_team(raw: &Value) -> AppResult<Team> {
    let record = as_record(raw)?;
    let name = required_text(record, "name")?;
    if !validate_team_name(&name) {
        return Err(AppError::validation("team name must be at most 100 characters"));
    }

    Ok(Team {
        id: id_or_new(record),
        name,
        category: required_text(record, "category")?,
        group_name: text(field_any(record, &["group_name", "group"])).unwrap_or_default(),
        logo_url: text(field_any(record, &["logo_url", "logo"])),
    })
}

/// Normalizes a fixture and enforces the score/status pairing: a played
/// status needs both scores, any other status carries none.
pub fn normalize_match(raw: &Value) -> AppResult<Match> {
    let record = as_record(raw)?;

    let date = date(record, &["date", "match_date"])?
        .ok_or_else(|| AppError::validation("date is required"))?;

    let status = match text(field(record, "status")) {
        Some(raw_status) => MatchStatus::parse(&raw_status)
            .ok_or_else(|| AppError::validation(format!("unknown match status: {}", raw_status)))?,
        None => MatchStatus::default(),
    };

    let home_team_id = text(field(record, "home_team_id"));
    let away_team_id = text(field(record, "away_team_id"));
    if home_team_id.is_some() && home_team_id == away_team_id {
        return Err(AppError::validation("a team cannot play against itself"));
    }

    let score = |key: &str| {
        non_negative(coerce_i32(field(record, key)), key).and_then(|v| at_most(v, MAX_SCORE, key))
    };
    let home_score = score("home_score")?;
    let away_score = score("away_score")?;
    let (home_score, away_score) = if status.is_played() {
        match (home_score, away_score) {
            (Some(h), Some(a)) => (Some(h), Some(a)),
            _ => {
                return Err(AppError::validation(format!(
                    "a {} match needs both scores",
                    status
                )))
            }
        }
    } else {
        (None, None)
    };

    Ok(Match {
        id: id_or_new(record),
        date,
        time: text(field(record, "time")),
        category: required_text(record, "category")?,
        round: text(field(record, "round")),
        location: text(field(record, "location")),
        status,
        home_team_id,
        away_team_id,
        home_score,
        away_score,
        championship_id: text(field(record, "championship_id")),
    })
}

pub fn normalize_player(raw: &Value) -> AppResult<Player> {
    let record = as_record(raw)?;
    Ok(Player {
        id: id_or_new(record),
        name: required_text(record, "name")?,
        number: non_negative(coerce_i32(field(record, "number")), "number")?,
        position: text(field(record, "position")),
        photo_url: text(field_any(record, &["photo_url", "photo"])),
        team_id: required_text(record, "team_id")?,
    })
}

pub fn normalize_championship(raw: &Value) -> AppResult<Championship> {
    let record = as_record(raw)?;

    let start_date = date(record, &["start_date"])?;
    let end_date = date(record, &["end_date"])?;
    if !validate_date_range(start_date, end_date) {
        return Err(AppError::validation("end date cannot be before start date"));
    }

    let status = match text(field(record, "status")) {
        Some(raw_status) => ChampionshipStatus::parse(&raw_status).ok_or_else(|| {
            AppError::validation(format!("unknown championship status: {}", raw_status))
        })?,
        None => ChampionshipStatus::default(),
    };

    Ok(Championship {
        id: id_or_new(record),
        name: required_text(record, "name")?,
        year: coerce_i32(field(record, "year")),
        start_date,
        end_date,
        categories: string_list(field(record, "categories")),
        sponsors: sponsor_list(field(record, "sponsors")),
        status,
    })
}

pub fn normalize_stat_event(raw: &Value) -> AppResult<StatEvent> {
    let record = as_record(raw)?;

    let kind_raw = text(field_any(record, &["kind", "type"]))
        .ok_or_else(|| AppError::validation("kind is required"))?;
    let kind = StatKind::parse(&kind_raw)
        .ok_or_else(|| AppError::validation(format!("unknown statistic kind: {}", kind_raw)))?;

    let amount = coerce_i32(field_any(record, &["amount", "count"])).unwrap_or(1);
    if amount < 1 {
        return Err(AppError::validation("amount must be at least 1"));
    }
    at_most(Some(amount), MAX_AMOUNT, "amount")?;
    let minute = non_negative(coerce_i32(field(record, "minute")), "minute")?;
    let minute = at_most(minute, MAX_MINUTE, "minute")?;

    Ok(StatEvent {
        id: id_or_new(record),
        kind,
        player_id: required_text(record, "player_id")?,
        team_id: required_text(record, "team_id")?,
        category: required_text(record, "category")?,
        championship_id: text(field(record, "championship_id")),
        match_id: text(field(record, "match_id")),
        minute,
        half: coerce_i32(field(record, "half")),
        amount,
        created_at: timestamp(record, "created_at"),
    })
}

/// Used for manual standing overrides. Goal difference follows the goal
/// columns unless set explicitly.
pub fn normalize_standing(raw: &Value) -> AppResult<Standing> {
    let record = as_record(raw)?;
    let count = |key: &str| coerce_i32(field(record, key)).unwrap_or(0);

    let goals_for = count("goals_for");
    let goals_against = count("goals_against");

    Ok(Standing {
        id: id_or_new(record),
        team_id: required_text(record, "team_id")?,
        team_name: text(field(record, "team_name")).unwrap_or_default(),
        category: required_text(record, "category")?,
        group_name: text(field(record, "group_name")).unwrap_or_default(),
        position: count("position"),
        points: count("points"),
        played: count("played"),
        won: count("won"),
        drawn: count("drawn"),
        lost: count("lost"),
        goals_for,
        goals_against,
        goal_difference: coerce_i32(field(record, "goal_difference"))
            .unwrap_or(goals_for - goals_against),
        updated_at: timestamp(record, "updated_at"),
    })
}
