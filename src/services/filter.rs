//! Composable in-memory filtering shared by every list view.

use serde::Deserialize;

use crate::models::{
    Championship, Match, MatchStatus, MatchView, Player, Standing, StatLeader, Team,
};
use crate::utils::contains_ignore_case;

/// Sentinel meaning "do not filter on this".
pub const ALL: &str = "all";

/// Status filter values that select a whole status set.
pub const PLAYED: &str = "played";
pub const PENDING: &str = "pending";

/// Filter options. Every criterion defaults to [`ALL`]; the ones that are set
/// must all hold for a record to be kept.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub search: String,
    pub category: String,
    #[serde(alias = "championshipId")]
    pub championship_id: String,
    pub group: String,
    pub status: String,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            search: String::new(),
            category: ALL.to_string(),
            championship_id: ALL.to_string(),
            group: ALL.to_string(),
            status: ALL.to_string(),
        }
    }
}

fn is_set(criterion: &str) -> bool {
    let c = criterion.trim();
    !c.is_empty() && !c.eq_ignore_ascii_case(ALL)
}

fn equals(criterion: &str, value: Option<&str>) -> bool {
    !is_set(criterion) || value.is_some_and(|v| v == criterion.trim())
}

fn member(criterion: &str, values: &[&str]) -> bool {
    !is_set(criterion) || values.iter().any(|v| *v == criterion.trim())
}

fn status_matches(criterion: &str, value: Option<MatchStatus>) -> bool {
    if !is_set(criterion) {
        return true;
    }
    let Some(status) = value else {
        return false;
    };
    match criterion.trim().to_lowercase().as_str() {
        PLAYED => status.is_played(),
        PENDING => !status.is_played(),
        other => MatchStatus::parse(other) == Some(status),
    }
}

/// What a record exposes to the filter. Dimensions a record does not have
/// return `None`, which fails any criterion set on that dimension.
pub trait Filterable {
    fn search_fields(&self) -> Vec<&str>;

    fn category(&self) -> Option<&str> {
        None
    }

    /// Every category the record belongs to. Most records have one.
    fn categories(&self) -> Vec<&str> {
        self.category().into_iter().collect()
    }

    fn championship_id(&self) -> Option<&str> {
        None
    }

    fn group(&self) -> Option<&str> {
        None
    }

    fn status(&self) -> Option<MatchStatus> {
        None
    }
}

impl FilterConfig {
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = term.into();
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn championship(mut self, id: impl Into<String>) -> Self {
        self.championship_id = id.into();
        self
    }

    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    pub fn has_championship(&self) -> bool {
        is_set(&self.championship_id)
    }

    pub fn matches<T: Filterable>(&self, record: &T) -> bool {
        let search = self.search.trim();
        let search_ok = search.is_empty()
            || record
                .search_fields()
                .iter()
                .any(|field| contains_ignore_case(field, search));

        search_ok
            && member(&self.category, &record.categories())
            && equals(&self.championship_id, record.championship_id())
            && equals(&self.group, record.group())
            && status_matches(&self.status, record.status())
    }

    pub fn apply<T: Filterable + Clone>(&self, records: &[T]) -> Vec<T> {
        records.iter().filter(|r| self.matches(*r)).cloned().collect()
    }
}

impl Filterable for Team {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str()]
    }

    fn category(&self) -> Option<&str> {
        Some(self.category.as_str())
    }

    fn group(&self) -> Option<&str> {
        Some(self.group_name.as_str())
    }
}

impl Filterable for Match {
    fn search_fields(&self) -> Vec<&str> {
        [self.location.as_deref(), self.round.as_deref()]
            .into_iter()
            .flatten()
            .collect()
    }

    fn category(&self) -> Option<&str> {
        Some(self.category.as_str())
    }

    fn championship_id(&self) -> Option<&str> {
        self.championship_id.as_deref()
    }

    fn status(&self) -> Option<MatchStatus> {
        Some(self.status)
    }
}

impl Filterable for MatchView {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = self.fixture.search_fields();
        fields.extend(
            [self.home_team_name.as_deref(), self.away_team_name.as_deref()]
                .into_iter()
                .flatten(),
        );
        fields
    }

    fn category(&self) -> Option<&str> {
        self.fixture.category()
    }

    fn championship_id(&self) -> Option<&str> {
        self.fixture.championship_id.as_deref()
    }

    fn status(&self) -> Option<MatchStatus> {
        Some(self.fixture.status)
    }
}

impl Filterable for Standing {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.team_name.as_str()]
    }

    fn category(&self) -> Option<&str> {
        Some(self.category.as_str())
    }

    fn group(&self) -> Option<&str> {
        Some(self.group_name.as_str())
    }
}

impl Filterable for Player {
    fn search_fields(&self) -> Vec<&str> {
        [Some(self.name.as_str()), self.position.as_deref()]
            .into_iter()
            .flatten()
            .collect()
    }
}

impl Filterable for StatLeader {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.player_name.as_str(), self.team_name.as_str()]
    }

    fn category(&self) -> Option<&str> {
        Some(self.category.as_str())
    }

    fn championship_id(&self) -> Option<&str> {
        self.championship_id.as_deref()
    }
}

impl Filterable for Championship {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str()]
    }

    fn categories(&self) -> Vec<&str> {
        self.categories.iter().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn team(name: &str, category: &str) -> Team {
        Team {
            id: name.to_lowercase(),
            name: name.to_string(),
            category: category.to_string(),
            group_name: "A".to_string(),
            logo_url: None,
        }
    }

    fn fixture(id: &str, status: MatchStatus, championship: Option<&str>, location: &str) -> Match {
        let played = status.is_played();
        Match {
            id: id.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 4, 6).unwrap(),
            time: None,
            category: "SUB-11".to_string(),
            round: None,
            location: Some(location.to_string()),
            status,
            home_team_id: Some("a".into()),
            away_team_id: Some("b".into()),
            home_score: played.then_some(1),
            away_score: played.then_some(0),
            championship_id: championship.map(String::from),
        }
    }

    #[test]
    fn test_criteria_are_conjunctive() {
        let teams = vec![team("Furacão", "SUB-11"), team("Federal", "SUB-13")];

        let hit = FilterConfig::default().search("fura").category("SUB-11").apply(&teams);
        assert_eq!(hit, vec![teams[0].clone()]);

        let miss = FilterConfig::default().search("fura").category("SUB-13").apply(&teams);
        assert!(miss.is_empty());
    }

    #[test]
    fn test_defaults_keep_everything() {
        let teams = vec![team("Furacão", "SUB-11"), team("Federal", "SUB-13")];
        assert_eq!(FilterConfig::default().apply(&teams).len(), 2);
        assert_eq!(FilterConfig::default().category("ALL").apply(&teams).len(), 2);
        assert_eq!(FilterConfig::default().search("  ").apply(&teams).len(), 2);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let teams = vec![team("Furacão", "SUB-11"), team("Federal", "SUB-13")];
        let hit = FilterConfig::default().search("FURACÃO").apply(&teams);
        assert_eq!(hit.len(), 1);
        let both = FilterConfig::default().search("f").apply(&teams);
        assert_eq!(both.len(), 2);
    }

    #[test]
    fn test_status_sets_and_aliases() {
        let matches = vec![
            fixture("m1", MatchStatus::Finished, Some("c1"), "Estádio Municipal"),
            fixture("m2", MatchStatus::Scheduled, Some("c1"), "Campo do Bairro"),
            fixture("m3", MatchStatus::Completed, None, "Campo do Bairro"),
        ];

        let played = FilterConfig::default().status("played").apply(&matches);
        assert_eq!(played.iter().map(|m| m.id.as_str()).collect::<Vec<_>>(), vec!["m1", "m3"]);

        let pending = FilterConfig::default().status(PENDING).apply(&matches);
        assert_eq!(pending.len(), 1);

        let finalizado = FilterConfig::default().status("finalizado").apply(&matches);
        assert_eq!(finalizado.len(), 1);
        assert_eq!(finalizado[0].id, "m1");

        let scoped = FilterConfig::default()
            .championship("c1")
            .search("bairro")
            .apply(&matches);
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].id, "m2");
    }

    #[test]
    fn test_missing_dimension_fails_a_set_criterion() {
        let m = fixture("m3", MatchStatus::Completed, None, "Campo");
        assert!(!FilterConfig::default().championship("c1").matches(&m));
        assert!(!FilterConfig::default().group("A").matches(&m));
    }

    #[test]
    fn test_fixture_search_covers_team_names() {
        let teams = vec![team("Furacão", "SUB-11"), team("Federal", "SUB-11")];
        let mut m = fixture("m1", MatchStatus::Scheduled, None, "Campo");
        m.home_team_id = Some(teams[0].id.clone());
        m.away_team_id = Some(teams[1].id.clone());

        let views = MatchView::resolve(&[m.clone()], &teams);
        assert_eq!(views[0].home_team_name.as_deref(), Some("Furacão"));
        assert_eq!(FilterConfig::default().search("fura").apply(&views).len(), 1);
        assert_eq!(FilterConfig::default().search("campo").apply(&views).len(), 1);
        assert!(FilterConfig::default().search("palmeiras").apply(&views).is_empty());
        assert!(FilterConfig::default().search("fura").apply(&[m]).is_empty());
    }

    #[test]
    fn test_championship_category_is_membership() {
        let champ = Championship {
            id: "c1".into(),
            name: "Copa".into(),
            year: Some(2024),
            start_date: None,
            end_date: None,
            categories: vec!["SUB-11".into(), "SUB-13".into()],
            sponsors: Vec::new(),
            status: Default::default(),
        };
        assert!(FilterConfig::default().category("SUB-11").matches(&champ));
        assert!(FilterConfig::default().category("SUB-13").matches(&champ));
        assert!(!FilterConfig::default().category("SUB-15").matches(&champ));
    }

    #[test]
    fn test_config_deserializes_from_query_style_keys() {
        let config: FilterConfig =
            serde_json::from_value(serde_json::json!({"championshipId": "c9", "search": "x"}))
                .unwrap();
        assert_eq!(config.championship_id, "c9");
        assert_eq!(config.category, ALL);
    }
}
