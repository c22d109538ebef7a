//! Input records as delivered by the directory collaborator.
//!
//! Team labels arrive either as a list or as a single comma-separated string.
//! They are split into discrete labels once, at ingestion, and never re-parsed.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One personnel record from a directory snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawPersonRecord")]
pub struct PersonRecord {
    pub id: String,
    pub display_name: String,
    pub job_title: Option<String>,
    pub team_labels: Vec<String>,
    /// Lookup key of the direct manager. Never an ownership relation.
    pub manager_id: Option<String>,
}

impl PersonRecord {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            job_title: None,
            team_labels: Vec::new(),
            manager_id: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.job_title = Some(title.into());
        self
    }

    /// Adds team labels; each entry is split on commas like ingested data.
    pub fn with_teams<I, S>(mut self, teams: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for team in teams {
            self.team_labels.extend(split_team_labels(team.as_ref()));
        }
        self
    }

    pub fn with_manager(mut self, manager_id: impl Into<String>) -> Self {
        self.manager_id = normalize_manager_id(Some(manager_id.into()));
        self
    }

    pub fn title(&self) -> &str {
        self.job_title.as_deref().unwrap_or("")
    }
}

/// Splits a raw team field into trimmed, non-empty labels.
pub fn split_team_labels(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(str::to_string)
        .collect()
}

fn normalize_manager_id(raw: Option<String>) -> Option<String> {
    raw.map(|m| m.trim().to_string()).filter(|m| !m.is_empty())
}

/// Team field as found on the wire: a list or one comma-separated string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawTeams {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPersonRecord {
    id: String,
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    job_title: Option<String>,
    #[serde(default, alias = "team")]
    team_labels: Option<RawTeams>,
    #[serde(default)]
    manager_id: Option<String>,
}

impl From<RawPersonRecord> for PersonRecord {
    fn from(raw: RawPersonRecord) -> Self {
        let team_labels = match raw.team_labels {
            None => Vec::new(),
            Some(RawTeams::One(s)) => split_team_labels(&s),
            Some(RawTeams::Many(list)) => list.iter().flat_map(|s| split_team_labels(s)).collect(),
        };
        PersonRecord {
            id: raw.id,
            display_name: raw.display_name,
            job_title: raw.job_title.filter(|t| !t.trim().is_empty()),
            team_labels,
            manager_id: normalize_manager_id(raw.manager_id),
        }
    }
}

/// Id → position lookup over one snapshot, built once per invocation.
///
/// Ids are expected to be unique; if not, the first occurrence wins.
#[derive(Debug)]
pub struct RecordIndex<'a> {
    records: &'a [PersonRecord],
    by_id: HashMap<&'a str, usize>,
}

impl<'a> RecordIndex<'a> {
    pub fn new(records: &'a [PersonRecord]) -> Self {
        let mut by_id = HashMap::with_capacity(records.len());
        for (i, record) in records.iter().enumerate() {
            by_id.entry(record.id.as_str()).or_insert(i);
        }
        Self { records, by_id }
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    pub fn get(&self, id: &str) -> Option<&'a PersonRecord> {
        self.position(id).map(|i| &self.records[i])
    }

    /// Position of the direct manager, if the reference resolves in this snapshot.
    pub fn manager_of(&self, idx: usize) -> Option<usize> {
        self.records[idx]
            .manager_id
            .as_deref()
            .and_then(|m| self.position(m))
    }

    pub fn records(&self) -> &'a [PersonRecord] {
        self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_comma_separated_team_string() {
        let json = r#"{"id":"1","displayName":"Bob","team":"Consultant Team 3, Facilities ,"}"#;
        let record: PersonRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.team_labels, vec!["Consultant Team 3", "Facilities"]);
    }

    #[test]
    fn accepts_team_label_list_and_drops_blanks() {
        let json = r#"{"id":"1","displayName":"Eve","teamLabels":[""," ","A, B"]}"#;
        let record: PersonRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.team_labels, vec!["A", "B"]);
    }

    #[test]
    fn blank_optional_fields_become_none() {
        let json = r#"{"id":"1","displayName":"Dave","jobTitle":"  ","managerId":""}"#;
        let record: PersonRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.job_title, None);
        assert_eq!(record.manager_id, None);
        assert_eq!(record.title(), "");
    }

    #[test]
    fn index_tolerates_dangling_manager_and_duplicates() {
        let records = vec![
            PersonRecord::new("a", "First").with_manager("missing"),
            PersonRecord::new("a", "Second"),
        ];
        let index = RecordIndex::new(&records);
        assert_eq!(index.position("a"), Some(0));
        assert_eq!(index.manager_of(0), None);
    }
}
