//! The fixed bucket catalog.
//!
//! Catalog order drives presentation only: forests are emitted in this order,
//! but no classification or placement rule depends on it.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Number of numbered consultant teams in the catalog.
pub const CONSULTANT_TEAM_COUNT: u8 = 7;

/// A consultant team number inside the catalog range.
///
/// Only [`Bucket::consultant_team`] and [`TeamNumber::new`] build one, so a
/// `Bucket::ConsultantTeam` outside `1..=CONSULTANT_TEAM_COUNT` cannot exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TeamNumber(u8);

impl TeamNumber {
    pub fn new(n: u32) -> Option<TeamNumber> {
        (1..=CONSULTANT_TEAM_COUNT as u32)
            .contains(&n)
            .then_some(TeamNumber(n as u8))
    }

    pub fn get(self) -> u32 {
        self.0 as u32
    }
}

impl fmt::Display for TeamNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An organizational grouping a record can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Bucket {
    ConsultantTeam(TeamNumber),
    ItManagers,
    CSuite,
    SystemEngineers,
    NetworkEngineers,
    SoftwareEngineers,
    GrcEngineers,
    Facilities,
    Other,
}

impl Bucket {
    /// Every bucket, in catalog order.
    pub const ALL: [Bucket; 15] = [
        Bucket::ConsultantTeam(TeamNumber(1)),
        Bucket::ConsultantTeam(TeamNumber(2)),
        Bucket::ConsultantTeam(TeamNumber(3)),
        Bucket::ConsultantTeam(TeamNumber(4)),
        Bucket::ConsultantTeam(TeamNumber(5)),
        Bucket::ConsultantTeam(TeamNumber(6)),
        Bucket::ConsultantTeam(TeamNumber(7)),
        Bucket::ItManagers,
        Bucket::CSuite,
        Bucket::SystemEngineers,
        Bucket::NetworkEngineers,
        Bucket::SoftwareEngineers,
        Bucket::GrcEngineers,
        Bucket::Facilities,
        Bucket::Other,
    ];

    /// The numbered consultant team bucket, if `n` is in the catalog.
    pub fn consultant_team(n: u32) -> Option<Bucket> {
        TeamNumber::new(n).map(Bucket::ConsultantTeam)
    }

    pub fn is_consultant_team(&self) -> bool {
        matches!(self, Bucket::ConsultantTeam(_))
    }

    /// Position in the catalog.
    pub fn catalog_index(&self) -> usize {
        match self {
            Bucket::ConsultantTeam(n) => n.get() as usize - 1,
            Bucket::ItManagers => 7,
            Bucket::CSuite => 8,
            Bucket::SystemEngineers => 9,
            Bucket::NetworkEngineers => 10,
            Bucket::SoftwareEngineers => 11,
            Bucket::GrcEngineers => 12,
            Bucket::Facilities => 13,
            Bucket::Other => 14,
        }
    }

    /// Display label, e.g. `"Consultant Team 3"` or `"IT Managers"`.
    pub fn name(&self) -> String {
        match self {
            Bucket::ConsultantTeam(n) => format!("Consultant Team {n}"),
            other => other.fixed_name().to_string(),
        }
    }

    fn fixed_name(&self) -> &'static str {
        match self {
            Bucket::ConsultantTeam(_) => "Consultant Team",
            Bucket::ItManagers => "IT Managers",
            Bucket::CSuite => "C Suite",
            Bucket::SystemEngineers => "System Engineers",
            Bucket::NetworkEngineers => "Network Engineers",
            Bucket::SoftwareEngineers => "Software Engineers",
            Bucket::GrcEngineers => "GRC Engineers",
            Bucket::Facilities => "Facilities",
            Bucket::Other => "Other",
        }
    }

    /// Parses a display label, ignoring case and surrounding whitespace.
    pub fn from_name(name: &str) -> Option<Bucket> {
        let wanted = name.trim().to_lowercase();
        Bucket::ALL
            .iter()
            .copied()
            .find(|b| b.name().to_lowercase() == wanted)
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bucket::ConsultantTeam(n) => write!(f, "Consultant Team {n}"),
            other => f.write_str(other.fixed_name()),
        }
    }
}

impl Serialize for Bucket {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name())
    }
}

impl<'de> Deserialize<'de> for Bucket {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Bucket::from_name(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown bucket: {raw}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_index_matches_position() {
        for (i, bucket) in Bucket::ALL.iter().enumerate() {
            assert_eq!(bucket.catalog_index(), i, "{bucket}");
        }
    }

    #[test]
    fn consultant_team_rejects_out_of_range() {
        assert_eq!(Bucket::consultant_team(0), None);
        assert_eq!(Bucket::consultant_team(8), None);
        assert_eq!(Bucket::consultant_team(7), Some(Bucket::ALL[6]));
        assert_eq!(TeamNumber::new(9), None);
        assert_eq!(TeamNumber::new(3).map(TeamNumber::get), Some(3));
    }

    #[test]
    fn names_round_trip_case_insensitively() {
        assert_eq!(Bucket::from_name("it managers"), Some(Bucket::ItManagers));
        assert_eq!(
            Bucket::from_name(" CONSULTANT TEAM 4 "),
            Bucket::consultant_team(4)
        );
        assert_eq!(Bucket::from_name("Consultant Team 9"), None);
        assert_eq!(Bucket::GrcEngineers.to_string(), "GRC Engineers");
    }

    #[test]
    fn serializes_as_display_label() {
        let json = serde_json::to_string(&Bucket::ALL[1]).unwrap();
        assert_eq!(json, "\"Consultant Team 2\"");
        let back: Bucket = serde_json::from_str("\"C Suite\"").unwrap();
        assert_eq!(back, Bucket::CSuite);
    }
}
