//! Secondary (dual-role) memberships.
//!
//! Some people hold a role in a second bucket on top of their primary one: an
//! IT Manager who also leads a numbered consultant team or Facilities, a CTO
//! who heads Network Engineering, a COO who sits with the IT Managers. The rule
//! set is closed; no other combination yields a secondary membership.

use crate::catalog::Bucket;
use crate::classify::{classify_profile, TextProfile};
use crate::record::PersonRecord;
use serde::{Deserialize, Serialize};

/// A record's primary bucket plus any secondary buckets, in catalog order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub primary: Bucket,
    pub secondary: Vec<Bucket>,
}

impl Membership {
    /// Classifies `record` and resolves its secondary buckets.
    pub fn resolve(record: &PersonRecord) -> Self {
        Self::from_profile(&TextProfile::from_record(record))
    }

    pub(crate) fn from_profile(profile: &TextProfile) -> Self {
        let (primary, _) = classify_profile(profile);
        Membership {
            primary,
            secondary: profile_secondaries(profile, primary),
        }
    }

    /// Primary or secondary membership in `bucket`.
    pub fn holds(&self, bucket: Bucket) -> bool {
        self.primary == bucket || self.secondary.contains(&bucket)
    }

    pub fn buckets(&self) -> impl Iterator<Item = Bucket> + '_ {
        std::iter::once(self.primary).chain(self.secondary.iter().copied())
    }
}

/// Whether `record`, classified into `primary`, also belongs to `candidate`.
pub fn has_secondary_membership(record: &PersonRecord, primary: Bucket, candidate: Bucket) -> bool {
    profile_has_secondary(&TextProfile::from_record(record), primary, candidate)
}

pub(crate) fn profile_has_secondary(profile: &TextProfile, primary: Bucket, candidate: Bucket) -> bool {
    if primary == candidate {
        return false;
    }
    match (primary, candidate) {
        (Bucket::ItManagers, Bucket::ConsultantTeam(n)) => profile
            .consultant_team_labels()
            .any(|label_team| label_team == n.get()),
        (Bucket::ItManagers, Bucket::Facilities) => profile.any_label("facilities"),
        (Bucket::CSuite, Bucket::NetworkEngineers) => {
            profile.is_cto() && profile.any_label("network engineer")
        }
        (Bucket::CSuite, Bucket::ItManagers) => profile.is_coo() && profile.has_itm_label(),
        _ => false,
    }
}

/// All secondary buckets of a record, in catalog order.
pub fn secondary_memberships(record: &PersonRecord, primary: Bucket) -> Vec<Bucket> {
    let profile = TextProfile::from_record(record);
    profile_secondaries(&profile, primary)
}

pub(crate) fn profile_secondaries(profile: &TextProfile, primary: Bucket) -> Vec<Bucket> {
    Bucket::ALL
        .iter()
        .copied()
        .filter(|candidate| profile_has_secondary(profile, primary, *candidate))
        .collect()
}
