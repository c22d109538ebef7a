//! Per-bucket forest construction.
//!
//! Every bucket gets its own node arena, keyed by record position. A record that
//! belongs to two buckets gets two independent nodes, each with children computed
//! for that bucket alone. Owned [`OrgNode`] trees are only materialized once all
//! placements are done.
//!
//! Placement runs in two passes:
//! 1. dual-role IT Managers and C Suite members are placed into their secondary
//!    buckets, so subordinates can find them while walking up their chain;
//! 2. every record is placed into its primary bucket.
//!
//! For one record R and bucket B, a parent is chosen by the first rule that
//! yields one:
//! - Facilities only: R's direct manager, when that manager is an IT Manager
//!   with a "facilities" team label. More distant ancestors are not considered.
//! - the nearest manager-chain ancestor holding any membership in B;
//! - numbered consultant teams only: for a non-manager consultant, the first IT
//!   Manager with a secondary membership in B;
//! - Facilities only: the first IT Manager with a "facilities" team label.
//!
//! Otherwise R is a root of B. Records sitting on a manager cycle skip the
//! ancestor walk, no attachment may close a loop inside a bucket tree, and the
//! two fallbacks never pick someone who reports (directly or not) to R.

use crate::catalog::Bucket;
use crate::classify::TextProfile;
use crate::record::{PersonRecord, RecordIndex};
use crate::secondary::Membership;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, info};

/// A record's position within one bucket's tree.
///
/// Lookups, counting and dropping are iterative. The derived impls (clone,
/// comparison, serde) recurse once per level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgNode {
    pub id: String,
    pub display_name: String,
    pub job_title: Option<String>,
    pub team_labels: Vec<String>,
    pub manager_display_name: Option<String>,
    pub children: Vec<OrgNode>,
}

impl OrgNode {
    /// Depth-first search for `id` in this subtree.
    pub fn find(&self, id: &str) -> Option<&OrgNode> {
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if node.id == id {
                return Some(node);
            }
            stack.extend(node.children.iter().rev());
        }
        None
    }

    /// Number of nodes in this subtree, including this one.
    pub fn size(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }

    pub fn child_ids(&self) -> Vec<&str> {
        self.children.iter().map(|c| c.id.as_str()).collect()
    }
}

// Manager chains can be arbitrarily deep; unlink children before they drop.
impl Drop for OrgNode {
    fn drop(&mut self) {
        let mut stack = std::mem::take(&mut self.children);
        while let Some(mut node) = stack.pop() {
            stack.append(&mut node.children);
        }
    }
}

/// The roots of one populated bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketForest {
    #[serde(rename = "bucketName")]
    pub bucket: Bucket,
    pub roots: Vec<OrgNode>,
}

impl BucketForest {
    pub fn find(&self, id: &str) -> Option<&OrgNode> {
        self.roots.iter().find_map(|r| r.find(id))
    }

    pub fn node_count(&self) -> usize {
        self.roots.iter().map(OrgNode::size).sum()
    }

    pub fn root_ids(&self) -> Vec<&str> {
        self.roots.iter().map(|r| r.id.as_str()).collect()
    }

    /// Every id in the forest, depth-first in output order.
    pub fn ids(&self) -> Vec<&str> {
        let mut out = Vec::new();
        let mut stack: Vec<&OrgNode> = self.roots.iter().rev().collect();
        while let Some(node) = stack.pop() {
            out.push(node.id.as_str());
            stack.extend(node.children.iter().rev());
        }
        out
    }
}

/// Builds one forest per populated bucket, in catalog order.
pub fn build_forests(records: &[PersonRecord]) -> Vec<BucketForest> {
    let memberships: Vec<Membership> = records.iter().map(Membership::resolve).collect();
    build_forests_with(records, &memberships)
}

/// Like [`build_forests`], with memberships already resolved (one per record, same order).
pub fn build_forests_with(records: &[PersonRecord], memberships: &[Membership]) -> Vec<BucketForest> {
    info!(records = records.len(), "Building bucket forests");
    let mut builder = ForestBuilder::new(records, memberships);

    // Pass 1: dual-role members go into their secondary buckets first.
    for (idx, membership) in memberships.iter().enumerate() {
        let privileged: Vec<Bucket> = match membership.primary {
            Bucket::ItManagers => membership
                .secondary
                .iter()
                .copied()
                .filter(|b| b.is_consultant_team() || *b == Bucket::Facilities)
                .collect(),
            Bucket::CSuite => membership.secondary.clone(),
            _ => Vec::new(),
        };
        for bucket in privileged {
            builder.place(idx, bucket);
        }
    }

    // Pass 2: everyone into their primary bucket.
    for (idx, membership) in memberships.iter().enumerate() {
        builder.place(idx, membership.primary);
    }

    let forests = builder.finish();
    info!(buckets = forests.len(), "Built bucket forests");
    forests
}

#[derive(Debug)]
struct Slot {
    record: usize,
    parent: Option<usize>,
    children: Vec<usize>,
    placed: bool,
}

/// Node pool for one bucket. Slots are created on demand and never removed.
#[derive(Debug, Default)]
struct BucketArena {
    slots: Vec<Slot>,
    by_record: HashMap<usize, usize>,
}

impl BucketArena {
    fn slot_for(&mut self, record: usize) -> usize {
        if let Some(&slot) = self.by_record.get(&record) {
            return slot;
        }
        let slot = self.slots.len();
        self.slots.push(Slot {
            record,
            parent: None,
            children: Vec::new(),
            placed: false,
        });
        self.by_record.insert(record, slot);
        slot
    }

    /// Whether `slot` is `of` or one of its current ancestors.
    fn is_ancestor_or_self(&self, slot: usize, of: usize) -> bool {
        if self.slots[slot].children.is_empty() {
            return slot == of;
        }
        let mut cur = Some(of);
        while let Some(s) = cur {
            if s == slot {
                return true;
            }
            cur = self.slots[s].parent;
        }
        false
    }

    fn attach(&mut self, child: usize, parent: usize) {
        self.slots[child].parent = Some(parent);
        self.slots[parent].children.push(child);
    }
}

struct ForestBuilder<'a> {
    index: RecordIndex<'a>,
    profiles: Vec<TextProfile>,
    memberships: &'a [Membership],
    on_manager_cycle: Vec<bool>,
    arenas: BTreeMap<Bucket, BucketArena>,
}

impl<'a> ForestBuilder<'a> {
    fn new(records: &'a [PersonRecord], memberships: &'a [Membership]) -> Self {
        let index = RecordIndex::new(records);
        let on_manager_cycle = manager_cycle_members(&index);
        Self {
            profiles: records.iter().map(TextProfile::from_record).collect(),
            index,
            memberships,
            on_manager_cycle,
            arenas: BTreeMap::new(),
        }
    }

    fn place(&mut self, record: usize, bucket: Bucket) {
        let arena = self.arenas.entry(bucket).or_default();
        let slot = arena.slot_for(record);
        if arena.slots[slot].placed {
            return;
        }
        arena.slots[slot].placed = true;

        let parent = self
            .direct_facilities_manager(record, bucket)
            .or_else(|| self.nearest_member_ancestor(record, bucket))
            .or_else(|| self.consultant_team_lead(record, bucket))
            .or_else(|| self.any_facilities_manager(record, bucket));

        let id = &self.index.records()[record].id;
        match parent {
            Some((parent, rule)) => {
                let arena = self.arenas.entry(bucket).or_default();
                let parent_slot = arena.slot_for(parent);
                arena.attach(slot, parent_slot);
                debug!(
                    bucket = %bucket,
                    id = %id,
                    parent = %self.index.records()[parent].id,
                    rule,
                    "Placed record"
                );
            }
            None => debug!(bucket = %bucket, id = %id, "Placed record as root"),
        }
    }

    /// Attaching `record` under `candidate` in `bucket` keeps the tree acyclic.
    fn can_attach(&self, record: usize, candidate: usize, bucket: Bucket) -> bool {
        if record == candidate {
            return false;
        }
        let Some(arena) = self.arenas.get(&bucket) else {
            return true;
        };
        match (arena.by_record.get(&record), arena.by_record.get(&candidate)) {
            (Some(&slot), Some(&candidate_slot)) => !arena.is_ancestor_or_self(slot, candidate_slot),
            _ => true,
        }
    }

    /// Fallback parents must not sit below `record` in the manager chain.
    fn can_adopt(&self, record: usize, candidate: usize, bucket: Bucket) -> bool {
        self.can_attach(record, candidate, bucket) && !self.reports_to(candidate, record)
    }

    /// Whether `record` appears anywhere in `candidate`'s manager chain.
    fn reports_to(&self, candidate: usize, record: usize) -> bool {
        let mut visited = HashSet::new();
        let mut cur = self.index.manager_of(candidate);
        while let Some(ancestor) = cur {
            if ancestor == record {
                return true;
            }
            if !visited.insert(ancestor) {
                return false;
            }
            cur = self.index.manager_of(ancestor);
        }
        false
    }

    fn is_facilities_it_manager(&self, idx: usize) -> bool {
        let profile = &self.profiles[idx];
        profile.is_it_manager() && profile.any_label("facilities")
    }

    fn direct_facilities_manager(&self, record: usize, bucket: Bucket) -> Option<(usize, &'static str)> {
        if bucket != Bucket::Facilities {
            return None;
        }
        let manager = self.index.manager_of(record)?;
        (self.is_facilities_it_manager(manager) && self.can_attach(record, manager, bucket))
            .then_some((manager, "facilities-direct-manager"))
    }

    fn nearest_member_ancestor(&self, record: usize, bucket: Bucket) -> Option<(usize, &'static str)> {
        if self.on_manager_cycle[record] {
            return None;
        }
        let mut visited = HashSet::new();
        let mut cur = self.index.manager_of(record);
        while let Some(ancestor) = cur {
            if !visited.insert(ancestor) {
                break;
            }
            if self.memberships[ancestor].holds(bucket) && self.can_attach(record, ancestor, bucket) {
                return Some((ancestor, "ancestor"));
            }
            cur = self.index.manager_of(ancestor);
        }
        None
    }

    fn consultant_team_lead(&self, record: usize, bucket: Bucket) -> Option<(usize, &'static str)> {
        if !bucket.is_consultant_team() || !self.profiles[record].is_non_manager_consultant() {
            return None;
        }
        (0..self.profiles.len())
            .find(|&i| {
                self.memberships[i].secondary.contains(&bucket)
                    && self.profiles[i].is_it_manager()
                    && self.can_adopt(record, i, bucket)
            })
            .map(|i| (i, "consultant-team-lead"))
    }

    fn any_facilities_manager(&self, record: usize, bucket: Bucket) -> Option<(usize, &'static str)> {
        if bucket != Bucket::Facilities {
            return None;
        }
        (0..self.profiles.len())
            .find(|&i| self.is_facilities_it_manager(i) && self.can_adopt(record, i, bucket))
            .map(|i| (i, "facilities-manager"))
    }

    fn finish(self) -> Vec<BucketForest> {
        self.arenas
            .iter()
            .filter(|(_, arena)| !arena.slots.is_empty())
            .map(|(bucket, arena)| BucketForest {
                bucket: *bucket,
                roots: self.materialize(arena),
            })
            .collect()
    }

    /// Owned trees for every root of `arena`, built children-first.
    fn materialize(&self, arena: &BucketArena) -> Vec<OrgNode> {
        let roots: Vec<usize> = (0..arena.slots.len())
            .filter(|&i| arena.slots[i].parent.is_none())
            .collect();

        // Pre-order visit; walked backwards, every child precedes its parent.
        let mut order = Vec::with_capacity(arena.slots.len());
        let mut stack = roots.clone();
        while let Some(slot) = stack.pop() {
            order.push(slot);
            stack.extend(arena.slots[slot].children.iter().copied());
        }

        let mut built: Vec<Option<OrgNode>> = (0..arena.slots.len()).map(|_| None).collect();
        for &slot in order.iter().rev() {
            let entry = &arena.slots[slot];
            let children = entry
                .children
                .iter()
                .filter_map(|&child| built[child].take())
                .collect();
            built[slot] = Some(self.node(entry.record, children));
        }
        roots.into_iter().filter_map(|root| built[root].take()).collect()
    }

    fn node(&self, record: usize, children: Vec<OrgNode>) -> OrgNode {
        let person = &self.index.records()[record];
        OrgNode {
            id: person.id.clone(),
            display_name: person.display_name.clone(),
            job_title: person.job_title.clone(),
            team_labels: person.team_labels.clone(),
            manager_display_name: self
                .index
                .manager_of(record)
                .map(|m| self.index.records()[m].display_name.clone()),
            children,
        }
    }
}

/// Marks every record whose manager chain leads back to itself.
fn manager_cycle_members(index: &RecordIndex<'_>) -> Vec<bool> {
    const UNSEEN: u8 = 0;
    const ON_PATH: u8 = 1;
    const DONE: u8 = 2;

    let n = index.records().len();
    let mut state = vec![UNSEEN; n];
    let mut on_cycle = vec![false; n];

    for start in 0..n {
        if state[start] != UNSEEN {
            continue;
        }
        let mut path = Vec::new();
        let mut cur = Some(start);
        while let Some(i) = cur {
            match state[i] {
                UNSEEN => {
                    state[i] = ON_PATH;
                    path.push(i);
                    cur = index.manager_of(i);
                }
                ON_PATH => {
                    if let Some(pos) = path.iter().position(|&p| p == i) {
                        for &member in &path[pos..] {
                            on_cycle[member] = true;
                        }
                    }
                    break;
                }
                _ => break,
            }
        }
        for i in path {
            state[i] = DONE;
        }
    }
    on_cycle
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forest<'f>(forests: &'f [BucketForest], bucket: Bucket) -> &'f BucketForest {
        forests
            .iter()
            .find(|f| f.bucket == bucket)
            .unwrap_or_else(|| panic!("no forest for {bucket}"))
    }

    #[test]
    fn forests_follow_catalog_order_and_skip_empty_buckets() {
        let records = vec![
            PersonRecord::new("1", "Zed").with_title("Custodian").with_teams(["Facilities"]),
            PersonRecord::new("2", "Dave").with_title("Systems Engineer"),
            PersonRecord::new("3", "Ann").with_title("IT Consultant").with_teams(["Consultant Team 2"]),
        ];
        let forests = build_forests(&records);
        let order: Vec<Bucket> = forests.iter().map(|f| f.bucket).collect();
        assert_eq!(
            order,
            vec![Bucket::consultant_team(2).unwrap(), Bucket::SystemEngineers, Bucket::Facilities]
        );
    }

    #[test]
    fn ancestor_walk_skips_non_members() {
        // eng -> lead (Other) -> principal (System Engineers)
        let records = vec![
            PersonRecord::new("principal", "P").with_title("Principal Systems Engineer"),
            PersonRecord::new("lead", "L").with_title("Team Lead").with_manager("principal"),
            PersonRecord::new("eng", "E").with_title("Systems Engineer").with_manager("lead"),
        ];
        let forests = build_forests(&records);
        let sys = forest(&forests, Bucket::SystemEngineers);
        assert_eq!(sys.root_ids(), vec!["principal"]);
        assert_eq!(sys.roots[0].child_ids(), vec!["eng"]);
        assert_eq!(
            sys.find("eng").and_then(|n| n.manager_display_name.as_deref()),
            Some("L")
        );
    }

    #[test]
    fn dangling_manager_reference_is_a_root() {
        let records = vec![PersonRecord::new("a", "A")
            .with_title("Network Engineer")
            .with_manager("ghost")];
        let forests = build_forests(&records);
        let net = forest(&forests, Bucket::NetworkEngineers);
        assert_eq!(net.root_ids(), vec!["a"]);
        assert_eq!(net.roots[0].manager_display_name, None);
    }

    #[test]
    fn same_bucket_cycle_yields_two_roots() {
        let records = vec![
            PersonRecord::new("frank", "Frank").with_title("Network Engineer").with_manager("grace"),
            PersonRecord::new("grace", "Grace").with_title("Network Engineer").with_manager("frank"),
            PersonRecord::new("hal", "Hal").with_title("Network Engineer").with_manager("grace"),
        ];
        let forests = build_forests(&records);
        let net = forest(&forests, Bucket::NetworkEngineers);
        assert_eq!(net.root_ids(), vec!["frank", "grace"]);
        // A record hanging off the cycle still attaches normally.
        assert_eq!(net.find("grace").map(|n| n.child_ids()), Some(vec!["hal"]));
        assert_eq!(net.node_count(), 3);
    }

    #[test]
    fn self_managed_record_terminates() {
        let records = vec![PersonRecord::new("a", "A").with_title("GRC Engineer").with_manager("a")];
        let forests = build_forests(&records);
        assert_eq!(forest(&forests, Bucket::GrcEngineers).root_ids(), vec!["a"]);
    }

    #[test]
    fn fallback_never_closes_a_loop() {
        // Two facilities IT managers managing each other: the fallback must not
        // attach each under the other.
        let records = vec![
            PersonRecord::new("f0", "F0")
                .with_title("IT Manager")
                .with_teams(["Facilities"])
                .with_manager("f1"),
            PersonRecord::new("f1", "F1")
                .with_title("IT Manager")
                .with_teams(["Facilities"])
                .with_manager("f0"),
        ];
        let forests = build_forests(&records);
        let fac = forest(&forests, Bucket::Facilities);
        assert_eq!(fac.node_count(), 2);
        let mut ids = fac.ids();
        ids.sort();
        assert_eq!(ids, vec!["f0", "f1"]);
    }

    #[test]
    fn deep_manager_chain_builds_without_recursion() {
        const DEPTH: usize = 50_000;
        let records: Vec<PersonRecord> = (0..DEPTH)
            .map(|i| {
                let rec = PersonRecord::new(format!("e{i}"), format!("E{i}"))
                    .with_title("Systems Engineer");
                if i == 0 {
                    rec
                } else {
                    rec.with_manager(format!("e{}", i - 1))
                }
            })
            .collect();
        let forests = build_forests(&records);
        let sys = forest(&forests, Bucket::SystemEngineers);
        assert_eq!(sys.root_ids(), vec!["e0"]);
        assert_eq!(sys.node_count(), DEPTH);
        let last = format!("e{}", DEPTH - 1);
        assert!(sys.find(&last).is_some_and(|n| n.children.is_empty()));
        assert_eq!(sys.ids().len(), DEPTH);
    }

    #[test]
    fn cycle_detection_marks_only_cycle_members() {
        let records = vec![
            PersonRecord::new("a", "A").with_manager("b"),
            PersonRecord::new("b", "B").with_manager("a"),
            PersonRecord::new("c", "C").with_manager("a"),
            PersonRecord::new("d", "D"),
        ];
        let index = RecordIndex::new(&records);
        assert_eq!(manager_cycle_members(&index), vec![true, true, false, false]);
    }
}
