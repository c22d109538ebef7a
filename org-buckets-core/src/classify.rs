//! Primary bucket classification.
//!
//! A record's primary bucket is decided by an ordered table of heuristic rules
//! over its job title and team labels. The first rule that matches wins, so the
//! order of [`RULES`] is the precedence. All matching is case-insensitive: the
//! inputs are lowercased once into a [`TextProfile`] and every rule reads that.
//!
//! Classification never fails. Missing titles and labels are empty strings and
//! fall through to [`Bucket::Other`].

use crate::catalog::Bucket;
use crate::record::PersonRecord;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

static EXECUTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(ceo|cto|coo|cfo|cpo)\b|\bchief\b.*\bofficer\b|\bc-suite\b|\bdirector\b")
        .expect("static regex")
});
static CONSULTANT_TEAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"consultant\s*team\s*#?\s*(\d+)").expect("static regex"));
static TEAM_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bteam\s*#?\s*(\d+)").expect("static regex"));
static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("static regex"));

/// Lowercased view of the fields the rules look at.
#[derive(Debug, Clone)]
pub struct TextProfile {
    pub title: String,
    pub labels: Vec<String>,
    /// The labels joined back together, for last-resort digit search.
    pub raw_team: String,
}

impl TextProfile {
    pub fn new(title: Option<&str>, labels: &[String]) -> Self {
        let labels: Vec<String> = labels.iter().map(|l| l.to_lowercase()).collect();
        Self {
            title: title.unwrap_or("").to_lowercase(),
            raw_team: labels.join(", "),
            labels,
        }
    }

    pub fn from_record(record: &PersonRecord) -> Self {
        Self::new(record.job_title.as_deref(), &record.team_labels)
    }

    pub fn any_label(&self, needle: &str) -> bool {
        self.labels.iter().any(|l| l.contains(needle))
    }

    fn title_has(&self, needle: &str) -> bool {
        self.title.contains(needle)
    }

    /// Plain containment, so "Audit Manager" counts as well.
    pub fn is_it_manager(&self) -> bool {
        self.title_has("it manager")
    }

    fn is_se_manager(&self) -> bool {
        self.title_has("se manager") || self.title_has("systems engineering manager")
    }

    pub fn is_cto(&self) -> bool {
        self.title_has("cto") || self.title_has("chief technology officer")
    }

    pub fn is_coo(&self) -> bool {
        self.title_has("coo") || self.title_has("chief operating officer")
    }

    /// A team label mentions "itm" or "it manager".
    pub fn has_itm_label(&self) -> bool {
        self.any_label("itm") || self.any_label("it manager")
    }

    /// Numbers from explicit "consultant team N" mentions, in label order.
    /// One label may name several teams.
    pub fn consultant_team_labels(&self) -> impl Iterator<Item = u32> + '_ {
        self.labels
            .iter()
            .flat_map(|l| CONSULTANT_TEAM.captures_iter(l))
            .filter_map(|c| c.get(1).and_then(|m| m.as_str().parse().ok()))
    }

    /// A non-manager whose title marks them as a consultant.
    pub fn is_non_manager_consultant(&self) -> bool {
        self.title_has("consultant") && !self.title_has("manager")
    }
}

/// True when the title contains "it manager", ignoring case.
pub fn is_it_manager_title(title: &str) -> bool {
    title.to_lowercase().contains("it manager")
}

enum Outcome {
    Fixed(Bucket),
    Derived(fn(&TextProfile) -> Option<Bucket>),
}

/// One entry in the precedence table.
pub struct Rule {
    pub name: &'static str,
    when: fn(&TextProfile) -> bool,
    outcome: Outcome,
}

impl Rule {
    fn fixed(name: &'static str, when: fn(&TextProfile) -> bool, bucket: Bucket) -> Self {
        Rule {
            name,
            when,
            outcome: Outcome::Fixed(bucket),
        }
    }

    fn derived(name: &'static str, derive: fn(&TextProfile) -> Option<Bucket>) -> Self {
        Rule {
            name,
            when: always,
            outcome: Outcome::Derived(derive),
        }
    }

    pub fn apply(&self, profile: &TextProfile) -> Option<Bucket> {
        if !(self.when)(profile) {
            return None;
        }
        match &self.outcome {
            Outcome::Fixed(bucket) => Some(*bucket),
            Outcome::Derived(derive) => derive(profile),
        }
    }
}

fn always(_: &TextProfile) -> bool {
    true
}

fn is_individual_contributor(p: &TextProfile) -> bool {
    !p.title_has("manager")
}

/// Rule precedence, first match wins.
pub static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        // Managers of a function belong to that function.
        Rule::fixed("se-manager", |p| p.is_se_manager(), Bucket::SystemEngineers),
        Rule::fixed("grc-manager", |p| p.title_has("grc manager"), Bucket::GrcEngineers),
        // IT Managers stay IT Managers whatever their team labels say.
        Rule::fixed("it-manager", |p| p.is_it_manager(), Bucket::ItManagers),
        Rule::fixed(
            "software-engineering-manager",
            |p| {
                (p.title_has("software engineer") && p.title_has("manager"))
                    || (p.title_has("manager") && p.any_label("software engineering"))
            },
            Bucket::SoftwareEngineers,
        ),
        Rule::fixed(
            "itm-operations-manager",
            |p| p.title_has("operations manager") && p.has_itm_label(),
            Bucket::ItManagers,
        ),
        Rule::fixed("executive", |p| EXECUTIVE.is_match(&p.title), Bucket::CSuite),
        Rule::fixed(
            "system-engineer",
            |p| {
                is_individual_contributor(p)
                    && (p.title_has("system engineer") || p.title_has("systems engineer"))
            },
            Bucket::SystemEngineers,
        ),
        Rule::fixed(
            "network-engineer",
            |p| is_individual_contributor(p) && p.title_has("network engineer"),
            Bucket::NetworkEngineers,
        ),
        Rule::fixed(
            "software-engineer",
            |p| {
                is_individual_contributor(p)
                    && (p.title_has("software engineer") || p.any_label("software engineering"))
            },
            Bucket::SoftwareEngineers,
        ),
        Rule::fixed(
            "grc-engineer",
            |p| is_individual_contributor(p) && p.title_has("grc") && p.title_has("engineer"),
            Bucket::GrcEngineers,
        ),
        Rule::derived("consultant-team", consultant_team),
        Rule::fixed(
            "facilities",
            |p| p.any_label("facilities") || p.title_has("facilities"),
            Bucket::Facilities,
        ),
    ]
});

/// Finds the numbered consultant team, searching labels before the title.
///
/// Bare "team N" counts only when the record otherwise reads as a consultant.
/// When a label says "consultant" but carries no team number, the first digit
/// run anywhere in the team string is used as a last resort. Without any
/// number there is no team: unassigned consultants are never defaulted into
/// team 1.
fn consultant_team(p: &TextProfile) -> Option<Bucket> {
    let consultant_context = p.title_has("consultant") || p.any_label("consultant");
    let fields = p.labels.iter().map(String::as_str).chain(std::iter::once(p.title.as_str()));

    for field in fields {
        let mut patterns: Vec<&Regex> = vec![&*CONSULTANT_TEAM];
        if consultant_context {
            patterns.push(&*TEAM_NUMBER);
        }
        for re in patterns {
            for caps in re.captures_iter(field) {
                let n = caps.get(1).and_then(|m| m.as_str().parse::<u32>().ok());
                if let Some(bucket) = n.and_then(Bucket::consultant_team) {
                    return Some(bucket);
                }
            }
        }
    }

    // Last resort; a street number or phone fragment will also match here.
    if p.any_label("consultant") {
        let n = DIGITS
            .find(&p.raw_team)
            .and_then(|m| m.as_str().parse::<u32>().ok());
        return n.and_then(Bucket::consultant_team);
    }
    None
}

/// Classifies into the primary bucket and reports which rule decided it.
/// `"fallback"` means no rule matched.
pub fn classify_with_rule(job_title: Option<&str>, team_labels: &[String]) -> (Bucket, &'static str) {
    let profile = TextProfile::new(job_title, team_labels);
    classify_profile(&profile)
}

pub(crate) fn classify_profile(profile: &TextProfile) -> (Bucket, &'static str) {
    for rule in RULES.iter() {
        if let Some(bucket) = rule.apply(profile) {
            debug!(rule = rule.name, bucket = %bucket, title = %profile.title, "Classified record");
            return (bucket, rule.name);
        }
    }
    (Bucket::Other, "fallback")
}

/// Maps one record's job title and team labels to its primary bucket.
pub fn classify(job_title: Option<&str>, team_labels: &[String]) -> Bucket {
    classify_with_rule(job_title, team_labels).0
}
