use super::index::ProjectIndex;
use super::scanner::{begin_marker, end_marker, strip_eol};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Invariant {
    BuildFileRefExists,
    PhaseMemberExists,
    GroupChildExists,
    BalancedSections,
    SingleSourcesPhase,
    UniqueIdentifiers,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub invariant: Invariant,
    /// One-based line number, when the violation has a single location.
    pub line: Option<usize>,
    pub message: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.line {
            Some(line) => write!(f, "line {line}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

fn at(line: usize) -> Option<usize> {
    Some(line + 1)
}

/// Check the cross-reference and structure invariants of a pbxproj.
pub fn verify(text: &str) -> Vec<Violation> {
    let index = ProjectIndex::build(text);
    let mut out = Vec::new();

    check_balanced(text, &mut out);

    let mut seen: HashMap<&str, usize> = HashMap::new();
    for (id, line) in &index.definitions {
        if let Some(first) = seen.insert(id.as_str(), *line) {
            out.push(Violation {
                invariant: Invariant::UniqueIdentifiers,
                line: at(*line),
                message: format!("{id} already defined on line {}", first + 1),
            });
        }
    }

    for b in &index.build_files {
        match b.file_ref.as_deref() {
            Some(r) if index.file_ref(r).is_some() => {}
            Some(r) => out.push(Violation {
                invariant: Invariant::BuildFileRefExists,
                line: at(b.line),
                message: format!("build file {} references missing file {r}", b.id),
            }),
            None => out.push(Violation {
                invariant: Invariant::BuildFileRefExists,
                line: at(b.line),
                message: format!("build file {} has no fileRef", b.id),
            }),
        }
    }

    let build_ids: HashSet<&str> = index.build_files.iter().map(|b| b.id.as_str()).collect();
    for phase in &index.sources_phases {
        for m in &phase.files {
            if !build_ids.contains(m.id.as_str()) {
                out.push(Violation {
                    invariant: Invariant::PhaseMemberExists,
                    line: at(m.line),
                    message: format!("sources phase lists missing build file {}", m.id),
                });
            }
        }
    }

    // Children may be subgroups or variant groups, so any defined object counts.
    let defined: HashSet<&str> = index.definitions.iter().map(|(id, _)| id.as_str()).collect();
    for group in &index.groups {
        for m in &group.children {
            if !defined.contains(m.id.as_str()) {
                out.push(Violation {
                    invariant: Invariant::GroupChildExists,
                    line: at(m.line),
                    message: format!("group lists missing object {}", m.id),
                });
            }
        }
    }

    let mut group_count: HashMap<&str, usize> = HashMap::new();
    for group in &index.groups {
        for m in &group.children {
            *group_count.entry(m.id.as_str()).or_default() += 1;
        }
    }
    for f in &index.file_refs {
        if group_count.get(f.id.as_str()) != Some(&1) {
            continue;
        }
        let builds: HashSet<&str> = index.build_files_for(&f.id).map(|b| b.id.as_str()).collect();
        let phases = index
            .sources_phases
            .iter()
            .filter(|p| p.files.iter().any(|m| builds.contains(m.id.as_str())))
            .count();
        if phases > 1 {
            out.push(Violation {
                invariant: Invariant::SingleSourcesPhase,
                line: at(f.line),
                message: format!(
                    "{} is compiled by {phases} sources phases",
                    f.display_name().unwrap_or(&f.id)
                ),
            });
        }
    }

    out
}

/// Violations present in `after` whose kind occurs more often than in
/// `before`. Line numbers shift on every edit, so kinds are compared by count.
pub fn introduced_violations(before: &str, after: &str) -> Vec<Violation> {
    let mut baseline: HashMap<Invariant, usize> = HashMap::new();
    for v in verify(before) {
        *baseline.entry(v.invariant).or_default() += 1;
    }
    let current = verify(after);
    let mut counts: HashMap<Invariant, usize> = HashMap::new();
    for v in &current {
        *counts.entry(v.invariant).or_default() += 1;
    }
    current
        .into_iter()
        .filter(|v| counts[&v.invariant] > baseline.get(&v.invariant).copied().unwrap_or(0))
        .collect()
}

fn check_balanced(text: &str, out: &mut Vec<Violation>) {
    let mut open: Option<(&str, usize)> = None;
    for (i, raw) in text.split_inclusive('\n').enumerate() {
        let line = strip_eol(raw);
        if let Some(name) = begin_marker(line) {
            if let Some((outer, _)) = open {
                out.push(Violation {
                    invariant: Invariant::BalancedSections,
                    line: at(i),
                    message: format!("{name} section begins inside {outer} section"),
                });
            }
            open = Some((name, i));
        } else if let Some(name) = end_marker(line) {
            match open {
                Some((current, _)) if current == name => open = None,
                Some((current, _)) => {
                    out.push(Violation {
                        invariant: Invariant::BalancedSections,
                        line: at(i),
                        message: format!("{name} section ends while {current} section is open"),
                    });
                    open = None;
                }
                None => out.push(Violation {
                    invariant: Invariant::BalancedSections,
                    line: at(i),
                    message: format!("{name} section ends without a begin marker"),
                }),
            }
        }
    }
    if let Some((name, line)) = open {
        out.push(Violation {
            invariant: Invariant::BalancedSections,
            line: at(line),
            message: format!("{name} section is never closed"),
        });
    }
}
