//! Text transforms over a whole pbxproj document.
//!
//! Both transforms are pure: they take the current text and return the new
//! text plus a report. Nothing here touches the filesystem.

use super::anchor::{Anchor, AnchorKind};
use super::ident::{is_object_id, IdGen};
use super::index::ProjectIndex;
use super::scanner::{line_ending, ScannedLine, Section, SectionScanner};
use super::verify::introduced_violations;
use crate::error::{OpsError, Result};
use serde::Serialize;
use std::collections::BTreeSet;

// ---------------------------------------------------------------------------
// Line formats
// ---------------------------------------------------------------------------

pub fn build_file_line(build_id: &str, file_id: &str, name: &str) -> String {
    format!(
        "\t\t{build_id} /* {name} in Sources */ = {{isa = PBXBuildFile; fileRef = {file_id} /* {name} */; }};"
    )
}

pub fn file_ref_line(file_id: &str, name: &str, path: &str) -> String {
    format!(
        "\t\t{file_id} /* {name} */ = {{isa = PBXFileReference; lastKnownFileType = sourcecode.swift; path = \"{path}\"; sourceTree = \"<group>\"; }};"
    )
}

pub fn group_member_line(file_id: &str, name: &str) -> String {
    format!("\t\t\t\t{file_id} /* {name} */,")
}

pub fn sources_member_line(build_id: &str, name: &str) -> String {
    format!("\t\t\t\t{build_id} /* {name} in Sources */,")
}

// ---------------------------------------------------------------------------
// Requests and outcomes
// ---------------------------------------------------------------------------

/// Add one Swift source to a group and to a sources build phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddFile {
    /// Group-relative path, forward slashes, e.g. `Core/Color+Hex.swift`.
    pub relative_path: String,
    /// An existing child of the target group, by display name.
    pub group_sibling: String,
    /// An existing member of the target sources phase, by display name.
    pub sources_sibling: String,
    /// Restrict the group sibling to the group with this name.
    pub group: Option<String>,
}

impl AddFile {
    pub fn new(
        relative_path: impl Into<String>,
        group_sibling: impl Into<String>,
        sources_sibling: impl Into<String>,
    ) -> Self {
        Self {
            relative_path: relative_path.into(),
            group_sibling: group_sibling.into(),
            sources_sibling: sources_sibling.into(),
            group: None,
        }
    }

    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn filename(&self) -> &str {
        self.relative_path
            .rsplit('/')
            .next()
            .unwrap_or(&self.relative_path)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Inserted,
    AlreadyPresent,
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StepStatus::Inserted => write!(f, "inserted"),
            StepStatus::AlreadyPresent => write!(f, "already present"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
    pub section: Section,
    pub status: StepStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddReport {
    pub relative_path: String,
    pub filename: String,
    pub file_id: String,
    pub build_id: String,
    pub steps: Vec<StepReport>,
    pub inserted: usize,
}

impl AddReport {
    pub fn is_noop(&self) -> bool {
        self.inserted == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FragmentReport {
    pub fragment: String,
    pub deleted: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoveReport {
    pub fragments: Vec<FragmentReport>,
    /// Distinct lines deleted; a line matching two fragments counts once.
    pub deleted: usize,
}

// ---------------------------------------------------------------------------
// Path validation
// ---------------------------------------------------------------------------

pub fn validate_relative_path(path: &str) -> Result<()> {
    let reason = if path.is_empty() {
        Some("path is empty")
    } else if path.contains('\\') {
        Some("backslashes are not allowed; use forward slashes")
    } else if path.contains(['\r', '\n']) {
        Some("line breaks are not allowed")
    } else if path.contains('"') {
        Some("double quotes are not allowed")
    } else if path.contains("*/") {
        Some("'*/' would end the entry comment")
    } else if path.starts_with('/') || path.starts_with('~') {
        Some("path must be relative to its group")
    } else if path.ends_with('/') {
        Some("path has no file name")
    } else if !path.ends_with(".swift") {
        Some("only Swift sources (.swift) are supported")
    } else {
        None
    };
    match reason {
        Some(r) => Err(OpsError::invalid_path(path, r)),
        None => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Add transform
// ---------------------------------------------------------------------------

struct Located {
    build_section: usize,
    file_ref_section: usize,
    group_sibling: usize,
    sources_sibling: usize,
}

fn locate(text: &str, req: &AddFile, index: &ProjectIndex) -> Result<Located> {
    let lines: Vec<ScannedLine<'_>> = SectionScanner::new(text).collect();

    let first = |anchor: &Anchor| -> Result<usize> {
        anchor
            .find_first(lines.iter().copied())
            .map(|l| l.index)
            .ok_or(OpsError::AnchorMissing(anchor.kind))
    };

    let build_section = first(&Anchor::build_file_section_start())?;
    let file_ref_section = first(&Anchor::file_ref_section_start())?;

    let group_anchor = Anchor::group_sibling_entry(&req.group_sibling);
    let group_hits: Vec<usize> = lines
        .iter()
        .filter(|l| group_anchor.matches(l))
        .map(|l| l.index)
        .filter(|&i| match &req.group {
            Some(name) => index
                .group_at_line(i)
                .is_some_and(|g| g.name.as_deref() == Some(name.as_str())),
            None => true,
        })
        .collect();
    let Some(&group_sibling) = group_hits.first() else {
        return Err(OpsError::AnchorMissing(AnchorKind::GroupSiblingEntry));
    };
    if req.group.is_none() {
        let owners: BTreeSet<&str> = group_hits
            .iter()
            .filter_map(|&i| index.group_at_line(i))
            .map(|g| g.id.as_str())
            .collect();
        if owners.len() > 1 {
            return Err(OpsError::ambiguous(
                &req.group_sibling,
                format!(
                    "sibling appears in {} groups; name the target group",
                    owners.len()
                ),
            ));
        }
    }

    let sources_sibling = first(&Anchor::sources_sibling_entry(&req.sources_sibling))?;

    Ok(Located {
        build_section,
        file_ref_section,
        group_sibling,
        sources_sibling,
    })
}

/// Existing file reference for `req`, if any. Errors when a bare file name
/// cannot be told apart from another file of the same name.
fn existing_file_ref<'a>(req: &AddFile, index: &'a ProjectIndex) -> Result<Option<&'a str>> {
    let rel = req.relative_path.as_str();
    let filename = req.filename();

    let by_path: Vec<&str> = index
        .file_refs
        .iter()
        .filter(|f| f.path.as_deref() == Some(rel))
        .map(|f| f.id.as_str())
        .collect();
    if by_path.len() > 1 {
        return Err(OpsError::ambiguous(
            rel,
            format!("{} file references share this path", by_path.len()),
        ));
    }

    if !rel.contains('/') {
        let same_name_elsewhere = index
            .file_refs
            .iter()
            .filter(|f| f.display_name() == Some(filename))
            .any(|f| f.path.as_deref() != Some(rel));
        if same_name_elsewhere {
            return Err(OpsError::ambiguous(
                rel,
                "another file with this name exists; pass the group-relative path",
            ));
        }
    }

    Ok(by_path.first().copied())
}

/// Insert `req` into `text`. Sections that already hold the file are skipped.
pub fn apply_add(text: &str, req: &AddFile, ids: &mut IdGen) -> Result<(String, AddReport)> {
    validate_relative_path(&req.relative_path)?;
    let filename = req.filename().to_string();
    let index = ProjectIndex::build(text);

    let existing_ref = existing_file_ref(req, &index)?;
    let at = locate(text, req, &index)?;

    let target_group = index.group_at_line(at.group_sibling);
    let target_phase = index.phase_at_line(at.sources_sibling);

    let mut fresh_ids: Vec<String> = Vec::new();

    let (file_id, ref_present) = match existing_ref {
        Some(id) => (id.to_string(), true),
        None => {
            let id = ids.fresh()?.to_string();
            fresh_ids.push(id.clone());
            (id, false)
        }
    };

    // Prefer a build file already compiled by the target phase, then one no
    // phase compiles yet. A file compiled by another phase gets no second
    // build file: that would put it in two sources phases.
    let (build_id, build_present) = {
        let candidates: Vec<&str> = index
            .build_files_for(&file_id)
            .map(|b| b.id.as_str())
            .collect();
        let in_target = candidates
            .iter()
            .find(|id| target_phase.is_some_and(|p| p.contains(id)));
        let unowned = candidates
            .iter()
            .find(|id| !index.sources_phases.iter().any(|p| p.contains(id)));
        match in_target.or(unowned) {
            Some(id) => (id.to_string(), true),
            None if !candidates.is_empty() => {
                return Err(OpsError::ambiguous(
                    &req.relative_path,
                    "already compiled by another sources phase; pick that phase's sibling",
                ));
            }
            None => {
                let id = ids.fresh()?.to_string();
                fresh_ids.push(id.clone());
                (id, false)
            }
        }
    };

    let group_present = target_group.is_some_and(|g| g.contains(&file_id));
    let phase_present = target_phase.is_some_and(|p| p.contains(&build_id));

    for id in &fresh_ids {
        if text.contains(id.as_str()) {
            return Err(OpsError::IdentifierCollision(id.clone()));
        }
    }

    let plan = [
        (
            Section::BuildFile,
            build_present,
            at.build_section,
            build_file_line(&build_id, &file_id, &filename),
        ),
        (
            Section::FileReference,
            ref_present,
            at.file_ref_section,
            file_ref_line(&file_id, &filename, &req.relative_path),
        ),
        (
            Section::Group,
            group_present,
            at.group_sibling,
            group_member_line(&file_id, &filename),
        ),
        (
            Section::SourcesBuildPhase,
            phase_present,
            at.sources_sibling,
            sources_member_line(&build_id, &filename),
        ),
    ];

    let mut steps = Vec::with_capacity(plan.len());
    let mut inserts: Vec<(usize, &str)> = Vec::new();
    for (section, present, line, new_line) in &plan {
        if *present {
            tracing::warn!(
                section = %section,
                file = %req.relative_path,
                "already present, skipping insertion"
            );
            steps.push(StepReport {
                section: *section,
                status: StepStatus::AlreadyPresent,
            });
        } else {
            steps.push(StepReport {
                section: *section,
                status: StepStatus::Inserted,
            });
            inserts.push((*line, new_line.as_str()));
        }
    }

    let eol = line_ending(text);
    let mut out = String::with_capacity(text.len() + inserts.len() * 128);
    for line in SectionScanner::new(text) {
        out.push_str(line.raw);
        for (_, new_line) in inserts.iter().filter(|(at, _)| *at == line.index) {
            if !line.has_terminator() {
                out.push_str(eol);
            }
            out.push_str(new_line);
            out.push_str(eol);
        }
    }

    if let Some(v) = introduced_violations(text, &out).into_iter().next() {
        return Err(OpsError::BrokenInvariant(v.to_string()));
    }

    tracing::debug!(
        file = %req.relative_path,
        file_id = %file_id,
        build_id = %build_id,
        inserted = inserts.len(),
        "add transform applied"
    );

    Ok((
        out,
        AddReport {
            relative_path: req.relative_path.clone(),
            filename,
            file_id,
            build_id,
            steps,
            inserted: inserts.len(),
        },
    ))
}

// ---------------------------------------------------------------------------
// Remove transform
// ---------------------------------------------------------------------------

fn check_fragment(fragment: &str, index: &ProjectIndex) -> Result<()> {
    if fragment.trim().is_empty() {
        return Err(OpsError::ambiguous(fragment, "empty fragment matches every line"));
    }
    if fragment.contains(['\r', '\n']) {
        return Err(OpsError::invalid_path(fragment, "line breaks are not allowed"));
    }
    if is_object_id(fragment) {
        return Ok(());
    }
    let matching: BTreeSet<&str> = index
        .file_refs
        .iter()
        .filter(|f| {
            f.name.as_deref().is_some_and(|n| n.contains(fragment))
                || f.path.as_deref().is_some_and(|p| p.contains(fragment))
        })
        .map(|f| f.id.as_str())
        .collect();
    if matching.len() > 1 {
        return Err(OpsError::ambiguous(
            fragment,
            format!(
                "matches {} file references; remove by identifier instead",
                matching.len()
            ),
        ));
    }
    Ok(())
}

/// Delete every line containing any of `fragments`. No structural fix-up.
pub fn apply_remove(text: &str, fragments: &[String]) -> Result<(String, RemoveReport)> {
    let index = ProjectIndex::build(text);
    for fragment in fragments {
        check_fragment(fragment, &index)?;
    }

    let mut counts = vec![0usize; fragments.len()];
    let mut deleted = 0;
    let mut out = String::with_capacity(text.len());
    for line in SectionScanner::new(text) {
        let body = line.text();
        let mut hit = false;
        for (count, fragment) in counts.iter_mut().zip(fragments) {
            if body.contains(fragment.as_str()) {
                *count += 1;
                hit = true;
            }
        }
        if hit {
            deleted += 1;
        } else {
            out.push_str(line.raw);
        }
    }

    let fragments: Vec<FragmentReport> = fragments
        .iter()
        .zip(counts)
        .map(|(fragment, deleted)| {
            if deleted == 0 {
                tracing::warn!(fragment = %fragment, "no line matched fragment");
            }
            FragmentReport {
                fragment: fragment.clone(),
                deleted,
            }
        })
        .collect();

    Ok((out, RemoveReport { fragments, deleted }))
}
