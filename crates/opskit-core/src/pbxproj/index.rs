//! Read-only view over the objects the mutator cares about.
//!
//! This is not a pbxproj parser. It recognises the single-line entry shapes
//! Xcode writes for build files and file references, plus member lines of
//! `children = ( … )` and `files = ( … )` lists, and records where they are.

use super::ident::ID_LEN;
use super::scanner::{ScannedLine, Section, SectionScanner};

/// `<ID> /* <comment> */ <rest>` at the start of a (trimmed) line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryHead<'a> {
    pub id: &'a str,
    pub comment: Option<&'a str>,
    pub rest: &'a str,
}

impl<'a> EntryHead<'a> {
    pub fn parse(line: &'a str) -> Option<Self> {
        let t = line.trim_start();
        let id_len = t
            .find(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(t.len());
        if id_len != ID_LEN {
            return None;
        }
        let id = &t[..ID_LEN];
        let after = t[ID_LEN..].trim_start();
        let (comment, rest) = match after.strip_prefix("/* ") {
            Some(c) => {
                let end = c.find(" */")?;
                (Some(&c[..end]), c[end + 3..].trim_start())
            }
            None => (None, after),
        };
        Some(Self { id, comment, rest })
    }

    /// `<ID> /* … */ = {` opens an object definition.
    pub fn is_definition(&self) -> bool {
        self.rest.starts_with("= {")
    }

    /// `<ID> /* … */,` is a member of a list.
    pub fn is_member(&self) -> bool {
        self.rest.starts_with(',')
    }
}

/// Value of `key = value;` inside an entry line. Quoted values are unquoted.
pub fn field<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let pat = format!("{key} = ");
    let mut from = 0;
    // The key must start a token so `path` never matches `xpath`.
    let start = loop {
        let pos = from + line[from..].find(&pat)?;
        let at_boundary = line[..pos]
            .chars()
            .next_back()
            .map_or(true, |c| matches!(c, ' ' | '\t' | '{' | ';'));
        if at_boundary {
            break pos + pat.len();
        }
        from = pos + 1;
    };
    let value = &line[start..];
    if let Some(q) = value.strip_prefix('"') {
        let end = q.find('"')?;
        Some(&q[..end])
    } else {
        let end = value.find([';', ' '])?;
        Some(&value[..end])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRefEntry {
    pub id: String,
    pub name: Option<String>,
    pub path: Option<String>,
    pub line: usize,
}

impl FileRefEntry {
    /// Display name: the comment, falling back to the last path segment.
    pub fn display_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .or_else(|| self.path.as_deref().and_then(|p| p.rsplit('/').next()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildFileEntry {
    pub id: String,
    pub name: Option<String>,
    pub file_ref: Option<String>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub id: String,
    pub name: Option<String>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupEntry {
    pub id: String,
    pub name: Option<String>,
    pub line: usize,
    pub children: Vec<Member>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcesPhaseEntry {
    pub id: Option<String>,
    pub line: usize,
    pub files: Vec<Member>,
}

impl SourcesPhaseEntry {
    pub fn contains(&self, id: &str) -> bool {
        self.files.iter().any(|m| m.id == id)
    }
}

impl GroupEntry {
    pub fn contains(&self, id: &str) -> bool {
        self.children.iter().any(|m| m.id == id)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProjectIndex {
    pub file_refs: Vec<FileRefEntry>,
    pub build_files: Vec<BuildFileEntry>,
    pub groups: Vec<GroupEntry>,
    pub sources_phases: Vec<SourcesPhaseEntry>,
    /// Every `<ID> … = {` definition in the file, any section.
    pub definitions: Vec<(String, usize)>,
}

impl ProjectIndex {
    pub fn build(text: &str) -> Self {
        let mut index = Self::default();
        let mut last_definition: Option<String> = None;
        let mut in_list = false;
        let mut prev_section = Section::None;

        for line in SectionScanner::new(text) {
            let text = line.text();
            let head = EntryHead::parse(text);

            if let Some(h) = head.filter(|h| h.is_definition()) {
                index.definitions.push((h.id.to_string(), line.index));
            }

            match line.section {
                Section::BuildFile => index.record_build_file(&line, head),
                Section::FileReference => index.record_file_ref(&line, head),
                Section::Group => index.record_group_line(&line, head, &mut in_list),
                Section::SourcesBuildPhase => {
                    if prev_section != Section::SourcesBuildPhase {
                        index.sources_phases.push(SourcesPhaseEntry {
                            id: last_definition.clone(),
                            line: line.index,
                            files: Vec::new(),
                        });
                        in_list = false;
                    }
                    index.record_phase_line(&line, head, &mut in_list);
                }
                Section::None => {}
            }

            if let Some(h) = head.filter(|h| h.is_definition()) {
                last_definition = Some(h.id.to_string());
            }
            prev_section = line.section;
        }
        index
    }

    fn record_build_file(&mut self, line: &ScannedLine<'_>, head: Option<EntryHead<'_>>) {
        let Some(h) = head.filter(|h| h.is_definition()) else {
            return;
        };
        self.build_files.push(BuildFileEntry {
            id: h.id.to_string(),
            name: h.comment.map(str::to_string),
            file_ref: field(line.text(), "fileRef").map(str::to_string),
            line: line.index,
        });
    }

    fn record_file_ref(&mut self, line: &ScannedLine<'_>, head: Option<EntryHead<'_>>) {
        let Some(h) = head.filter(|h| h.is_definition()) else {
            return;
        };
        self.file_refs.push(FileRefEntry {
            id: h.id.to_string(),
            name: h.comment.map(str::to_string),
            path: field(line.text(), "path").map(str::to_string),
            line: line.index,
        });
    }

    fn record_group_line(
        &mut self,
        line: &ScannedLine<'_>,
        head: Option<EntryHead<'_>>,
        in_list: &mut bool,
    ) {
        let trimmed = line.text().trim();
        if let Some(h) = head.filter(|h| h.is_definition()) {
            self.groups.push(GroupEntry {
                id: h.id.to_string(),
                name: h.comment.map(str::to_string),
                line: line.index,
                children: Vec::new(),
            });
            *in_list = false;
            return;
        }
        if trimmed.starts_with("children = (") {
            *in_list = true;
            return;
        }
        if trimmed == ");" {
            *in_list = false;
            return;
        }
        if !*in_list {
            return;
        }
        if let (Some(h), Some(group)) = (head.filter(|h| h.is_member()), self.groups.last_mut()) {
            group.children.push(Member {
                id: h.id.to_string(),
                name: h.comment.map(str::to_string),
                line: line.index,
            });
        }
    }

    fn record_phase_line(
        &mut self,
        line: &ScannedLine<'_>,
        head: Option<EntryHead<'_>>,
        in_list: &mut bool,
    ) {
        let trimmed = line.text().trim();
        if trimmed.starts_with("files = (") {
            *in_list = true;
            return;
        }
        if trimmed == ");" {
            *in_list = false;
            return;
        }
        if !*in_list {
            return;
        }
        if let (Some(h), Some(phase)) = (
            head.filter(|h| h.is_member()),
            self.sources_phases.last_mut(),
        ) {
            phase.files.push(Member {
                id: h.id.to_string(),
                name: h.comment.map(str::to_string),
                line: line.index,
            });
        }
    }

    pub fn file_ref(&self, id: &str) -> Option<&FileRefEntry> {
        self.file_refs.iter().find(|f| f.id == id)
    }

    pub fn build_files_for<'a>(&'a self, file_id: &'a str) -> impl Iterator<Item = &'a BuildFileEntry> {
        self.build_files
            .iter()
            .filter(move |b| b.file_ref.as_deref() == Some(file_id))
    }

    /// Group whose children list holds the member on `line`.
    pub fn group_at_line(&self, line: usize) -> Option<&GroupEntry> {
        self.groups
            .iter()
            .find(|g| g.children.iter().any(|m| m.line == line))
    }

    /// Sources phase whose files list holds the member on `line`.
    pub fn phase_at_line(&self, line: usize) -> Option<&SourcesPhaseEntry> {
        self.sources_phases
            .iter()
            .find(|p| p.files.iter().any(|m| m.line == line))
    }

    pub fn is_defined(&self, id: &str) -> bool {
        self.definitions.iter().any(|(d, _)| d == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &str = "\
/* Begin PBXBuildFile section */
\t\tAUTHMGR0000000000000000B /* AuthManager.swift in Sources */ = {isa = PBXBuildFile; fileRef = AUTHMGR0000000000000000A /* AuthManager.swift */; };
/* End PBXBuildFile section */

/* Begin PBXFileReference section */
\t\tAUTHMGR0000000000000000A /* AuthManager.swift */ = {isa = PBXFileReference; lastKnownFileType = sourcecode.swift; path = AuthManager.swift; sourceTree = \"<group>\"; };
\t\tVIEW00000000000000000001 /* Login View.swift */ = {isa = PBXFileReference; lastKnownFileType = sourcecode.swift; path = \"Views/Login View.swift\"; sourceTree = \"<group>\"; };
/* End PBXFileReference section */

/* Begin PBXGroup section */
\t\tGROUPAUTH000000000000001 /* Auth */ = {
\t\t\tisa = PBXGroup;
\t\t\tchildren = (
\t\t\t\tAUTHMGR0000000000000000A /* AuthManager.swift */,
\t\t\t);
\t\t\tpath = Auth;
\t\t\tsourceTree = \"<group>\";
\t\t};
/* End PBXGroup section */

/* Begin PBXSourcesBuildPhase section */
\t\tPHASE0000000000000000001 /* Sources */ = {
\t\t\tisa = PBXSourcesBuildPhase;
\t\t\tbuildActionMask = 2147483647;
\t\t\tfiles = (
\t\t\t\tAUTHMGR0000000000000000B /* AuthManager.swift in Sources */,
\t\t\t);
\t\t\trunOnlyForDeploymentPostprocessing = 0;
\t\t};
/* End PBXSourcesBuildPhase section */
";

    #[test]
    fn entry_head_parses_id_and_comment() {
        let h = EntryHead::parse("\t\t\t\tAUTHMGR0000000000000000A /* AuthManager.swift */,").unwrap();
        assert_eq!(h.id, "AUTHMGR0000000000000000A");
        assert_eq!(h.comment, Some("AuthManager.swift"));
        assert!(h.is_member());
        assert!(EntryHead::parse("\t\t\tisa = PBXGroup;").is_none());
    }

    #[test]
    fn field_handles_quoted_and_bare_values() {
        let line = "X = {isa = PBXFileReference; path = \"Core/A B.swift\"; sourceTree = \"<group>\"; };";
        assert_eq!(field(line, "path"), Some("Core/A B.swift"));
        assert_eq!(field(line, "isa"), Some("PBXFileReference"));
        assert_eq!(field(line, "sourceTree"), Some("<group>"));
        assert_eq!(field(line, "name"), None);
        assert_eq!(field("{ xpath = Z; path = Y; }", "path"), Some("Y"));
    }

    #[test]
    fn index_collects_all_four_kinds() {
        let idx = ProjectIndex::build(TEXT);
        assert_eq!(idx.build_files.len(), 1);
        assert_eq!(
            idx.build_files[0].file_ref.as_deref(),
            Some("AUTHMGR0000000000000000A")
        );
        assert_eq!(idx.file_refs.len(), 2);
        assert_eq!(idx.file_refs[1].path.as_deref(), Some("Views/Login View.swift"));
        assert_eq!(idx.groups.len(), 1);
        assert_eq!(idx.groups[0].name.as_deref(), Some("Auth"));
        assert!(idx.groups[0].contains("AUTHMGR0000000000000000A"));
        assert_eq!(idx.sources_phases.len(), 1);
        assert_eq!(
            idx.sources_phases[0].id.as_deref(),
            Some("PHASE0000000000000000001")
        );
        assert!(idx.sources_phases[0].contains("AUTHMGR0000000000000000B"));
    }

    #[test]
    fn member_lines_map_back_to_owners() {
        let idx = ProjectIndex::build(TEXT);
        let member_line = idx.groups[0].children[0].line;
        assert_eq!(idx.group_at_line(member_line).unwrap().id, "GROUPAUTH000000000000001");
        let phase_line = idx.sources_phases[0].files[0].line;
        assert!(idx.phase_at_line(phase_line).is_some());
        assert!(idx.group_at_line(0).is_none());
    }

    #[test]
    fn definitions_cover_every_section() {
        let idx = ProjectIndex::build(TEXT);
        for id in [
            "AUTHMGR0000000000000000A",
            "AUTHMGR0000000000000000B",
            "GROUPAUTH000000000000001",
            "PHASE0000000000000000001",
        ] {
            assert!(idx.is_defined(id), "{id} should be defined");
        }
    }

    #[test]
    fn display_name_falls_back_to_path() {
        let entry = FileRefEntry {
            id: "X".into(),
            name: None,
            path: Some("Core/Util.swift".into()),
            line: 0,
        };
        assert_eq!(entry.display_name(), Some("Util.swift"));
    }
}
