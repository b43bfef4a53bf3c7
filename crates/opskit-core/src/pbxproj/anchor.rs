use super::scanner::{ScannedLine, Section};
use serde::Serialize;

const LIST_MEMBER_INDENT: &str = "\t\t\t\t";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AnchorKind {
    BuildFileSectionStart,
    FileRefSectionStart,
    GroupSiblingEntry,
    SourcesSiblingEntry,
}

impl std::fmt::Display for AnchorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AnchorKind::BuildFileSectionStart => "buildFileSectionStart",
            AnchorKind::FileRefSectionStart => "fileRefSectionStart",
            AnchorKind::GroupSiblingEntry => "groupSiblingEntry",
            AnchorKind::SourcesSiblingEntry => "sourcesSiblingEntry",
        };
        f.write_str(s)
    }
}

/// A literal, section-scoped line predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub kind: AnchorKind,
    section: Section,
    needle: String,
}

impl Anchor {
    pub fn build_file_section_start() -> Self {
        Self {
            kind: AnchorKind::BuildFileSectionStart,
            section: Section::BuildFile,
            needle: "/* Begin PBXBuildFile section */".to_string(),
        }
    }

    pub fn file_ref_section_start() -> Self {
        Self {
            kind: AnchorKind::FileRefSectionStart,
            section: Section::FileReference,
            needle: "/* Begin PBXFileReference section */".to_string(),
        }
    }

    pub fn group_sibling_entry(name: &str) -> Self {
        Self {
            kind: AnchorKind::GroupSiblingEntry,
            section: Section::Group,
            needle: format!("/* {name} */,"),
        }
    }

    pub fn sources_sibling_entry(name: &str) -> Self {
        Self {
            kind: AnchorKind::SourcesSiblingEntry,
            section: Section::SourcesBuildPhase,
            needle: format!("/* {name} in Sources */,"),
        }
    }

    pub fn matches(&self, line: &ScannedLine<'_>) -> bool {
        if line.section != self.section {
            return false;
        }
        let text = line.text();
        if !text.contains(&self.needle) {
            return false;
        }
        match self.kind {
            AnchorKind::GroupSiblingEntry | AnchorKind::SourcesSiblingEntry => {
                is_list_member_line(text)
            }
            _ => true,
        }
    }

    /// First matching line, in file order.
    pub fn find_first<'a, I>(&self, lines: I) -> Option<ScannedLine<'a>>
    where
        I: IntoIterator<Item = ScannedLine<'a>>,
    {
        lines.into_iter().find(|l| self.matches(l))
    }
}

/// List members are written at four tabs. Any other non-empty indentation
/// is tolerated; an unindented line never counts as a member.
fn is_list_member_line(text: &str) -> bool {
    let body = text.trim_start_matches([' ', '\t']);
    let indent = &text[..text.len() - body.len()];
    if indent.is_empty() {
        return false;
    }
    if indent != LIST_MEMBER_INDENT {
        tracing::debug!(indent = ?indent, "non-standard list member indentation at anchor");
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pbxproj::scanner::SectionScanner;

    const TEXT: &str = "\
/* Begin PBXFileReference section */
\t\tF1 /* AuthManager.swift */ = {isa = PBXFileReference; };
/* End PBXFileReference section */
/* Begin PBXGroup section */
\t\tG1 /* Auth */ = {
\t\t\tchildren = (
\t\t\t\tF1 /* AuthManager.swift */,
\t\t\t);
\t\t};
/* End PBXGroup section */
";

    #[test]
    fn section_start_matches_marker_line() {
        let hit = Anchor::file_ref_section_start()
            .find_first(SectionScanner::new(TEXT))
            .unwrap();
        assert_eq!(hit.index, 0);
    }

    #[test]
    fn group_sibling_requires_group_section_and_member_shape() {
        let hit = Anchor::group_sibling_entry("AuthManager.swift")
            .find_first(SectionScanner::new(TEXT))
            .unwrap();
        assert_eq!(hit.index, 6);
    }

    #[test]
    fn sibling_name_must_match_whole_comment() {
        assert!(Anchor::group_sibling_entry("Manager.swift")
            .find_first(SectionScanner::new(TEXT))
            .is_none());
    }

    #[test]
    fn space_indentation_is_tolerated() {
        let text = TEXT.replace("\t\t\t\tF1", "        F1");
        assert!(Anchor::group_sibling_entry("AuthManager.swift")
            .find_first(SectionScanner::new(&text))
            .is_some());
    }

    #[test]
    fn missing_sources_sibling_is_none() {
        assert!(Anchor::sources_sibling_entry("AuthManager.swift")
            .find_first(SectionScanner::new(TEXT))
            .is_none());
    }

    #[test]
    fn kind_display_is_camel_case() {
        assert_eq!(
            AnchorKind::SourcesSiblingEntry.to_string(),
            "sourcesSiblingEntry"
        );
    }
}
