//! Single-pass line scanner that tags each line with the section it sits in.
//!
//! `PBXBuildFile`, `PBXFileReference` and `PBXGroup` are entered on their
//! `/* Begin … section */` marker and left after the matching `End` marker.
//! Sources build phases have no marker of their own at entry level: the
//! state is entered on the `isa = PBXSourcesBuildPhase;` line and left after
//! the phase's `runOnlyForDeploymentPostprocessing` line.

use serde::Serialize;

const SOURCES_PHASE_ISA: &str = "isa = PBXSourcesBuildPhase;";
const SOURCES_PHASE_END: &str = "runOnlyForDeploymentPostprocessing";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Section {
    #[serde(rename = "PBXBuildFile")]
    BuildFile,
    #[serde(rename = "PBXFileReference")]
    FileReference,
    #[serde(rename = "PBXGroup")]
    Group,
    #[serde(rename = "PBXSourcesBuildPhase")]
    SourcesBuildPhase,
    None,
}

impl Section {
    pub fn label(&self) -> &'static str {
        match self {
            Section::BuildFile => "PBXBuildFile",
            Section::FileReference => "PBXFileReference",
            Section::Group => "PBXGroup",
            Section::SourcesBuildPhase => "PBXSourcesBuildPhase",
            Section::None => "None",
        }
    }

    /// Section entered by a `/* Begin <name> section */` marker.
    fn from_begin_name(name: &str) -> Self {
        match name {
            "PBXBuildFile" => Section::BuildFile,
            "PBXFileReference" => Section::FileReference,
            "PBXGroup" => Section::Group,
            _ => Section::None,
        }
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Name inside a `/* Begin <name> section */` marker, if the line is one.
pub fn begin_marker(line: &str) -> Option<&str> {
    marker_name(line, "/* Begin ")
}

/// Name inside a `/* End <name> section */` marker, if the line is one.
pub fn end_marker(line: &str) -> Option<&str> {
    marker_name(line, "/* End ")
}

fn marker_name<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let start = line.find(prefix)? + prefix.len();
    let rest = &line[start..];
    let end = rest.find(" section */")?;
    Some(&rest[..end])
}

/// Strip one trailing `\n` or `\r\n`.
pub fn strip_eol(raw: &str) -> &str {
    match raw.strip_suffix('\n') {
        Some(s) => s.strip_suffix('\r').unwrap_or(s),
        None => raw,
    }
}

/// Terminator used by the first line of `text`; LF when there is none.
pub fn line_ending(text: &str) -> &'static str {
    match text.find('\n') {
        Some(i) if i > 0 && text.as_bytes()[i - 1] == b'\r' => "\r\n",
        _ => "\n",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScannedLine<'a> {
    /// Zero-based line number.
    pub index: usize,
    /// The line exactly as read, terminator included.
    pub raw: &'a str,
    pub section: Section,
}

impl<'a> ScannedLine<'a> {
    pub fn text(&self) -> &'a str {
        strip_eol(self.raw)
    }

    pub fn has_terminator(&self) -> bool {
        self.raw.ends_with('\n')
    }
}

pub struct SectionScanner<'a> {
    lines: std::str::SplitInclusive<'a, char>,
    index: usize,
    state: Section,
}

impl<'a> SectionScanner<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            lines: text.split_inclusive('\n'),
            index: 0,
            state: Section::None,
        }
    }

    /// Returns (tag for this line, state for the next line).
    fn transition(&self, line: &str) -> (Section, Section) {
        if let Some(name) = begin_marker(line) {
            let entered = Section::from_begin_name(name);
            return (entered, entered);
        }
        if end_marker(line).is_some() {
            return (self.state, Section::None);
        }
        if line.contains(SOURCES_PHASE_ISA) {
            return (Section::SourcesBuildPhase, Section::SourcesBuildPhase);
        }
        if self.state == Section::SourcesBuildPhase && line.contains(SOURCES_PHASE_END) {
            return (Section::SourcesBuildPhase, Section::None);
        }
        (self.state, self.state)
    }
}

impl<'a> Iterator for SectionScanner<'a> {
    type Item = ScannedLine<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let raw = self.lines.next()?;
        let (section, next) = self.transition(strip_eol(raw));
        self.state = next;
        let line = ScannedLine {
            index: self.index,
            raw,
            section,
        };
        self.index += 1;
        Some(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
/* Begin PBXBuildFile section */
\t\tB1 /* A.swift in Sources */ = {isa = PBXBuildFile; };
/* End PBXBuildFile section */
/* Begin PBXNativeTarget section */
\t\tT1 /* App */ = {
/* End PBXNativeTarget section */
/* Begin PBXSourcesBuildPhase section */
\t\tS1 /* Sources */ = {
\t\t\tisa = PBXSourcesBuildPhase;
\t\t\tfiles = (
\t\t\t\tB1 /* A.swift in Sources */,
\t\t\t);
\t\t\trunOnlyForDeploymentPostprocessing = 0;
\t\t};
/* End PBXSourcesBuildPhase section */
";

    fn tags(text: &str) -> Vec<Section> {
        SectionScanner::new(text).map(|l| l.section).collect()
    }

    #[test]
    fn markers_are_tagged_with_their_section() {
        let t = tags(SAMPLE);
        assert_eq!(t[0], Section::BuildFile);
        assert_eq!(t[1], Section::BuildFile);
        assert_eq!(t[2], Section::BuildFile);
        assert_eq!(t[3], Section::None);
    }

    #[test]
    fn untracked_sections_are_none() {
        let t = tags(SAMPLE);
        assert_eq!(&t[3..6], &[Section::None; 3]);
        // The PBXSourcesBuildPhase section marker itself is not entry-scoped.
        assert_eq!(t[6], Section::None);
        assert_eq!(t[7], Section::None);
    }

    #[test]
    fn sources_phase_is_entry_scoped() {
        let t = tags(SAMPLE);
        assert_eq!(&t[8..13], &[Section::SourcesBuildPhase; 5]);
        assert_eq!(t[13], Section::None);
        assert_eq!(t[14], Section::None);
    }

    #[test]
    fn scanner_preserves_every_byte() {
        let crlf = SAMPLE.replace('\n', "\r\n");
        for text in [SAMPLE, crlf.as_str(), "no trailing newline"] {
            let joined: String = SectionScanner::new(text).map(|l| l.raw).collect();
            assert_eq!(joined, text);
        }
    }

    #[test]
    fn text_strips_crlf() {
        let line = SectionScanner::new("abc\r\nnext").next().unwrap();
        assert_eq!(line.text(), "abc");
        assert!(line.has_terminator());
    }

    #[test]
    fn line_ending_detection() {
        assert_eq!(line_ending("a\r\nb\n"), "\r\n");
        assert_eq!(line_ending("a\nb\r\n"), "\n");
        assert_eq!(line_ending("single"), "\n");
    }

    #[test]
    fn frameworks_phase_does_not_leave_none() {
        let text = "\t\t\tisa = PBXFrameworksBuildPhase;\n\t\t\trunOnlyForDeploymentPostprocessing = 0;\n";
        assert_eq!(tags(text), vec![Section::None, Section::None]);
    }
}
