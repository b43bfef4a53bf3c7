//! Anchor-based edits of Xcode `project.pbxproj` files.
//!
//! The project file is treated as text. Edits insert or delete whole lines
//! next to literal anchors and leave every other byte as it was, which is
//! what Xcode needs to keep opening the project.

mod anchor;
mod ident;
mod index;
mod mutator;
mod ops;
mod scanner;
mod verify;

#[cfg(test)]
pub(crate) mod testdata;

pub use anchor::{Anchor, AnchorKind};
pub use ident::{existing_ids, is_hex_identifier, is_object_id, IdGen, Identifier, ID_LEN};
pub use index::{BuildFileEntry, FileRefEntry, GroupEntry, Member, ProjectIndex, SourcesPhaseEntry};
pub use mutator::{
    apply_add, apply_remove, build_file_line, file_ref_line, group_member_line,
    sources_member_line, validate_relative_path, AddFile, AddReport, FragmentReport,
    RemoveReport, StepReport, StepStatus,
};
pub use ops::{AddFileOp, Applied, PbxSession, RemoveFileOp};
pub use scanner::{line_ending, ScannedLine, Section, SectionScanner};
pub use verify::{introduced_violations, verify, Invariant, Violation};
