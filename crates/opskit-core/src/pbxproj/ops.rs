use super::ident::IdGen;
use super::mutator::{apply_add, apply_remove, AddFile, AddReport, RemoveReport};
use crate::error::Result;
use crate::io;
use serde::Serialize;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// PbxSession
// ---------------------------------------------------------------------------

/// One edit session over a project file: read once, transform in memory,
/// write once. Dropping a session without `commit` leaves the file untouched.
pub struct PbxSession {
    path: PathBuf,
    original: String,
    content: String,
    ids: IdGen,
}

impl PbxSession {
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with(path, None)
    }

    /// `seed` makes generated identifiers reproducible.
    pub fn open_with(path: &Path, seed: Option<u64>) -> Result<Self> {
        let original = io::read_existing(path)?;
        let ids = match seed {
            Some(s) => IdGen::seeded(&original, s),
            None => IdGen::new(&original),
        };
        Ok(Self {
            path: path.to_path_buf(),
            content: original.clone(),
            original,
            ids,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_modified(&self) -> bool {
        self.content != self.original
    }

    pub fn add(&mut self, req: &AddFile) -> Result<AddReport> {
        let (next, report) = apply_add(&self.content, req, &mut self.ids)?;
        self.content = next;
        Ok(report)
    }

    pub fn remove(&mut self, fragments: &[String]) -> Result<RemoveReport> {
        let (next, report) = apply_remove(&self.content, fragments)?;
        self.content = next;
        Ok(report)
    }

    /// Atomically replace the file when anything changed. Returns whether
    /// a write happened.
    pub fn commit(self) -> Result<bool> {
        if !self.is_modified() {
            tracing::debug!(path = %self.path.display(), "no changes, not writing");
            return Ok(false);
        }
        io::atomic_write(&self.path, self.content.as_bytes())?;
        tracing::info!(path = %self.path.display(), "project file updated");
        Ok(true)
    }
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct Applied<T> {
    pub project: PathBuf,
    pub written: bool,
    pub dry_run: bool,
    #[serde(flatten)]
    pub report: T,
}

/// Add a single Swift file to a group and a sources phase.
#[derive(Debug, Clone)]
pub struct AddFileOp {
    pub project: PathBuf,
    pub file: AddFile,
    pub seed: Option<u64>,
    pub dry_run: bool,
}

impl AddFileOp {
    pub fn new(project: impl Into<PathBuf>, file: AddFile) -> Self {
        Self {
            project: project.into(),
            file,
            seed: None,
            dry_run: false,
        }
    }

    pub fn run(&self) -> Result<Applied<AddReport>> {
        let mut session = PbxSession::open_with(&self.project, self.seed)?;
        let report = session.add(&self.file)?;
        let written = if self.dry_run {
            false
        } else {
            session.commit()?
        };
        Ok(Applied {
            project: self.project.clone(),
            written,
            dry_run: self.dry_run,
            report,
        })
    }
}

/// Delete every line containing any of the fragments.
#[derive(Debug, Clone)]
pub struct RemoveFileOp {
    pub project: PathBuf,
    pub fragments: Vec<String>,
    pub dry_run: bool,
}

impl RemoveFileOp {
    pub fn new(project: impl Into<PathBuf>, fragments: Vec<String>) -> Self {
        Self {
            project: project.into(),
            fragments,
            dry_run: false,
        }
    }

    pub fn run(&self) -> Result<Applied<RemoveReport>> {
        let mut session = PbxSession::open(&self.project)?;
        let report = session.remove(&self.fragments)?;
        let written = if self.dry_run {
            false
        } else {
            session.commit()?
        };
        Ok(Applied {
            project: self.project.clone(),
            written,
            dry_run: self.dry_run,
            report,
        })
    }
}
