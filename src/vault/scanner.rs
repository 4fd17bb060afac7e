//! Vault scanning
//!
//! Walks a vault root for markdown notes, parses each into a [`Note`] and
//! keeps the result for a freshness window so repeated encounters don't
//! re-read the disk.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use super::frontmatter::{collect_tags, resolve_title};
use super::note::Note;
use crate::core::config::VaultConfig;
use crate::core::error::{Result, VaultError};

/// Folders under the home directory probed by [`VaultScanner::discover`]
const DISCOVERY_CANDIDATES: &[&str] = &[
    "Library/Mobile Documents/iCloud~md~obsidian/Documents",
    "Documents/Obsidian",
    "Documents/Obsidian Vault",
    "Obsidian",
    "Documents/Notes",
    "Notes",
    "vault",
    "Documents",
];

/// Minimum markdown files for a plain folder to count as a vault
const MIN_DISCOVERED_NOTES: usize = 3;

pub struct VaultScanner {
    root: Option<PathBuf>,
    extensions: Vec<String>,
    skip_patterns: Vec<String>,
    freshness: Duration,
    notes: Vec<Note>,
    last_scan: Option<Instant>,
}

impl VaultScanner {
    pub fn new(config: &VaultConfig) -> Self {
        Self {
            root: config.root.clone(),
            extensions: config
                .extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .collect(),
            skip_patterns: config
                .skip_patterns
                .iter()
                .map(|p| p.to_lowercase())
                .collect(),
            freshness: Duration::from_secs(config.freshness_secs),
            notes: Vec::new(),
            last_scan: None,
        }
    }

    /// Scanner with default settings rooted at `root`
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        let config = VaultConfig {
            root: Some(root.into()),
            ..VaultConfig::default()
        };
        Self::new(&config)
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Point the scanner at a new root. Returns false if the path does not exist.
    pub fn set_root(&mut self, path: impl Into<PathBuf>) -> bool {
        let path = path.into();
        if !path.is_dir() {
            warn!("Vault path does not exist: {}", path.display());
            return false;
        }
        info!("Vault root set to {}", path.display());
        self.root = Some(path);
        self.invalidate();
        true
    }

    /// Drop the cached scan so the next call re-reads the disk
    pub fn invalidate(&mut self) {
        self.notes.clear();
        self.last_scan = None;
    }

    pub fn is_fresh(&self) -> bool {
        self.last_scan
            .map(|at| at.elapsed() < self.freshness)
            .unwrap_or(false)
    }

    /// Notes from the last scan, rescanning when stale or forced
    pub fn scan(&mut self, force: bool) -> &[Note] {
        if !force && self.is_fresh() {
            return &self.notes;
        }

        self.notes = match &self.root {
            Some(root) if root.is_dir() => self.scan_root(root),
            Some(root) => {
                warn!("Vault root missing: {}", root.display());
                Vec::new()
            }
            None => {
                warn!("No vault root configured");
                Vec::new()
            }
        };
        self.last_scan = Some(Instant::now());
        info!("Scanned {} notes", self.notes.len());
        &self.notes
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    fn scan_root(&self, root: &Path) -> Vec<Note> {
        let mut notes = Vec::new();

        let walker = WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    debug!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_file() || !self.is_candidate(entry.path()) {
                continue;
            }

            match parse_note_file(entry.path()) {
                Ok(Some(note)) => notes.push(note),
                Ok(None) => debug!("Skipping empty note {}", entry.path().display()),
                Err(e) => debug!("{}", e),
            }
        }

        notes.sort_by(|a, b| a.path.cmp(&b.path));
        notes
    }

    fn is_candidate(&self, path: &Path) -> bool {
        let has_ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| self.extensions.contains(&e.to_lowercase()))
            .unwrap_or(false);
        if !has_ext {
            return false;
        }

        let lowered = path.to_string_lossy().to_lowercase();
        !self.skip_patterns.iter().any(|p| lowered.contains(p.as_str()))
    }

    /// Look for a vault in common places under the home directory
    pub fn discover() -> Option<PathBuf> {
        let home = dirs::home_dir()?;
        discover_in(&home)
    }
}

/// Discovery rooted at an arbitrary directory.
///
/// A folder holding `.obsidian` wins; otherwise the first candidate with
/// enough markdown files.
pub fn discover_in(home: &Path) -> Option<PathBuf> {
    let candidates: Vec<PathBuf> = DISCOVERY_CANDIDATES
        .iter()
        .map(|c| home.join(c))
        .filter(|p| p.is_dir())
        .collect();

    for candidate in &candidates {
        if let Some(found) = find_obsidian_dir(candidate) {
            info!("Discovered Obsidian vault at {}", found.display());
            return Some(found);
        }
    }

    candidates
        .into_iter()
        .find(|c| count_markdown(c) >= MIN_DISCOVERED_NOTES)
        .inspect(|found| info!("Using markdown folder {}", found.display()))
}

fn find_obsidian_dir(base: &Path) -> Option<PathBuf> {
    WalkDir::new(base)
        .max_depth(2)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .find(|e| e.file_type().is_dir() && e.file_name() == ".obsidian")
        .and_then(|e| e.path().parent().map(Path::to_path_buf))
}

fn count_markdown(base: &Path) -> usize {
    WalkDir::new(base)
        .max_depth(3)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.file_type().is_file() && e.path().extension().and_then(|x| x.to_str()) == Some("md")
        })
        .take(MIN_DISCOVERED_NOTES)
        .count()
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .map(|s| s.starts_with('.'))
            .unwrap_or(false)
}

/// Parse one file. `Ok(None)` for files with no content.
pub fn parse_note_file(path: &Path) -> Result<Option<Note>> {
    let scan_err = |source| VaultError::Scan {
        path: path.to_path_buf(),
        source,
    };

    let content = fs::read_to_string(path).map_err(scan_err)?;
    if content.trim().is_empty() {
        return Ok(None);
    }

    let meta = fs::metadata(path).map_err(scan_err)?;
    let modified: DateTime<Local> = meta.modified().map_err(scan_err)?.into();
    // Not every platform records a birth time
    let created: DateTime<Local> = meta.created().map(Into::into).unwrap_or(modified);

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(Some(Note {
        path: path.to_path_buf(),
        title: resolve_title(&content, &stem),
        tags: collect_tags(&content),
        content,
        created,
        modified,
    }))
}
