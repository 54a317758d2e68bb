//! Persisted record store.
//!
//! Append-only list of fetched pages plus the resume checkpoint: the next
//! resumption token to fetch and whether the harvest ran to completion.
//! Pages are never reordered or dropped; duplicate record ids across
//! pages (a resumed run refetching a token range) are resolved at
//! enumeration time, newest page wins.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::fetcher::Cursor;
use crate::record::{Page, RawRecord};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordStore {
    pages: Vec<Page>,
    /// Next cursor to fetch; `None` before the first page and after the last
    resumption_token: Option<String>,
    /// Whether the harvest reached the end of the list
    complete: bool,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load an existing store, or `None` when no file is present.
    pub fn load_if_exists(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read dump {}", path.display()))?;
        let store: Self = serde_json::from_str(&data)
            .with_context(|| format!("corrupt dump {}", path.display()))?;
        Ok(Some(store))
    }

    /// Persist atomically: write a sibling tmp file, then rename over.
    pub fn save(&self, path: &Path) -> Result<()> {
        let tmp = path.with_extension("tmp");
        {
            let mut file = fs::File::create(&tmp)
                .with_context(|| format!("failed to create {}", tmp.display()))?;
            serde_json::to_writer(&mut file, self).context("failed to serialize dump")?;
            file.flush().context("failed to flush dump")?;
        }
        fs::rename(&tmp, path)
            .with_context(|| format!("failed to move dump into place at {}", path.display()))?;
        Ok(())
    }

    pub fn append_page(&mut self, page: Page) {
        self.pages.push(page);
    }

    pub fn set_resumption_token(&mut self, token: Option<String>) {
        self.resumption_token = token;
    }

    pub fn mark_complete(&mut self) {
        self.complete = true;
        self.resumption_token = None;
    }

    pub fn mark_partial(&mut self) {
        self.complete = false;
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn resumption_token(&self) -> Option<&str> {
        self.resumption_token.as_deref()
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Where a resumed harvest should continue, `None` when already complete.
    pub fn resume_cursor(&self) -> Option<Cursor> {
        if self.complete {
            return None;
        }
        match &self.resumption_token {
            Some(token) => Some(Cursor::Token(token.clone())),
            None => Some(Cursor::Initial),
        }
    }

    /// Enumerate records with duplicate ids collapsed, newest page winning.
    /// Order is the first appearance of each id across the page sequence.
    pub fn merged_records(&self) -> Vec<&RawRecord> {
        let mut slots: Vec<&RawRecord> = Vec::new();
        let mut index: FxHashMap<&str, usize> = FxHashMap::default();
        for page in &self.pages {
            for record in &page.records {
                match index.get(record.id.as_str()) {
                    Some(&slot) => slots[slot] = record,
                    None => {
                        index.insert(&record.id, slots.len());
                        slots.push(record);
                    }
                }
            }
        }
        slots
    }

    /// Distinct record count after merge.
    pub fn record_count(&self) -> usize {
        self.merged_records().len()
    }
}
