//! Storage boundary
//!
//! The core never performs I/O itself. It fetches tables and publishes the
//! trained artifact through [`FundamentalsStore`].

use super::ingest::{read_table_csv_path, write_table_csv};
use super::types::{CompanyKey, QuarterlyTable};
use crate::error::{Error, Result};
use crate::pipeline::TrainingArtifact;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// Operations the reconstruction core needs from the storage collaborator
pub trait FundamentalsStore {
    /// Returns the quarterly table of one company
    fn fetch_company_table(&self, key: &CompanyKey) -> Result<QuarterlyTable>;

    /// Hands a trained artifact back to the caller's storage
    fn publish_artifact(&mut self, artifact: &TrainingArtifact) -> Result<()>;
}

/// Tables kept in memory as country -> exchange -> company
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: BTreeMap<String, BTreeMap<String, BTreeMap<String, QuarterlyTable>>>,
    published: Vec<TrainingArtifact>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a table under its own key, replacing any previous one
    pub fn store(&mut self, table: QuarterlyTable) {
        let key = table.key.clone();
        tracing::debug!(company = %key, rows = table.len(), "Storing table");
        self.tables
            .entry(key.country)
            .or_default()
            .entry(key.exchange)
            .or_default()
            .insert(key.company, table);
    }

    pub fn get(&self, key: &CompanyKey) -> Option<&QuarterlyTable> {
        let table = self
            .tables
            .get(&key.country)
            .and_then(|exchanges| exchanges.get(&key.exchange))
            .and_then(|companies| companies.get(&key.company));
        if table.is_none() {
            tracing::debug!(company = %key, "Table not found");
        }
        table
    }

    /// Keys of all stored tables in country, exchange, company order
    pub fn keys(&self) -> Vec<CompanyKey> {
        self.tables
            .iter()
            .flat_map(|(country, exchanges)| {
                exchanges.iter().flat_map(move |(exchange, companies)| {
                    companies
                        .keys()
                        .map(move |company| CompanyKey::new(country, exchange, company))
                })
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tables
            .values()
            .flat_map(|e| e.values())
            .map(|c| c.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Artifacts received through [`FundamentalsStore::publish_artifact`]
    pub fn published(&self) -> &[TrainingArtifact] {
        &self.published
    }
}

impl FundamentalsStore for InMemoryStore {
    fn fetch_company_table(&self, key: &CompanyKey) -> Result<QuarterlyTable> {
        self.get(key)
            .cloned()
            .ok_or_else(|| Error::DataSource(format!("no table for {}", key)))
    }

    fn publish_artifact(&mut self, artifact: &TrainingArtifact) -> Result<()> {
        self.published.push(artifact.clone());
        Ok(())
    }
}

/// CSV tables on the local filesystem.
///
/// Layout: `<root>/<country>/<exchange>/<company>.csv`, artifacts go to
/// `<root>/artifacts/<name>.json`.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

const ARTIFACT_DIR: &str = "artifacts";

impl DirectoryStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn table_path(&self, key: &CompanyKey) -> PathBuf {
        self.root
            .join(&key.country)
            .join(&key.exchange)
            .join(format!("{}.csv", key.company))
    }

    /// Writes a table into the directory tree
    pub fn put(&self, table: &QuarterlyTable) -> Result<()> {
        let path = self.table_path(&table.key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        write_table_csv(table, File::create(path)?)
    }

    /// Walks the tree and returns every company table found
    pub fn list_companies(&self) -> Result<Vec<CompanyKey>> {
        let mut keys = Vec::new();
        for country in sorted_entries(&self.root)? {
            if !country.is_dir() || file_name(&country) == ARTIFACT_DIR {
                continue;
            }
            for exchange in sorted_entries(&country)? {
                if !exchange.is_dir() {
                    continue;
                }
                for table in sorted_entries(&exchange)? {
                    if table.extension().and_then(|e| e.to_str()) != Some("csv") {
                        continue;
                    }
                    let company = table
                        .file_stem()
                        .and_then(|s| s.to_str())
                        .unwrap_or_default();
                    keys.push(CompanyKey::new(
                        file_name(&country),
                        file_name(&exchange),
                        company,
                    ));
                }
            }
        }
        Ok(keys)
    }
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(dir)?
        .map(|e| e.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort();
    Ok(entries)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string()
}

impl FundamentalsStore for DirectoryStore {
    fn fetch_company_table(&self, key: &CompanyKey) -> Result<QuarterlyTable> {
        let path = self.table_path(key);
        if !path.exists() {
            return Err(Error::DataSource(format!(
                "no table for {} at {}",
                key,
                path.display()
            )));
        }
        read_table_csv_path(key.clone(), path)
    }

    fn publish_artifact(&mut self, artifact: &TrainingArtifact) -> Result<()> {
        let dir = self.root.join(ARTIFACT_DIR);
        fs::create_dir_all(&dir)?;
        let path = dir.join(format!("{}.json", artifact.name));
        serde_json::to_writer_pretty(File::create(&path)?, artifact)?;
        tracing::info!(path = %path.display(), "Published artifact");
        Ok(())
    }
}
