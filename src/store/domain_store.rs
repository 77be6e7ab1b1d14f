//! Persistent per-domain records
//!
//! One `redb` table maps a domain to the JSON of its [`DomainRecord`]. A merge
//! reads and writes inside a single write transaction; `redb` allows one
//! writer at a time, so two merges for the same domain cannot lose updates.

use std::path::Path;
use std::sync::Arc;

use redb::backends::InMemoryBackend;
use redb::{Database, ReadableTable, TableDefinition, TableError};
use serde_json::{Map, Value};

use super::record::{DomainRecord, Entry};
use crate::error::HarvestResult;

const RECORDS: TableDefinition<&str, &str> = TableDefinition::new("domain_records");

/// What a merge changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Entries appended by this merge
    pub appended: usize,
    /// Entries in the record afterwards
    pub total: usize,
}

/// Handle to the record database; clones share the same database
#[derive(Clone)]
pub struct DomainStore {
    db: Arc<Database>,
}

impl std::fmt::Debug for DomainStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DomainStore").finish_non_exhaustive()
    }
}

impl DomainStore {
    /// Opens (or creates) the database file at `path`
    pub fn open(path: &Path) -> HarvestResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;
        tracing::debug!("Opened domain store at {}", path.display());
        Ok(Self { db: Arc::new(db) })
    }

    /// Volatile store, gone when the last clone is dropped
    pub fn in_memory() -> HarvestResult<Self> {
        let db = Database::builder().create_with_backend(InMemoryBackend::new())?;
        Ok(Self { db: Arc::new(db) })
    }

    /// Appends the entries whose keys the domain's record does not hold yet
    pub fn merge<I, E>(&self, domain: &str, incoming: I) -> HarvestResult<MergeOutcome>
    where
        I: IntoIterator<Item = E>,
        E: Into<Entry>,
    {
        let txn = self.db.begin_write()?;
        let outcome = {
            let mut table = txn.open_table(RECORDS)?;
            let mut record: DomainRecord = match table.get(domain)? {
                Some(stored) => serde_json::from_str(stored.value())?,
                None => DomainRecord::new(),
            };

            let appended = record.merge(incoming);
            let encoded = serde_json::to_string(&record)?;
            table.insert(domain, encoded.as_str())?;

            MergeOutcome {
                appended,
                total: record.len(),
            }
        };
        txn.commit()?;

        if outcome.appended > 0 {
            tracing::info!(
                "Recorded {} new key(s) for {} ({} total)",
                outcome.appended,
                domain,
                outcome.total
            );
        }
        Ok(outcome)
    }

    /// The domain's record, empty when none was stored
    pub fn read(&self, domain: &str) -> HarvestResult<DomainRecord> {
        let txn = self.db.begin_read()?;
        let table = match txn.open_table(RECORDS) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => return Ok(DomainRecord::new()),
            Err(e) => return Err(e.into()),
        };

        let record = match table.get(domain)? {
            Some(stored) => serde_json::from_str(stored.value())?,
            None => DomainRecord::new(),
        };
        Ok(record)
    }

    /// Removes the domain's record; `true` if there was one
    pub fn reset(&self, domain: &str) -> HarvestResult<bool> {
        let txn = self.db.begin_write()?;
        let removed = {
            let mut table = txn.open_table(RECORDS)?;
            let removed = table.remove(domain)?.is_some();
            removed
        };
        txn.commit()?;

        tracing::info!("Cleared i18n data for {}", domain);
        Ok(removed)
    }

    pub fn count(&self, domain: &str) -> HarvestResult<usize> {
        Ok(self.read(domain)?.len())
    }

    pub fn flatten(&self, domain: &str) -> HarvestResult<Map<String, Value>> {
        Ok(self.read(domain)?.flatten())
    }

    /// Pretty-printed flattened dictionary
    pub fn export_json(&self, domain: &str) -> HarvestResult<String> {
        Ok(self.read(domain)?.to_pretty_json()?)
    }

    /// Every domain holding a record, in key order
    pub fn domains(&self) -> HarvestResult<Vec<String>> {
        let txn = self.db.begin_read()?;
        let table = match txn.open_table(RECORDS) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut domains = Vec::new();
        for item in table.iter()? {
            let (domain, _) = item?;
            domains.push(domain.value().to_string());
        }
        Ok(domains)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harvest::Annotation;

    fn batch(pairs: &[(&str, &str)]) -> Vec<Annotation> {
        pairs.iter().map(|(k, v)| Annotation::new(*k, *v)).collect()
    }

    #[test]
    fn test_read_missing_domain_is_empty() {
        let store = DomainStore::in_memory().unwrap();
        assert!(store.read("acme.example.com").unwrap().is_empty());
        assert!(store.domains().unwrap().is_empty());
    }

    #[test]
    fn test_first_extraction_creates_record_even_when_empty() {
        let store = DomainStore::in_memory().unwrap();
        let outcome = store.merge("acme.example.com", Vec::<Entry>::new()).unwrap();
        assert_eq!(outcome, MergeOutcome { appended: 0, total: 0 });
        assert_eq!(store.domains().unwrap(), vec!["acme.example.com"]);
    }

    #[test]
    fn test_merge_twice_is_idempotent() {
        let store = DomainStore::in_memory().unwrap();
        let a = batch(&[("a.b", "Hello"), ("c", "World")]);

        assert_eq!(store.merge("d", a.clone()).unwrap().appended, 2);
        let after_first = store.read("d").unwrap();
        assert_eq!(store.merge("d", a).unwrap().appended, 0);
        assert_eq!(store.read("d").unwrap(), after_first);
    }

    #[test]
    fn test_domains_are_partitioned() {
        let store = DomainStore::in_memory().unwrap();
        store.merge("one.example.com", batch(&[("k", "1")])).unwrap();
        store.merge("two.example.com", batch(&[("k", "2")])).unwrap();

        assert_eq!(store.read("one.example.com").unwrap().get("k"), Some("1"));
        assert_eq!(store.read("two.example.com").unwrap().get("k"), Some("2"));

        assert!(store.reset("one.example.com").unwrap());
        assert!(!store.reset("one.example.com").unwrap());
        assert_eq!(store.count("one.example.com").unwrap(), 0);
        assert_eq!(store.count("two.example.com").unwrap(), 1);
    }

    #[test]
    fn test_export_json() {
        let store = DomainStore::in_memory().unwrap();
        store.merge("d", batch(&[("a", "1")])).unwrap();
        assert_eq!(store.export_json("d").unwrap(), "{\n  \"a\": \"1\"\n}");
        assert_eq!(store.export_json("other").unwrap(), "{}");
    }
}
