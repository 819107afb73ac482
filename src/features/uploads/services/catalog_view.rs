//! In-memory catalog and the views derived from it.
//!
//! `Catalog` is an immutable list of records with pure, synchronous
//! derivations (search, user filter, unique users, statistics).
//! `CatalogState` owns the current catalog and replaces it wholesale on every
//! refresh. Each refresh takes a monotonic token and its result is applied
//! only when no newer refresh has already been applied.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{Local, NaiveDate, TimeZone};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::features::uploads::models::{CatalogSort, UploadRecord};
use crate::features::uploads::services::CatalogRepository;
use crate::modules::StoreResult;

/// Search and user filter; empty strings match everything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogFilter {
    pub search: String,
    pub user: String,
}

/// Dashboard figures over the unfiltered catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogStats {
    pub total_files: usize,
    pub total_size_bytes: u64,
    pub unique_user_count: usize,
    pub today_upload_count: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: Vec<UploadRecord>,
}

impl Catalog {
    pub fn new(records: Vec<UploadRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[UploadRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn find(&self, id: Uuid) -> Option<&UploadRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Records whose file name or user name contains `term`, ignoring case
    pub fn search(&self, term: &str) -> Vec<&UploadRecord> {
        let term = term.to_lowercase();
        self.records
            .iter()
            .filter(|r| matches_search(r, &term))
            .collect()
    }

    /// Records whose user name contains `name`, ignoring case
    pub fn filter_by_user(&self, name: &str) -> Vec<&UploadRecord> {
        let name = name.to_lowercase();
        self.records
            .iter()
            .filter(|r| matches_user(r, &name))
            .collect()
    }

    /// Search and user filter combined with AND, in catalog order
    pub fn query(&self, filter: &CatalogFilter) -> Vec<&UploadRecord> {
        let by_user: HashSet<Uuid> = self
            .filter_by_user(&filter.user)
            .into_iter()
            .map(|r| r.id)
            .collect();
        self.search(&filter.search)
            .into_iter()
            .filter(|r| by_user.contains(&r.id))
            .collect()
    }

    /// Distinct user names in first-seen order
    pub fn unique_users(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .filter(|r| seen.insert(r.user_name.as_str()))
            .map(|r| r.user_name.clone())
            .collect()
    }

    /// Statistics with "today" taken from the local calendar
    pub fn stats(&self) -> CatalogStats {
        self.stats_on(Local::now().date_naive(), &Local)
    }

    /// Statistics with uploads counted as "today" when their timestamp falls
    /// on `today` in `tz`
    pub fn stats_on<Tz: TimeZone>(&self, today: NaiveDate, tz: &Tz) -> CatalogStats {
        CatalogStats {
            total_files: self.records.len(),
            total_size_bytes: self
                .records
                .iter()
                .map(|r| u64::try_from(r.file_size).unwrap_or(0))
                .sum(),
            unique_user_count: self
                .records
                .iter()
                .map(|r| r.user_name.as_str())
                .collect::<HashSet<_>>()
                .len(),
            today_upload_count: self
                .records
                .iter()
                .filter(|r| r.uploaded_at.with_timezone(tz).date_naive() == today)
                .count(),
        }
    }
}

fn matches_search(record: &UploadRecord, term_lower: &str) -> bool {
    term_lower.is_empty()
        || record.file_name.to_lowercase().contains(term_lower)
        || record.user_name.to_lowercase().contains(term_lower)
}

fn matches_user(record: &UploadRecord, name_lower: &str) -> bool {
    name_lower.is_empty() || record.user_name.to_lowercase().contains(name_lower)
}

/// Result of applying a finished refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Applied,
    /// A newer refresh had already been applied; this result was dropped
    Superseded,
}

/// A finished refresh: the list it fetched and whether it became current
#[derive(Debug, Clone)]
pub struct Refreshed {
    pub catalog: Arc<Catalog>,
    pub outcome: RefreshOutcome,
}

#[derive(Debug, Default)]
struct Current {
    catalog: Arc<Catalog>,
    token: u64,
    sort: CatalogSort,
    loaded: bool,
}

/// The catalog currently known to the service
#[derive(Debug, Default)]
pub struct CatalogState {
    current: RwLock<Current>,
    issued: AtomicU64,
}

impl CatalogState {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> Arc<Catalog> {
        Arc::clone(&self.current.read().await.catalog)
    }

    /// Whether any refresh has ever succeeded
    pub async fn is_loaded(&self) -> bool {
        self.current.read().await.loaded
    }

    /// Ordering of the list currently held
    pub async fn sort(&self) -> CatalogSort {
        self.current.read().await.sort
    }

    /// Refetch the whole list. On failure the previous list is kept.
    ///
    /// The fetched list is returned in `sort` order even when a newer
    /// refresh has already replaced the current one.
    pub async fn refresh(
        &self,
        repository: &CatalogRepository,
        sort: CatalogSort,
    ) -> StoreResult<Refreshed> {
        let token = self.begin_refresh();
        let catalog = Arc::new(Catalog::new(repository.list_uploads(sort).await?));
        let outcome = self.apply(token, sort, Arc::clone(&catalog)).await;
        Ok(Refreshed { catalog, outcome })
    }

    /// Reserve the token for a refresh that is about to start
    pub fn begin_refresh(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Install `catalog` unless a refresh started later has already landed
    pub async fn apply(
        &self,
        token: u64,
        sort: CatalogSort,
        catalog: Arc<Catalog>,
    ) -> RefreshOutcome {
        let mut current = self.current.write().await;
        if token <= current.token {
            debug!(
                "Dropping catalog refresh #{} (already at #{})",
                token, current.token
            );
            return RefreshOutcome::Superseded;
        }

        debug!("Applying catalog refresh #{} ({} records)", token, catalog.len());
        *current = Current {
            catalog,
            token,
            sort,
            loaded: true,
        };
        RefreshOutcome::Applied
    }
}
