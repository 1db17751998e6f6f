//! Partition registry.
//!
//! `Database` binds a base directory and a default cache capacity, and
//! hands out partition handles stored under `<base>/<name>/`. It
//! remembers each registration's name, cache capacity, index paths, and
//! versioned flag; it never holds partition objects, so joins resolving
//! through it get a fresh handle on every call. Flavor is not checked
//! on re-lookup — joins always treat their target as plain.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;

use varve_core::path::validate_partition_name;
use varve_core::{FieldPath, VarveError, VarveResult};
use varve_storage::cache::DEFAULT_CACHE_CAPACITY;
use varve_storage::PartitionLayout;

use crate::backup;
use crate::partition::{BitemporalPartition, Flavor, Partition, PartitionCore, VersionedPartition};

/// Construction-time settings for a [`Database`].
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    base_dir: PathBuf,
    default_cache_capacity: usize,
}

impl DatabaseConfig {
    /// Settings rooted at `base_dir` with the default cache capacity.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        DatabaseConfig {
            base_dir: base_dir.into(),
            default_cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }

    /// Override the cache capacity used when a partition does not
    /// choose its own. Zero disables caching.
    pub fn with_default_cache_capacity(mut self, capacity: usize) -> Self {
        self.default_cache_capacity = capacity;
        self
    }
}

#[derive(Debug, Clone)]
struct Registration {
    index_paths: Vec<String>,
    cache_capacity: usize,
    versioned: bool,
}

struct DatabaseInner {
    base_dir: PathBuf,
    default_cache_capacity: usize,
    registrations: DashMap<String, Registration>,
}

/// Registry of partitions under one base directory.
///
/// Cloning is cheap and every clone shares the registration map.
#[derive(Clone)]
pub struct Database {
    inner: Arc<DatabaseInner>,
}

impl Database {
    /// Open a registry rooted at `base_dir` with default settings.
    pub fn open(base_dir: impl Into<PathBuf>) -> Self {
        Self::with_config(DatabaseConfig::new(base_dir))
    }

    /// Open a registry with explicit settings.
    pub fn with_config(config: DatabaseConfig) -> Self {
        Database {
            inner: Arc::new(DatabaseInner {
                base_dir: config.base_dir,
                default_cache_capacity: config.default_cache_capacity,
                registrations: DashMap::new(),
            }),
        }
    }

    /// The directory all partitions live under.
    pub fn base_dir(&self) -> &Path {
        &self.inner.base_dir
    }

    /// Register (or re-register) a plain partition and return a handle.
    pub fn get_partition(
        &self,
        name: &str,
        index_paths: &[&str],
        cache_capacity: Option<usize>,
    ) -> VarveResult<Partition> {
        let core = self.register(name, index_paths, cache_capacity, false, Flavor::Plain)?;
        Ok(Partition { core })
    }

    /// Register (or re-register) a unitemporal partition and return a
    /// handle.
    pub fn get_versioned_partition(
        &self,
        name: &str,
        index_paths: &[&str],
        cache_capacity: Option<usize>,
    ) -> VarveResult<VersionedPartition> {
        let core = self.register(name, index_paths, cache_capacity, true, Flavor::Versioned)?;
        Ok(VersionedPartition { core })
    }

    /// Register (or re-register) a bitemporal partition and return a
    /// handle.
    pub fn get_bitemporal_partition(
        &self,
        name: &str,
        index_paths: &[&str],
        cache_capacity: Option<usize>,
    ) -> VarveResult<BitemporalPartition> {
        let core = self.register(name, index_paths, cache_capacity, true, Flavor::Bitemporal)?;
        Ok(BitemporalPartition { core })
    }

    /// Fresh plain handle for a previously registered name. Fails with
    /// [`VarveError::PartitionNotFound`] for unknown names.
    pub fn get_partition_by_name(&self, name: &str) -> VarveResult<Partition> {
        let registration = self
            .inner
            .registrations
            .get(name)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| VarveError::partition_not_found(name))?;
        let paths = parse_paths(&registration.index_paths)?;
        let core = self.build_core(name, Flavor::Plain, paths, registration.cache_capacity);
        Ok(Partition { core })
    }

    /// Archive the base directory into a timestamp-named gzipped tar
    /// inside `output_dir` and return the archive path.
    pub fn backup(&self, output_dir: impl AsRef<Path>) -> VarveResult<PathBuf> {
        backup::create_archive(&self.inner.base_dir, output_dir.as_ref())
    }

    fn register(
        &self,
        name: &str,
        index_paths: &[&str],
        cache_capacity: Option<usize>,
        versioned: bool,
        flavor: Flavor,
    ) -> VarveResult<PartitionCore> {
        validate_partition_name(name)?;
        let owned: Vec<String> = index_paths.iter().map(|p| p.to_string()).collect();
        let paths = parse_paths(&owned)?;
        let capacity = cache_capacity.unwrap_or(self.inner.default_cache_capacity);
        self.inner.registrations.insert(
            name.to_string(),
            Registration {
                index_paths: owned,
                cache_capacity: capacity,
                versioned,
            },
        );
        Ok(self.build_core(name, flavor, paths, capacity))
    }

    fn build_core(
        &self,
        name: &str,
        flavor: Flavor,
        index_paths: Vec<FieldPath>,
        cache_capacity: usize,
    ) -> PartitionCore {
        let layout = PartitionLayout::new(self.inner.base_dir.join(name));
        PartitionCore::new(
            name.to_string(),
            flavor,
            layout,
            index_paths,
            cache_capacity,
            self.clone(),
        )
    }
}

fn parse_paths(raw: &[String]) -> VarveResult<Vec<FieldPath>> {
    raw.iter().map(|path| path.parse()).collect()
}
