#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use oracrawl::catalog::snapshot::SnapshotCatalog;
use oracrawl::catalog::{CatalogAdapter, Resolution};
use oracrawl::classifier::function_registry::BuiltinRegistry;
use oracrawl::crawler::Crawler;
use oracrawl::parser::names::ObjectRef;
use oracrawl::parser::references::ReferenceExtractor;
use oracrawl::Result;

pub(crate) fn fixture_dir(fixture: &str) -> PathBuf {
    PathBuf::from("tests/fixtures").join(fixture)
}

pub(crate) fn fixture_catalog_path(fixture: &str) -> PathBuf {
    fixture_dir(fixture).join("catalog.json")
}

pub(crate) fn load_fixture_catalog(fixture: &str) -> SnapshotCatalog {
    SnapshotCatalog::open(&fixture_catalog_path(fixture)).expect("fixture catalog should load")
}

pub(crate) fn unique_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after epoch")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("{prefix}_{nanos}"));
    std::fs::create_dir_all(&dir).expect("should create temp dir");
    dir
}

pub(crate) fn extractor() -> ReferenceExtractor {
    ReferenceExtractor::new("generic", BuiltinRegistry::oracle())
        .expect("generic dialect should exist")
}

pub(crate) fn crawler<C: CatalogAdapter>(catalog: C) -> Crawler<C> {
    Crawler::new(catalog, extractor())
}

/// Wraps a catalog and counts lookups per object.
pub(crate) struct CountingCatalog {
    inner: SnapshotCatalog,
    lookups: RefCell<HashMap<ObjectRef, usize>>,
}

impl CountingCatalog {
    pub(crate) fn new(inner: SnapshotCatalog) -> Self {
        Self {
            inner,
            lookups: RefCell::new(HashMap::new()),
        }
    }

    pub(crate) fn lookups_of(&self, owner: &str, name: &str) -> usize {
        self.lookups
            .borrow()
            .get(&ObjectRef::new(owner, name))
            .copied()
            .unwrap_or(0)
    }

    pub(crate) fn total_lookups(&self) -> usize {
        self.lookups.borrow().values().sum()
    }

    pub(crate) fn reset(&self) {
        self.lookups.borrow_mut().clear();
    }
}

impl CatalogAdapter for CountingCatalog {
    fn resolve(&self, object: &ObjectRef) -> Result<Resolution> {
        *self.lookups.borrow_mut().entry(object.clone()).or_insert(0) += 1;
        self.inner.resolve(object)
    }
}
