//! Tests for DiagramCatalog: the cached diagram list.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use fishbone::application::services::DiagramCatalog;
use fishbone::application::ApplicationError;
use fishbone::domain::{Diagram, DiagramUpdate, DomainError};
use fishbone::infrastructure::traits::{DiagramStore, StoreError};
use fishbone::util::testing::{sample_diagram, sample_forest};

/// Store backed by a vector; can be switched to fail every call.
struct MockStore {
    diagrams: Mutex<Vec<Diagram>>,
    failing: Mutex<bool>,
}

impl MockStore {
    fn new(diagrams: Vec<Diagram>) -> Self {
        Self {
            diagrams: Mutex::new(diagrams),
            failing: Mutex::new(false),
        }
    }

    fn fail(&self, on: bool) {
        *self.failing.lock().unwrap() = on;
    }

    fn check(&self, message: &str) -> Result<(), StoreError> {
        if *self.failing.lock().unwrap() {
            return Err(StoreError::Transport {
                message: message.to_string(),
                cause: "connection refused".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl DiagramStore for MockStore {
    async fn list_diagrams(&self) -> Result<Vec<Diagram>, StoreError> {
        self.check("Failed to fetch diagrams")?;
        Ok(self.diagrams.lock().unwrap().clone())
    }

    async fn get_diagram(&self, id: &str) -> Result<Diagram, StoreError> {
        self.check("Failed to fetch diagram")?;
        self.diagrams
            .lock()
            .unwrap()
            .iter()
            .find(|d| d.id == id)
            .cloned()
            .ok_or(StoreError::Rejected {
                status: 404,
                message: "Diagram not found".into(),
            })
    }

    async fn create_diagram(&self, title: &str) -> Result<Diagram, StoreError> {
        self.check("Failed to add diagram")?;
        let mut diagrams = self.diagrams.lock().unwrap();
        let diagram = sample_diagram(&format!("d{}", diagrams.len() + 1), title, Vec::new());
        diagrams.push(diagram.clone());
        Ok(diagram)
    }

    async fn update_diagram(&self, _id: &str, _update: DiagramUpdate) -> Result<Diagram, StoreError> {
        unimplemented!("catalog never updates")
    }

    async fn delete_diagram(&self, id: &str) -> Result<(), StoreError> {
        self.check("Failed to delete diagram")?;
        self.diagrams.lock().unwrap().retain(|d| d.id != id);
        Ok(())
    }
}

fn seeded() -> (Arc<MockStore>, DiagramCatalog) {
    let store = Arc::new(MockStore::new(vec![
        sample_diagram("d1", "Press line stops", sample_forest()),
        sample_diagram("d2", "Late deliveries", Vec::new()),
        sample_diagram("d3", "PRESS scrap rate", Vec::new()),
    ]));
    let catalog = DiagramCatalog::new(store.clone());
    (store, catalog)
}

#[tokio::test]
async fn given_store_when_refresh_then_cache_mirrors_store() {
    let (_store, mut catalog) = seeded();

    let count = catalog.refresh().await.unwrap().len();

    assert_eq!(count, 3);
    assert!(catalog.last_error().is_none());
}

#[tokio::test]
async fn given_mixed_case_titles_when_search_then_case_insensitive_match() {
    let (_store, mut catalog) = seeded();
    catalog.refresh().await.unwrap();

    let ids: Vec<&str> = catalog.search("press").into_iter().map(|d| d.id.as_str()).collect();

    assert_eq!(ids, vec!["d1", "d3"]);
    assert_eq!(catalog.search("").len(), 3);
    assert!(catalog.search("nothing").is_empty());
}

#[tokio::test]
async fn given_bones_when_summarising_then_counts_every_depth() {
    let (_store, mut catalog) = seeded();
    catalog.refresh().await.unwrap();

    let rows = catalog.summaries("line");

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].top_level_bones, 2);
    assert_eq!(rows[0].total_bones, 5);
    // no updatedAt yet, creation time stands in
    assert_eq!(rows[0].updated_at, rows[0].created_at);
}

#[tokio::test]
async fn given_title_when_create_then_newest_first() {
    let (_store, mut catalog) = seeded();
    catalog.refresh().await.unwrap();

    let created = catalog.create("  Noise complaints ").await.unwrap();

    assert_eq!(created.title, "Noise complaints");
    assert!(created.bones.is_empty());
    assert_eq!(catalog.diagrams()[0].id, created.id);
    assert_eq!(catalog.diagrams().len(), 4);
}

#[tokio::test]
async fn given_blank_title_when_create_then_rejected_before_store() {
    let (store, mut catalog) = seeded();

    let result = catalog.create("   ").await;

    assert!(matches!(
        result,
        Err(ApplicationError::Domain(DomainError::EmptyTitle))
    ));
    assert_eq!(store.diagrams.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn given_known_id_when_delete_then_removed_from_cache_and_store() {
    let (store, mut catalog) = seeded();
    catalog.refresh().await.unwrap();

    catalog.delete("d2").await.unwrap();

    assert!(catalog.diagrams().iter().all(|d| d.id != "d2"));
    assert_eq!(store.diagrams.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn given_fetch_when_loaded_then_cache_has_single_copy() {
    let (_store, mut catalog) = seeded();
    catalog.refresh().await.unwrap();

    catalog.fetch("d1").await.unwrap();

    let copies = catalog.diagrams().iter().filter(|d| d.id == "d1").count();
    assert_eq!(copies, 1);
    assert_eq!(catalog.diagrams().last().map(|d| d.id.as_str()), Some("d1"));
}

#[tokio::test]
async fn given_failing_store_when_refresh_then_cache_kept_and_error_recorded() {
    // Arrange
    let (store, mut catalog) = seeded();
    catalog.refresh().await.unwrap();
    store.fail(true);

    // Act
    let result = catalog.refresh().await;

    // Assert
    assert!(matches!(result, Err(ApplicationError::Store { .. })));
    assert_eq!(catalog.diagrams().len(), 3);
    assert_eq!(catalog.last_error(), Some("Failed to fetch diagrams"));

    // next success clears it
    store.fail(false);
    catalog.refresh().await.unwrap();
    assert!(catalog.last_error().is_none());
}
