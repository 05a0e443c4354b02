//! Corpus providers backed by files and the load-once cache.

use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use hakim_rag::{
    CachedCorpus, CorpusProvider, JsonFileCorpus, PlantFilter, PlantRecord, RagError, Result,
};
use tempfile::NamedTempFile;

const DATASET: &str = r#"[
  {
    "Scientific Name": "Berberis lycium",
    "Local Name": "Sumbal",
    "Family": "Berberidaceae",
    "Uses": "Diabetes, jaundice",
    "Symptoms": "High blood sugar",
    "Preparation & Dosage": "Root decoction",
    "Side Effects / Precautions": "Avoid during pregnancy"
  },
  {
    "Scientific Name": "",
    "Local Name": "Unnamed"
  },
  {
    "Scientific Name": "Mentha arvensis",
    "Local Name": "Podina",
    "Uses": "Indigestion",
    "Symptoms": ""
  }
]"#;

fn write_dataset(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[tokio::test]
async fn json_file_loads_in_order_and_skips_unnamed() {
    let file = write_dataset(DATASET);
    let corpus = JsonFileCorpus::new(file.path());

    let plants = corpus.load().await.unwrap();

    assert_eq!(plants.len(), 2);
    assert_eq!(plants[0].scientific_name, "Berberis lycium");
    assert_eq!(plants[0].side_effects.as_deref(), Some("Avoid during pregnancy"));
    assert_eq!(plants[1].local_name, "Podina");
    assert_eq!(plants[1].symptoms, None);
}

#[tokio::test]
async fn missing_file_is_a_corpus_error() {
    let dir = tempfile::tempdir().unwrap();
    let corpus = JsonFileCorpus::new(dir.path().join("nope.json"));

    let err = corpus.load().await.unwrap_err();
    assert!(matches!(err, RagError::CorpusError { .. }));
}

#[tokio::test]
async fn invalid_json_is_a_corpus_error() {
    let file = write_dataset("{ not json");
    let err = JsonFileCorpus::new(file.path()).load().await.unwrap_err();

    match err {
        RagError::CorpusError { source_name, message } => {
            assert_eq!(source_name, file.path().display().to_string());
            assert!(message.starts_with("failed to parse"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

struct CountingCorpus {
    loads: Arc<AtomicUsize>,
    fail_first: bool,
    delay: Duration,
}

impl CountingCorpus {
    fn new(fail_first: bool) -> (Self, Arc<AtomicUsize>) {
        let loads = Arc::new(AtomicUsize::new(0));
        (Self { loads: Arc::clone(&loads), fail_first, delay: Duration::ZERO }, loads)
    }

    fn slow(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl CorpusProvider for CountingCorpus {
    async fn load(&self) -> Result<Arc<[PlantRecord]>> {
        let call = self.loads.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail_first && call == 0 {
            return Err(RagError::CorpusError {
                source_name: "counting".into(),
                message: "flaky".into(),
            });
        }
        Ok(vec![PlantRecord::new("Ocimum sanctum", "Tulsi")].into())
    }
}

#[tokio::test]
async fn cached_corpus_loads_once() {
    let (inner, loads) = CountingCorpus::new(false);
    let cached = CachedCorpus::new(inner);
    assert!(!cached.is_loaded());

    let first = cached.load().await.unwrap();
    let second = cached.load().await.unwrap();

    assert!(cached.is_loaded());
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(loads.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_first_loads_share_one_snapshot() {
    let (inner, loads) = CountingCorpus::new(false);
    let cached = Arc::new(CachedCorpus::new(inner.slow(Duration::from_millis(50))));

    let mut handles = Vec::new();
    for _ in 0..16 {
        let cached = Arc::clone(&cached);
        handles.push(tokio::spawn(async move { cached.load().await }));
    }

    let mut snapshots = Vec::new();
    for handle in handles {
        snapshots.push(handle.await.unwrap().unwrap());
    }

    assert_eq!(loads.load(Ordering::SeqCst), 1);
    assert!(snapshots.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
    assert!(cached.is_loaded());
}

#[tokio::test]
async fn cached_corpus_retries_after_failure_and_resets() {
    let (inner, loads) = CountingCorpus::new(true);
    let mut cached = CachedCorpus::new(inner);

    assert!(cached.load().await.is_err());
    assert!(!cached.is_loaded());
    assert_eq!(cached.load().await.unwrap().len(), 1);

    cached.reset();
    assert!(!cached.is_loaded());
    assert_eq!(cached.load().await.unwrap()[0].local_name, "Tulsi");
    assert_eq!(loads.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn filter_over_loaded_file() {
    let file = write_dataset(DATASET);
    let plants = JsonFileCorpus::new(file.path()).load().await.unwrap();

    let found = PlantFilter::default().symptom("blood sugar").apply(&plants).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].local_name, "Sumbal");

    let found = PlantFilter::default().name("podina").apply(&plants).unwrap();
    assert_eq!(found[0].scientific_name, "Mentha arvensis");
}
