//! Common test utilities for zipfetch integration tests

// Each test binary uses a different subset of these helpers
#![allow(dead_code)]

use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zipfetch::config::TaskLimits;
use zipfetch::{Config, Task, TaskEngine, TaskId};

/// Body served for every PDF fixture
pub const PDF_BODY: &[u8] = b"%PDF-1.4\n1 0 obj\n<<>>\nendobj\n%%EOF\n";

/// Body served for every JPEG fixture
pub const JPEG_BODY: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];

/// Engine over the production collaborators, writing into throwaway directories
pub struct Harness {
    /// The engine (dispatcher already running)
    pub engine: TaskEngine,
    /// Config the engine was built from
    pub config: Config,
    /// Keeps the archive and scratch directories alive
    pub _root: TempDir,
}

impl Harness {
    /// Build and start an engine with the given ceilings
    pub fn start(max_active_tasks: usize, max_links_per_task: usize) -> Self {
        let root = TempDir::new().unwrap();
        let config = Config {
            archive_dir: root.path().join("archives"),
            temp_dir: root.path().join("scratch"),
            limits: TaskLimits {
                max_active_tasks,
                max_links_per_task,
            },
            download_timeout: Duration::from_secs(5),
            link_poll_interval: Duration::from_millis(10),
            ..Config::default()
        };
        config.validate().unwrap();

        let engine = TaskEngine::from_config(&config).unwrap();
        tokio::spawn({
            let engine = engine.clone();
            async move { engine.start().await }
        });

        Self {
            engine,
            config,
            _root: root,
        }
    }
}

/// Serve `a.pdf` and `b.jpg` with fixture bodies and 404 for `missing.pdf`
pub async fn mock_files() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/a.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(PDF_BODY.to_vec()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/b.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(JPEG_BODY.to_vec()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/missing.pdf"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    server
}

/// Poll until the task reaches a terminal status, panicking after a few seconds
pub async fn wait_for_terminal(engine: &TaskEngine, id: &TaskId) -> Task {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
    loop {
        let task = engine.get_task(id).await.unwrap();
        if task.status.is_terminal() {
            return task;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "task {id} never finished: {task:?}"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Entry names and contents of a ZIP archive, in archive order
pub fn read_archive(path: &Path) -> Vec<(String, Vec<u8>)> {
    use std::io::Read;

    let mut zip = zip::ZipArchive::new(std::fs::File::open(path).unwrap()).unwrap();
    (0..zip.len())
        .map(|i| {
            let mut entry = zip.by_index(i).unwrap();
            let mut content = Vec::new();
            entry.read_to_end(&mut content).unwrap();
            (entry.name().to_string(), content)
        })
        .collect()
}

/// Poll until no task holds an admission slot
pub async fn wait_for_idle(engine: &TaskEngine) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while engine.active_tasks() != 0 {
        assert!(
            tokio::time::Instant::now() < deadline,
            "{} tasks still active",
            engine.active_tasks()
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
