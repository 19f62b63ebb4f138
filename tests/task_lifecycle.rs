//! Full-stack task lifecycle tests
//!
//! Drive the engine with the real HTTP downloader, ZIP archiver and memory
//! store against a wiremock file server.

mod common;

use common::{
    Harness, JPEG_BODY, PDF_BODY, mock_files, read_archive, wait_for_idle, wait_for_terminal,
};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};
use zipfetch::{Error, TaskStatus};

#[tokio::test]
async fn task_with_all_links_fetched_is_archived() {
    let server = mock_files().await;
    let harness = Harness::start(3, 2);
    let engine = &harness.engine;

    let id = engine.create_task().await.unwrap();
    engine
        .add_links(
            &id,
            vec![
                format!("{}/a.pdf", server.uri()),
                format!("{}/b.jpg", server.uri()),
            ],
        )
        .await
        .unwrap();

    let task = wait_for_terminal(engine, &id).await;

    assert_eq!(task.status, TaskStatus::Done);
    assert_eq!(task.downloaded.len(), 2);
    assert!(task.failed.is_empty());

    let archive = task.archive.expect("done task has an archive");
    assert!(archive.starts_with(&harness.config.archive_dir));

    let entries = read_archive(&archive);
    assert_eq!(entries.len(), 2);
    assert!(entries[0].0.ends_with(".pdf"), "{}", entries[0].0);
    assert_eq!(entries[0].1, PDF_BODY);
    assert!(entries[1].0.ends_with(".jpg"), "{}", entries[1].0);
    assert_eq!(entries[1].1, JPEG_BODY);

    wait_for_idle(engine).await;
}

#[tokio::test]
async fn partial_failure_still_produces_an_archive() {
    let server = mock_files().await;
    let harness = Harness::start(3, 2);
    let engine = &harness.engine;
    let missing = format!("{}/missing.pdf", server.uri());

    let id = engine.create_task().await.unwrap();
    engine
        .add_links(&id, vec![missing.clone(), format!("{}/a.pdf", server.uri())])
        .await
        .unwrap();

    let task = wait_for_terminal(engine, &id).await;

    assert_eq!(task.status, TaskStatus::Done);
    assert_eq!(task.failed.len(), 1);
    assert_eq!(task.failed[0].link, missing);
    assert!(task.failed[0].reason.contains("404"), "{}", task.failed[0].reason);

    let entries = read_archive(task.archive.as_ref().unwrap());
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].1, PDF_BODY);

    let view = task.view();
    assert!(view.failed_files.unwrap().contains_key(&missing));
}

#[tokio::test]
async fn task_losing_every_link_fails_without_archive() {
    let server = mock_files().await;
    let harness = Harness::start(1, 1);
    let engine = &harness.engine;

    let id = engine.create_task().await.unwrap();
    engine
        .add_links(&id, vec![format!("{}/missing.pdf", server.uri())])
        .await
        .unwrap();

    let task = wait_for_terminal(engine, &id).await;

    assert_eq!(task.status, TaskStatus::Failed);
    assert!(task.archive.is_none());
    assert!(
        std::fs::read_dir(&harness.config.archive_dir)
            .unwrap()
            .next()
            .is_none(),
        "no archive should be written"
    );
}

#[tokio::test]
async fn links_can_arrive_in_several_batches() {
    let server = mock_files().await;
    let harness = Harness::start(1, 3);
    let engine = &harness.engine;

    let id = engine.create_task().await.unwrap();
    engine
        .add_links(&id, vec![format!("{}/a.pdf", server.uri())])
        .await
        .unwrap();

    // Below the ceiling the task keeps running and holds its slot
    tokio::time::sleep(Duration::from_millis(100)).await;
    let task = engine.get_task(&id).await.unwrap();
    assert_eq!(task.status, TaskStatus::Running);
    assert!(matches!(
        engine.create_task().await,
        Err(Error::TooManyTasks { limit: 1 })
    ));

    engine
        .add_links(
            &id,
            vec![
                format!("{}/b.jpg", server.uri()),
                format!("{}/a.pdf", server.uri()),
            ],
        )
        .await
        .unwrap();

    let task = wait_for_terminal(engine, &id).await;
    assert_eq!(task.status, TaskStatus::Done);
    assert_eq!(
        task.links,
        vec![
            format!("{}/a.pdf", server.uri()),
            format!("{}/b.jpg", server.uri()),
            format!("{}/a.pdf", server.uri()),
        ]
    );
    // The repeated link reuses the first download
    assert_eq!(task.downloaded.len(), 3);
    assert_eq!(task.downloaded[0].path, task.downloaded[2].path);
    assert_eq!(read_archive(task.archive.as_ref().unwrap()).len(), 2);

    // The slot is free again
    wait_for_idle(engine).await;
    engine.create_task().await.unwrap();
}

#[tokio::test]
async fn shutdown_interrupts_a_slow_download() {
    let server = mock_files().await;
    Mock::given(method("GET"))
        .and(path("/slow.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(PDF_BODY.to_vec())
                .set_delay(Duration::from_secs(30)),
        )
        .mount(&server)
        .await;
    let harness = Harness::start(1, 1);
    let engine = &harness.engine;

    let id = engine.create_task().await.unwrap();
    engine
        .add_links(&id, vec![format!("{}/slow.pdf", server.uri())])
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    tokio::time::timeout(Duration::from_secs(5), engine.shutdown())
        .await
        .expect("shutdown should not wait for the download");

    let task = engine.get_task(&id).await.unwrap();
    assert!(!task.status.is_terminal(), "{task:?}");
    assert!(task.downloaded.is_empty());
    assert!(task.failed.is_empty());
    assert_eq!(engine.active_tasks(), 0);
}
