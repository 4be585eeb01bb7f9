//! Integration tests for the sync coordinator

use mindmap_editor::{
    EditorError, Format, Mutation, MutationError, MindmapNode, Publication, PublicationReceiver,
    SyncConfig, SyncCoordinator,
};
use mindmap_parser::CustomSchema;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

const DOC: &str = r#"{"version":"1.0","title":"T","root":{"id":"r","title":"Root","children":[]}}"#;

fn config() -> SyncConfig {
    SyncConfig::new(Format::Json).with_debounce(Duration::from_millis(30))
}

async fn next(publications: &mut PublicationReceiver) -> Arc<Publication> {
    timeout(Duration::from_secs(5), publications.changed())
        .await
        .expect("no publication in time")
        .expect("coordinator stopped");
    publications.borrow_and_update().clone().expect("empty publication")
}

async fn assert_quiet(publications: &mut PublicationReceiver) {
    let result = timeout(Duration::from_millis(200), publications.changed()).await;
    assert!(result.is_err(), "unexpected publication");
}

#[tokio::test]
async fn test_minimal_document_publishes() {
    let (sync, _writeback) = SyncCoordinator::spawn(config());
    let mut publications = sync.subscribe();

    sync.text_changed(DOC).await.unwrap();
    let publication = next(&mut publications).await;

    assert_eq!(publication.sequence, 1);
    assert!(publication.is_valid());
    let doc = publication.document().unwrap();
    assert_eq!(doc.node_count(), 1);
    assert!(doc.root.children.is_empty());
    assert_eq!(sync.latest().unwrap().sequence, 1);
}

#[tokio::test]
async fn test_burst_is_debounced() {
    let (sync, _writeback) = SyncCoordinator::spawn(config());
    let mut publications = sync.subscribe();

    for title in ["one", "two", "three"] {
        sync.text_changed(DOC.replace("\"T\"", &format!("\"{}\"", title)))
            .await
            .unwrap();
    }

    let publication = next(&mut publications).await;
    assert_eq!(publication.sequence, 1);
    assert_eq!(publication.document().unwrap().title, "three");
    assert_quiet(&mut publications).await;
}

#[tokio::test]
async fn test_same_text_parses_once() {
    let (sync, _writeback) = SyncCoordinator::spawn(config());
    let mut publications = sync.subscribe();

    sync.text_changed(DOC).await.unwrap();
    sync.text_changed(DOC).await.unwrap();
    next(&mut publications).await;

    sync.text_changed(DOC).await.unwrap();
    assert_quiet(&mut publications).await;
}

#[tokio::test]
async fn test_parse_error_keeps_previous_document() {
    let (sync, _writeback) = SyncCoordinator::spawn(config());
    let mut publications = sync.subscribe();

    sync.text_changed(DOC).await.unwrap();
    next(&mut publications).await;

    sync.text_changed(r#"{"version":"1.0","title":"T","root":{"title":"Root"}}"#)
        .await
        .unwrap();
    let publication = next(&mut publications).await;

    assert!(!publication.parsed());
    assert_eq!(publication.parse_errors.len(), 1);
    assert!(publication.parse_errors[0].message.contains("id"));
    assert_eq!(publication.document().unwrap().root.id, "r");
}

#[tokio::test]
async fn test_mutate_feeds_text_back() {
    let (sync, mut writeback) = SyncCoordinator::spawn(config());
    let mut publications = sync.subscribe();

    sync.text_changed(DOC).await.unwrap();
    next(&mut publications).await;

    let text = sync
        .mutate(Mutation::AddChild {
            parent_id: "r".to_string(),
            node: MindmapNode::new("c", "Child"),
        })
        .await
        .unwrap();
    assert!(text.contains("\"c\""));
    assert_eq!(writeback.recv().await.unwrap(), text);

    let publication = next(&mut publications).await;
    assert_eq!(publication.source, text);
    assert_eq!(publication.document().unwrap().root.children[0].id, "c");
    assert!(publication.index().unwrap().contains("c"));
}

#[tokio::test]
async fn test_mutate_errors() {
    let (sync, _writeback) = SyncCoordinator::spawn(config());
    let mut publications = sync.subscribe();

    let err = sync
        .mutate(Mutation::ToggleCollapse {
            node_id: "r".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EditorError::Mutation(MutationError::NoDocument)));

    sync.text_changed(DOC).await.unwrap();
    next(&mut publications).await;

    let err = sync
        .mutate(Mutation::AddSibling {
            sibling_id: "r".to_string(),
            node: MindmapNode::new("s", "S"),
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EditorError::Mutation(MutationError::RootHasNoSibling(_))
    ));
    assert_quiet(&mut publications).await;
}

/// Wait until the publication for `source` is out
async fn settled(publications: &mut PublicationReceiver, source: &str) -> Arc<Publication> {
    loop {
        let publication = next(publications).await;
        if publication.source == source {
            return publication;
        }
    }
}

#[tokio::test]
async fn test_back_to_back_mutations_keep_each_other() {
    let (sync, mut writeback) = SyncCoordinator::spawn(config());
    let mut publications = sync.subscribe();

    sync.text_changed(DOC).await.unwrap();
    next(&mut publications).await;

    let first = sync
        .mutate(Mutation::AddTag {
            node_id: "r".to_string(),
            tag: "x".to_string(),
        })
        .await
        .unwrap();
    let second = sync
        .mutate(Mutation::AddTag {
            node_id: "r".to_string(),
            tag: "y".to_string(),
        })
        .await
        .unwrap();
    assert!(first.contains("\"x\""));
    assert!(second.contains("\"x\"") && second.contains("\"y\""));

    assert_eq!(writeback.recv().await.unwrap(), first);
    assert_eq!(writeback.recv().await.unwrap(), second);

    let publication = settled(&mut publications, &second).await;
    assert_eq!(publication.document().unwrap().root.tags, vec!["x", "y"]);
}

#[tokio::test]
async fn test_mutate_builds_on_text_inside_debounce_window() {
    let (sync, mut writeback) = SyncCoordinator::spawn(config());
    let mut publications = sync.subscribe();

    sync.text_changed(DOC).await.unwrap();
    next(&mut publications).await;

    sync.text_changed(DOC.replace("\"Root\"", "\"Typed\"")).await.unwrap();
    let text = sync
        .mutate(Mutation::ToggleCollapse {
            node_id: "r".to_string(),
        })
        .await
        .unwrap();
    assert!(text.contains("Typed"));
    assert_eq!(writeback.recv().await.unwrap(), text);

    let publication = settled(&mut publications, &text).await;
    let root = &publication.document().unwrap().root;
    assert_eq!(root.title, "Typed");
    assert!(root.collapsed);
}

#[tokio::test]
async fn test_mutate_refuses_unparsed_text() {
    let (sync, mut writeback) = SyncCoordinator::spawn(config());
    let mut publications = sync.subscribe();

    sync.text_changed(DOC).await.unwrap();
    next(&mut publications).await;

    sync.text_changed("{ half typed").await.unwrap();
    let err = sync
        .mutate(Mutation::ToggleCollapse {
            node_id: "r".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EditorError::Mutation(MutationError::TextHasErrors)));
    assert!(writeback.try_recv().is_err());

    let publication = sync.latest().unwrap();
    assert_eq!(publication.source, "{ half typed");
    assert!(!publication.parsed());
}

#[tokio::test]
async fn test_schema_change_revalidates() {
    let (sync, _writeback) = SyncCoordinator::spawn(config());
    let mut publications = sync.subscribe();

    sync.text_changed(DOC).await.unwrap();
    assert!(next(&mut publications).await.is_valid());

    let schema: CustomSchema = serde_json::from_str(
        r#"{"version":"1","customFields":[
            {"name":"priority","label":"Priority","type":"select",
             "options":["low","high"],"required":true}]}"#,
    )
    .unwrap();
    sync.set_schema(Some(schema)).await.unwrap();

    let publication = next(&mut publications).await;
    assert!(!publication.validation.valid);
    assert_eq!(publication.validation.errors[0].path, "root.priority");
    assert!(publication.document().is_some());
    assert_eq!(publication.source, DOC);
    assert_eq!(publication.sequence, 2);

    sync.set_schema(None).await.unwrap();
    assert!(next(&mut publications).await.is_valid());
}

#[tokio::test]
async fn test_format_switch_reparses() {
    let (sync, _writeback) = SyncCoordinator::spawn(config());
    let mut publications = sync.subscribe();

    sync.text_changed("version: '1'\ntitle: Y\nroot:\n  id: r\n  title: R\n")
        .await
        .unwrap();
    assert!(!next(&mut publications).await.parsed());

    sync.set_format(Format::Yaml).await.unwrap();
    let publication = next(&mut publications).await;
    assert!(publication.parsed());
    assert_eq!(publication.document().unwrap().title, "Y");
}

#[tokio::test]
async fn test_shutdown_closes_channel() {
    let (sync, _writeback) = SyncCoordinator::spawn(config());
    sync.shutdown().await.unwrap();

    let mut publications = sync.subscribe();
    let closed = timeout(Duration::from_secs(5), publications.changed()).await.unwrap();
    assert!(closed.is_err());

    let err = sync.text_changed(DOC).await.unwrap_err();
    assert!(matches!(err, EditorError::ChannelClosed));
}
