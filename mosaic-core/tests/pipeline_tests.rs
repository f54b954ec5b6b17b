mod common;

use async_trait::async_trait;
use mosaic_core::contributor::{ContributorPipeline, ContributorRegistry, RuntimeContextContributor};
use mosaic_core::resolver::{
    ContentContextResolver, ContentTreeWalker, ContextResolutionService, ResolverRegistry,
};
use mosaic_core::runtime::keys;
use mosaic_core::store::MemoryStore;
use mosaic_core::test_utils::{context, profile, resource, FailingStore, SlowStore, TreeBuilder};
use mosaic_core::{
    AmbientState, ContextAssembler, Error, RequestContextItem, Result, RuntimeContext,
};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Claims items whose description starts with a prefix.
struct PrefixClaimer(&'static str);

#[async_trait]
impl RuntimeContextContributor for PrefixClaimer {
    fn name(&self) -> &str {
        self.0
    }

    async fn contribute(
        &self,
        runtime: &mut RuntimeContext,
        _ambient: &AmbientState,
        _cancel: &CancellationToken,
    ) -> Result<()> {
        let mut claimed = Vec::new();
        runtime.request_items_mut().handle_all(
            |item| item.description.starts_with(self.0),
            |item| claimed.push(format!("{} claimed {}", self.0, item.description)),
        );
        for line in claimed {
            runtime.add_system_message_part(line);
        }
        Ok(())
    }
}

#[tokio::test]
async fn test_claimed_items_are_invisible_to_later_contributors() {
    let mut registry = ContributorRegistry::new();
    registry.append(PrefixClaimer("tone")).append(PrefixClaimer("t"));
    let pipeline = ContributorPipeline::new(registry);

    let mut runtime = RuntimeContext::new(vec![
        RequestContextItem::new("tone: friendly"),
        RequestContextItem::new("topic: gardening"),
        RequestContextItem::new("audience: kids"),
    ]);
    pipeline
        .contribute(&mut runtime, &AmbientState::new(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(
        runtime.system_message_parts(),
        [
            "tone claimed tone: friendly",
            "t claimed topic: gardening",
            "Context: audience: kids",
        ]
    );
    assert!(!runtime
        .system_message_parts()
        .iter()
        .any(|p| p.contains("Context: tone") || p.contains("t claimed tone")));
}

#[tokio::test]
async fn test_resource_override_across_profile_and_content() {
    let store = Arc::new(MemoryStore::new());
    let (x, y) = (Uuid::new_v4(), Uuid::new_v4());

    let profile_ctx = context("Profile", vec![resource(x, "A", 0), resource(y, "A2", 1)]);
    let content_ctx = context("Content", vec![resource(x, "B", 0)]);
    let writer = profile("Writer", vec![profile_ctx.id]);

    let tree = TreeBuilder::new().node_with_context("Home", &[content_ctx.id]);
    tree.insert_into(&store);
    store.insert_context(profile_ctx);
    store.insert_context(content_ctx);
    store.insert_profile(writer.clone());

    let ambient = AmbientState::new()
        .with_profile(writer.id)
        .with_entity(tree.leaf().unwrap());
    let runtime = common::assembler(store)
        .assemble(vec![], &ambient, &CancellationToken::new())
        .await
        .unwrap();

    let resolved = runtime.data().get(keys::RESOLVED_CONTEXT).unwrap();
    let resources: Vec<_> = resolved
        .resources
        .iter()
        .map(|r| (r.id, r.name.as_str()))
        .collect();
    assert_eq!(resources, vec![(x, "B"), (y, "A2")]);

    let sources: Vec<_> = resolved
        .sources
        .iter()
        .map(|s| s.context_name.as_str())
        .collect();
    assert_eq!(sources, vec!["Profile", "Content"]);
}

#[tokio::test]
async fn test_tree_walk_stops_at_nearest_reference() {
    let store = Arc::new(MemoryStore::new());
    let r1 = context("R1", vec![resource(Uuid::new_v4(), "near", 0)]);
    let r2 = context("R2", vec![resource(Uuid::new_v4(), "root", 0)]);

    // root (R2) -> depth 2 (R1) -> depth 1 -> entity
    let tree = TreeBuilder::new()
        .node_with_context("Root", &[r2.id])
        .node_with_context("Section", &[r1.id])
        .node("Folder")
        .node("Page");
    tree.insert_into(&store);
    let section = tree.ids()[1];
    store.insert_context(r1);
    store.insert_context(r2);

    let walker = ContentTreeWalker::new(store.clone(), store.clone());
    let nearest = walker
        .find_nearest(tree.leaf().unwrap(), &CancellationToken::new())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(nearest.node.id, section);
    assert_eq!(nearest.contexts.len(), 1);
    assert_eq!(nearest.contexts[0].name, "R1");

    let mut runtime = RuntimeContext::default();
    runtime.data_mut().set(keys::ENTITY_ID, tree.leaf().unwrap());
    let mut registry = ResolverRegistry::new();
    registry.append(ContentContextResolver::new(store.clone(), store));
    let result = ContextResolutionService::new(registry)
        .resolve(&runtime, &CancellationToken::new())
        .await
        .unwrap();

    let names: Vec<_> = result.resources.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["near"]);
    assert_eq!(result.sources.len(), 1);
    assert_eq!(result.sources[0].entity_name, format!("Section ({})", section));
    assert_eq!(result.sources[0].context_name, "R1");
}

#[tokio::test]
async fn test_new_entity_inherits_from_parent() {
    let store = Arc::new(MemoryStore::new());
    let brand = context("Brand", vec![resource(Uuid::new_v4(), "Voice", 0)]);
    let tree = TreeBuilder::new().node_with_context("Blog", &[brand.id]);
    tree.insert_into(&store);
    store.insert_context(brand);

    // The entity does not exist yet; only its intended parent does.
    let blog = tree.leaf().unwrap();
    let item = common::entity_item("new-draft", Some(&blog.to_string()), "Draft post");

    let runtime = common::assembler(store)
        .assemble(vec![item], &AmbientState::new(), &CancellationToken::new())
        .await
        .unwrap();

    assert!(!runtime.data().contains(keys::ENTITY_ID));
    assert_eq!(runtime.data().get(keys::PARENT_ENTITY_ID), Some(&blog));
    let resolved = runtime.data().get(keys::RESOLVED_CONTEXT).unwrap();
    assert_eq!(resolved.resources[0].name, "Voice");
    assert_eq!(runtime.variables()["entityName"], "Draft post");
}

#[tokio::test]
async fn test_second_entity_item_does_not_mix_with_first() {
    let store = Arc::new(MemoryStore::new());
    let parent_ctx = context("ParentCtx", vec![resource(Uuid::new_v4(), "from-parent-of-draft", 0)]);
    let page_ctx = context("PageCtx", vec![resource(Uuid::new_v4(), "from-page", 0)]);

    let blog = TreeBuilder::new().node_with_context("Blog", &[parent_ctx.id]);
    let page = TreeBuilder::new().node_with_context("Page", &[page_ctx.id]);
    blog.insert_into(&store);
    page.insert_into(&store);
    store.insert_context(parent_ctx);
    store.insert_context(page_ctx);

    let blog_id = blog.leaf().unwrap();
    let page_id = page.leaf().unwrap();
    let draft = common::entity_item("new-draft", Some(&blog_id.to_string()), "Draft");
    let existing = common::document_item(page_id, "Page");

    let runtime = common::assembler(store)
        .assemble(vec![draft, existing], &AmbientState::new(), &CancellationToken::new())
        .await
        .unwrap();

    // The first entity owns every entity key; the second is plain context.
    assert_eq!(runtime.data().get(keys::SERIALIZED_ENTITY).unwrap().name, "Draft");
    assert!(!runtime.data().contains(keys::ENTITY_ID));
    assert_eq!(runtime.data().get(keys::PARENT_ENTITY_ID), Some(&blog_id));
    assert_eq!(
        runtime.system_message_parts().last().map(String::as_str),
        Some("Context: Current entity: Page")
    );

    let resolved = runtime.data().get(keys::RESOLVED_CONTEXT).unwrap();
    let names: Vec<_> = resolved.resources.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["from-parent-of-draft"]);
}

#[tokio::test]
async fn test_item_entity_overrides_ambient_parent() {
    let store = Arc::new(MemoryStore::new());
    let stale_ctx = context("Stale", vec![resource(Uuid::new_v4(), "stale", 0)]);
    let page_ctx = context("PageCtx", vec![resource(Uuid::new_v4(), "from-page", 0)]);

    let other = TreeBuilder::new().node_with_context("Other", &[stale_ctx.id]);
    let page = TreeBuilder::new().node_with_context("Page", &[page_ctx.id]);
    other.insert_into(&store);
    page.insert_into(&store);
    store.insert_context(stale_ctx);
    store.insert_context(page_ctx);

    let page_id = page.leaf().unwrap();
    let ambient = AmbientState::new().with_parent_entity(other.leaf().unwrap());

    let runtime = common::assembler(store)
        .assemble(
            vec![common::document_item(page_id, "Page")],
            &ambient,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(runtime.data().get(keys::ENTITY_ID), Some(&page_id));
    assert!(!runtime.data().contains(keys::PARENT_ENTITY_ID));

    let resolved = runtime.data().get(keys::RESOLVED_CONTEXT).unwrap();
    let names: Vec<_> = resolved.resources.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["from-page"]);
}

#[tokio::test]
async fn test_picker_with_only_missing_contexts_is_skipped() {
    let store = Arc::new(MemoryStore::new());
    let root_ctx = context("RootCtx", vec![resource(Uuid::new_v4(), "from-root", 0)]);

    let tree = TreeBuilder::new()
        .node_with_context("Root", &[root_ctx.id])
        .node_with_context("Section", &[Uuid::new_v4()])
        .node("Page");
    tree.insert_into(&store);
    let root = tree.ids()[0];
    store.insert_context(root_ctx);

    let ambient = AmbientState::new().with_entity(tree.leaf().unwrap());
    let runtime = common::assembler(store)
        .assemble(vec![], &ambient, &CancellationToken::new())
        .await
        .unwrap();

    let resolved = runtime.data().get(keys::RESOLVED_CONTEXT).unwrap();
    let names: Vec<_> = resolved.resources.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["from-root"]);
    assert_eq!(resolved.sources.len(), 1);
    assert_eq!(resolved.sources[0].entity_name, format!("Root ({})", root));
}

#[tokio::test]
async fn test_missing_entity_is_not_an_error() {
    let store = Arc::new(MemoryStore::new());
    let ambient = AmbientState::new().with_entity(Uuid::new_v4());

    let runtime = common::assembler(store)
        .assemble(vec![], &ambient, &CancellationToken::new())
        .await
        .unwrap();
    assert!(runtime.data().get(keys::RESOLVED_CONTEXT).unwrap().is_empty());
}

#[tokio::test]
async fn test_store_failure_aborts_request() {
    let failing = Arc::new(FailingStore);
    let memory = Arc::new(MemoryStore::new());
    let assembler = ContextAssembler::with_stores(failing, memory.clone(), memory);

    let item = common::document_item(Uuid::new_v4(), "Home");
    let err = assembler
        .assemble(vec![item], &AmbientState::new(), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(err.is_store());
    assert!(err.is_retryable());
    assert!(err.to_string().contains("entity store offline"));
}

#[tokio::test]
async fn test_no_entity_id_never_touches_entity_store() {
    let failing = Arc::new(FailingStore);
    let memory = Arc::new(MemoryStore::new());
    let assembler = ContextAssembler::with_stores(failing, memory.clone(), memory);

    let runtime = assembler
        .assemble(
            vec![RequestContextItem::new("plain")],
            &AmbientState::new(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();
    assert_eq!(runtime.system_message().as_deref(), Some("Context: plain"));
}

#[tokio::test]
async fn test_cancellation_during_tree_walk() {
    let inner = MemoryStore::new();
    let tree = TreeBuilder::new().node("Root").node("Child");
    tree.insert_into(&inner);

    let slow = Arc::new(SlowStore::new(inner, Duration::from_secs(30)));
    let memory = Arc::new(MemoryStore::new());
    let assembler = ContextAssembler::with_stores(slow, memory.clone(), memory);

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let ambient = AmbientState::new().with_entity(tree.leaf().unwrap());
    let err = tokio::time::timeout(
        Duration::from_secs(5),
        assembler.assemble(vec![], &ambient, &cancel),
    )
    .await
    .expect("cancellation should abort promptly")
    .unwrap_err();

    assert!(matches!(err, Error::Cancelled));
}
