mod common;

use std::sync::Arc;

use placar_blob::{BlobAdapter, DisabledStore, MemoryBlobStore};
use placar_core::Category;
use placar_images::{ResolutionSource, ResolutionStatus, Resolver};

use common::*;

fn resolver(store: &Arc<MemoryBlobStore>, probe: &Arc<ScriptedProbe>) -> Resolver {
    Resolver::new(adapter(store), legacy(), probe.clone())
}

#[tokio::test]
async fn stored_and_live_object_wins() {
    let store = Arc::new(MemoryBlobStore::new());
    store.insert("itens/chest.png", b"png", Some("image/png")).await;
    let probe = Arc::new(ScriptedProbe::new().with_live(bucket_url("itens/chest.png")));

    let resolution = resolver(&store, &probe).resolve_file("chest.png", Some(Category::Item)).await;

    assert_eq!(resolution.url, bucket_url("itens/chest.png"));
    assert_eq!(resolution.source, ResolutionSource::ObjectStore);
    assert_eq!(resolution.status, ResolutionStatus::Verified);
}

#[tokio::test]
async fn stored_but_unreachable_object_falls_back() {
    let store = Arc::new(MemoryBlobStore::new());
    store.insert("itens/chest.png", b"png", None).await;
    let probe = Arc::new(ScriptedProbe::new());

    let resolution = resolver(&store, &probe).resolve_file("chest.png", Some(Category::Item)).await;

    assert_eq!(resolution.url, legacy_url("itens", "chest.png"));
    assert_eq!(resolution.source, ResolutionSource::LegacyFallback);
    assert_eq!(probe.calls(), vec![bucket_url("itens/chest.png")]);
}

#[tokio::test]
async fn missing_object_falls_back_without_probing() {
    let store = Arc::new(MemoryBlobStore::new());
    let probe = Arc::new(ScriptedProbe::new());

    let resolution = resolver(&store, &probe).resolve_file("joao-e-maria_banner.png", None).await;

    assert_eq!(resolution.url, legacy_url("banners-duplas", "joao-e-maria_banner.png"));
    assert_eq!(resolution.status, ResolutionStatus::Unchecked);
    assert!(probe.calls().is_empty());
}

#[tokio::test]
async fn bare_filenames_get_exactly_one_prefix() {
    let store = Arc::new(MemoryBlobStore::new());
    let probe = Arc::new(ScriptedProbe::new());
    let resolver = resolver(&store, &probe);

    for file in ["joao-e-maria.png", "loja_espada.png", "foto.png", "item-chest.png"] {
        let first = resolver.resolve_file(file, None).await;
        let second = resolver.resolve_file(file, None).await;
        assert_eq!(first, second, "{file}");

        let folders = ["/banners-duplas/", "/itens/"]
            .iter()
            .filter(|folder| first.url.contains(*folder))
            .count();
        assert_eq!(folders, 1, "{}", first.url);
    }
}

#[tokio::test]
async fn metadata_errors_count_as_absent() {
    let adapter = BlobAdapter::new(DisabledStore::new(&["s3.bucket"]), layout());
    let probe = Arc::new(ScriptedProbe::new());
    let resolver = Resolver::new(adapter, legacy(), probe.clone());

    let resolution = resolver.resolve_file("chest.png", Some(Category::Item)).await;
    assert_eq!(resolution.source, ResolutionSource::LegacyFallback);
}

#[tokio::test]
async fn missing_object_reference_derives_legacy_url() {
    let store = Arc::new(MemoryBlobStore::new());
    let probe = Arc::new(ScriptedProbe::new());

    let resolution = resolver(&store, &probe)
        .resolve_reference("https://bucket.s3.amazonaws.com/itens/missing.png")
        .await;

    assert_eq!(resolution.url, legacy_url("itens", "missing.png"));
    assert_eq!(resolution.source, ResolutionSource::LegacyFallback);
    assert_eq!(resolution.status, ResolutionStatus::Unchecked);
}

#[tokio::test]
async fn live_object_reference_is_verified() {
    let store = Arc::new(MemoryBlobStore::new());
    let url = bucket_url("banners_dupla/ana-e-bia.png");
    let probe = Arc::new(ScriptedProbe::new().with_live(url.clone()));

    let resolution = resolver(&store, &probe).resolve_reference(&url).await;
    assert_eq!(resolution.url, url);
    assert_eq!(resolution.status, ResolutionStatus::Verified);
}

#[tokio::test]
async fn object_reference_outside_known_prefixes_is_unreachable() {
    let store = Arc::new(MemoryBlobStore::new());
    let probe = Arc::new(ScriptedProbe::new());
    let url = bucket_url("fotos/x.png");

    let resolution = resolver(&store, &probe).resolve_reference(&url).await;
    assert_eq!(resolution.url, url);
    assert_eq!(resolution.source, ResolutionSource::ObjectStore);
    assert_eq!(resolution.status, ResolutionStatus::Unreachable);
}

#[tokio::test]
async fn other_references() {
    let store = Arc::new(MemoryBlobStore::new());
    let probe = Arc::new(ScriptedProbe::new());
    let resolver = resolver(&store, &probe);

    let legacy_ref = legacy_url("itens", "chest.png");
    let passed = resolver.resolve_reference(&legacy_ref).await;
    assert_eq!(passed.url, legacy_ref);
    assert_eq!(passed.source, ResolutionSource::PassThrough);

    let local = resolver.resolve_reference("/public/itens/chest.png").await;
    assert_eq!(local.url, legacy_url("itens", "chest.png"));
    assert_eq!(local.source, ResolutionSource::LegacyFallback);

    let foreign = resolver.resolve_reference("https://example.com/a.png").await;
    assert_eq!(foreign.url, "https://example.com/a.png");
    assert_eq!(foreign.source, ResolutionSource::PassThrough);
    assert!(probe.calls().is_empty());
}
