use profilebit_cache::{
    InvalidationBus, InvalidationEvent, JsonFileStore, KeyValueStore, MemoryStore, ProgressCache,
};
use profilebit_core::source::{FieldDefinition, GroupDefinition, UserProfile};
use profilebit_core::{PhotoKind, Selection, StaticProfileSource};
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

fn source() -> StaticProfileSource {
    let mut source = StaticProfileSource::new()
        .with_group(GroupDefinition {
            id: 1,
            name: "Base".to_string(),
            is_repeater_enabled: false,
            fields: vec![
                FieldDefinition {
                    id: 10,
                    name: "Name".to_string(),
                    clone_number: None,
                },
                FieldDefinition {
                    id: 11,
                    name: "Location".to_string(),
                    clone_number: None,
                },
            ],
        })
        .with_user(UserProfile {
            id: 7,
            username: Some("alice".to_string()),
            has_avatar: false,
            ..Default::default()
        });
    source.set_value(7, 10, "Alice");
    source
}

fn selection() -> Selection {
    Selection::new(vec![1], vec![PhotoKind::ProfilePhoto])
}

#[test]
fn test_cache_persists_across_store_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("progress.json");
    let source = source();

    let computed = {
        let cache = ProgressCache::new(Arc::new(JsonFileStore::open(&path).unwrap()), "pc_");
        cache.get_formatted_progress(&source, &selection(), Some(7)).unwrap()
    };

    let cache = ProgressCache::new(Arc::new(JsonFileStore::open(&path).unwrap()), "pc_");
    let served = cache.get_formatted_progress(&source, &selection(), Some(7)).unwrap();
    assert_eq!(served, computed);
    assert_eq!(cache.stats().hits, 1);
}

#[test]
fn test_avatar_upload_event_refreshes_progress() {
    let store = Arc::new(MemoryStore::new());
    let cache = Arc::new(ProgressCache::new(store.clone(), "pc_"));
    let bus = InvalidationBus::for_cache(cache.clone());
    let mut source = source();

    let before = cache.get_formatted_progress(&source, &selection(), Some(7)).unwrap();
    assert_eq!(before.percentage, 33);

    source.user_mut(7).unwrap().has_avatar = true;
    bus.publish(InvalidationEvent::AvatarUploaded { user_id: 7 });

    let after = cache.get_formatted_progress(&source, &selection(), Some(7)).unwrap();
    assert_eq!(after.percentage, 67);
    assert!(after.sections[1].is_complete);
}

#[test]
fn test_field_deleted_event_clears_file_store() {
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(JsonFileStore::open(temp_dir.path().join("progress.json")).unwrap());
    let cache = Arc::new(ProgressCache::new(store.clone(), "pc_"));
    let bus = InvalidationBus::for_cache(cache.clone());
    let source = source();

    cache.get_formatted_progress(&source, &selection(), Some(7));
    cache.get_formatted_progress(&source, &selection(), Some(8));
    assert_eq!(store.keys().len(), 2);

    bus.publish(InvalidationEvent::FieldDeleted { field_id: 11 });
    assert!(store.keys().is_empty());
    assert_eq!(bus.stats().listener_failures, 0);
}

#[test]
fn test_concurrent_access_converges() {
    let store = Arc::new(MemoryStore::new());
    let cache = Arc::new(ProgressCache::new(store.clone(), "pc_"));
    let source = Arc::new(source());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let cache = cache.clone();
            let source = source.clone();
            thread::spawn(move || {
                cache
                    .get_formatted_progress(source.as_ref(), &selection(), Some(7))
                    .unwrap()
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(results.windows(2).all(|pair| pair[0] == pair[1]));
    assert_eq!(store.len(), 1);
    assert!(store.get("pc_7").unwrap().is_some());

    let stats = cache.stats();
    assert_eq!(stats.hits + stats.misses, 8);
}
