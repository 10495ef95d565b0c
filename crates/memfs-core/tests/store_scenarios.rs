//! End-to-end store scenarios: add, list, remove and the recursive move.

use std::sync::Arc;

use memfs_core::{FileAttributes, FileNode, FsError, Store};

fn dir(path: &str) -> Arc<FileNode> {
    Arc::new(FileNode::new_directory(path))
}

fn file(path: &str) -> Arc<FileNode> {
    Arc::new(FileNode::new_file(path))
}

fn sorted_names(store: &Store, path: &str) -> Vec<String> {
    let mut names: Vec<String> = store.list_folder(path).iter().map(|n| n.name()).collect();
    names.sort();
    names
}

fn assert_consistent(store: &Store) {
    if let Err(violation) = store.check_consistency() {
        panic!("index invariant broken: {violation}");
    }
}

// ============================================================================
// Add / Find / ListFolder
// ============================================================================

#[test]
fn add_find_and_list() {
    let store = Store::new();
    store.add(dir("/a")).expect("add /a");
    store.add(file("/a/x.txt")).expect("add /a/x.txt");

    let found = store.find("/a/x.txt").expect("file is indexed");
    assert_eq!(found.name(), "/a/x.txt");
    assert!(!found.is_directory());

    assert_eq!(sorted_names(&store, "/a"), vec!["/a/x.txt"]);
    assert_eq!(sorted_names(&store, "/"), vec!["/a"]);
    assert_consistent(&store);
}

#[test]
fn add_with_missing_parent_fails() {
    let store = Store::new();
    let err = store.add(file("/nope/x")).unwrap_err();
    assert_eq!(err, FsError::ParentPathNotFound("/nope/x".to_string()));
    assert!(store.find("/nope/x").is_none());
    assert_consistent(&store);
}

#[test]
fn add_under_a_file_fails() {
    let store = Store::new();
    store.add(file("/f")).unwrap();
    let err = store.add(file("/f/child")).unwrap_err();
    assert!(matches!(err, FsError::ParentPathNotFound(_)));
}

#[test]
fn list_folder_of_unknown_or_file_path_is_empty() {
    let store = Store::new();
    store.add(file("/f")).unwrap();
    assert!(store.list_folder("/missing").is_empty());
    assert!(store.list_folder("/f").is_empty());
}

#[test]
fn list_folder_orders_by_identity() {
    let store = Store::new();
    store.add(file("/zeta")).unwrap();
    store.add(file("/alpha")).unwrap();
    let listed: Vec<String> = store.list_folder("/").iter().map(|n| n.name()).collect();
    assert_eq!(listed, vec!["/zeta", "/alpha"]);
}

// ============================================================================
// Remove
// ============================================================================

#[test]
fn remove_directory_removes_subtree() {
    let store = Store::new();
    store.add(dir("/a")).unwrap();
    store.add(dir("/a/b")).unwrap();
    store.add(file("/a/b/c")).unwrap();

    store.remove("/a");

    assert!(store.find("/a").is_none());
    assert!(store.find("/a/b").is_none());
    assert!(store.find("/a/b/c").is_none());
    assert!(store.list_folder("/a").is_empty());
    assert!(store.list_folder("/a/b").is_empty());
    assert!(store.list_folder("/").is_empty());
    assert_consistent(&store);
}

#[test]
fn removed_node_stays_usable_by_holders() {
    let store = Store::new();
    let node = file("/f");
    node.write(0, b"still here", false).unwrap();
    store.add(Arc::clone(&node)).unwrap();

    let held = store.find("/f").unwrap();
    store.remove_node(&node);

    assert!(store.find("/f").is_none());
    assert_eq!(held.read(0, 100), b"still here");
}

// ============================================================================
// Move
// ============================================================================

#[test]
fn move_missing_source_is_not_found() {
    let store = Store::new();
    let err = store.move_node("/missing", "/other", false).unwrap_err();
    assert_eq!(err, FsError::NotFound("/missing".to_string()));
}

#[test]
fn move_directory_onto_existing_file_is_denied() {
    let store = Store::new();
    store.add(dir("/d")).unwrap();
    store.add(file("/f")).unwrap();

    let err = store.move_node("/d", "/f", true).unwrap_err();
    assert!(matches!(err, FsError::AccessDenied(_)));

    assert!(store.find("/d").unwrap().is_directory());
    assert!(!store.find("/f").unwrap().is_directory());
    assert_consistent(&store);
}

#[test]
fn move_file_onto_existing_directory_is_denied() {
    let store = Store::new();
    store.add(dir("/d")).unwrap();
    store.add(file("/f")).unwrap();
    let err = store.move_node("/f", "/d", true).unwrap_err();
    assert!(matches!(err, FsError::AccessDenied(_)));
}

#[test]
fn move_directory_carries_subtree() {
    let store = Store::new();
    store.add(dir("/a")).unwrap();
    store.add(dir("/a/b")).unwrap();
    store.add(file("/a/b/c")).unwrap();
    let leaf_id = store.find("/a/b/c").unwrap().identity();

    store.move_node("/a", "/z", false).expect("move /a to /z");

    assert!(store.find("/z").is_some());
    assert!(store.find("/z/b").is_some());
    let leaf = store.find("/z/b/c").expect("leaf moved");
    assert_eq!(leaf.name(), "/z/b/c");
    assert_eq!(leaf.identity(), leaf_id);

    assert!(store.find("/a").is_none());
    assert!(store.find("/a/b").is_none());
    assert!(store.find("/a/b/c").is_none());
    assert!(store.list_folder("/a").is_empty());
    assert_eq!(sorted_names(&store, "/z/b"), vec!["/z/b/c"]);
    assert_consistent(&store);
}

#[test]
fn move_directory_into_other_directory() {
    let store = Store::new();
    store.add(dir("/src")).unwrap();
    store.add(file("/src/one")).unwrap();
    store.add(file("/src/two")).unwrap();
    store.add(dir("/dst")).unwrap();

    store.move_node("/src", "/dst/src", false).unwrap();

    assert_eq!(sorted_names(&store, "/dst/src"), vec!["/dst/src/one", "/dst/src/two"]);
    assert_eq!(sorted_names(&store, "/"), vec!["/dst"]);
    assert_consistent(&store);
}

#[test]
fn move_collision_without_replace_then_with_replace() {
    let store = Store::new();
    let source = file("/f1");
    source.write(0, b"one", false).unwrap();
    store.add(Arc::clone(&source)).unwrap();
    let target = file("/f2");
    target.write(0, b"two", false).unwrap();
    store.add(target).unwrap();

    let err = store.move_node("/f1", "/f2", false).unwrap_err();
    assert_eq!(err, FsError::NameCollision("/f2".to_string()));
    assert_eq!(store.find("/f2").unwrap().read(0, 3), b"two");

    store.move_node("/f1", "/f2", true).expect("replace succeeds");
    let moved = store.find("/f2").unwrap();
    assert!(Arc::ptr_eq(&moved, &source));
    assert_eq!(moved.read(0, 3), b"one");
    assert!(store.find("/f1").is_none());
    assert_eq!(store.list_folder("/").len(), 1);
    assert_consistent(&store);
}

#[test]
fn move_onto_read_only_destination_is_denied() {
    let store = Store::new();
    store.add(file("/src")).unwrap();
    let dest = file("/dst");
    dest.set_attributes(FileAttributes::READONLY);
    store.add(dest).unwrap();

    let err = store.move_node("/src", "/dst", true).unwrap_err();
    assert!(matches!(err, FsError::AccessDenied(_)));
    assert!(store.find("/src").is_some());
}

#[test]
fn move_into_missing_parent_leaves_source_untouched() {
    let store = Store::new();
    store.add(file("/f")).unwrap();
    let err = store.move_node("/f", "/no/such/f", false).unwrap_err();
    assert_eq!(err, FsError::ParentPathNotFound("/no/such/f".to_string()));
    assert_eq!(store.find("/f").unwrap().name(), "/f");
    assert_consistent(&store);
}

#[test]
fn move_checks_collision_before_parent() {
    let store = Store::new();
    store.add(file("/a")).unwrap();
    store.add(file("/b")).unwrap();
    // Destination exists, so the collision wins over any later check.
    let err = store.move_node("/a", "/b", false).unwrap_err();
    assert!(matches!(err, FsError::NameCollision(_)));
}

#[test]
fn move_deep_tree_then_remove() {
    let store = Store::new();
    let mut current = String::new();
    for depth in 0..10 {
        current = format!("{current}/d{depth}");
        store.add(dir(&current)).unwrap();
        store.add(file(&format!("{current}/file"))).unwrap();
    }

    store.move_node("/d0", "/moved", false).unwrap();
    assert!(store.find("/moved/d1/d2/d3/d4/d5/d6/d7/d8/d9/file").is_some());
    assert_eq!(store.stats().nodes, 21);
    assert_consistent(&store);

    store.remove("/moved");
    assert_eq!(store.stats().nodes, 1);
    assert_consistent(&store);
}
