//! End-to-end tree hashes for known index contents.
//!
//! Every expected value here is what C git produces for the same staged
//! files, so these pin on-disk compatibility: the entry encoding, the
//! subtree recursion, and the sort order all feed into them.

use grit_hash::{Hasher, ObjectId};
use grit_index::{write_tree, Index, IndexEntry, IndexPath, StatData};
use grit_object::FileMode;
use grit_odb::ObjectStore;

fn blob(content: &str) -> ObjectId {
    Hasher::hash_object("blob", content.as_bytes()).unwrap()
}

fn entry(mode: FileMode, path: &str, content: &str) -> IndexEntry {
    IndexEntry {
        path: IndexPath::new(path).unwrap(),
        oid: blob(content),
        mode,
        stat: StatData {
            size: content.len() as u32,
            ..Default::default()
        },
    }
}

/// Build the index, run the writer against a fresh store, check the root.
fn assert_tree_hash(entries: Vec<IndexEntry>, expected: &str) {
    let dir = tempfile::tempdir().unwrap();
    let store = ObjectStore::open(dir.path().join("objects"));

    let mut index = Index::new();
    for e in entries {
        index.add(e);
    }

    let tree_id = write_tree(&index, &store).unwrap();
    assert_eq!(tree_id.to_hex(), expected);
}

#[test]
fn empty_index() {
    assert_tree_hash(vec![], "4b825dc642cb6eb9a060e54bf8d69288fbee4904");
}

#[test]
fn single_file() {
    assert_tree_hash(
        vec![entry(FileMode::Regular, "foo", "bar\n")],
        "6a09c59ce8eb1b5b4f89450103e67ff9b3a3b1ae",
    );
}

#[test]
fn single_executable() {
    assert_tree_hash(
        vec![entry(FileMode::Executable, "foo", "bar\n")],
        "e10d3585c7b4bec6b573e40d6a0c097a7e790abe",
    );
}

#[test]
fn single_symlink() {
    assert_tree_hash(
        vec![entry(FileMode::Symlink, "bar", "foo")],
        "985badfa7a966612b9f9adadbaa6a30aa3e0b1f5",
    );
}

#[test]
fn two_files() {
    assert_tree_hash(
        vec![
            entry(FileMode::Regular, "bar", "bar\n"),
            entry(FileMode::Regular, "foo", "foo\n"),
        ],
        "89ff1a2aefcbff0f09197f0fd8beeb19a7b6e51c",
    );
}

#[test]
fn file_in_subdirectory() {
    assert_tree_hash(
        vec![entry(FileMode::Regular, "foo/bar", "bar\n")],
        "7b74f9ae4e4f7232e386fd8bcb9a240e6713fadf",
    );
}

#[test]
fn two_files_in_subdirectory() {
    assert_tree_hash(
        vec![
            entry(FileMode::Regular, "foo/bar", "bar\n"),
            entry(FileMode::Regular, "foo/foo", "foo\n"),
        ],
        "e3331a4b901802f18658544c4ae320de93ab14ef",
    );
}

#[test]
fn file_and_subtree() {
    assert_tree_hash(
        vec![
            entry(FileMode::Regular, "bar", "bar\n"),
            entry(FileMode::Regular, "foo/foo", "foo\n"),
        ],
        "17278814743a70ed99aca0271ecdf5b544f10e5b",
    );
}

#[test]
fn file_and_multi_entry_subtree() {
    assert_tree_hash(
        vec![
            entry(FileMode::Regular, "bar", "bar\n"),
            entry(FileMode::Regular, "foo/bar", "bar\n"),
            entry(FileMode::Regular, "foo/foo", "foo\n"),
        ],
        "18473c7faa0d4bb4913fd41a6768dbcf5fa70723",
    );
}

#[test]
fn deep_subtree() {
    assert_tree_hash(
        vec![entry(FileMode::Regular, "foo/bar/baz", "baz\n")],
        "cc1846d0911b1790fd15859ffdf48598cb46b7b0",
    );
}

#[test]
fn two_subtrees() {
    assert_tree_hash(
        vec![
            entry(FileMode::Regular, "bar/bar", "bar\n"),
            entry(FileMode::Regular, "foo/foo", "foo\n"),
        ],
        "65de833961e3dc313b13a2cf0a35a3bab772fc0b",
    );
}

#[test]
fn subtree_then_file() {
    assert_tree_hash(
        vec![
            entry(FileMode::Regular, "bar/bar", "bar\n"),
            entry(FileMode::Regular, "foo", "foo\n"),
        ],
        "615b1bd6b48087f25d16cc78279ea48ce5b1b59d",
    );
}

#[test]
fn three_subtrees() {
    assert_tree_hash(
        vec![
            entry(FileMode::Regular, "bar/bar", "bar\n"),
            entry(FileMode::Regular, "baz/baz", "baz\n"),
            entry(FileMode::Regular, "foo/foo", "foo\n"),
        ],
        "8b9f58ced67de613a7570726233ec83fa56a3d52",
    );
}

#[test]
fn file_between_two_subtrees() {
    assert_tree_hash(
        vec![
            entry(FileMode::Regular, "bar/bar", "bar\n"),
            entry(FileMode::Regular, "baz", "baz\n"),
            entry(FileMode::Regular, "foo/foo", "foo\n"),
        ],
        "18a6e5a95bb59e96dba722025de6abc692661bb6",
    );
}

#[test]
fn deterministic_across_runs() {
    for _ in 0..3 {
        assert_tree_hash(
            vec![
                entry(FileMode::Regular, "bar", "bar\n"),
                entry(FileMode::Regular, "foo/foo", "foo\n"),
            ],
            "17278814743a70ed99aca0271ecdf5b544f10e5b",
        );
    }
}
