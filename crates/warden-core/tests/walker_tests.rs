//! Integration tests for PolicyWalker against real directory trees

use pretty_assertions::assert_eq;
use rstest::rstest;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use warden_core::metrics::names;
use warden_core::{
    ContentHasher, Error, File, Fingerprint, Metrics, Notification, PolicyWalker, Severity, Walk,
    WalkObserver, WalkOptions,
};
use warden_fs::NormalizedPath;
use warden_test_utils::TestTree;

fn run(policy: warden_core::Policy) -> (Walk, Metrics) {
    let metrics = Metrics::new();
    let walk = PolicyWalker::new(policy, &metrics).run().unwrap();
    (walk, metrics)
}

fn paths(walk: &Walk) -> BTreeSet<NormalizedPath> {
    walk.files().iter().map(|f| f.path.clone()).collect()
}

fn sample_tree() -> TestTree {
    let tree = TestTree::new();
    tree.file("data/a.txt", "hello")
        .file("data/sub/b.txt", "world")
        .dir("data/empty");
    tree
}

#[test]
fn records_every_entry_below_root() {
    let tree = sample_tree();
    let (walk, metrics) = run(tree.policy(&["data"]));

    let expected: BTreeSet<_> = [
        "data",
        "data/a.txt",
        "data/empty",
        "data/sub",
        "data/sub/b.txt",
    ]
    .iter()
    .map(|p| tree.npath(p))
    .collect();
    assert_eq!(paths(&walk), expected);

    assert_eq!(metrics.get(names::WALK_ROOT_COUNT), Some(1));
    assert_eq!(metrics.get(names::DIR_COUNT), Some(3));
    assert_eq!(metrics.get(names::FILE_COUNT), Some(2));
    assert!(walk.notifications().is_empty());
    assert!(walk.stop_walk() >= walk.start_walk());
}

#[test]
fn file_metadata_is_recorded() {
    let tree = sample_tree();
    let (walk, _) = run(tree.policy(&["data"]));

    let a = walk.file(&tree.npath("data/a.txt")).unwrap();
    assert_eq!(a.info.name, "a.txt");
    assert_eq!(a.info.size, 5);
    assert!(!a.info.is_dir);
    assert!(a.fingerprint.is_none());

    let sub = walk.file(&tree.npath("data/sub")).unwrap();
    assert!(sub.info.is_dir);
}

#[test]
fn exclusion_skips_whole_subtree() {
    let tree = sample_tree();
    let mut policy = tree.policy(&["data"]);
    policy.exclude = vec![tree.npath("data/sub")];

    let (walk, metrics) = run(policy);

    let recorded = paths(&walk);
    assert!(!recorded.contains(&tree.npath("data/sub")));
    assert!(!recorded.contains(&tree.npath("data/sub/b.txt")));
    assert!(recorded.contains(&tree.npath("data/a.txt")));
    assert_eq!(metrics.get(names::PATH_EXCLUDED), Some(1));
}

#[test]
fn exclusion_is_component_aware() {
    let tree = TestTree::new();
    tree.file("data/log/x", "1").file("data/logs/y", "2");
    let mut policy = tree.policy(&["data"]);
    policy.exclude = vec![tree.npath("data/log")];

    let (walk, _) = run(policy);

    assert!(walk.file(&tree.npath("data/logs/y")).is_some());
    assert!(walk.file(&tree.npath("data/log/x")).is_none());
}

#[test]
fn excluded_root_records_nothing() {
    let tree = sample_tree();
    let mut policy = tree.policy(&["data"]);
    policy.exclude = vec![tree.npath("data")];

    let (walk, metrics) = run(policy);

    assert!(walk.files().is_empty());
    assert_eq!(metrics.get(names::PATH_EXCLUDED), Some(1));
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(3)]
fn depth_limit_bounds_recorded_paths(#[case] depth: u32) {
    let tree = TestTree::new();
    tree.file("data/l1/l2/l3/f.txt", "deep").file("data/top.txt", "top");
    let mut policy = tree.policy(&["data"]);
    policy.max_directory_depth = depth;
    let root = tree.npath("data");

    let (walk, _) = run(policy);

    let deepest = walk
        .files()
        .iter()
        .map(|f| f.path.depth_below(&root).unwrap())
        .max()
        .unwrap();
    assert_eq!(deepest, depth as usize);
    assert!(walk.file(&tree.npath("data/top.txt")).is_some());
}

#[test]
fn unlimited_depth_reaches_bottom() {
    let tree = TestTree::new();
    tree.file("data/l1/l2/l3/f.txt", "deep");
    let (walk, _) = run(tree.policy(&["data"]));
    assert!(walk.file(&tree.npath("data/l1/l2/l3/f.txt")).is_some());
}

#[test]
fn hashes_regular_files_under_hash_prefix() {
    let tree = TestTree::new();
    tree.file("data/etc/conf", "key=value").file("data/var/log", "noise");
    let mut policy = tree.policy(&["data"]);
    policy.hash = vec![tree.npath("data/etc")];

    let (walk, metrics) = run(policy);

    let conf = walk.file(&tree.npath("data/etc/conf")).unwrap();
    assert_eq!(conf.fingerprint, Some(Fingerprint::of_bytes(b"key=value")));
    let log = walk.file(&tree.npath("data/var/log")).unwrap();
    assert!(log.fingerprint.is_none());
    let dir = walk.file(&tree.npath("data/etc")).unwrap();
    assert!(dir.fingerprint.is_none());
    assert_eq!(metrics.get(names::FILE_HASH_COUNT), Some(1));
}

#[test]
fn oversized_file_is_recorded_with_warning() {
    let tree = TestTree::new();
    tree.file("data/big", "0123456789").file("data/small", "0123");
    let mut policy = tree.policy(&["data"]);
    policy.hash = vec![tree.npath("data")];
    policy.max_hash_file_size = 4;

    let (walk, metrics) = run(policy);

    let big = walk.file(&tree.npath("data/big")).unwrap();
    assert!(big.fingerprint.is_none());
    let small = walk.file(&tree.npath("data/small")).unwrap();
    assert!(small.fingerprint.is_some());

    let warnings: Vec<&Notification> = walk
        .notifications()
        .iter()
        .filter(|n| n.severity == Severity::Warning)
        .collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].path, tree.npath("data/big"));
    assert_eq!(metrics.get(names::FILE_HASH_OVERSIZED), Some(1));
    assert_eq!(metrics.get(names::NOTIFICATION_WARNING), Some(1));
}

#[test]
fn max_hash_size_override_is_applied_and_recorded() {
    let tree = TestTree::new();
    tree.file("data/f", "0123456789");
    let mut policy = tree.policy(&["data"]);
    policy.hash = vec![tree.npath("data")];
    policy.max_hash_file_size = 4;

    let metrics = Metrics::new();
    let walk = PolicyWalker::new(policy, &metrics)
        .with_options(WalkOptions {
            max_hash_file_size: Some(100),
            ..WalkOptions::default()
        })
        .run()
        .unwrap();

    assert!(walk.file(&tree.npath("data/f")).unwrap().fingerprint.is_some());
    assert_eq!(walk.policy().max_hash_file_size, 100);
}

#[cfg(unix)]
#[rstest]
#[case(false, true)]
#[case(true, false)]
fn symlinks_are_irregular(#[case] ignore_irregular: bool, #[case] recorded: bool) {
    let tree = TestTree::new();
    tree.file("data/a.txt", "hello").symlink("a.txt", "data/link");
    let mut policy = tree.policy(&["data"]);
    policy.hash = vec![tree.npath("data")];
    policy.ignore_irregular_files = ignore_irregular;

    let (walk, metrics) = run(policy);

    let link = walk.file(&tree.npath("data/link"));
    assert_eq!(link.is_some(), recorded);
    if let Some(link) = link {
        assert!(link.fingerprint.is_none());
    }
    let counter = if ignore_irregular {
        names::IRREGULAR_IGNORED
    } else {
        names::IRREGULAR_COUNT
    };
    assert_eq!(metrics.get(counter), Some(1));
}

#[cfg(unix)]
#[test]
fn symlinked_root_is_not_followed() {
    let tree = TestTree::new();
    tree.file("real/a.txt", "hello");
    tree.symlink(tree.path("real").to_str().unwrap(), "link");

    let (walk, metrics) = run(tree.policy(&["link"]));

    assert_eq!(walk.files().len(), 1);
    let link = walk.file(&tree.npath("link")).unwrap();
    assert!(!link.info.is_dir);
    assert!(walk.file(&tree.npath("link/a.txt")).is_none());
    assert_eq!(metrics.get(names::IRREGULAR_COUNT), Some(1));
}

#[cfg(unix)]
#[test]
fn backslash_names_do_not_collide_with_directories() {
    let tree = TestTree::new();
    tree.file("data/a/b", "nested").file("data/a\\b", "flat");

    let (walk, _) = run(tree.policy(&["data"]));

    assert_eq!(paths(&walk).len(), walk.files().len());
    let nested = walk.file(&tree.npath("data/a/b")).unwrap();
    let flat = walk.file(&tree.npath("data/a\\b")).unwrap();
    assert_eq!(nested.info.size, 6);
    assert_eq!(flat.info.size, 4);
    assert_eq!(flat.info.name, "a\\b");
}

#[cfg(target_os = "linux")]
#[test]
fn non_unicode_name_is_reported_not_recorded() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let tree = TestTree::new();
    tree.file("data/ok.txt", "ok");
    let bad = tree.path("data").join(OsStr::from_bytes(b"bad\xff"));
    std::fs::create_dir(&bad).unwrap();
    std::fs::write(bad.join("inner"), "x").unwrap();

    let (walk, metrics) = run(tree.policy(&["data"]));

    assert_eq!(paths(&walk).len(), walk.files().len());
    assert_eq!(walk.files().len(), 2);
    assert!(walk.file(&tree.npath("data/ok.txt")).is_some());
    let errors: Vec<_> = walk
        .notifications()
        .iter()
        .filter(|n| n.severity == Severity::Error)
        .collect();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("not valid Unicode"));
    assert_eq!(metrics.get(names::PATH_NOT_UNICODE), Some(1));
}

struct FailingHasher;

impl ContentHasher for FailingHasher {
    fn fingerprint(&self, path: &std::path::Path) -> warden_fs::Result<Fingerprint> {
        Err(warden_fs::Error::Io {
            path: path.to_path_buf(),
            source: std::io::Error::other("device went away"),
        })
    }
}

#[test]
fn hash_failure_keeps_record_without_fingerprint() {
    let tree = TestTree::new();
    tree.file("data/etc/conf", "key=value");
    let mut policy = tree.policy(&["data"]);
    policy.hash = vec![tree.npath("data")];

    let metrics = Metrics::new();
    let walk = PolicyWalker::new(policy, &metrics)
        .with_hasher(&FailingHasher)
        .run()
        .unwrap();

    let conf = walk.file(&tree.npath("data/etc/conf")).unwrap();
    assert!(conf.fingerprint.is_none());
    assert_eq!(conf.info.size, 9);
    assert_eq!(walk.notifications().len(), 1);
    let error = &walk.notifications()[0];
    assert_eq!(error.severity, Severity::Error);
    assert_eq!(error.path, tree.npath("data/etc/conf"));
    assert!(error.message.contains("device went away"), "{}", error.message);
    assert_eq!(metrics.get(names::FILE_HASH_FAILED), Some(1));
    assert_eq!(metrics.get(names::FILE_HASH_COUNT), None);
    assert_eq!(metrics.get(names::NOTIFICATION_ERROR), Some(1));
}

#[cfg(unix)]
#[test]
fn unreadable_directory_is_reported_and_walk_continues() {
    use std::os::unix::fs::PermissionsExt;

    let tree = TestTree::new();
    tree.file("data/a.txt", "a").file("data/locked/hidden", "h");
    let locked = tree.path("data/locked");
    std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();
    if std::fs::read_dir(&locked).is_ok() {
        // Permission bits do not bind this user (root); nothing to observe.
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let (walk, metrics) = run(tree.policy(&["data"]));
    std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();

    assert!(walk.file(&tree.npath("data/a.txt")).is_some());
    assert!(walk.file(&tree.npath("data/locked/hidden")).is_none());
    let errors: Vec<_> = walk
        .notifications()
        .iter()
        .filter(|n| n.severity == Severity::Error)
        .collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].path, tree.npath("data/locked"));
    assert_eq!(metrics.get(names::STAT_FAILED), Some(1));
}

#[test]
fn nested_roots_are_rejected() {
    let tree = sample_tree();
    let metrics = Metrics::new();
    let err = PolicyWalker::new(tree.policy(&["data", "data/sub"]), &metrics)
        .run()
        .unwrap_err();
    assert!(matches!(err, Error::InvalidPolicy { .. }));
}

#[test]
fn missing_root_is_an_error_notification() {
    let tree = sample_tree();
    let (walk, metrics) = run(tree.policy(&["data", "missing"]));

    let errors: Vec<_> = walk
        .notifications()
        .iter()
        .filter(|n| n.severity == Severity::Error)
        .collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].path, tree.npath("missing"));
    assert!(walk.file(&tree.npath("data/a.txt")).is_some());
    assert_eq!(metrics.get(names::STAT_FAILED), Some(1));
    assert_eq!(metrics.get(names::WALK_ROOT_COUNT), Some(2));
}

#[test]
fn several_roots_on_several_workers() {
    let tree = TestTree::new();
    for root in ["r1", "r2", "r3"] {
        tree.file(&format!("{root}/f.txt"), root);
    }
    let metrics = Metrics::new();
    let walk = PolicyWalker::new(tree.policy(&["r1", "r2", "r3"]), &metrics)
        .with_options(WalkOptions {
            workers: Some(2),
            hostname: Some("h1".into()),
            ..WalkOptions::default()
        })
        .run()
        .unwrap();

    assert_eq!(walk.hostname(), "h1");
    assert_eq!(walk.files().len(), 6);
    assert_eq!(metrics.get(names::WALK_ROOT_COUNT), Some(3));
}

#[derive(Default)]
struct CountingObserver {
    files: AtomicUsize,
    notifications: AtomicUsize,
}

impl WalkObserver for CountingObserver {
    fn on_file(&self, _file: &File) {
        self.files.fetch_add(1, Ordering::SeqCst);
    }

    fn on_notification(&self, _notification: &Notification) {
        self.notifications.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn observer_sees_every_record() {
    let tree = sample_tree();
    let observer = CountingObserver::default();
    let metrics = Metrics::new();

    let walk = PolicyWalker::new(tree.policy(&["data", "missing"]), &metrics)
        .with_observer(&observer)
        .run()
        .unwrap();

    assert_eq!(observer.files.load(Ordering::SeqCst), walk.files().len());
    assert_eq!(
        observer.notifications.load(Ordering::SeqCst),
        walk.notifications().len()
    );
}

#[test]
fn walk_ids_are_unique() {
    let tree = sample_tree();
    let (first, _) = run(tree.policy(&["data"]));
    let (second, _) = run(tree.policy(&["data"]));
    assert_ne!(first.id(), second.id());
}
