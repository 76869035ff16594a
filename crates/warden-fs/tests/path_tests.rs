use rstest::rstest;
use warden_fs::NormalizedPath;

#[cfg(windows)]
#[test]
fn test_normalize_backslashes_to_forward() {
    let path = NormalizedPath::new("foo\\bar\\baz");
    assert_eq!(path.as_str(), "foo/bar/baz");
}

#[cfg(unix)]
#[test]
fn test_backslash_is_part_of_the_name() {
    let path = NormalizedPath::new("/data/a\\b");
    assert_eq!(path.as_str(), "/data/a\\b");
    assert_eq!(path.file_name(), Some("a\\b"));
    assert!(!path.starts_with(&NormalizedPath::new("/data/a")));
}

#[test]
fn test_normalize_trailing_and_double_slashes() {
    let path = NormalizedPath::new("/data//logs/");
    assert_eq!(path.as_str(), "/data/logs");
}

#[test]
fn test_join_paths() {
    let base = NormalizedPath::new("/foo/bar");
    assert_eq!(base.join("baz").as_str(), "/foo/bar/baz");
    assert_eq!(NormalizedPath::new("/").join("etc").as_str(), "/etc");
}

#[test]
fn test_parent() {
    assert_eq!(NormalizedPath::new("/foo/bar").parent().unwrap().as_str(), "/foo");
    assert_eq!(NormalizedPath::new("/foo").parent().unwrap().as_str(), "/");
    assert!(NormalizedPath::new("/").parent().is_none());
}

#[test]
fn test_file_name_and_extension() {
    let path = NormalizedPath::new("/foo/bar/baz.txt");
    assert_eq!(path.file_name(), Some("baz.txt"));
    assert_eq!(path.extension(), Some("txt"));
    assert_eq!(NormalizedPath::new("/foo/.hidden").extension(), None);
}

#[rstest]
#[case("/data", "/data", true)]
#[case("/data/a.txt", "/data", true)]
#[case("/data/sub/a.txt", "/data/", true)]
#[case("/database", "/data", false)]
#[case("/dat", "/data", false)]
#[case("/etc/passwd", "/", true)]
#[case("relative/x", "/", false)]
fn test_starts_with_is_component_aware(
    #[case] path: &str,
    #[case] prefix: &str,
    #[case] expected: bool,
) {
    let path = NormalizedPath::new(path);
    let prefix = NormalizedPath::new(prefix);
    assert_eq!(path.starts_with(&prefix), expected);
}

#[test]
fn test_matches_any() {
    let prefixes = vec![NormalizedPath::new("/proc"), NormalizedPath::new("/sys")];
    assert!(NormalizedPath::new("/sys/kernel").matches_any(&prefixes));
    assert!(!NormalizedPath::new("/usr/bin").matches_any(&prefixes));
}

#[rstest]
#[case("/data", "/data", Some(0))]
#[case("/data/a", "/data", Some(1))]
#[case("/data/a/b/c", "/data", Some(3))]
#[case("/etc/x", "/", Some(2))]
#[case("/other", "/data", None)]
fn test_depth_below(#[case] path: &str, #[case] root: &str, #[case] expected: Option<usize>) {
    let path = NormalizedPath::new(path);
    let root = NormalizedPath::new(root);
    assert_eq!(path.depth_below(&root), expected);
}

#[test]
fn test_ordering_is_lexicographic() {
    let mut paths = vec![
        NormalizedPath::new("/b"),
        NormalizedPath::new("/a/z"),
        NormalizedPath::new("/a"),
    ];
    paths.sort();
    let sorted: Vec<&str> = paths.iter().map(|p| p.as_str()).collect();
    assert_eq!(sorted, vec!["/a", "/a/z", "/b"]);
}

#[test]
fn test_serde_as_plain_string() {
    let path = NormalizedPath::new("/data//a.txt");
    let json = serde_json::to_string(&path).unwrap();
    assert_eq!(json, "\"/data/a.txt\"");

    let back: NormalizedPath = serde_json::from_str("\"/data/./a.txt\"").unwrap();
    assert_eq!(back, path);
}
