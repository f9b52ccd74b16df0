use dupescan::duplicates::{DuplicateFinder, DuplicateKey, FinderConfig};
use dupescan::scanner::{Digester, Hasher, NamePatterns};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn write(path: &Path, content: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    File::create(path).unwrap().write_all(content).unwrap();
}

fn finder() -> DuplicateFinder {
    DuplicateFinder::new(FinderConfig::default().with_detail(0))
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let (result, summary) = finder().find_duplicates(dir.path()).unwrap();

    assert!(result.groups.is_empty());
    assert!(result.duplicate_keys.is_empty());
    assert_eq!(summary.files_walked, 0);
    assert_eq!(summary.duplicate_groups, 0);
}

#[test]
fn test_three_identical_files_form_one_group() {
    let dir = tempdir().unwrap();
    let content = vec![7u8; 10 * 1024];
    write(&dir.path().join("a.bin"), &content);
    write(&dir.path().join("sub/b.bin"), &content);
    write(&dir.path().join("sub/deeper/c.bin"), &content);

    let (result, summary) = finder().find_duplicates(dir.path()).unwrap();

    assert_eq!(result.groups.len(), 1);
    assert_eq!(result.duplicate_keys.len(), 1);
    let group = result.duplicate_groups()[0];
    assert_eq!(group.len(), 3);
    assert_eq!(group.key().size, 10 * 1024);
    assert!(result.is_duplicate(group.key()));
    assert_eq!(summary.duplicate_files, 2);
    assert_eq!(summary.reclaimable_space, 2 * 10 * 1024);
}

#[test]
fn test_group_key_uses_blake3_digest() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a.txt"), b"duplicate");
    write(&dir.path().join("b.txt"), b"duplicate");

    let (result, _) = finder().find_duplicates(dir.path()).unwrap();

    let expected = DuplicateKey::new(9, blake3::hash(b"duplicate").to_hex().to_string());
    assert!(result.is_duplicate(&expected));
    assert_eq!(
        Hasher::new().digest(&dir.path().join("a.txt")).unwrap(),
        expected.digest
    );
}

#[test]
fn test_zero_length_file_only_in_zero_list() {
    let dir = tempdir().unwrap();
    let empty = dir.path().join("empty.txt");
    File::create(&empty).unwrap();
    write(&dir.path().join("other.txt"), b"x");

    let (result, summary) = finder().find_duplicates(dir.path()).unwrap();

    assert_eq!(result.zero_length_paths, vec![empty.clone()]);
    assert!(result.group_of(&empty).is_none());
    assert!(result.groups.keys().all(|k| k.size > 0));
    assert_eq!(summary.zero_length_files, 1);
}

#[test]
fn test_multiple_empty_files_are_not_duplicates() {
    let dir = tempdir().unwrap();
    for name in ["a", "b", "c"] {
        File::create(dir.path().join(name)).unwrap();
    }

    let (result, _) = finder().find_duplicates(dir.path()).unwrap();

    assert!(result.groups.is_empty());
    assert!(result.duplicate_keys.is_empty());
    assert_eq!(result.zero_length_paths.len(), 3);
}

#[test]
fn test_same_size_different_content() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a.txt"), b"content a");
    write(&dir.path().join("b.txt"), b"content b");

    let (result, _) = finder().find_duplicates(dir.path()).unwrap();

    assert_eq!(result.groups.len(), 2);
    assert!(result.duplicate_keys.is_empty());
    assert!(result.groups.values().all(|g| g.len() == 1));
}

#[test]
fn test_oversize_files_are_listed_not_hashed() {
    let dir = tempdir().unwrap();
    let big_a = dir.path().join("big_a.bin");
    let big_b = dir.path().join("big_b.bin");
    write(&big_a, &[1u8; 200]);
    write(&big_b, &[1u8; 200]);
    write(&dir.path().join("small_a.bin"), &[2u8; 100]);
    write(&dir.path().join("small_b.bin"), &[2u8; 100]);

    let config = FinderConfig::default()
        .with_detail(0)
        .with_max_size(Some(100));
    let (result, summary) = DuplicateFinder::new(config)
        .find_duplicates(dir.path())
        .unwrap();

    let mut oversize = result.oversize_paths.clone();
    oversize.sort();
    assert_eq!(oversize, vec![big_a.clone(), big_b.clone()]);
    assert!(result.group_of(&big_a).is_none());
    assert!(result.groups.keys().all(|k| k.size <= 100));
    assert_eq!(result.duplicate_keys.len(), 1);
    assert_eq!(summary.oversize_files, 2);
    assert_eq!(summary.eligible_files, 2);
}

#[test]
fn test_zero_ceiling_means_unlimited() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a"), &[0u8; 4096]);

    let config = FinderConfig::default().with_detail(0).with_max_size(Some(0));
    let (result, _) = DuplicateFinder::new(config)
        .find_duplicates(dir.path())
        .unwrap();

    assert!(result.oversize_paths.is_empty());
    assert_eq!(result.record_count(), 1);
}

#[test]
fn test_name_patterns_match_base_name() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("photos.jpg/a.txt"), b"same");
    write(&dir.path().join("x/b.txt"), b"same");
    write(&dir.path().join("one.jpg"), b"pic");
    write(&dir.path().join("two.JPG"), b"pic");
    write(&dir.path().join("three.png"), b"pic");

    let patterns = NamePatterns::compile(&[r"(?i)\.jpg$"]).unwrap();
    let config = FinderConfig::default().with_detail(0).with_patterns(patterns);
    let (result, summary) = DuplicateFinder::new(config)
        .find_duplicates(dir.path())
        .unwrap();

    // Directory names never count, only the file's own name.
    assert_eq!(result.record_count(), 2);
    assert_eq!(result.duplicate_keys.len(), 1);
    let paths: Vec<PathBuf> = result.duplicate_groups()[0]
        .sorted_paths()
        .into_iter()
        .map(Path::to_path_buf)
        .collect();
    assert_eq!(
        paths,
        vec![dir.path().join("one.jpg"), dir.path().join("two.JPG")]
    );
    assert_eq!(summary.skipped_by_pattern, 3);
}

#[test]
fn test_multiple_patterns_are_ored() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a.png"), b"img");
    write(&dir.path().join("b.gif"), b"img");
    write(&dir.path().join("c.txt"), b"img");

    let patterns = NamePatterns::compile(&[r"\.png$", r"\.gif$"]).unwrap();
    let config = FinderConfig::default().with_detail(0).with_patterns(patterns);
    let (result, _) = DuplicateFinder::new(config)
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(result.duplicate_groups()[0].len(), 2);
    assert!(result.group_of(&dir.path().join("c.txt")).is_none());
}

#[cfg(unix)]
#[test]
fn test_symlinks_are_not_hashed() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("target.txt");
    write(&target, b"linked content");
    std::os::unix::fs::symlink(&target, dir.path().join("link.txt")).unwrap();

    let (result, summary) = finder().find_duplicates(dir.path()).unwrap();

    assert_eq!(result.record_count(), 1);
    assert!(result.duplicate_keys.is_empty());
    assert_eq!(summary.skipped_non_regular, 1);
}

#[test]
fn test_rescan_gives_same_membership() {
    let dir = tempdir().unwrap();
    for i in 0..20 {
        write(
            &dir.path().join(format!("d{}/f{i}.dat", i % 4)),
            format!("content {}", i % 5).as_bytes(),
        );
    }

    let membership = |concurrency: usize| {
        let config = FinderConfig::default()
            .with_detail(0)
            .with_concurrency(concurrency);
        let (result, _) = DuplicateFinder::new(config)
            .find_duplicates(dir.path())
            .unwrap();
        let mut groups: Vec<Vec<PathBuf>> = result
            .duplicate_groups()
            .iter()
            .map(|g| g.sorted_paths().into_iter().map(Path::to_path_buf).collect())
            .collect();
        groups.sort();
        groups
    };

    let serial = membership(1);
    assert_eq!(serial.len(), 5);
    assert_eq!(serial, membership(8));
}

#[test]
fn test_missing_root_is_fatal() {
    let dir = tempdir().unwrap();
    let err = finder()
        .find_duplicates(&dir.path().join("nope"))
        .unwrap_err();
    assert!(err.to_string().contains("Path not found"));
}
