use dupescan::actions::extract::{extract_all, prepare_destination};
use dupescan::duplicates::{DuplicateFinder, FinderConfig};
use filetime::FileTime;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn write_with_mtime(path: &Path, content: &[u8], secs: i64) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
    filetime::set_file_mtime(path, FileTime::from_unix_time(secs, 0)).unwrap();
}

fn scan(root: &Path) -> dupescan::duplicates::ScanResult {
    DuplicateFinder::new(FinderConfig::default().with_detail(0))
        .find_duplicates(root)
        .unwrap()
        .0
}

#[test]
fn test_extract_picks_newest_and_writes_manifest() {
    let src = tempdir().unwrap();
    let dest = tempdir().unwrap();
    let old = src.path().join("2019/photo.jpg");
    let newest = src.path().join("2023/photo.jpg");
    let middle = src.path().join("2021/copy of photo.jpg");
    write_with_mtime(&old, b"jpeg bytes", 1_550_000_000);
    write_with_mtime(&newest, b"jpeg bytes", 1_690_000_000);
    write_with_mtime(&middle, b"jpeg bytes", 1_620_000_000);

    let result = scan(src.path());
    let report = extract_all(&result, dest.path(), None);

    assert_eq!(report.success_count(), 1);
    let extracted = &report.extracted[0];
    assert_eq!(extracted.source, newest);
    assert_eq!(extracted.copy, dest.path().join("photo.jpg"));
    assert_eq!(fs::read(&extracted.copy).unwrap(), b"jpeg bytes");

    let manifest = fs::read_to_string(dest.path().join("photo.jpg-dup-list.txt")).unwrap();
    let mut lines: Vec<&str> = manifest.lines().collect();
    lines.sort();
    let mut expected = vec![old.to_string_lossy().into_owned(), middle.to_string_lossy().into_owned()];
    expected.sort();
    assert_eq!(lines, expected);
    assert!(manifest.ends_with('\n'));
    assert!(!manifest.contains(&*newest.to_string_lossy()));
}

#[test]
fn test_existing_destination_file_is_preserved() {
    let src = tempdir().unwrap();
    let dest = tempdir().unwrap();
    fs::write(dest.path().join("photo.jpg"), b"from an earlier run").unwrap();

    write_with_mtime(&src.path().join("a/photo.jpg"), b"new pixels", 100);
    write_with_mtime(&src.path().join("b/photo.jpg"), b"new pixels", 200);

    let report = extract_all(&scan(src.path()), dest.path(), None);

    assert!(report.all_succeeded());
    assert_eq!(
        fs::read(dest.path().join("photo.jpg")).unwrap(),
        b"from an earlier run"
    );
    assert_eq!(
        fs::read(dest.path().join("photo_1.jpg")).unwrap(),
        b"new pixels"
    );
    assert!(dest.path().join("photo_1.jpg-dup-list.txt").exists());
}

#[test]
fn test_groups_with_same_name_get_distinct_copies() {
    let src = tempdir().unwrap();
    let dest = tempdir().unwrap();
    write_with_mtime(&src.path().join("x/notes.txt"), b"first group", 1);
    write_with_mtime(&src.path().join("y/notes.txt"), b"first group", 2);
    write_with_mtime(&src.path().join("x/sub/notes.txt"), b"second group!", 3);
    write_with_mtime(&src.path().join("y/sub/notes.txt"), b"second group!", 4);

    let report = extract_all(&scan(src.path()), dest.path(), None);

    assert_eq!(report.success_count(), 2);
    assert!(dest.path().join("notes.txt").exists());
    assert!(dest.path().join("notes_1.txt").exists());
    assert!(dest.path().join("notes.txt-dup-list.txt").exists());
    assert!(dest.path().join("notes_1.txt-dup-list.txt").exists());

    let mut contents: Vec<Vec<u8>> = ["notes.txt", "notes_1.txt"]
        .iter()
        .map(|n| fs::read(dest.path().join(n)).unwrap())
        .collect();
    contents.sort();
    assert_eq!(contents, vec![b"first group".to_vec(), b"second group!".to_vec()]);
}

#[test]
fn test_rerun_into_same_destination_never_overwrites() {
    let src = tempdir().unwrap();
    let dest = tempdir().unwrap();
    write_with_mtime(&src.path().join("a/data.bin"), b"bytes", 1);
    write_with_mtime(&src.path().join("b/data.bin"), b"bytes", 2);

    let result = scan(src.path());
    extract_all(&result, dest.path(), None);
    extract_all(&result, dest.path(), None);

    let mut names: Vec<String> = fs::read_dir(dest.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            "data.bin",
            "data.bin-dup-list.txt",
            "data_1.bin",
            "data_1.bin-dup-list.txt"
        ]
    );
}

#[test]
fn test_single_member_groups_are_not_extracted() {
    let src = tempdir().unwrap();
    let dest = tempdir().unwrap();
    fs::write(src.path().join("unique.txt"), b"only me").unwrap();

    let report = extract_all(&scan(src.path()), dest.path(), None);

    assert_eq!(report.success_count(), 0);
    assert_eq!(fs::read_dir(dest.path()).unwrap().count(), 0);
}

#[test]
fn test_prepare_destination_fails_under_a_file() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("plain");
    fs::write(&file, b"x").unwrap();
    assert!(prepare_destination(&file.join("child")).is_err());
}
