use dupescan::duplicates::{DuplicateFinder, FinderConfig};
use dupescan::scanner::{Digester, FileEntry, HashError, Hasher, ScanError};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, SystemTime};
use tempfile::tempdir;

/// Wraps the real hasher and tracks how many digests run at once.
struct CountingDigester {
    inner: Hasher,
    active: AtomicUsize,
    max_seen: AtomicUsize,
    calls: AtomicUsize,
    delay: Duration,
}

impl CountingDigester {
    fn new(delay: Duration) -> Self {
        Self {
            inner: Hasher::new(),
            active: AtomicUsize::new(0),
            max_seen: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
            delay,
        }
    }
}

impl Digester for CountingDigester {
    fn digest(&self, path: &Path) -> Result<String, HashError> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_seen.fetch_max(now, Ordering::SeqCst);
        self.calls.fetch_add(1, Ordering::SeqCst);
        thread::sleep(self.delay);
        let result = self.inner.digest(path);
        self.active.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

/// Returns a digest derived from the name without touching the disk.
struct NameDigester {
    active: AtomicUsize,
    max_seen: AtomicUsize,
}

impl Digester for NameDigester {
    fn digest(&self, path: &Path) -> Result<String, HashError> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_seen.fetch_max(now, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(2));
        self.active.fetch_sub(1, Ordering::SeqCst);
        let name = path.file_name().unwrap().to_string_lossy();
        Ok(name.chars().next().unwrap().to_string())
    }
}

#[test]
fn test_active_hashes_never_exceed_limit() {
    let dir = tempdir().unwrap();
    for i in 0..10 {
        fs::write(dir.path().join(format!("f{i}.txt")), format!("c{}", i % 3)).unwrap();
    }

    let digester = Arc::new(CountingDigester::new(Duration::from_millis(20)));
    let config = FinderConfig::default().with_concurrency(2).with_detail(0);
    let finder = DuplicateFinder::new(config).with_digester(digester.clone());

    let (result, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(digester.calls.load(Ordering::SeqCst), 10);
    assert!(digester.max_seen.load(Ordering::SeqCst) <= 2);
    assert_eq!(digester.active.load(Ordering::SeqCst), 0);
    assert!(summary.peak_concurrency <= 2);
    assert!(summary.peak_concurrency >= 1);
    assert_eq!(summary.hashed_files, 10);
    assert_eq!(result.record_count(), 10);
}

#[test]
fn test_limit_of_one_serializes_hashing() {
    let dir = tempdir().unwrap();
    for i in 0..6 {
        fs::write(dir.path().join(format!("f{i}")), b"same").unwrap();
    }

    let digester = Arc::new(CountingDigester::new(Duration::from_millis(5)));
    let config = FinderConfig::default().with_concurrency(1).with_detail(0);
    let (result, summary) = DuplicateFinder::new(config)
        .with_digester(digester.clone())
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(digester.max_seen.load(Ordering::SeqCst), 1);
    assert_eq!(summary.peak_concurrency, 1);
    assert_eq!(result.duplicate_groups()[0].len(), 6);
}

#[test]
fn test_many_entries_bounded_and_complete() {
    let digester = Arc::new(NameDigester {
        active: AtomicUsize::new(0),
        max_seen: AtomicUsize::new(0),
    });
    let entries: Vec<Result<FileEntry, ScanError>> = (0..200)
        .map(|i| {
            let name = format!("{}{i}", ["a", "b", "c", "d"][i % 4]);
            Ok(FileEntry::new(
                PathBuf::from("/virtual").join(name),
                64,
                SystemTime::UNIX_EPOCH,
            ))
        })
        .collect();

    let config = FinderConfig::default().with_concurrency(3).with_detail(0);
    let (result, summary) = DuplicateFinder::new(config)
        .with_digester(digester.clone())
        .scan_entries(entries)
        .unwrap();

    assert!(digester.max_seen.load(Ordering::SeqCst) <= 3);
    assert_eq!(summary.hashed_files, 200);
    assert_eq!(result.groups.len(), 4);
    assert_eq!(result.duplicate_keys.len(), 4);
    assert!(result.groups.values().all(|g| g.len() == 50));
}

#[test]
fn test_join_barrier_waits_for_slow_tasks() {
    let dir = tempdir().unwrap();
    for i in 0..4 {
        fs::write(dir.path().join(format!("slow{i}")), b"payload").unwrap();
    }

    let digester = Arc::new(CountingDigester::new(Duration::from_millis(50)));
    let config = FinderConfig::default().with_concurrency(4).with_detail(0);
    let (result, _) = DuplicateFinder::new(config)
        .with_digester(digester.clone())
        .find_duplicates(dir.path())
        .unwrap();

    // Nothing is still running once the scan returns.
    assert_eq!(digester.active.load(Ordering::SeqCst), 0);
    assert_eq!(result.record_count(), 4);
}
