use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
    time::{Duration, SystemTime},
};

use async_trait::async_trait;
use tempfile::TempDir;

use crate::{
    dependencies::{CandidateLocator, ClipboardSource, GrabDependencies},
    locate::FileLocator,
    pipeline::{GrabRequest, perform_grab},
    relocate::{
        Relocator,
        temp::TempAllocator,
        trash::{FlatTrash, Trasher},
    },
    types::{FileCandidate, GrabError, Location, SourceLabel},
};

#[derive(Clone)]
struct MockClipboard {
    data: Option<Vec<u8>>,
    calls: Arc<Mutex<usize>>,
}

#[async_trait]
impl ClipboardSource for MockClipboard {
    async fn capture(&self) -> Result<Vec<u8>, GrabError> {
        *self.calls.lock().unwrap() += 1;
        self.data.clone().ok_or(GrabError::NotFound)
    }
}

/// Scans a fixed directory, as if it were the resolved Desktop / Downloads.
#[derive(Clone)]
struct MockLocator {
    dir: PathBuf,
    calls: Arc<Mutex<Vec<Location>>>,
}

impl CandidateLocator for MockLocator {
    fn locate(&self, location: Location) -> Result<FileCandidate, GrabError> {
        self.calls.lock().unwrap().push(location);
        FileLocator::default().locate(&self.dir, location)
    }
}

struct FailingTrasher;

impl Trasher for FailingTrasher {
    fn trash(&self, path: &Path) -> Result<PathBuf, GrabError> {
        Err(GrabError::Trash(format!(
            "permission denied: {}",
            path.display()
        )))
    }
}

struct Harness {
    root: TempDir,
    clipboard: MockClipboard,
    locator: MockLocator,
}

impl Harness {
    fn new(clipboard: Option<&[u8]>) -> Self {
        let root = TempDir::new().unwrap();
        for dir in ["files", "tmp"] {
            fs::create_dir(root.path().join(dir)).unwrap();
        }
        let locator = MockLocator {
            dir: root.path().join("files"),
            calls: Arc::new(Mutex::new(Vec::new())),
        };
        Self {
            root,
            clipboard: MockClipboard {
                data: clipboard.map(<[u8]>::to_vec),
                calls: Arc::new(Mutex::new(0)),
            },
            locator,
        }
    }

    fn file(&self, name: &str, age: Duration) -> PathBuf {
        let path = self.root.path().join("files").join(name);
        fs::write(&path, name.as_bytes()).unwrap();
        fs::File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(SystemTime::now() - age)
            .unwrap();
        path
    }

    fn trash_dir(&self) -> PathBuf {
        self.root.path().join(".Trash")
    }

    fn dependencies(&self, trasher: Arc<dyn Trasher>) -> Arc<GrabDependencies> {
        Arc::new(GrabDependencies {
            clipboard: Arc::new(self.clipboard.clone()),
            locator: Arc::new(self.locator.clone()),
            trasher,
            relocator: Arc::new(Relocator::new(TempAllocator::in_dir(
                self.root.path().join("tmp"),
                "grab",
            ))),
        })
    }

    fn flat_trash(&self) -> Arc<dyn Trasher> {
        Arc::new(FlatTrash::new(self.trash_dir()))
    }

    fn temp_entries(&self) -> usize {
        fs::read_dir(self.root.path().join("tmp")).unwrap().count()
    }
}

fn request(location: Location) -> GrabRequest {
    GrabRequest {
        location,
        ..GrabRequest::default()
    }
}

#[tokio::test]
async fn desktop_screenshot_is_copied_and_trashed() {
    let harness = Harness::new(None);
    harness.file("photo.jpg", Duration::from_secs(7200));
    let shot = harness.file("Screenshot 2024-01-01.png", Duration::from_secs(60));

    let outcome = perform_grab(
        request(Location::Desktop),
        harness.dependencies(harness.flat_trash()),
    )
    .await
    .unwrap();

    assert_eq!(outcome.source, SourceLabel::File(shot.clone()));
    assert_eq!(outcome.temp_path.extension().unwrap(), "png");
    assert_eq!(
        fs::read(&outcome.temp_path).unwrap(),
        b"Screenshot 2024-01-01.png"
    );
    assert!(!shot.exists());
    assert_eq!(
        fs::read(harness.trash_dir().join("Screenshot 2024-01-01.png")).unwrap(),
        b"Screenshot 2024-01-01.png"
    );
}

#[tokio::test]
async fn trash_failure_keeps_original_and_leaves_no_temp_file() {
    let harness = Harness::new(None);
    let shot = harness.file("Screenshot.png", Duration::from_secs(5));

    let err = perform_grab(
        request(Location::Desktop),
        harness.dependencies(Arc::new(FailingTrasher)),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, GrabError::Trash(_)));
    assert_eq!(fs::read(&shot).unwrap(), b"Screenshot.png");
    assert_eq!(harness.temp_entries(), 0);
}

#[tokio::test]
async fn fresh_download_beats_clipboard_and_is_moved() {
    let harness = Harness::new(Some(b"clipboard-bytes"));
    let download = harness.file("image.jpeg", Duration::from_secs(2));

    let outcome = perform_grab(
        request(Location::Downloads),
        harness.dependencies(harness.flat_trash()),
    )
    .await
    .unwrap();

    assert_eq!(outcome.source, SourceLabel::File(download.clone()));
    assert_eq!(outcome.temp_path.extension().unwrap(), "jpeg");
    assert!(!download.exists());
    assert!(!harness.trash_dir().exists());
    assert_eq!(*harness.locator.calls.lock().unwrap(), [Location::Downloads]);
}

#[tokio::test]
async fn stale_file_loses_to_clipboard() {
    let harness = Harness::new(Some(b"clipboard-bytes"));
    let old = harness.file("Screenshot old.png", Duration::from_secs(31));

    let outcome = perform_grab(
        request(Location::Desktop),
        harness.dependencies(harness.flat_trash()),
    )
    .await
    .unwrap();

    assert_eq!(outcome.source, SourceLabel::Clipboard);
    assert_eq!(outcome.temp_path.extension().unwrap(), "png");
    assert_eq!(fs::read(&outcome.temp_path).unwrap(), b"clipboard-bytes");
    assert!(old.exists());
}

#[tokio::test]
async fn clipboard_only_never_looks_at_files() {
    let harness = Harness::new(Some(b"clip"));
    let shot = harness.file("Screenshot.png", Duration::ZERO);

    let outcome = perform_grab(
        GrabRequest {
            clipboard_only: true,
            ..GrabRequest::default()
        },
        harness.dependencies(harness.flat_trash()),
    )
    .await
    .unwrap();

    assert_eq!(outcome.source, SourceLabel::Clipboard);
    assert!(shot.exists());
    assert!(harness.locator.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn clipboard_only_without_image_is_not_found() {
    let harness = Harness::new(None);
    harness.file("Screenshot.png", Duration::ZERO);

    let err = perform_grab(
        GrabRequest {
            clipboard_only: true,
            ..GrabRequest::default()
        },
        harness.dependencies(harness.flat_trash()),
    )
    .await
    .unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(*harness.clipboard.calls.lock().unwrap(), 1);
}

#[tokio::test]
async fn nothing_anywhere_is_not_found() {
    let harness = Harness::new(None);
    harness.file("notes.txt", Duration::ZERO);

    let err = perform_grab(
        request(Location::Desktop),
        harness.dependencies(harness.flat_trash()),
    )
    .await
    .unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(harness.temp_entries(), 0);
}
