//! Store and list file test utilities

use std::path::Path;

use tempfile::TempDir;

use version_watch::config::FilesConfig;

/// Temporary directory holding the list, both stores and the report
pub struct TestFiles {
    pub dir: TempDir,
    pub files: FilesConfig,
}

impl TestFiles {
    pub fn read(&self, path: &Path) -> String {
        std::fs::read_to_string(path).unwrap()
    }
}

/// Creates the identifier list; stores start absent unless given
pub fn create_test_files(
    list: &str,
    records: Option<&str>,
    progress: Option<&str>,
) -> TestFiles {
    let dir = TempDir::new().unwrap();
    let files = FilesConfig {
        packages_list: dir.path().join("packages_list.txt"),
        records: dir.path().join("packages.json"),
        progress: dir.path().join("progress.json"),
        report: dir.path().join("updated_packages.html"),
    };

    std::fs::write(&files.packages_list, list).unwrap();
    if let Some(records) = records {
        std::fs::write(&files.records, records).unwrap();
    }
    if let Some(progress) = progress {
        std::fs::write(&files.progress, progress).unwrap();
    }

    TestFiles { dir, files }
}
