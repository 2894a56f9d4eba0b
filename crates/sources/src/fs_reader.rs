//! File reader backed by `tokio::fs`, sandboxed to the project root.

use crate::sandbox::resolve_in_root;
use async_trait::async_trait;
use ctxpack_core::collaborator::{FileContent, FileReader};
use ctxpack_core::error::CollaboratorError;
use ctxpack_core::language::Language;
use std::path::PathBuf;
use tracing::debug;

/// Files larger than this are refused rather than read into memory.
pub const DEFAULT_MAX_FILE_BYTES: u64 = 1024 * 1024;

pub struct FsFileReader {
    root: PathBuf,
    max_bytes: u64,
}

impl FsFileReader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max_bytes: DEFAULT_MAX_FILE_BYTES,
        }
    }

    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }
}

#[async_trait]
impl FileReader for FsFileReader {
    /// Read `path` (relative to the root, or absolute inside it).
    ///
    /// `start_line`/`end_line` are 1-based and inclusive. `line_count` and
    /// `byte_size` always describe the whole file.
    async fn read(
        &self,
        path: &str,
        start_line: Option<usize>,
        end_line: Option<usize>,
    ) -> Result<FileContent, CollaboratorError> {
        let resolved = resolve_in_root(&self.root, path).await?;
        let meta = tokio::fs::metadata(&resolved)
            .await
            .map_err(|e| CollaboratorError::from_io(path, &e))?;
        if !meta.is_file() {
            return Err(CollaboratorError::NotFound(path.into()));
        }
        if meta.len() > self.max_bytes {
            return Err(CollaboratorError::Backend(format!(
                "{path}: {} bytes exceeds the {} byte limit",
                meta.len(),
                self.max_bytes
            )));
        }

        let bytes = tokio::fs::read(&resolved)
            .await
            .map_err(|e| CollaboratorError::from_io(path, &e))?;
        let byte_size = bytes.len();
        let text = String::from_utf8(bytes)
            .map_err(|_| CollaboratorError::Backend(format!("{path}: not valid UTF-8")))?;

        let line_count = text.lines().count();
        let content = match (start_line, end_line) {
            (None, None) => text,
            (start, end) => slice_lines(&text, start.unwrap_or(1), end.unwrap_or(line_count)),
        };

        debug!(path, line_count, byte_size, "File read");
        Ok(FileContent {
            path: path.to_string(),
            content,
            language: Language::from_path(&resolved).name().map(String::from),
            line_count,
            byte_size,
        })
    }
}

/// Lines `start..=end` (1-based), each newline-terminated.
fn slice_lines(text: &str, start: usize, end: usize) -> String {
    let start = start.max(1);
    if end < start {
        return String::new();
    }
    text.lines()
        .skip(start - 1)
        .take(end - start + 1)
        .map(|line| format!("{line}\n"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("src")).unwrap();
        std::fs::write(
            dir.path().join("src/app.ts"),
            "line one\nline two\nline three\nline four\n",
        )
        .unwrap();
        dir
    }

    #[tokio::test]
    async fn reads_whole_file_with_metadata() {
        let dir = project();
        let reader = FsFileReader::new(dir.path());
        let file = reader.read("src/app.ts", None, None).await.unwrap();

        assert_eq!(file.path, "src/app.ts");
        assert_eq!(file.line_count, 4);
        assert_eq!(file.byte_size, 39);
        assert_eq!(file.language.as_deref(), Some("typescript"));
        assert!(file.content.starts_with("line one\n"));
    }

    #[tokio::test]
    async fn reads_an_inclusive_line_range() {
        let dir = project();
        let reader = FsFileReader::new(dir.path());

        let file = reader.read("src/app.ts", Some(2), Some(3)).await.unwrap();
        assert_eq!(file.content, "line two\nline three\n");
        assert_eq!(file.line_count, 4);

        let tail = reader.read("src/app.ts", Some(4), None).await.unwrap();
        assert_eq!(tail.content, "line four\n");

        let past_end = reader.read("src/app.ts", Some(9), None).await.unwrap();
        assert!(past_end.content.is_empty());
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let dir = project();
        let reader = FsFileReader::new(dir.path());
        let err = reader.read("src/missing.ts", None, None).await.unwrap_err();
        assert!(matches!(err, CollaboratorError::NotFound(_)));
    }

    #[tokio::test]
    async fn directories_are_not_files() {
        let dir = project();
        let reader = FsFileReader::new(dir.path());
        let err = reader.read("src", None, None).await.unwrap_err();
        assert!(matches!(err, CollaboratorError::NotFound(_)));
    }

    #[tokio::test]
    async fn traversal_is_denied() {
        let dir = project();
        let reader = FsFileReader::new(dir.path().join("src"));
        let err = reader.read("../src/app.ts", None, None).await.unwrap_err();
        assert!(matches!(err, CollaboratorError::PermissionDenied { .. }));
    }

    #[tokio::test]
    async fn oversized_and_binary_files_are_refused() {
        let dir = project();
        std::fs::write(dir.path().join("blob.bin"), [0xff, 0xfe, 0x00, 0x01]).unwrap();

        let reader = FsFileReader::new(dir.path()).with_max_bytes(8);
        let err = reader.read("src/app.ts", None, None).await.unwrap_err();
        assert!(err.to_string().contains("byte limit"));

        let err = reader.read("blob.bin", None, None).await.unwrap_err();
        assert!(err.to_string().contains("not valid UTF-8"));
    }
}
