//! 입력 문서 수집
//!
//! `split` 명령에 넘길 SDS 문서(텍스트, PDF)를 파일 하나 또는 폴더 트리에서 찾습니다.
//! 폴더 탐색은 ignore 크레이트로 하며 결과는 경로순으로 정렬됩니다.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use ignore::{DirEntry, WalkBuilder};

// ============================================================================
// File Types
// ============================================================================

/// 입력 문서 형식
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    /// 이미 텍스트로 된 문서 (.txt, .text, .md)
    Text,
    Pdf,
}

impl FileType {
    pub fn from_extension(ext: &str) -> Option<Self> {
        if ["txt", "text", "md"].iter().any(|e| ext.eq_ignore_ascii_case(e)) {
            Some(FileType::Text)
        } else if ext.eq_ignore_ascii_case("pdf") {
            Some(FileType::Pdf)
        } else {
            None
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        extension_of(path).and_then(Self::from_extension)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Text => "TXT",
            FileType::Pdf => "PDF",
        }
    }
}

fn extension_of(path: &Path) -> Option<&str> {
    path.extension().and_then(|ext| ext.to_str())
}

// ============================================================================
// Collected File
// ============================================================================

/// 분할 대상 문서
#[derive(Debug, Clone)]
pub struct CollectedFile {
    /// 절대 경로
    pub path: PathBuf,
    pub file_type: FileType,
    /// 바이트 크기
    pub size: u64,
}

impl CollectedFile {
    /// 지원하는 형식의 일반 파일이면 `Some`
    fn inspect(path: PathBuf) -> Result<Option<Self>> {
        let Some(file_type) = FileType::from_path(&path) else {
            return Ok(None);
        };

        let metadata =
            std::fs::metadata(&path).with_context(|| format!("Failed to stat {:?}", path))?;
        if !metadata.is_file() {
            return Ok(None);
        }

        Ok(Some(Self {
            path,
            file_type,
            size: metadata.len(),
        }))
    }

    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
    }
}

// ============================================================================
// File Collector
// ============================================================================

/// 수집 필터
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// .gitignore / .ignore / 전역 ignore / .git/info/exclude 적용 (git 저장소 밖에서도)
    pub respect_gitignore: bool,
    /// 점(.)으로 시작하는 파일과 폴더도 탐색
    pub include_hidden: bool,
    /// 0이면 크기 제한 없음
    pub max_file_size: u64,
    /// 허용 확장자 (비어 있으면 지원하는 전체)
    pub extensions: Vec<String>,
    pub skip_pdfs: bool,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            respect_gitignore: true,
            include_hidden: false,
            max_file_size: 50 * 1024 * 1024,
            extensions: Vec::new(),
            skip_pdfs: false,
        }
    }
}

/// 문서 수집기
pub struct FileCollector {
    config: CollectorConfig,
}

impl FileCollector {
    pub fn new(config: CollectorConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(CollectorConfig::default())
    }

    /// 파일 하나 수집 (형식이 맞지 않거나 필터에 걸리면 `None`)
    pub fn collect_file(&self, path: &Path) -> Result<Option<CollectedFile>> {
        let path = to_absolute(path)?;
        if !path.is_file() {
            bail!("Not a readable file: {:?}", path);
        }

        Ok(CollectedFile::inspect(path)?.filter(|f| self.accepts(f)))
    }

    /// 폴더 트리 수집
    pub fn collect_directory(&self, path: &Path) -> Result<Vec<CollectedFile>> {
        let root = to_absolute(path)?;
        if !root.is_dir() {
            bail!("Not a directory: {:?}", root);
        }

        let mut files: Vec<CollectedFile> = self
            .walker(&root)
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry: {}", e);
                    None
                }
            })
            .filter(is_regular_file)
            .filter_map(|entry| match CollectedFile::inspect(entry.into_path()) {
                Ok(file) => file,
                Err(e) => {
                    tracing::warn!("{:#}", e);
                    None
                }
            })
            .filter(|file| self.accepts(file))
            .collect();

        files.sort_by(|a, b| a.path.cmp(&b.path));

        tracing::info!("Collected {} documents under {:?}", files.len(), root);
        Ok(files)
    }

    fn walker(&self, root: &Path) -> ignore::Walk {
        let gitignore = self.config.respect_gitignore;
        WalkBuilder::new(root)
            .hidden(!self.config.include_hidden)
            .ignore(gitignore)
            .require_git(false)
            .git_ignore(gitignore)
            .git_global(gitignore)
            .git_exclude(gitignore)
            .build()
    }

    fn accepts(&self, file: &CollectedFile) -> bool {
        let limit = self.config.max_file_size;
        if limit > 0 && file.size > limit {
            tracing::debug!("Skipping {:?}: {} bytes exceeds limit", file.path, file.size);
            return false;
        }

        if self.config.skip_pdfs && file.file_type == FileType::Pdf {
            return false;
        }

        self.config.extensions.is_empty()
            || extension_of(&file.path).is_some_and(|ext| {
                self.config
                    .extensions
                    .iter()
                    .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(ext))
            })
    }
}

fn is_regular_file(entry: &DirEntry) -> bool {
    entry.file_type().is_some_and(|ft| ft.is_file())
}

fn to_absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("Failed to resolve current directory")?;
    Ok(cwd.join(path))
}

// ============================================================================
// Statistics
// ============================================================================

/// 형식별 문서 수와 총 크기
#[derive(Debug, Default)]
pub struct CollectionStats {
    pub total_files: usize,
    pub text_files: usize,
    pub pdf_files: usize,
    pub total_size: u64,
}

impl CollectionStats {
    pub fn from_files(files: &[CollectedFile]) -> Self {
        files.iter().fold(Self::default(), |mut stats, file| {
            stats.total_files += 1;
            stats.total_size += file.size;
            match file.file_type {
                FileType::Text => stats.text_files += 1,
                FileType::Pdf => stats.pdf_files += 1,
            }
            stats
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn names(files: &[CollectedFile]) -> Vec<&str> {
        files.iter().map(|f| f.file_name()).collect()
    }

    fn sample_tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("b.txt"), "SECTION 1").unwrap();
        std::fs::write(dir.path().join("a.pdf"), b"%PDF-1.4").unwrap();
        std::fs::write(dir.path().join("c.png"), b"png").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested").join("d.md"), "SECTION 2").unwrap();
        dir
    }

    #[test]
    fn test_file_type_from_extension() {
        assert_eq!(FileType::from_extension("txt"), Some(FileType::Text));
        assert_eq!(FileType::from_extension("MD"), Some(FileType::Text));
        assert_eq!(FileType::from_extension("PDF"), Some(FileType::Pdf));
        assert_eq!(FileType::from_extension("png"), None);
    }

    #[test]
    fn test_collect_directory() {
        let dir = sample_tree();

        let files = FileCollector::with_defaults()
            .collect_directory(dir.path())
            .unwrap();
        assert_eq!(names(&files), vec!["a.pdf", "b.txt", "d.md"]);

        let stats = CollectionStats::from_files(&files);
        assert_eq!(stats.total_files, 3);
        assert_eq!(stats.pdf_files, 1);
        assert_eq!(stats.text_files, 2);

        let collector = FileCollector::new(CollectorConfig {
            skip_pdfs: true,
            ..Default::default()
        });
        let files = collector.collect_directory(dir.path()).unwrap();
        assert_eq!(names(&files), vec!["b.txt", "d.md"]);
    }

    #[test]
    fn test_extension_filter() {
        let dir = sample_tree();

        let collector = FileCollector::new(CollectorConfig {
            extensions: vec![".MD".to_string(), "pdf".to_string()],
            ..Default::default()
        });
        let files = collector.collect_directory(dir.path()).unwrap();
        assert_eq!(names(&files), vec!["a.pdf", "d.md"]);

        let txt = dir.path().join("b.txt");
        assert!(collector.collect_file(&txt).unwrap().is_none());
    }

    #[test]
    fn test_hidden_and_gitignore() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("keep.txt"), "x").unwrap();
        std::fs::write(dir.path().join(".hidden.txt"), "x").unwrap();
        std::fs::write(dir.path().join("draft.txt"), "x").unwrap();
        std::fs::write(dir.path().join(".gitignore"), "draft.txt\n").unwrap();

        let files = FileCollector::with_defaults()
            .collect_directory(dir.path())
            .unwrap();
        assert_eq!(names(&files), vec!["keep.txt"]);

        let collector = FileCollector::new(CollectorConfig {
            include_hidden: true,
            ..Default::default()
        });
        let files = collector.collect_directory(dir.path()).unwrap();
        assert_eq!(names(&files), vec![".hidden.txt", "keep.txt"]);

        let collector = FileCollector::new(CollectorConfig {
            respect_gitignore: false,
            ..Default::default()
        });
        let files = collector.collect_directory(dir.path()).unwrap();
        assert_eq!(names(&files), vec!["draft.txt", "keep.txt"]);
    }

    #[test]
    fn test_max_file_size() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("small.txt"), "abc").unwrap();
        std::fs::write(dir.path().join("large.txt"), "abcdefghij").unwrap();

        let collector = FileCollector::new(CollectorConfig {
            max_file_size: 5,
            ..Default::default()
        });
        let files = collector.collect_directory(dir.path()).unwrap();
        assert_eq!(names(&files), vec!["small.txt"]);
    }

    #[test]
    fn test_collect_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sheet.txt");
        std::fs::write(&path, "text").unwrap();

        let collector = FileCollector::with_defaults();
        let file = collector.collect_file(&path).unwrap().unwrap();
        assert_eq!(file.file_type, FileType::Text);
        assert_eq!(file.size, 4);
        assert!(file.path.is_absolute());

        let unsupported = dir.path().join("sheet.docx");
        std::fs::write(&unsupported, "x").unwrap();
        assert!(collector.collect_file(&unsupported).unwrap().is_none());

        assert!(collector.collect_file(&dir.path().join("missing.txt")).is_err());
    }
}
