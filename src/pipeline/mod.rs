//! 분할 파이프라인
//!
//! 수집된 문서들을 추출 → 청킹하여 분할 레코드로 모읍니다.
//! 문서마다 독립된 블로킹 작업에서 청커를 실행하며, 동시 실행 수는 설정으로 제한합니다.
//! 한 문서의 실패는 리포트에 기록되고 전체 배치를 중단시키지 않습니다.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::Serialize;

use crate::chunker::{Chunk, Chunker, SplitStrategy};
use crate::collector::CollectedFile;
use crate::extractor::ContentExtractor;

// ============================================================================
// Types
// ============================================================================

/// 파이프라인 설정
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// 동시에 처리할 최대 문서 수
    pub concurrency: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            concurrency: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
        }
    }
}

/// 분할 레코드 (JSON 출력 단위)
#[derive(Debug, Clone, Serialize)]
pub struct SplitRecord {
    pub text: String,
    pub metadata: RecordMetadata,
    pub id: usize,
}

/// 레코드 메타데이터
#[derive(Debug, Clone, Serialize)]
pub struct RecordMetadata {
    /// 원본 문서 경로
    pub source: String,
    pub strategy: SplitStrategy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    /// 문서 내 청크 순서
    pub chunk_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_count: Option<usize>,
    /// 원본 텍스트 SHA-256
    pub content_hash: String,
}

/// 문서 처리 실패
#[derive(Debug, Clone, Serialize)]
pub struct DocumentFailure {
    pub source: String,
    pub error: String,
}

/// 한 문서의 분할 결과
#[derive(Debug, Clone)]
pub struct DocumentSplits {
    pub source: String,
    pub content_hash: String,
    pub page_count: Option<usize>,
    pub chunks: Vec<Chunk>,
}

/// 배치 처리 리포트
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub generated_at: DateTime<Utc>,
    pub strategy: SplitStrategy,
    pub documents: usize,
    pub failures: Vec<DocumentFailure>,
    pub records: Vec<SplitRecord>,
    pub elapsed_ms: u128,
}

impl PipelineReport {
    /// 성공한 문서 수
    pub fn succeeded(&self) -> usize {
        self.documents - self.failures.len()
    }

    /// 분할 레코드를 JSON 파일로 저장 (`[{ text, metadata, id }]`)
    pub fn write_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create output directory: {:?}", parent))?;
            }
        }

        let json = serde_json::to_string_pretty(&self.records)
            .context("Failed to serialize split records")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write splits: {:?}", path))?;

        tracing::info!("Wrote {} splits to {:?}", self.records.len(), path);
        Ok(())
    }
}

/// 기본 출력 경로 (splits/<strategy>.json)
pub fn default_output_path(strategy: SplitStrategy) -> PathBuf {
    PathBuf::from("splits").join(format!("{}.json", strategy.as_str()))
}

// ============================================================================
// SplitPipeline
// ============================================================================

/// 문서 분할 파이프라인
pub struct SplitPipeline {
    chunker: Arc<dyn Chunker>,
    strategy: SplitStrategy,
    extractor: ContentExtractor,
    config: PipelineConfig,
}

impl SplitPipeline {
    pub fn new(chunker: Box<dyn Chunker>, strategy: SplitStrategy, config: PipelineConfig) -> Self {
        Self {
            chunker: Arc::from(chunker),
            strategy,
            extractor: ContentExtractor::new(),
            config,
        }
    }

    /// 텍스트 하나를 블로킹 작업에서 청킹
    pub async fn chunk_text(&self, text: String) -> Result<Vec<Chunk>> {
        let chunker = Arc::clone(&self.chunker);
        tokio::task::spawn_blocking(move || chunker.chunk(&text))
            .await
            .context("Chunking task failed")
    }

    /// 파일 하나 처리 (추출 → 청킹)
    pub async fn process_file(&self, file: &CollectedFile) -> Result<DocumentSplits> {
        let started = Instant::now();
        let document = self
            .extractor
            .extract(&file.path, file.file_type)
            .await
            .with_context(|| format!("Failed to extract {:?}", file.path))?;

        let hash = document.content_hash();
        let page_count = document.page_count;
        let chunks = self.chunk_text(document.text).await?;

        tracing::debug!(
            "[{}] {} -> {} chunks ({} ms)",
            file.file_type.as_str(),
            file.file_name(),
            chunks.len(),
            started.elapsed().as_millis()
        );

        Ok(DocumentSplits {
            source: file.path.display().to_string(),
            content_hash: hash,
            page_count,
            chunks,
        })
    }

    /// 여러 파일을 동시에 처리하여 리포트 생성
    ///
    /// 레코드는 입력 파일 순서, 문서 내 청크 순서로 정렬되며 id는 0부터 부여됩니다.
    pub async fn process_files(&self, files: &[CollectedFile]) -> PipelineReport {
        let started = Instant::now();
        let concurrency = self.config.concurrency.max(1);

        tracing::info!(
            "Splitting {} documents with {} (concurrency {})",
            files.len(),
            self.chunker.name(),
            concurrency
        );

        let mut results: Vec<(usize, &CollectedFile, Result<DocumentSplits>)> =
            stream::iter(files.iter().enumerate())
                .map(|(i, file)| async move { (i, file, self.process_file(file).await) })
                .buffer_unordered(concurrency)
                .collect()
                .await;

        results.sort_by_key(|(i, _, _)| *i);

        let mut records = Vec::new();
        let mut failures = Vec::new();

        for (_, file, result) in results {
            match result {
                Ok(splits) => self.append_records(&mut records, splits),
                Err(e) => {
                    tracing::warn!("Failed to split {:?}: {:#}", file.path, e);
                    failures.push(DocumentFailure {
                        source: file.path.display().to_string(),
                        error: format!("{:#}", e),
                    });
                }
            }
        }

        let elapsed_ms = started.elapsed().as_millis();
        tracing::info!(
            "{} split finished: {} splits from {} documents ({} failed) in {} ms",
            self.strategy,
            records.len(),
            files.len(),
            failures.len(),
            elapsed_ms
        );

        PipelineReport {
            generated_at: Utc::now(),
            strategy: self.strategy,
            documents: files.len(),
            failures,
            records,
            elapsed_ms,
        }
    }

    fn append_records(&self, records: &mut Vec<SplitRecord>, splits: DocumentSplits) {
        for (chunk_index, chunk) in splits.chunks.into_iter().enumerate() {
            let id = records.len();
            records.push(SplitRecord {
                text: chunk.text,
                metadata: RecordMetadata {
                    source: splits.source.clone(),
                    strategy: self.strategy,
                    section: chunk.section,
                    chunk_index,
                    page_count: splits.page_count,
                    content_hash: splits.content_hash.clone(),
                },
                id,
            });
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
