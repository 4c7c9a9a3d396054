//! Text Chunking Module
//!
//! 문서를 검색 가능한 청크로 분할하는 전략들을 제공합니다.
//! - `recursive`: 구분자 목록을 따라 재귀적으로 나누고 크기에 맞게 병합
//! - `section-aware`: 섹션 카탈로그로 감지한 섹션 하나당 청크 하나

use std::collections::VecDeque;

use serde::Serialize;
use thiserror::Error;

use crate::catalog::{CatalogError, SectionCatalog};
use crate::splitter::SectionSplitter;

// ============================================================================
// Errors
// ============================================================================

/// 청커 구성 오류
#[derive(Debug, Error)]
pub enum ChunkerError {
    #[error("chunk_size must be greater than zero")]
    ZeroChunkSize,
    #[error("chunk_overlap ({overlap}) must not exceed chunk_size ({size})")]
    OverlapTooLarge { overlap: usize, size: usize },
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

// ============================================================================
// Chunk Configuration
// ============================================================================

/// 재귀 청킹 설정 (길이는 문자 수 기준)
#[derive(Debug, Clone)]
pub struct ChunkConfig {
    /// 최대 청크 크기
    pub chunk_size: usize,
    /// 이전 청크에서 이어받을 최대 크기
    pub chunk_overlap: usize,
    /// 우선순위 순 구분자 (빈 문자열은 문자 단위 분할)
    pub separators: Vec<String>,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_size: 200,
            chunk_overlap: 50,
            separators: vec![" ".to_string(), "\n".to_string(), "\t".to_string()],
        }
    }
}

impl ChunkConfig {
    /// 설정 검증
    pub fn validate(&self) -> Result<(), ChunkerError> {
        if self.chunk_size == 0 {
            return Err(ChunkerError::ZeroChunkSize);
        }
        if self.chunk_overlap > self.chunk_size {
            return Err(ChunkerError::OverlapTooLarge {
                overlap: self.chunk_overlap,
                size: self.chunk_size,
            });
        }
        Ok(())
    }
}

// ============================================================================
// Chunk & Strategy
// ============================================================================

/// 분할된 청크
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chunk {
    pub text: String,
    /// 섹션 레이블 (section-aware 전략만)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
}

impl Chunk {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            section: None,
        }
    }
}

/// 청킹 전략
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SplitStrategy {
    /// 재귀 문자 분할
    Recursive,
    /// 섹션 인식 분할
    SectionAware,
}

impl SplitStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SplitStrategy::Recursive => "recursive",
            SplitStrategy::SectionAware => "section-aware",
        }
    }
}

impl std::fmt::Display for SplitStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Chunker Trait
// ============================================================================

/// 텍스트 청킹 전략 트레이트
pub trait Chunker: Send + Sync {
    /// 텍스트를 청크로 분할
    fn chunk(&self, text: &str) -> Vec<Chunk>;

    /// 청커 이름
    fn name(&self) -> &'static str;
}

// ============================================================================
// RecursiveChunker
// ============================================================================

/// 재귀 문자 청커
///
/// 텍스트에 존재하는 첫 번째 구분자로 나누고(구분자는 다음 조각 앞에 유지),
/// `chunk_size` 이상인 조각은 남은 구분자로 다시 나눈 뒤,
/// 작은 조각들을 `chunk_size`까지 병합하면서 `chunk_overlap`만큼 앞 조각을 이어받습니다.
pub struct RecursiveChunker {
    config: ChunkConfig,
}

impl RecursiveChunker {
    /// 설정으로 생성
    pub fn new(config: ChunkConfig) -> Result<Self, ChunkerError> {
        config.validate()?;
        Ok(Self { config })
    }

    fn split_text(&self, text: &str, separators: &[String]) -> Vec<String> {
        let (separator, remaining) = choose_separator(text, separators);
        let mut chunks = Vec::new();
        let mut good: Vec<&str> = Vec::new();

        for piece in split_keep_separator(text, separator) {
            if char_len(piece) < self.config.chunk_size {
                good.push(piece);
                continue;
            }

            if !good.is_empty() {
                chunks.extend(self.merge_splits(&good));
                good.clear();
            }

            if remaining.is_empty() {
                chunks.push(piece.to_string());
            } else {
                chunks.extend(self.split_text(piece, remaining));
            }
        }

        if !good.is_empty() {
            chunks.extend(self.merge_splits(&good));
        }

        chunks
    }

    /// 작은 조각 병합 (오버랩 적용)
    fn merge_splits(&self, splits: &[&str]) -> Vec<String> {
        let size = self.config.chunk_size;
        let overlap = self.config.chunk_overlap;

        let mut docs = Vec::new();
        let mut current: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for &piece in splits {
            let len = char_len(piece);

            if total + len > size && !current.is_empty() {
                if total > size {
                    tracing::warn!("Created a chunk of size {}, larger than {}", total, size);
                }
                push_joined(&mut docs, &current);

                while total > overlap || (total + len > size && total > 0) {
                    match current.pop_front() {
                        Some(front) => total -= char_len(front),
                        None => break,
                    }
                }
            }

            current.push_back(piece);
            total += len;
        }

        push_joined(&mut docs, &current);
        docs
    }
}

impl Chunker for RecursiveChunker {
    fn chunk(&self, text: &str) -> Vec<Chunk> {
        if text.trim().is_empty() {
            return vec![];
        }

        self.split_text(text, &self.config.separators)
            .into_iter()
            .map(Chunk::plain)
            .collect()
    }

    fn name(&self) -> &'static str {
        "RecursiveChunker"
    }
}

// ============================================================================
// SectionChunker
// ============================================================================

/// 섹션 인식 청커
///
/// 감지된 섹션 하나가 청크 하나가 됩니다. 섹션이 없는 문서는 청크가 없습니다.
pub struct SectionChunker {
    splitter: SectionSplitter,
}

impl SectionChunker {
    pub fn new(catalog: &SectionCatalog) -> Result<Self, ChunkerError> {
        Ok(Self {
            splitter: SectionSplitter::new(catalog)?,
        })
    }
}

impl Chunker for SectionChunker {
    fn chunk(&self, text: &str) -> Vec<Chunk> {
        self.splitter
            .split(text)
            .into_iter()
            .map(|(label, text)| Chunk {
                text,
                section: Some(label),
            })
            .collect()
    }

    fn name(&self) -> &'static str {
        "SectionChunker"
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

#[inline]
fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// 텍스트에 존재하는 첫 구분자와 그 뒤의 구분자 목록
fn choose_separator<'a>(text: &str, separators: &'a [String]) -> (&'a str, &'a [String]) {
    for (i, sep) in separators.iter().enumerate() {
        if sep.is_empty() {
            return (sep.as_str(), &[]);
        }
        if text.contains(sep.as_str()) {
            return (sep.as_str(), &separators[i + 1..]);
        }
    }

    (separators.last().map(String::as_str).unwrap_or(""), &[])
}

/// 구분자 위치에서 분할 (구분자는 다음 조각의 앞에 붙음, 빈 조각 제거)
fn split_keep_separator<'t>(text: &'t str, separator: &str) -> Vec<&'t str> {
    if separator.is_empty() {
        return text
            .char_indices()
            .map(|(i, c)| &text[i..i + c.len_utf8()])
            .collect();
    }

    let mut pieces = Vec::new();
    let mut start = 0;

    for (idx, _) in text.match_indices(separator) {
        if idx > start {
            pieces.push(&text[start..idx]);
        }
        start = idx;
    }

    if start < text.len() {
        pieces.push(&text[start..]);
    }

    pieces
}

fn push_joined(docs: &mut Vec<String>, current: &VecDeque<&str>) {
    let joined: String = current.iter().copied().collect();
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        docs.push(trimmed.to_string());
    }
}

// ============================================================================
// Factory Functions
// ============================================================================

/// 전략별 청커 생성
pub fn build_chunker(
    strategy: SplitStrategy,
    config: ChunkConfig,
    catalog: &SectionCatalog,
) -> Result<Box<dyn Chunker>, ChunkerError> {
    Ok(match strategy {
        SplitStrategy::Recursive => Box::new(RecursiveChunker::new(config)?),
        SplitStrategy::SectionAware => Box::new(SectionChunker::new(catalog)?),
    })
}

// ============================================================================
// Tests
// ============================================================================
