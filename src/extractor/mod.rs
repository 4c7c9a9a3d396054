//! 콘텐츠 추출 모듈
//!
//! 수집된 파일에서 분할할 문서 텍스트를 추출합니다.
//! - 텍스트 파일: 직접 읽기
//! - PDF 파일: pdf-extract로 텍스트 추출 (페이지를 이어붙인 전체 문서)

pub mod pdf;

use std::path::Path;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};

use crate::collector::FileType;

// ============================================================================
// Extracted Document
// ============================================================================

/// 추출된 문서
#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    /// 추출된 텍스트
    pub text: String,
    /// 원본 파일 타입
    pub source_type: FileType,
    /// 페이지 수 (PDF)
    pub page_count: Option<usize>,
}

impl ExtractedDocument {
    /// 텍스트 SHA-256 해시 (hex)
    pub fn content_hash(&self) -> String {
        content_hash(&self.text)
    }
}

/// 텍스트 SHA-256 해시 (hex)
pub fn content_hash(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

// ============================================================================
// Content Extractor
// ============================================================================

/// 콘텐츠 추출기
#[derive(Debug, Default, Clone, Copy)]
pub struct ContentExtractor;

impl ContentExtractor {
    pub fn new() -> Self {
        Self
    }

    /// 파일에서 문서 추출
    pub async fn extract(&self, path: &Path, file_type: FileType) -> Result<ExtractedDocument> {
        match file_type {
            FileType::Text => self.extract_text(path).await,
            FileType::Pdf => self.extract_pdf(path).await,
        }
    }

    /// 텍스트 파일에서 추출
    async fn extract_text(&self, path: &Path) -> Result<ExtractedDocument> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read text file: {:?}", path))?;

        // 손상된 바이트도 분할 가능하도록 손실 변환
        let text = String::from_utf8_lossy(&bytes).into_owned();

        Ok(ExtractedDocument {
            text,
            source_type: FileType::Text,
            page_count: None,
        })
    }

    /// PDF 파일에서 추출
    async fn extract_pdf(&self, path: &Path) -> Result<ExtractedDocument> {
        // PDF 추출은 CPU 바운드이므로 spawn_blocking 사용
        let path = path.to_path_buf();
        let pages = tokio::task::spawn_blocking(move || pdf::extract_text_from_pdf(&path))
            .await
            .context("PDF extraction task failed")??;

        let page_count = pages.len();
        let text = pages
            .into_iter()
            .map(|(_, text)| text)
            .collect::<Vec<_>>()
            .join("\n");

        Ok(ExtractedDocument {
            text,
            source_type: FileType::Pdf,
            page_count: Some(page_count),
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
