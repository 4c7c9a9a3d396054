//! sds-splitter - SDS 문서 섹션 분할 및 청킹
//!
//! 안전보건자료(SDS) 같은 반정형 문서를 헤딩 동의어 카탈로그로
//! 레이블된 섹션으로 분할하고, 검색용 청크로 나눕니다.
//!
//! ```rust,ignore
//! let catalog = SectionCatalog::sds_default();
//! let sections = split(&text, &catalog)?;
//! println!("{:?}", sections.get("7. Handling and storage"));
//! ```

pub mod catalog;
pub mod chunker;
pub mod cli;
pub mod collector;
pub mod extractor;
pub mod pipeline;
pub mod splitter;

// Re-exports
pub use catalog::{get_data_dir, CatalogError, SectionCatalog};
pub use chunker::{
    build_chunker, Chunk, ChunkConfig, Chunker, ChunkerError, RecursiveChunker,
    SectionChunker, SplitStrategy,
};
pub use pipeline::{PipelineConfig, PipelineReport, SplitPipeline, SplitRecord};
pub use splitter::{normalize_text, split, SectionSpan, SectionSplitter, Sections};
