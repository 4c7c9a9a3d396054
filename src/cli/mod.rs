//! CLI 모듈
//!
//! sds-splitter CLI 명령어 정의 및 구현

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use crate::catalog::SectionCatalog;
use crate::chunker::{build_chunker, ChunkConfig, SplitStrategy};
use crate::collector::{CollectionStats, CollectorConfig, FileCollector};
use crate::extractor::ContentExtractor;
use crate::pipeline::{default_output_path, PipelineConfig, SplitPipeline};
use crate::splitter::SectionSplitter;

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Parser)]
#[command(name = "sds-splitter")]
#[command(version, about = "SDS 문서 섹션 분할 및 청킹 도구", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 파일 또는 폴더의 문서를 청크로 분할하여 JSON으로 저장
    Split {
        /// 분할할 파일 경로
        #[arg(long)]
        file: Option<PathBuf>,

        /// 분할할 폴더 경로 (재귀)
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// 청킹 전략
        #[arg(short, long, value_enum, default_value_t = SplitStrategy::SectionAware)]
        strategy: SplitStrategy,

        /// 섹션 카탈로그 JSON 경로
        #[arg(short, long)]
        catalog: Option<PathBuf>,

        /// 최대 청크 크기 (recursive, 문자 수)
        #[arg(long, default_value = "200")]
        chunk_size: usize,

        /// 청크 오버랩 (recursive, 문자 수)
        #[arg(long, default_value = "50")]
        chunk_overlap: usize,

        /// 동시에 처리할 문서 수
        #[arg(long)]
        concurrency: Option<usize>,

        /// 출력 JSON 경로 (기본: splits/<strategy>.json)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// PDF 파일 건너뛰기
        #[arg(long)]
        skip_pdfs: bool,

        /// 수집할 확장자만 지정 (예: --ext txt,md)
        #[arg(long = "ext", value_delimiter = ',')]
        extensions: Vec<String>,

        /// 숨김 파일/폴더 포함
        #[arg(long)]
        include_hidden: bool,

        /// .gitignore 무시
        #[arg(long)]
        no_gitignore: bool,

        /// 최대 파일 크기 (MB, 0이면 제한 없음)
        #[arg(long, default_value = "50")]
        max_file_size_mb: u64,
    },

    /// 문서 하나의 섹션 분할 결과 출력
    Sections {
        /// 문서 경로 (.txt, .md, .pdf)
        file: PathBuf,

        /// 섹션 카탈로그 JSON 경로
        #[arg(short, long)]
        catalog: Option<PathBuf>,

        /// JSON으로 출력
        #[arg(long)]
        json: bool,
    },

    /// 유효 섹션 카탈로그 검증 및 출력
    Catalog {
        /// 섹션 카탈로그 JSON 경로
        #[arg(short, long)]
        catalog: Option<PathBuf>,
    },
}

// ============================================================================
// CLI Runner
// ============================================================================

/// CLI 명령어 실행
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Split {
            file,
            dir,
            strategy,
            catalog,
            chunk_size,
            chunk_overlap,
            concurrency,
            output,
            skip_pdfs,
            extensions,
            include_hidden,
            no_gitignore,
            max_file_size_mb,
        } => {
            let chunk_config = ChunkConfig {
                chunk_size,
                chunk_overlap,
                ..Default::default()
            };
            let collector_config = CollectorConfig {
                respect_gitignore: !no_gitignore,
                include_hidden,
                max_file_size: max_file_size_mb * 1024 * 1024,
                extensions,
                skip_pdfs,
            };
            let mut pipeline_config = PipelineConfig::default();
            if let Some(n) = concurrency {
                pipeline_config.concurrency = n;
            }

            cmd_split(SplitArgs {
                file,
                dir,
                strategy,
                catalog,
                chunk_config,
                collector_config,
                pipeline_config,
                output,
            })
            .await
        }
        Commands::Sections {
            file,
            catalog,
            json,
        } => cmd_sections(&file, catalog.as_deref(), json).await,
        Commands::Catalog { catalog } => cmd_catalog(catalog.as_deref()),
    }
}

// ============================================================================
// Command Implementations
// ============================================================================

struct SplitArgs {
    file: Option<PathBuf>,
    dir: Option<PathBuf>,
    strategy: SplitStrategy,
    catalog: Option<PathBuf>,
    chunk_config: ChunkConfig,
    collector_config: CollectorConfig,
    pipeline_config: PipelineConfig,
    output: Option<PathBuf>,
}

/// 분할 명령어 (split)
///
/// 파일 또는 폴더의 문서를 선택한 전략으로 청킹하여 JSON 파일로 저장합니다.
async fn cmd_split(args: SplitArgs) -> Result<()> {
    let collector = FileCollector::new(args.collector_config);

    let files = match (&args.file, &args.dir) {
        (Some(file_path), _) => match collector.collect_file(file_path)? {
            Some(f) => vec![f],
            None => {
                println!("[!] 지원하지 않거나 필터에 걸린 파일: {:?}", file_path);
                return Ok(());
            }
        },
        (None, Some(dir_path)) => collector.collect_directory(dir_path)?,
        (None, None) => bail!("--file 또는 --dir를 지정해야 합니다"),
    };

    if files.is_empty() {
        println!("[!] 분할할 파일이 없습니다.");
        return Ok(());
    }

    let catalog = SectionCatalog::load(args.catalog.as_deref()).context("카탈로그 로드 실패")?;
    let chunker = build_chunker(args.strategy, args.chunk_config, &catalog)
        .context("청커 생성 실패")?;

    let stats = CollectionStats::from_files(&files);
    println!("[*] 분할 대상: {} 파일 ({})", stats.total_files, args.strategy);
    println!("    텍스트: {}, PDF: {}", stats.text_files, stats.pdf_files);
    println!("    총 크기: {}", format_bytes(stats.total_size as usize));
    println!();

    let pipeline = SplitPipeline::new(chunker, args.strategy, args.pipeline_config);
    let report = pipeline.process_files(&files).await;

    for failure in &report.failures {
        println!("[!] 실패: {} - {}", failure.source, failure.error);
    }

    let output = args
        .output
        .unwrap_or_else(|| default_output_path(args.strategy));
    report.write_json(&output).context("분할 결과 저장 실패")?;

    println!(
        "[OK] 완료: 문서 {} (실패 {}), 청크 {} 개, {} ms",
        report.succeeded(),
        report.failures.len(),
        report.records.len(),
        report.elapsed_ms
    );
    println!("     저장 위치: {}", output.display());

    Ok(())
}

/// 섹션 명령어 (sections)
///
/// 문서 하나를 섹션 카탈로그로 분할하여 레이블별 내용을 출력합니다.
async fn cmd_sections(file: &Path, catalog: Option<&Path>, json: bool) -> Result<()> {
    let catalog = SectionCatalog::load(catalog).context("카탈로그 로드 실패")?;
    let splitter = SectionSplitter::new(&catalog).context("분할기 생성 실패")?;

    let collected = FileCollector::with_defaults()
        .collect_file(file)?
        .ok_or_else(|| anyhow::anyhow!("지원하지 않는 파일 형식: {:?}", file))?;

    let document = ContentExtractor::new()
        .extract(&collected.path, collected.file_type)
        .await?;

    let sections = splitter.split(&document.text);

    if json {
        println!("{}", serde_json::to_string_pretty(&sections)?);
        return Ok(());
    }

    if sections.is_empty() {
        println!("[!] 감지된 섹션이 없습니다.");
        return Ok(());
    }

    println!(
        "[OK] {} / {} 섹션 감지: {}\n",
        sections.len(),
        catalog.len(),
        collected.file_name()
    );

    for (label, text) in sections.iter() {
        println!("  [{}] ({} chars)", label, text.chars().count());
        println!("    {}", truncate_text(text, 200));
        println!();
    }

    let missing: Vec<&str> = catalog.labels().filter(|l| !sections.contains(l)).collect();
    if !missing.is_empty() {
        println!("[!] 누락된 섹션: {}", missing.join(", "));
    }

    Ok(())
}

/// 카탈로그 명령어 (catalog)
fn cmd_catalog(catalog: Option<&Path>) -> Result<()> {
    let catalog = SectionCatalog::load(catalog).context("카탈로그 로드 실패")?;
    println!("{}", catalog.to_json_pretty()?);
    Ok(())
}

// ============================================================================
// Helper Functions
// ============================================================================

/// 텍스트 자르기 (UTF-8 안전)
fn truncate_text(text: &str, max_chars: usize) -> String {
    let cleaned = text.replace('\n', " ").replace('\r', "");
    let cleaned = cleaned.trim();

    if cleaned.chars().count() <= max_chars {
        cleaned.to_string()
    } else {
        let truncated: String = cleaned.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}

/// 바이트 크기 포맷팅
fn format_bytes(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("hello", 10), "hello");
        assert_eq!(truncate_text("hello world", 5), "hello...");
        assert_eq!(truncate_text("hello\nworld", 20), "hello world");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(500), "500 B");
        assert_eq!(format_bytes(1536), "1.50 KB");
        assert_eq!(format_bytes(1048576), "1.00 MB");
    }

    #[test]
    fn test_parse_split_args() {
        let cli = Cli::try_parse_from([
            "sds-splitter",
            "split",
            "--dir",
            "docs",
            "--strategy",
            "recursive",
            "--chunk-size",
            "300",
        ])
        .unwrap();

        match cli.command {
            Commands::Split {
                dir,
                strategy,
                chunk_size,
                chunk_overlap,
                ..
            } => {
                assert_eq!(dir, Some(PathBuf::from("docs")));
                assert_eq!(strategy, SplitStrategy::Recursive);
                assert_eq!(chunk_size, 300);
                assert_eq!(chunk_overlap, 50);
            }
            _ => panic!("expected split command"),
        }
    }

    #[test]
    fn test_parse_default_strategy() {
        let cli = Cli::try_parse_from(["sds-splitter", "split", "--file", "a.txt"]).unwrap();
        match cli.command {
            Commands::Split { strategy, .. } => assert_eq!(strategy, SplitStrategy::SectionAware),
            _ => panic!("expected split command"),
        }
    }

    /// 사용자 데이터 디렉토리와 무관하도록 내장 카탈로그를 파일로 고정
    fn write_catalog(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, SectionCatalog::sds_default().to_json_pretty().unwrap()).unwrap();
        path
    }

    #[tokio::test]
    async fn test_split_command_writes_output() {
        let dir = TempDir::new().unwrap();
        let catalog = write_catalog(&dir);
        let input = dir.path().join("sheet.txt");
        std::fs::write(&input, "SECTION 7 : HANDLING and STORAGE keep dry").unwrap();
        let output = dir.path().join("splits.json");

        let cli = Cli::try_parse_from([
            "sds-splitter",
            "split",
            "--file",
            input.to_str().unwrap(),
            "--catalog",
            catalog.to_str().unwrap(),
            "--output",
            output.to_str().unwrap(),
        ])
        .unwrap();
        run(cli).await.unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        let items = value.as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["metadata"]["section"], "7. Handling and storage");
        assert_eq!(items[0]["text"], "STORAGE keep dry");
    }

    #[tokio::test]
    async fn test_split_uses_explicit_catalog() {
        let dir = TempDir::new().unwrap();
        let catalog = dir.path().join("custom.json");
        std::fs::write(&catalog, r#"{ "Storage": ["keep"] }"#).unwrap();
        let input = dir.path().join("sheet.txt");
        std::fs::write(&input, "SECTION 7 : HANDLING and STORAGE keep dry").unwrap();
        let output = dir.path().join("splits.json");

        let cli = Cli::try_parse_from([
            "sds-splitter",
            "split",
            "--file",
            input.to_str().unwrap(),
            "--catalog",
            catalog.to_str().unwrap(),
            "--output",
            output.to_str().unwrap(),
        ])
        .unwrap();
        run(cli).await.unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        let items = value.as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["metadata"]["section"], "Storage");
        assert_eq!(items[0]["text"], "keep dry");
    }

    #[tokio::test]
    async fn test_split_collector_flags() {
        let dir = TempDir::new().unwrap();
        let catalog = write_catalog(&dir);
        let docs = dir.path().join("docs");
        std::fs::create_dir(&docs).unwrap();
        std::fs::write(docs.join("a.txt"), "SECTION 4 : rinse eyes").unwrap();
        std::fs::write(docs.join("b.md"), "SECTION 5 : use foam").unwrap();
        std::fs::write(docs.join(".c.txt"), "SECTION 13 : landfill").unwrap();
        let output = dir.path().join("splits.json");

        let cli = Cli::try_parse_from([
            "sds-splitter",
            "split",
            "--dir",
            docs.to_str().unwrap(),
            "--catalog",
            catalog.to_str().unwrap(),
            "--output",
            output.to_str().unwrap(),
            "--ext",
            "txt",
            "--include-hidden",
        ])
        .unwrap();
        run(cli).await.unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        let sections: Vec<&str> = value
            .as_array()
            .unwrap()
            .iter()
            .map(|item| item["metadata"]["section"].as_str().unwrap())
            .collect();
        assert_eq!(sections, vec!["13. Disposal considerations", "4. First-aid measures"]);
    }

    #[test]
    fn test_parse_collector_flags() {
        let cli = Cli::try_parse_from([
            "sds-splitter",
            "split",
            "--dir",
            "docs",
            "--ext",
            "txt,md",
            "--no-gitignore",
            "--max-file-size-mb",
            "0",
        ])
        .unwrap();

        match cli.command {
            Commands::Split {
                extensions,
                include_hidden,
                no_gitignore,
                max_file_size_mb,
                ..
            } => {
                assert_eq!(extensions, vec!["txt", "md"]);
                assert!(!include_hidden);
                assert!(no_gitignore);
                assert_eq!(max_file_size_mb, 0);
            }
            _ => panic!("expected split command"),
        }
    }

    #[tokio::test]
    async fn test_split_requires_input() {
        let dir = TempDir::new().unwrap();
        let catalog = write_catalog(&dir);
        let cli = Cli::try_parse_from([
            "sds-splitter",
            "split",
            "--catalog",
            catalog.to_str().unwrap(),
        ])
        .unwrap();

        let err = run(cli).await.unwrap_err();
        assert!(err.to_string().contains("--file"));
    }

    #[test]
    fn test_catalog_command_rejects_invalid_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, r#"{ "A": [] }"#).unwrap();
        assert!(cmd_catalog(Some(&path)).is_err());
    }
}
