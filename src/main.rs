//! sds-splitter CLI 진입점

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    // 로그는 stderr로 (stdout은 JSON 출력용)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = sds_splitter::cli::Cli::parse();

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(sds_splitter::cli::run(cli))
}
