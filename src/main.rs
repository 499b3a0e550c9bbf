use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use roamy::config::Config;
use roamy::index::Catalog;
use roamy::query::QueryServer;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Roamy: travel catalog HTTP API
#[derive(Parser, Debug)]
#[command(name = "roamy", version, about)]
struct Args {
    /// TOML 配置文件（缺省读取 $CONFIG_DIR/roamy/config.toml，若存在）
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 覆盖配置中的数据源路径
    #[arg(short, long)]
    data: Option<PathBuf>,

    #[arg(long)]
    host: Option<String>,

    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut config = Config::load(args.config.as_deref())?;
    if let Some(data) = args.data {
        config.data_path = data;
    }
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }

    info!("Starting roamy: travel catalog API");

    // 目录只在这里构建一次，之后以 Arc 注入路由状态
    let catalog = Arc::new(Catalog::load(&config.data_path, config.cache_capacity));
    info!("\n{}", catalog.stats());

    QueryServer::new(catalog, config).run().await
}
