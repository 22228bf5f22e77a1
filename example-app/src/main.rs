//! # 示例应用程序
//!
//! 扫描 `demo` 命名空间，织入歌迷切面后让舞台安排一次演出

mod demo;

use clap::Parser;
use di_abstractions::CircularDependencyPolicy;
use infrastructure_composition::{ApplicationBootstrapper, CatalogScanner};
use std::path::PathBuf;
use tracing::info;

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "example-app")]
#[command(about = "IoC 容器示例应用")]
struct Args {
    /// 配置文件路径
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 要扫描的命名空间
    #[arg(short, long, default_value = "demo")]
    namespace: Vec<String>,

    /// 依赖无法解析时终止启动
    #[arg(long)]
    strict: bool,

    /// 检测到循环依赖时终止启动
    #[arg(long)]
    fail_on_cycles: bool,

    /// 日志级别，覆盖配置文件
    #[arg(long)]
    log_level: Option<String>,

    /// 以 JSON 输出初始化报告
    #[arg(long)]
    report: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut bootstrapper =
        ApplicationBootstrapper::new().load_settings(args.config.as_deref())?;

    let mut settings = bootstrapper.settings().clone();
    if let Some(level) = args.log_level {
        settings.logging.level = level;
    }
    if args.strict {
        settings.container.fail_on_unresolved = true;
    }
    if args.fail_on_cycles {
        settings.container.circular_dependencies = CircularDependencyPolicy::Fail;
    }

    bootstrapper = bootstrapper
        .with_settings(settings)
        .enable_logging(true)
        .add_scanner(CatalogScanner::new("demo", demo::catalog()));
    for namespace in args.namespace {
        bootstrapper = bootstrapper.scan_namespace(namespace);
    }

    let context = bootstrapper.bootstrap().await?;
    info!("容器中共有 {} 个 bean", context.len());

    match context.get_bean::<demo::Stage>() {
        Some(stage) => match stage.show() {
            Some(lyrics) => println!("演出结束: {lyrics}"),
            None => println!("舞台上没有表演者"),
        },
        None => println!("没有找到舞台"),
    }

    if args.report {
        println!("{}", serde_json::to_string_pretty(context.report())?);
    }

    Ok(())
}
