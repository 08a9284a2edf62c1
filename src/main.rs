mod config;
mod error;
mod naming;
mod orchestrator;
mod parser;
mod planner;
mod scanner;

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser as ClapParser;
use config::{Mode, RunOptions};
use orchestrator::Orchestrator;
use scanner::MediaKind;

#[derive(ClapParser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// 要处理的目录
    #[arg(default_value = ".")]
    path: PathBuf,

    /// folder: 目录本身是一季；show: 番剧根目录，按季文件夹处理
    #[arg(short, long, value_enum, default_value_t = Mode::Folder)]
    mode: Mode,

    /// 文件类型（video/subtitle），不指定时交互询问
    #[arg(short, long)]
    kind: Option<MediaKind>,

    /// 季数（folder 模式），不指定时交互询问
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    season: Option<u32>,

    /// 番剧名称，会转换成小写下划线形式
    #[arg(long)]
    name: Option<String>,

    /// 字幕文件不附加 .jpn
    #[arg(long)]
    no_language_tag: bool,

    /// 无人值守模式：不询问、不确认（仍然检查文件名冲突）
    #[arg(short = 'y', long)]
    yes: bool,

    /// 预览模式（不实际重命名）
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// 以 JSON 输出重命名计划
    #[arg(long)]
    json: bool,

    /// 输出调试日志
    #[arg(short, long)]
    verbose: bool,
}

impl From<Args> for RunOptions {
    fn from(args: Args) -> Self {
        Self {
            path: args.path,
            mode: args.mode,
            kind: args.kind,
            season: args.season,
            name: args.name,
            include_language_tag: !args.no_language_tag,
            unattended: args.yes,
            dry_run: args.dry_run,
            json: args.json,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if args.verbose {
            "media_renamer=debug".to_string()
        } else {
            "media_renamer=info".to_string()
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .init();

    let options = RunOptions::from(args);
    println!("处理目录: {}", options.path.display());

    let summary = Orchestrator::new(options, io::stdin().lock()).run()?;

    println!(
        "\n完成: {} 个目录，重命名 {} 个文件，失败 {} 个，冲突 {} 个目录，无法访问 {} 个目录，取消 {} 个目录，跳过 {} 个无法处理的条目",
        summary.directories,
        summary.renamed,
        summary.failed,
        summary.collisions,
        summary.inaccessible,
        summary.cancelled,
        summary.skipped
    );

    if summary.has_errors() {
        std::process::exit(1);
    }

    Ok(())
}
