use std::path::PathBuf;

use clap::ValueEnum;

use crate::scanner::MediaKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Mode {
    /// 单个目录作为一季
    #[default]
    Folder,
    /// 番剧根目录，自动识别季文件夹
    Show,
}

/// 命令行参数解析后的运行配置
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub path: PathBuf,
    pub mode: Mode,
    pub kind: Option<MediaKind>,
    pub season: Option<u32>,
    pub name: Option<String>,
    pub include_language_tag: bool,
    /// 无人值守：不提示、不确认
    pub unattended: bool,
    pub dry_run: bool,
    pub json: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            path: PathBuf::from("."),
            mode: Mode::default(),
            kind: None,
            season: None,
            name: None,
            include_language_tag: true,
            unattended: false,
            dry_run: false,
            json: false,
        }
    }
}
