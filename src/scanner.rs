use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::RenameError;
use crate::parser::{extract_season_number, matchers::SeasonWordMatcher};

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mkv", "avi", "mov", "flv", "wmv"];
const SUBTITLE_EXTENSIONS: &[&str] = &["srt", "ass", "vtt"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Subtitle,
}

impl MediaKind {
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            MediaKind::Video => VIDEO_EXTENSIONS,
            MediaKind::Subtitle => SUBTITLE_EXTENSIONS,
        }
    }

    pub fn is_subtitle(self) -> bool {
        self == MediaKind::Subtitle
    }

    /// 文件名（小写后）以本类型的扩展名结尾
    pub fn matches(self, filename: &str) -> bool {
        let lower = filename.to_lowercase();
        self.extensions()
            .iter()
            .any(|ext| lower.ends_with(&format!(".{}", ext)))
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Video => write!(f, "video"),
            MediaKind::Subtitle => write!(f, "subtitle"),
        }
    }
}

impl FromStr for MediaKind {
    type Err = RenameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "video" => Ok(MediaKind::Video),
            "subtitle" => Ok(MediaKind::Subtitle),
            other => Err(RenameError::InvalidInput(format!(
                "未知的媒体类型: {}",
                other
            ))),
        }
    }
}

/// 目录下的一个子文件夹
#[derive(Debug, Clone, PartialEq)]
pub struct SubdirEntry {
    pub name: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeasonFolder {
    pub path: PathBuf,
    pub season_number: u32,
}

/// 番剧根目录的布局：按季分文件夹，或者没有季文件夹
#[derive(Debug, Clone, PartialEq)]
pub enum ShowLayout {
    /// 已按季数升序排列
    SeasonFolders(Vec<SeasonFolder>),
    /// 根目录本身作为一季处理
    NoSeasonFolder(u32),
}

impl ShowLayout {
    pub fn from_listing(root_name: &str, subdirs: &[SubdirEntry]) -> Self {
        let mut folders = detect(subdirs);
        if folders.is_empty() {
            return ShowLayout::NoSeasonFolder(extract_season_number(root_name));
        }
        folders.sort_by_key(|f| f.season_number);
        ShowLayout::SeasonFolders(folders)
    }
}

/// 找出季文件夹，保持目录列表的原始顺序。
///
/// 不含 `season <数字>` 的文件夹直接跳过；季数为 0 或超出范围的也跳过。
pub fn detect(subdirs: &[SubdirEntry]) -> Vec<SeasonFolder> {
    subdirs
        .iter()
        .filter_map(|entry| {
            let Some(m) = SeasonWordMatcher::try_match(&entry.name) else {
                if SeasonWordMatcher::is_match(&entry.name) {
                    debug!("季数超出范围，跳过: {}", entry.name);
                }
                return None;
            };
            if m.value == 0 {
                debug!("季数为 0，跳过: {}", entry.name);
                return None;
            }
            debug!("季文件夹: {} ({})", entry.name, m.matched_text);
            Some(SeasonFolder {
                path: entry.path.clone(),
                season_number: m.value,
            })
        })
        .collect()
}

/// 目录列表结果，`skipped` 是无法处理的条目（非 UTF-8 名称、失效的链接）
#[derive(Debug, Clone, PartialEq)]
pub struct Listing<T> {
    pub entries: Vec<T>,
    pub skipped: Vec<PathBuf>,
}

impl<T> Default for Listing<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

/// 列出目录下的文件名（不递归）
pub fn list_files(dir: &Path) -> Result<Listing<String>, RenameError> {
    let mut listing = Listing::default();
    for entry in readable_children(dir, &mut listing.skipped)? {
        if !entry.file_type().is_file() {
            continue;
        }
        match entry.file_name().to_str() {
            Some(name) => listing.entries.push(name.to_string()),
            None => skip(&mut listing.skipped, entry.path(), "文件名不是有效的 UTF-8"),
        }
    }
    Ok(listing)
}

/// 列出目录下的子文件夹（不递归）
pub fn list_subdirectories(dir: &Path) -> Result<Listing<SubdirEntry>, RenameError> {
    let mut listing = Listing::default();
    for entry in readable_children(dir, &mut listing.skipped)? {
        if !entry.file_type().is_dir() {
            continue;
        }
        match entry.file_name().to_str() {
            Some(name) => listing.entries.push(SubdirEntry {
                name: name.to_string(),
                path: entry.path().to_path_buf(),
            }),
            None => skip(&mut listing.skipped, entry.path(), "文件夹名不是有效的 UTF-8"),
        }
    }
    Ok(listing)
}

/// 目录本身读不了（depth 0）才算访问失败，单个条目出错只跳过
fn readable_children(
    dir: &Path,
    skipped: &mut Vec<PathBuf>,
) -> Result<Vec<walkdir::DirEntry>, RenameError> {
    let mut children = Vec::new();
    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true);

    for entry in walker {
        match entry {
            Ok(entry) => children.push(entry),
            Err(e) if e.depth() == 0 => return Err(RenameError::directory_access(dir, e)),
            Err(e) => {
                let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| dir.to_path_buf());
                skip(skipped, &path, &e.to_string());
            }
        }
    }
    Ok(children)
}

fn skip(skipped: &mut Vec<PathBuf>, path: &Path, reason: &str) {
    warn!("跳过 {}: {}", path.display(), reason);
    skipped.push(path.to_path_buf());
}
