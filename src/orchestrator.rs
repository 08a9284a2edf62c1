use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{Mode, RunOptions};
use crate::error::RenameError;
use crate::naming::NameFormatter;
use crate::parser::{extract_season_number, extract_series_name, format_series_name};
use crate::planner::{RenameEntry, check_collisions, plan};
use crate::scanner::{self, MediaKind, ShowLayout};

/// 一个目录的执行结果
#[derive(Debug, Default)]
pub struct RenameReport {
    pub attempted: usize,
    pub renamed: Vec<RenameEntry>,
    pub failures: Vec<RenameError>,
}

/// 整次运行的汇总
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub directories: usize,
    pub inaccessible: usize,
    pub collisions: usize,
    pub cancelled: usize,
    /// 名称无法处理而跳过的条目
    pub skipped: usize,
    pub renamed: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn has_errors(&self) -> bool {
        self.inaccessible > 0 || self.collisions > 0 || self.failed > 0
    }

    fn absorb(&mut self, report: &RenameReport) {
        self.renamed += report.renamed.len();
        self.failed += report.failures.len();
    }
}

#[derive(Serialize)]
struct PlanPreview<'a> {
    directory: &'a Path,
    season: u32,
    kind: MediaKind,
    entries: &'a [RenameEntry],
}

/// 负责所有 I/O：列目录、提示、预览、执行重命名
pub struct Orchestrator<R> {
    options: RunOptions,
    input: R,
    formatter: NameFormatter,
    summary: RunSummary,
}

impl<R: BufRead> Orchestrator<R> {
    pub fn new(options: RunOptions, input: R) -> Self {
        let formatter = NameFormatter::new(options.include_language_tag);
        Self {
            options,
            input,
            formatter,
            summary: RunSummary::default(),
        }
    }

    pub fn run(mut self) -> Result<RunSummary> {
        match self.options.mode {
            Mode::Folder => self.run_folder()?,
            Mode::Show => self.run_show()?,
        }
        Ok(self.summary)
    }

    fn run_folder(&mut self) -> Result<()> {
        let dir = self.options.path.clone();

        let Some(files) = self.files_in(&dir) else {
            return Ok(());
        };

        let kind = self.resolve_kind()?;
        let count = files.iter().filter(|f| kind.matches(f)).count();
        if count == 0 {
            println!("当前目录没有找到 {} 文件", kind);
            return Ok(());
        }
        println!("找到 {} 个 {} 文件", count, kind);

        let folder = folder_name(&dir);
        let season = match self.options.season {
            Some(season) => season,
            None if self.options.unattended => {
                let season = extract_season_number(&folder);
                info!("从文件夹名推断季数: {}", season);
                season
            }
            None => self.prompt_season()?,
        };

        let series_name = match self.options.name.clone() {
            Some(name) => format_series_name(&name),
            None if self.options.unattended => String::new(),
            None => self.prompt_series_name()?,
        };
        if !series_name.is_empty() {
            println!("使用格式化后的名称: {}", series_name);
        }

        self.process_directory(&dir, &files, season, &series_name, kind)
    }

    fn run_show(&mut self) -> Result<()> {
        let root = self.options.path.clone();
        let root_name = folder_name(&root);

        let series_name = match self.options.name.as_deref() {
            Some(name) => format_series_name(name),
            None => format_series_name(&extract_series_name(&root_name)),
        };
        if series_name.is_empty() {
            warn!("无法从文件夹名推断番剧名称，保留原文件名: {}", root_name);
        } else {
            println!("番剧名称: {}", series_name);
        }

        let subdirs = match scanner::list_subdirectories(&root) {
            Ok(listing) => {
                self.summary.skipped += listing.skipped.len();
                listing.entries
            }
            Err(e) => {
                warn!("{}", e);
                self.summary.inaccessible += 1;
                return Ok(());
            }
        };

        let kind = self.resolve_kind()?;

        match ShowLayout::from_listing(&root_name, &subdirs) {
            ShowLayout::SeasonFolders(folders) => {
                info!("找到 {} 个季文件夹", folders.len());
                for folder in folders {
                    let Some(files) = self.files_in(&folder.path) else {
                        continue;
                    };
                    println!(
                        "\n第 {} 季: {}",
                        folder.season_number,
                        folder.path.display()
                    );
                    self.process_directory(
                        &folder.path,
                        &files,
                        folder.season_number,
                        &series_name,
                        kind,
                    )?;
                }
            }
            ShowLayout::NoSeasonFolder(season) => {
                info!("没有季文件夹，将根目录作为第 {} 季处理", season);
                if let Some(files) = self.files_in(&root) {
                    self.process_directory(&root, &files, season, &series_name, kind)?;
                }
            }
        }

        Ok(())
    }

    /// 列出目录下的文件；目录无法访问时记录并返回 None
    fn files_in(&mut self, dir: &Path) -> Option<Vec<String>> {
        match scanner::list_files(dir) {
            Ok(listing) => {
                self.summary.skipped += listing.skipped.len();
                Some(listing.entries)
            }
            Err(e) => {
                warn!("{}", e);
                self.summary.inaccessible += 1;
                None
            }
        }
    }

    fn process_directory(
        &mut self,
        dir: &Path,
        files: &[String],
        season: u32,
        series_name: &str,
        kind: MediaKind,
    ) -> Result<()> {
        let entries = plan(files, season, series_name, kind, &self.formatter);
        if entries.is_empty() {
            println!("{} 中没有找到 {} 文件", dir.display(), kind);
            return Ok(());
        }
        self.execute_plan(dir, season, kind, &entries)
    }

    /// 预览 → 冲突检查 → 确认 → 执行
    fn execute_plan(
        &mut self,
        dir: &Path,
        season: u32,
        kind: MediaKind,
        entries: &[RenameEntry],
    ) -> Result<()> {
        self.summary.directories += 1;

        if self.options.json {
            let preview = PlanPreview {
                directory: dir,
                season,
                kind,
                entries,
            };
            println!("{}", serde_json::to_string_pretty(&preview)?);
        } else {
            println!("\n重命名预览:");
            for entry in entries {
                println!("{} → {}", entry.original_name, entry.new_name);
            }
        }

        if let Err(e) = check_collisions(entries) {
            println!("{}，跳过该目录", e);
            warn!(directory = %dir.display(), "{}", e);
            self.summary.collisions += 1;
            return Ok(());
        }

        if self.options.dry_run {
            println!("预览模式，未实际重命名");
            return Ok(());
        }

        if !self.options.unattended && !self.confirm("\n继续重命名？[y/n] ")? {
            println!("已取消");
            self.summary.cancelled += 1;
            return Ok(());
        }

        let report = apply_plan(dir, entries);
        for failure in &report.failures {
            println!("{}", failure);
        }
        println!(
            "成功重命名 {}/{} 个文件",
            report.renamed.len(),
            report.attempted
        );
        self.summary.absorb(&report);

        Ok(())
    }

    fn resolve_kind(&mut self) -> Result<MediaKind> {
        if let Some(kind) = self.options.kind {
            return Ok(kind);
        }
        if self.options.unattended {
            return Ok(MediaKind::Video);
        }
        loop {
            let answer = self.ask("要重命名字幕还是视频文件？(subtitle/video): ")?;
            match answer.parse::<MediaKind>() {
                Ok(kind) => return Ok(kind),
                Err(e) => {
                    debug!("{}", e);
                    println!("请输入 subtitle 或 video");
                }
            }
        }
    }

    fn prompt_season(&mut self) -> Result<u32> {
        loop {
            let answer = self.ask("请输入季数: ")?;
            match answer.parse::<i64>() {
                Ok(n) if n <= 0 => println!("季数必须为正数"),
                Ok(n) => match u32::try_from(n) {
                    Ok(season) => return Ok(season),
                    Err(_) => println!("季数过大"),
                },
                Err(_) => println!("请输入有效的数字"),
            }
        }
    }

    fn prompt_series_name(&mut self) -> Result<String> {
        let answer = self.ask("请输入番剧名称（留空则保留原文件名）: ")?;
        Ok(format_series_name(&answer))
    }

    fn confirm(&mut self, question: &str) -> Result<bool> {
        let answer = self.ask(question)?;
        Ok(answer.eq_ignore_ascii_case("y"))
    }

    fn ask(&mut self, question: &str) -> Result<String> {
        print!("{}", question);
        io::stdout().flush()?;

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("读取输入失败")?;
        if read == 0 {
            bail!("输入已结束");
        }
        Ok(line.trim().to_string())
    }
}

/// 按计划顺序逐个重命名，单个失败不影响其余文件
pub fn apply_plan(dir: &Path, entries: &[RenameEntry]) -> RenameReport {
    let mut report = RenameReport::default();

    for entry in entries {
        report.attempted += 1;
        let from = dir.join(&entry.original_name);
        let to = dir.join(&entry.new_name);

        if from == to {
            report.renamed.push(entry.clone());
            continue;
        }

        let result = if to.exists() {
            Err(io::Error::new(io::ErrorKind::AlreadyExists, "目标文件已存在"))
        } else {
            fs::rename(&from, &to)
        };

        match result {
            Ok(()) => {
                debug!("{} → {}", entry.original_name, entry.new_name);
                report.renamed.push(entry.clone());
            }
            Err(source) => report.failures.push(RenameError::RenameFailed { from, to, source }),
        }
    }

    report
}

/// 目录的显示名称，`.` 之类的相对路径先转成绝对路径
fn folder_name(path: &Path) -> String {
    let resolved: PathBuf = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    resolved
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn touch(dir: &Path, names: &[&str]) {
        for name in names {
            fs::write(dir.join(name), name.as_bytes()).unwrap();
        }
    }

    fn sorted_files(dir: &Path) -> Vec<String> {
        let mut files = scanner::list_files(dir).unwrap().entries;
        files.sort();
        files
    }

    fn unattended(path: &Path) -> RunOptions {
        RunOptions {
            path: path.to_path_buf(),
            unattended: true,
            ..RunOptions::default()
        }
    }

    fn run(options: RunOptions, input: &str) -> RunSummary {
        Orchestrator::new(options, Cursor::new(input.to_string()))
            .run()
            .unwrap()
    }

    #[test]
    fn test_apply_plan_renames_everything() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), &["b.mkv", "a.mkv"]);
        let entries = plan(
            &sorted_files(dir.path()),
            1,
            "naruto",
            MediaKind::Video,
            &NameFormatter::default(),
        );

        let report = apply_plan(dir.path(), &entries);

        assert_eq!(report.attempted, 2);
        assert_eq!(report.renamed.len(), 2);
        assert!(report.failures.is_empty());
        assert_eq!(
            sorted_files(dir.path()),
            vec!["naruto_s01_e01.mkv", "naruto_s01_e02.mkv"]
        );
        let content = fs::read_to_string(dir.path().join("naruto_s01_e01.mkv")).unwrap();
        assert_eq!(content, "a.mkv");
    }

    #[test]
    fn test_apply_plan_failure_does_not_abort_batch() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), &["b.mkv", "taken.mkv"]);
        let entries = vec![
            RenameEntry {
                original_name: "missing.mkv".to_string(),
                new_name: "show_s01_e01.mkv".to_string(),
            },
            RenameEntry {
                original_name: "b.mkv".to_string(),
                new_name: "taken.mkv".to_string(),
            },
            RenameEntry {
                original_name: "taken.mkv".to_string(),
                new_name: "show_s01_e03.mkv".to_string(),
            },
        ];

        let report = apply_plan(dir.path(), &entries);

        assert_eq!(report.attempted, 3);
        assert_eq!(report.renamed.len(), 1);
        assert_eq!(report.failures.len(), 2);
        assert!(matches!(
            &report.failures[1],
            RenameError::RenameFailed { source, .. } if source.kind() == io::ErrorKind::AlreadyExists
        ));
        assert_eq!(sorted_files(dir.path()), vec!["b.mkv", "show_s01_e03.mkv"]);
    }

    #[test]
    fn test_folder_mode_unattended() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), &["ep2.mkv", "ep10.mkv", "ep1.mkv", "ep1.srt"]);
        let options = RunOptions {
            season: Some(2),
            name: Some("Attack on Titan".to_string()),
            ..unattended(dir.path())
        };

        let summary = run(options, "");

        assert_eq!(summary.directories, 1);
        assert_eq!(summary.renamed, 3);
        assert!(!summary.has_errors());
        assert_eq!(
            sorted_files(dir.path()),
            vec![
                "attack_on_titan_s02_e01.mkv",
                "attack_on_titan_s02_e02.mkv",
                "attack_on_titan_s02_e03.mkv",
                "ep1.srt",
            ]
        );
        let second = fs::read_to_string(dir.path().join("attack_on_titan_s02_e02.mkv")).unwrap();
        assert_eq!(second, "ep10.mkv");
    }

    #[test]
    fn test_folder_mode_interactive_prompts() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), &["a.srt", "b.srt", "c.mkv"]);
        let options = RunOptions {
            path: dir.path().to_path_buf(),
            ..RunOptions::default()
        };

        let summary = run(options, "audio\nsubtitle\nzero\n0\n3\nBleach\ny\n");

        assert_eq!(summary.renamed, 2);
        assert_eq!(
            sorted_files(dir.path()),
            vec!["bleach_s03_e01.jpn.srt", "bleach_s03_e02.jpn.srt", "c.mkv"]
        );
    }

    #[test]
    fn test_folder_mode_blank_name_keeps_original() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), &["show.mkv"]);
        let options = RunOptions {
            path: dir.path().to_path_buf(),
            kind: Some(MediaKind::Video),
            season: Some(1),
            ..RunOptions::default()
        };

        run(options, "\ny\n");

        assert_eq!(sorted_files(dir.path()), vec!["show_s01_e01.mkv"]);
    }

    #[test]
    fn test_folder_mode_cancelled() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), &["a.mkv"]);
        let options = RunOptions {
            path: dir.path().to_path_buf(),
            kind: Some(MediaKind::Video),
            season: Some(1),
            name: Some("show".to_string()),
            ..RunOptions::default()
        };

        let summary = run(options, "n\n");

        assert_eq!(summary.cancelled, 1);
        assert_eq!(summary.renamed, 0);
        assert_eq!(sorted_files(dir.path()), vec!["a.mkv"]);
    }

    #[test]
    fn test_closed_input_is_an_error() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), &["a.mkv"]);
        let options = RunOptions {
            path: dir.path().to_path_buf(),
            ..RunOptions::default()
        };

        let result = Orchestrator::new(options, Cursor::new(String::new())).run();

        assert!(result.is_err());
        assert_eq!(sorted_files(dir.path()), vec!["a.mkv"]);
    }

    #[test]
    fn test_dry_run_does_not_rename() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), &["a.mkv", "b.mkv"]);
        let options = RunOptions {
            dry_run: true,
            json: true,
            ..unattended(dir.path())
        };

        let summary = run(options, "");

        assert_eq!(summary.directories, 1);
        assert_eq!(summary.renamed, 0);
        assert_eq!(sorted_files(dir.path()), vec!["a.mkv", "b.mkv"]);
    }

    #[test]
    fn test_no_matching_files_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), &["notes.txt"]);

        let summary = run(unattended(dir.path()), "");

        assert_eq!(summary, RunSummary::default());
    }

    #[test]
    fn test_missing_directory_counted_inaccessible() {
        let dir = TempDir::new().unwrap();
        let summary = run(unattended(&dir.path().join("gone")), "");
        assert_eq!(summary.inaccessible, 1);
        assert!(summary.has_errors());
    }

    #[test]
    fn test_unattended_season_inferred_from_folder() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("Bleach Season 4");
        fs::create_dir(&dir).unwrap();
        touch(&dir, &["x.mp4"]);

        run(unattended(&dir), "");

        assert_eq!(sorted_files(&dir), vec!["x_s04_e01.mp4"]);
    }

    #[test]
    fn test_show_mode_season_folders() {
        let root = TempDir::new().unwrap();
        let show = root.path().join("Attack_on.Titan");
        for season in ["Season 2", "Season 1", "Extras"] {
            fs::create_dir_all(show.join(season)).unwrap();
        }
        touch(&show.join("Season 1"), &["a.mkv", "b.mkv"]);
        touch(&show.join("Season 2"), &["c.mkv"]);
        touch(&show.join("Extras"), &["bonus.mkv"]);
        touch(&show, &["root.mkv"]);
        let options = RunOptions {
            mode: Mode::Show,
            ..unattended(&show)
        };

        let summary = run(options, "");

        assert_eq!(summary.directories, 2);
        assert_eq!(summary.renamed, 3);
        assert_eq!(
            sorted_files(&show.join("Season 1")),
            vec!["attack_on_titan_s01_e01.mkv", "attack_on_titan_s01_e02.mkv"]
        );
        assert_eq!(
            sorted_files(&show.join("Season 2")),
            vec!["attack_on_titan_s02_e01.mkv"]
        );
        assert_eq!(sorted_files(&show.join("Extras")), vec!["bonus.mkv"]);
        assert_eq!(sorted_files(&show), vec!["root.mkv"]);
    }

    #[test]
    fn test_show_mode_without_season_folders() {
        let root = TempDir::new().unwrap();
        let show = root.path().join("Mob Psycho 100 Season 3");
        fs::create_dir_all(show.join("Extras")).unwrap();
        touch(&show, &["01.ass", "02.ass"]);
        let options = RunOptions {
            mode: Mode::Show,
            kind: Some(MediaKind::Subtitle),
            include_language_tag: false,
            ..unattended(&show)
        };

        let summary = run(options, "");

        assert_eq!(summary.renamed, 2);
        assert_eq!(
            sorted_files(&show),
            vec!["mob_psycho_100_s03_e01.ass", "mob_psycho_100_s03_e02.ass"]
        );
    }

    #[test]
    fn test_show_mode_name_override() {
        let root = TempDir::new().unwrap();
        let show = root.path().join("whatever");
        fs::create_dir_all(show.join("season 1")).unwrap();
        touch(&show.join("season 1"), &["a.mkv"]);
        let options = RunOptions {
            mode: Mode::Show,
            name: Some("Shingeki no Kyojin".to_string()),
            ..unattended(&show)
        };

        run(options, "");

        assert_eq!(
            sorted_files(&show.join("season 1")),
            vec!["shingeki_no_kyojin_s01_e01.mkv"]
        );
    }

    #[test]
    fn test_collision_aborts_whole_batch() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), &["a.mkv", "b.mkv", "c.mkv"]);
        let entries = vec![
            RenameEntry {
                original_name: "a.mkv".to_string(),
                new_name: "show_s01_e01.mkv".to_string(),
            },
            RenameEntry {
                original_name: "b.mkv".to_string(),
                new_name: "show_s01_e02.mkv".to_string(),
            },
            RenameEntry {
                original_name: "c.mkv".to_string(),
                new_name: "show_s01_e01.mkv".to_string(),
            },
        ];
        let mut orchestrator = Orchestrator::new(unattended(dir.path()), Cursor::new(String::new()));

        orchestrator
            .execute_plan(dir.path(), 1, MediaKind::Video, &entries)
            .unwrap();

        assert_eq!(orchestrator.summary.collisions, 1);
        assert_eq!(orchestrator.summary.renamed, 0);
        assert!(orchestrator.summary.has_errors());
        assert_eq!(sorted_files(dir.path()), vec!["a.mkv", "b.mkv", "c.mkv"]);
    }

    #[test]
    fn test_execute_plan_applies_distinct_names() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), &["a.mkv"]);
        let entries = vec![RenameEntry {
            original_name: "a.mkv".to_string(),
            new_name: "show_s01_e01.mkv".to_string(),
        }];
        let mut orchestrator = Orchestrator::new(unattended(dir.path()), Cursor::new(String::new()));

        orchestrator
            .execute_plan(dir.path(), 1, MediaKind::Video, &entries)
            .unwrap();

        assert_eq!(orchestrator.summary.collisions, 0);
        assert_eq!(orchestrator.summary.renamed, 1);
        assert_eq!(sorted_files(dir.path()), vec!["show_s01_e01.mkv"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_does_not_block_directory() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), &["ep1.mkv"]);
        std::os::unix::fs::symlink(dir.path().join("nope"), dir.path().join("dangling")).unwrap();
        let options = RunOptions {
            name: Some("show".to_string()),
            ..unattended(dir.path())
        };

        let summary = run(options, "");

        assert_eq!(summary.inaccessible, 0);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.renamed, 1);
        assert_eq!(sorted_files(dir.path()), vec!["show_s01_e01.mkv"]);
    }
}
