use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::RenameError;
use crate::naming::NameFormatter;
use crate::scanner::MediaKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenameEntry {
    pub original_name: String,
    pub new_name: String,
}

/// 按字符串字典序排序后从 1 开始编号。
///
/// 不做自然排序：`ep10.mkv` 排在 `ep2.mkv` 前面。
pub fn sequence(filenames: &[String]) -> Vec<(String, u32)> {
    let mut sorted = filenames.to_vec();
    sorted.sort();
    sorted.into_iter().zip(1..).collect()
}

/// 为一个目录生成重命名计划，不修改文件系统
pub fn plan(
    listing: &[String],
    season: u32,
    series_name: &str,
    kind: MediaKind,
    formatter: &NameFormatter,
) -> Vec<RenameEntry> {
    let targets: Vec<String> = listing
        .iter()
        .filter(|name| kind.matches(name))
        .cloned()
        .collect();

    sequence(&targets)
        .into_iter()
        .map(|(original_name, episode)| {
            let new_name = formatter.format(
                &original_name,
                season,
                episode,
                series_name,
                kind.is_subtitle(),
            );
            RenameEntry {
                original_name,
                new_name,
            }
        })
        .collect()
}

/// 执行前检查：所有新文件名必须互不相同
pub fn check_collisions(entries: &[RenameEntry]) -> Result<(), RenameError> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for entry in entries {
        *counts.entry(entry.new_name.as_str()).or_default() += 1;
    }

    let names: Vec<String> = counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(name, _)| name.to_string())
        .collect();

    if names.is_empty() {
        Ok(())
    } else {
        Err(RenameError::Collision { names })
    }
}
