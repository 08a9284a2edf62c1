pub mod matchers;

use matchers::SeasonWordMatcher;

/// 文件夹名中视为单词分隔符的字符
const SEPARATORS: &[char] = &['_', '.', '-', '–', '—'];

/// 没有 season 标记时的默认季数
pub const DEFAULT_SEASON: u32 = 1;

/// 从文件夹名提取季数，找不到时返回 1
pub fn extract_season_number(name: &str) -> u32 {
    SeasonWordMatcher::try_match(name)
        .map(|m| m.value)
        .unwrap_or(DEFAULT_SEASON)
}

/// 从文件夹名提取番剧显示名称（去掉 season 标记，分隔符转空格）
pub fn extract_series_name(name: &str) -> String {
    let without_season = SeasonWordMatcher::strip_all(name);
    let spaced: String = without_season
        .chars()
        .map(|c| if SEPARATORS.contains(&c) { ' ' } else { c })
        .collect();

    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 转换成可用于文件名的形式：空格转下划线，小写，只保留字母数字和下划线
pub fn format_series_name(display_name: &str) -> String {
    display_name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect()
}
