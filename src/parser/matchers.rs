use regex::Regex;
use std::sync::LazyLock;

static SEASON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)season\s*(\d+)").expect("season pattern is valid"));

/// 匹配结果
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub value: u32,
    pub matched_text: String,
}

/// Season 3 / season3 / SEASON 03 格式，不区分大小写，取最左边的匹配
pub struct SeasonWordMatcher;

impl SeasonWordMatcher {
    pub fn try_match(text: &str) -> Option<MatchResult> {
        let cap = SEASON_WORD.captures(text)?;
        let whole = cap.get(0)?;
        let value = cap.get(1)?.as_str().parse::<u32>().ok()?;
        Some(MatchResult {
            value,
            matched_text: whole.as_str().to_string(),
        })
    }

    /// 只判断是否包含 season 标记，不关心数字能否解析
    pub fn is_match(text: &str) -> bool {
        SEASON_WORD.is_match(text)
    }

    /// 删除所有 season 标记，用空格代替
    pub fn strip_all(text: &str) -> String {
        SEASON_WORD.replace_all(text, " ").into_owned()
    }
}
