/// 字幕文件附加的语言标签
pub const LANGUAGE_TAG: &str = "jpn";

/// 生成 `<series>_s<SS>_e<EE>[.jpn].<ext>` 形式的新文件名
#[derive(Debug, Clone, Copy)]
pub struct NameFormatter {
    /// 字幕文件是否附加 `.jpn`
    pub include_language_tag: bool,
}

impl Default for NameFormatter {
    fn default() -> Self {
        Self {
            include_language_tag: true,
        }
    }
}

impl NameFormatter {
    pub fn new(include_language_tag: bool) -> Self {
        Self {
            include_language_tag,
        }
    }

    /// 纯函数，不访问文件系统。
    ///
    /// `series_name` 为空时保留原文件名（去掉最后一个扩展名）作为前缀。
    /// 没有 `.` 的文件名整体视为扩展名，前缀为空。
    pub fn format(
        &self,
        original_name: &str,
        season: u32,
        episode: u32,
        series_name: &str,
        is_subtitle: bool,
    ) -> String {
        let (base_name, extension) = split_extension(original_name);

        let prefix = if series_name.is_empty() {
            base_name
        } else {
            series_name
        };

        let tag = if is_subtitle && self.include_language_tag {
            format!(".{}", LANGUAGE_TAG)
        } else {
            String::new()
        };

        format!(
            "{}_s{}_e{}{}.{}",
            prefix,
            pad_number(season),
            pad_number(episode),
            tag,
            extension
        )
    }
}

/// 补零到至少两位，超过两位的数字原样输出
pub fn pad_number(value: u32) -> String {
    format!("{:02}", value)
}

/// 按最后一个 `.` 拆分为 (基础名, 扩展名)
fn split_extension(name: &str) -> (&str, &str) {
    match name.rsplit_once('.') {
        Some((base, ext)) => (base, ext),
        None => ("", name),
    }
}
