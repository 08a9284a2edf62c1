use std::path::PathBuf;

/// 重命名流程中的错误
#[derive(Debug, thiserror::Error)]
pub enum RenameError {
    /// 用户输入无法识别（例如未知的媒体类型）
    #[error("无效输入: {0}")]
    InvalidInput(String),

    /// 目录不存在或没有权限
    #[error("无法访问目录 {}: {source}", .path.display())]
    DirectoryAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 计划中有多个文件映射到同一个新名称
    #[error("新文件名冲突: {}", .names.join(", "))]
    Collision { names: Vec<String> },

    /// 单个文件重命名失败
    #[error("重命名失败: {} -> {}: {source}", .from.display(), .to.display())]
    RenameFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RenameError {
    pub fn directory_access(path: impl Into<PathBuf>, source: impl Into<std::io::Error>) -> Self {
        Self::DirectoryAccess {
            path: path.into(),
            source: source.into(),
        }
    }
}
