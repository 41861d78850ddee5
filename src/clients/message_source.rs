//! 订单消息源
//!
//! 核心逻辑只依赖 `MessageSource`，真正的邮箱接入在外部完成。
//! `FolderSource` 读取导出到目录中的邮件文件（头部 + 空行 + 正文）。

use std::future::Future;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

use crate::error::{AppError, AppResult, SourceError};

/// 一封订单邮件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// 消息标识（文件名）
    pub id: String,
    pub subject: Option<String>,
    pub body: String,
}

impl Message {
    /// 解析 "Header: value" 头部，第一个空行之后是正文；
    /// 没有头部的文件整体作为正文
    pub fn parse(id: impl Into<String>, raw: &str) -> Self {
        let id = id.into();
        let mut subject = None;
        let mut consumed = 0usize;

        let first_is_header = raw.lines().next().map(is_header_line).unwrap_or(false);

        if first_is_header {
            for chunk in raw.split_inclusive('\n') {
                consumed += chunk.len();
                let line = chunk.trim_end_matches(['\r', '\n']);
                if line.trim().is_empty() {
                    break;
                }
                if let Some((name, value)) = line.split_once(':') {
                    if name.trim().eq_ignore_ascii_case("subject") {
                        subject = Some(value.trim().to_string());
                    }
                }
            }
        }

        let body = raw.get(consumed.min(raw.len())..).unwrap_or_default().to_string();
        Self { id, subject, body }
    }

    /// 主题是否包含筛选词；筛选词为空时全部匹配
    pub fn matches_subject(&self, filter: &str) -> bool {
        filter.is_empty()
            || self
                .subject
                .as_deref()
                .map(|s| s.contains(filter))
                .unwrap_or(false)
    }
}

fn is_header_line(line: &str) -> bool {
    match line.split_once(':') {
        Some((name, _)) => {
            !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        }
        None => false,
    }
}

/// 订单消息源
pub trait MessageSource {
    /// 取回当前所有匹配的消息
    fn fetch_messages(&self) -> impl Future<Output = AppResult<Vec<Message>>>;
}

/// 目录消息源
pub struct FolderSource {
    folder: PathBuf,
    subject: String,
}

const MESSAGE_EXTENSIONS: [&str; 5] = ["eml", "html", "htm", "txt", "msg"];

impl FolderSource {
    pub fn new(folder: impl Into<PathBuf>, subject: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            subject: subject.into(),
        }
    }

    fn is_message_file(path: &Path) -> bool {
        path.extension()
            .and_then(|s| s.to_str())
            .map(|ext| MESSAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
            .unwrap_or(false)
    }
}

impl MessageSource for FolderSource {
    async fn fetch_messages(&self) -> AppResult<Vec<Message>> {
        let folder_display = self.folder.display().to_string();
        if !fs::try_exists(&self.folder).await.unwrap_or(false) {
            return Err(AppError::Source(SourceError::FolderNotFound {
                path: folder_display,
            }));
        }

        let mut entries = fs::read_dir(&self.folder)
            .await
            .map_err(|e| AppError::source_read_failed(&folder_display, e))?;

        let mut paths = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| AppError::source_read_failed(&folder_display, e))?
        {
            let path = entry.path();
            if Self::is_message_file(&path) {
                paths.push(path);
            }
        }
        // 目录遍历顺序不固定，按文件名排序保证订单顺序稳定
        paths.sort();

        let mut messages = Vec::with_capacity(paths.len());
        for path in paths {
            let id = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            match fs::read(&path).await {
                Ok(bytes) => {
                    let message = Message::parse(id, &String::from_utf8_lossy(&bytes));
                    if message.matches_subject(&self.subject) {
                        messages.push(message);
                    } else {
                        debug!("跳过主题不匹配的消息: {}", message.id);
                    }
                }
                Err(e) => {
                    warn!("读取消息失败 {}: {}", path.display(), e);
                }
            }
        }

        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_headers_and_body() {
        let raw = "From: shop@example.org\nSubject: Herbstfest Bestellung #12\n\n<table></table>\n";
        let message = Message::parse("a.eml", raw);
        assert_eq!(message.subject.as_deref(), Some("Herbstfest Bestellung #12"));
        assert_eq!(message.body, "<table></table>\n");
        assert!(message.matches_subject("Herbstfest"));
        assert!(!message.matches_subject("Sommerfest"));
    }

    #[test]
    fn test_parse_without_headers() {
        let raw = "<p>Bestellung</p>\n<table></table>";
        let message = Message::parse("b.html", raw);
        assert_eq!(message.subject, None);
        assert_eq!(message.body, raw);
        assert!(message.matches_subject(""));
        assert!(!message.matches_subject("Herbstfest"));
    }

    #[tokio::test]
    async fn test_folder_source_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("02.eml"), "Subject: Herbstfest\n\nzwei").unwrap();
        std::fs::write(dir.path().join("01.eml"), "Subject: Herbstfest\n\neins").unwrap();
        std::fs::write(dir.path().join("03.eml"), "Subject: Newsletter\n\ndrei").unwrap();
        std::fs::write(dir.path().join("notes.md"), "Subject: Herbstfest\n\nvier").unwrap();

        let source = FolderSource::new(dir.path(), "Herbstfest");
        let messages = source.fetch_messages().await.unwrap();
        let bodies: Vec<_> = messages.iter().map(|m| m.body.as_str()).collect();
        assert_eq!(bodies, vec!["eins", "zwei"]);
    }

    #[tokio::test]
    async fn test_missing_folder_is_an_error() {
        let source = FolderSource::new("/nonexistent/herbstfest", "");
        let err = source.fetch_messages().await.unwrap_err();
        assert!(matches!(err, AppError::Source(SourceError::FolderNotFound { .. })));
    }
}
