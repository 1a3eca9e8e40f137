// 云盘API数据类型

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// 文件夹的 MIME 类型标记
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// 云盘条目
///
/// MIME 类型等于文件夹标记的视为文件夹，其余一律按候选图片处理
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriveEntry {
    /// 文件ID（云盘内唯一）
    pub id: String,

    /// 文件名
    pub name: String,

    /// MIME 类型
    #[serde(rename = "mimeType")]
    pub mime_type: String,

    /// 缩略图链接（文件夹或未生成缩略图时缺失）
    #[serde(
        rename = "thumbnailLink",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub thumbnail_link: Option<String>,
}

impl DriveEntry {
    /// 是否是文件夹
    pub fn is_folder(&self) -> bool {
        self.mime_type == FOLDER_MIME_TYPE
    }
}

/// files.list 响应
#[derive(Debug, Deserialize)]
pub struct DriveFileList {
    /// 条目列表
    #[serde(default)]
    pub files: Vec<DriveEntry>,
}

/// 单个文件的元数据
///
/// 字段可能缺失，取值时回退到图片默认值
#[derive(Debug, Clone, Deserialize)]
pub struct DriveFileMeta {
    /// 文件名
    #[serde(default)]
    pub name: Option<String>,

    /// MIME 类型
    #[serde(rename = "mimeType", default)]
    pub mime_type: Option<String>,
}

impl DriveFileMeta {
    /// 文件名，缺失时回退 "image.jpg"
    pub fn filename(&self) -> &str {
        self.name.as_deref().unwrap_or("image.jpg")
    }

    /// MIME 类型，缺失时回退 "image/jpeg"
    pub fn content_type(&self) -> &str {
        self.mime_type.as_deref().unwrap_or("image/jpeg")
    }
}

/// 按 id 去重
///
/// 上游接口在合并多来源结果时可能返回重复条目，
/// 首次出现的保留，插入顺序不变
pub fn dedup_by_id(entries: Vec<DriveEntry>) -> Vec<DriveEntry> {
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .filter(|entry| seen.insert(entry.id.clone()))
        .collect()
}

/// 转义查询文本中的单引号
///
/// 查询串以单引号包裹文本，未转义的 `'` 会破坏上游查询语法
pub fn escape_query(text: &str) -> String {
    text.replace('\'', "\\'")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn entry(id: &str, name: &str) -> DriveEntry {
        DriveEntry {
            id: id.to_string(),
            name: name.to_string(),
            mime_type: "image/jpeg".to_string(),
            thumbnail_link: None,
        }
    }

    #[test]
    fn test_is_folder() {
        let mut folder = entry("f1", "Vacation");
        folder.mime_type = FOLDER_MIME_TYPE.to_string();
        assert!(folder.is_folder());

        let image = entry("i1", "a.jpg");
        assert!(!image.is_folder());
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let entries = vec![
            entry("a", "first"),
            entry("b", "second"),
            entry("a", "duplicate"),
            entry("c", "third"),
            entry("b", "duplicate"),
        ];

        let unique = dedup_by_id(entries);

        let ids: Vec<&str> = unique.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        // 保留的是首次出现的条目
        assert_eq!(unique[0].name, "first");
        assert_eq!(unique[1].name, "second");
    }

    #[test]
    fn test_dedup_empty() {
        assert!(dedup_by_id(Vec::new()).is_empty());
    }

    #[test]
    fn test_escape_query() {
        assert_eq!(escape_query("O'Brien"), "O\\'Brien");
        assert_eq!(escape_query("beach"), "beach");
        assert_eq!(escape_query("''"), "\\'\\'");
    }

    #[test]
    fn test_meta_defaults() {
        let meta = DriveFileMeta {
            name: None,
            mime_type: None,
        };
        assert_eq!(meta.filename(), "image.jpg");
        assert_eq!(meta.content_type(), "image/jpeg");

        let meta = DriveFileMeta {
            name: Some("cover.png".to_string()),
            mime_type: Some("image/png".to_string()),
        };
        assert_eq!(meta.filename(), "cover.png");
        assert_eq!(meta.content_type(), "image/png");
    }

    #[test]
    fn test_entry_serde_field_names() {
        // 与上游接口保持 camelCase 字段名，缩略图缺失时不序列化
        let json = r#"{"id":"i1","name":"a.jpg","mimeType":"image/jpeg"}"#;
        let parsed: DriveEntry = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.mime_type, "image/jpeg");
        assert!(parsed.thumbnail_link.is_none());

        let out = serde_json::to_string(&parsed).unwrap();
        assert!(out.contains("\"mimeType\""));
        assert!(!out.contains("thumbnailLink"));
    }

    proptest! {
        /// 任意含重复 id 的列表，去重后每个 id 恰好出现一次，且维持首次出现的顺序
        #[test]
        fn prop_dedup_unique_and_ordered(ids in proptest::collection::vec("[a-z]{1,3}", 0..30)) {
            let entries: Vec<DriveEntry> = ids.iter().map(|id| entry(id, id)).collect();
            let unique = dedup_by_id(entries);

            let mut seen = HashSet::new();
            for e in &unique {
                prop_assert!(seen.insert(e.id.clone()));
            }

            // 与手工扫描得到的首次出现序列一致
            let mut expected = Vec::new();
            let mut first_seen = HashSet::new();
            for id in &ids {
                if first_seen.insert(id.clone()) {
                    expected.push(id.clone());
                }
            }
            let actual: Vec<String> = unique.iter().map(|e| e.id.clone()).collect();
            prop_assert_eq!(actual, expected);
        }
    }
}
