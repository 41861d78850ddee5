//! 原始订单表格
//!
//! 一封订单邮件中的表格，按位置保存 (标签, 值)。
//! 字段按固定下标读取，标签只用于日志显示。

use serde::{Deserialize, Serialize};

use crate::error::ExtractionError;

/// 订单表格最少需要的行数
pub const MIN_POSITIONS: usize = 18;

/// 有业务含义的行下标，其余位置忽略
pub const SIGNIFICANT_POSITIONS: [usize; 14] = [2, 3, 4, 5, 6, 7, 9, 10, 11, 13, 14, 15, 16, 17];

/// 表格中的一行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawField {
    pub label: String,
    pub value: String,
}

impl RawField {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// 一封邮件中的订单表格
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRow {
    fields: Vec<RawField>,
}

impl RawRow {
    pub fn new(fields: Vec<RawField>) -> Self {
        Self { fields }
    }

    /// 从 HTML 表格的单元格构建
    ///
    /// 关键位置上单元格少于两个的行视为格式错误；
    /// 其他位置上的残缺行补空值，多余的单元格忽略。
    pub fn from_cells(rows: Vec<Vec<String>>) -> Result<Self, ExtractionError> {
        let mut fields = Vec::with_capacity(rows.len());
        for (position, cells) in rows.into_iter().enumerate() {
            if cells.len() < 2 && SIGNIFICANT_POSITIONS.contains(&position) {
                return Err(ExtractionError::MalformedRow {
                    position,
                    cells: cells.len(),
                });
            }
            let mut cells = cells.into_iter();
            let label = cells.next().unwrap_or_default();
            let value = cells.next().unwrap_or_default();
            fields.push(RawField { label, value });
        }
        Ok(Self { fields })
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// 读取指定位置的值
    pub fn value(&self, position: usize) -> Option<&str> {
        self.fields.get(position).map(|f| f.value.as_str())
    }

    pub fn fields(&self) -> &[RawField] {
        &self.fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(row: &[&str]) -> Vec<String> {
        row.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_from_cells_pads_insignificant_rows() {
        let mut rows: Vec<Vec<String>> = (0..MIN_POSITIONS).map(|_| cells(&["l", "v"])).collect();
        rows[0] = cells(&["Bestellung"]);
        rows[8] = Vec::new();

        let row = RawRow::from_cells(rows).unwrap();
        assert_eq!(row.len(), MIN_POSITIONS);
        assert_eq!(row.value(0), Some(""));
        assert_eq!(row.value(8), Some(""));
        assert_eq!(row.value(9), Some("v"));
    }

    #[test]
    fn test_from_cells_rejects_broken_significant_row() {
        let mut rows: Vec<Vec<String>> = (0..MIN_POSITIONS).map(|_| cells(&["l", "v"])).collect();
        rows[11] = cells(&["Uhrzeit"]);

        let err = RawRow::from_cells(rows).unwrap_err();
        assert_eq!(err, ExtractionError::MalformedRow { position: 11, cells: 1 });
    }

    #[test]
    fn test_extra_cells_are_ignored() {
        let row = RawRow::from_cells(vec![cells(&["a", "b", "c"])]).unwrap();
        assert_eq!(row.fields()[0], RawField::new("a", "b"));
    }
}
