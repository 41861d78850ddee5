//! 报表结果表
//!
//! 汇总引擎输出的每个视图都是一张有序的、带列名的表。

use serde::Serialize;
use std::fmt;

/// 单元格
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Int(i64),
    Text(String),
}

impl From<u32> for Cell {
    fn from(v: u32) -> Self {
        Cell::Int(i64::from(v))
    }
}

/// 超出 i64 范围的值保留为文本
impl From<u64> for Cell {
    fn from(v: u64) -> Self {
        i64::try_from(v)
            .map(Cell::Int)
            .unwrap_or_else(|_| Cell::Text(v.to_string()))
    }
}

impl From<i64> for Cell {
    fn from(v: i64) -> Self {
        Cell::Int(v)
    }
}

impl From<&str> for Cell {
    fn from(v: &str) -> Self {
        Cell::Text(v.to_string())
    }
}

impl From<String> for Cell {
    fn from(v: String) -> Self {
        Cell::Text(v)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Int(v) => write!(f, "{}", v),
            Cell::Text(v) => write!(f, "{}", v),
        }
    }
}

/// 一张结果表
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultTable {
    pub columns: Vec<&'static str>,
    pub rows: Vec<Vec<Cell>>,
}

impl ResultTable {
    pub fn new(columns: Vec<&'static str>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        debug_assert_eq!(row.len(), self.columns.len());
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| *c == name)
    }

    /// 按列名取某一行的单元格
    pub fn cell(&self, row: usize, column: &str) -> Option<&Cell> {
        let idx = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }

    /// 按列名取整数值，方便测试和汇总
    pub fn int(&self, row: usize, column: &str) -> Option<i64> {
        match self.cell(row, column)? {
            Cell::Int(v) => Some(*v),
            Cell::Text(_) => None,
        }
    }
}

/// 视图名称
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ViewName {
    AllOrders,
    TraySummaryBySlot,
    TraySummaryByDay,
    TotalTrays,
    SweetLiterBySlot,
    SweetLiterByDay,
    TotalSweetLiter,
    AlarmRanking,
    RevenueByDay,
    TotalRevenue,
}

impl ViewName {
    pub const ALL: [ViewName; 10] = [
        ViewName::AllOrders,
        ViewName::TraySummaryBySlot,
        ViewName::TraySummaryByDay,
        ViewName::TotalTrays,
        ViewName::SweetLiterBySlot,
        ViewName::SweetLiterByDay,
        ViewName::TotalSweetLiter,
        ViewName::AlarmRanking,
        ViewName::RevenueByDay,
        ViewName::TotalRevenue,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ViewName::AllOrders => "AllOrders",
            ViewName::TraySummaryBySlot => "TraySummaryBySlot",
            ViewName::TraySummaryByDay => "TraySummaryByDay",
            ViewName::TotalTrays => "TotalTrays",
            ViewName::SweetLiterBySlot => "SweetLiterBySlot",
            ViewName::SweetLiterByDay => "SweetLiterByDay",
            ViewName::TotalSweetLiter => "TotalSweetLiter",
            ViewName::AlarmRanking => "AlarmRanking",
            ViewName::RevenueByDay => "RevenueByDay",
            ViewName::TotalRevenue => "TotalRevenue",
        }
    }

    /// 含客户个人信息或营业额，不能出现在公开页面上
    pub fn is_sensitive(self) -> bool {
        matches!(
            self,
            ViewName::AllOrders | ViewName::RevenueByDay | ViewName::TotalRevenue
        )
    }
}

impl fmt::Display for ViewName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 一次汇总的全部视图，保持固定顺序
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSet {
    /// 参与汇总的订单数
    pub order_count: usize,
    tables: Vec<(ViewName, ResultTable)>,
}

impl ReportSet {
    pub fn new(order_count: usize) -> Self {
        Self {
            order_count,
            tables: Vec::with_capacity(ViewName::ALL.len()),
        }
    }

    pub fn insert(&mut self, name: ViewName, table: ResultTable) {
        if let Some(slot) = self.tables.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = table;
        } else {
            self.tables.push((name, table));
        }
    }

    pub fn get(&self, name: ViewName) -> Option<&ResultTable> {
        self.tables.iter().find(|(n, _)| *n == name).map(|(_, t)| t)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ViewName, &ResultTable)> {
        self.tables.iter().map(|(n, t)| (*n, t))
    }

    /// 可以公开发布的视图
    pub fn public_tables(&self) -> impl Iterator<Item = (ViewName, &ResultTable)> {
        self.iter().filter(|(name, _)| !name.is_sensitive())
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl Serialize for ReportSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.tables.len()))?;
        for (name, table) in &self.tables {
            map.serialize_entry(name.as_str(), table)?;
        }
        map.end()
    }
}
