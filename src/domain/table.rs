// ==========================================
// 组件库存公平分配系统 - 表格模型
// ==========================================
// 职责: 输入/输出表格的统一行列表示
// 红线: 引擎只按列名寻址,不依赖列序
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// CellValue - 单元格值
// ==========================================
// Excel 单元格保留原始类型; CSV 单元格统一为 Text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl CellValue {
    /// 构造文本单元格（空白文本视为 Empty）
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.trim().is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(value)
        }
    }

    /// 是否为空（None / NaN / 空白文本）
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Float(f) => f.is_nan(),
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// 数值视图（文本按十进制解析,失败返回 None）
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Int(i) => Some(*i as f64),
            CellValue::Float(f) if f.is_finite() => Some(*f),
            CellValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            CellValue::Text(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Int(i) => write!(f, "{}", i),
            CellValue::Float(v) => write!(f, "{}", v),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&calamine::Data> for CellValue {
    fn from(cell: &calamine::Data) -> Self {
        use calamine::Data;
        match cell {
            Data::Empty | Data::Error(_) => CellValue::Empty,
            Data::Int(i) => CellValue::Int(*i),
            Data::Float(f) => CellValue::Float(*f),
            Data::Bool(b) => CellValue::Bool(*b),
            Data::String(s) => CellValue::text(s.trim()),
            // 日期/时长单元格按文本透传
            other => CellValue::text(other.to_string()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::text(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Int(value)
    }
}

impl From<u64> for CellValue {
    fn from(value: u64) -> Self {
        i64::try_from(value)
            .map(CellValue::Int)
            .unwrap_or(CellValue::Float(value as f64))
    }
}

impl From<Option<String>> for CellValue {
    fn from(value: Option<String>) -> Self {
        value.map(CellValue::text).unwrap_or_default()
    }
}

// ==========================================
// NumericCell - 数值单元格分类
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub enum NumericCell {
    Absent,            // 空值
    Value(f64),        // 可解析的有限数
    Malformed(String), // 非数值（原文）
}

// ==========================================
// RawRow - 原始行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRow {
    pub row_number: usize,      // 源文件行号（表头为第 1 行）
    pub cells: Vec<CellValue>,  // 与表头同序
}

// ==========================================
// RawTable - 原始表
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    pub name: String,           // 表名（sheet 名或文件名,用于错误定位）
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl RawTable {
    pub fn new(name: impl Into<String>, headers: Vec<String>) -> Self {
        Self {
            name: name.into(),
            headers,
            rows: Vec::new(),
        }
    }

    /// 追加一行（行号按追加顺序从 2 开始编号）
    pub fn push_row(&mut self, cells: Vec<CellValue>) {
        let row_number = self.rows.len() + 2;
        self.rows.push(RawRow { row_number, cells });
    }

    /// 列定位: 先精确匹配,再忽略大小写匹配
    pub fn column_index(&self, column: &str) -> Option<usize> {
        let wanted = column.trim();
        self.headers
            .iter()
            .position(|h| h.trim() == wanted)
            .or_else(|| {
                let lowered = wanted.to_lowercase();
                self.headers
                    .iter()
                    .position(|h| h.trim().to_lowercase() == lowered)
            })
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

impl RawRow {
    /// 按列序取值（越界视为空）
    pub fn get(&self, index: usize) -> &CellValue {
        static EMPTY: CellValue = CellValue::Empty;
        self.cells.get(index).unwrap_or(&EMPTY)
    }
}

// ==========================================
// OutputTable - 输出表
// ==========================================
// 报表导出的统一形态（CSV 写出前的最后一层）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputTable {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}
