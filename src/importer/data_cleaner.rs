// ==========================================
// 组件库存公平分配系统 - 数据清洗器实现
// ==========================================
// 职责: 标识规范化 / NULL 标准化 / 数值与标志强制转换
// 红线: 清洗不报错; 无法解析的值由调用方记入 DQ 报告
// ==========================================

pub use crate::domain::table::NumericCell;
use crate::domain::table::CellValue;

pub struct DataCleaner;

impl DataCleaner {
    /// 规范化标识/描述
    ///
    /// 规则:
    /// 1) 空值 → None（绝不返回空串）
    /// 2) 去除首尾空白
    /// 3) 去除数值转文本遗留的 ".0" 尾巴
    ///
    /// 幂等: normalize(normalize(x)) == normalize(x)
    pub fn normalize_id(&self, value: &CellValue) -> Option<String> {
        let raw = match value {
            CellValue::Empty => return None,
            CellValue::Float(f) if !f.is_finite() => return None,
            CellValue::Int(i) => i.to_string(),
            CellValue::Float(f) => f.to_string(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Text(s) => s.clone(),
        };
        self.normalize_text(&raw)
    }

    /// 文本版规范化（供已是字符串的值复用）
    pub fn normalize_text(&self, value: &str) -> Option<String> {
        let mut text = value.trim();
        while let Some(stripped) = text.strip_suffix(".0") {
            text = stripped.trim_end();
        }
        if text.is_empty() {
            None
        } else {
            Some(text.to_string())
        }
    }

    /// NULL 标准化（空白视为 None）
    pub fn normalize_null(&self, value: Option<String>) -> Option<String> {
        value.and_then(|v| {
            let trimmed = v.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
    }

    /// 数值分类
    pub fn classify_number(&self, value: &CellValue) -> NumericCell {
        if value.is_empty() {
            return NumericCell::Absent;
        }
        match value.as_f64() {
            Some(f) => NumericCell::Value(f),
            None => NumericCell::Malformed(value.to_string()),
        }
    }

    /// 浮点 → 整数（向零截断,越界饱和）
    pub fn truncate(&self, value: f64) -> i64 {
        // `as` 对越界值饱和、对 NaN 取 0
        value.trunc() as i64
    }

    /// 复合标志解析
    ///
    /// # 返回
    /// - Some(true): 1 / Y / YES / TRUE / 是
    /// - Some(false): 0 / N / NO / FALSE / 否
    /// - None: 空值或无法识别
    pub fn parse_flag(&self, value: &CellValue) -> Option<bool> {
        match value {
            CellValue::Bool(b) => Some(*b),
            CellValue::Int(i) => match i {
                0 => Some(false),
                1 => Some(true),
                _ => None,
            },
            CellValue::Float(f) => {
                if *f == 0.0 {
                    Some(false)
                } else if *f == 1.0 {
                    Some(true)
                } else {
                    None
                }
            }
            CellValue::Text(s) => {
                let upper = s.trim().to_uppercase();
                match upper.as_str() {
                    "1" | "1.0" | "Y" | "YES" | "TRUE" | "是" => Some(true),
                    "0" | "0.0" | "N" | "NO" | "FALSE" | "否" => Some(false),
                    _ => None,
                }
            }
            CellValue::Empty => None,
        }
    }
}
