// ==========================================
// 组件库存公平分配系统 - 数据质量模型
// ==========================================
// 用途: 非致命问题的显式上报（值被替换 / 行被跳过 / 产品不可分配）
// ==========================================

use crate::domain::types::DqLevel;
use serde::{Deserialize, Serialize};

// ==========================================
// DqViolation - 数据质量违规
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DqViolation {
    pub table: String,          // 来源表
    pub row_number: usize,      // 原始文件行号（0 表示非行级问题）
    pub key: Option<String>,    // 产品/组件键（如果可解析）
    pub level: DqLevel,
    pub field: String,
    pub message: String,
}

// ==========================================
// DqSummary - 数据质量汇总
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DqSummary {
    pub warning: usize,
    pub info: usize,
}

// ==========================================
// DqReport - 数据质量报告
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DqReport {
    pub violations: Vec<DqViolation>,
}

impl DqReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一条违规,同时写日志
    pub fn record(&mut self, violation: DqViolation) {
        match violation.level {
            DqLevel::Warning => tracing::warn!(
                table = %violation.table,
                row = violation.row_number,
                key = violation.key.as_deref().unwrap_or(""),
                field = %violation.field,
                "{}",
                violation.message
            ),
            DqLevel::Info => tracing::debug!(
                table = %violation.table,
                row = violation.row_number,
                key = violation.key.as_deref().unwrap_or(""),
                field = %violation.field,
                "{}",
                violation.message
            ),
        }
        self.violations.push(violation);
    }

    pub fn warning(
        &mut self,
        table: &str,
        row_number: usize,
        key: Option<&str>,
        field: &str,
        message: impl Into<String>,
    ) {
        self.record(DqViolation {
            table: table.to_string(),
            row_number,
            key: key.map(str::to_string),
            level: DqLevel::Warning,
            field: field.to_string(),
            message: message.into(),
        });
    }

    pub fn info(
        &mut self,
        table: &str,
        row_number: usize,
        key: Option<&str>,
        field: &str,
        message: impl Into<String>,
    ) {
        self.record(DqViolation {
            table: table.to_string(),
            row_number,
            key: key.map(str::to_string),
            level: DqLevel::Info,
            field: field.to_string(),
            message: message.into(),
        });
    }

    pub fn summary(&self) -> DqSummary {
        let warning = self
            .violations
            .iter()
            .filter(|v| v.level == DqLevel::Warning)
            .count();
        DqSummary {
            warning,
            info: self.violations.len() - warning,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// 按字段筛选（测试与排查用）
    pub fn by_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a DqViolation> + 'a {
        self.violations.iter().filter(move |v| v.field == field)
    }
}
