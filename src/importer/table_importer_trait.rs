// ==========================================
// 组件库存公平分配系统 - 表格导入 Trait
// ==========================================
// 职责: 定义表格读取接口（不包含实现）
// ==========================================

use crate::domain::table::RawTable;
use crate::importer::error::ImportResult;
use std::path::Path;

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析接口
// 实现者: CsvParser, ExcelParser
pub trait FileParser: Send + Sync {
    /// 解析文件为原始表
    ///
    /// # 参数
    /// - file_path: 文件路径
    /// - sheet: 工作表名（CSV 忽略; Excel 为 None 时取第一个工作表）
    ///
    /// # 返回
    /// - Ok(RawTable): 表头 + 非空白数据行
    /// - Err: 文件读取错误、格式错误、工作表不存在
    fn parse_table(&self, file_path: &Path, sheet: Option<&str>) -> ImportResult<RawTable>;
}
