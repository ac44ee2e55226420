// ==========================================
// 组件库存公平分配系统 - 导出层
// ==========================================
// 职责: 报表 CSV / 工作簿 + 运行摘要 JSON 写出
// ==========================================

pub mod report_writer;

pub use report_writer::{ExportedFiles, ReportWriter};
