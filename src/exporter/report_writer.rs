// ==========================================
// 组件库存公平分配系统 - 报表写出
// ==========================================
// 输出: <out>/<表名>.csv × 3 + <out>/<workbook_file>（三表各一个 sheet）+ <out>/<summary_file>
// 红线: 报表内容只依赖输入; run_id / 时间戳只出现在摘要中
// ==========================================

use crate::config::OutputConfig;
use crate::domain::quality::DqViolation;
use crate::domain::table::{CellValue, OutputTable};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::orchestrator::{AllocationRun, RunSummary};
use csv::Writer;
use rust_xlsxwriter::{Workbook, Worksheet};
use serde::Serialize;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// 已写出的文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFiles {
    pub allocation: PathBuf,
    pub stock: PathBuf,
    pub usage: PathBuf,
    pub workbook: PathBuf,
    pub summary: PathBuf,
}

/// 摘要文件内容
#[derive(Serialize)]
struct SummaryDocument<'a> {
    summary: RunSummary,
    data_quality: &'a [DqViolation],
}

pub struct ReportWriter<'a> {
    out_dir: PathBuf,
    output: &'a OutputConfig,
}

impl<'a> ReportWriter<'a> {
    pub fn new(out_dir: impl Into<PathBuf>, output: &'a OutputConfig) -> Self {
        Self {
            out_dir: out_dir.into(),
            output,
        }
    }

    /// 写出全部报表（目录不存在时自动创建）
    pub fn write(&self, run: &AllocationRun) -> EngineResult<ExportedFiles> {
        fs::create_dir_all(&self.out_dir)?;

        let reports = &run.reports;
        let tables = [
            reports.allocation_table(&self.output.allocation_table),
            reports.stock_table(&self.output.stock_table),
            reports.usage_table(&self.output.usage_table),
        ];
        let files = ExportedFiles {
            allocation: self.write_table(&tables[0])?,
            stock: self.write_table(&tables[1])?,
            usage: self.write_table(&tables[2])?,
            workbook: self.write_workbook(&tables)?,
            summary: self.write_summary(run)?,
        };

        tracing::info!(
            out_dir = %self.out_dir.display(),
            allocation_rows = reports.allocation.len(),
            stock_rows = reports.stock.len(),
            usage_rows = reports.usage.len(),
            "报表写出完成"
        );
        Ok(files)
    }

    /// 写出单张表为 CSV（表头总是写出）
    pub fn write_table(&self, table: &OutputTable) -> EngineResult<PathBuf> {
        let path = self.out_dir.join(format!("{}.csv", table.name));
        write_csv(&path, table)?;
        tracing::debug!(path = %path.display(), rows = table.rows.len(), "CSV 写出");
        Ok(path)
    }

    /// 写出工作簿（每张表一个 sheet,按传入顺序）
    pub fn write_workbook(&self, tables: &[OutputTable]) -> EngineResult<PathBuf> {
        let path = self.out_dir.join(&self.output.workbook_file);
        let mut workbook = Workbook::new();
        for table in tables {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(table.name.as_str())?;
            fill_worksheet(worksheet, table)?;
        }
        workbook.save(&path)?;
        tracing::debug!(path = %path.display(), sheets = tables.len(), "工作簿写出");
        Ok(path)
    }

    fn write_summary(&self, run: &AllocationRun) -> EngineResult<PathBuf> {
        let path = self.out_dir.join(&self.output.summary_file);
        let document = SummaryDocument {
            summary: run.summary(),
            data_quality: &run.dq_report.violations,
        };
        let file = File::create(&path)?;
        serde_json::to_writer_pretty(file, &document)?;
        Ok(path)
    }
}

fn write_csv(path: &Path, table: &OutputTable) -> EngineResult<()> {
    let mut wtr = Writer::from_path(path)?;
    wtr.write_record(&table.headers)?;
    for row in &table.rows {
        wtr.write_record(row.iter().map(|cell| cell.to_string()))?;
    }
    wtr.flush()?;
    Ok(())
}

fn fill_worksheet(worksheet: &mut Worksheet, table: &OutputTable) -> EngineResult<()> {
    for (col, header) in table.headers.iter().enumerate() {
        worksheet.write_string(0, sheet_col(col)?, header.as_str())?;
    }
    for (index, row) in table.rows.iter().enumerate() {
        let row_num = sheet_row(index + 1)?;
        for (col, cell) in row.iter().enumerate() {
            let col = sheet_col(col)?;
            match cell {
                CellValue::Empty => {}
                CellValue::Int(i) => {
                    worksheet.write_number(row_num, col, *i as f64)?;
                }
                CellValue::Float(f) => {
                    worksheet.write_number(row_num, col, *f)?;
                }
                CellValue::Bool(b) => {
                    worksheet.write_boolean(row_num, col, *b)?;
                }
                CellValue::Text(s) => {
                    worksheet.write_string(row_num, col, s.as_str())?;
                }
            }
        }
    }
    Ok(())
}

fn sheet_row(index: usize) -> EngineResult<u32> {
    u32::try_from(index).map_err(|_| EngineError::Export(format!("行号越界: {}", index)))
}

fn sheet_col(index: usize) -> EngineResult<u16> {
    u16::try_from(index).map_err(|_| EngineError::Export(format!("列号越界: {}", index)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::UniversalFileParser;
    use tempfile::TempDir;

    #[test]
    fn test_write_table_keeps_header_for_empty_table() {
        let dir = TempDir::new().unwrap();
        let output = OutputConfig::default();
        let writer = ReportWriter::new(dir.path().join("nested"), &output);
        fs::create_dir_all(dir.path().join("nested")).unwrap();

        let table = OutputTable {
            name: "Component_Usage".to_string(),
            headers: vec!["Component_ID".to_string(), "Qty_Used".to_string()],
            rows: Vec::new(),
        };
        let path = writer.write_table(&table).unwrap();

        let content = fs::read_to_string(path).unwrap();
        assert_eq!(content, "Component_ID,Qty_Used\n");
    }

    #[test]
    fn test_write_table_quotes_semicolon_lists_and_blanks() {
        let dir = TempDir::new().unwrap();
        let output = OutputConfig::default();
        let writer = ReportWriter::new(dir.path(), &output);

        let table = OutputTable {
            name: "Product_Allocation".to_string(),
            headers: vec!["Product_ID".to_string(), "Components_Used".to_string(), "note".to_string()],
            rows: vec![vec![
                CellValue::text("P"),
                CellValue::text("Y:4; Z:2"),
                CellValue::Empty,
            ]],
        };
        let path = writer.write_table(&table).unwrap();

        let content = fs::read_to_string(path).unwrap();
        assert_eq!(content, "Product_ID,Components_Used,note\nP,Y:4; Z:2,\n");
    }

    #[test]
    fn test_workbook_holds_one_sheet_per_table() {
        let dir = TempDir::new().unwrap();
        let output = OutputConfig::default();
        let writer = ReportWriter::new(dir.path(), &output);

        let tables = [
            OutputTable {
                name: "Product_Allocation".to_string(),
                headers: vec!["Product_ID".to_string(), "Allocated".to_string()],
                rows: vec![vec![CellValue::text("P"), CellValue::Int(2)]],
            },
            OutputTable {
                name: "Stock_Report".to_string(),
                headers: vec!["Component_ID".to_string()],
                rows: vec![vec![CellValue::text("X")], vec![CellValue::text("Y")]],
            },
            OutputTable {
                name: "Component_Usage".to_string(),
                headers: vec!["Component_ID".to_string()],
                rows: Vec::new(),
            },
        ];
        let path = writer.write_workbook(&tables).unwrap();
        assert_eq!(path, dir.path().join("fair_allocation.xlsx"));

        let parser = UniversalFileParser;
        assert_eq!(
            parser.sheet_names(&path).unwrap(),
            vec!["Product_Allocation", "Stock_Report", "Component_Usage"]
        );
        let allocation = parser.parse(&path, Some("Product_Allocation")).unwrap();
        assert_eq!(allocation.headers, vec!["Product_ID", "Allocated"]);
        assert_eq!(allocation.rows[0].get(0), &CellValue::text("P"));
        assert_eq!(allocation.rows[0].get(1).as_f64(), Some(2.0));
        let stock = parser.parse(&path, Some("Stock_Report")).unwrap();
        assert_eq!(stock.len(), 2);
    }
}
