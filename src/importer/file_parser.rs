// ==========================================
// 组件库存公平分配系统 - 文件解析器实现
// ==========================================
// 支持: Excel (.xlsx/.xlsm/.xls/.ods) / CSV (.csv)
// ==========================================

use crate::domain::table::{CellValue, RawRow, RawTable};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::table_importer_trait::FileParser;
use calamine::{open_workbook_auto, Reader};
use csv::ReaderBuilder;
use std::fs::File;
use std::path::Path;

const WORKBOOK_EXTENSIONS: [&str; 4] = ["xlsx", "xlsm", "xls", "ods"];

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

fn ensure_exists(path: &Path) -> ImportResult<()> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    Ok(())
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_table(&self, file_path: &Path, _sheet: Option<&str>) -> ImportResult<RawTable> {
        let path = file_path;

        // 检查文件存在
        ensure_exists(path)?;

        // 检查扩展名
        let ext = extension_of(path);
        if ext != "csv" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let file = File::open(path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().trim_start_matches('\u{feff}').to_string())
            .collect();

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        let mut table = RawTable::new(name, headers);

        for (row_idx, result) in reader.records().enumerate() {
            let record = result?;
            let cells: Vec<CellValue> = record.iter().map(|v| CellValue::text(v.trim())).collect();

            // 跳过完全空白的行
            if cells.iter().all(CellValue::is_empty) {
                continue;
            }

            // 表头为第 1 行
            let row_number = record
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or(row_idx + 2);
            table.rows.push(RawRow { row_number, cells });
        }

        tracing::debug!(path = %path.display(), rows = table.len(), "CSV 解析完成");
        Ok(table)
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl ExcelParser {
    /// 列出工作簿内全部工作表名称（按工作簿顺序）
    pub fn sheet_names(&self, file_path: &Path) -> ImportResult<Vec<String>> {
        ensure_exists(file_path)?;
        let ext = extension_of(file_path);
        if !WORKBOOK_EXTENSIONS.contains(&ext.as_str()) {
            return Err(ImportError::UnsupportedFormat(ext));
        }
        let workbook = open_workbook_auto(file_path)?;
        Ok(workbook.sheet_names().to_vec())
    }
}

impl FileParser for ExcelParser {
    fn parse_table(&self, file_path: &Path, sheet: Option<&str>) -> ImportResult<RawTable> {
        let path = file_path;

        ensure_exists(path)?;

        let ext = extension_of(path);
        if !WORKBOOK_EXTENSIONS.contains(&ext.as_str()) {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let mut workbook = open_workbook_auto(path)?;

        let sheet_names = workbook.sheet_names().to_vec();
        let sheet_name = match sheet {
            Some(wanted) => sheet_names
                .iter()
                .find(|s| s.as_str() == wanted)
                .cloned()
                .ok_or_else(|| ImportError::SheetNotFound {
                    path: path.display().to_string(),
                    sheet: wanted.to_string(),
                })?,
            None => sheet_names
                .first()
                .cloned()
                .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?,
        };

        let range = workbook.worksheet_range(&sheet_name)?;

        // 区域起点（0 基行号）,空表为 None
        let start_row = range.start().map(|(r, _)| r as usize).unwrap_or(0);

        // 提取表头（第一行）
        let mut rows = range.rows();
        let header_row = rows.next().ok_or_else(|| {
            ImportError::ExcelParseError(format!("工作表无数据行: {}", sheet_name))
        })?;

        let headers: Vec<String> = header_row
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect();

        let mut table = RawTable::new(sheet_name.clone(), headers);

        for (idx, data_row) in rows.enumerate() {
            let cells: Vec<CellValue> = data_row.iter().map(CellValue::from).collect();

            // 跳过完全空白的行
            if cells.iter().all(CellValue::is_empty) {
                continue;
            }

            table.rows.push(RawRow {
                row_number: start_row + idx + 2,
                cells,
            });
        }

        tracing::debug!(
            path = %path.display(),
            sheet = %sheet_name,
            rows = table.len(),
            "工作表解析完成"
        );
        Ok(table)
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl UniversalFileParser {
    pub fn parse<P: AsRef<Path>>(&self, file_path: P, sheet: Option<&str>) -> ImportResult<RawTable> {
        let path = file_path.as_ref();
        let ext = extension_of(path);

        match ext.as_str() {
            "csv" => CsvParser.parse_table(path, sheet),
            e if WORKBOOK_EXTENSIONS.contains(&e) => ExcelParser.parse_table(path, sheet),
            _ => Err(ImportError::UnsupportedFormat(ext)),
        }
    }

    /// 列出工作表（CSV 视为只有一个以文件名命名的表）
    pub fn sheet_names<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<Vec<String>> {
        let path = file_path.as_ref();
        match extension_of(path).as_str() {
            "csv" => {
                ensure_exists(path)?;
                Ok(vec![path
                    .file_stem()
                    .map(|s| s.to_string_lossy().to_string())
                    .unwrap_or_default()])
            }
            _ => ExcelParser.sheet_names(path),
        }
    }
}
