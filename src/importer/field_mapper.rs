// ==========================================
// 组件库存公平分配系统 - 字段映射器实现
// ==========================================
// 职责: 原始表 → 需求记录 / BOM 记录 + 类型转换
// 红线: 缺少必需列 → 致命错误; 值级问题 → DQ 报告
// ==========================================

use crate::config::AllocationConfig;
use crate::domain::product::{BomRecord, DemandRecord, Extras};
use crate::domain::quality::DqReport;
use crate::domain::table::{CellValue, NumericCell, RawRow, RawTable};
use crate::domain::types::StockKeyMode;
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::error::{ImportError, ImportResult};

/// 需求表角色
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemandRole {
    /// 补货主表: 产品来源 + 主库存
    Primary,
    /// 暂存表: 仅提供后备库存
    Staging,
}

/// 需求表列位置
struct DemandColumnIndex {
    is_bom: usize,
    product_id: Option<usize>,
    description: Option<usize>,
    stock_on_hand: usize,
    forecasts: Vec<Option<usize>>,
}

/// BOM 表列位置
struct BomColumnIndex {
    product_id: usize,
    component: usize,
    quantity: usize,
}

pub struct FieldMapper<'a> {
    config: &'a AllocationConfig,
    cleaner: DataCleaner,
}

impl<'a> FieldMapper<'a> {
    pub fn new(config: &'a AllocationConfig) -> Self {
        Self {
            config,
            cleaner: DataCleaner,
        }
    }

    /// 定位必需列
    fn require(&self, table: &RawTable, column: &str) -> ImportResult<usize> {
        table
            .column_index(column)
            .ok_or_else(|| ImportError::MissingColumn {
                table: table.name.clone(),
                column: column.to_string(),
            })
    }

    fn resolve_demand_columns(
        &self,
        table: &RawTable,
        role: DemandRole,
        dq: &mut DqReport,
    ) -> ImportResult<DemandColumnIndex> {
        let columns = &self.config.demand_columns;
        let key_column = columns.key_column(self.config.stock_key);

        let is_bom = self.require(table, &columns.is_bom)?;
        let stock_on_hand = self.require(table, &columns.stock_on_hand)?;

        let (product_id, description) = match role {
            DemandRole::Primary => (
                Some(self.require(table, &columns.product_id)?),
                Some(self.require(table, &columns.description)?),
            ),
            DemandRole::Staging => {
                // 暂存表只要求聚合键列
                self.require(table, key_column)?;
                (
                    table.column_index(&columns.product_id),
                    table.column_index(&columns.description),
                )
            }
        };

        let forecasts = match role {
            DemandRole::Primary => columns
                .forecasts
                .iter()
                .map(|name| {
                    let index = table.column_index(name);
                    if index.is_none() {
                        dq.info(&table.name, 0, None, name, "预测列不存在,视为全部缺失");
                    }
                    index
                })
                .collect(),
            DemandRole::Staging => Vec::new(),
        };

        Ok(DemandColumnIndex {
            is_bom,
            product_id,
            description,
            stock_on_hand,
            forecasts,
        })
    }

    /// 需求表映射
    ///
    /// # 参数
    /// - table: 原始表
    /// - role: 主表 / 暂存表
    /// - dq: 数据质量报告（追加）
    ///
    /// # 返回
    /// - Ok(Vec<DemandRecord>): 按原始行顺序
    /// - Err(MissingColumn): 缺少必需列
    pub fn map_demand_table(
        &self,
        table: &RawTable,
        role: DemandRole,
        dq: &mut DqReport,
    ) -> ImportResult<Vec<DemandRecord>> {
        let index = self.resolve_demand_columns(table, role, dq)?;

        let records = table
            .rows
            .iter()
            .map(|row| self.map_demand_row(table, row, &index, role, dq))
            .collect();
        Ok(records)
    }

    fn map_demand_row(
        &self,
        table: &RawTable,
        row: &RawRow,
        index: &DemandColumnIndex,
        role: DemandRole,
        dq: &mut DqReport,
    ) -> DemandRecord {
        let columns = &self.config.demand_columns;
        let product_id = index
            .product_id
            .and_then(|i| self.cleaner.normalize_id(row.get(i)));
        // 描述只在作为聚合键时规范化,否则仅去空白
        let description = index.description.and_then(|i| match self.config.stock_key {
            StockKeyMode::Description => self.cleaner.normalize_id(row.get(i)),
            StockKeyMode::ProductId => self.cleaner.normalize_null(Some(row.get(i).to_string())),
        });
        let key = product_id.as_deref().or(description.as_deref());

        // 复合标志
        let flag_cell = row.get(index.is_bom);
        let is_bom = self.cleaner.parse_flag(flag_cell);
        if is_bom.is_none() {
            dq.warning(
                &table.name,
                row.row_number,
                key,
                &columns.is_bom,
                format!(
                    "复合标志无法识别 ({:?}),按非 BOM 处理且不计入库存",
                    flag_cell.to_string()
                ),
            );
        }

        // 库存（BOM 行不校验）
        let stock_on_hand = if is_bom == Some(true) {
            0
        } else {
            self.coerce_stock(table, row, index.stock_on_hand, key, dq)
        };

        // 预测信号
        let forecasts = index
            .forecasts
            .iter()
            .zip(columns.forecasts.iter())
            .map(|(column_index, name)| {
                let i = (*column_index)?;
                match self.cleaner.classify_number(row.get(i)) {
                    NumericCell::Absent => None,
                    NumericCell::Value(v) => Some(v),
                    NumericCell::Malformed(raw) => {
                        dq.warning(
                            &table.name,
                            row.row_number,
                            key,
                            name,
                            format!("预测值无法解析为数值 ({}),视为缺失", raw),
                        );
                        None
                    }
                }
            })
            .collect();

        // 透传字段（暂存表不透传; 标识列透传规范化后的值）
        let extras: Extras = match role {
            DemandRole::Primary => table
                .headers
                .iter()
                .enumerate()
                .map(|(i, header)| {
                    let value = if index.product_id == Some(i) {
                        CellValue::from(product_id.clone())
                    } else {
                        row.get(i).clone()
                    };
                    (header.clone(), value)
                })
                .collect(),
            DemandRole::Staging => Vec::new(),
        };

        DemandRecord {
            row_number: row.row_number,
            is_bom,
            product_id,
            description,
            stock_on_hand,
            forecasts,
            extras,
        }
    }

    /// 库存数量强制转换: 缺失 → 0; 非数值 → 0 (警告); 负数 → 0 (警告); 小数向零截断
    fn coerce_stock(
        &self,
        table: &RawTable,
        row: &RawRow,
        column: usize,
        key: Option<&str>,
        dq: &mut DqReport,
    ) -> u64 {
        let field = &self.config.demand_columns.stock_on_hand;
        match self.cleaner.classify_number(row.get(column)) {
            NumericCell::Absent => 0,
            NumericCell::Malformed(raw) => {
                dq.warning(
                    &table.name,
                    row.row_number,
                    key,
                    field,
                    format!("库存数量无法解析 ({}),按 0 处理", raw),
                );
                0
            }
            NumericCell::Value(v) => {
                let quantity = self.cleaner.truncate(v);
                if quantity < 0 {
                    dq.warning(
                        &table.name,
                        row.row_number,
                        key,
                        field,
                        format!("库存数量为负 ({}),按 0 处理", quantity),
                    );
                    0
                } else {
                    quantity as u64
                }
            }
        }
    }

    fn resolve_bom_columns(&self, table: &RawTable) -> ImportResult<BomColumnIndex> {
        let columns = &self.config.bom_columns;
        Ok(BomColumnIndex {
            product_id: self.require(table, &columns.product_id)?,
            component: self.require(table, columns.component_column(self.config.stock_key))?,
            quantity: self.require(table, &columns.quantity)?,
        })
    }

    /// BOM 表映射（值校验由 BOM 展开器负责）
    pub fn map_bom_table(&self, table: &RawTable) -> ImportResult<Vec<BomRecord>> {
        let index = self.resolve_bom_columns(table)?;

        Ok(table
            .rows
            .iter()
            .map(|row| BomRecord {
                row_number: row.row_number,
                product_id: self.cleaner.normalize_id(row.get(index.product_id)),
                component: self.cleaner.normalize_id(row.get(index.component)),
                quantity: self.cleaner.classify_number(row.get(index.quantity)),
            })
            .collect())
    }
}
