// ==========================================
// 组件库存公平分配系统 - 引擎编排器
// ==========================================
// 用途: 协调映射 / 库存 / BOM / 分配 / 审计 / 报表的执行顺序
// 红线: 每次运行使用独立的库存副本,运行之间不共享状态
// ==========================================

use crate::config::AllocationConfig;
use crate::domain::product::Product;
use crate::domain::quality::{DqReport, DqSummary};
use crate::domain::report::AllocationReports;
use crate::domain::stock::StockPool;
use crate::domain::table::RawTable;
use crate::domain::types::{ProductType, StockKeyMode};
use crate::engine::bom::BomExpander;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::fair_allocator::FairAllocator;
use crate::engine::inventory::InventoryViewBuilder;
use crate::engine::product_builder::ProductBuilder;
use crate::engine::report_builder::ReportBuilder;
use crate::engine::stock_merger::{MergedStock, StockMerger};
use crate::importer::{DemandRole, FieldMapper, UniversalFileParser};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, instrument};
use uuid::Uuid;

// ==========================================
// 输入
// ==========================================

/// 三张输入表
#[derive(Debug, Clone)]
pub struct AllocationInputs {
    pub demand: RawTable,
    pub staging: RawTable,
    pub bom: RawTable,
}

/// 输入表位置（文件 + 可选 sheet 名）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSource {
    pub path: PathBuf,
    pub sheet: Option<String>,
}

impl TableSource {
    pub fn new(path: impl Into<PathBuf>, sheet: Option<&str>) -> Self {
        Self {
            path: path.into(),
            sheet: sheet.map(str::to_string),
        }
    }
}

// ==========================================
// AllocationRun - 运行结果
// ==========================================
#[derive(Debug, Clone)]
pub struct AllocationRun {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: u64,
    pub stock_key: StockKeyMode,
    pub products: Vec<Product>,
    pub initial_stock: StockPool,
    pub remaining_stock: StockPool,
    pub stage_only: HashSet<String>,
    pub passes: u64,
    pub reports: AllocationReports,
    pub dq_report: DqReport,
}

/// 运行摘要（写入 JSON）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: u64,
    pub stock_key: StockKeyMode,
    pub products: usize,
    pub bom_products: usize,
    pub unallocatable_products: usize,
    pub total_target: u64,
    pub total_allocated: u64,
    pub stock_keys: usize,
    pub stage_only_keys: usize,
    pub initial_stock_total: u64,
    pub remaining_stock_total: u64,
    pub passes: u64,
    pub data_quality: DqSummary,
}

impl AllocationRun {
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            run_id: self.run_id.clone(),
            started_at: self.started_at,
            elapsed_ms: self.elapsed_ms,
            stock_key: self.stock_key,
            products: self.products.len(),
            bom_products: self
                .products
                .iter()
                .filter(|p| p.product_type == ProductType::Bom)
                .count(),
            unallocatable_products: self.products.iter().filter(|p| !p.is_allocatable()).count(),
            total_target: self.products.iter().map(|p| p.target).sum(),
            total_allocated: self.products.iter().map(|p| p.allocated).sum(),
            stock_keys: self.initial_stock.len(),
            stage_only_keys: self.stage_only.len(),
            initial_stock_total: self.initial_stock.total(),
            remaining_stock_total: self.remaining_stock.total(),
            passes: self.passes,
            data_quality: self.dq_report.summary(),
        }
    }
}

// ==========================================
// AllocationOrchestrator - 引擎编排器
// ==========================================
pub struct AllocationOrchestrator<'a> {
    config: &'a AllocationConfig,
    allocator: FairAllocator,
}

impl<'a> AllocationOrchestrator<'a> {
    pub fn new(config: &'a AllocationConfig) -> Self {
        Self {
            config,
            allocator: FairAllocator::new(),
        }
    }

    /// 执行完整分配流程
    ///
    /// 步骤:
    /// 1) 字段映射（缺少必需列 → 致命错误）
    /// 2) 主库存 / 暂存库存构建并合并
    /// 3) BOM 展开 + 产品构建
    /// 4) 公平轮转分配
    /// 5) 运行后审计
    /// 6) 报表构建
    #[instrument(skip(self, inputs), fields(
        demand = %inputs.demand.name,
        staging = %inputs.staging.name,
        bom = %inputs.bom.name,
        stock_key = %self.config.stock_key
    ))]
    pub fn run(&self, inputs: AllocationInputs) -> EngineResult<AllocationRun> {
        let started_at = Utc::now();
        let clock = Instant::now();
        let run_id = Uuid::new_v4().to_string();
        info!(
            run_id = %run_id,
            demand_rows = inputs.demand.len(),
            staging_rows = inputs.staging.len(),
            bom_rows = inputs.bom.len(),
            "开始执行分配流程"
        );

        let mut dq = DqReport::new();
        let mapper = FieldMapper::new(self.config);

        // ==========================================
        // 步骤1: 字段映射
        // ==========================================
        debug!("步骤1: 字段映射");
        let demand = mapper.map_demand_table(&inputs.demand, DemandRole::Primary, &mut dq)?;
        let staging = mapper.map_demand_table(&inputs.staging, DemandRole::Staging, &mut dq)?;
        let bom = mapper.map_bom_table(&inputs.bom)?;

        // ==========================================
        // 步骤2: 库存视图 + 合并
        // ==========================================
        debug!("步骤2: 构建库存池");
        let keys = InventoryViewBuilder::new(self.config.stock_key);
        let primary_pool = keys.build(&demand, &inputs.demand.name, &mut dq);
        let staging_pool = keys.build(&staging, &inputs.staging.name, &mut dq);
        let merged = StockMerger.merge(primary_pool, &staging_pool);

        // ==========================================
        // 步骤3: BOM 展开 + 产品构建
        // ==========================================
        debug!("步骤3: BOM 展开与产品构建");
        let mapping = BomExpander::new().expand(&bom, &inputs.bom.name, &mut dq);
        let mut products = ProductBuilder::new(&mapping, &keys).build(demand, &inputs.demand.name, &mut dq);

        // ==========================================
        // 步骤4: 公平分配
        // ==========================================
        debug!("步骤4: 公平轮转分配");
        let outcome = self.allocator.allocate(&mut products, merged.pool.clone());

        // ==========================================
        // 步骤5: 审计
        // ==========================================
        debug!("步骤5: 运行后审计");
        verify(&products, &merged.pool, &outcome.remaining)?;

        // ==========================================
        // 步骤6: 报表
        // ==========================================
        debug!("步骤6: 构建报表");
        let reports = ReportBuilder.build(
            &products,
            &merged,
            &outcome.remaining,
            inputs.demand.headers.clone(),
        );

        let MergedStock { pool, stage_only } = merged;
        let run = AllocationRun {
            run_id,
            started_at,
            elapsed_ms: clock.elapsed().as_millis() as u64,
            stock_key: self.config.stock_key,
            products,
            initial_stock: pool,
            remaining_stock: outcome.remaining,
            stage_only,
            passes: outcome.passes,
            reports,
            dq_report: dq,
        };

        let summary = run.summary();
        info!(
            run_id = %run.run_id,
            products = summary.products,
            allocated = summary.total_allocated,
            target = summary.total_target,
            passes = summary.passes,
            warnings = summary.data_quality.warning,
            elapsed_ms = run.elapsed_ms,
            "分配流程完成"
        );
        Ok(run)
    }

    /// 从文件读取三张表后执行分配
    pub fn run_from_files(
        &self,
        demand: &TableSource,
        staging: &TableSource,
        bom: &TableSource,
    ) -> EngineResult<AllocationRun> {
        let parser = UniversalFileParser;
        let inputs = AllocationInputs {
            demand: parser.parse(&demand.path, demand.sheet.as_deref())?,
            staging: parser.parse(&staging.path, staging.sheet.as_deref())?,
            bom: parser.parse(&bom.path, bom.sheet.as_deref())?,
        };
        self.run(inputs)
    }
}

// ==========================================
// 运行后审计
// ==========================================

/// 校验分配结果
///
/// 1) 每个产品 Allocated <= Target
/// 2) 消耗的组件都在库存池中
/// 3) 每个组件: 初始 - 剩余 == 全部产品消耗合计
pub fn verify(products: &[Product], initial: &StockPool, remaining: &StockPool) -> EngineResult<()> {
    let mut used: HashMap<&str, u64> = HashMap::new();

    for product in products {
        if product.allocated > product.target {
            return Err(EngineError::TargetExceeded {
                product: product.label().to_string(),
                allocated: product.allocated,
                target: product.target,
            });
        }
        for (key, quantity) in product.components_used.iter() {
            if !initial.contains(key) {
                return Err(EngineError::UnknownComponentUsed {
                    product: product.label().to_string(),
                    component: key.to_string(),
                });
            }
            *used.entry(key).or_insert(0) += quantity;
        }
    }

    for (key, initial_qty) in initial.iter() {
        let remaining_qty = remaining.available(key);
        let used_qty = used.get(key).copied().unwrap_or(0);
        if remaining_qty > initial_qty || initial_qty - remaining_qty != used_qty {
            return Err(EngineError::ConservationViolated {
                component: key.to_string(),
                initial: initial_qty,
                remaining: remaining_qty,
                used: used_qty,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::product::ComponentSet;
    use crate::domain::table::CellValue;
    use crate::importer::ImportError;

    fn table(name: &str, headers: &[&str], rows: &[&[&str]]) -> RawTable {
        let mut table = RawTable::new(name, headers.iter().map(|h| h.to_string()).collect());
        for row in rows {
            table.push_row(row.iter().map(|c| CellValue::text(*c)).collect());
        }
        table
    }

    const DEMAND_HEADERS: [&str; 8] = [
        "Is_BOM",
        "productId",
        "Description",
        "inventory_wh_bp",
        "model_a_oos_suggested_qty",
        "model_b_oos_suggested_qty",
        "model_c_oos_suggested_qty",
        "model_new_oos_suggested_qty",
    ];

    fn inputs(demand_rows: &[&[&str]], staging_rows: &[&[&str]], bom_rows: &[&[&str]]) -> AllocationInputs {
        AllocationInputs {
            demand: table("Replenishment", &DEMAND_HEADERS, demand_rows),
            staging: table("Stage", &DEMAND_HEADERS, staging_rows),
            bom: table(
                "BOM",
                &["Product ID", "Component Product ID", "Quantity"],
                bom_rows,
            ),
        }
    }

    #[test]
    fn test_run_end_to_end() {
        let config = AllocationConfig::default();
        let run = AllocationOrchestrator::new(&config)
            .run(inputs(
                &[
                    &["N", "Y", "Comp Y", "5", "", "", "", ""],
                    &["N", "Z", "Comp Z", "10", "", "", "", ""],
                    &["Y", "P", "Kit P", "", "3", "", "", ""],
                ],
                &[&["N", "S", "Stage S", "10", "", "", "", ""]],
                &[&["P", "Y", "2"], &["P", "Z", "1"]],
            ))
            .unwrap();

        let kit = &run.products[2];
        assert_eq!(kit.target, 3);
        assert_eq!(kit.allocated, 2);
        assert_eq!(run.remaining_stock.available("Y"), 1);
        assert_eq!(run.remaining_stock.available("Z"), 8);
        assert!(run.stage_only.contains("S"));
        assert_eq!(run.reports.stock.len(), 3);

        let summary = run.summary();
        assert_eq!(summary.products, 3);
        assert_eq!(summary.bom_products, 1);
        assert_eq!(summary.total_allocated, 2);
        assert_eq!(summary.stage_only_keys, 1);
    }

    #[test]
    fn test_missing_column_is_fatal() {
        let config = AllocationConfig::default();
        let mut bad = inputs(&[], &[], &[]);
        bad.bom = table("BOM", &["Product ID", "Quantity"], &[]);

        let err = AllocationOrchestrator::new(&config).run(bad).unwrap_err();
        match err {
            EngineError::Import(ImportError::MissingColumn { table, column }) => {
                assert_eq!(table, "BOM");
                assert_eq!(column, "Component Product ID");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    fn product(target: u64, allocated: u64, used: &[(&str, u64)]) -> Product {
        Product {
            row_number: 2,
            product_id: Some("P".to_string()),
            product: None,
            product_type: ProductType::NonBom,
            forecast: target as i64,
            target,
            components: ComponentSet::single("X"),
            allocated,
            components_used: used.iter().copied().collect(),
            extras: Vec::new(),
        }
    }

    #[test]
    fn test_verify_detects_conservation_break() {
        let initial: StockPool = vec![("X", 5u64)].into_iter().collect();
        let remaining: StockPool = vec![("X", 4u64)].into_iter().collect();

        let err = verify(&[product(3, 2, &[("X", 2)])], &initial, &remaining).unwrap_err();
        assert!(matches!(err, EngineError::ConservationViolated { used: 2, .. }));
    }

    #[test]
    fn test_verify_detects_target_overrun() {
        let initial: StockPool = vec![("X", 5u64)].into_iter().collect();
        let remaining: StockPool = vec![("X", 2u64)].into_iter().collect();

        let err = verify(&[product(2, 3, &[("X", 3)])], &initial, &remaining).unwrap_err();
        assert!(matches!(err, EngineError::TargetExceeded { allocated: 3, target: 2, .. }));
    }

    #[test]
    fn test_verify_detects_unknown_component() {
        let initial: StockPool = vec![("X", 5u64)].into_iter().collect();

        let err = verify(&[product(2, 1, &[("W", 1)])], &initial, &initial).unwrap_err();
        assert!(matches!(err, EngineError::UnknownComponentUsed { .. }));
    }

    #[test]
    fn test_verify_accepts_consistent_state() {
        let initial: StockPool = vec![("X", 5u64)].into_iter().collect();
        let remaining: StockPool = vec![("X", 3u64)].into_iter().collect();

        assert!(verify(&[product(2, 2, &[("X", 2)])], &initial, &remaining).is_ok());
    }
}
