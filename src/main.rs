// ==========================================
// 组件库存公平分配系统 - 命令行入口
// ==========================================
// 子命令:
// - run: 读取三张表 → 分配 → 写出报表
// - sheets: 列出工作簿中的工作表
// ==========================================

use anyhow::Context;
use clap::{Parser, Subcommand};
use fair_allocation::config::AllocationConfig;
use fair_allocation::engine::{AllocationOrchestrator, TableSource};
use fair_allocation::exporter::ReportWriter;
use fair_allocation::importer::UniversalFileParser;
use fair_allocation::logging::{self, LogFormat};
use fair_allocation::StockKeyMode;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fair-allocation", version, about = "组件库存公平分配系统")]
struct Cli {
    /// 以 JSON 格式输出日志
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 执行一次分配并写出报表
    Run {
        /// 补货需求表（Excel 或 CSV）
        #[arg(long)]
        demand: PathBuf,

        /// 暂存表文件（缺省与需求表同一工作簿）
        #[arg(long)]
        staging: Option<PathBuf>,

        /// 补货需求工作表名
        #[arg(long)]
        replenishment_sheet: Option<String>,

        /// 暂存工作表名
        #[arg(long)]
        staging_sheet: Option<String>,

        /// BOM 表（Excel 或 CSV）
        #[arg(long)]
        bom: PathBuf,

        /// BOM 工作表名
        #[arg(long)]
        bom_sheet: Option<String>,

        /// 报表输出目录
        #[arg(long, default_value = "output")]
        out: PathBuf,

        /// 配置文件（JSON）
        #[arg(long)]
        config: Option<PathBuf>,

        /// 库存聚合键: product-id | description
        #[arg(long)]
        stock_key: Option<StockKeyMode>,
    },

    /// 列出工作簿中的工作表
    Sheets {
        file: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logging::init_with_format(if cli.log_json {
        LogFormat::Json
    } else {
        LogFormat::Text
    });
    tracing::info!("{} v{}", fair_allocation::APP_NAME, fair_allocation::VERSION);

    match cli.command {
        Commands::Run {
            demand,
            staging,
            replenishment_sheet,
            staging_sheet,
            bom,
            bom_sheet,
            out,
            config,
            stock_key,
        } => run(RunArgs {
            demand,
            staging,
            replenishment_sheet,
            staging_sheet,
            bom,
            bom_sheet,
            out,
            config,
            stock_key,
        }),
        Commands::Sheets { file } => sheets(file),
    }
}

struct RunArgs {
    demand: PathBuf,
    staging: Option<PathBuf>,
    replenishment_sheet: Option<String>,
    staging_sheet: Option<String>,
    bom: PathBuf,
    bom_sheet: Option<String>,
    out: PathBuf,
    config: Option<PathBuf>,
    stock_key: Option<StockKeyMode>,
}

fn run(args: RunArgs) -> anyhow::Result<()> {
    let mut config =
        AllocationConfig::load_or_default(args.config.as_deref()).context("加载配置失败")?;
    if let Some(mode) = args.stock_key {
        config.stock_key = mode;
    }

    let sheets = &config.sheets;
    let demand = TableSource::new(
        &args.demand,
        Some(args.replenishment_sheet.as_deref().unwrap_or(&sheets.replenishment)),
    );
    let staging = TableSource::new(
        args.staging.as_ref().unwrap_or(&args.demand),
        Some(args.staging_sheet.as_deref().unwrap_or(&sheets.staging)),
    );
    let bom = TableSource::new(
        &args.bom,
        Some(args.bom_sheet.as_deref().unwrap_or(&sheets.bom)),
    );

    let run = AllocationOrchestrator::new(&config)
        .run_from_files(&demand, &staging, &bom)
        .context("分配运行失败")?;

    let files = ReportWriter::new(&args.out, &config.output)
        .write(&run)
        .context("报表写出失败")?;

    let summary = run.summary();
    println!(
        "run {}: {} products, {}/{} units allocated, {} passes, {} warnings -> {}",
        summary.run_id,
        summary.products,
        summary.total_allocated,
        summary.total_target,
        summary.passes,
        summary.data_quality.warning,
        files.summary.display()
    );
    Ok(())
}

fn sheets(file: PathBuf) -> anyhow::Result<()> {
    let names = UniversalFileParser
        .sheet_names(&file)
        .with_context(|| format!("读取工作表列表失败: {}", file.display()))?;
    for name in names {
        println!("{}", name);
    }
    Ok(())
}
