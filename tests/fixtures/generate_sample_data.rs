// ==========================================
// 样例数据生成器
// ==========================================
// 用途: 生成一组可直接运行的输入表
// 输出: tests/fixtures/datasets/{Replenishment,Stage,BOM}.csv
// 运行: cargo run --bin generate_sample_data
//       cargo run -- run --demand tests/fixtures/datasets/Replenishment.csv \
//           --staging tests/fixtures/datasets/Stage.csv --bom tests/fixtures/datasets/BOM.csv
// ==========================================

use csv::Writer;
use std::error::Error;
use std::fs::{self, File};

const OUT_DIR: &str = "tests/fixtures/datasets";

// 需求表表头（与默认配置一致,region / channel 为透传列）
const DEMAND_HEADER: &[&str] = &[
    "Is_BOM",
    "productId",
    "Description",
    "inventory_wh_bp",
    "model_a_oos_suggested_qty",
    "model_b_oos_suggested_qty",
    "model_c_oos_suggested_qty",
    "model_new_oos_suggested_qty",
    "region",
    "channel",
];

const BOM_HEADER: &[&str] = &[
    "Product ID",
    "Product Description",
    "Component Product ID",
    "Component Description",
    "Quantity",
];

const COMPONENTS: usize = 30;
const KITS: usize = 12;
const STAGE_ONLY: usize = 5;

// 需求记录结构
#[derive(Clone)]
struct DemandRecord {
    is_bom: bool,
    product_id: String,
    description: String,
    stock: String,
    forecasts: [String; 4],
    region: String,
    channel: String,
}

impl DemandRecord {
    fn to_row(&self) -> Vec<String> {
        let mut row = vec![
            if self.is_bom { "1" } else { "0" }.to_string(),
            self.product_id.clone(),
            self.description.clone(),
            self.stock.clone(),
        ];
        row.extend(self.forecasts.iter().cloned());
        row.push(self.region.clone());
        row.push(self.channel.clone());
        row
    }
}

// 预测信号: 部分缺失,部分为负
fn forecasts(index: usize) -> [String; 4] {
    let base = (index % 7) as i64 * 3 - 4;
    let signal = |offset: i64, present: bool| {
        if present {
            (base + offset).to_string()
        } else {
            String::new()
        }
    };
    [
        signal(0, true),
        signal(2, index % 2 == 0),
        signal(-1, index % 3 != 0),
        signal(5, index % 5 == 0),
    ]
}

fn component_record(index: usize) -> DemandRecord {
    DemandRecord {
        is_bom: false,
        // 编码偶尔带 ".0" 后缀（电子表格数值列常见）
        product_id: if index % 6 == 0 {
            format!("{}.0", 10000 + index)
        } else {
            format!("{}", 10000 + index)
        },
        description: if index < COMPONENTS {
            format!("Component {:02}", index)
        } else {
            format!("Staged part {:02}", index - COMPONENTS)
        },
        stock: format!("{}", (index * 7) % 40),
        forecasts: forecasts(index),
        region: ["north", "south", "east"][index % 3].to_string(),
        channel: ["retail", "online"][index % 2].to_string(),
    }
}

fn kit_record(index: usize) -> DemandRecord {
    DemandRecord {
        is_bom: true,
        product_id: format!("KIT-{:03}", index + 1),
        description: format!("Kit {:02}", index + 1),
        stock: String::new(),
        forecasts: forecasts(index + 100),
        region: ["north", "south", "east"][index % 3].to_string(),
        channel: "retail".to_string(),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    println!("开始生成样例数据...");
    fs::create_dir_all(OUT_DIR)?;

    generate_replenishment()?;
    generate_stage()?;
    generate_bom()?;

    println!("✓ 样例数据生成完成: {}", OUT_DIR);
    Ok(())
}

fn generate_replenishment() -> Result<(), Box<dyn Error>> {
    let path = format!("{}/Replenishment.csv", OUT_DIR);
    let mut wtr = Writer::from_writer(File::create(&path)?);
    wtr.write_record(DEMAND_HEADER)?;

    let mut count = 0;
    for i in 0..COMPONENTS {
        wtr.write_record(&component_record(i).to_row())?;
        count += 1;
    }
    for k in 0..KITS {
        wtr.write_record(&kit_record(k).to_row())?;
        count += 1;
    }

    wtr.flush()?;
    println!("✓ 生成 Replenishment.csv ({}条)", count);
    Ok(())
}

fn generate_stage() -> Result<(), Box<dyn Error>> {
    let path = format!("{}/Stage.csv", OUT_DIR);
    let mut wtr = Writer::from_writer(File::create(&path)?);
    wtr.write_record(DEMAND_HEADER)?;

    // 暂存独有组件
    for s in 0..STAGE_ONLY {
        let mut record = component_record(COMPONENTS + s);
        record.stock = format!("{}", 10 + s * 5);
        wtr.write_record(&record.to_row())?;
    }
    // 与主表重叠的组件（不会覆盖主表库存）
    for i in (0..COMPONENTS).step_by(4) {
        let mut record = component_record(i);
        record.stock = "999".to_string();
        wtr.write_record(&record.to_row())?;
    }

    wtr.flush()?;
    println!("✓ 生成 Stage.csv");
    Ok(())
}

fn generate_bom() -> Result<(), Box<dyn Error>> {
    let path = format!("{}/BOM.csv", OUT_DIR);
    let mut wtr = Writer::from_writer(File::create(&path)?);
    wtr.write_record(BOM_HEADER)?;

    let total = COMPONENTS + STAGE_ONLY;
    for k in 0..KITS {
        let kit = kit_record(k);
        // 最后一个套件不写配方（BOM 缺失场景）
        if k == KITS - 1 {
            continue;
        }
        let lines = 1 + k % 3;
        for line in 0..lines {
            let component = component_record((k * 5 + line * 11) % total);
            let quantity = 1 + (k + line) % 3;
            wtr.write_record(&[
                kit.product_id.clone(),
                kit.description.clone(),
                component.product_id.trim_end_matches(".0").to_string(),
                component.description.clone(),
                quantity.to_string(),
            ])?;
        }
    }

    wtr.flush()?;
    println!("✓ 生成 BOM.csv");
    Ok(())
}
