// ==========================================
// 组件库存公平分配系统 - 需求预测
// ==========================================
// 规则: 取存在的预测信号的中位数,向零截断为整数; 无信号 → 0
// ==========================================

pub struct DemandForecaster;

impl DemandForecaster {
    /// 预测中位数
    ///
    /// # 参数
    /// - `signals`: 各模型的预测值（None 表示缺失）
    ///
    /// # 返回
    /// 有符号整数预测; 偶数个信号取中间两值的均值
    pub fn median(&self, signals: &[Option<f64>]) -> i64 {
        let mut present: Vec<f64> = signals
            .iter()
            .flatten()
            .copied()
            .filter(|v| v.is_finite())
            .collect();
        if present.is_empty() {
            return 0;
        }

        present.sort_by(|a, b| a.total_cmp(b));
        let mid = present.len() / 2;
        let median = if present.len() % 2 == 0 {
            (present[mid - 1] + present[mid]) / 2.0
        } else {
            present[mid]
        };
        median.trunc() as i64
    }

    /// 分配目标 = |预测|
    pub fn target(&self, forecast: i64) -> u64 {
        forecast.unsigned_abs()
    }
}
