//! # 执行器限幅参数
//!
//! 曲率上限、曲率变化率（随车速变化）和纵向加速度范围。

use serde::{Deserialize, Serialize};

/// 分段线性插值（端点外取端点值）
///
/// 与 numpy `interp` 行为一致：`x` 小于首个断点时返回首个值，
/// 大于末个断点时返回末个值。NaN 输入按首个断点处理。
///
/// `xp` 必须单调递增且与 `fp` 等长（由 [`RateLimit::validate`] 保证）。
pub fn interp(x: f64, xp: &[f64], fp: &[f64]) -> f64 {
    let (Some(&x_first), Some(&x_last)) = (xp.first(), xp.last()) else {
        return 0.0;
    };

    if x.is_nan() || x <= x_first {
        return fp[0];
    }
    if x >= x_last {
        return fp[fp.len() - 1];
    }

    for i in 1..xp.len() {
        if x < xp[i] {
            let span = xp[i] - xp[i - 1];
            if span <= 0.0 {
                return fp[i];
            }
            let t = (x - xp[i - 1]) / span;
            return fp[i - 1] + t * (fp[i] - fp[i - 1]);
        }
    }

    fp[fp.len() - 1]
}

/// 随车速变化的单周期变化率上限
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateLimit {
    /// 车速断点（m/s），单调递增
    pub speed_bp: Vec<f64>,

    /// 各断点处的单周期最大变化量
    pub limit_v: Vec<f64>,
}

impl RateLimit {
    pub fn new(speed_bp: Vec<f64>, limit_v: Vec<f64>) -> Self {
        Self { speed_bp, limit_v }
    }

    /// 给定车速下的单周期变化率上限
    ///
    /// 车速为 0、负数或 NaN 时取最低车速断点的值。
    pub fn at(&self, v_ego: f64) -> f64 {
        interp(v_ego, &self.speed_bp, &self.limit_v)
    }

    /// 检查断点表是否自洽，返回问题描述
    pub fn validate(&self) -> Result<(), String> {
        if self.speed_bp.is_empty() {
            return Err("speed breakpoints are empty".to_string());
        }
        if self.speed_bp.len() != self.limit_v.len() {
            return Err(format!(
                "{} speed breakpoints but {} limit values",
                self.speed_bp.len(),
                self.limit_v.len()
            ));
        }
        if self.speed_bp.iter().any(|v| !v.is_finite()) {
            return Err("speed breakpoints must be finite".to_string());
        }
        if self.speed_bp.windows(2).any(|w| w[0] >= w[1]) {
            return Err("speed breakpoints must be strictly increasing".to_string());
        }
        if self.limit_v.iter().any(|v| !v.is_finite() || *v <= 0.0) {
            return Err("limit values must be positive and finite".to_string());
        }
        Ok(())
    }
}

/// 执行器限幅
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlLimits {
    /// 曲率绝对值上限（1/m）
    pub curvature_max: f64,

    /// 最大减速度（m/s²，负数）
    pub accel_min: f64,

    /// 最大加速度（m/s²）
    pub accel_max: f64,

    /// 曲率远离 0 时的变化率上限
    pub curvature_rate_up: RateLimit,

    /// 曲率回落时的变化率上限
    pub curvature_rate_down: RateLimit,
}

impl Default for ControlLimits {
    fn default() -> Self {
        Self {
            curvature_max: 0.02,
            accel_min: -3.5,
            accel_max: 2.0,
            // 0.003 ~ 0.009 1/m/s，折算到 20Hz 单步
            curvature_rate_up: RateLimit::new(vec![5.0, 25.0], vec![0.0002, 0.0001]),
            curvature_rate_down: RateLimit::new(vec![5.0, 25.0], vec![0.000225, 0.00015]),
        }
    }
}
