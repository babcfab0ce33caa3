//! 曲率限幅
//!
//! 纯函数，无副作用。超出范围的输入一律截断，不会拒绝。

use carlink_params::ControlLimits;

/// 计算本周期实际下发的曲率
///
/// - 横向控制未激活时返回 0
/// - 与上一周期指令的差值不超过随车速变化的单步上限
/// - 绝对值不超过 `curvature_max`
///
/// 变化率上限按方向选表：曲率远离 0（与上一值同号且绝对值增大）时使用
/// `curvature_rate_up`，否则使用 `curvature_rate_down`。车速为 0 时按最低车速
/// 断点取值，不会出现除零。
pub fn apply_curvature_limits(
    desired: f64,
    last: f64,
    v_ego: f64,
    lat_active: bool,
    limits: &ControlLimits,
) -> f64 {
    if !lat_active {
        return 0.0;
    }

    let desired = if desired.is_nan() { 0.0 } else { desired };
    let last = last.clamp(-limits.curvature_max, limits.curvature_max);

    let winding_up = last * desired >= 0.0 && desired.abs() > last.abs();
    let rate_limit = if winding_up {
        limits.curvature_rate_up.at(v_ego)
    } else {
        limits.curvature_rate_down.at(v_ego)
    };

    desired
        .clamp(last - rate_limit, last + rate_limit)
        .clamp(-limits.curvature_max, limits.curvature_max)
}

/// 该车速下允许的最大单步变化量（两张表取大者）
pub fn max_curvature_step(v_ego: f64, limits: &ControlLimits) -> f64 {
    limits
        .curvature_rate_up
        .at(v_ego)
        .max(limits.curvature_rate_down.at(v_ego))
}
