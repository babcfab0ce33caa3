//! 车辆状态快照
//!
//! 每个周期产出一份，产出后只读。本平台无法推导的字段保持安全默认值。

use crate::buttons::ButtonEvent;

/// 档位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GearShifter {
    Unknown,
    Park,
    Reverse,
    Neutral,
    /// 尚未解码档位信号时的默认值
    #[default]
    Drive,
}

/// 巡航状态
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CruiseState {
    /// 巡航可用（主开关打开）
    pub available: bool,
    /// 巡航激活
    pub enabled: bool,
    /// 设定车速（m/s）
    pub speed: f64,
    /// 静止保持
    pub standstill: bool,
    /// 非自适应巡航
    pub non_adaptive: bool,
}

/// 车辆状态快照
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CarState {
    /// 滤波后车速（m/s）
    pub v_ego: f64,
    /// 滤波后加速度（m/s²）
    pub a_ego: f64,
    /// 原始车速（m/s）
    pub v_ego_raw: f64,

    /// 油门开度（0-1）
    pub gas: f64,
    pub gas_pressed: bool,
    pub brake: f64,
    pub brake_pressed: bool,

    /// 方向盘角度（度）
    pub steering_angle_deg: f64,
    /// 转向伺服上报力矩
    pub steering_torque: f64,
    pub steering_pressed: bool,
    /// 转向临时故障（伺服在巡航激活时长时间无力矩输出）
    pub steer_fault_temporary: bool,

    pub cruise_state: CruiseState,
    pub acc_faulted: bool,
    /// ACC 跟车距离档位
    pub acc_distance: u8,

    pub gear_shifter: GearShifter,
    pub stock_fcw: bool,
    pub stock_aeb: bool,

    pub left_blinker: bool,
    pub right_blinker: bool,
    /// 本周期按钮边沿事件（按表顺序）
    pub button_events: Vec<ButtonEvent>,

    pub door_open: bool,
    pub seatbelt_unlatched: bool,
}
