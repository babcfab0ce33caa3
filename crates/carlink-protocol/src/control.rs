//! 控制帧结构体定义
//!
//! 每种逻辑报文一个结构体，接收结构化字段并通过 `to_frame(bus)`
//! 编码为目标总线上的 [`CarFrame`]。
//!
//! 物理量的定点编码一律饱和截断：控制层已经做过限幅，这里只保证
//! 任何输入都能得到一个合法的字节序列。

use crate::ids::*;
use crate::{Bus, CarFrame, i16_to_bytes_be, i32_to_bytes_be, scale_to_i16, scale_to_i32, scale_to_i8};
use bilge::prelude::*;
use num_enum::{IntoPrimitive, TryFromPrimitive};

// ============================================================================
// 枚举定义
// ============================================================================

/// 转向斜坡类型（执行器到达新角度的快慢）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum RampType {
    /// 慢速
    #[default]
    Slow = 0,
    /// 中速
    Medium = 1,
    /// 快速
    Fast = 2,
    /// 立即
    Immediate = 3,
}

/// 路径跟踪精度（原厂系统始终使用 Comfortable）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum PathPrecision {
    /// 舒适
    #[default]
    Comfortable = 0,
    /// 精确
    Precise = 1,
}

/// 车道居中（TJA）状态，同时也是摄像头上报的原厂状态编码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum TjaStatus {
    /// 关闭
    #[default]
    Off = 0,
    /// 待命
    Standby = 1,
    /// 激活
    Active = 2,
    /// 激活，左侧干预
    ActiveInterventionLeft = 3,
    /// 激活，右侧干预
    ActiveInterventionRight = 4,
    /// 待命，左侧偏离警告
    ActiveWarningLeft = 5,
    /// 待命，右侧偏离警告
    ActiveWarningRight = 6,
}

/// 手离方向盘提示等级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum HandsOffDisplay {
    /// 无提示
    #[default]
    HandsOn = 0,
    /// 一级（无提示音）
    Level1 = 1,
    /// 二级（带提示音）
    Level2 = 2,
    /// 抑制
    Suppressed = 3,
}

/// 车道线 HUD 输入
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LaneHud {
    pub left_visible: bool,
    pub right_visible: bool,
    pub left_depart: bool,
    pub right_depart: bool,
}

// ============================================================================
// 方向盘按钮 (0x083)
// ============================================================================

/// 按钮位域（Byte 0）
#[bitsize(8)]
#[derive(FromBits, DebugBits, Clone, Copy, Default)]
pub struct ButtonFlags {
    pub cancel: bool,     // Bit 0: 巡航取消
    pub resume: bool,     // Bit 1: 巡航恢复
    pub tja_toggle: bool, // Bit 2: 车道居中开关
    pub reserved: u5,     // Bit 3-7: 保留
}

/// 模拟方向盘按钮按下
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ButtonCommand {
    pub cancel: bool,
    pub resume: bool,
    pub tja_toggle: bool,
}

impl ButtonCommand {
    /// 巡航取消
    pub fn cancel() -> Self {
        Self {
            cancel: true,
            ..Self::default()
        }
    }

    /// 巡航恢复
    pub fn resume() -> Self {
        Self {
            resume: true,
            ..Self::default()
        }
    }

    /// 车道居中开关（用于关闭原厂车道居中）
    pub fn tja_toggle() -> Self {
        Self {
            tja_toggle: true,
            ..Self::default()
        }
    }

    /// 转换为总线帧
    pub fn to_frame(self, bus: Bus) -> CarFrame {
        let mut flags = ButtonFlags::from(u8::new(0));
        flags.set_cancel(self.cancel);
        flags.set_resume(self.resume);
        flags.set_tja_toggle(self.tja_toggle);

        let data = [u8::from(flags).value(), 0, 0, 0, 0, 0, 0, 0];
        CarFrame::new(bus, ID_STEERING_BUTTONS, &data)
    }
}

// ============================================================================
// 转向模式 (0x3CA)
// ============================================================================

/// 转向模式指令
///
/// 车道保持辅助的动作请求与叠加力矩。曲率控制模式下两者均为 0，
/// 但报文必须周期性发送，否则转向伺服会判定 ADAS 控制器丢失。
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LkaCommand {
    pub action: u8,      // Byte 0: 动作请求，0 = 无
    pub torque_nm: f64,  // Byte 1-2: 叠加力矩，单位 0.01N·m
}

impl LkaCommand {
    /// 曲率控制模式下的空闲指令
    pub fn idle() -> Self {
        Self::default()
    }

    /// 转换为总线帧
    pub fn to_frame(self, bus: Bus) -> CarFrame {
        let mut data = [0u8; 8];
        data[0] = self.action;
        data[1..3].copy_from_slice(&i16_to_bytes_be(scale_to_i16(self.torque_nm, 0.01)));
        CarFrame::new(bus, ID_LANE_ASSIST, &data)
    }
}

// ============================================================================
// 横向运动控制 (0x3D3)
// ============================================================================

/// 横向控制位域（Byte 0）
#[bitsize(8)]
#[derive(FromBits, DebugBits, Clone, Copy, Default)]
pub struct LateralFlags {
    pub request: bool,   // Bit 0: 横向控制请求
    pub ramp: u2,        // Bit 1-2: 斜坡类型
    pub precision: bool, // Bit 3: 0 舒适 1 精确
    pub reserved: u4,    // Bit 4-7: 保留
}

/// 横向运动控制指令
///
/// - 曲率单位：0.0000001 1/m（i32）
/// - 曲率变化率单位：0.000001 1/m²（i16）
/// - 路径偏移单位：0.1m（i8）
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LateralMotionCommand {
    pub request: bool,
    pub ramp: RampType,
    pub precision: PathPrecision,
    pub path_offset_m: f64,
    pub curvature: f64,
    pub curvature_rate: f64,
}

impl LateralMotionCommand {
    /// 转换为总线帧
    pub fn to_frame(self, bus: Bus) -> CarFrame {
        let mut flags = LateralFlags::from(u8::new(0));
        flags.set_request(self.request);
        flags.set_ramp(u2::new(u8::from(self.ramp)));
        flags.set_precision(self.precision == PathPrecision::Precise);

        let mut data = [0u8; 8];
        data[0] = u8::from(flags).value();
        data[1..5].copy_from_slice(&i32_to_bytes_be(scale_to_i32(self.curvature, 1e-7)));
        data[5..7].copy_from_slice(&i16_to_bytes_be(scale_to_i16(self.curvature_rate, 1e-6)));
        data[7] = scale_to_i8(self.path_offset_m, 0.1) as u8;

        CarFrame::new(bus, ID_LATERAL_MOTION, &data)
    }
}

// ============================================================================
// 纵向控制 (0x186)
// ============================================================================

/// 纵向控制位域（Byte 0）
#[bitsize(8)]
#[derive(FromBits, DebugBits, Clone, Copy, Default)]
pub struct AccFlags {
    pub enable: bool,        // Bit 0: 纵向控制使能
    pub decel_request: bool, // Bit 1: 制动减速请求
    pub precharge: bool,     // Bit 2: 制动预充压
    pub reserved: u5,        // Bit 3-7: 保留
}

/// 纵向控制指令
///
/// 加速度单位：0.001 m/s²（i16）
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AccCommand {
    pub enable: bool,
    pub propulsion_accel: f64,
    pub brake_accel: f64,
    pub decel_request: bool,
    pub precharge: bool,
}

impl AccCommand {
    /// 转换为总线帧
    pub fn to_frame(self, bus: Bus) -> CarFrame {
        let mut flags = AccFlags::from(u8::new(0));
        flags.set_enable(self.enable);
        flags.set_decel_request(self.decel_request);
        flags.set_precharge(self.precharge);

        let mut data = [0u8; 8];
        data[0] = u8::from(flags).value();
        data[1..3].copy_from_slice(&i16_to_bytes_be(scale_to_i16(self.propulsion_accel, 0.001)));
        data[3..5].copy_from_slice(&i16_to_bytes_be(scale_to_i16(self.brake_accel, 0.001)));

        CarFrame::new(bus, ID_ACC_COMMAND, &data)
    }
}

// ============================================================================
// 车道保持 HUD (0x3D8)
// ============================================================================

/// 车道保持 HUD 状态
///
/// `lines` 是左右车道线显示状态的组合编码（0-31）：
///
/// ```text
///          右: 干预 警告 抑制 可用 无
/// 左 干预      24   19   14    9   4
///    警告      23   18   13    8   3
///    抑制      22   17   12    7   2
///    可用      21   16   11    6   1
///    无        20   15   10    5   0
/// ```
///
/// 30 表示车道保持关闭。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LkasUiCommand {
    pub lines: u8,
    pub hands_off: HandsOffDisplay,
}

impl LkasUiCommand {
    /// 车道保持关闭
    pub const LINES_OFF: u8 = 30;

    /// 根据巡航主开关、横向激活状态和 HUD 输入计算显示内容
    pub fn from_hud(main_on: bool, enabled: bool, steer_alert: bool, lanes: LaneHud) -> Self {
        let lines = if enabled {
            let mut lines = 0;
            if lanes.left_depart {
                lines += 4;
            } else if lanes.left_visible {
                lines += 1;
            }
            if lanes.right_depart {
                lines += 20;
            } else if lanes.right_visible {
                lines += 5;
            }
            lines
        } else if main_on {
            0
        } else if lanes.left_depart {
            3
        } else if lanes.right_depart {
            15
        } else {
            Self::LINES_OFF
        };

        let hands_off = if steer_alert {
            HandsOffDisplay::Level2
        } else {
            HandsOffDisplay::HandsOn
        };

        Self { lines, hands_off }
    }

    /// 转换为总线帧
    pub fn to_frame(self, bus: Bus) -> CarFrame {
        let data = [self.lines.min(31), u8::from(self.hands_off)];
        CarFrame::new(bus, ID_LKAS_UI, &data)
    }
}

// ============================================================================
// 巡航 HUD (0x18A)
// ============================================================================

/// 巡航 HUD 状态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccUiCommand {
    pub tja_status: TjaStatus,
}

impl AccUiCommand {
    /// 根据巡航主开关、横向激活状态和车道偏离计算 TJA 显示状态
    pub fn from_hud(main_on: bool, enabled: bool, lanes: LaneHud) -> Self {
        let tja_status = if enabled {
            if lanes.left_depart {
                TjaStatus::ActiveInterventionLeft
            } else if lanes.right_depart {
                TjaStatus::ActiveInterventionRight
            } else {
                TjaStatus::Active
            }
        } else if main_on {
            if lanes.left_depart {
                TjaStatus::ActiveWarningLeft
            } else if lanes.right_depart {
                TjaStatus::ActiveWarningRight
            } else {
                TjaStatus::Standby
            }
        } else {
            TjaStatus::Off
        };

        Self { tja_status }
    }

    /// 转换为总线帧
    pub fn to_frame(self, bus: Bus) -> CarFrame {
        let data = [u8::from(self.tja_status)];
        CarFrame::new(bus, ID_ACC_UI, &data)
    }
}
