//! # Carlink Params - 车型配置
//!
//! **依赖原则**: 不依赖任何其他 carlink crate，控制层与状态层共同依赖本 crate
//!
//! ## 包含内容
//!
//! - 子频率分频器（每种报文的发送周期）
//! - 执行器限幅（曲率、曲率变化率、加速度）
//! - 功能开关（纵向控制、硬件平台）
//! - 车辆几何参数（供默认运动学模型使用）
//!
//! 配置在第一个控制周期之前加载并校验一次；校验失败属于启动期致命错误。
//!
//! ## 使用示例
//!
//! ```rust
//! use carlink_params::CarParams;
//!
//! let params = CarParams::from_toml_str(
//!     r#"
//!     long_control_enabled = true
//!
//!     [steps]
//!     steer = 5
//!     "#,
//! )
//! .unwrap();
//!
//! assert!(params.long_control_enabled);
//! assert_eq!(params.steps.steer, 5);
//! ```

pub mod limits;

pub use limits::{ControlLimits, RateLimit, interp};

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// 控制周期（秒），100Hz
pub const DT_CTRL: f64 = 0.01;

/// km/h → m/s
pub const KPH_TO_MS: f64 = 1.0 / 3.6;

/// 连续零力矩周期数达到此值时判定转向临时故障（100Hz 下约 10 秒）
pub const ZERO_TORQUE_FAULT_CYCLES: u32 = 1000;

/// 配置错误
#[derive(Error, Debug)]
pub enum ParamsError {
    /// 分频器为 0（会变成“每周期都发送”或取模除零）
    #[error("Sub-rate divider `{name}` must be greater than zero")]
    ZeroStep { name: &'static str },

    /// 数值限幅不自洽
    #[error("Invalid limit `{name}`: {reason}")]
    InvalidLimit { name: &'static str, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// 硬件平台（状态解码路径在初始化时按此选择一次）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// EUCD 平台
    #[default]
    Eucd,
    /// C1 平台（解码尚未完成，全部输出安全默认值）
    C1,
}

/// 子频率分频器
///
/// 动作仅在 `frame % step == 0` 的周期触发。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepParams {
    /// 巡航按钮（恢复），20Hz
    pub buttons: u32,
    /// 横向控制，20Hz
    pub steer: u32,
    /// 纵向控制，50Hz
    pub acc_control: u32,
    /// 车道保持 HUD，1Hz
    pub lkas_ui: u32,
    /// 巡航 HUD，20Hz
    pub acc_ui: u32,
}

impl Default for StepParams {
    fn default() -> Self {
        Self {
            buttons: 5,
            steer: 5,
            acc_control: 2,
            lkas_ui: 100,
            acc_ui: 5,
        }
    }
}

impl StepParams {
    fn validate(&self) -> Result<(), ParamsError> {
        for (name, step) in [
            ("buttons", self.buttons),
            ("steer", self.steer),
            ("acc_control", self.acc_control),
            ("lkas_ui", self.lkas_ui),
            ("acc_ui", self.acc_ui),
        ] {
            if step == 0 {
                return Err(ParamsError::ZeroStep { name });
            }
        }
        Ok(())
    }
}

/// 分频器在当前周期是否触发
///
/// `step` 已经在启动时校验为非零。
#[inline]
pub fn step_fires(frame: u64, step: u32) -> bool {
    frame % u64::from(step) == 0
}

/// 车辆几何参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleGeometry {
    /// 轴距（m）
    pub wheelbase: f64,
    /// 转向传动比
    pub steer_ratio: f64,
    /// 侧滑因子（1/(m/s)²）
    pub slip_factor: f64,
}

impl Default for VehicleGeometry {
    fn default() -> Self {
        Self {
            wheelbase: 2.886,
            steer_ratio: 17.0,
            slip_factor: 0.0014,
        }
    }
}

/// 车型配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarParams {
    /// 硬件平台
    pub platform: Platform,

    /// 是否由本系统接管纵向控制
    pub long_control_enabled: bool,

    /// 最低转向车速（m/s），低于此车速时零力矩故障计数暂停
    pub min_steer_speed: f64,

    /// 分频器
    pub steps: StepParams,

    /// 执行器限幅
    pub limits: ControlLimits,

    /// 车辆几何
    pub geometry: VehicleGeometry,
}

impl Default for CarParams {
    fn default() -> Self {
        Self {
            platform: Platform::Eucd,
            long_control_enabled: false,
            min_steer_speed: 0.0,
            steps: StepParams::default(),
            limits: ControlLimits::default(),
            geometry: VehicleGeometry::default(),
        }
    }
}

impl CarParams {
    /// 从 TOML 字符串加载并校验
    pub fn from_toml_str(content: &str) -> Result<Self, ParamsError> {
        let params: CarParams = toml::from_str(content)?;
        params.validate()?;
        Ok(params)
    }

    /// 从文件加载并校验
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ParamsError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// 序列化为 TOML 字符串
    pub fn to_toml_string(&self) -> Result<String, ParamsError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ParamsError> {
        fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    /// 启动期一致性检查
    ///
    /// 所有组件的构造函数都会调用；控制周期内不再重复检查。
    pub fn validate(&self) -> Result<(), ParamsError> {
        self.steps.validate()?;

        let limits = &self.limits;
        if !limits.curvature_max.is_finite() || limits.curvature_max <= 0.0 {
            return Err(ParamsError::InvalidLimit {
                name: "curvature_max",
                reason: format!("must be positive, got {}", limits.curvature_max),
            });
        }
        if !limits.accel_min.is_finite()
            || !limits.accel_max.is_finite()
            || !(limits.accel_min < limits.accel_max)
        {
            return Err(ParamsError::InvalidLimit {
                name: "accel_min",
                reason: format!(
                    "accel_min {} must be below accel_max {}",
                    limits.accel_min, limits.accel_max
                ),
            });
        }
        limits
            .curvature_rate_up
            .validate()
            .map_err(|reason| ParamsError::InvalidLimit {
                name: "curvature_rate_up",
                reason,
            })?;
        limits
            .curvature_rate_down
            .validate()
            .map_err(|reason| ParamsError::InvalidLimit {
                name: "curvature_rate_down",
                reason,
            })?;

        if !self.min_steer_speed.is_finite() || self.min_steer_speed < 0.0 {
            return Err(ParamsError::InvalidLimit {
                name: "min_steer_speed",
                reason: format!("must be non-negative, got {}", self.min_steer_speed),
            });
        }

        // NaN 与任何边界比较都为 false，必须显式检查
        let geometry = &self.geometry;
        for (name, value) in [
            ("wheelbase", geometry.wheelbase),
            ("steer_ratio", geometry.steer_ratio),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ParamsError::InvalidLimit {
                    name,
                    reason: format!("must be positive and finite, got {value}"),
                });
            }
        }
        if !geometry.slip_factor.is_finite() {
            return Err(ParamsError::InvalidLimit {
                name: "slip_factor",
                reason: format!("must be finite, got {}", geometry.slip_factor),
            });
        }

        Ok(())
    }
}
