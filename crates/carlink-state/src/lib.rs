//! # Carlink State - 车辆状态估计层
//!
//! 把信号数据库解码出的两条总线快照归一化为 [`CarState`]，并维护
//! 转向伺服零力矩故障计数。
//!
//! ## 模块
//!
//! - `state`: 状态快照类型
//! - `decoder`: 平台解码器（EUCD / C1）
//! - `filter`: 车速滤波
//! - `buttons`: 巡航按钮边沿检测
//! - `fault`: 零力矩故障计数
//! - `estimator`: 周期估计器
//!
//! ## 使用示例
//!
//! ```rust
//! use carlink_params::CarParams;
//! use carlink_protocol::{Bus, SignalFrame};
//! use carlink_state::CarStateEstimator;
//!
//! let mut estimator = CarStateEstimator::new(CarParams::default()).unwrap();
//!
//! let pt = SignalFrame::new(Bus::Main)
//!     .with("VehicleSpeed1", "VehicleSpeed", 36.0)
//!     .with("AccPedal", "AccPedal", 0.0)
//!     .with("PSCM1", "SteeringAngleServo", 0.0)
//!     .with("PSCM1", "LKATorque", 0.0)
//!     .with("ACC_Speed", "ACC_Speed", 90.0);
//! let cam = SignalFrame::new(Bus::Camera)
//!     .with("FSM0", "ACCStatus", 6.0)
//!     .with("FSM3", "ACC_Standstill", 0.0);
//!
//! let state = estimator.update(&pt, &cam).unwrap();
//! assert!(state.cruise_state.enabled);
//! assert!((state.v_ego - 10.0).abs() < 1e-9);
//! ```

pub mod buttons;
pub mod decoder;
pub mod estimator;
pub mod fault;
pub mod filter;
pub mod state;

pub use buttons::{ButtonEdgeDetector, ButtonEvent, ButtonType, EUCD_BUTTONS, MonitoredButton, TransitionDetector};
pub use decoder::{C1Decoder, EucdDecoder, PlatformDecoder, RawSignals, decoder_for};
pub use estimator::CarStateEstimator;
pub use fault::FaultCounterState;
pub use filter::{SpeedFilter, SpeedKalman};
pub use state::{CarState, CruiseState, GearShifter};

use carlink_protocol::ProtocolError;
use thiserror::Error;

/// 状态估计错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StateError {
    /// 安全相关信号缺失，本周期跳过
    #[error("Missing safety signal {message}.{signal}")]
    MissingSignal { message: String, signal: String },

    /// 枚举型信号不是 0..=255 内的整数
    #[error("Invalid value {value} for signal {message}.{signal}")]
    InvalidSignal {
        message: String,
        signal: String,
        value: f64,
    },
}

impl From<ProtocolError> for StateError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::MissingSignal { message, signal } => {
                StateError::MissingSignal { message, signal }
            },
        }
    }
}
