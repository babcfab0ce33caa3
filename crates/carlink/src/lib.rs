//! Carlink - 车辆控制周期 SDK
//!
//! 以固定周期（100Hz）运行的 ADAS 车辆接口：把规划层的曲率/加速度指令
//! 转换为总线帧，并把两条总线的解码信号归一化为车辆状态。
//!
//! # 架构设计
//!
//! 从底层到高层：
//!
//! - **协议层** (`protocol`): 总线帧、下行报文编码、信号快照
//! - **配置层** (`params`): 分频器、执行器限幅、平台选择
//! - **控制层** (`control`): 曲率限幅与周期命令生成
//! - **状态层** (`state`): 状态估计与零力矩故障检测
//!
//! 信号数据库（帧 ↔ 信号）、传输层、车辆运动学模型均以 trait 形式接入。
//!
//! # 快速开始
//!
//! ```rust
//! use carlink::prelude::*;
//!
//! let mut controller = CarController::with_default_model(CarParams::default()).unwrap();
//! let output = controller.update(&CarControl::default(), &ControllerInputs::default());
//!
//! let mut sink: Vec<CarFrame> = Vec::new();
//! sink.send_all(&output.frames).unwrap();
//! assert_eq!(sink.len(), output.frames.len());
//! ```

pub mod interface;
pub mod prelude;
pub mod sink;

pub use carlink_control as control;
pub use carlink_params as params;
pub use carlink_protocol as protocol;
pub use carlink_state as state;

pub use interface::{CarInterface, StepOutcome};
pub use sink::{BusSink, TransportError};

pub use carlink_control::{CarControl, CarController, ControllerInputs};
pub use carlink_params::{CarParams, ParamsError};
pub use carlink_protocol::{CarFrame, ProtocolError, SignalFrame};
pub use carlink_state::{CarState, CarStateEstimator, StateError};

use thiserror::Error;

/// 顶层错误
#[derive(Error, Debug)]
pub enum CarError {
    #[error("Configuration error: {0}")]
    Params(#[from] ParamsError),
    #[error("State error: {0}")]
    State(#[from] StateError),
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

/// 初始化日志输出
///
/// 默认级别 `carlink=info`，可通过 `RUST_LOG` 覆盖。重复调用不会报错。
/// 库内部只产生 `tracing` 事件，从不自行初始化。
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("carlink=info"));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
