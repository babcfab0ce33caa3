//! Prelude - 常用类型的便捷导入
//!
//! ```rust
//! use carlink::prelude::*;
//! ```

// 周期驱动
pub use crate::interface::{CarInterface, StepOutcome};
pub use crate::sink::BusSink;

// 控制层
pub use carlink_control::{
    Actuators, CarControl, CarController, ControllerInputs, ControllerMemory, CruiseIntent,
    HudIntent, KinematicBicycle, VehicleModel, VisualAlert,
};

// 状态层
pub use carlink_state::{CarState, CarStateEstimator, FaultCounterState, SpeedFilter};

// 配置与协议
pub use carlink_params::{CarParams, Platform};
pub use carlink_protocol::{Bus, CarFrame, LaneHud, SignalFrame, SignalSource, Subscription};

// 错误类型
pub use crate::CarError;
pub use crate::sink::TransportError;
pub use carlink_params::ParamsError;
pub use carlink_protocol::ProtocolError;
pub use carlink_state::StateError;
