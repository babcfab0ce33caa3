//! # Carlink Control - 命令生成层
//!
//! 把规划层的执行器指令和 HUD 意图转换为每个周期的总线帧。
//!
//! ## 模块
//!
//! - `types`: 周期输入类型（执行器、巡航意图、HUD）
//! - `limiter`: 曲率限幅（纯函数）
//! - `model`: 曲率 → 方向盘角度
//! - `controller`: 周期命令生成器
//!
//! ## 使用示例
//!
//! ```rust
//! use carlink_control::{CarControl, CarController, ControllerInputs};
//! use carlink_params::CarParams;
//!
//! let mut controller = CarController::with_default_model(CarParams::default()).unwrap();
//! let output = controller.update(&CarControl::default(), &ControllerInputs::default());
//!
//! // 第 0 周期：转向模式 + 横向运动 + 两条 HUD
//! assert_eq!(output.frames.len(), 4);
//! assert_eq!(controller.memory().frame, 1);
//! ```

pub mod controller;
pub mod limiter;
pub mod model;
pub mod types;

pub use controller::{CarController, ControllerMemory, ControllerOutput, FrameBuffer, ramp_type_for};
pub use limiter::{apply_curvature_limits, max_curvature_step};
pub use model::{KinematicBicycle, VehicleModel};
pub use types::*;
