//! 控制周期驱动
//!
//! [`CarInterface`] 持有一个命令生成器和一个状态估计器，每个周期依次执行
//! 「读取快照 → 状态估计 → 命令生成 → 发送」。
//!
//! 状态估计失败时整个周期跳过：不生成命令、不发送，两份跨周期状态都保持
//! 上一次完整周期的结果。

use carlink_control::{Actuators, CarControl, CarController, ControllerInputs};
use carlink_params::CarParams;
use carlink_protocol::{SignalFrame, SignalSource};
use carlink_state::{CarState, CarStateEstimator, StateError};
use tracing::{trace, warn};

use crate::CarError;
use crate::sink::BusSink;

/// 单周期执行结果
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// 周期完整执行
    Applied {
        state: CarState,
        /// 执行器回显（曲率为实际下发值）
        actuators: Actuators,
        /// 本周期发送的帧数
        frames_sent: usize,
    },
    /// 状态估计失败，本周期跳过
    Skipped(StateError),
}

impl StepOutcome {
    pub fn is_skipped(&self) -> bool {
        matches!(self, StepOutcome::Skipped(_))
    }
}

/// 车辆接口
pub struct CarInterface<S: BusSink> {
    controller: CarController,
    estimator: CarStateEstimator,
    pt_source: Box<dyn SignalSource>,
    cam_source: Box<dyn SignalSource>,
    sink: S,
}

impl<S: BusSink> CarInterface<S> {
    /// 按配置创建控制器与估计器，并向两个解码器登记订阅
    pub fn new(
        params: CarParams,
        pt_source: Box<dyn SignalSource>,
        cam_source: Box<dyn SignalSource>,
        sink: S,
    ) -> Result<Self, CarError> {
        let controller = CarController::with_default_model(params.clone())?;
        let estimator = CarStateEstimator::new(params)?;
        Ok(Self::from_parts(controller, estimator, pt_source, cam_source, sink))
    }

    /// 使用已构建的组件（例如注入了自定义模型或历史状态）
    pub fn from_parts(
        controller: CarController,
        estimator: CarStateEstimator,
        mut pt_source: Box<dyn SignalSource>,
        mut cam_source: Box<dyn SignalSource>,
        sink: S,
    ) -> Self {
        pt_source.subscribe(estimator.pt_subscriptions());
        cam_source.subscribe(estimator.cam_subscriptions());
        Self {
            controller,
            estimator,
            pt_source,
            cam_source,
            sink,
        }
    }

    pub fn controller(&self) -> &CarController {
        &self.controller
    }

    pub fn estimator(&self) -> &CarStateEstimator {
        &self.estimator
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// 从两个解码器读取最新快照并执行一个周期
    ///
    /// `stock_tja_status` 为摄像头上报的原厂车道居中状态。
    pub fn step(&mut self, cc: &CarControl, stock_tja_status: u8) -> Result<StepOutcome, CarError> {
        let pt = self.pt_source.latest();
        let cam = self.cam_source.latest();
        self.step_with(&pt, &cam, cc, stock_tja_status)
    }

    /// 使用给定快照执行一个周期
    ///
    /// # Errors
    ///
    /// 只有传输层错误会返回 `Err`；此时命令生成器已经推进到下一周期。
    pub fn step_with(
        &mut self,
        pt: &SignalFrame,
        cam: &SignalFrame,
        cc: &CarControl,
        stock_tja_status: u8,
    ) -> Result<StepOutcome, CarError> {
        let state = match self.estimator.update(pt, cam) {
            Ok(state) => state,
            Err(err) => {
                warn!(error = %err, "state estimation failed, skipping cycle");
                return Ok(StepOutcome::Skipped(err));
            },
        };

        let inputs = ControllerInputs {
            v_ego: state.v_ego,
            steering_angle_deg: state.steering_angle_deg,
            stock_tja_status,
        };
        let output = self.controller.update(cc, &inputs);
        let frames_sent = self.sink.send_all(&output.frames)?;

        trace!(frames_sent, "control cycle applied");

        Ok(StepOutcome::Applied {
            state,
            actuators: output.actuators,
            frames_sent,
        })
    }
}
