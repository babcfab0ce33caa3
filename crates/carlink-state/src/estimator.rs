//! 车辆状态估计器
//!
//! 每个周期消费主总线和摄像头总线两份信号快照，产出一份 [`CarState`]。
//!
//! # 周期流程
//!
//! 1. 平台解码器读出全部原始信号（可能失败）
//! 2. 车速滤波、按钮边沿检测、零力矩故障计数（不会失败）
//!
//! 第 1 步失败时直接返回错误，滤波器、边沿检测器与故障计数均保持上一周期状态。
//! 巡航状态先于故障计数解出，计数读取的是本周期的巡航激活标志。

use carlink_params::{CarParams, ParamsError, Platform};
use carlink_protocol::{SignalFrame, Subscription};
use tracing::trace;

use crate::StateError;
use crate::buttons::{ButtonEdgeDetector, TransitionDetector};
use crate::decoder::{PlatformDecoder, decoder_for, gas_pressed};
use crate::fault::FaultCounterState;
use crate::filter::{SpeedFilter, SpeedKalman};
use crate::state::{CarState, CruiseState, GearShifter};

/// 车辆状态估计器
pub struct CarStateEstimator {
    params: CarParams,
    decoder: Box<dyn PlatformDecoder>,
    speed_filter: Box<dyn SpeedFilter>,
    button_detector: Box<dyn ButtonEdgeDetector>,
    fault: FaultCounterState,
}

impl std::fmt::Debug for CarStateEstimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CarStateEstimator")
            .field("platform", &self.decoder.platform())
            .field("fault", &self.fault)
            .finish_non_exhaustive()
    }
}

impl CarStateEstimator {
    /// 按配置中的平台创建估计器（配置在此校验一次）
    pub fn new(params: CarParams) -> Result<Self, ParamsError> {
        params.validate()?;
        let decoder = decoder_for(params.platform);
        Ok(Self {
            params,
            decoder,
            speed_filter: Box::new(SpeedKalman::new()),
            button_detector: Box::new(TransitionDetector::new()),
            fault: FaultCounterState::default(),
        })
    }

    /// 替换车速滤波器
    pub fn with_speed_filter(mut self, filter: Box<dyn SpeedFilter>) -> Self {
        self.speed_filter = filter;
        self
    }

    /// 替换按钮边沿检测器
    pub fn with_button_detector(mut self, detector: Box<dyn ButtonEdgeDetector>) -> Self {
        self.button_detector = detector;
        self
    }

    /// 注入故障计数状态
    pub fn with_fault_state(mut self, fault: FaultCounterState) -> Self {
        self.fault = fault;
        self
    }

    pub fn fault_state(&self) -> &FaultCounterState {
        &self.fault
    }

    pub fn platform(&self) -> Platform {
        self.decoder.platform()
    }

    /// 主总线订阅（报文名 + 期望频率）
    pub fn pt_subscriptions(&self) -> &'static [Subscription] {
        self.decoder.pt_subscriptions()
    }

    /// 摄像头总线订阅
    pub fn cam_subscriptions(&self) -> &'static [Subscription] {
        self.decoder.cam_subscriptions()
    }

    /// 执行一个估计周期
    ///
    /// # Errors
    ///
    /// 安全相关信号缺失时返回 [`StateError::MissingSignal`]，枚举信号取值非法时返回
    /// [`StateError::InvalidSignal`]，两种情况下内部状态都不变。
    pub fn update(&mut self, pt: &SignalFrame, cam: &SignalFrame) -> Result<CarState, StateError> {
        let Some(raw) = self.decoder.decode(pt, cam)? else {
            return Ok(CarState::default());
        };

        let (v_ego, a_ego) = self.speed_filter.update(raw.v_ego_raw);
        let button_events = self
            .button_detector
            .detect(pt, self.decoder.monitored_buttons());

        let steer_fault_temporary = self.fault.update(
            raw.cruise_enabled,
            v_ego,
            raw.steering_torque,
            self.params.min_steer_speed,
        );

        trace!(
            v_ego,
            a_ego,
            cruise_enabled = raw.cruise_enabled,
            streak = self.fault.zero_torque_streak,
            "car state"
        );

        Ok(CarState {
            v_ego,
            a_ego,
            v_ego_raw: raw.v_ego_raw,
            gas: raw.gas,
            gas_pressed: gas_pressed(raw.gas),
            brake: 0.0,
            brake_pressed: false,
            steering_angle_deg: raw.steering_angle_deg,
            steering_torque: raw.steering_torque,
            steering_pressed: false,
            steer_fault_temporary,
            cruise_state: CruiseState {
                available: raw.cruise_available,
                enabled: raw.cruise_enabled,
                speed: raw.cruise_speed,
                standstill: raw.standstill,
                non_adaptive: false,
            },
            acc_faulted: false,
            acc_distance: raw.acc_distance,
            gear_shifter: GearShifter::Drive,
            stock_fcw: false,
            stock_aeb: false,
            left_blinker: raw.left_blinker,
            right_blinker: raw.right_blinker,
            button_events,
            door_open: false,
            seatbelt_unlatched: false,
        })
    }
}
