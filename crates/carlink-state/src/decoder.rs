//! 平台解码
//!
//! 每个硬件平台一个解码器，初始化时按配置选择一次。解码器是无状态的：
//! 它只从快照中读出原始信号并做单位换算，所有跨周期状态由估计器持有。

use carlink_params::{KPH_TO_MS, Platform};
use carlink_protocol::{
    MSG_ACC_PEDAL, MSG_ACC_SPEED, MSG_CC_BUTTONS, MSG_FSM0, MSG_FSM1, MSG_FSM3, MSG_MISC_CAR_INFO,
    MSG_PSCM, MSG_VEHICLE_SPEED, SignalFrame, Subscription,
};

use tracing::warn;

use crate::StateError;
use crate::buttons::{EUCD_BUTTONS, MonitoredButton};

/// 单周期原始信号（已换算为国际单位）
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RawSignals {
    /// 原始车速（m/s）
    pub v_ego_raw: f64,
    /// 油门开度（0-1）
    pub gas: f64,
    pub steering_angle_deg: f64,
    pub steering_torque: f64,
    /// 巡航设定车速（m/s）
    pub cruise_speed: f64,
    pub cruise_available: bool,
    pub cruise_enabled: bool,
    pub standstill: bool,
    pub acc_distance: u8,
    pub left_blinker: bool,
    pub right_blinker: bool,
}

/// 平台解码器
pub trait PlatformDecoder: Send {
    fn platform(&self) -> Platform;

    /// 主总线订阅
    fn pt_subscriptions(&self) -> &'static [Subscription];

    /// 摄像头总线订阅
    fn cam_subscriptions(&self) -> &'static [Subscription];

    /// 监控的巡航按钮
    fn monitored_buttons(&self) -> &'static [MonitoredButton];

    /// 读取本周期信号
    ///
    /// 安全相关信号缺失或取值非法时返回错误；仅用于显示的信号缺失时取默认值。
    /// 返回 `None` 表示该平台尚不支持解码，估计器输出全默认状态。
    fn decode(&self, pt: &SignalFrame, cam: &SignalFrame) -> Result<Option<RawSignals>, StateError>;
}

/// 按平台构建解码器
pub fn decoder_for(platform: Platform) -> Box<dyn PlatformDecoder> {
    match platform {
        Platform::Eucd => Box::new(EucdDecoder),
        Platform::C1 => Box::new(C1Decoder),
    }
}

// ============================================================================
// EUCD
// ============================================================================

/// 油门踏板满量程原始值
const ACC_PEDAL_FULL_SCALE: f64 = 102.3;

/// 超过此开度视为踩下油门
const GAS_PRESSED_THRESHOLD: f64 = 0.1;

/// FSM0.ACCStatus 中表示巡航可用的取值
const ACC_STATUS_AVAILABLE: [u8; 3] = [2, 6, 7];

/// FSM0.ACCStatus 中表示巡航激活的取值
const ACC_STATUS_ENABLED: [u8; 2] = [6, 7];

const TURN_SIGNAL_LEFT: f64 = 1.0;
const TURN_SIGNAL_RIGHT: f64 = 3.0;

const EUCD_PT_SUBSCRIPTIONS: &[Subscription] = &[
    Subscription::new(MSG_VEHICLE_SPEED, 50),
    Subscription::new(MSG_ACC_PEDAL, 100),
    Subscription::new(MSG_PSCM, 50),
    Subscription::new(MSG_ACC_SPEED, 50),
    Subscription::new(MSG_MISC_CAR_INFO, 25),
    Subscription::new(MSG_CC_BUTTONS, 100),
];

const EUCD_CAM_SUBSCRIPTIONS: &[Subscription] = &[
    Subscription::new(MSG_FSM0, 100),
    Subscription::new(MSG_FSM1, 50),
    Subscription::new(MSG_FSM3, 50),
];

/// EUCD 平台解码器
#[derive(Debug, Clone, Copy, Default)]
pub struct EucdDecoder;

impl PlatformDecoder for EucdDecoder {
    fn platform(&self) -> Platform {
        Platform::Eucd
    }

    fn pt_subscriptions(&self) -> &'static [Subscription] {
        EUCD_PT_SUBSCRIPTIONS
    }

    fn cam_subscriptions(&self) -> &'static [Subscription] {
        EUCD_CAM_SUBSCRIPTIONS
    }

    fn monitored_buttons(&self) -> &'static [MonitoredButton] {
        EUCD_BUTTONS
    }

    fn decode(&self, pt: &SignalFrame, cam: &SignalFrame) -> Result<Option<RawSignals>, StateError> {
        // 安全相关
        let v_ego_raw = pt.get(MSG_VEHICLE_SPEED, "VehicleSpeed")? * KPH_TO_MS;
        let gas = pt.get(MSG_ACC_PEDAL, "AccPedal")? / ACC_PEDAL_FULL_SCALE;
        let steering_angle_deg = pt.get(MSG_PSCM, "SteeringAngleServo")?;
        let steering_torque = pt.get(MSG_PSCM, "LKATorque")?;
        let cruise_speed = pt.get(MSG_ACC_SPEED, "ACC_Speed")? * KPH_TO_MS;
        let acc_status = enum_signal(cam.get(MSG_FSM0, "ACCStatus")?, MSG_FSM0, "ACCStatus")?;
        let standstill = cam.get(MSG_FSM3, "ACC_Standstill")? == 1.0;

        // 仅用于显示
        let raw_distance = cam.get_or(MSG_FSM1, "ACC_Distance", 0.0);
        let acc_distance = match enum_signal(raw_distance, MSG_FSM1, "ACC_Distance") {
            Ok(distance) => distance,
            Err(err) => {
                warn!("{err}, falling back to 0");
                0
            },
        };
        let turn_signal = pt.get_or(MSG_MISC_CAR_INFO, "TurnSignal", 0.0);

        Ok(Some(RawSignals {
            v_ego_raw,
            gas,
            steering_angle_deg,
            steering_torque,
            cruise_speed,
            cruise_available: ACC_STATUS_AVAILABLE.contains(&acc_status),
            cruise_enabled: ACC_STATUS_ENABLED.contains(&acc_status),
            standstill,
            acc_distance,
            left_blinker: turn_signal == TURN_SIGNAL_LEFT,
            right_blinker: turn_signal == TURN_SIGNAL_RIGHT,
        }))
    }
}

/// 油门开度是否视为踩下
pub fn gas_pressed(gas: f64) -> bool {
    gas > GAS_PRESSED_THRESHOLD
}

/// 枚举型信号转为原始整数值
///
/// 只接受 0..=255 内的整数；小数或越界值说明解码出错，不做截断。
fn enum_signal(value: f64, message: &str, signal: &str) -> Result<u8, StateError> {
    if value.fract() == 0.0 && (0.0..=f64::from(u8::MAX)).contains(&value) {
        Ok(value as u8)
    } else {
        Err(StateError::InvalidSignal {
            message: message.to_string(),
            signal: signal.to_string(),
            value,
        })
    }
}

// ============================================================================
// C1
// ============================================================================

/// C1 平台解码器
///
/// 信号定义尚未整理，不订阅任何报文，估计器输出全默认状态。
#[derive(Debug, Clone, Copy, Default)]
pub struct C1Decoder;

impl PlatformDecoder for C1Decoder {
    fn platform(&self) -> Platform {
        Platform::C1
    }

    fn pt_subscriptions(&self) -> &'static [Subscription] {
        &[]
    }

    fn cam_subscriptions(&self) -> &'static [Subscription] {
        &[]
    }

    fn monitored_buttons(&self) -> &'static [MonitoredButton] {
        &[]
    }

    fn decode(&self, _pt: &SignalFrame, _cam: &SignalFrame) -> Result<Option<RawSignals>, StateError> {
        Ok(None)
    }
}
