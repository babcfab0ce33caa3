//! 巡航按钮边沿检测
//!
//! 估计器只提供当前信号快照和监控表，边沿检测器返回按表顺序排列的
//! 按下/松开事件。

use carlink_protocol::{MSG_CC_BUTTONS, SignalFrame};
use std::collections::HashMap;

/// 按钮类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ButtonType {
    /// 巡航主开关
    MainCruise,
    SetCruise,
    ResumeCruise,
    AccelCruise,
    DecelCruise,
    Cancel,
    /// 跟车距离调节
    GapAdjustCruise,
}

/// 按钮边沿事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ButtonEvent {
    pub button: ButtonType,
    /// `true` 为按下，`false` 为松开
    pub pressed: bool,
}

/// 监控表中的一项
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonitoredButton {
    pub button: ButtonType,
    pub message: &'static str,
    pub signal: &'static str,
    /// 视为按下的信号取值
    pub pressed_values: &'static [f64],
}

impl MonitoredButton {
    pub const fn new(
        button: ButtonType,
        message: &'static str,
        signal: &'static str,
        pressed_values: &'static [f64],
    ) -> Self {
        Self {
            button,
            message,
            signal,
            pressed_values,
        }
    }

    /// 当前快照中是否处于按下状态（信号缺失视为松开）
    pub fn is_pressed(&self, frame: &SignalFrame) -> bool {
        frame
            .get(self.message, self.signal)
            .is_ok_and(|value| self.pressed_values.contains(&value))
    }
}

/// EUCD 平台方向盘巡航按钮
pub const EUCD_BUTTONS: &[MonitoredButton] = &[
    MonitoredButton::new(ButtonType::MainCruise, MSG_CC_BUTTONS, "ACCOnOffBtn", &[1.0]),
    MonitoredButton::new(ButtonType::SetCruise, MSG_CC_BUTTONS, "ACCSetBtn", &[1.0]),
    MonitoredButton::new(ButtonType::ResumeCruise, MSG_CC_BUTTONS, "ACCResumeBtn", &[1.0]),
    MonitoredButton::new(ButtonType::AccelCruise, MSG_CC_BUTTONS, "ACCUpBtn", &[1.0]),
    MonitoredButton::new(ButtonType::DecelCruise, MSG_CC_BUTTONS, "ACCDownBtn", &[1.0]),
    MonitoredButton::new(ButtonType::Cancel, MSG_CC_BUTTONS, "ACCStopBtn", &[1.0]),
    MonitoredButton::new(ButtonType::GapAdjustCruise, MSG_CC_BUTTONS, "TimeGapIncreaseBtn", &[1.0]),
    MonitoredButton::new(ButtonType::GapAdjustCruise, MSG_CC_BUTTONS, "TimeGapDecreaseBtn", &[1.0]),
];

/// 按钮边沿检测器
pub trait ButtonEdgeDetector: Send {
    /// 与上一次调用比较，返回状态发生变化的按钮（按表顺序）
    fn detect(&mut self, frame: &SignalFrame, buttons: &[MonitoredButton]) -> Vec<ButtonEvent>;
}

/// 记录每个按钮上一周期状态的边沿检测器
///
/// 以 `(报文, 信号)` 为键，同一类型的多个物理按钮互不干扰。
#[derive(Debug, Clone, Default)]
pub struct TransitionDetector {
    previous: HashMap<(&'static str, &'static str), bool>,
}

impl TransitionDetector {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ButtonEdgeDetector for TransitionDetector {
    fn detect(&mut self, frame: &SignalFrame, buttons: &[MonitoredButton]) -> Vec<ButtonEvent> {
        let mut events = Vec::new();
        for button in buttons {
            let pressed = button.is_pressed(frame);
            let previous = self
                .previous
                .insert((button.message, button.signal), pressed)
                .unwrap_or(false);
            if previous != pressed {
                events.push(ButtonEvent {
                    button: button.button,
                    pressed,
                });
            }
        }
        events
    }
}
