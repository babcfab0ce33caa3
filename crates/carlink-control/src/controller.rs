//! 命令生成器
//!
//! 每个控制周期调用一次 [`CarController::update`]，根据规划层输入和车辆
//! 当前状态产出本周期要发送的总线帧。
//!
//! # 周期流程
//!
//! 1. 按钮仲裁：取消 > 恢复 > 关闭原厂车道居中
//! 2. 横向控制（`STEER_STEP` 分频）：曲率限幅、斜坡类型、转向模式 + 横向运动报文
//! 3. 纵向控制（`ACC_CONTROL_STEP` 分频，仅在接管纵向时）
//! 4. HUD：周期发送，状态变化时立即补发
//! 5. 周期计数 +1
//!
//! 整个周期在 [`ControllerMemory`] 的副本上计算，结束时一次性写回。

use carlink_params::{CarParams, ParamsError, step_fires};
use carlink_protocol::{
    AccCommand, AccUiCommand, Bus, ButtonCommand, CarFrame, LateralMotionCommand, LkaCommand,
    LkasUiCommand, PathPrecision, RampType,
};
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::limiter::apply_curvature_limits;
use crate::model::{KinematicBicycle, VehicleModel};
use crate::types::{Actuators, CarControl, ControllerInputs};

/// 单周期输出帧缓冲
///
/// 单周期最多 7 帧（2 取消 + 转向模式 + 横向 + 纵向 + 2 HUD），不会溢出到堆。
pub type FrameBuffer = SmallVec<[CarFrame; 8]>;

/// 纵向：低于此加速度时切换为制动减速请求
const DECEL_REQUEST_THRESHOLD: f64 = -0.5;

/// 纵向：制动减速请求时的驱动加速度
const DECEL_PROPULSION_ACCEL: f64 = -5.0;

/// 纵向：低于此加速度时预充制动
const PRECHARGE_THRESHOLD: f64 = -0.1;

/// 斜坡类型阈值（度），`[Slow, Medium, Fast]` 的上界
const RAMP_THRESHOLDS_DEG: [f64; 3] = [2.5, 5.0, 7.5];

/// 跨周期状态
///
/// 由控制器实例独占，可通过 [`CarController::with_memory`] 注入以便测试或恢复。
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ControllerMemory {
    /// 周期计数（溢出回绕）
    pub frame: u64,
    /// 上一次实际下发的曲率，始终在 `[-curvature_max, curvature_max]` 内
    pub apply_curvature_last: f64,
    /// 上一周期 HUD 快照
    pub main_on_last: bool,
    pub lat_active_last: bool,
    pub steer_alert_last: bool,
}

/// 单周期输出
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerOutput {
    /// 本周期待发送的帧（按生成顺序）
    pub frames: FrameBuffer,
    /// 执行器回显，曲率为实际下发值
    pub actuators: Actuators,
}

/// 按方向盘角度变化量选择斜坡类型
///
/// 阈值使用严格小于，恰好落在边界上的值归入更快的一档。
pub fn ramp_type_for(steer_change_deg: f64) -> RampType {
    let change = steer_change_deg.abs();
    if change < RAMP_THRESHOLDS_DEG[0] {
        RampType::Slow
    } else if change < RAMP_THRESHOLDS_DEG[1] {
        RampType::Medium
    } else if change < RAMP_THRESHOLDS_DEG[2] {
        RampType::Fast
    } else {
        RampType::Immediate
    }
}

/// 命令生成器
pub struct CarController {
    params: CarParams,
    model: Box<dyn VehicleModel>,
    memory: ControllerMemory,
}

impl std::fmt::Debug for CarController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CarController")
            .field("params", &self.params)
            .field("memory", &self.memory)
            .finish_non_exhaustive()
    }
}

impl CarController {
    /// 创建控制器（配置在此校验一次）
    pub fn new(params: CarParams, model: Box<dyn VehicleModel>) -> Result<Self, ParamsError> {
        params.validate()?;
        Ok(Self {
            params,
            model,
            memory: ControllerMemory::default(),
        })
    }

    /// 使用配置中的车辆几何构建默认单车模型
    pub fn with_default_model(params: CarParams) -> Result<Self, ParamsError> {
        let model = KinematicBicycle::new(params.geometry);
        Self::new(params, Box::new(model))
    }

    /// 注入跨周期状态
    ///
    /// 超出范围的 `apply_curvature_last` 会被截断到曲率上限内。
    pub fn with_memory(mut self, mut memory: ControllerMemory) -> Self {
        let max = self.params.limits.curvature_max;
        memory.apply_curvature_last = if memory.apply_curvature_last.is_nan() {
            0.0
        } else {
            memory.apply_curvature_last.clamp(-max, max)
        };
        self.memory = memory;
        self
    }

    pub fn memory(&self) -> &ControllerMemory {
        &self.memory
    }

    pub fn params(&self) -> &CarParams {
        &self.params
    }

    /// 执行一个控制周期
    pub fn update(&mut self, cc: &CarControl, cs: &ControllerInputs) -> ControllerOutput {
        let previous = self.memory;
        let mut next = previous;
        let mut frames = FrameBuffer::new();

        let steps = &self.params.steps;
        let frame = previous.frame;
        let main_on = cc.hud.main_on;
        let lat_active = cc.cruise.lat_active;
        let steer_alert = cc.hud.visual_alert.is_steer_alert();

        // 按钮
        if cc.cruise.cancel {
            frames.push(ButtonCommand::cancel().to_frame(Bus::Camera));
            frames.push(ButtonCommand::cancel().to_frame(Bus::Main));
        } else if cc.cruise.resume && step_fires(frame, steps.buttons) {
            frames.push(ButtonCommand::resume().to_frame(Bus::Camera));
            frames.push(ButtonCommand::resume().to_frame(Bus::Main));
        } else if cs.stock_tja_status != 0 && step_fires(frame, steps.acc_ui) {
            // 原厂车道居中未关闭时模拟按键将其关闭
            frames.push(ButtonCommand::tja_toggle().to_frame(Bus::Camera));
        }

        // 横向
        if step_fires(frame, steps.steer) {
            let apply_curvature = apply_curvature_limits(
                cc.actuators.curvature,
                previous.apply_curvature_last,
                cs.v_ego,
                lat_active,
                &self.params.limits,
            );

            let angle_des = -self.model.angle_from_curvature(apply_curvature, cs.v_ego, 0.0);
            let ramp = ramp_type_for(cs.steering_angle_deg - angle_des);

            frames.push(LkaCommand::idle().to_frame(Bus::Main));
            frames.push(
                LateralMotionCommand {
                    request: lat_active,
                    ramp,
                    precision: PathPrecision::Precise,
                    path_offset_m: 0.0,
                    curvature: -apply_curvature,
                    curvature_rate: 0.0,
                }
                .to_frame(Bus::Main),
            );

            trace!(
                frame,
                desired = cc.actuators.curvature,
                apply_curvature,
                ?ramp,
                "lateral command"
            );
            next.apply_curvature_last = apply_curvature;
        }

        // 纵向
        if self.params.long_control_enabled && step_fires(frame, steps.acc_control) {
            frames.push(self.acc_command(cc).to_frame(Bus::Main));
        }

        // HUD：与周期开始时的快照比较
        let ui_changed = previous.main_on_last != main_on
            || previous.lat_active_last != lat_active
            || previous.steer_alert_last != steer_alert;
        if ui_changed {
            debug!(frame, main_on, lat_active, steer_alert, "HUD state changed");
        }

        if step_fires(frame, steps.lkas_ui) || ui_changed {
            frames.push(
                LkasUiCommand::from_hud(main_on, lat_active, steer_alert, cc.hud.lanes)
                    .to_frame(Bus::Main),
            );
        }
        if step_fires(frame, steps.acc_ui) || ui_changed {
            frames.push(AccUiCommand::from_hud(main_on, lat_active, cc.hud.lanes).to_frame(Bus::Main));
        }

        next.main_on_last = main_on;
        next.lat_active_last = lat_active;
        next.steer_alert_last = steer_alert;
        next.frame = frame.wrapping_add(1);

        self.memory = next;

        ControllerOutput {
            frames,
            actuators: Actuators {
                curvature: next.apply_curvature_last,
                accel: cc.actuators.accel,
            },
        }
    }

    fn acc_command(&self, cc: &CarControl) -> AccCommand {
        let limits = &self.params.limits;
        let accel = if cc.actuators.accel.is_nan() {
            0.0
        } else {
            cc.actuators.accel.clamp(limits.accel_min, limits.accel_max)
        };

        let (propulsion_accel, decel_request) = if accel > DECEL_REQUEST_THRESHOLD {
            (accel, false)
        } else {
            (DECEL_PROPULSION_ACCEL, true)
        };

        AccCommand {
            enable: cc.cruise.long_active,
            propulsion_accel,
            brake_accel: accel,
            decel_request,
            precharge: accel < PRECHARGE_THRESHOLD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CruiseIntent, HudIntent, VisualAlert};
    use carlink_protocol::{
        ID_ACC_COMMAND, ID_ACC_UI, ID_LANE_ASSIST, ID_LATERAL_MOTION, ID_LKAS_UI,
        ID_STEERING_BUTTONS, bytes_to_i16_be, bytes_to_i32_be,
    };

    fn controller() -> CarController {
        CarController::with_default_model(CarParams::default()).unwrap()
    }

    fn long_controller() -> CarController {
        let params = CarParams {
            long_control_enabled: true,
            ..CarParams::default()
        };
        CarController::with_default_model(params).unwrap()
    }

    fn ids(output: &ControllerOutput) -> Vec<(Bus, u32)> {
        output.frames.iter().map(|f| (f.bus, f.id)).collect()
    }

    fn count(output: &ControllerOutput, id: u32) -> usize {
        output.frames.iter().filter(|f| f.id == id).count()
    }

    /// 固定角度模型，便于精确控制斜坡类型
    struct FixedAngle(f64);

    impl VehicleModel for FixedAngle {
        fn angle_from_curvature(&self, _curvature: f64, _speed: f64, _roll: f64) -> f64 {
            self.0
        }
    }

    // ========================================================================
    // 构造
    // ========================================================================

    #[test]
    fn test_new_rejects_invalid_params() {
        let mut params = CarParams::default();
        params.steps.steer = 0;
        assert!(CarController::with_default_model(params).is_err());
    }

    #[test]
    fn test_with_memory_clamps_curvature() {
        let memory = ControllerMemory {
            apply_curvature_last: 1.0,
            ..ControllerMemory::default()
        };
        let controller = controller().with_memory(memory);
        assert_eq!(controller.memory().apply_curvature_last, 0.02);
    }

    // ========================================================================
    // 按钮仲裁
    // ========================================================================

    #[test]
    fn test_cancel_has_priority() {
        let mut controller = controller();
        let cc = CarControl {
            cruise: CruiseIntent {
                cancel: true,
                resume: true,
                ..CruiseIntent::default()
            },
            ..CarControl::default()
        };
        let cs = ControllerInputs {
            stock_tja_status: 2,
            ..ControllerInputs::default()
        };

        let output = controller.update(&cc, &cs);
        let buttons: Vec<_> = output
            .frames
            .iter()
            .filter(|f| f.id == ID_STEERING_BUTTONS)
            .collect();

        assert_eq!(buttons.len(), 2);
        assert_eq!(buttons[0].bus, Bus::Camera);
        assert_eq!(buttons[1].bus, Bus::Main);
        assert!(buttons.iter().all(|f| f.data[0] == 0b0000_0001));
    }

    #[test]
    fn test_cancel_sent_every_cycle() {
        let mut controller = controller();
        let cc = CarControl {
            cruise: CruiseIntent {
                cancel: true,
                ..CruiseIntent::default()
            },
            ..CarControl::default()
        };

        for _ in 0..7 {
            let output = controller.update(&cc, &ControllerInputs::default());
            assert_eq!(count(&output, ID_STEERING_BUTTONS), 2);
        }
    }

    #[test]
    fn test_resume_follows_button_step() {
        let mut controller = controller();
        let cc = CarControl {
            cruise: CruiseIntent {
                resume: true,
                ..CruiseIntent::default()
            },
            ..CarControl::default()
        };

        let sent: Vec<usize> = (0..10)
            .map(|_| count(&controller.update(&cc, &ControllerInputs::default()), ID_STEERING_BUTTONS))
            .collect();
        assert_eq!(sent, vec![2, 0, 0, 0, 0, 2, 0, 0, 0, 0]);
    }

    #[test]
    fn test_stock_lane_centering_toggle_on_camera_only() {
        let mut controller = controller();
        let cs = ControllerInputs {
            stock_tja_status: 1,
            ..ControllerInputs::default()
        };

        let output = controller.update(&CarControl::default(), &cs);
        let buttons: Vec<_> = output
            .frames
            .iter()
            .filter(|f| f.id == ID_STEERING_BUTTONS)
            .collect();
        assert_eq!(buttons.len(), 1);
        assert_eq!(buttons[0].bus, Bus::Camera);
        assert_eq!(buttons[0].data[0], 0b0000_0100);

        // 非 ACC_UI_STEP 周期不发送
        let output = controller.update(&CarControl::default(), &cs);
        assert_eq!(count(&output, ID_STEERING_BUTTONS), 0);
    }

    #[test]
    fn test_no_toggle_when_stock_off() {
        let mut controller = controller();
        let output = controller.update(&CarControl::default(), &ControllerInputs::default());
        assert_eq!(count(&output, ID_STEERING_BUTTONS), 0);
    }

    // ========================================================================
    // 横向
    // ========================================================================

    #[test]
    fn test_lateral_emitted_on_steer_step() {
        let mut controller = controller();
        let cc = CarControl::default();
        let cs = ControllerInputs::default();

        for frame in 0..11u64 {
            let output = controller.update(&cc, &cs);
            let expected = usize::from(frame % 5 == 0);
            assert_eq!(count(&output, ID_LATERAL_MOTION), expected, "frame {frame}");
            assert_eq!(count(&output, ID_LANE_ASSIST), expected, "frame {frame}");
        }
    }

    #[test]
    fn test_lka_message_precedes_lateral_motion() {
        let mut controller = controller();
        let output = controller.update(&CarControl::default(), &ControllerInputs::default());
        let lka = output.frames.iter().position(|f| f.id == ID_LANE_ASSIST);
        let lat = output.frames.iter().position(|f| f.id == ID_LATERAL_MOTION);
        assert!(lka.unwrap() < lat.unwrap());
    }

    #[test]
    fn test_lat_inactive_is_idempotent() {
        let mut controller = controller().with_memory(ControllerMemory {
            apply_curvature_last: 0.01,
            ..ControllerMemory::default()
        });
        let cc = CarControl {
            actuators: Actuators {
                curvature: 0.015,
                accel: 0.0,
            },
            ..CarControl::default()
        };

        let first = controller.update(&cc, &ControllerInputs::default());
        assert_eq!(first.actuators.curvature, 0.0);
        assert_eq!(controller.memory().apply_curvature_last, 0.0);

        // 跳到下一个 STEER_STEP 周期
        let mut last = first;
        for _ in 0..5 {
            last = controller.update(&cc, &ControllerInputs::default());
        }
        assert_eq!(last.actuators.curvature, 0.0);
        assert_eq!(controller.memory().apply_curvature_last, 0.0);

        let lat = last.frames.iter().find(|f| f.id == ID_LATERAL_MOTION).unwrap();
        assert_eq!(lat.data[0] & 0x01, 0);
        assert_eq!(bytes_to_i32_be([lat.data[1], lat.data[2], lat.data[3], lat.data[4]]), 0);
    }

    #[test]
    fn test_lateral_curvature_is_rate_limited_and_negated() {
        let mut controller = controller();
        let cc = CarControl {
            actuators: Actuators {
                curvature: 0.01,
                accel: 0.0,
            },
            cruise: CruiseIntent {
                lat_active: true,
                ..CruiseIntent::default()
            },
            ..CarControl::default()
        };
        let cs = ControllerInputs {
            v_ego: 30.0,
            ..ControllerInputs::default()
        };

        let output = controller.update(&cc, &cs);
        assert!((output.actuators.curvature - 0.0001).abs() < 1e-12);

        let lat = output.frames.iter().find(|f| f.id == ID_LATERAL_MOTION).unwrap();
        assert_eq!(lat.data[0] & 0x01, 1);
        // 精确模式
        assert_eq!(lat.data[0] & 0b1000, 0b1000);
        let raw = bytes_to_i32_be([lat.data[1], lat.data[2], lat.data[3], lat.data[4]]);
        assert_eq!(raw, -1000);
    }

    #[test]
    fn test_memory_unchanged_off_steer_step() {
        let mut controller = controller();
        let cc = CarControl {
            actuators: Actuators {
                curvature: 0.01,
                accel: 0.0,
            },
            cruise: CruiseIntent {
                lat_active: true,
                ..CruiseIntent::default()
            },
            ..CarControl::default()
        };
        let cs = ControllerInputs {
            v_ego: 30.0,
            ..ControllerInputs::default()
        };

        let first = controller.update(&cc, &cs).actuators.curvature;
        for _ in 1..5 {
            let output = controller.update(&cc, &cs);
            assert_eq!(output.actuators.curvature, first);
        }
    }

    #[test]
    fn test_ramp_type_boundaries() {
        assert_eq!(ramp_type_for(0.0), RampType::Slow);
        assert_eq!(ramp_type_for(2.49), RampType::Slow);
        assert_eq!(ramp_type_for(2.5), RampType::Medium);
        assert_eq!(ramp_type_for(4.99), RampType::Medium);
        assert_eq!(ramp_type_for(5.0), RampType::Fast);
        assert_eq!(ramp_type_for(7.49), RampType::Fast);
        assert_eq!(ramp_type_for(7.5), RampType::Immediate);
        assert_eq!(ramp_type_for(-7.5), RampType::Immediate);
        assert_eq!(ramp_type_for(90.0), RampType::Immediate);
    }

    #[test]
    fn test_ramp_type_uses_model_angle() {
        // 期望角 = -model(...) = -(-2.5) = 2.5，实测 0 → 变化量 2.5 → Medium
        let mut controller =
            CarController::new(CarParams::default(), Box::new(FixedAngle(-2.5))).unwrap();
        let output = controller.update(&CarControl::default(), &ControllerInputs::default());
        let lat = output.frames.iter().find(|f| f.id == ID_LATERAL_MOTION).unwrap();
        assert_eq!((lat.data[0] >> 1) & 0b11, u8::from(RampType::Medium));
    }

    // ========================================================================
    // 纵向
    // ========================================================================

    #[test]
    fn test_long_disabled_sends_nothing() {
        let mut controller = controller();
        for _ in 0..4 {
            let output = controller.update(&CarControl::default(), &ControllerInputs::default());
            assert_eq!(count(&output, ID_ACC_COMMAND), 0);
        }
    }

    #[test]
    fn test_long_follows_acc_control_step() {
        let mut controller = long_controller();
        let sent: Vec<usize> = (0..4)
            .map(|_| count(&controller.update(&CarControl::default(), &ControllerInputs::default()), ID_ACC_COMMAND))
            .collect();
        assert_eq!(sent, vec![1, 0, 1, 0]);
    }

    fn acc_frame(accel: f64, long_active: bool) -> CarFrame {
        let mut controller = long_controller();
        let cc = CarControl {
            actuators: Actuators {
                curvature: 0.0,
                accel,
            },
            cruise: CruiseIntent {
                long_active,
                ..CruiseIntent::default()
            },
            ..CarControl::default()
        };
        let output = controller.update(&cc, &ControllerInputs::default());
        *output.frames.iter().find(|f| f.id == ID_ACC_COMMAND).unwrap()
    }

    #[test]
    fn test_long_propulsion() {
        let frame = acc_frame(1.0, true);
        assert_eq!(frame.data[0], 0b0000_0001);
        assert_eq!(bytes_to_i16_be([frame.data[1], frame.data[2]]), 1000);
        assert_eq!(bytes_to_i16_be([frame.data[3], frame.data[4]]), 1000);
    }

    #[test]
    fn test_long_precharge_without_decel() {
        let frame = acc_frame(-0.3, true);
        // enable + precharge
        assert_eq!(frame.data[0], 0b0000_0101);
        assert_eq!(bytes_to_i16_be([frame.data[1], frame.data[2]]), -300);
    }

    #[test]
    fn test_long_decel_request() {
        let frame = acc_frame(-0.5, false);
        // decel + precharge，未使能
        assert_eq!(frame.data[0], 0b0000_0110);
        assert_eq!(bytes_to_i16_be([frame.data[1], frame.data[2]]), -5000);
        assert_eq!(bytes_to_i16_be([frame.data[3], frame.data[4]]), -500);
    }

    #[test]
    fn test_long_accel_is_clamped() {
        let frame = acc_frame(10.0, true);
        assert_eq!(bytes_to_i16_be([frame.data[3], frame.data[4]]), 2000);

        let frame = acc_frame(-10.0, true);
        assert_eq!(bytes_to_i16_be([frame.data[3], frame.data[4]]), -3500);
    }

    // ========================================================================
    // HUD
    // ========================================================================

    #[test]
    fn test_ui_periodic() {
        let mut controller = controller();
        let mut lkas = Vec::new();
        let mut acc = Vec::new();
        for _ in 0..200 {
            let output = controller.update(&CarControl::default(), &ControllerInputs::default());
            lkas.push(count(&output, ID_LKAS_UI));
            acc.push(count(&output, ID_ACC_UI));
        }

        assert_eq!(lkas.iter().sum::<usize>(), 2);
        assert_eq!(lkas[0], 1);
        assert_eq!(lkas[100], 1);
        assert_eq!(acc.iter().sum::<usize>(), 40);
    }

    #[test]
    fn test_ui_sent_immediately_on_change() {
        let mut controller = controller();
        controller.update(&CarControl::default(), &ControllerInputs::default());

        let cc = CarControl {
            hud: HudIntent {
                visual_alert: VisualAlert::SteerRequired,
                ..HudIntent::default()
            },
            ..CarControl::default()
        };

        // frame 1 既不是 LKAS_UI_STEP 也不是 ACC_UI_STEP 周期
        let output = controller.update(&cc, &ControllerInputs::default());
        assert_eq!(count(&output, ID_LKAS_UI), 1);
        assert_eq!(count(&output, ID_ACC_UI), 1);

        let lkas = output.frames.iter().find(|f| f.id == ID_LKAS_UI).unwrap();
        assert_eq!(lkas.data[1], 2);

        // 状态未再变化
        let output = controller.update(&cc, &ControllerInputs::default());
        assert_eq!(count(&output, ID_LKAS_UI), 0);
        assert_eq!(count(&output, ID_ACC_UI), 0);
    }

    #[test]
    fn test_ui_main_on_change() {
        let mut controller = controller();
        controller.update(&CarControl::default(), &ControllerInputs::default());

        let cc = CarControl {
            hud: HudIntent {
                main_on: true,
                ..HudIntent::default()
            },
            ..CarControl::default()
        };
        let output = controller.update(&cc, &ControllerInputs::default());
        let acc = output.frames.iter().find(|f| f.id == ID_ACC_UI).unwrap();
        assert_eq!(acc.data[0], 1);
        assert!(controller.memory().main_on_last);
    }

    // ========================================================================
    // 周期
    // ========================================================================

    #[test]
    fn test_frame_counter_wraps() {
        let mut controller = controller().with_memory(ControllerMemory {
            frame: u64::MAX,
            ..ControllerMemory::default()
        });
        controller.update(&CarControl::default(), &ControllerInputs::default());
        assert_eq!(controller.memory().frame, 0);
    }

    #[test]
    fn test_output_buses() {
        let mut controller = long_controller();
        let output = controller.update(&CarControl::default(), &ControllerInputs::default());
        assert_eq!(
            ids(&output),
            vec![
                (Bus::Main, ID_LANE_ASSIST),
                (Bus::Main, ID_LATERAL_MOTION),
                (Bus::Main, ID_ACC_COMMAND),
                (Bus::Main, ID_LKAS_UI),
                (Bus::Main, ID_ACC_UI),
            ]
        );
    }

    #[test]
    fn test_actuator_echo_keeps_accel() {
        let mut controller = controller();
        let cc = CarControl {
            actuators: Actuators {
                curvature: 0.0,
                accel: 1.25,
            },
            ..CarControl::default()
        };
        let output = controller.update(&cc, &ControllerInputs::default());
        assert_eq!(output.actuators.accel, 1.25);
    }
}
