//! 控制层输入/输出类型
//!
//! 每个周期由上游规划层产出，对命令生成器只读。

use carlink_protocol::LaneHud;

/// 执行器指令
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Actuators {
    /// 期望曲率（1/m，左正）
    pub curvature: f64,
    /// 期望纵向加速度（m/s²）
    pub accel: f64,
}

/// 巡航/接管意图
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CruiseIntent {
    /// 请求取消巡航
    pub cancel: bool,
    /// 请求恢复巡航
    pub resume: bool,
    /// 横向控制激活
    pub lat_active: bool,
    /// 纵向控制激活
    pub long_active: bool,
}

/// HUD 视觉告警类别
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VisualAlert {
    #[default]
    None,
    /// 请手握方向盘
    SteerRequired,
    /// 车道偏离警告
    Ldw,
    /// 制动请求
    BrakePressed,
    /// 前碰撞预警
    Fcw,
}

impl VisualAlert {
    /// 是否属于转向告警（驱动手离方向盘提示）
    pub fn is_steer_alert(self) -> bool {
        matches!(self, VisualAlert::SteerRequired | VisualAlert::Ldw)
    }
}

/// HUD 意图
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HudIntent {
    pub visual_alert: VisualAlert,
    /// 巡航主开关（cruise available）
    pub main_on: bool,
    /// 车道线显示
    pub lanes: LaneHud,
}

/// 单周期控制输入
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CarControl {
    pub actuators: Actuators,
    pub cruise: CruiseIntent,
    pub hud: HudIntent,
}

/// 命令生成器需要的车辆当前状态
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ControllerInputs {
    /// 车速（m/s）
    pub v_ego: f64,
    /// 实测方向盘角度（度）
    pub steering_angle_deg: f64,
    /// 摄像头上报的原厂车道居中状态，非 0 表示原厂功能未关闭
    pub stock_tja_status: u8,
}
