//! 报文 ID 常量定义
//!
//! 下行控制报文的 ID，以及上行订阅所使用的报文名称。

// ============================================================================
// 下行控制报文 ID 常量
// ============================================================================

/// 方向盘按钮（巡航取消/恢复/车道居中开关）
pub const ID_STEERING_BUTTONS: u32 = 0x083;

/// 纵向控制指令（推进/制动加速度请求）
pub const ID_ACC_COMMAND: u32 = 0x186;

/// 巡航 HUD 状态（车道居中状态显示）
pub const ID_ACC_UI: u32 = 0x18A;

/// 转向模式指令（车道保持辅助动作请求）
pub const ID_LANE_ASSIST: u32 = 0x3CA;

/// 横向运动控制指令（曲率请求）
pub const ID_LATERAL_MOTION: u32 = 0x3D3;

/// 车道保持 HUD 状态（车道线/手离方向盘提示）
pub const ID_LKAS_UI: u32 = 0x3D8;

// ============================================================================
// 上行报文名称（由信号数据库解码）
// ============================================================================

/// 主总线：车速
pub const MSG_VEHICLE_SPEED: &str = "VehicleSpeed1";
/// 主总线：油门踏板
pub const MSG_ACC_PEDAL: &str = "AccPedal";
/// 主总线：转向伺服（角度、力矩）
pub const MSG_PSCM: &str = "PSCM1";
/// 主总线：巡航设定车速
pub const MSG_ACC_SPEED: &str = "ACC_Speed";
/// 主总线：转向灯等车身信息
pub const MSG_MISC_CAR_INFO: &str = "MiscCarInfo";
/// 主总线：巡航按钮
pub const MSG_CC_BUTTONS: &str = "CCButtons";
/// 摄像头总线：ACC 状态
pub const MSG_FSM0: &str = "FSM0";
/// 摄像头总线：ACC 跟车距离
pub const MSG_FSM1: &str = "FSM1";
/// 摄像头总线：ACC 静止保持
pub const MSG_FSM3: &str = "FSM3";
