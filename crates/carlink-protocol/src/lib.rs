//! # Carlink Protocol
//!
//! 车辆总线协议层（无硬件依赖）
//!
//! ## 模块
//!
//! - `ids`: 报文 ID 常量定义
//! - `control`: 下行控制报文构建（按钮、转向、纵向、HUD）
//! - `signals`: 已解码信号快照与订阅描述
//!
//! ## 字节序
//!
//! 下行报文统一使用 Motorola (MSB) 高位在前（大端字节序）。
//! 本模块提供了定点数编码工具函数，超出范围的物理量一律饱和截断，不会报错。

pub mod control;
pub mod ids;
pub mod signals;

// 重新导出常用类型
pub use control::*;
pub use ids::*;
pub use signals::*;

use num_enum::{IntoPrimitive, TryFromPrimitive};
use thiserror::Error;

/// 总线编号
///
/// 与车辆网关的物理接线一致：主总线接 PCM/PSCM 等动力域节点，
/// 摄像头总线位于前视摄像头（ADAS 控制器）与网关之间。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Bus {
    /// 主总线（动力域）
    #[default]
    Main = 0,
    /// 雷达总线
    Radar = 1,
    /// 摄像头总线
    Camera = 2,
}

/// 下行总线报文的统一抽象
///
/// # 设计目的
///
/// `CarFrame` 是控制层和传输层之间的中间抽象：
/// - **层次解耦**：控制层只产出帧，不关心发送调度与仲裁
/// - **目标总线**：每一帧都携带 `bus`，传输层据此路由
/// - **不可变**：创建后不再修改，所有权随即移交给传输层
///
/// # 设计特性
///
/// - **Copy trait**：零成本复制，适合 100Hz 控制周期内批量产出
/// - **固定 8 字节**：避免堆分配
///
/// # 示例
///
/// ```rust
/// use carlink_protocol::{Bus, CarFrame};
///
/// let frame = CarFrame::new(Bus::Camera, 0x3D3, &[1, 2, 3, 4]);
///
/// assert_eq!(frame.bus(), Bus::Camera);
/// assert_eq!(frame.id(), 0x3D3);
/// assert_eq!(frame.data_slice(), &[1, 2, 3, 4]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CarFrame {
    /// 目标总线
    pub bus: Bus,

    /// 报文 ID（11-bit 标准帧）
    pub id: u32,

    /// 帧数据（固定 8 字节，未使用部分为 0）
    pub data: [u8; 8],

    /// 有效数据长度 (0-8)
    pub len: u8,
}

impl CarFrame {
    /// 创建标准帧
    pub fn new(bus: Bus, id: u32, data: &[u8]) -> Self {
        let mut fixed_data = [0u8; 8];
        let len = data.len().min(8);
        fixed_data[..len].copy_from_slice(&data[..len]);

        Self {
            bus,
            id,
            data: fixed_data,
            len: len as u8,
        }
    }

    /// 获取数据切片（只包含有效数据）
    pub fn data_slice(&self) -> &[u8] {
        &self.data[..self.len as usize]
    }

    /// 获取报文 ID
    pub fn id(&self) -> u32 {
        self.id
    }

    /// 获取目标总线
    pub fn bus(&self) -> Bus {
        self.bus
    }

    /// 获取完整数据（8字节固定数组）
    pub fn data(&self) -> &[u8; 8] {
        &self.data
    }
}

/// 协议层错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProtocolError {
    /// 订阅的信号在本周期缺失（未解码或报文超时）
    #[error("Missing signal {message}.{signal}")]
    MissingSignal { message: String, signal: String },
}

/// 物理量转定点 i32（饱和截断，NaN 编码为 0）
///
/// `resolution` 为单个 LSB 对应的物理量，例如 `1e-7` 表示 0.0000001 1/m。
pub fn scale_to_i32(value: f64, resolution: f64) -> i32 {
    (value / resolution).round() as i32
}

/// 物理量转定点 i16（饱和截断，NaN 编码为 0）
pub fn scale_to_i16(value: f64, resolution: f64) -> i16 {
    (value / resolution).round() as i16
}

/// 物理量转定点 i8（饱和截断，NaN 编码为 0）
pub fn scale_to_i8(value: f64, resolution: f64) -> i8 {
    (value / resolution).round() as i8
}

/// 大端字节序转 i32
pub fn bytes_to_i32_be(bytes: [u8; 4]) -> i32 {
    i32::from_be_bytes(bytes)
}

/// 大端字节序转 i16
pub fn bytes_to_i16_be(bytes: [u8; 2]) -> i16 {
    i16::from_be_bytes(bytes)
}

/// i32 转大端字节序
pub fn i32_to_bytes_be(value: i32) -> [u8; 4] {
    value.to_be_bytes()
}

/// i16 转大端字节序
pub fn i16_to_bytes_be(value: i16) -> [u8; 2] {
    value.to_be_bytes()
}
