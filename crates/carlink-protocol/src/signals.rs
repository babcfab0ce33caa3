//! 已解码信号快照
//!
//! 信号数据库（外部协作者）每个周期为每条总线提供一份
//! "报文名 → 信号名 → 数值" 的快照。本模块只定义快照的形状与读取规则：
//! 缺失的信号必须显式报告给调用方，不在上游静默填充默认值。

use crate::{Bus, ProtocolError};
use std::collections::HashMap;

/// 报文订阅描述（报文名 + 期望频率）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription {
    pub message: &'static str,
    pub frequency_hz: u32,
}

impl Subscription {
    pub const fn new(message: &'static str, frequency_hz: u32) -> Self {
        Self {
            message,
            frequency_hz,
        }
    }
}

/// 一条总线在当前周期的已解码信号快照
///
/// 对状态估计器只读。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignalFrame {
    bus: Bus,
    values: HashMap<String, HashMap<String, f64>>,
}

impl SignalFrame {
    /// 创建空快照
    pub fn new(bus: Bus) -> Self {
        Self {
            bus,
            values: HashMap::new(),
        }
    }

    /// 快照所属总线
    pub fn bus(&self) -> Bus {
        self.bus
    }

    /// 写入一个信号值（由解码器调用）
    pub fn insert(&mut self, message: &str, signal: &str, value: f64) {
        self.values
            .entry(message.to_string())
            .or_default()
            .insert(signal.to_string(), value);
    }

    /// 链式写入，便于构造测试数据
    pub fn with(mut self, message: &str, signal: &str, value: f64) -> Self {
        self.insert(message, signal, value);
        self
    }

    /// 删除整条报文（模拟报文超时）
    pub fn remove_message(&mut self, message: &str) {
        self.values.remove(message);
    }

    /// 读取信号值
    ///
    /// # Errors
    ///
    /// 信号不存在时返回 [`ProtocolError::MissingSignal`]。
    pub fn get(&self, message: &str, signal: &str) -> Result<f64, ProtocolError> {
        self.values
            .get(message)
            .and_then(|signals| signals.get(signal))
            .copied()
            .ok_or_else(|| ProtocolError::MissingSignal {
                message: message.to_string(),
                signal: signal.to_string(),
            })
    }

    /// 读取信号值，缺失时使用默认值（仅用于非安全相关信号）
    pub fn get_or(&self, message: &str, signal: &str, default: f64) -> f64 {
        self.get(message, signal).unwrap_or(default)
    }

    /// 读取整条报文的全部信号
    pub fn message(&self, message: &str) -> Option<&HashMap<String, f64>> {
        self.values.get(message)
    }

    /// 快照中是否包含某条报文
    pub fn contains_message(&self, message: &str) -> bool {
        self.values.contains_key(message)
    }
}

/// 信号数据库解码器（外部协作者）
///
/// 初始化时登记订阅列表，之后每个周期提供最新一份快照。
pub trait SignalSource {
    /// 解码器对应的总线
    fn bus(&self) -> Bus;

    /// 登记订阅的报文与期望频率
    fn subscribe(&mut self, subscriptions: &[Subscription]);

    /// 当前周期最新的快照
    fn latest(&mut self) -> SignalFrame;
}
