//! 总线发送端
//!
//! 传输层（发送调度、总线仲裁）是外部协作者。控制层只要求它按顺序接收
//! 本周期的帧并且不阻塞调用方。

use carlink_protocol::{Bus, CarFrame};
use thiserror::Error;

/// 传输层错误
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Transmit buffer overflow")]
    BufferOverflow,
    #[error("Bus off: {0:?}")]
    BusOff(Bus),
    #[error("Transport not started")]
    NotStarted,
}

/// 总线发送端
pub trait BusSink {
    /// 提交一帧（按帧上的 `bus` 路由）
    fn send(&mut self, frame: CarFrame) -> Result<(), TransportError>;

    /// 按顺序提交一批帧，遇到第一个错误即停止
    fn send_all(&mut self, frames: &[CarFrame]) -> Result<usize, TransportError> {
        for frame in frames {
            self.send(*frame)?;
        }
        Ok(frames.len())
    }
}

/// 内存记录，用于离线回放和测试
impl BusSink for Vec<CarFrame> {
    fn send(&mut self, frame: CarFrame) -> Result<(), TransportError> {
        self.push(frame);
        Ok(())
    }
}
