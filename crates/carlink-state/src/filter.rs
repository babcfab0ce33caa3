//! 车速滤波
//!
//! 默认实现为两状态（速度、加速度）常增益卡尔曼滤波器，增益按 100Hz 离线求得。

use carlink_params::DT_CTRL;

/// 车速/加速度滤波器
///
/// 内部状态跨周期保持，由估计器独占。
pub trait SpeedFilter: Send {
    /// 输入原始车速（m/s），返回 `(速度, 加速度)`
    fn update(&mut self, raw_speed: f64) -> (f64, f64);
}

/// 偏差超过此值（m/s）时直接以测量值重置状态
const RESEED_THRESHOLD: f64 = 2.0;

/// 稳态卡尔曼增益（dt = 0.01s）
const STEADY_STATE_GAIN: [f64; 2] = [0.12287673, 0.29666309];

/// 一维常增益卡尔曼滤波
///
/// ```text
/// A = [[1, dt], [0, 1]]
/// C = [1, 0]
/// x' = A·x + K·(z - C·A·x)
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedKalman {
    x: [f64; 2],
    dt: f64,
    gain: [f64; 2],
}

impl SpeedKalman {
    pub fn new() -> Self {
        Self {
            x: [0.0, 0.0],
            dt: DT_CTRL,
            gain: STEADY_STATE_GAIN,
        }
    }

    /// 当前状态 `[速度, 加速度]`
    pub fn state(&self) -> [f64; 2] {
        self.x
    }

    /// 重置为给定速度、零加速度
    pub fn reset(&mut self, speed: f64) {
        self.x = [speed, 0.0];
    }
}

impl Default for SpeedKalman {
    fn default() -> Self {
        Self::new()
    }
}

impl SpeedFilter for SpeedKalman {
    fn update(&mut self, raw_speed: f64) -> (f64, f64) {
        if !raw_speed.is_finite() {
            return (self.x[0], self.x[1]);
        }
        if (raw_speed - self.x[0]).abs() > RESEED_THRESHOLD {
            self.reset(raw_speed);
        }

        let predicted = [self.x[0] + self.dt * self.x[1], self.x[1]];
        let innovation = raw_speed - predicted[0];
        self.x = [
            predicted[0] + self.gain[0] * innovation,
            predicted[1] + self.gain[1] * innovation,
        ];

        (self.x[0], self.x[1])
    }
}
