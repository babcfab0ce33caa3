//! 车辆运动学模型
//!
//! 命令生成器只需要「曲率 → 方向盘角度」这一个映射，用来挑选斜坡类型。
//! 具体模型可替换，默认使用带侧滑修正的单车模型。

use carlink_params::VehicleGeometry;

/// 曲率到方向盘角度的映射
pub trait VehicleModel: Send {
    /// 给定曲率（1/m）、车速（m/s）和侧倾角（rad）下的方向盘角度（度）
    fn angle_from_curvature(&self, curvature: f64, speed: f64, roll: f64) -> f64;
}

/// 运动学单车模型
///
/// `δ = κ · L · sR · (1 - K·u²)`，其中 `K` 为侧滑因子。
/// 不考虑侧倾。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KinematicBicycle {
    geometry: VehicleGeometry,
}

impl KinematicBicycle {
    pub fn new(geometry: VehicleGeometry) -> Self {
        Self { geometry }
    }

    pub fn geometry(&self) -> &VehicleGeometry {
        &self.geometry
    }

    /// 曲率因子 `L · (1 - K·u²)`
    fn curvature_factor(&self, speed: f64) -> f64 {
        self.geometry.wheelbase * (1.0 - self.geometry.slip_factor * speed * speed)
    }
}

impl Default for KinematicBicycle {
    fn default() -> Self {
        Self::new(VehicleGeometry::default())
    }
}

impl VehicleModel for KinematicBicycle {
    fn angle_from_curvature(&self, curvature: f64, speed: f64, _roll: f64) -> f64 {
        let steer_rad = curvature * self.geometry.steer_ratio * self.curvature_factor(speed);
        steer_rad.to_degrees()
    }
}
