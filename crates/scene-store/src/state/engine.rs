//! Handles supplied by the rendering engine (camera and scene frame)

use glam::DVec3;
use serde::{Deserialize, Serialize};
use shared::Vec3Array;

/// Current camera eye and look-at point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    pub eye: DVec3,
    pub target: DVec3,
}

impl CameraPose {
    pub fn new(eye: DVec3, target: DVec3) -> Self {
        Self { eye, target }
    }

    /// Unit view direction, or None when eye and target coincide
    pub fn forward(&self) -> Option<DVec3> {
        (self.target - self.eye).try_normalize()
    }

    /// Ray from the eye through the look-at point
    pub fn view_ray(&self) -> Option<Ray> {
        self.forward().map(|direction| Ray {
            origin: self.eye,
            direction,
        })
    }
}

/// Scene-level placement information
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneFrame {
    /// Height of the horizontal ground plane (y axis up)
    pub ground_height: f64,
}

impl Default for SceneFrame {
    fn default() -> Self {
        Self { ground_height: 0.0 }
    }
}

/// A ray in world space
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: DVec3,
    /// Normalized direction
    pub direction: DVec3,
}

impl Ray {
    pub fn at(&self, t: f64) -> DVec3 {
        self.origin + self.direction * t
    }
}

/// Distance along the ray to the horizontal plane `y = height`, if it is hit in front of the origin.
pub fn ray_ground(ray: &Ray, height: f64) -> Option<f64> {
    if ray.direction.y.abs() < 1e-9 {
        return None;
    }
    let t = (height - ray.origin.y) / ray.direction.y;
    (t > 0.0).then_some(t)
}

/// Engine handles currently registered with the store
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineContext {
    pub camera: Option<CameraPose>,
    pub scene: Option<SceneFrame>,
}

pub fn to_array(v: DVec3) -> Vec3Array {
    v.to_array()
}

pub fn from_array(a: Vec3Array) -> DVec3 {
    DVec3::from_array(a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_forward_is_normalized() {
        let cam = CameraPose::new(DVec3::new(0.0, 0.0, 10.0), DVec3::ZERO);
        let f = cam.forward().unwrap();
        assert_relative_eq!(f.z, -1.0);
        assert_relative_eq!(f.length(), 1.0);
    }

    #[test]
    fn test_degenerate_camera_has_no_forward() {
        let cam = CameraPose::new(DVec3::ONE, DVec3::ONE);
        assert!(cam.forward().is_none());
        assert!(cam.view_ray().is_none());
    }

    #[test]
    fn test_ray_ground_hit() {
        let ray = Ray {
            origin: DVec3::new(0.0, 10.0, 0.0),
            direction: DVec3::new(0.0, -1.0, 0.0),
        };
        assert_relative_eq!(ray_ground(&ray, 0.0).unwrap(), 10.0);
        assert_relative_eq!(ray_ground(&ray, 2.0).unwrap(), 8.0);
    }

    #[test]
    fn test_ray_ground_miss() {
        let up = Ray {
            origin: DVec3::new(0.0, 10.0, 0.0),
            direction: DVec3::Y,
        };
        assert!(ray_ground(&up, 0.0).is_none());

        let flat = Ray {
            origin: DVec3::new(0.0, 10.0, 0.0),
            direction: DVec3::X,
        };
        assert!(ray_ground(&flat, 0.0).is_none());
    }

    #[test]
    fn test_array_conversion() {
        let v = DVec3::new(1.0, 2.0, 3.0);
        assert_eq!(to_array(v), [1.0, 2.0, 3.0]);
        assert_eq!(from_array([1.0, 2.0, 3.0]), v);
    }
}
