use nalgebra::{Vector3, Vector4};

const GAMMA: f32 = 2.2;

/// ACES filmic tone mapping curve (Narkowicz fit).
/// Maps HDR values into [0, 1] with a soft shoulder.
pub fn aces_tone_mapping(color: Vector3<f32>) -> Vector3<f32> {
    let a = 2.51;
    let b = 0.03;
    let c = 2.43;
    let d = 0.59;
    let e = 0.14;

    color.map(|x| ((x * (a * x + b)) / (x * (c * x + d) + e)).clamp(0.0, 1.0))
}

/// Gamma-encodes a linear color for display.
pub fn linear_to_srgb(color: Vector3<f32>) -> Vector3<f32> {
    color.map(|x| x.max(0.0).powf(1.0 / GAMMA))
}

/// Decodes a display-encoded color to linear space.
pub fn srgb_to_linear(color: Vector3<f32>) -> Vector3<f32> {
    color.map(|x| x.max(0.0).powf(GAMMA))
}

/// Quantizes an RGBA color to 8 bits per channel.
#[inline]
pub fn to_rgba8(color: Vector4<f32>) -> [u8; 4] {
    let q = |x: f32| (x.clamp(0.0, 1.0) * 255.0 + 0.5) as u8;
    [q(color.x), q(color.y), q(color.z), q(color.w)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn srgb_round_trip_is_stable() {
        let c = Vector3::new(0.2, 0.5, 0.9);
        let back = srgb_to_linear(linear_to_srgb(c));
        assert_relative_eq!(back, c, epsilon = 1e-5);
    }

    #[test]
    fn aces_stays_in_unit_range() {
        let mapped = aces_tone_mapping(Vector3::new(0.0, 1.0, 50.0));
        assert_relative_eq!(mapped.x, 0.0);
        assert!(mapped.y > 0.5 && mapped.y < 1.0);
        assert_relative_eq!(mapped.z, 1.0);
    }

    #[test]
    fn quantization_clamps_and_rounds() {
        assert_eq!(to_rgba8(Vector4::new(-1.0, 0.5, 2.0, 1.0)), [0, 128, 255, 255]);
    }
}
