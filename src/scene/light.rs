use crate::scene::camera::Camera;
use crate::state::{Lamp, ProgramState};
use nalgebra::{Point3, Vector3};

/// Ambient, diffuse and specular intensities of one light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhongTerms {
    pub ambient: Vector3<f32>,
    pub diffuse: Vector3<f32>,
    pub specular: Vector3<f32>,
}

impl PhongTerms {
    pub const OFF: PhongTerms = PhongTerms::gray(0.0, 0.0, 0.0);

    pub const fn gray(ambient: f32, diffuse: f32, specular: f32) -> Self {
        Self {
            ambient: Vector3::new(ambient, ambient, ambient),
            diffuse: Vector3::new(diffuse, diffuse, diffuse),
            specular: Vector3::new(specular, specular, specular),
        }
    }
}

/// Distance falloff `1 / (c + l*d + q*d^2)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attenuation {
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl Attenuation {
    pub const fn new(constant: f32, linear: f32, quadratic: f32) -> Self {
        Self {
            constant,
            linear,
            quadratic,
        }
    }

    #[inline]
    pub fn factor(&self, distance: f32) -> f32 {
        1.0 / (self.constant + self.linear * distance + self.quadratic * distance * distance)
    }
}

/// A light source as uploaded to the lit shaders.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Light {
    /// Parallel rays travelling along `direction`.
    Directional {
        direction: Vector3<f32>,
        terms: PhongTerms,
    },
    Point {
        position: Point3<f32>,
        terms: PhongTerms,
        attenuation: Attenuation,
    },
    /// Cone light. Cutoffs are cosines of the inner and outer half-angles.
    Spot {
        position: Point3<f32>,
        direction: Vector3<f32>,
        terms: PhongTerms,
        attenuation: Attenuation,
        cut_off: f32,
        outer_cut_off: f32,
    },
}

/// Surface inputs of one fragment for Blinn-Phong shading.
#[derive(Debug, Clone, Copy)]
pub struct SurfacePoint {
    pub position: Point3<f32>,
    /// Unit normal.
    pub normal: Vector3<f32>,
    /// Unit vector from the surface to the eye.
    pub view_dir: Vector3<f32>,
    pub diffuse: Vector3<f32>,
    pub specular: Vector3<f32>,
    pub shininess: f32,
}

impl Light {
    pub fn terms(&self) -> &PhongTerms {
        match self {
            Light::Directional { terms, .. }
            | Light::Point { terms, .. }
            | Light::Spot { terms, .. } => terms,
        }
    }

    /// Unit vector from `surface_point` towards the light.
    pub fn direction_to_light(&self, surface_point: &Point3<f32>) -> Vector3<f32> {
        match self {
            Light::Directional { direction, .. } => -direction.normalize(),
            Light::Point { position, .. } | Light::Spot { position, .. } => {
                (position - surface_point).normalize()
            }
        }
    }

    /// Blinn-Phong contribution of this light at `p`.
    pub fn contribution(&self, p: &SurfacePoint) -> Vector3<f32> {
        let terms = self.terms();
        let light_dir = self.direction_to_light(&p.position);

        let diff = p.normal.dot(&light_dir).max(0.0);
        let halfway = (light_dir + p.view_dir).try_normalize(1e-6).unwrap_or(p.normal);
        let spec = p.normal.dot(&halfway).max(0.0).powf(p.shininess);

        let ambient = terms.ambient.component_mul(&p.diffuse);
        let diffuse = terms.diffuse.component_mul(&p.diffuse) * diff;
        let specular = terms.specular.component_mul(&p.specular) * spec;

        let scale = match self {
            Light::Directional { .. } => 1.0,
            Light::Point {
                position,
                attenuation,
                ..
            } => attenuation.factor((position - p.position).norm()),
            Light::Spot {
                position,
                direction,
                attenuation,
                cut_off,
                outer_cut_off,
                ..
            } => {
                let theta = light_dir.dot(&(-direction.normalize()));
                let epsilon = cut_off - outer_cut_off;
                let intensity = ((theta - outer_cut_off) / epsilon).clamp(0.0, 1.0);
                attenuation.factor((position - p.position).norm()) * intensity
            }
        };

        (ambient + diffuse + specular) * scale
    }
}

/// The complete per-frame light set: one directional, six point and three spot lights.
/// Every slot is populated; switched-off lights carry zeroed intensities.
#[derive(Debug, Clone, PartialEq)]
pub struct LightUniforms {
    pub directional: Light,
    pub points: [Light; 6],
    pub spots: [Light; 3],
}

impl LightUniforms {
    pub fn iter(&self) -> impl Iterator<Item = &Light> {
        std::iter::once(&self.directional)
            .chain(self.points.iter())
            .chain(self.spots.iter())
    }

    /// Sum of every light's contribution.
    pub fn shade(&self, p: &SurfacePoint) -> Vector3<f32> {
        self.iter().map(|light| light.contribution(p)).sum()
    }
}

pub const SUN_DIRECTION: Vector3<f32> = Vector3::new(-0.2, -1.0, -0.3);
const SUN_ON: PhongTerms = PhongTerms::gray(0.12, 0.4, 0.3);
/// Night ambient floor kept while the sun is off.
const SUN_OFF: PhongTerms = PhongTerms::gray(0.05, 0.0, 0.0);

/// Which lit shader a light set is built for. The two differ only in the
/// specular strength of the sconces and the side lamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightSet {
    /// Props and lamp models.
    Model,
    /// Normal-mapped walls, floor and ceiling.
    Surface,
}

struct PointSpec {
    lamp: Lamp,
    position: Point3<f32>,
    terms: PhongTerms,
    surface_terms: PhongTerms,
    attenuation: Attenuation,
}

impl PointSpec {
    fn terms_for(&self, set: LightSet) -> PhongTerms {
        match set {
            LightSet::Model => self.terms,
            LightSet::Surface => self.surface_terms,
        }
    }
}

const CEILING_TERMS: PhongTerms = PhongTerms::gray(0.05, 0.4, 0.5);
const CEILING_FALLOFF: Attenuation = Attenuation::new(1.0, 0.01, 0.001);
const LAMP_TERMS: PhongTerms = PhongTerms::gray(0.05, 0.4, 0.6);
const LAMP_SURFACE_TERMS: PhongTerms = PhongTerms::gray(0.05, 0.4, 0.5);
const LAMP_FALLOFF: Attenuation = Attenuation::new(1.0, 0.03, 0.016);

const POINT_LIGHTS: [PointSpec; 6] = [
    PointSpec {
        lamp: Lamp::Ceiling,
        position: Point3::new(-0.25, 10.3, 0.0),
        terms: CEILING_TERMS,
        surface_terms: CEILING_TERMS,
        attenuation: CEILING_FALLOFF,
    },
    PointSpec {
        lamp: Lamp::Ceiling,
        position: Point3::new(-2.075, 10.3, 0.0),
        terms: CEILING_TERMS,
        surface_terms: CEILING_TERMS,
        attenuation: CEILING_FALLOFF,
    },
    PointSpec {
        lamp: Lamp::Ceiling,
        position: Point3::new(1.535, 10.3, 0.0),
        terms: CEILING_TERMS,
        surface_terms: CEILING_TERMS,
        attenuation: CEILING_FALLOFF,
    },
    PointSpec {
        lamp: Lamp::SconceRight,
        position: Point3::new(2.55, 5.75, -5.6),
        terms: LAMP_TERMS,
        surface_terms: LAMP_SURFACE_TERMS,
        attenuation: LAMP_FALLOFF,
    },
    PointSpec {
        lamp: Lamp::SconceLeft,
        position: Point3::new(-3.05, 5.75, -5.6),
        terms: LAMP_TERMS,
        surface_terms: LAMP_SURFACE_TERMS,
        attenuation: LAMP_FALLOFF,
    },
    PointSpec {
        lamp: Lamp::Side,
        position: Point3::new(-5.425, 2.76, -0.46),
        terms: LAMP_TERMS,
        surface_terms: LAMP_SURFACE_TERMS,
        attenuation: LAMP_FALLOFF,
    },
];

enum SpotSource {
    /// Follows the camera; toggled by the flashlight switch.
    Flashlight,
    Fixed {
        lamp: Lamp,
        position: Point3<f32>,
        direction: Vector3<f32>,
    },
}

struct SpotSpec {
    source: SpotSource,
    cut_off_deg: f32,
    outer_cut_off_deg: f32,
}

const SPOT_TERMS: PhongTerms = PhongTerms::gray(0.0, 1.0, 1.0);
const SPOT_FALLOFF: Attenuation = Attenuation::new(1.0, 0.09, 0.032);

const SPOT_LIGHTS: [SpotSpec; 3] = [
    SpotSpec {
        source: SpotSource::Flashlight,
        cut_off_deg: 12.5,
        outer_cut_off_deg: 15.0,
    },
    SpotSpec {
        source: SpotSource::Fixed {
            lamp: Lamp::Desk,
            position: Point3::new(-0.575, 5.25, -4.45),
            direction: Vector3::new(0.3, -0.9, 0.09),
        },
        cut_off_deg: 22.5,
        outer_cut_off_deg: 30.0,
    },
    SpotSpec {
        source: SpotSource::Fixed {
            lamp: Lamp::Floor,
            position: Point3::new(3.56, 4.25, 0.85),
            direction: Vector3::new(-0.3, -0.9, 0.0),
        },
        cut_off_deg: 40.5,
        outer_cut_off_deg: 60.0,
    },
];

/// Builds this frame's light set for one shader from the toggles and the camera.
pub fn frame_uniforms(state: &ProgramState, set: LightSet) -> LightUniforms {
    let directional = Light::Directional {
        direction: SUN_DIRECTION,
        terms: if state.dir_light { SUN_ON } else { SUN_OFF },
    };

    let points = POINT_LIGHTS.each_ref().map(|spec| Light::Point {
        position: spec.position,
        terms: if state.lamp(spec.lamp) {
            spec.terms_for(set)
        } else {
            PhongTerms::OFF
        },
        attenuation: spec.attenuation,
    });

    let spots = SPOT_LIGHTS
        .each_ref()
        .map(|spec| spot_light(spec, state, &state.camera));

    LightUniforms {
        directional,
        points,
        spots,
    }
}

fn spot_light(spec: &SpotSpec, state: &ProgramState, camera: &Camera) -> Light {
    let (position, direction, on) = match spec.source {
        SpotSource::Flashlight => (camera.position, camera.front, state.spot_light),
        SpotSource::Fixed {
            lamp,
            position,
            direction,
        } => (position, direction, state.lamp(lamp)),
    };

    Light::Spot {
        position,
        direction,
        terms: if on { SPOT_TERMS } else { PhongTerms::OFF },
        attenuation: SPOT_FALLOFF,
        cut_off: spec.cut_off_deg.to_radians().cos(),
        outer_cut_off: spec.outer_cut_off_deg.to_radians().cos(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn surface(position: Point3<f32>) -> SurfacePoint {
        SurfacePoint {
            position,
            normal: Vector3::y(),
            view_dir: Vector3::y(),
            diffuse: Vector3::new(1.0, 1.0, 1.0),
            specular: Vector3::new(1.0, 1.0, 1.0),
            shininess: 128.0,
        }
    }

    #[test]
    fn all_slots_populated_when_everything_is_off() {
        let state = ProgramState::default();
        let u = frame_uniforms(&state, LightSet::Model);
        assert_eq!(u.iter().count(), 10);
        assert_eq!(*u.directional.terms(), SUN_OFF);
        for light in u.points.iter().chain(u.spots.iter()) {
            assert_eq!(*light.terms(), PhongTerms::OFF);
        }
        // Geometry is still pushed for disabled lights.
        let Light::Spot {
            position, cut_off, ..
        } = u.spots[1]
        else {
            panic!("spot slot holds a non-spot light");
        };
        assert_eq!(position, Point3::new(-0.575, 5.25, -4.45));
        assert_relative_eq!(cut_off, 22.5f32.to_radians().cos());
    }

    #[test]
    fn disabling_one_lamp_zeroes_only_its_lights() {
        let mut state = ProgramState::default();
        state.lamps = [true; 6];
        state.dir_light = true;
        state.spot_light = true;
        let all_on = frame_uniforms(&state, LightSet::Model);

        state.set_lamp(Lamp::Ceiling, false);
        let u = frame_uniforms(&state, LightSet::Model);
        for i in 0..3 {
            assert_eq!(*u.points[i].terms(), PhongTerms::OFF);
        }
        assert_eq!(u.points[3..], all_on.points[3..]);
        assert_eq!(u.spots, all_on.spots);
        assert_eq!(u.directional, all_on.directional);
    }

    #[test]
    fn flashlight_follows_camera() {
        let mut state = ProgramState::default();
        state.spot_light = true;
        state.camera.look_along(Vector3::new(1.0, 0.0, 0.0));
        let Light::Spot {
            position,
            direction,
            terms,
            ..
        } = frame_uniforms(&state, LightSet::Model).spots[0]
        else {
            panic!("spot slot holds a non-spot light");
        };
        assert_eq!(position, state.camera.position);
        assert_relative_eq!(direction, Vector3::new(1.0, 0.0, 0.0), epsilon = 1e-6);
        assert_eq!(terms, SPOT_TERMS);
    }

    #[test]
    fn point_light_falls_off_with_distance() {
        let light = Light::Point {
            position: Point3::new(0.0, 2.0, 0.0),
            terms: PhongTerms::gray(0.0, 1.0, 0.0),
            attenuation: Attenuation::new(1.0, 0.0, 1.0),
        };
        let c = light.contribution(&surface(Point3::origin()));
        assert_relative_eq!(c.x, 1.0 / 5.0, epsilon = 1e-6);
    }

    #[test]
    fn spot_light_is_dark_outside_outer_cone() {
        let light = Light::Spot {
            position: Point3::new(0.0, 1.0, 0.0),
            direction: Vector3::new(0.0, -1.0, 0.0),
            terms: SPOT_TERMS,
            attenuation: Attenuation::new(1.0, 0.0, 0.0),
            cut_off: 12.5f32.to_radians().cos(),
            outer_cut_off: 15f32.to_radians().cos(),
        };
        let inside = light.contribution(&surface(Point3::origin()));
        let outside = light.contribution(&surface(Point3::new(5.0, 0.0, 0.0)));
        assert!(inside.x > 0.9);
        assert_relative_eq!(outside.x, 0.0);
    }

    #[test]
    fn sun_off_keeps_ambient_floor() {
        let u = frame_uniforms(&ProgramState::default(), LightSet::Model);
        let c = u.directional.contribution(&surface(Point3::origin()));
        assert_relative_eq!(c, Vector3::new(0.05, 0.05, 0.05), epsilon = 1e-6);
    }

    #[test]
    fn surfaces_get_softer_lamp_highlights() {
        let mut state = ProgramState::default();
        state.lamps = [true; 6];
        let model = frame_uniforms(&state, LightSet::Model);
        let surface = frame_uniforms(&state, LightSet::Surface);

        for i in 0..3 {
            assert_eq!(model.points[i], surface.points[i]);
        }
        for i in 3..6 {
            assert_relative_eq!(model.points[i].terms().specular, Vector3::repeat(0.6));
            assert_relative_eq!(surface.points[i].terms().specular, Vector3::repeat(0.5));
            assert_eq!(model.points[i].terms().diffuse, surface.points[i].terms().diffuse);
        }
        assert_eq!(model.spots, surface.spots);
        assert_eq!(model.directional, surface.directional);
    }
}
