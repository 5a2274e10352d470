//! The room, as data: every surface, prop, lamp and glass object with its
//! placement and draw state. The compositor iterates these tables.

use crate::core::math::transform::TransformFactory;
use crate::core::rasterizer::CullMode;
use crate::state::Lamp;
use nalgebra::{Matrix4, Point3, Vector3};

/// Rotation in degrees about one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rotation {
    X(f32),
    Y(f32),
    Z(f32),
    /// About -Y, i.e. clockwise seen from above.
    NegY(f32),
}

impl Rotation {
    pub fn matrix(&self) -> Matrix4<f32> {
        let (axis, degrees) = match *self {
            Rotation::X(d) => (Vector3::x(), d),
            Rotation::Y(d) => (Vector3::y(), d),
            Rotation::Z(d) => (Vector3::z(), d),
            Rotation::NegY(d) => (-Vector3::y(), d),
        };
        TransformFactory::rotation(&axis, degrees.to_radians())
    }
}

/// Model transform `T * R1 * R2 * ... * S`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub translation: [f32; 3],
    pub rotations: &'static [Rotation],
    pub scale: [f32; 3],
}

impl Placement {
    const fn at(x: f32, y: f32, z: f32) -> Self {
        Self {
            translation: [x, y, z],
            rotations: &[],
            scale: [1.0, 1.0, 1.0],
        }
    }

    const fn rotated(mut self, rotations: &'static [Rotation]) -> Self {
        self.rotations = rotations;
        self
    }

    const fn scaled(mut self, s: f32) -> Self {
        self.scale = [s, s, s];
        self
    }

    const fn scaled_xyz(mut self, x: f32, y: f32, z: f32) -> Self {
        self.scale = [x, y, z];
        self
    }

    pub fn position(&self) -> Point3<f32> {
        Point3::from(self.translation)
    }

    pub fn matrix(&self) -> Matrix4<f32> {
        let rotation = self
            .rotations
            .iter()
            .fold(Matrix4::identity(), |acc, r| acc * r.matrix());
        TransformFactory::translation(&Vector3::from(self.translation))
            * rotation
            * TransformFactory::scaling(&Vector3::from(self.scale))
    }
}

/// Texture set of a room surface under `resources/textures`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceSet {
    Stone,
    Wood,
    White,
}

impl SurfaceSet {
    pub const ALL: [SurfaceSet; 3] = [SurfaceSet::Stone, SurfaceSet::Wood, SurfaceSet::White];

    /// Diffuse, specular and normal map file names.
    ///
    /// The floor reads its diffuse map into the specular slot; `w_s.png` is
    /// shipped but never sampled.
    pub const fn files(self) -> [&'static str; 3] {
        match self {
            SurfaceSet::Stone => ["Stone_d.png", "Stone_s.png", "Stone_n.png"],
            SurfaceSet::Wood => ["w_d.png", "w_d.png", "w_n.png"],
            SurfaceSet::White => ["White_d.png", "White_s.png", "White_n.png"],
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SurfaceSpec {
    pub name: &'static str,
    pub placement: Placement,
    /// UV repeat factor of the quad.
    pub tex: f32,
    pub textures: SurfaceSet,
    pub cull: CullMode,
}

#[derive(Debug, Clone, Copy)]
pub struct PropSpec {
    pub name: &'static str,
    /// Path relative to the resource root.
    pub model: &'static str,
    pub placement: Placement,
}

#[derive(Debug, Clone, Copy)]
pub struct LampSpec {
    pub lamp: Lamp,
    pub model: &'static str,
    pub placement: Placement,
    pub cull: CullMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlassId {
    /// Flat pane drawn with the transparent quad.
    Pane,
    /// The glass OBJ on the desk.
    Model,
}

#[derive(Debug, Clone, Copy)]
pub struct GlassSpec {
    pub id: GlassId,
    pub placement: Placement,
}

pub const SURFACES: [SurfaceSpec; 6] = [
    SurfaceSpec {
        name: "wall_back",
        placement: Placement::at(0.0, 6.0, -6.0).scaled(6.0),
        tex: 2.0,
        textures: SurfaceSet::Stone,
        cull: CullMode::Back,
    },
    SurfaceSpec {
        name: "wall_front",
        placement: Placement::at(0.0, 6.0, 6.0)
            .rotated(&[Rotation::Y(180.0)])
            .scaled(6.0),
        tex: 2.0,
        textures: SurfaceSet::Stone,
        cull: CullMode::Back,
    },
    SurfaceSpec {
        name: "wall_left",
        placement: Placement::at(-6.0, 6.0, 0.0)
            .rotated(&[Rotation::Y(90.0)])
            .scaled(6.0),
        tex: 2.0,
        textures: SurfaceSet::Stone,
        cull: CullMode::Back,
    },
    SurfaceSpec {
        name: "wall_right",
        placement: Placement::at(6.0, 6.0, 0.0)
            .rotated(&[Rotation::Y(90.0), Rotation::Y(180.0)])
            .scaled(6.0),
        tex: 2.0,
        textures: SurfaceSet::Stone,
        cull: CullMode::Back,
    },
    SurfaceSpec {
        name: "floor",
        placement: Placement::at(0.0, 0.0, 0.0)
            .rotated(&[Rotation::X(90.0), Rotation::Y(180.0)])
            .scaled(6.0),
        tex: 5.0,
        textures: SurfaceSet::Wood,
        cull: CullMode::None,
    },
    SurfaceSpec {
        name: "ceiling",
        placement: Placement::at(0.0, 12.0, 0.0)
            .rotated(&[Rotation::X(90.0)])
            .scaled(6.0),
        tex: 1.0,
        textures: SurfaceSet::White,
        cull: CullMode::None,
    },
];

pub const PROPS: [PropSpec; 10] = [
    PropSpec {
        name: "desk",
        model: "objects/desk/desk.obj",
        placement: Placement::at(0.0, 0.965, -4.6)
            .rotated(&[Rotation::Y(180.0), Rotation::Z(0.4)])
            .scaled(5.5),
    },
    PropSpec {
        name: "chair",
        model: "objects/chair/Patchwork chair.obj",
        placement: Placement::at(-2.5, -0.235, -2.0)
            .rotated(&[Rotation::X(93.0), Rotation::Z(72.8)])
            .scaled(0.7),
    },
    PropSpec {
        name: "table",
        model: "objects/table/table.obj",
        placement: Placement::at(-3.65, 0.01, -3.8)
            .rotated(&[Rotation::NegY(90.0)])
            .scaled(0.8),
    },
    PropSpec {
        name: "table1",
        model: "objects/table1/table1.obj",
        placement: Placement::at(2.0, 0.0, 4.0)
            .rotated(&[Rotation::NegY(70.0)])
            .scaled(0.4),
    },
    PropSpec {
        name: "couch",
        model: "objects/couch/couch.obj",
        placement: Placement::at(3.8, -0.2, 0.0)
            .rotated(&[Rotation::NegY(90.0)])
            .scaled(0.9),
    },
    PropSpec {
        name: "laptop",
        model: "objects/laptop/laptop.obj",
        placement: Placement::at(1.0, 2.813, -5.0).rotated(&[Rotation::Y(75.0)]),
    },
    PropSpec {
        name: "plant",
        model: "objects/plant/plant.obj",
        placement: Placement::at(-2.0, 2.791, -4.5)
            .rotated(&[Rotation::Y(15.0)])
            .scaled(0.45),
    },
    PropSpec {
        name: "plant1",
        model: "objects/plant1/plant1.obj",
        placement: Placement::at(-4.8, 2.454, 4.2).rotated(&[Rotation::NegY(40.0)]),
    },
    PropSpec {
        name: "apples",
        model: "objects/apples/apples.obj",
        placement: Placement::at(-5.2, 2.45, 1.0).scaled(0.4),
    },
    PropSpec {
        name: "bowl",
        model: "objects/bowl/bowl.obj",
        placement: Placement::at(2.5, 0.92, 4.6).scaled(0.1),
    },
];

/// Lamp models in draw order. Both sconces share `light2.obj`.
pub const LAMPS: [LampSpec; 6] = [
    LampSpec {
        lamp: Lamp::Ceiling,
        model: "objects/light/light1.obj",
        placement: Placement::at(0.0, 11.05, 0.0)
            .rotated(&[Rotation::Y(90.0)])
            .scaled(1.2),
        cull: CullMode::Back,
    },
    LampSpec {
        lamp: Lamp::SconceRight,
        model: "objects/light/light2.obj",
        placement: Placement::at(2.8, 5.0, -5.99),
        cull: CullMode::None,
    },
    LampSpec {
        lamp: Lamp::SconceLeft,
        model: "objects/light/light2.obj",
        placement: Placement::at(-2.8, 5.0, -5.99),
        cull: CullMode::None,
    },
    LampSpec {
        lamp: Lamp::Desk,
        model: "objects/light/light3.obj",
        placement: Placement::at(-1.4, 2.786, -5.2)
            .rotated(&[Rotation::Y(145.0)])
            .scaled(0.04),
        cull: CullMode::Back,
    },
    LampSpec {
        lamp: Lamp::Floor,
        model: "objects/light/light4.obj",
        placement: Placement::at(4.2, 0.0, -3.5)
            .rotated(&[Rotation::NegY(95.0)])
            .scaled(0.07),
        cull: CullMode::Back,
    },
    LampSpec {
        lamp: Lamp::Side,
        model: "objects/light/light5.obj",
        placement: Placement::at(-4.8, 2.66, -1.0)
            .rotated(&[Rotation::Y(55.0)])
            .scaled(1.4),
        cull: CullMode::Back,
    },
];

pub const GLASS_PANE: GlassSpec = GlassSpec {
    id: GlassId::Pane,
    placement: Placement::at(-4.325, 1.665, 3.235)
        .rotated(&[Rotation::Y(90.0)])
        .scaled_xyz(1.25, 1.56, 0.0),
};

pub const GLASS_MODEL: GlassSpec = GlassSpec {
    id: GlassId::Model,
    placement: Placement::at(-1.0, 2.77, -4.0),
};

pub const GLASS_MODEL_PATH: &str = "objects/glass/glass.obj";
pub const GLASS_TEXTURE: &str = "textures/glass.png";
pub const TEXTURE_DIR: &str = "textures";

/// Draw order of the two glass objects: farther from `camera` first.
/// Ties draw the glass model first.
pub fn transparent_order(camera: &Point3<f32>) -> [GlassSpec; 2] {
    order_by_distance(
        nalgebra::distance(&GLASS_PANE.placement.position(), camera),
        nalgebra::distance(&GLASS_MODEL.placement.position(), camera),
    )
}

fn order_by_distance(pane: f32, model: f32) -> [GlassSpec; 2] {
    if pane > model {
        [GLASS_PANE, GLASS_MODEL]
    } else {
        [GLASS_MODEL, GLASS_PANE]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector4;

    fn transformed_normal(placement: &Placement) -> Vector3<f32> {
        (placement.matrix() * Vector4::new(0.0, 0.0, 1.0, 0.0)).xyz().normalize()
    }

    #[test]
    fn walls_face_into_the_room() {
        for wall in &SURFACES[..4] {
            let n = transformed_normal(&wall.placement);
            let to_center = (Point3::new(0.0, 6.0, 0.0) - wall.placement.position()).normalize();
            assert_relative_eq!(n, to_center, epsilon = 1e-5);
        }
    }

    #[test]
    fn floor_faces_up_and_ceiling_down() {
        assert_relative_eq!(transformed_normal(&SURFACES[4].placement), Vector3::y(), epsilon = 1e-5);
        assert_relative_eq!(transformed_normal(&SURFACES[5].placement), -Vector3::y(), epsilon = 1e-5);
    }

    #[test]
    fn placement_applies_scale_before_translation() {
        let m = SURFACES[0].placement.matrix();
        let corner = m * Vector4::new(1.0, 1.0, 0.0, 1.0);
        assert_relative_eq!(corner, Vector4::new(6.0, 12.0, -6.0, 1.0), epsilon = 1e-5);
    }

    #[test]
    fn glass_pane_is_flattened() {
        let m = GLASS_PANE.placement.matrix();
        let p = m * Vector4::new(1.0, 0.5, 1.0, 1.0);
        // Unit pane x maps onto -Z after the quarter turn; the z extent collapses.
        assert_relative_eq!(p, Vector4::new(-4.325, 1.665 + 0.78, 3.235 - 1.25, 1.0), epsilon = 1e-5);
    }

    #[test]
    fn farther_glass_is_drawn_first() {
        let near_pane = Point3::new(-4.0, 2.0, 5.0);
        let order = transparent_order(&near_pane);
        assert_eq!([order[0].id, order[1].id], [GlassId::Model, GlassId::Pane]);

        let near_model = Point3::new(-1.0, 3.0, -3.0);
        let order = transparent_order(&near_model);
        assert_eq!([order[0].id, order[1].id], [GlassId::Pane, GlassId::Model]);
    }

    #[test]
    fn equal_distances_draw_model_first() {
        let order = order_by_distance(4.5, 4.5);
        assert_eq!([order[0].id, order[1].id], [GlassId::Model, GlassId::Pane]);
    }

    #[test]
    fn every_lamp_has_one_model() {
        for lamp in Lamp::ALL {
            assert_eq!(LAMPS.iter().filter(|spec| spec.lamp == lamp).count(), 1);
        }
    }
}
