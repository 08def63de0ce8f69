use gfx_hal::window::Extent2D;

use crate::transform::Matrix4;

pub const CLEAR_COLOR: [f32; 4] = [0.2, 0.2, 0.3, 1.0];
pub const STATIC_COLOR: [f32; 3] = [0.6, 0.6, 1.0];

/// Fixed shapes in normalized device space, drawn in this order every frame.
pub const STATIC_SHAPES: [[[f32; 2]; 3]; 5] = [
    [[-0.8, -0.6], [-0.6, -0.6], [-0.7, -0.4]],
    [[-0.4, -0.6], [-0.2, -0.6], [-0.3, -0.4]],
    [[0.0, -0.6], [0.2, -0.6], [0.1, -0.4]],
    [[0.4, -0.6], [0.6, -0.6], [0.5, -0.4]],
    [[-0.2, 0.0], [0.0, 0.0], [-0.1, 0.2]],
];

/// Shared by every spawned triangle, placed with a translation.
pub const TEMPLATE_SHAPE: [[f32; 2]; 3] = [[-0.1, -0.1], [0.1, -0.1], [0.0, 0.1]];

/// A spawned triangle. `position` is in window pixels with y growing upward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub position: [f32; 2],
    pub color: [f32; 3],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mesh {
    Static(usize),
    Template,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCall {
    pub mesh: Mesh,
    pub model: Matrix4,
    pub color: [f32; 3],
}

pub struct Scene {
    dims: Extent2D,
    triangles: Vec<Triangle>,
}

impl Scene {
    pub fn new(dims: Extent2D) -> Self {
        Scene {
            dims,
            triangles: Vec::new(),
        }
    }

    pub fn dims(&self) -> Extent2D {
        self.dims
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn spawn(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    /// Maps a pixel-space position into a translation in normalized device space.
    pub fn model_for(&self, triangle: &Triangle) -> Matrix4 {
        let width = self.dims.width as f32;
        let height = self.dims.height as f32;
        Matrix4::translation(
            2.0 * triangle.position[0] / width - 1.0,
            2.0 * triangle.position[1] / height - 1.0,
            0.0,
        )
    }

    /// Draw calls for one frame: every static shape first, then spawned
    /// triangles in insertion order.
    pub fn draw_calls(&self) -> Vec<DrawCall> {
        let statics = (0..STATIC_SHAPES.len()).map(|i| DrawCall {
            mesh: Mesh::Static(i),
            model: Matrix4::identity(),
            color: STATIC_COLOR,
        });
        let spawned = self.triangles.iter().map(|triangle| DrawCall {
            mesh: Mesh::Template,
            model: self.model_for(triangle),
            color: triangle.color,
        });
        statics.chain(spawned).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIMS: Extent2D = Extent2D {
        width: 1920,
        height: 1080,
    };

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn model_is_pure_translation() {
        let scene = Scene::new(DIMS);
        let triangle = Triangle {
            position: [480.0, 810.0],
            color: [0.0; 3],
        };
        let m = scene.model_for(&triangle);

        assert!(approx(m.columns[3][0], -0.5));
        assert!(approx(m.columns[3][1], 0.5));
        assert_eq!(m.columns[3][2], 0.0);
        assert_eq!(m.columns[3][3], 1.0);
        assert_eq!(&m.columns[..3], &Matrix4::identity().columns[..3]);
    }

    #[test]
    fn center_of_window_maps_to_origin() {
        let scene = Scene::new(DIMS);
        let m = scene.model_for(&Triangle {
            position: [960.0, 540.0],
            color: [1.0; 3],
        });
        assert_eq!(m, Matrix4::identity());
    }

    #[test]
    fn empty_scene_draws_only_static_shapes() {
        let calls = Scene::new(DIMS).draw_calls();
        assert_eq!(calls.len(), STATIC_SHAPES.len());
        for (i, call) in calls.iter().enumerate() {
            assert_eq!(call.mesh, Mesh::Static(i));
            assert_eq!(call.model, Matrix4::identity());
            assert_eq!(call.color, STATIC_COLOR);
        }
    }

    #[test]
    fn static_shapes_are_drawn_before_spawned_ones() {
        let mut scene = Scene::new(DIMS);
        scene.spawn(Triangle {
            position: [10.0, 20.0],
            color: [0.1, 0.2, 0.3],
        });
        scene.spawn(Triangle {
            position: [30.0, 40.0],
            color: [0.4, 0.5, 0.6],
        });

        let calls = scene.draw_calls();
        assert_eq!(calls.len(), STATIC_SHAPES.len() + 2);

        let first_template = calls
            .iter()
            .position(|call| call.mesh == Mesh::Template)
            .unwrap();
        assert_eq!(first_template, STATIC_SHAPES.len());
        assert!(calls[first_template..]
            .iter()
            .all(|call| call.mesh == Mesh::Template));

        assert_eq!(calls[first_template].color, [0.1, 0.2, 0.3]);
        assert_eq!(calls[first_template + 1].color, [0.4, 0.5, 0.6]);
        assert_eq!(
            calls[first_template + 1].model,
            scene.model_for(&scene.triangles()[1])
        );
    }
}
