/// Column-major 4x4 matrix, laid out the way GLSL reads a `mat4`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix4 {
    pub columns: [[f32; 4]; 4],
}

const IDENTITY: [[f32; 4]; 4] = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

impl Matrix4 {
    pub fn identity() -> Self {
        Matrix4 { columns: IDENTITY }
    }

    pub fn translation(x: f32, y: f32, z: f32) -> Self {
        let mut m = Self::identity();
        m.columns[3] = [x, y, z, 1.0];
        m
    }

    /// Raw words for `push_graphics_constants`.
    pub fn to_words(&self) -> [u32; 16] {
        let mut words = [0; 16];
        for (i, value) in self.columns.iter().flatten().enumerate() {
            words[i] = value.to_bits();
        }
        words
    }
}

pub fn color_words(color: [f32; 3]) -> [u32; 3] {
    [color[0].to_bits(), color[1].to_bits(), color[2].to_bits()]
}
