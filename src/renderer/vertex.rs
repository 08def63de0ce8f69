#[derive(Debug, Clone, Copy)]
#[repr(C)]
#[allow(non_snake_case, dead_code)]
pub struct Vertex {
    a_Pos: [f32; 2],
}

impl Vertex {
    pub fn triangle(points: &[[f32; 2]; 3]) -> [Vertex; 3] {
        [
            Vertex { a_Pos: points[0] },
            Vertex { a_Pos: points[1] },
            Vertex { a_Pos: points[2] },
        ]
    }
}
