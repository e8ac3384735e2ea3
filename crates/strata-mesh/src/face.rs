//! The six faces of a unit voxel.

/// Axis-aligned face of a voxel, named by its outward direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FaceDirection {
    /// +X direction.
    PosX = 0,
    /// −X direction.
    NegX = 1,
    /// +Y direction.
    PosY = 2,
    /// −Y direction.
    NegY = 3,
    /// +Z direction.
    PosZ = 4,
    /// −Z direction.
    NegZ = 5,
}

impl FaceDirection {
    /// Faces in emission order.
    pub const ALL: [Self; 6] = [
        Self::PosX,
        Self::NegX,
        Self::PosY,
        Self::NegY,
        Self::PosZ,
        Self::NegZ,
    ];

    /// Unit step towards the neighbour across this face.
    pub const fn delta(self) -> [i8; 3] {
        match self {
            Self::PosX => [1, 0, 0],
            Self::NegX => [-1, 0, 0],
            Self::PosY => [0, 1, 0],
            Self::NegY => [0, -1, 0],
            Self::PosZ => [0, 0, 1],
            Self::NegZ => [0, 0, -1],
        }
    }

    /// Outward unit normal.
    pub fn normal(self) -> [f32; 3] {
        self.delta().map(f32::from)
    }

    /// Coordinates of the neighbour across this face.
    pub fn offset(self, x: i64, y: i64, z: i64) -> (i64, i64, i64) {
        let [dx, dy, dz] = self.delta().map(i64::from);
        (x + dx, y + dy, z + dz)
    }

    /// Corners of this face of the unit cube at the origin, wound
    /// counter-clockwise when viewed from outside.
    ///
    /// For side faces corner 0 is bottom, corner 1 above it.
    pub fn unit_corners(self) -> [[f32; 3]; 4] {
        match self {
            Self::PosX => [[1., 0., 0.], [1., 1., 0.], [1., 1., 1.], [1., 0., 1.]],
            Self::NegX => [[0., 0., 1.], [0., 1., 1.], [0., 1., 0.], [0., 0., 0.]],
            Self::PosY => [[0., 1., 0.], [0., 1., 1.], [1., 1., 1.], [1., 1., 0.]],
            Self::NegY => [[0., 0., 0.], [1., 0., 0.], [1., 0., 1.], [0., 0., 1.]],
            Self::PosZ => [[1., 0., 1.], [1., 1., 1.], [0., 1., 1.], [0., 0., 1.]],
            Self::NegZ => [[0., 0., 0.], [0., 1., 0.], [1., 1., 0.], [1., 0., 0.]],
        }
    }
}
