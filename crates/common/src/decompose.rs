//! Shear decomposition of a 4x4 affine matrix.
//!
//! Factors a matrix into perspective, translation, scale, skew and rotation
//! following the classic "unmatrix" procedure: strip the perspective row,
//! read the translation column, then Gram-Schmidt the upper 3x3 while
//! collecting scale and skew, and finally derive a quaternion from the
//! orthonormal basis.

use glam::{Mat4, Quat, Vec3, Vec4};

/// Threshold under which `m[3][3]` or the upper determinant counts as zero.
const EPSILON: f32 = f32::EPSILON;

/// Components recovered from a composed matrix.
///
/// `Default` is all zeros (including the quaternion), which is what callers
/// observe before any decomposition has run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decomposition {
    pub scale: Vec3,
    pub rotation: Quat,
    pub translation: Vec3,
    pub skew: Vec3,
    pub perspective: Vec4,
}

impl Default for Decomposition {
    fn default() -> Self {
        Self {
            scale: Vec3::ZERO,
            rotation: Quat::from_xyzw(0.0, 0.0, 0.0, 0.0),
            translation: Vec3::ZERO,
            skew: Vec3::ZERO,
            perspective: Vec4::ZERO,
        }
    }
}

/// Decompose `matrix` into its components.
///
/// Returns `None` when the matrix cannot be normalized (`m[3][3]` is zero) or
/// its upper 3x3 is singular. Other degeneracies, such as a zero-length basis
/// column discovered mid-way, are not guarded and surface as NaN components.
pub fn decompose_matrix(matrix: &Mat4) -> Option<Decomposition> {
    // Column-major: m[column][row].
    let mut m = matrix.to_cols_array_2d();

    let w = m[3][3];
    if w.abs() <= EPSILON {
        return None;
    }
    for column in m.iter_mut() {
        for value in column.iter_mut() {
            *value /= w;
        }
    }

    let mut perspective_cols = m;
    for column in perspective_cols.iter_mut().take(3) {
        column[3] = 0.0;
    }
    perspective_cols[3][3] = 1.0;
    let perspective_matrix = Mat4::from_cols_array_2d(&perspective_cols);
    if perspective_matrix.determinant().abs() <= EPSILON {
        return None;
    }

    let perspective = if m[0][3] != 0.0 || m[1][3] != 0.0 || m[2][3] != 0.0 {
        let rhs = Vec4::new(m[0][3], m[1][3], m[2][3], m[3][3]);
        let solved = perspective_matrix.inverse().transpose() * rhs;
        m[0][3] = 0.0;
        m[1][3] = 0.0;
        m[2][3] = 0.0;
        m[3][3] = 1.0;
        solved
    } else {
        Vec4::new(0.0, 0.0, 0.0, 1.0)
    };

    let translation = Vec3::new(m[3][0], m[3][1], m[3][2]);

    let mut basis = [
        Vec3::new(m[0][0], m[0][1], m[0][2]),
        Vec3::new(m[1][0], m[1][1], m[1][2]),
        Vec3::new(m[2][0], m[2][1], m[2][2]),
    ];
    let mut scale = Vec3::ZERO;
    let mut skew = Vec3::ZERO;

    scale.x = basis[0].length();
    basis[0] /= scale.x;

    // xy shear
    skew.z = basis[0].dot(basis[1]);
    basis[1] -= basis[0] * skew.z;

    scale.y = basis[1].length();
    basis[1] /= scale.y;
    skew.z /= scale.y;

    // xz and yz shear
    skew.y = basis[0].dot(basis[2]);
    basis[2] -= basis[0] * skew.y;
    skew.x = basis[1].dot(basis[2]);
    basis[2] -= basis[1] * skew.x;

    scale.z = basis[2].length();
    basis[2] /= scale.z;
    skew.y /= scale.z;
    skew.x /= scale.z;

    // A negative triple product means the basis is mirrored.
    if basis[0].dot(basis[1].cross(basis[2])) < 0.0 {
        scale = -scale;
        for axis in basis.iter_mut() {
            *axis = -*axis;
        }
    }

    Some(Decomposition {
        scale,
        rotation: quat_from_basis(&basis),
        translation,
        skew,
        perspective,
    })
}

/// Quaternion for an orthonormal basis given as columns.
fn quat_from_basis(basis: &[Vec3; 3]) -> Quat {
    let r = [basis[0].to_array(), basis[1].to_array(), basis[2].to_array()];
    let trace = r[0][0] + r[1][1] + r[2][2];
    // x, y, z, w
    let mut q = [0.0_f32; 4];

    if trace > 0.0 {
        let root = (trace + 1.0).sqrt();
        q[3] = 0.5 * root;
        let root = 0.5 / root;
        q[0] = root * (r[1][2] - r[2][1]);
        q[1] = root * (r[2][0] - r[0][2]);
        q[2] = root * (r[0][1] - r[1][0]);
    } else {
        const NEXT: [usize; 3] = [1, 2, 0];
        let mut i = 0;
        if r[1][1] > r[0][0] {
            i = 1;
        }
        if r[2][2] > r[i][i] {
            i = 2;
        }
        let j = NEXT[i];
        let k = NEXT[j];

        let root = (r[i][i] - r[j][j] - r[k][k] + 1.0).sqrt();
        q[i] = 0.5 * root;
        let root = 0.5 / root;
        q[j] = root * (r[i][j] + r[j][i]);
        q[k] = root * (r[i][k] + r[k][i]);
        q[3] = root * (r[j][k] - r[k][j]);
    }

    Quat::from_array(q)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn same_rotation(a: Quat, b: Quat) -> bool {
        // q and -q encode the same rotation
        a.dot(b).abs() > 1.0 - 1e-5
    }

    #[test]
    fn identity_decomposes_to_unit_components() {
        let d = decompose_matrix(&Mat4::IDENTITY).unwrap();
        assert!(d.scale.abs_diff_eq(Vec3::ONE, 1e-6));
        assert!(same_rotation(d.rotation, Quat::IDENTITY));
        assert_eq!(d.translation, Vec3::ZERO);
        assert_eq!(d.skew, Vec3::ZERO);
        assert_eq!(d.perspective, Vec4::new(0.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn recovers_scale_rotation_translation() {
        let rotation = Quat::from_axis_angle(Vec3::new(1.0, 2.0, 3.0).normalize(), 1.1);
        let matrix = Mat4::from_scale_rotation_translation(
            Vec3::new(2.0, 0.5, 3.0),
            rotation,
            Vec3::new(-4.0, 7.5, 1.0),
        );
        let d = decompose_matrix(&matrix).unwrap();
        assert!(d.scale.abs_diff_eq(Vec3::new(2.0, 0.5, 3.0), 1e-4));
        assert!(same_rotation(d.rotation, rotation));
        assert!(d.translation.abs_diff_eq(Vec3::new(-4.0, 7.5, 1.0), 1e-5));
        assert!(d.skew.abs_diff_eq(Vec3::ZERO, 1e-5));
    }

    #[test]
    fn large_rotation_uses_diagonal_branch() {
        // 180 degrees about Y has a negative trace.
        let rotation = Quat::from_rotation_y(std::f32::consts::PI);
        let d = decompose_matrix(&Mat4::from_quat(rotation)).unwrap();
        assert!(same_rotation(d.rotation, rotation));
    }

    #[test]
    fn mirrored_basis_flips_scale_sign() {
        let matrix = Mat4::from_scale(Vec3::new(-1.0, 1.0, 1.0));
        let d = decompose_matrix(&matrix).unwrap();
        assert!(d.scale.abs_diff_eq(Vec3::splat(-1.0), 1e-6));
        // Rebuilding from the factors restores the original matrix.
        let rebuilt = Mat4::from_scale_rotation_translation(d.scale, d.rotation, d.translation);
        assert!(rebuilt.abs_diff_eq(matrix, 1e-5));
    }

    #[test]
    fn shear_is_reported_as_skew() {
        let mut matrix = Mat4::IDENTITY;
        // Shear y along x: column 1 picks up an x component.
        matrix.y_axis.x = 0.5;
        let d = decompose_matrix(&matrix).unwrap();
        assert!((d.skew.z - 0.5).abs() < 1e-5);
        assert!(d.skew.x.abs() < 1e-6);
        assert!(d.skew.y.abs() < 1e-6);
    }

    #[test]
    fn perspective_row_is_extracted() {
        let mut matrix = Mat4::IDENTITY;
        matrix.x_axis.w = 0.25;
        let d = decompose_matrix(&matrix).unwrap();
        assert!(d.perspective.abs_diff_eq(Vec4::new(0.25, 0.0, 0.0, 1.0), 1e-6));
    }

    #[test]
    fn homogeneous_weight_is_normalized() {
        let matrix = Mat4::from_translation(Vec3::new(2.0, 4.0, 6.0)) * 2.0;
        let d = decompose_matrix(&matrix).unwrap();
        assert!(d.translation.abs_diff_eq(Vec3::new(2.0, 4.0, 6.0), 1e-5));
        assert!(d.scale.abs_diff_eq(Vec3::ONE, 1e-5));
    }

    #[test]
    fn singular_matrices_are_rejected() {
        assert!(decompose_matrix(&Mat4::ZERO).is_none());
        assert!(decompose_matrix(&Mat4::from_scale(Vec3::new(1.0, 0.0, 1.0))).is_none());

        let mut no_weight = Mat4::IDENTITY;
        no_weight.w_axis.w = 0.0;
        assert!(decompose_matrix(&no_weight).is_none());
    }

    #[test]
    fn default_is_all_zero() {
        let d = Decomposition::default();
        assert_eq!(d.scale, Vec3::ZERO);
        assert_eq!(d.rotation.length_squared(), 0.0);
        assert_eq!(d.perspective, Vec4::ZERO);
    }
}
