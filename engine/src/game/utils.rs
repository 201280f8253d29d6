use glam::Quat;

pub trait QuatExt {
    /// `other` or `-other`, whichever lies in the same hemisphere as `self`.
    fn same_hemisphere(self, other: Quat) -> Quat;
    fn slerp_shortest(self, other: Quat, t: f32) -> Quat;
}

impl QuatExt for Quat {
    #[inline]
    fn same_hemisphere(self, other: Quat) -> Quat {
        if self.dot(other) < 0.0 {
            -other
        } else {
            other
        }
    }

    #[inline]
    fn slerp_shortest(self, other: Quat, t: f32) -> Quat {
        self.slerp(self.same_hemisphere(other), t).normalize()
    }
}
