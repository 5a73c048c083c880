use log::trace;
use moho::IntExt;
use moho_matrix::MatTrait;
use moho_matrix::dense::*;

use crate::AbGroup;

pub struct HomologyCalc;

impl HomologyCalc {
    //            d1             d2
    //    C1 ----------> C2 -----------> C3
    //     |              |               |
    //     |           p1 |               |
    //     V      d1'     V               |
    //    C11 ---------> C21              |
    //     ⊕              ⊕      d2'      |
    //    C11'           C21'----------> C3
    //                    |               |
    //                q2⁻¹|               |
    //                    V      d2''     V
    //                   C22 ----------> C31
    //                    ⊕               ⊕
    //                   C22'            C31'
    //
    //  H2 = Ker(d2) / Im(d1)
    //     ≅ C22' (free) ⊕ (C21 / Im(d1')) (tor)

    /// Computes `Ker(d2) / Im(d1)` for `C1 --d1--> C2 --d2--> C3`.
    pub fn calculate(d1: &Mat, d2: &Mat) -> AbGroup {
        assert_eq!(d1.nrows(), d2.ncols());

        let n = d1.nrows();
        if n == 0 {
            return AbGroup::zero()
        } else if d1.is_zero() && d2.is_zero() {
            return AbGroup::free(n)
        }

        trace!("calculate homology: {} -> {} -> {}", d1.ncols(), n, d2.nrows());

        let s1 = diag(d1, [false, true, false, false]);
        let r1 = s1.rank();

        let d2 = match s1.pinv() {
            Some(p1_inv) if r1 > 0 => d2 * &p1_inv.submat_cols(r1..n), // d2': C21' -> C3
            _ => d2.clone()
        };

        let s2 = diag_in_place(d2, [false; 4]);
        let r2 = s2.rank();

        assert!(n >= r1 + r2);

        let rank = n - r1 - r2;
        let tors = s1.factors().into_iter().filter(|a| !a.is_unit()).cloned();

        AbGroup::new(tors) + AbGroup::free(rank)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // cellular chain complex of RP²: C2 --[2]--> C1 --[0]--> C0
    #[test]
    fn rp2() {
        let d2 = Mat::from_data((1, 1), [2]);
        let d1 = Mat::from_data((1, 1), [0]);
        let d0 = Mat::zero((0, 1));

        assert_eq!(HomologyCalc::calculate(&d2, &d1), AbGroup::zmod(2));
        assert_eq!(HomologyCalc::calculate(&d1, &d0), AbGroup::z());
        assert_eq!(HomologyCalc::calculate(&Mat::zero((1, 0)), &d2), AbGroup::zero());
    }

    // simplicial boundary of a triangle: H₁ = ℤ, H₀ = ℤ
    #[test]
    fn circle() {
        let d1 = Mat::from_data((3, 3), [-1,0,1,1,-1,0,0,1,-1]);
        let d0 = Mat::zero((0, 3));
        let d2 = Mat::zero((3, 0));

        assert_eq!(HomologyCalc::calculate(&d2, &d1), AbGroup::z());
        assert_eq!(HomologyCalc::calculate(&d1, &d0), AbGroup::z());
    }

    #[test]
    fn mixed() {
        // ℤ³ with d1 = diag(1, 4, 0)ᵀ-image and d2 killing the last coordinate.
        let d1 = Mat::from_data((3, 2), [1,0,0,4,0,0]);
        let d2 = Mat::from_data((1, 3), [0,0,1]);
        assert_eq!(HomologyCalc::calculate(&d1, &d2), AbGroup::zmod(4));

        let d2 = Mat::zero((1, 3));
        assert_eq!(HomologyCalc::calculate(&d1, &d2), AbGroup::new([4, 0]));
    }

    #[test]
    fn empty() {
        let d1 = Mat::zero((0, 2));
        let d2 = Mat::zero((3, 0));
        assert!(HomologyCalc::calculate(&d1, &d2).is_trivial());
    }
}
