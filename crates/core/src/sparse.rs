//! Sparse matrix helpers on top of `sprs`.

use sprs::prod::{mul_acc_mat_vec_csc, mul_acc_mat_vec_csr};
use sprs::{CsMat, CsMatView, TriMat};

/// Compresses coordinate triplets (summing duplicates) into CSR.
#[must_use]
pub fn compress(triplets: &TriMat<f64>) -> CsMat<f64> {
    triplets.to_csr()
}

/// `out ← A v`.
pub fn mul_vec(a: &CsMat<f64>, v: &[f64], out: &mut [f64]) {
    debug_assert_eq!(a.cols(), v.len());
    debug_assert_eq!(a.rows(), out.len());
    out.fill(0.0);
    accumulate(a.view(), v, out);
}

/// `out ← Aᵀ v`.
pub fn mul_vec_transpose(a: &CsMat<f64>, v: &[f64], out: &mut [f64]) {
    debug_assert_eq!(a.rows(), v.len());
    debug_assert_eq!(a.cols(), out.len());
    out.fill(0.0);
    accumulate(a.transpose_view(), v, out);
}

/// `out ← out + A v` for either storage order.
fn accumulate(a: CsMatView<'_, f64>, v: &[f64], out: &mut [f64]) {
    if a.is_csr() {
        mul_acc_mat_vec_csr(a, v, out);
    } else {
        mul_acc_mat_vec_csc(a, v, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    fn sample() -> TriMat<f64> {
        // [1 2 0]
        // [0 3 4]
        let mut t = TriMat::new((2, 3));
        t.add_triplet(0, 0, 1.0);
        t.add_triplet(0, 1, 1.5);
        t.add_triplet(0, 1, 0.5);
        t.add_triplet(1, 1, 3.0);
        t.add_triplet(1, 2, 4.0);
        t
    }

    #[test]
    fn duplicates_are_summed() {
        let a = compress(&sample());
        let mut out = vec![0.0; 2];
        mul_vec(&a, &[0.0, 1.0, 0.0], &mut out);
        assert_relative_eq!(out[0], 2.0);
        assert_relative_eq!(out[1], 3.0);
    }

    #[test]
    fn products_overwrite_the_output() {
        let a = compress(&sample());
        let mut out = vec![10.0, -10.0];
        mul_vec(&a, &[1.0, 0.0, 1.0], &mut out);
        assert_relative_eq!(out[0], 1.0);
        assert_relative_eq!(out[1], 4.0);

        let mut out = vec![5.0; 3];
        mul_vec_transpose(&a, &[1.0, 1.0], &mut out);
        assert_relative_eq!(out[0], 1.0);
        assert_relative_eq!(out[1], 5.0);
        assert_relative_eq!(out[2], 4.0);
    }

    #[test]
    fn products_agree_for_csr_and_csc() {
        let t = sample();
        let csr = compress(&t);
        let csc: CsMat<f64> = t.to_csc();
        let v = [1.0, -1.0, 2.0];
        let w = [0.5, 2.0];

        let (mut a, mut b) = (vec![0.0; 2], vec![0.0; 2]);
        mul_vec(&csr, &v, &mut a);
        mul_vec(&csc, &v, &mut b);
        assert_eq!(a, b);
        assert_relative_eq!(a[0], -1.0);
        assert_relative_eq!(a[1], 5.0);

        let (mut c, mut d) = (vec![0.0; 3], vec![0.0; 3]);
        mul_vec_transpose(&csr, &w, &mut c);
        mul_vec_transpose(&csc, &w, &mut d);
        assert_eq!(c, d);
        assert_relative_eq!(c[0], 0.5);
        assert_relative_eq!(c[1], 7.0);
        assert_relative_eq!(c[2], 8.0);
    }
}
