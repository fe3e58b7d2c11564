//! Kernel orientation for convolution and correlation.

use ndarray::{ArrayBase, ArrayView, Axis, Data, Dim, Dimension, IntoDimension, Ix, RawData};

/// A borrowed FIR kernel together with the orientation it is applied in.
///
/// With `reverse` set (the default) the kernel is flipped along every axis
/// before it slides over the input, which makes the operation a true
/// convolution. Without it the kernel is used as is (cross-correlation).
pub struct FirKernel<'a, S: RawData, const N: usize> {
    pub(crate) kernel: &'a ArrayBase<S, Dim<[Ix; N]>>,
    pub(crate) reverse: bool,
}

impl<'a, S: RawData, const N: usize, T> FirKernel<'a, S, N>
where
    T: num::traits::NumAssign + Copy,
    S: Data<Elem = T>,
    Dim<[Ix; N]>: Dimension,
{
    /// The kernel as it is laid over the input: flipped on every axis when
    /// `reverse` is set.
    pub fn oriented(&self) -> ArrayView<'a, T, Dim<[Ix; N]>> {
        let mut view = self.kernel.view();

        if self.reverse {
            (0..N).for_each(|axis| view.invert_axis(Axis(axis)));
        }

        view
    }

    /// Generates a list of offsets and corresponding kernel values for efficient convolution.
    ///
    /// Offsets are measured in elements of the (contiguous) input buffer whose
    /// strides are given by `input_strides`. Every tap is listed, zero-valued
    /// ones included.
    pub fn gen_offset_list(&self, input_strides: &[isize]) -> Vec<(isize, T)> {
        self.oriented()
            .indexed_iter()
            .map(|(index, v)| {
                let index = index.into_dimension();
                (
                    (0..N)
                        .map(|n| index[n] as isize * input_strides[n])
                        .sum::<isize>(),
                    *v,
                )
            })
            .collect()
    }
}

pub trait ReverseKernel<'a, S: RawData, const N: usize> {
    fn reverse(self) -> FirKernel<'a, S, N>;
    fn no_reverse(self) -> FirKernel<'a, S, N>;
}

impl<'a, S: RawData, K, const N: usize> ReverseKernel<'a, S, N> for K
where
    K: IntoFirKernel<'a, S, N>,
{
    #[inline]
    fn reverse(self) -> FirKernel<'a, S, N> {
        let mut fk = self.into_fir_kernel();

        fk.reverse = true;

        fk
    }

    #[inline]
    fn no_reverse(self) -> FirKernel<'a, S, N> {
        let mut fk = self.into_fir_kernel();

        fk.reverse = false;

        fk
    }
}

/// Trait for converting a reference to a `FirKernel`.
pub trait IntoFirKernel<'a, S: RawData, const N: usize> {
    fn into_fir_kernel(self) -> FirKernel<'a, S, N>;
}

impl<'a, S: RawData, const N: usize> IntoFirKernel<'a, S, N> for &'a ArrayBase<S, Dim<[Ix; N]>> {
    #[inline]
    fn into_fir_kernel(self) -> FirKernel<'a, S, N> {
        FirKernel {
            kernel: self,
            reverse: true,
        }
    }
}

impl<'a, S: RawData, const N: usize> IntoFirKernel<'a, S, N> for FirKernel<'a, S, N> {
    #[inline]
    fn into_fir_kernel(self) -> FirKernel<'a, S, N> {
        self
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    #[test]
    fn check_trait_impl() {
        fn kernel_example<'a, S: RawData + 'a, const N: usize>(
            kernel: impl IntoFirKernel<'a, S, N>,
        ) -> bool {
            kernel.into_fir_kernel().reverse
        }

        let kernel = array![[1, 0, 1], [0, 1, 0]];

        // for convolution (default)
        assert!(kernel_example(&kernel));
        // for convolution (explicit)
        assert!(kernel_example(kernel.reverse()));
        // for cross-correlation
        assert!(!kernel_example(kernel.no_reverse()));
    }

    #[test]
    fn oriented_flips_every_axis() {
        let kernel = array![[1, 2, 3], [4, 5, 6]];

        assert_eq!(
            (&kernel).into_fir_kernel().oriented(),
            array![[6, 5, 4], [3, 2, 1]]
        );
        assert_eq!(kernel.no_reverse().oriented(), kernel);
    }

    #[test]
    fn offset_list_keeps_zero_taps() {
        let kernel = array![[1, 0], [0, 2]];

        // flipped: [[2, 0], [0, 1]]
        let offsets = (&kernel).into_fir_kernel().gen_offset_list(&[10, 1]);
        assert_eq!(offsets, vec![(0, 2), (1, 0), (10, 0), (11, 1)]);

        let offsets = kernel.no_reverse().gen_offset_list(&[10, 1]);
        assert_eq!(offsets, vec![(0, 1), (1, 0), (10, 0), (11, 2)]);
    }
}
