use crate::Error;

/// Full parameter set of one `upfirdn2d` call.
///
/// `up_*` / `down_*` are per-axis factors and must be at least 1. The pads are
/// signed: a negative value crops that many samples from the edge instead of
/// adding zeros.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resample {
    pub up_x: usize,
    pub up_y: usize,
    pub down_x: usize,
    pub down_y: usize,
    pub pad_x0: isize,
    pub pad_x1: isize,
    pub pad_y0: isize,
    pub pad_y1: isize,
}

impl Default for Resample {
    fn default() -> Self {
        Self::new(1, 1, (0, 0))
    }
}

impl Resample {
    /// Expands the shorthand forms into the full parameter set.
    pub fn new(up: impl IntoFactor, down: impl IntoFactor, pad: impl IntoPadding) -> Self {
        let (up_x, up_y) = up.into_factor();
        let (down_x, down_y) = down.into_factor();
        let [pad_x0, pad_x1, pad_y0, pad_y1] = pad.into_padding();

        Self {
            up_x,
            up_y,
            down_x,
            down_y,
            pad_x0,
            pad_x1,
            pad_y0,
            pad_y1,
        }
    }

    /// Up-sampling factors in `[y, x]` axis order.
    #[inline]
    pub fn up(&self) -> [usize; 2] {
        [self.up_y, self.up_x]
    }

    /// Down-sampling factors in `[y, x]` axis order.
    #[inline]
    pub fn down(&self) -> [usize; 2] {
        [self.down_y, self.down_x]
    }

    /// Signed padding in `[y, x]` axis order.
    #[inline]
    pub fn pad(&self) -> [[isize; 2]; 2] {
        [[self.pad_y0, self.pad_y1], [self.pad_x0, self.pad_x1]]
    }

    /// Spatial output size `(out_h, out_w)` for an `in_h x in_w` plane
    /// filtered by a `kernel_h x kernel_w` kernel.
    ///
    /// ```text
    /// out_h = (H*up_y + pad_y0 + pad_y1 - Kh + down_y) // down_y
    /// out_w = (W*up_x + pad_x0 + pad_x1 - Kw + down_x) // down_x
    /// ```
    pub fn output_dim(
        &self,
        (in_h, in_w): (usize, usize),
        (kernel_h, kernel_w): (usize, usize),
    ) -> Result<(usize, usize), Error> {
        let out_h = axis_len("y", in_h, kernel_h, self.up_y, self.down_y, self.pad()[0])?;
        let out_w = axis_len("x", in_w, kernel_w, self.up_x, self.down_x, self.pad()[1])?;

        Ok((out_h, out_w))
    }
}

fn axis_len(
    axis: &str,
    len: usize,
    k: usize,
    up: usize,
    down: usize,
    pad: [isize; 2],
) -> Result<usize, Error> {
    if up == 0 || down == 0 {
        return Err(Error::InvalidShape(format!(
            "resampling factors on the {axis} axis must be positive (up={up}, down={down})"
        )));
    }
    if k == 0 {
        return Err(Error::InvalidShape(format!(
            "kernel is empty along the {axis} axis"
        )));
    }

    let extent = crate::padding::padded_len(len, up, pad);
    if extent < k as isize {
        return Err(Error::InvalidShape(format!(
            "kernel size {k} exceeds the padded extent {extent} of the {axis} axis \
             (len={len}, up={up}, pad={pad:?})"
        )));
    }

    Ok((extent as usize - k + down) / down)
}

/// Trait for converting a value into `(x, y)` resampling factors.
pub trait IntoFactor {
    fn into_factor(self) -> (usize, usize);
}

impl IntoFactor for usize {
    #[inline]
    fn into_factor(self) -> (usize, usize) {
        (self, self)
    }
}

impl IntoFactor for (usize, usize) {
    #[inline]
    fn into_factor(self) -> (usize, usize) {
        self
    }
}

impl IntoFactor for [usize; 2] {
    #[inline]
    fn into_factor(self) -> (usize, usize) {
        (self[0], self[1])
    }
}

/// Trait for converting a value into `[x0, x1, y0, y1]` padding.
///
/// A pair `(p0, p1)` applies `p0` to the leading edge and `p1` to the trailing
/// edge of both axes.
pub trait IntoPadding {
    fn into_padding(self) -> [isize; 4];
}

impl IntoPadding for (isize, isize) {
    #[inline]
    fn into_padding(self) -> [isize; 4] {
        [self.0, self.1, self.0, self.1]
    }
}

impl IntoPadding for [isize; 2] {
    #[inline]
    fn into_padding(self) -> [isize; 4] {
        [self[0], self[1], self[0], self[1]]
    }
}

impl IntoPadding for [isize; 4] {
    #[inline]
    fn into_padding(self) -> [isize; 4] {
        self
    }
}
