//! Remaps an NVIDIA-style StyleGAN2 generator state dict onto the ROS layout.
//!
//! Source keys follow `mapping.fc{i}.*` and `synthesis.b{res}.*`; target keys
//! follow `style.*`, `conv1`, `convs.{j}`, `to_rgb1`, `to_rgbs.{j}`,
//! `noises.noise_{k}` and `input.input`. Some tensors gain leading or trailing
//! singleton axes on the way. Reading and writing checkpoint files is left to
//! the caller through [`CheckpointSource`].

use std::collections::BTreeMap;

use ndarray::{ArrayD, Axis};
use num::{traits::NumAssign, FromPrimitive};

use crate::Error;

mod config;


pub use config::GeneratorConfig;

/// Named tensors of one network.
pub type StateDict<T> = BTreeMap<String, ArrayD<T>>;

/// Gain applied to the shared resample filter when it becomes a blur or
/// up-sampling kernel in the ROS layout.
pub const BLUR_KERNEL_GAIN: u8 = 4;

/// Key under which the converted generator is stored.
pub const GENERATOR_KEY: &str = "g_ema";

/// Supplies the generator weights of a source checkpoint.
///
/// Implementations wrap whatever can read the source file format and return
/// [`Error::MissingDependency`] when that reader is unavailable.
pub trait CheckpointSource<T> {
    fn load_generator(&self) -> Result<StateDict<T>, Error>;
}

/// A converted checkpoint: a single [`GENERATOR_KEY`] entry holding the
/// remapped generator.
#[derive(Debug, Clone, PartialEq)]
pub struct Checkpoint<T> {
    pub entries: BTreeMap<String, StateDict<T>>,
}

impl<T> Checkpoint<T> {
    pub fn generator(&self) -> Option<&StateDict<T>> {
        self.entries.get(GENERATOR_KEY)
    }
}

/// Loads the source generator and converts it. Nothing is returned unless every
/// expected key was found.
pub fn convert_checkpoint<T, C>(source: &C) -> Result<Checkpoint<T>, Error>
where
    T: NumAssign + Copy + FromPrimitive,
    C: CheckpointSource<T> + ?Sized,
{
    let state_nv = source.load_generator()?;
    let state_ros = convert_state_dict(&state_nv)?;

    Ok(Checkpoint {
        entries: BTreeMap::from([(GENERATOR_KEY.to_string(), state_ros)]),
    })
}

/// Builds the ROS-layout state dict from an NVIDIA-layout one.
pub fn convert_state_dict<T>(state_nv: &StateDict<T>) -> Result<StateDict<T>, Error>
where
    T: NumAssign + Copy + FromPrimitive,
{
    let config = GeneratorConfig::infer(state_nv)?;
    tracing::debug!(
        n_mapping = config.n_mapping,
        n_layers = config.n_layers,
        resolution = config.resolution(),
        "converting generator"
    );

    let mut remap = Remap {
        src: state_nv,
        dst: StateDict::new(),
    };

    for i in 0..config.n_mapping {
        remap.copy(&format!("style.{}.weight", i + 1), &format!("mapping.fc{i}.weight"))?;
        remap.copy(&format!("style.{}.bias", i + 1), &format!("mapping.fc{i}.bias"))?;
    }

    for i in 0..config.n_layers {
        let block = format!("synthesis.b{}", 4 << i);

        if i == 0 {
            remap.unsqueeze("input.input", &format!("{block}.const"), &[NewAxis::Front])?;
            remap.conv("conv1", &format!("{block}.conv1"))?;
            remap.unsqueeze(
                "noises.noise_0",
                &format!("{block}.conv1.noise_const"),
                &[NewAxis::Front, NewAxis::Front],
            )?;
            remap.to_rgb("to_rgb1", &block)?;
            continue;
        }

        for conv_level in 0..2 {
            let nv_conv = format!("{block}.conv{conv_level}");

            remap.conv(&format!("convs.{}", 2 * i - 2 + conv_level), &nv_conv)?;
            remap.unsqueeze(
                &format!("noises.noise_{}", 2 * i - 1 + conv_level),
                &format!("{nv_conv}.noise_const"),
                &[NewAxis::Front, NewAxis::Front],
            )?;
        }

        remap.to_rgb(&format!("to_rgbs.{}", i - 1), &block)?;
        remap.blur_kernel(i - 1)?;
    }

    tracing::debug!(keys = remap.dst.len(), "generator converted");

    Ok(remap.dst)
}

/// Where [`Remap::unsqueeze`] inserts a singleton axis.
#[derive(Debug, Clone, Copy)]
enum NewAxis {
    Front,
    Back,
}

struct Remap<'a, T> {
    src: &'a StateDict<T>,
    dst: StateDict<T>,
}

impl<T> Remap<'_, T>
where
    T: NumAssign + Copy + FromPrimitive,
{
    fn get(&self, key: &str) -> Result<&ArrayD<T>, Error> {
        self.src
            .get(key)
            .ok_or_else(|| Error::KeyNotFound(key.to_string()))
    }

    fn put(&mut self, key: &str, value: ArrayD<T>, from: &str) {
        tracing::trace!(from, to = key, shape = ?value.shape(), "remap");
        self.dst.insert(key.to_string(), value);
    }

    fn copy(&mut self, dst: &str, src: &str) -> Result<(), Error> {
        let value = self.get(src)?.clone();
        self.put(dst, value, src);

        Ok(())
    }

    /// Copies `src` with a singleton axis inserted at each of `axes` in turn.
    fn unsqueeze(&mut self, dst: &str, src: &str, axes: &[NewAxis]) -> Result<(), Error> {
        let value = axes.iter().fold(self.get(src)?.clone(), |value, axis| {
            let axis = match axis {
                NewAxis::Front => 0,
                NewAxis::Back => value.ndim(),
            };
            value.insert_axis(Axis(axis))
        });
        self.put(dst, value, src);

        Ok(())
    }

    /// A modulated convolution with its bias, style affine and noise strength.
    fn conv(&mut self, ros: &str, nv: &str) -> Result<(), Error> {
        self.unsqueeze(
            &format!("{ros}.conv.weight"),
            &format!("{nv}.weight"),
            &[NewAxis::Front],
        )?;
        self.copy(&format!("{ros}.activate.bias"), &format!("{nv}.bias"))?;
        self.copy(
            &format!("{ros}.conv.modulation.weight"),
            &format!("{nv}.affine.weight"),
        )?;
        self.copy(
            &format!("{ros}.conv.modulation.bias"),
            &format!("{nv}.affine.bias"),
        )?;
        self.unsqueeze(
            &format!("{ros}.noise.weight"),
            &format!("{nv}.noise_strength"),
            &[NewAxis::Front],
        )
    }

    fn to_rgb(&mut self, ros: &str, nv_block: &str) -> Result<(), Error> {
        self.unsqueeze(
            &format!("{ros}.conv.weight"),
            &format!("{nv_block}.torgb.weight"),
            &[NewAxis::Front],
        )?;
        self.unsqueeze(
            &format!("{ros}.bias"),
            &format!("{nv_block}.torgb.bias"),
            &[NewAxis::Front, NewAxis::Back, NewAxis::Back],
        )?;
        self.copy(
            &format!("{ros}.conv.modulation.weight"),
            &format!("{nv_block}.torgb.affine.weight"),
        )?;
        self.copy(
            &format!("{ros}.conv.modulation.bias"),
            &format!("{nv_block}.torgb.affine.bias"),
        )
    }

    /// Every level shares the base block's resample filter, scaled by
    /// [`BLUR_KERNEL_GAIN`].
    fn blur_kernel(&mut self, level: usize) -> Result<(), Error> {
        const FILTER: &str = "synthesis.b4.resample_filter";

        let gain = T::from_u8(BLUR_KERNEL_GAIN).ok_or_else(|| {
            Error::Config(format!("gain {BLUR_KERNEL_GAIN} is not representable"))
        })?;
        let kernel = self.get(FILTER)?.mapv(|v| v * gain);

        self.put(&format!("convs.{}.conv.blur.kernel", 2 * level), kernel.clone(), FILTER);
        self.put(&format!("to_rgbs.{level}.upsample.kernel"), kernel, FILTER);

        Ok(())
    }
}
