//! # lib-dsp
//!
//! Data-parallel resampling and convolution engine.
//!
//! This crate provides the numerical core:
//!
//! - **upfirdn**: Fused upsample-filter-downsample kernel, 1-D, per-axis and 2-D
//! - **Resampling**: Polyphase rational resampling and Fourier-domain resampling
//! - **Convolution**: Direct, spectral and overlap-save convolution/correlation
//!   with automatic method selection, plus 2-D variants with boundary handling
//! - **Decimation**: Anti-aliased downsampling with optional zero-phase filtering
//! - **Analytic signal**: 1-D and 2-D Hilbert transforms
//! - **Wiener**: Adaptive local-statistics noise reduction
//!
//! Kernels run on the rayon pool once the work crosses the configured
//! parallel threshold (see [`config`]).

pub mod config;
pub mod convolution;
pub mod convolution2d;
pub mod decimate;
pub mod error;
pub mod fft;
pub mod firdes;
pub mod hilbert;
pub mod polyphase;
pub mod resample;
pub mod sample;
pub mod upfirdn;
pub mod wiener;
pub mod window;

pub use config::{engine_config, load_config, set_engine_config, EngineConfig};
pub use convolution::{
    choose_method, convolve, correlate, direct_convolve, fft_convolve, ConvolutionEngine, ConvolutionPath,
};
pub use convolution2d::{choose_method_2d, convolve2d, correlate2d};
pub use decimate::{decimate, decimate_with, filtfilt, lfilter, AntiAliasFilter};
pub use error::{DspError, DspResult, DspWarning};
pub use fft::FftEngine;
pub use firdes::{firwin, FilterDesigner, WindowedSinc};
pub use hilbert::{hilbert, hilbert2};
pub use polyphase::{resample_poly, resample_poly_with, PolyphaseFilter};
pub use resample::resample;
pub use sample::{Real, Sample};
pub use upfirdn::{kernel_cache, upfirdn, upfirdn2d, upfirdn_axis, UpFirDn};
pub use wiener::{wiener, wiener2};

pub use lib_types::{Boundary, Method, Mode, ResampleFactors, SignalOptions, WindowSpec};
