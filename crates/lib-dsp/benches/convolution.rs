//! Convolution performance benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lib_dsp::convolution::{direct_convolve, fft_convolve, ConvolutionEngine};
use lib_dsp::{convolve, convolve2d, Boundary, Method, Mode, SignalOptions};
use ndarray::Array2;

fn bench_convolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("convolution");

    for &(signal_len, kernel_len) in &[(128usize, 125usize), (1025, 256), (1 << 15, 256), (1 << 15, 1 << 15)] {
        let signal: Vec<f64> = (0..signal_len).map(|i| (i as f64 * 0.01).sin()).collect();
        let kernel: Vec<f64> = (0..kernel_len).map(|i| (-(i as f64) * 0.1).exp()).collect();
        let label = format!("{}x{}", signal_len, kernel_len);

        // Direct is quadratic; skip the largest shape
        if signal_len * kernel_len <= 1 << 24 {
            group.bench_with_input(BenchmarkId::new("direct", &label), &(&signal, &kernel), |b, (s, k)| {
                b.iter(|| direct_convolve(black_box(s), black_box(k), Mode::Full));
            });
        }

        group.bench_with_input(BenchmarkId::new("fft", &label), &(&signal, &kernel), |b, (s, k)| {
            b.iter(|| fft_convolve(black_box(s), black_box(k), Mode::Full));
        });

        let opts = SignalOptions::default().with_method(Method::Auto);
        group.bench_with_input(BenchmarkId::new("auto", &label), &(&signal, &kernel), |b, (s, k)| {
            b.iter(|| convolve(black_box(s), black_box(k), &opts));
        });

        let engine = ConvolutionEngine::new(&kernel).unwrap();
        group.bench_with_input(BenchmarkId::new("overlap_save", &label), &(&signal, &engine), |b, (s, e)| {
            b.iter(|| e.convolve(black_box(s)));
        });
    }

    group.finish();
}

fn bench_convolution2d(c: &mut Criterion) {
    let mut group = c.benchmark_group("convolution2d");
    group.sample_size(20);

    let image = Array2::from_shape_fn((256, 256), |(i, j)| ((i * 31 + j * 17) % 97) as f64 / 97.0);
    for &taps in &[5usize, 100] {
        let kernel = Array2::from_shape_fn((taps, taps), |(i, j)| 1.0 / (1.0 + (i + j) as f64));
        let opts = SignalOptions::default()
            .with_mode(Mode::Same)
            .with_boundary(Boundary::Symm);

        group.bench_with_input(BenchmarkId::new("symm_same", taps), &kernel, |b, k| {
            b.iter(|| convolve2d(black_box(image.view()), black_box(k.view()), &opts));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_convolution, bench_convolution2d);
criterion_main!(benches);
