//! AAC session benchmarks
//!
//! Encode and decode throughput through the FDK engine

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;
use zvd_aac::codec::aac::pipeline;
use zvd_aac::{DecoderSession, EncoderConfig, EncoderSession};

const FRAMES: usize = 50;

/// Interleaved s16 sine wave, `FRAMES` AAC frames long
fn create_test_pcm(channels: u32, sample_rate: u32) -> Vec<u8> {
    let samples = 1024 * FRAMES;
    let mut pcm = Vec::with_capacity(samples * channels as usize * 2);
    for i in 0..samples {
        let t = i as f32 / sample_rate as f32;
        let sample = ((t * 440.0 * std::f32::consts::TAU).sin() * 12000.0) as i16;
        for _ in 0..channels {
            pcm.extend_from_slice(&sample.to_ne_bytes());
        }
    }
    pcm
}

fn config(channels: u32) -> EncoderConfig {
    EncoderConfig {
        channels,
        sample_rate: 48000,
        ..Default::default()
    }
}

/// Benchmark encoding for several channel layouts
fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("aac_encode");

    for &channels in &[1u32, 2, 6] {
        let pcm = create_test_pcm(channels, 48000);
        group.throughput(Throughput::Bytes(pcm.len() as u64));

        group.bench_with_input(BenchmarkId::from_parameter(channels), &pcm, |b, pcm| {
            b.iter(|| {
                let mut session = EncoderSession::with_config(&config(channels)).unwrap();
                black_box(pipeline::encode_stream(&mut session, black_box(pcm)).unwrap())
            });
        });
    }

    group.finish();
}

/// Benchmark decoding of a pre-encoded stream
fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("aac_decode");

    for &channels in &[1u32, 2, 6] {
        let pcm = create_test_pcm(channels, 48000);
        let mut encoder = EncoderSession::with_config(&config(channels)).unwrap();
        let adts = pipeline::encode_stream(&mut encoder, &pcm).unwrap().concat();
        group.throughput(Throughput::Bytes(adts.len() as u64));

        group.bench_with_input(BenchmarkId::from_parameter(channels), &adts, |b, adts| {
            b.iter(|| {
                let mut session = DecoderSession::create().unwrap();
                black_box(pipeline::decode_stream(&mut session, black_box(adts)).unwrap())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
