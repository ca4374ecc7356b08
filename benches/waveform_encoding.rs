use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use std::io::Cursor;
use trainvox::audio::session::AudioBlob;
use trainvox::audio::wav::{WavDecoder, WaveformEncoder, to_base64};

/// Build a mono 16 kHz capture blob with a synthetic tone of the given length.
fn tone_blob(seconds: u32) -> AudioBlob {
    let sample_rate = 16_000u32;
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        let frames = sample_rate * seconds;
        for i in 0..frames {
            // 440 Hz tone at half amplitude
            let t = i as f32 / sample_rate as f32;
            let sample = ((t * 440.0 * std::f32::consts::TAU).sin() * 16384.0) as i16;
            writer.write_sample(sample).unwrap();
        }
        writer.finalize().unwrap();
    }

    AudioBlob {
        bytes: cursor.into_inner(),
        codec: "wav",
        sample_rate,
        channels: 1,
    }
}

fn bench_encode(c: &mut Criterion) {
    let encoder = WaveformEncoder::new(WavDecoder::new());
    let mut group = c.benchmark_group("waveform_encode");

    for seconds in [1u32, 5, 10] {
        let blob = tone_blob(seconds);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}s", seconds)),
            &blob,
            |b, blob| b.iter(|| encoder.encode(black_box(blob)).unwrap()),
        );
    }

    group.finish();
}

fn bench_base64(c: &mut Criterion) {
    let encoder = WaveformEncoder::new(WavDecoder::new());
    let waveform = encoder.encode(&tone_blob(5)).unwrap();

    c.bench_function("waveform_to_base64_5s", |b| {
        b.iter(|| to_base64(black_box(&waveform)))
    });
}

criterion_group!(benches, bench_encode, bench_base64);
criterion_main!(benches);
