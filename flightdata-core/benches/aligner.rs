use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use flightdata_core::{
    constants::ARINC_717_SYNC_WORDS,
    packing::{pack_12bit, Unpack12Bit},
    AlignerConfig, ByteAligner,
};

fn make_stream(wps: usize, num_frames: usize) -> Vec<u16> {
    let mut words = Vec::with_capacity(wps * 4 * num_frames);
    for f in 0..num_frames {
        for sync in ARINC_717_SYNC_WORDS {
            words.push(sync);
            words.extend((1..wps).map(|i| ((i * 31 + f) % 0x200) as u16));
        }
    }
    words
}

fn le_bytes(words: &[u16]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_le_bytes()).collect()
}

fn bench_align(c: &mut Criterion) {
    let mut group = c.benchmark_group("align");

    for &wps in &[64usize, 256, 1024] {
        let mut stream = vec![0x5Au8; 37];
        stream.extend(le_bytes(&make_stream(wps, 64)));
        group.throughput(Throughput::Bytes(stream.len() as u64));

        group.bench_with_input(BenchmarkId::new("process", wps), &stream, |b, data| {
            b.iter(|| {
                let mut aligner = ByteAligner::new(AlignerConfig::new()).unwrap();
                let frames = aligner
                    .process(data.chunks(4096), None, None)
                    .unwrap()
                    .count();
                criterion::black_box(frames);
            });
        });

        group.bench_with_input(BenchmarkId::new("identify", wps), &stream, |b, data| {
            b.iter(|| {
                let mut aligner = ByteAligner::new(AlignerConfig::new()).unwrap();
                let points = aligner.identify(data.chunks(4096)).count();
                criterion::black_box(points);
            });
        });
    }

    group.finish();
}

fn bench_noise(c: &mut Criterion) {
    let mut group = c.benchmark_group("noise");
    // worst case for the lead-byte search: every byte is a candidate
    let stream: Vec<u8> = [0x47u8, 0x02].repeat(32 * 1024);
    group.throughput(Throughput::Bytes(stream.len() as u64));
    group.bench_function("lead_bytes_only", |b| {
        b.iter(|| {
            let mut aligner = ByteAligner::new(AlignerConfig::new()).unwrap();
            let frames = aligner.process([&stream], None, None).unwrap().count();
            criterion::black_box(frames);
        });
    });
    group.finish();
}

fn bench_packed(c: &mut Criterion) {
    let mut group = c.benchmark_group("packed_12bit");
    let packed = pack_12bit(&make_stream(256, 64));
    group.throughput(Throughput::Bytes(packed.len() as u64));
    group.bench_function("unpack_and_align", |b| {
        b.iter(|| {
            let mut aligner = ByteAligner::new(AlignerConfig::new()).unwrap();
            let unpacked = Unpack12Bit::new(packed.chunks(4095), true);
            let frames = aligner.process(unpacked, None, None).unwrap().count();
            criterion::black_box(frames);
        });
    });
    group.finish();
}

criterion_group!(benches, bench_align, bench_noise, bench_packed);
criterion_main!(benches);
