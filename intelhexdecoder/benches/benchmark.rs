use criterion::{Criterion, criterion_group, criterion_main};
use intelhexdecoder::{Decoder, checksum};
use rand::Rng;
use std::fmt::Write;

/// Generates a linear-addressed hex image holding `size` random bytes in
/// 32-byte data records.
#[allow(clippy::cast_possible_truncation)]
fn random_hex_image(size: usize) -> String {
    let mut rng = rand::rng();
    let mut out = String::with_capacity(size * 3);
    let push_record = |out: &mut String, rtype: u8, offset: u16, payload: &[u8]| {
        let [hi, lo] = offset.to_be_bytes();
        let mut bytes = vec![payload.len() as u8, hi, lo, rtype];
        bytes.extend_from_slice(payload);
        bytes.push(checksum(&bytes));
        out.push(':');
        for b in bytes {
            let _ = write!(out, "{b:02X}");
        }
        out.push('\n');
    };

    for addr in (0..size).step_by(32) {
        if addr % 0x1_0000 == 0 {
            let upper = (addr >> 16) as u16;
            push_record(&mut out, 0x04, 0, &upper.to_be_bytes());
        }
        let payload: Vec<u8> = (0..32).map(|_| rng.random()).collect();
        push_record(&mut out, 0x00, (addr & 0xFFFF) as u16, &payload);
    }
    push_record(&mut out, 0x01, 0, &[]);
    out
}

fn bench_decoding(c: &mut Criterion) {
    let hex = random_hex_image(1 << 20);

    c.bench_function("decode_1mb", |b| {
        b.iter(|| {
            let mut decoder = Decoder::new(std::hint::black_box(hex.as_bytes()));
            let mut total = 0usize;
            while decoder.pull() {
                total += decoder.record().len();
            }
            std::hint::black_box(total);
        });
    });

    #[cfg(feature = "benchmarking")]
    c.bench_function("parse_single_line", |b| {
        let line = b":1000000000E10EBFEFE531E001E011E0010F40E05B";
        b.iter(|| intelhexdecoder::bench_priv_parse_line(std::hint::black_box(line)));
    });
}

criterion_group!(
    name = intelhexdecoder_benches;
    config = Criterion::default().sample_size(20);
    targets = bench_decoding
);
criterion_main!(intelhexdecoder_benches);
