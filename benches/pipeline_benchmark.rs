use bytes::BytesMut;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use nasa_sniffer::{decoder, reassembler};
use std::time::Duration;

fn minimal_frame() -> Vec<u8> {
    let mut frame = vec![0x32, 0x00, 0x0E];
    frame.extend(std::iter::repeat(0u8).take(10));
    let crc = nasa_sniffer::codec::crc16(&frame[3..13]);
    frame.extend(crc.to_be_bytes());
    frame.push(0x34);
    frame
}

fn mixed_message_frame() -> Vec<u8> {
    let mut body = Vec::new();
    body.extend([0u8; 3]);
    body.extend([0u8; 3]);
    body.extend([0x00, 0x14, 0x00]);
    body.push(3);
    body.extend(0x4000u16.to_be_bytes());
    body.push(0x01);
    body.extend(0x4201u16.to_be_bytes());
    body.extend(0x00DCi16.to_be_bytes());
    body.extend(0x8413u16.to_be_bytes());
    body.extend(0x00000100i32.to_be_bytes());

    let declared = 3 + body.len() + 2 + 1;
    let mut frame = vec![0x32];
    frame.extend(((declared - 2) as u16).to_be_bytes());
    frame.extend(body);
    let crc = nasa_sniffer::codec::crc16(&frame[3..]);
    frame.extend(crc.to_be_bytes());
    frame.push(0x34);
    frame
}

fn benchmark_reassembly(c: &mut Criterion) {
    let mut group = c.benchmark_group("reassembly");
    group.measurement_time(Duration::from_secs(5));
    group.warm_up_time(Duration::from_secs(1));

    let frame = minimal_frame();
    group.bench_function("single_frame", |b| {
        b.iter(|| {
            let mut buf = BytesMut::from(&black_box(&frame)[..]);
            reassembler::reassemble(&mut buf)
        })
    });

    let mut stream = Vec::new();
    for _ in 0..32 {
        stream.extend(&frame);
    }
    group.bench_function("32_frame_stream", |b| {
        b.iter(|| {
            let mut buf = BytesMut::from(&black_box(&stream)[..]);
            reassembler::reassemble(&mut buf)
        })
    });

    group.finish();
}

fn benchmark_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    group.measurement_time(Duration::from_secs(5));
    group.warm_up_time(Duration::from_secs(1));

    let minimal = minimal_frame();
    group.bench_function("minimal_frame", |b| {
        b.iter(|| decoder::decode(bytes::Bytes::from(black_box(minimal.clone()))))
    });

    let mixed = mixed_message_frame();
    group.bench_function("mixed_message_frame", |b| {
        b.iter(|| decoder::decode(bytes::Bytes::from(black_box(mixed.clone()))))
    });

    group.finish();
}

criterion_group!(benches, benchmark_reassembly, benchmark_decode);
criterion_main!(benches);
