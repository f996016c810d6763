use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use onelab_client::protocol::{Codec, Parameter, ParameterType, encode};

fn number_parameter(choices: usize) -> Parameter {
    let mut p = Parameter::number("Geometry/Radius", 0.25)
        .with_label("Radius")
        .with_attribute("Highlight", "LightYellow");
    p.add_client("solver");
    let n = p.as_number_mut().unwrap();
    n.choices = (0..choices).map(|i| i as f64 * 0.1).collect();
    for i in 0..choices {
        n.set_label(i as f64 * 0.1, format!("choice {i}"));
    }
    p
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");
    let codec = Codec::default();

    let small = Parameter::string("Solver/Action", "compute");
    group.throughput(Throughput::Elements(1));
    group.bench_function("encode_string", |b| {
        b.iter(|| {
            black_box(codec.encode(&small).unwrap());
        });
    });

    let large = number_parameter(256);
    group.bench_function("encode_number_256_choices", |b| {
        b.iter(|| {
            black_box(codec.encode(&large).unwrap());
        });
    });

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");
    let codec = Codec::default();

    let small = encode(&Parameter::string("Solver/Action", "compute")).unwrap();
    group.throughput(Throughput::Bytes(small.len() as u64));
    group.bench_function("decode_string", |b| {
        b.iter(|| {
            black_box(codec.decode(ParameterType::String, &small).unwrap());
        });
    });

    let large = encode(&number_parameter(256)).unwrap();
    group.throughput(Throughput::Bytes(large.len() as u64));
    group.bench_function("decode_number_256_choices", |b| {
        b.iter(|| {
            black_box(codec.decode(ParameterType::Number, &large).unwrap());
        });
    });

    group.finish();
}

fn bench_roundtrip(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");
    let codec = Codec::default();

    let p = number_parameter(16);
    group.bench_function("roundtrip_number_16_choices", |b| {
        b.iter(|| {
            let encoded = codec.encode(&p).unwrap();
            black_box(codec.decode(ParameterType::Number, &encoded).unwrap());
        });
    });

    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode, bench_roundtrip);
criterion_main!(benches);
