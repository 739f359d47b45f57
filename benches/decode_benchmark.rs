use criterion::{black_box, criterion_group, criterion_main, Criterion};
use psem_tables::tables::mfg::DeviceStatus;
use psem_tables::tables::standard::{ActualRegisters, CurrentRegisterData, RegFunc1};
use psem_tables::{
    DataFormats, MockTransport, NiFormat, RegisterLayout, TableDefinition, TableSession,
    TimeFormat,
};

fn layout() -> RegisterLayout {
    let registers = ActualRegisters {
        reg_func1: RegFunc1::DATE_TIME | RegFunc1::CUM_DEMAND | RegFunc1::DEMAND_RESET_CTR,
        reg_func2_raw: 0,
        nbr_self_reads: 4,
        nbr_summations: 8,
        nbr_demands: 4,
        nbr_coin_values: 2,
        nbr_occur: 2,
        nbr_tiers: 4,
        nbr_present_demands: 2,
        nbr_present_values: 8,
    };
    let formats = DataFormats {
        time: TimeFormat::SecondsSinceEpoch,
        ni1: NiFormat::Float64,
        ni2: NiFormat::Int32,
    };
    RegisterLayout::new(formats, registers)
}

fn benchmark_register_data(c: &mut Criterion) {
    let layout = layout();
    let size = CurrentRegisterData::size(&layout).unwrap().minimum();
    let data = vec![0x11; size];

    c.bench_function("measure_register_data", |b| {
        b.iter(|| black_box(CurrentRegisterData::size(black_box(&layout))))
    });
    c.bench_function("decode_register_data", |b| {
        b.iter(|| black_box(CurrentRegisterData::from_bytes(black_box(&data), &layout)))
    });
}

fn benchmark_growing_table(c: &mut Criterion) {
    let data = vec![0x20; 49];
    c.bench_function("decode_device_status", |b| {
        b.iter(|| black_box(DeviceStatus::from_bytes(black_box(&data[..41]), &())))
    });
}

fn benchmark_cached_session(c: &mut Criterion) {
    let mock = MockTransport::new();
    mock.set_table(ActualRegisters::KEY, vec![0x01, 0x00, 3, 4, 2, 1, 0, 2, 1, 1]);
    let session = TableSession::new(mock);
    session.table::<ActualRegisters>().unwrap();

    c.bench_function("session_cache_hit", |b| {
        b.iter(|| black_box(session.table::<ActualRegisters>()))
    });
}

criterion_group!(
    benches,
    benchmark_register_data,
    benchmark_growing_table,
    benchmark_cached_session
);
criterion_main!(benches);
