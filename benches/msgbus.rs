//! Benchmarks for message bus publish, flush and rename
//!
//! Run with: cargo bench msgbus

use std::rc::Rc;

use kraken_wm::id::IdRef;
use kraken_wm::msgbus::{MsgBus, MsgNotifyContext, MsgNotifyFn, MsgOwner, PrimKey, SubscribeValue};
use kraken_wm::notifier::NotifierQueue;

#[global_allocator]
static ALLOC: divan::AllocProfiler = divan::AllocProfiler::system();

fn main() {
    divan::main();
}

fn object(i: usize) -> IdRef {
    IdRef::object(format!("/World/Object_{i}"))
}

/// Bus with one `location` subscriber per object.
fn make_bus(objects: usize) -> MsgBus {
    let notify: MsgNotifyFn = Rc::new(|_, _, _| {});
    let mut bus = MsgBus::new();
    for i in 0..objects {
        bus.subscribe_prim(
            PrimKey::id_prop(object(i), "location"),
            SubscribeValue::new(MsgOwner::Custom(i as u64), notify.clone()),
            "bench",
        );
    }
    bus
}

fn flush(bus: &mut MsgBus) {
    let mut notifiers = NotifierQueue::new();
    bus.handle(&mut MsgNotifyContext {
        windows: &mut [],
        notifiers: &mut notifiers,
    });
}

#[divan::bench(args = [100, 1_000, 10_000])]
fn subscribe(objects: usize) {
    divan::black_box(make_bus(objects));
}

#[divan::bench(args = [100, 1_000, 10_000])]
fn publish_all_then_flush(bencher: divan::Bencher, objects: usize) {
    let keys: Vec<_> = (0..objects)
        .map(|i| PrimKey::id_prop(object(i), "location"))
        .collect();
    bencher
        .with_inputs(|| make_bus(objects))
        .bench_local_values(|mut bus| {
            for key in &keys {
                bus.publish_prim(key);
            }
            flush(&mut bus);
            bus
        });
}

#[divan::bench(args = [100, 1_000])]
fn repeated_publish_of_one_key(bencher: divan::Bencher, repeats: usize) {
    let key = PrimKey::id_prop(object(0), "location");
    bencher
        .with_inputs(|| make_bus(1_000))
        .bench_local_values(|mut bus| {
            for _ in 0..repeats {
                bus.publish_prim(&key);
            }
            flush(&mut bus);
            bus
        });
}

#[divan::bench(args = [100, 1_000])]
fn rename_ids(bencher: divan::Bencher, objects: usize) {
    bencher
        .with_inputs(|| make_bus(objects))
        .bench_local_values(|mut bus| {
            for i in 0..objects.min(50) {
                let renamed = IdRef::object(format!("/World/Renamed_{i}"));
                bus.update_by_id(&object(i), &renamed, |_, _| None);
            }
            bus
        });
}
