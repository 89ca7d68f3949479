use criterion::{black_box, criterion_group, criterion_main, Criterion};

use slotkit_arena::{GenerationalKey, GrowthPolicy, HopSlotMap, PagedSlotMap, SlotMap};

pub fn slot_map(c: &mut Criterion) {
    c.bench_function("slot map insertion", |b| {
        b.iter(|| {
            let mut map = SlotMap::<_>::with_growth(1, GrowthPolicy::geometric(2.0));
            let map = black_box(&mut map);
            map.insert(());
        })
    });
    c.bench_function("slot map re-insertion", |b| {
        let mut map = SlotMap::<_>::new(5);
        b.iter(|| {
            let map = black_box(&mut map);
            let keys = [map.insert(()), map.insert(()), map.insert(()), map.insert(()), map.insert(())];
            let [a, b, c, d, e] = black_box(keys);

            map.remove(b);
            map.remove(d);
            map.remove(a);
            map.remove(c);
            map.remove(e);
        })
    });
    c.bench_function("paged slot map growth", |b| {
        b.iter(|| {
            let mut map = PagedSlotMap::<_>::with_growth(64, GrowthPolicy::linear(64));
            for i in 0..1000 {
                map.insert(black_box(i));
            }
            map
        })
    });

    let mut sparse = SlotMap::<_>::new(1000);
    let mut hop = HopSlotMap::<_>::new(1000);
    for i in 0..1000 {
        let a = sparse.insert(i);
        let b = hop.insert(i);
        if i % 2 == 0 || i % 11 == 0 {
            sparse.remove(a);
            hop.remove(b);
        }
    }

    c.bench_function("slot map iteration", |b| b.iter(|| black_box(&sparse).values().sum::<i32>()));
    c.bench_function("hop slot map iteration", |b| b.iter(|| black_box(&hop).values().sum::<i32>()));
    c.bench_function("hop slot map next", |b| {
        b.iter(|| {
            let hop = black_box(&hop);
            let mut total = 0;
            let mut key = hop.next(GenerationalKey::null());
            while key.is_valid() {
                total += hop[key];
                key = hop.next(key);
            }
            total
        })
    });
}

criterion_group!(benches, slot_map);
criterion_main!(benches);
