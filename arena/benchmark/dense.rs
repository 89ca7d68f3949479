use criterion::{black_box, criterion_group, criterion_main, Criterion};

use slotkit_arena::{DenseSlotMap, GrowthPolicy};

pub fn dense(c: &mut Criterion) {
    c.bench_function("dense insertion", |b| {
        b.iter(|| {
            let mut map = DenseSlotMap::<_>::with_growth(1, GrowthPolicy::geometric(2.0));
            let map = black_box(&mut map);
            map.insert(());
        })
    });
    c.bench_function("dense re-insertion", |b| {
        let mut map = DenseSlotMap::<_>::new(5);
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
    c.bench_function("dense lookup", |b| {
        let mut map = DenseSlotMap::<_>::new(1000);
        let keys: Vec<_> = (0..1000).map(|i| map.insert(i)).collect();

        b.iter(|| keys.iter().map(|&key| black_box(&map)[key]).sum::<i32>())
    });
    c.bench_function("dense iteration", |b| {
        let mut map = DenseSlotMap::<_>::new(1000);
        let keys: Vec<_> = (0..1000).map(|i| map.insert(i)).collect();

        for (i, &key) in keys.iter().enumerate() {
            if i % 2 == 0 || i % 11 == 0 {
                map.remove(key);
            }
        }

        b.iter(|| black_box(&map).iter().sum::<i32>())
    });
}

criterion_group!(benches, dense);
criterion_main!(benches);
