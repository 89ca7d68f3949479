use std::collections::HashSet;

use slotkit_arena::{
    BoolSkipfield, CompositeKey, DenseSlotMap, GenerationalKey, GrowableStorage, GrowthPolicy, IntSkipfield,
    NullSkipfield, PagedSlotMap, PagedStorage, Skipfield, SlotMap, Storage,
};

type Key = CompositeKey;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .try_init();
}

/// every value reachable through `next`
fn collect<S, F>(map: &SlotMap<&'static str, Key, S, F>) -> HashSet<&'static str>
where
    S: Storage<&'static str, Generation = u32>,
    F: Skipfield,
{
    let mut values = HashSet::new();
    let mut key = map.next(Key::null());
    while key.is_valid() {
        values.insert(*map.get(key));
        key = map.next(key);
    }
    values
}

fn lookup<S, F>(map: &SlotMap<&'static str, Key, S, F>, keys: &[Key]) -> Vec<Option<&'static str>>
where
    S: Storage<&'static str, Generation = u32>,
    F: Skipfield,
{
    keys.iter().map(|&key| map.find(key).copied()).collect()
}

fn set(values: &[&'static str]) -> HashSet<&'static str> { values.iter().copied().collect() }

fn insert_remove_grow_clear<S, F>()
where
    S: Storage<&'static str, Generation = u32>,
    F: Skipfield,
{
    init_tracing();
    let mut map = SlotMap::<_, Key, S, F>::with_growth(4, GrowthPolicy::linear(2));

    let foo = map.insert("foo");
    assert_eq!(lookup(&map, &[foo]), [Some("foo")]);
    assert_eq!(collect(&map), set(&["foo"]));

    let bar = map.insert("bar");
    assert_eq!(lookup(&map, &[foo, bar]), [Some("foo"), Some("bar")]);
    assert_eq!(collect(&map), set(&["foo", "bar"]));

    assert!(map.remove(foo));
    let zap = map.insert("zap");
    assert_eq!(zap.index(), foo.index());
    assert_eq!(lookup(&map, &[foo, bar, zap]), [None, Some("bar"), Some("zap")]);
    assert_eq!(collect(&map), set(&["bar", "zap"]));

    // the last insert needs to grow the map
    let zip = map.insert("zip");
    let zop = map.insert("zop");
    let zep = map.insert("zep");
    assert!(map.capacity() >= 6);
    let keys = [foo, bar, zap, zip, zop, zep];
    let expected = [None, Some("bar"), Some("zap"), Some("zip"), Some("zop"), Some("zep")];
    assert_eq!(lookup(&map, &keys), expected);
    assert_eq!(collect(&map), set(&["bar", "zap", "zip", "zop", "zep"]));
    assert_eq!(map.len(), 5);

    map.resize(map.capacity() + 2);
    assert_eq!(lookup(&map, &keys), expected);
    assert_eq!(collect(&map), set(&["bar", "zap", "zip", "zop", "zep"]));

    map.clear();
    assert_eq!(lookup(&map, &[foo, bar, zap]), [None, None, None]);
    assert!(collect(&map).is_empty());
    assert!(map.is_empty());
}

#[test]
fn growable() { insert_remove_grow_clear::<GrowableStorage<&'static str, Key>, NullSkipfield>() }

#[test]
fn growable_int_skipfield() { insert_remove_grow_clear::<GrowableStorage<&'static str, Key>, IntSkipfield>() }

#[test]
fn growable_bool_skipfield() { insert_remove_grow_clear::<GrowableStorage<&'static str, Key>, BoolSkipfield>() }

#[test]
fn paged() { insert_remove_grow_clear::<PagedStorage<&'static str, Key>, NullSkipfield>() }

#[test]
fn paged_int_skipfield() { insert_remove_grow_clear::<PagedStorage<&'static str, Key>, IntSkipfield>() }

#[test]
fn growth_constant_adds_slots() {
    init_tracing();
    let mut map = SlotMap::<_, Key>::with_growth(4, GrowthPolicy::linear(2));
    for i in 0..5 {
        map.insert(i);
    }
    assert_eq!(map.capacity(), 6);
    assert_eq!(map.len(), 5);

    let mut map = DenseSlotMap::<_, Key>::with_growth(4, GrowthPolicy::linear(2));
    for i in 0..5 {
        map.insert(i);
    }
    assert_eq!(map.capacity(), 6);
}

#[test]
#[should_panic(expected = "is full")]
fn fixed_slot_map_is_fatal_when_full() {
    init_tracing();
    let mut map = SlotMap::<_, Key>::new(2);
    map.insert(0);
    map.insert(1);
    map.insert(2);
}

#[test]
fn try_insert_reports_a_full_map() {
    init_tracing();
    let mut map = SlotMap::<_, Key>::new(1);
    map.insert("kept");
    let error = map.try_insert("rejected").unwrap_err();
    assert_eq!(
        error.to_string(),
        "container is full at capacity 1 and its growth policy cannot enlarge it"
    );
    assert_eq!(error.into_inner(), "rejected");
}

#[test]
fn paged_values_never_move() {
    init_tracing();
    let mut map = PagedSlotMap::<_, Key>::with_growth(2, GrowthPolicy::geometric(2.0));
    let first = map.insert(1u64);
    let address: *const u64 = map.get(first);

    for i in 2..100 {
        map.insert(i);
    }
    assert!(map.capacity() >= 99);
    assert!(std::ptr::eq(address, map.get(first)));
}

#[test]
fn dense_swap_and_pop() {
    init_tracing();
    let mut map = DenseSlotMap::<_, Key>::new(6);
    let foo = map.insert("foo");
    let bar = map.insert("bar");
    let baz = map.insert("baz");
    let bat = map.insert("bat");
    let bla = map.insert("bla");

    assert!(map.remove(baz));
    assert_eq!(map.as_slice(), ["foo", "bar", "bla", "bat"]);
    assert_eq!(map.find(bat), Some(&"bat"));
    assert_eq!(map.find(bla), Some(&"bla"));
    assert_eq!(map.find(baz), None);
    assert_eq!(map[foo], "foo");
    assert_eq!(map[bar], "bar");
}

#[test]
fn debug_lists_entries() {
    let mut map = SlotMap::<_, Key>::new(2);
    let key = map.insert('x');
    assert_eq!(format!("{:?}", map), format!("{{{:?}: 'x'}}", key));

    let mut dense = DenseSlotMap::<_, Key>::new(2);
    let key = dense.insert('y');
    assert_eq!(format!("{:?}", dense), format!("{{{:?}: 'y'}}", key));
}
