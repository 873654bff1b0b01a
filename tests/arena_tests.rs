use arena_mcts::arena::{Arena, LinearArena, StackArena};

#[test]
fn test_linear_arena_fills_in_order() {
    let arena = LinearArena::with_capacity(3);

    assert!(arena.is_empty());
    assert_eq!(arena.remain(), 3);

    assert_eq!(arena.construct(10), Some(0));
    assert_eq!(arena.construct(11), Some(1));
    assert_eq!(arena.construct(12), Some(2));
    assert_eq!(arena.construct(13), None, "a full arena must refuse");

    assert!(arena.is_full());
    assert_eq!(arena.len(), 3);
    assert_eq!(arena.remain(), 0);
    assert_eq!(arena.get(1), Some(&11));
    assert_eq!(arena.get(3), None);
}

#[test]
fn test_linear_arena_cannot_destroy() {
    let mut arena = LinearArena::with_capacity(2);
    let slot = arena.construct("node").unwrap();

    assert!(!arena.destroy(slot));
    assert_eq!(arena.get(slot), Some(&"node"));
    assert_eq!(arena.len(), 1);
}

#[test]
fn test_linear_arena_flush_resets() {
    let mut arena = LinearArena::with_capacity(2);
    arena.construct(1).unwrap();
    arena.construct(2).unwrap();
    assert!(arena.is_full());

    arena.flush();

    assert!(arena.is_empty());
    assert_eq!(arena.get(0), None);
    assert_eq!(arena.construct(3), Some(0));
    assert_eq!(arena.get(0), Some(&3));
}

#[test]
fn test_zero_capacity_arenas() {
    let linear: LinearArena<u8> = LinearArena::with_capacity(0);
    let stack: StackArena<u8> = StackArena::with_capacity(0);

    assert!(linear.is_full());
    assert!(stack.is_full());
    assert_eq!(linear.construct(1), None);
    assert_eq!(stack.construct(1), None);
}

#[test]
fn test_stack_arena_reuses_freed_slots() {
    let mut arena = StackArena::with_capacity(3);
    assert_eq!(arena.construct('a'), Some(0));
    assert_eq!(arena.construct('b'), Some(1));
    assert_eq!(arena.construct('c'), Some(2));
    assert_eq!(arena.construct('d'), None);

    assert!(arena.destroy(1));
    assert_eq!(arena.len(), 2);
    assert_eq!(arena.get(1), None);
    assert!(!arena.destroy(1), "a slot can only be freed once");

    assert_eq!(arena.construct('e'), Some(1), "the freed slot comes back");
    assert_eq!(arena.get(1), Some(&'e'));
    assert!(arena.is_full());
}

#[test]
fn test_stack_arena_last_freed_first() {
    let mut arena = StackArena::with_capacity(4);
    for value in 0..4 {
        arena.construct(value).unwrap();
    }

    assert!(arena.destroy(0));
    assert!(arena.destroy(2));

    assert_eq!(arena.construct(20), Some(2));
    assert_eq!(arena.construct(21), Some(0));
    assert_eq!(arena.construct(22), None);
}

#[test]
fn test_stack_arena_flush_resets() {
    let mut arena = StackArena::with_capacity(2);
    arena.construct(1).unwrap();
    arena.construct(2).unwrap();
    assert!(!arena.destroy(5), "out-of-range slots are ignored");

    arena.flush();

    assert!(arena.is_empty());
    assert_eq!(arena.remain(), 2);
    assert_eq!(arena.construct(3), Some(0));
}

#[test]
fn test_arena_shared_across_threads() {
    let arena: LinearArena<usize> = LinearArena::with_capacity(64);

    std::thread::scope(|scope| {
        for worker in 0..4 {
            let arena = &arena;
            scope.spawn(move || {
                for i in 0..16 {
                    assert!(arena.construct(worker * 100 + i).is_some());
                }
            });
        }
    });

    assert!(arena.is_full());
    let mut values: Vec<usize> = (0..64).filter_map(|slot| arena.get(slot).copied()).collect();
    values.sort_unstable();
    values.dedup();
    assert_eq!(values.len(), 64, "every construct landed in its own slot");
}
