#![cfg(test)]

// Property tests for AmortizedArray kept inside the crate so they can watch
// the migration state directly.

use crate::alloc::CountingAllocator;
use crate::amortized_array::{AmortizedArray, MIN_CAPACITY};
use crate::error::ContainerError;
use proptest::prelude::*;
use std::collections::VecDeque;

#[derive(Clone, Debug)]
enum Op {
    Push(i32),
    PushFront(i32),
    Pop,
    PopFront,
    InsertAt(usize, i32),
    RemoveAt(usize),
    At(usize),
    Set(usize, i32),
    Clear,
}

fn arb_op() -> impl Strategy<Value = Op> {
    // Pushes dominate so runs cross several grow thresholds; pops are common
    // enough to drain back through the shrink thresholds.
    prop_oneof![
        6 => any::<i32>().prop_map(Op::Push),
        3 => any::<i32>().prop_map(Op::PushFront),
        3 => Just(Op::Pop),
        3 => Just(Op::PopFront),
        1 => (any::<usize>(), any::<i32>()).prop_map(|(i, v)| Op::InsertAt(i, v)),
        1 => any::<usize>().prop_map(Op::RemoveAt),
        2 => any::<usize>().prop_map(Op::At),
        1 => (any::<usize>(), any::<i32>()).prop_map(|(i, v)| Op::Set(i, v)),
        1 => Just(Op::Clear),
    ]
}

// Property: state-machine equivalence against VecDeque.
// Invariants exercised across random operation sequences:
// - LIFO/FIFO order at both ends, through grow/shrink and mid-migration.
// - Checked insert/remove/at agree with the model and report OutOfBounds
//   for indices past the end without modifying anything.
// - Capacity stays a power of two at or above the floor and never below len.
// - Every allocation is released when the array is dropped.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine(ops in proptest::collection::vec(arb_op(), 1..400)) {
        let counter = CountingAllocator::new();
        {
            let mut sut = AmortizedArray::new_in(&counter);
            let mut model: VecDeque<i32> = VecDeque::new();
            for op in ops {
                match op {
                    Op::Push(v) => {
                        sut.push(v);
                        model.push_back(v);
                    }
                    Op::PushFront(v) => {
                        sut.push_front(v);
                        model.push_front(v);
                    }
                    Op::Pop => prop_assert_eq!(sut.pop(), model.pop_back()),
                    Op::PopFront => prop_assert_eq!(sut.pop_front(), model.pop_front()),
                    Op::InsertAt(i, v) => {
                        let i = i % (model.len() + 2);
                        if i <= model.len() {
                            prop_assert_eq!(sut.insert_at(i, v), Ok(()));
                            model.insert(i, v);
                        } else {
                            prop_assert_eq!(
                                sut.insert_at(i, v),
                                Err(ContainerError::OutOfBounds { index: i, len: model.len() })
                            );
                        }
                    }
                    Op::RemoveAt(i) => {
                        let i = i % (model.len() + 1);
                        match model.remove(i) {
                            Some(expected) => prop_assert_eq!(sut.remove_at(i), Ok(expected)),
                            None => prop_assert!(sut.remove_at(i).is_err()),
                        }
                    }
                    Op::At(i) => {
                        let i = i % (model.len() + 1);
                        prop_assert_eq!(sut.at(i).ok(), model.get(i));
                    }
                    Op::Set(i, v) => {
                        if !model.is_empty() {
                            let i = i % model.len();
                            sut[i] = v;
                            model[i] = v;
                        }
                    }
                    Op::Clear => {
                        sut.clear();
                        model.clear();
                    }
                }

                prop_assert_eq!(sut.len(), model.len());
                let cap = sut.capacity();
                prop_assert!(cap.is_power_of_two() && cap >= MIN_CAPACITY && cap >= sut.len());
                prop_assert!(sut.iter().eq(model.iter()));
                if !sut.is_migrating() {
                    prop_assert_eq!(counter.live_allocations(), 1);
                }
            }
            prop_assert!(sut.iter().rev().eq(model.iter().rev()));
        }
        prop_assert_eq!(counter.live_allocations(), 0);
    }
}

// Property: pushing N values and reading 0..N back is index-transparent,
// whatever mix of grows and shrinks happened before.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_index_transparency(warmup in 0usize..300, n in 0usize..600) {
        let mut sut = AmortizedArray::new();
        for i in 0..warmup {
            sut.push(i);
        }
        while sut.pop_front().is_some() {}
        for i in 0..n {
            sut.push(i);
        }
        for i in 0..n {
            prop_assert_eq!(sut[i], i);
        }
    }
}
