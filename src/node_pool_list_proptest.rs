#![cfg(test)]

// Property tests for NodePoolList; the ring checker is crate-private.

use crate::alloc::CountingAllocator;
use crate::node_pool_list::{NodePoolList, MIN_CAPACITY};
use proptest::prelude::*;
use std::collections::VecDeque;

#[derive(Clone, Debug)]
enum Op {
    Push(u16),
    PushFront(u16),
    Pop,
    PopFront,
    InsertAt(usize, u16),
    RemoveAt(usize),
    At(usize),
    EditAll(u16),
    RemoveEqual(u16),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        5 => any::<u16>().prop_map(Op::Push),
        2 => any::<u16>().prop_map(Op::PushFront),
        2 => Just(Op::Pop),
        2 => Just(Op::PopFront),
        2 => (any::<usize>(), any::<u16>()).prop_map(|(i, v)| Op::InsertAt(i, v)),
        3 => any::<usize>().prop_map(Op::RemoveAt),
        1 => any::<usize>().prop_map(Op::At),
        1 => any::<u16>().prop_map(Op::EditAll),
        1 => (0u16..8).prop_map(Op::RemoveEqual),
    ]
}

// Property: state-machine equivalence against VecDeque.
// - List order matches the model from both ends after every op.
// - Live and free rings partition the node array; no slot is shared.
// - Capacity is a power of two, at or above the floor, never below len.
// - Dropping the list releases its node array.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine(ops in proptest::collection::vec(arb_op(), 1..300)) {
        let counter = CountingAllocator::new();
        {
            let mut sut = NodePoolList::new_in(&counter);
            let mut model: VecDeque<u16> = VecDeque::new();
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
                        let i = i % (model.len() + 1);
                        prop_assert!(sut.insert_at(i, v).is_ok());
                        model.insert(i, v);
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
                    Op::EditAll(d) => {
                        let mut c = sut.cursor_mut();
                        while let Some(v) = c.current() {
                            *v = v.wrapping_add(d);
                            c.move_next();
                        }
                        for v in model.iter_mut() {
                            *v = v.wrapping_add(d);
                        }
                    }
                    Op::RemoveEqual(v) => {
                        let expected = model.iter().position(|x| *x == v);
                        if let Some(i) = expected {
                            model.remove(i);
                        }
                        prop_assert_eq!(sut.remove(&v), expected.is_some());
                    }
                }

                sut.assert_rings();
                prop_assert_eq!(sut.len(), model.len());
                let cap = sut.capacity();
                prop_assert!(cap.is_power_of_two() && cap >= MIN_CAPACITY && cap >= sut.len());
                prop_assert!(sut.iter().eq(model.iter()));
                prop_assert!(sut.iter().rev().eq(model.iter().rev()));
                prop_assert_eq!(counter.live_allocations(), 1);
            }
        }
        prop_assert_eq!(counter.live_allocations(), 0);
    }
}
