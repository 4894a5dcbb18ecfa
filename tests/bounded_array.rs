// BoundedArray integration tests: fixed capacity, owned and view storage.
use nge_containers::{BoundedArray, ContainerError};

#[test]
fn fills_to_capacity_then_rejects() {
    let mut a = BoundedArray::with_capacity(4);
    for i in 0..4 {
        assert_eq!(a.try_push(i), Ok(()));
    }
    assert!(a.is_full());
    assert_eq!(a.try_push(9), Err(ContainerError::Full { capacity: 4 }));
    assert_eq!(a.insert_at(0, 9), Err(ContainerError::Full { capacity: 4 }));
    assert!(a.iter().copied().eq(0..4));
}

#[test]
#[should_panic(expected = "full")]
fn push_past_capacity_panics() {
    let mut a = BoundedArray::with_capacity(1);
    a.push(1);
    a.push(2);
}

#[test]
fn view_over_caller_slots() {
    let mut slots: [Option<u32>; 8] = Default::default();
    {
        let mut a = BoundedArray::wrap(&mut slots).unwrap();
        assert!(a.is_view());
        assert_eq!(a.capacity(), 8);
        a.push(1);
        a.push_front(0);
        a.insert_at(2, 2).unwrap();
        assert!(a.iter().copied().eq(0..3));
    }
    assert_eq!(&slots[..4], &[Some(0), Some(1), Some(2), None]);
}

#[test]
fn view_rejects_fragmented_storage() {
    let mut slots = [Some(1), None, Some(3)];
    assert_eq!(
        BoundedArray::wrap(&mut slots).err(),
        Some(ContainerError::FragmentedView { index: 2 })
    );
}

#[test]
fn ends_and_middle() {
    let mut a = BoundedArray::new();
    assert_eq!(a.capacity(), 32);
    for i in 0..10 {
        a.push(i);
    }
    assert_eq!(a.remove_at(5), Ok(5));
    assert_eq!(a.pop_front(), Some(0));
    assert_eq!(a.pop(), Some(9));
    assert!(a.remove(&7));
    assert_eq!(a.index_of(&8), Some(5));
    assert_eq!(a.remove_at(20), Err(ContainerError::OutOfBounds { index: 20, len: 6 }));
}
