use super::*;

#[test]
fn test_add_within_limit() {
    let queue = ItemQueue::new(3);

    assert!(queue.add("a").is_ok());
    assert!(queue.add("b").is_ok());
    assert_eq!(queue.len(), 2);
    assert_eq!(queue.spare_capacity(), 1);
}

#[test]
fn test_add_full_returns_item_unchanged() {
    let queue = ItemQueue::new(2);
    queue.add(1).unwrap();
    queue.add(2).unwrap();

    let rejected = queue.add(3).unwrap_err();
    assert_eq!(rejected, 3);
    // no mutation
    assert_eq!(queue.len(), 2);
    assert_eq!(queue.get(10), vec![1, 2]);
}

#[test]
fn test_add_all_bulk() {
    let queue = ItemQueue::new(5);

    assert!(queue.add_all(vec![1, 2, 3]).is_ok());
    assert_eq!(queue.len(), 3);
}

#[test]
fn test_add_all_is_all_or_nothing() {
    let queue = ItemQueue::new(4);
    queue.add_all(vec![1, 2]).unwrap();

    // 3 items do not fit in spare capacity of 2; nothing is inserted
    let rejected = queue.add_all(vec![3, 4, 5]).unwrap_err();
    assert_eq!(rejected, vec![3, 4, 5]);
    assert_eq!(queue.len(), 2);
    assert_eq!(queue.get(10), vec![1, 2]);
}

#[test]
fn test_get_is_non_destructive() {
    let queue = ItemQueue::new(10);
    queue.add_all(vec!["a", "b", "c"]).unwrap();

    assert_eq!(queue.get(2), vec!["a", "b"]);
    assert_eq!(queue.len(), 3);
    // repeated peeks see the same window
    assert_eq!(queue.get(2), vec!["a", "b"]);
}

#[test]
fn test_take_removes_in_insertion_order() {
    let queue = ItemQueue::new(10);
    queue.add_all(vec![1, 2, 3, 4]).unwrap();

    assert_eq!(queue.take(2), vec![1, 2]);
    assert_eq!(queue.len(), 2);
    // remainder compacted to the front
    assert_eq!(queue.take(10), vec![3, 4]);
    assert!(queue.is_empty());
}

#[test]
fn test_remove_after_get() {
    let queue = ItemQueue::new(10);
    queue.add_all(vec![1, 2, 3]).unwrap();

    let batch = queue.get(2);
    assert_eq!(batch, vec![1, 2]);

    assert_eq!(queue.remove(batch.len()), 2);
    assert_eq!(queue.get(10), vec![3]);
}

#[test]
fn test_remove_zero_is_a_noop() {
    let queue = ItemQueue::new(10);
    queue.add_all(vec![1, 2]).unwrap();

    assert_eq!(queue.remove(0), 0);
    assert_eq!(queue.len(), 2);
}

#[test]
fn test_remove_more_than_resident() {
    let queue = ItemQueue::new(10);
    queue.add_all(vec![1, 2]).unwrap();

    assert_eq!(queue.remove(100), 2);
    assert!(queue.is_empty());
}

#[test]
fn test_count_equals_adds_minus_removals() {
    let queue = ItemQueue::new(100);

    for i in 0..60 {
        queue.add(i).unwrap();
    }
    queue.remove(25);
    for i in 60..70 {
        queue.add(i).unwrap();
    }

    assert_eq!(queue.len(), 60 - 25 + 10);
    // strict insertion order preserved across removals
    assert_eq!(queue.get(3), vec![25, 26, 27]);
}

#[test]
fn test_limit_accessor() {
    let queue: ItemQueue<u8> = ItemQueue::new(7);
    assert_eq!(queue.limit(), 7);
    assert_eq!(queue.spare_capacity(), 7);
}

#[test]
fn test_concurrent_adds_respect_limit() {
    use std::sync::Arc;
    use std::thread;

    let queue = Arc::new(ItemQueue::new(500));
    let mut handles = vec![];

    for _ in 0..4 {
        let q = Arc::clone(&queue);
        handles.push(thread::spawn(move || {
            let mut accepted = 0;
            for i in 0..200 {
                if q.add(i).is_ok() {
                    accepted += 1;
                }
            }
            accepted
        }));
    }

    let total: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(total, 500);
    assert_eq!(queue.len(), 500);
    assert_eq!(queue.spare_capacity(), 0);
}
