//! Receive queue tests: FIFO order, overflow policy, truncation.
use super::*;

fn record(id: u32, timestamp_us: u64) -> RxFrame<8> {
    RxFrame::capture(id, &[id as u8], timestamp_us)
}

#[test]
/// Frames come out in capture order.
fn test_fifo_order() {
    let queue: RxQueue<8, 4> = RxQueue::new();
    assert!(queue.is_empty());

    for id in 1..=3 {
        assert!(queue.enqueue(record(id, id as u64 * 10)));
    }
    assert_eq!(queue.len(), 3);

    for id in 1..=3 {
        let frame = queue.dequeue().expect("frame expected");
        assert_eq!(frame.extended_can_id, id);
        assert_eq!(frame.timestamp_us, id as u64 * 10);
    }
    assert!(queue.dequeue().is_none());
    assert!(queue.is_empty());
}

#[test]
/// A full queue rejects the newest frame and keeps the others untouched.
fn test_overflow_drops_newest() {
    let queue: RxQueue<8, 4> = RxQueue::new();
    for id in 1..=4 {
        assert!(queue.enqueue(record(id, 0)));
    }
    assert!(!queue.enqueue(record(5, 0)));
    assert_eq!(queue.len(), queue.capacity());
    assert_eq!(queue.dropped_frames(), 1);

    let ids: [u32; 4] = core::array::from_fn(|_| queue.dequeue().unwrap().extended_can_id);
    assert_eq!(ids, [1, 2, 3, 4]);

    // Space is available again once drained.
    assert!(queue.enqueue(record(6, 0)));
}

#[test]
/// Payloads longer than the MTU are clipped at capture time.
fn test_capture_truncates_payload() {
    let frame = RxFrame::<8>::capture(0x42, &[7; 20], 99);
    assert_eq!(frame.payload_size, 8);
    assert_eq!(frame.frame().payload(), &[7; 8]);

    let fd = RxFrame::<64>::capture(0x42, &[7; 20], 99);
    assert_eq!(fd.payload_size, 20);
}

#[test]
/// `clear` empties the queue but preserves the drop statistics.
fn test_clear_keeps_drop_counter() {
    let queue: RxQueue<8, 1> = RxQueue::new();
    queue.enqueue(record(1, 0));
    queue.enqueue(record(2, 0));
    queue.clear();
    assert!(queue.is_empty());
    assert_eq!(queue.dropped_frames(), 1);
}

#[test]
/// The queue can be declared as a `static`.
fn test_static_queue() {
    static QUEUE: RxQueue<64, 2> = RxQueue::new();
    assert!(QUEUE.enqueue(RxFrame::capture(1, &[0; 64], 0)));
    assert_eq!(QUEUE.dequeue().map(|f| f.payload_size), Some(64));
}
