//! Scratch-memory allocator contract. The protocol engine borrows the node's
//! allocator for every operation that needs transfer or frame storage; the
//! node releases received transfer payloads once they are dispatched.

/// Deterministic (bounded worst-case) allocator handing out scratch blocks.
pub trait TransferAllocator {
    /// Handle to one allocated block. Dropping it without calling
    /// [`free`](TransferAllocator::free) leaks the memory in the bounded heap.
    type Block: AsRef<[u8]> + AsMut<[u8]>;

    /// Allocate at least `size` bytes. `None` when the heap is exhausted.
    fn allocate(&mut self, size: usize) -> Option<Self::Block>;

    /// Return a block to the heap.
    fn free(&mut self, block: Self::Block);
}
