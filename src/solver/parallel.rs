//! Element- and face-parallel loops and per-worker scratch arenas.
//!
//! With the `parallel` feature the loops run on the rayon thread pool;
//! without it the same closures run sequentially. Each element (or face)
//! writes only to its own slice of the output, so no synchronization is
//! needed inside the loops.

use std::sync::Mutex;

use crate::error::Result;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Scratch buffers allocated once at setup, one slot per worker.
///
/// Slot 0 belongs to threads outside the rayon pool, slot `i + 1` to rayon
/// worker `i`. Every slot sits behind its own mutex, which is never
/// contended when the pool is the one the arena was sized for.
pub struct ScratchPool<T> {
    slots: Vec<Mutex<T>>,
}

impl<T> ScratchPool<T> {
    /// One slot per worker, built with `make`.
    pub fn new(make: impl Fn() -> T) -> Self {
        let n_slots = worker_count() + 1;
        Self {
            slots: (0..n_slots).map(|_| Mutex::new(make())).collect(),
        }
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the pool has no slots (never true after construction).
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Run `f` with exclusive access to the calling worker's scratch.
    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let slot = current_slot() % self.slots.len();
        // A panic in another borrower leaves plain scratch data behind,
        // which is overwritten before use anyway.
        let mut guard = self.slots[slot]
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard)
    }
}

#[cfg(feature = "parallel")]
fn worker_count() -> usize {
    rayon::current_num_threads()
}

#[cfg(not(feature = "parallel"))]
fn worker_count() -> usize {
    0
}

#[cfg(feature = "parallel")]
fn current_slot() -> usize {
    rayon::current_thread_index().map_or(0, |i| i + 1)
}

#[cfg(not(feature = "parallel"))]
fn current_slot() -> usize {
    0
}

/// Run `f(k, chunk_k, cache_k)` for every element `k`, where `chunk_k` is
/// the k-th `chunk`-sized slice of `data` and `cache_k` the k-th entry of
/// `caches`.
pub fn try_for_each_element<T, C, F>(
    data: &mut [T],
    chunk: usize,
    caches: &mut [C],
    f: F,
) -> Result<()>
where
    T: Send,
    C: Send,
    F: Fn(usize, &mut [T], &mut C) -> Result<()> + Send + Sync,
{
    #[cfg(feature = "parallel")]
    {
        data.par_chunks_mut(chunk)
            .zip(caches.par_iter_mut())
            .enumerate()
            .try_for_each(|(k, (values, cache))| f(k, values, cache))
    }

    #[cfg(not(feature = "parallel"))]
    {
        data.chunks_mut(chunk)
            .zip(caches.iter_mut())
            .enumerate()
            .try_for_each(|(k, (values, cache))| f(k, values, cache))
    }
}

/// Run `f(index, chunk)` for every `chunk`-sized slice of `data`.
pub fn try_for_each_chunk<T, F>(data: &mut [T], chunk: usize, f: F) -> Result<()>
where
    T: Send,
    F: Fn(usize, &mut [T]) -> Result<()> + Send + Sync,
{
    #[cfg(feature = "parallel")]
    {
        data.par_chunks_mut(chunk)
            .enumerate()
            .try_for_each(|(index, values)| f(index, values))
    }

    #[cfg(not(feature = "parallel"))]
    {
        data.chunks_mut(chunk)
            .enumerate()
            .try_for_each(|(index, values)| f(index, values))
    }
}

/// Run `f(index, item)` for every item.
pub fn try_for_each_mut<T, F>(items: &mut [T], f: F) -> Result<()>
where
    T: Send,
    F: Fn(usize, &mut T) -> Result<()> + Send + Sync,
{
    #[cfg(feature = "parallel")]
    {
        items
            .par_iter_mut()
            .enumerate()
            .try_for_each(|(index, item)| f(index, item))
    }

    #[cfg(not(feature = "parallel"))]
    {
        items
            .iter_mut()
            .enumerate()
            .try_for_each(|(index, item)| f(index, item))
    }
}

/// Maximum of `f(k)` over `0..n` (0 for an empty range).
pub fn max_over<F>(n: usize, f: F) -> f64
where
    F: Fn(usize) -> f64 + Send + Sync,
{
    #[cfg(feature = "parallel")]
    {
        (0..n).into_par_iter().map(f).reduce(|| 0.0, f64::max)
    }

    #[cfg(not(feature = "parallel"))]
    {
        (0..n).map(f).fold(0.0, f64::max)
    }
}
