// Copyright 2026 the Tracery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Append-only byte arena with an offset table.
//!
//! The arena is a `Vec<u64>`, so every slot handed out is 8-byte aligned and
//! any `#[repr(C)]` [`Pod`] record with alignment up to 8 can be viewed in
//! place through `bytemuck`. Slots are addressed by byte offset; growth may
//! move the arena, so nothing holds a reference across an allocation.

use alloc::vec::Vec;
use core::mem::size_of;

use bytemuck::Pod;

/// Alignment, and size granularity, of every allocation.
pub(crate) const ALIGN: usize = 8;

/// Rounds `size` up to a multiple of [`ALIGN`].
#[inline]
pub(crate) const fn align_up(size: usize) -> usize {
    (size + ALIGN - 1) & !(ALIGN - 1)
}

#[derive(Clone, Debug, Default)]
pub(crate) struct DlStorage {
    words: Vec<u64>,
    used: usize,
    offsets: Vec<usize>,
}

impl DlStorage {
    /// Appends a zeroed slot of at least `size` bytes for a new op and records
    /// its offset. Returns the offset and the rounded size.
    pub(crate) fn allocate_op(&mut self, size: usize) -> (usize, usize) {
        let size = align_up(size);
        let offset = self.used;
        let words = (offset + size) / ALIGN;
        if words > self.words.len() {
            self.words.resize(words, 0);
        }
        self.used += size;
        self.offsets.push(offset);
        (offset, size)
    }

    /// Bytes in use.
    #[inline]
    pub(crate) fn used(&self) -> usize {
        self.used
    }

    /// Number of ops allocated.
    #[inline]
    pub(crate) fn op_count(&self) -> usize {
        self.offsets.len()
    }

    #[inline]
    pub(crate) fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    #[inline]
    pub(crate) fn bytes(&self) -> &[u8] {
        &bytemuck::cast_slice::<u64, u8>(&self.words)[..self.used]
    }

    #[inline]
    fn bytes_mut(&mut self) -> &mut [u8] {
        let used = self.used;
        &mut bytemuck::cast_slice_mut::<u64, u8>(&mut self.words)[..used]
    }

    /// Views the record stored at `offset`.
    #[inline]
    pub(crate) fn record<T: Pod>(&self, offset: usize) -> &T {
        bytemuck::from_bytes(&self.bytes()[offset..offset + size_of::<T>()])
    }

    #[inline]
    pub(crate) fn record_mut<T: Pod>(&mut self, offset: usize) -> &mut T {
        bytemuck::from_bytes_mut(&mut self.bytes_mut()[offset..offset + size_of::<T>()])
    }

    /// Views `count` values of `T` starting at `offset`.
    #[inline]
    pub(crate) fn slice<T: Pod>(&self, offset: usize, count: usize) -> &[T] {
        bytemuck::cast_slice(&self.bytes()[offset..offset + count * size_of::<T>()])
    }

    pub(crate) fn write<T: Pod>(&mut self, offset: usize, value: &T) {
        let bytes = bytemuck::bytes_of(value);
        self.bytes_mut()[offset..offset + bytes.len()].copy_from_slice(bytes);
    }

    pub(crate) fn write_slice<T: Pod>(&mut self, offset: usize, values: &[T]) {
        let bytes: &[u8] = bytemuck::cast_slice(values);
        self.bytes_mut()[offset..offset + bytes.len()].copy_from_slice(bytes);
    }

    /// Drops spare capacity once recording is finished.
    pub(crate) fn trim(&mut self) {
        self.words.truncate(self.used / ALIGN);
        self.words.shrink_to_fit();
        self.offsets.shrink_to_fit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytemuck::Zeroable;

    #[repr(C)]
    #[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
    struct Pair {
        tag: u32,
        pad: u32,
        value: f64,
    }

    #[test]
    fn sizes_are_rounded_to_alignment() {
        assert_eq!(align_up(0), 0);
        assert_eq!(align_up(1), 8);
        assert_eq!(align_up(8), 8);
        assert_eq!(align_up(13), 16);
    }

    #[test]
    fn allocations_are_aligned_and_recorded() {
        let mut storage = DlStorage::default();
        let (a, size_a) = storage.allocate_op(12);
        let (b, size_b) = storage.allocate_op(8);
        assert_eq!((a, size_a), (0, 16));
        assert_eq!((b, size_b), (16, 8));
        assert_eq!(storage.used(), 24);
        assert_eq!(storage.offsets(), &[0, 16]);
        assert!(storage.bytes().iter().all(|&b| b == 0), "slots start zeroed");
    }

    #[test]
    fn records_round_trip_in_place() {
        let mut storage = DlStorage::default();
        let (offset, _) = storage.allocate_op(size_of::<Pair>() + 3 * size_of::<[f64; 2]>());
        storage.write(
            offset,
            &Pair {
                tag: 7,
                pad: 0,
                value: 1.5,
            },
        );
        let points = [[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]];
        storage.write_slice(offset + size_of::<Pair>(), &points);

        assert_eq!(storage.record::<Pair>(offset).value, 1.5);
        storage.record_mut::<Pair>(offset).tag = 9;
        assert_eq!(storage.record::<Pair>(offset).tag, 9);
        assert_eq!(
            storage.slice::<[f64; 2]>(offset + size_of::<Pair>(), 3),
            &points
        );
    }

    #[test]
    fn trim_keeps_contents() {
        let mut storage = DlStorage::default();
        for i in 0..10_u32 {
            let (offset, _) = storage.allocate_op(size_of::<Pair>());
            storage.write(
                offset,
                &Pair {
                    tag: i,
                    pad: 0,
                    value: f64::from(i),
                },
            );
        }
        storage.trim();
        assert_eq!(storage.op_count(), 10);
        assert_eq!(storage.record::<Pair>(9 * 16).tag, 9);
    }
}
