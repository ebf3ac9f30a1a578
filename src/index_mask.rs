//! # Row/cell acceptance bitmasks
//!
//! An [`IndexMask`] carries filtering decisions from granule selection back to the
//! row-level column accessors: each bit records whether one row (1D) or one cell
//! (2D) of a table passed the filter.
//!
//! ## Layout
//!
//! - **1D** (`new_1d`): one bit per row.
//! - **2D** (`new_2d`): logical layout `rows × (cols + 2)`. The two extra per-row
//!   bits — [`index_none`](IndexMask::index_none) ("whole row rejected") and
//!   [`index_full`](IndexMask::index_full) ("whole row accepted") — let consumers
//!   skip per-cell bit tests in the common uniform case.
//!
//! Calling a 1D-only accessor on a 2D mask (or the reverse) is a programmer error
//! and fails fast with a panic.
//!
//! ## The FULL sentinel
//!
//! [`IndexMask::full`] is a zero-capacity sentinel meaning "no filtering". Test it
//! with [`is_full`](IndexMask::is_full) / [`is_not_full`](IndexMask::is_not_full);
//! its content must never be accessed (asserted in debug builds, and any content
//! access fails fast).

const WORD_BITS: usize = 64;

/// Compact 1D/2D acceptance bitmask, or the FULL "accept everything" sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexMask {
    /// `None` encodes the FULL sentinel.
    data: Option<MaskData>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct MaskData {
    rows: usize,
    /// Columns requested by the caller (1 in 1D mode).
    requested_cols: usize,
    /// Physical columns per row (`requested_cols + 2` in 2D mode).
    cols: usize,
    two_d: bool,
    words: Vec<u64>,
}

impl IndexMask {
    /// The "no filtering" sentinel; zero capacity, never content-accessed.
    pub fn full() -> Self {
        IndexMask { data: None }
    }

    /// One acceptance bit per row.
    pub fn new_1d(rows: usize) -> Self {
        IndexMask {
            data: Some(MaskData::new(rows, 1, 1, false)),
        }
    }

    /// One acceptance bit per cell, plus the two synthetic per-row bits.
    ///
    /// Arguments
    /// ---------
    /// * `rows`: number of table rows
    /// * `cols`: number of requested columns (> 1; one-column data is 1D)
    pub fn new_2d(rows: usize, cols: usize) -> Self {
        assert!(cols > 1, "2D mask requires more than one column, got {cols}");
        IndexMask {
            data: Some(MaskData::new(rows, cols, cols + 2, true)),
        }
    }

    pub fn is_full(&self) -> bool {
        self.data.is_none()
    }

    pub fn is_not_full(&self) -> bool {
        self.data.is_some()
    }

    fn data(&self) -> &MaskData {
        debug_assert!(self.data.is_some(), "content access on the FULL mask");
        match &self.data {
            Some(data) => data,
            None => panic!("content access on the FULL mask"),
        }
    }

    fn data_mut(&mut self) -> &mut MaskData {
        debug_assert!(self.data.is_some(), "content access on the FULL mask");
        match &mut self.data {
            Some(data) => data,
            None => panic!("content access on the FULL mask"),
        }
    }

    pub fn rows(&self) -> usize {
        self.data().rows
    }

    /// Physical columns per row: 1 in 1D mode, `requested + 2` in 2D mode.
    pub fn columns(&self) -> usize {
        self.data().cols
    }

    /// Columns requested by the caller.
    pub fn requested_columns(&self) -> usize {
        self.data().requested_cols
    }

    /// Synthetic column flagging "whole row rejected" (2D only).
    pub fn index_none(&self) -> usize {
        let data = self.data();
        assert!(data.two_d, "index_none() requires a 2D mask");
        data.requested_cols
    }

    /// Synthetic column flagging "whole row accepted" (2D only).
    pub fn index_full(&self) -> usize {
        let data = self.data();
        assert!(data.two_d, "index_full() requires a 2D mask");
        data.requested_cols + 1
    }

    /// Row acceptance bit (1D only).
    pub fn accept(&self, row: usize) -> bool {
        let data = self.data();
        assert!(!data.two_d, "accept(row) requires a 1D mask");
        data.get(row, 0)
    }

    /// Set the row acceptance bit (1D), or the whole `[0, requested_cols)` span of
    /// the row in one range operation (2D).
    pub fn set_accept(&mut self, row: usize, value: bool) {
        let data = self.data_mut();
        if data.two_d {
            let start = data.bit_index(row, 0);
            data.set_range(start, start + data.requested_cols, value);
        } else {
            data.set(row, 0, value);
        }
    }

    /// Cell acceptance bit (2D only). Synthetic columns are addressable.
    pub fn accept_at(&self, row: usize, col: usize) -> bool {
        let data = self.data();
        assert!(data.two_d, "accept_at(row, col) requires a 2D mask");
        data.get(row, col)
    }

    /// Set one cell acceptance bit (2D only). Synthetic columns are addressable.
    pub fn set_accept_at(&mut self, row: usize, col: usize, value: bool) {
        let data = self.data_mut();
        assert!(data.two_d, "set_accept_at(row, col) requires a 2D mask");
        data.set(row, col, value);
    }

    /// Total accepted-bit count (raw popcount over the physical layout).
    pub fn cardinality(&self) -> usize {
        self.data()
            .words
            .iter()
            .map(|word| word.count_ones() as usize)
            .sum()
    }

    /// Indices of accepted rows, ascending (1D only).
    pub fn accepted_rows(&self) -> impl Iterator<Item = usize> + '_ {
        let data = self.data();
        assert!(!data.two_d, "accepted_rows() requires a 1D mask");
        (0..data.rows).filter(move |&row| data.get(row, 0))
    }
}

impl MaskData {
    fn new(rows: usize, requested_cols: usize, cols: usize, two_d: bool) -> Self {
        let bits = rows * cols;
        MaskData {
            rows,
            requested_cols,
            cols,
            two_d,
            words: vec![0; bits.div_ceil(WORD_BITS)],
        }
    }

    fn bit_index(&self, row: usize, col: usize) -> usize {
        assert!(row < self.rows, "row {row} out of {} rows", self.rows);
        assert!(col < self.cols, "col {col} out of {} columns", self.cols);
        row * self.cols + col
    }

    fn get(&self, row: usize, col: usize) -> bool {
        let bit = self.bit_index(row, col);
        self.words[bit / WORD_BITS] >> (bit % WORD_BITS) & 1 == 1
    }

    fn set(&mut self, row: usize, col: usize, value: bool) {
        let bit = self.bit_index(row, col);
        let mask = 1u64 << (bit % WORD_BITS);
        if value {
            self.words[bit / WORD_BITS] |= mask;
        } else {
            self.words[bit / WORD_BITS] &= !mask;
        }
    }

    /// Set every bit of `[start, end)` in word-sized steps.
    fn set_range(&mut self, start: usize, end: usize, value: bool) {
        debug_assert!(end <= self.rows * self.cols);
        if start >= end {
            return;
        }
        let first_word = start / WORD_BITS;
        let last_word = (end - 1) / WORD_BITS;
        let low = start % WORD_BITS;
        let high = (end - 1) % WORD_BITS;

        for word in first_word..=last_word {
            let mut mask = !0u64;
            if word == first_word {
                mask &= !0u64 << low;
            }
            if word == last_word {
                mask &= !0u64 >> (WORD_BITS - 1 - high);
            }
            if value {
                self.words[word] |= mask;
            } else {
                self.words[word] &= !mask;
            }
        }
    }
}
