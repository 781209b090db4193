// SPDX-License-Identifier: MIT OR Apache-2.0

#![no_main]

#[path = "common.rs"]
mod common;

use libfuzzer_sys::fuzz_target;
use sseg_core::validate_boundaries;
use sseg_engine::find_boundaries;

fuzz_target!(|data: &[u8]| {
    let mut cursor = common::ByteCursor::new(data);
    let width = common::bounded(cursor.next_u8(), 0, 32);
    let alphabet = common::bounded(cursor.next_u8(), 1, 8);
    let len = common::bounded(cursor.next_u8(), 0, 255);
    let labels: Vec<usize> = (0..len)
        .map(|_| usize::from(cursor.next_u8()) % alphabet)
        .collect();

    let boundaries = find_boundaries(&labels, width);
    if !labels.is_empty() {
        assert!(validate_boundaries(labels.len(), &boundaries).is_ok());
    }
});
