// Copyright 2026 the Tracery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Structural comparison of two op streams.
//!
//! Runs of plain records are compared as one byte slice. A record that
//! references the resource table flushes the pending run, compares its own
//! bytes, then deep-compares the referenced resources.

use super::dispatch::{read_header, resource_slot};
use crate::resource::ResourceTable;
use crate::storage::DlStorage;

pub(crate) fn ops_equal(
    a: &DlStorage,
    a_resources: &ResourceTable,
    b: &DlStorage,
    b_resources: &ResourceTable,
) -> bool {
    if a.op_count() != b.op_count() || a.used() != b.used() {
        return false;
    }
    let a_bytes = a.bytes();
    let b_bytes = b.bytes();
    let mut bulk_start = 0;

    // Offsets agree for as long as every earlier size agreed.
    for &offset in a.offsets() {
        let (a_type, a_size) = read_header(a, offset);
        let (b_type, b_size) = read_header(b, offset);
        if a_type != b_type || a_size != b_size {
            return false;
        }
        if !a_type.holds_resource() {
            continue;
        }
        if a_bytes[bulk_start..offset] != b_bytes[bulk_start..offset] {
            return false;
        }
        let end = offset + a_size;
        if a_bytes[offset..end] != b_bytes[offset..end] {
            return false;
        }
        let a_res = resource_slot(a, offset, a_type).and_then(|slot| a_resources.optional(slot));
        let b_res = resource_slot(b, offset, b_type).and_then(|slot| b_resources.optional(slot));
        let same = match (a_res, b_res) {
            (Some(x), Some(y)) => x.equals(y),
            (None, None) => true,
            _ => false,
        };
        if !same {
            return false;
        }
        bulk_start = end;
    }

    a_bytes[bulk_start..] == b_bytes[bulk_start..]
}
