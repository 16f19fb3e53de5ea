//! Folding normalized fragments into the accumulating document.
//!
//! Info and paths merge differently. Info fields are overwritten one at a time, so a
//! fragment that only sets `version` keeps the title from an earlier fragment. Operations
//! are replaced wholesale per path and method: a later operation never inherits fields
//! from the one it replaces, and other methods on the same path are left alone.

use crate::document::{Document, Info, PathItem};
use crate::normalizer::{InfoPatch, NormalizedFragment, NormalizedOperation};
use log::debug;
use std::collections::BTreeMap;

/// Merges `fragment` into `document` and returns the result.
pub fn merge(mut document: Document, fragment: NormalizedFragment) -> Document {
    merge_info(&mut document.info, fragment.info);
    for operation in fragment.operations {
        merge_operation(&mut document.paths, operation);
    }
    document
}

/// Overwrites each info field the patch sets.
pub fn merge_info(info: &mut Info, patch: InfoPatch) {
    if let Some(title) = patch.title {
        info.title = title;
    }
    if let Some(version) = patch.version {
        info.version = version;
    }
    if let Some(description) = patch.description {
        info.description = Some(description);
    }
}

/// Stores `normalized` under its path and method, replacing any earlier operation there.
pub fn merge_operation(paths: &mut BTreeMap<String, PathItem>, normalized: NormalizedOperation) {
    let NormalizedOperation {
        path,
        method,
        operation,
    } = normalized;

    let item = paths.entry(path).or_default();
    if let Some(previous) = item.slot_mut(method).replace(operation) {
        debug!("Replaced {} operation '{}'", method, previous.summary);
    }
}
