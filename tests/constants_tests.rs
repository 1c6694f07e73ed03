// SPDX-License-Identifier: MPL-2.0

//! Integration tests for constants module

use camera_widget::constants::{
    ACQUIRE_TIMEOUT, FINALIZE_TIMEOUT, OBJECT_URL_PREFIX, get_resolution_label,
};

#[test]
fn test_resolution_labels() {
    assert_eq!(get_resolution_label(3840), Some("4K"));
    assert_eq!(get_resolution_label(1920), Some("FHD"));
    assert_eq!(get_resolution_label(640), Some("SD"));
    assert_eq!(get_resolution_label(320), None);
}

#[test]
fn test_bounded_waits() {
    // The recorder must finish well before a user would give up on the prompt
    assert!(FINALIZE_TIMEOUT < ACQUIRE_TIMEOUT);
    assert!(!FINALIZE_TIMEOUT.is_zero());
}

#[test]
fn test_object_url_prefix() {
    assert!(OBJECT_URL_PREFIX.starts_with("blob:"));
    assert!(OBJECT_URL_PREFIX.ends_with('/'));
}
