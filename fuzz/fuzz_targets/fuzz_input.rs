// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 Sphragis Contributors

#![no_main]

use libfuzzer_sys::fuzz_target;
use sphragis::codec::{locate_tag, END_MARK, START_MARK};

fuzz_target!(|data: &[u8]| {
    if let Some(span) = locate_tag(data) {
        assert!(span.start + START_MARK.len() == span.payload_start);
        assert!(span.payload_start <= span.payload_end);
        assert!(span.payload_end + END_MARK.len() <= data.len());
        assert_eq!(&data[span.start..span.payload_start], START_MARK);
        assert_eq!(&data[span.payload_end..span.payload_end + END_MARK.len()], END_MARK);
    }
});
