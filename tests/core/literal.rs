//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Zi.
//! The Zi project belongs to the Dunimd Team.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! You may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//!     http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.


use proptest::prelude::*;
use zi_wrangle::errors::ZiError;
use zi_wrangle::literal::{ZiByteSize, ZiByteUnit, ZiTimeDuration, ZiTimeUnit};

const PREFIXES: [(&str, ZiByteUnit); 5] = [
    ("k", ZiByteUnit::Kilobytes),
    ("m", ZiByteUnit::Megabytes),
    ("g", ZiByteUnit::Gigabytes),
    ("t", ZiByteUnit::Terabytes),
    ("p", ZiByteUnit::Petabytes),
];

const SUFFIXES: [(&str, ZiTimeUnit); 7] = [
    ("ns", ZiTimeUnit::Nanoseconds),
    ("us", ZiTimeUnit::Microseconds),
    ("ms", ZiTimeUnit::Milliseconds),
    ("s", ZiTimeUnit::Seconds),
    ("min", ZiTimeUnit::Minutes),
    ("h", ZiTimeUnit::Hours),
    ("d", ZiTimeUnit::Days),
];

proptest! {
    #[test]
    fn test_byte_size_scales_by_binary_prefix(
        n in 0i64..1_000_000,
        prefix in 0usize..5,
        upper in any::<bool>(),
        trailing_b in any::<bool>(),
    ) {
        let (letter, unit) = PREFIXES[prefix];
        let mut suffix = letter.to_string();
        if trailing_b {
            suffix.push('b');
        }
        if upper {
            suffix = suffix.to_uppercase();
        }
        let size = ZiByteSize::parse(&format!("{n}{suffix}")).unwrap();
        prop_assert_eq!(size.bytes(), n * unit.multiplier());
    }

    #[test]
    fn test_bare_integer_is_a_byte_count(n in 0i64..i64::MAX) {
        prop_assert_eq!(ZiByteSize::parse(&n.to_string()).unwrap().bytes(), n);
    }

    #[test]
    fn test_duration_converts_back_to_its_unit(
        n in 0i64..100_000,
        suffix in 0usize..7,
        spaced in any::<bool>(),
    ) {
        let (text, unit) = SUFFIXES[suffix];
        let gap = if spaced { " " } else { "" };
        let duration = ZiTimeDuration::parse(&format!("{n}{gap}{text}")).unwrap();
        prop_assert!((duration.as_unit(unit) - n as f64).abs() < 1e-6);
    }
}

#[test]
fn test_fractional_sizes_and_durations() {
    assert_eq!(ZiByteSize::parse("1.5MB").unwrap().bytes(), 1_572_864);
    assert_eq!(ZiByteSize::parse("0.5k").unwrap().bytes(), 512);
    assert_eq!(ZiTimeDuration::parse("2.5s").unwrap().nanos(), 2_500_000_000);
    assert_eq!(ZiTimeDuration::parse("1.5 hours").unwrap().as_unit(ZiTimeUnit::Minutes), 90.0);
}

#[test]
fn test_fractional_literals_truncate_toward_zero() {
    assert_eq!(ZiByteSize::parse("1.9999k").unwrap().bytes(), 2047);
    assert_eq!(ZiByteSize::parse("0.0009k").unwrap().bytes(), 0);
    assert_eq!(ZiByteSize::parse("1.7m").unwrap().bytes(), 1_782_579);
    assert_eq!(ZiByteSize::parse("0.3GB").unwrap().bytes(), 322_122_547);

    assert_eq!(ZiTimeDuration::parse("2.9999999999s").unwrap().nanos(), 2_999_999_999);
    assert_eq!(ZiTimeDuration::parse("1.0000000005 s").unwrap().nanos(), 1_000_000_000);
    assert_eq!(ZiTimeDuration::parse("0.0000015ms").unwrap().nanos(), 1);
    assert_eq!(ZiTimeDuration::parse("0.0000009ms").unwrap().nanos(), 0);
}

#[test]
fn test_bare_duration_means_milliseconds() {
    let duration = ZiTimeDuration::parse("250").unwrap();
    assert_eq!(duration.nanos(), 250_000_000);
    assert_eq!(duration.original(), "250");
}

#[test]
fn test_invalid_literals_are_rejected() {
    for text in ["", "   ", "10 KB", "10XB", "KB", "1.2.3MB", "-5MB"] {
        let err = ZiByteSize::parse(text).unwrap_err();
        assert!(matches!(err, ZiError::InvalidLiteral { .. }), "{text}");
    }
    for text in ["", "5 fortnights", "ms", "1..5s", "-1s"] {
        let err = ZiTimeDuration::parse(text).unwrap_err();
        assert!(matches!(err, ZiError::InvalidLiteral { .. }), "{text}");
    }
}

#[test]
fn test_out_of_range_literals_fail() {
    assert!(ZiByteSize::parse("9999999999P").is_err());
    assert!(ZiTimeDuration::parse("999999999999d").is_err());
}

#[test]
fn test_identity_includes_original_text() {
    let a = ZiByteSize::parse("1024").unwrap();
    let b = ZiByteSize::parse("1KB").unwrap();
    assert_eq!(a.bytes(), b.bytes());
    assert_ne!(a, b);
    assert_eq!(b.to_string(), "1KB");
    assert_eq!("1KB".parse::<ZiByteSize>().unwrap(), b);
}

#[test]
fn test_unit_labels() {
    assert_eq!(ZiByteUnit::from_label(" mb "), Some(ZiByteUnit::Megabytes));
    assert_eq!(ZiTimeUnit::from_label("SECONDS"), Some(ZiTimeUnit::Seconds));
    assert_eq!(ZiTimeUnit::from_suffix("hr"), Some(ZiTimeUnit::Hours));
}
