//! Device matching: decides whether a sysfs node is an NTRDMA device.

use crate::config::{IBDEV_ATTR, IBDEV_ATTR_MAX, IBDEV_PREFIX};
use crate::sysfs::SysfsDevice;

/// Returns `true` if `sysfs_dev` belongs to the NTRDMA family.
///
/// The node's `ibdev` attribute must read as `ntrdma_<n>`. Any read failure
/// or malformed value is a non-match.
pub fn ntrdma_device_match(sysfs_dev: &SysfsDevice) -> bool {
    let value = match sysfs_dev.read_attr::<IBDEV_ATTR_MAX>(IBDEV_ATTR) {
        Ok(value) => value,
        Err(err) => {
            trace!(
                "ntrdma: {}: no usable {} attribute: {:?}",
                sysfs_dev.sysfs_name, IBDEV_ATTR, err
            );
            return false;
        }
    };

    match ibdev_index(&value) {
        Some(index) => {
            trace!("ntrdma: {} is {}{}", sysfs_dev.sysfs_name, IBDEV_PREFIX, index);
            true
        }
        None => {
            trace!("ntrdma: {} ({}) is not ours", sysfs_dev.sysfs_name, value.as_str());
            false
        }
    }
}

/// Parses the device index out of an `ntrdma_<n>` name.
///
/// `<n>` follows the C `%i` conversion: optional leading whitespace and
/// sign, then a hexadecimal (`0x`), octal (leading `0`) or decimal number.
/// Anything after the number is ignored. Out-of-range values saturate.
pub fn ibdev_index(name: &str) -> Option<i64> {
    parse_c_int(name.strip_prefix(IBDEV_PREFIX)?)
}

fn parse_c_int(s: &str) -> Option<i64> {
    let s = s.trim_start_matches(|c: char| c.is_ascii_whitespace());
    let (negative, s) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let bytes = s.as_bytes();
    let (radix, digits) = match bytes {
        [b'0', b'x' | b'X', rest @ ..] if rest.first().is_some_and(u8::is_ascii_hexdigit) => {
            (16, rest)
        }
        // A bare `0x` converts the `0` and leaves `x` unread.
        [b'0', ..] => (8, bytes),
        _ => (10, bytes),
    };

    let mut value: i64 = 0;
    let mut seen = false;
    for &b in digits {
        let Some(digit) = (b as char).to_digit(radix) else {
            break;
        };
        seen = true;
        value = value.saturating_mul(radix as i64).saturating_add(digit as i64);
    }

    if !seen {
        return None;
    }
    Some(if negative { value.saturating_neg() } else { value })
}
