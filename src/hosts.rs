//! Deterministic host sharding for CDN load distribution.
//!
//! The hash is the 32-bit rolling polynomial (`hash * 31 + code unit`) over the UTF-16 code
//! units of the file name, so the same name lands on the same host in every implementation
//! that shares the scheme.

const INT32_MAX: f64 = 2_147_483_647.0;

/// 32-bit signed rolling hash of `value`, seeded at zero.
pub fn hash_code(value: &str) -> i32 {
  value
    .encode_utf16()
    .fold(0i32, |hash, unit| hash.wrapping_mul(31).wrapping_add(i32::from(unit)))
}

/// Index in `0..host_count` selected for `file_name`, or `None` without hosts.
pub fn assign_host(file_name: &str, host_count: usize) -> Option<usize> {
  if host_count == 0 {
    return None;
  }

  let position = f64::from(hash_code(file_name)).abs() / INT32_MAX;
  let last = host_count - 1;
  // i32::MIN overshoots 1.0 by a hair; clamp keeps the index in range.
  let index = ((last as f64) * position).round() as usize;
  Some(index.min(last))
}

/// `//host` prefix for `file_name`, empty when `hosts` is empty.
pub fn host_prefix(file_name: &str, hosts: &[String]) -> String {
  match assign_host(file_name, hosts.len()) {
    Some(index) => format!("//{}", hosts[index]),
    None => String::new(),
  }
}
