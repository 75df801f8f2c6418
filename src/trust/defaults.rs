//! Built-in edge provider ranges.
//!
//! Published Cloudflare ranges (https://www.cloudflare.com/ips/). Bump
//! `CLOUDFLARE_RANGES_VERSION` whenever the list changes.

pub const CLOUDFLARE_RANGES_VERSION: &str = "2024-06";

pub const CLOUDFLARE_RANGES: &[&str] = &[
    // IPv4
    "173.245.48.0/20",
    "103.21.244.0/22",
    "103.22.200.0/22",
    "103.31.4.0/22",
    "141.101.64.0/18",
    "108.162.192.0/18",
    "190.93.240.0/20",
    "188.114.96.0/20",
    "197.234.240.0/22",
    "198.41.128.0/17",
    "162.158.0.0/15",
    "104.16.0.0/13",
    "104.24.0.0/14",
    "172.64.0.0/13",
    "131.0.72.0/22",
    // IPv6
    "2400:cb00::/32",
    "2606:4700::/32",
    "2803:f800::/32",
    "2405:b500::/32",
    "2405:8100::/32",
    "2a06:98c0::/29",
    "2c0f:f248::/32",
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trust::networks::NetworkSet;

    #[test]
    fn test_default_ranges_parse() {
        let set = NetworkSet::parse(CLOUDFLARE_RANGES).unwrap();
        assert_eq!(set.len(), CLOUDFLARE_RANGES.len());
        assert!(set.contains(&"104.16.1.1".parse().unwrap()));
        assert!(set.contains(&"2606:4700::6810:84e5".parse().unwrap()));
    }

    #[test]
    fn test_ranges_version_is_year_month() {
        let (year, month) = CLOUDFLARE_RANGES_VERSION.split_once('-').unwrap();
        assert_eq!(year.len(), 4);
        assert!(year.parse::<u16>().is_ok());
        assert!((1..=12).contains(&month.parse::<u8>().unwrap()));
    }
}
