//! Allow/deny lists of address ranges.
//!
//! The input format is line oriented: one IP address or CIDR block per line,
//! everything after `#` is a comment, and blank lines are ignored. A bare
//! address is a host route (`/32` for IPv4, `/128` for IPv6).
//!
//! ```text
//! # research networks
//! 141.212.118.0/24
//! 10.0.0.0/8    # private
//! 1.2.3.4
//! 2001:db8::/32
//! ```

use std::fmt;
use std::io::{self, BufRead};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/// Why a line of a range list was rejected.
#[derive(Debug)]
pub enum RangeParseError {
    /// The address part is not an IPv4 or IPv6 literal.
    InvalidAddress { line: usize, text: String },
    /// The prefix length is not a number or is too long for the address family.
    InvalidPrefix { line: usize, text: String },
    /// Reading the input failed.
    Io(io::Error),
}

impl RangeParseError {
    /// The 1-based line number of the offending line, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            RangeParseError::InvalidAddress { line, .. }
            | RangeParseError::InvalidPrefix { line, .. } => Some(*line),
            RangeParseError::Io(_) => None,
        }
    }

    fn at_line(self, line: usize) -> Self {
        match self {
            RangeParseError::InvalidAddress { text, .. } => {
                RangeParseError::InvalidAddress { line, text }
            }
            RangeParseError::InvalidPrefix { text, .. } => {
                RangeParseError::InvalidPrefix { line, text }
            }
            other => other,
        }
    }
}

impl fmt::Display for RangeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeParseError::InvalidAddress { line, text } => {
                write!(f, "line {}: invalid IP: {}", line, text)
            }
            RangeParseError::InvalidPrefix { line, text } => {
                write!(f, "line {}: invalid CIDR prefix: {}", line, text)
            }
            RangeParseError::Io(err) => write!(f, "reading ranges failed: {}", err),
        }
    }
}

impl std::error::Error for RangeParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RangeParseError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for RangeParseError {
    fn from(err: io::Error) -> Self {
        RangeParseError::Io(err)
    }
}

/// A network prefix: an address with its host bits cleared, plus a length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IpNetwork {
    addr: IpAddr,
    prefix_len: u8,
}

impl IpNetwork {
    /// Create the network containing `addr` with the given prefix length.
    ///
    /// Host bits of `addr` are cleared, so `10.1.2.3/8` becomes `10.0.0.0/8`.
    /// Returns `None` if the prefix is longer than the address.
    pub fn new(addr: IpAddr, prefix_len: u8) -> Option<Self> {
        let addr = match addr {
            IpAddr::V4(v4) => {
                let mask = mask_u32(prefix_len)?;
                IpAddr::V4(Ipv4Addr::from(u32::from(v4) & mask))
            }
            IpAddr::V6(v6) => {
                let mask = mask_u128(prefix_len)?;
                IpAddr::V6(Ipv6Addr::from(u128::from(v6) & mask))
            }
        };
        Some(Self { addr, prefix_len })
    }

    /// The single-address network for `addr`.
    pub fn host(addr: IpAddr) -> Self {
        let prefix_len = match addr {
            IpAddr::V4(_) => 32,
            IpAddr::V6(_) => 128,
        };
        Self { addr, prefix_len }
    }

    /// The network address.
    pub fn addr(&self) -> IpAddr {
        self.addr
    }

    /// The prefix length in bits.
    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    /// Whether `addr` lies inside this network. Addresses of the other
    /// family never match.
    pub fn contains(&self, addr: IpAddr) -> bool {
        match (self.addr, addr) {
            (IpAddr::V4(net), IpAddr::V4(a)) => match mask_u32(self.prefix_len) {
                Some(mask) => u32::from(a) & mask == u32::from(net),
                None => false,
            },
            (IpAddr::V6(net), IpAddr::V6(a)) => match mask_u128(self.prefix_len) {
                Some(mask) => u128::from(a) & mask == u128::from(net),
                None => false,
            },
            _ => false,
        }
    }
}

fn mask_u32(prefix_len: u8) -> Option<u32> {
    match prefix_len {
        0 => Some(0),
        1..=32 => Some(u32::MAX << (32 - prefix_len)),
        _ => None,
    }
}

fn mask_u128(prefix_len: u8) -> Option<u128> {
    match prefix_len {
        0 => Some(0),
        1..=128 => Some(u128::MAX << (128 - prefix_len)),
        _ => None,
    }
}

impl FromStr for IpNetwork {
    type Err = RangeParseError;

    /// Parse `addr/len` or a bare `addr`. Line numbers in the error are 0.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid_addr = || RangeParseError::InvalidAddress {
            line: 0,
            text: s.to_string(),
        };

        match s.split_once('/') {
            Some((addr, len)) => {
                let addr: IpAddr = addr.parse().map_err(|_| invalid_addr())?;
                let invalid_prefix = || RangeParseError::InvalidPrefix {
                    line: 0,
                    text: s.to_string(),
                };
                // Only plain decimal digits; `u8::from_str` would accept a sign.
                if len.is_empty() || !len.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(invalid_prefix());
                }
                let len: u8 = len.parse().map_err(|_| invalid_prefix())?;
                IpNetwork::new(addr, len).ok_or_else(invalid_prefix)
            }
            None => {
                let addr: IpAddr = s.parse().map_err(|_| invalid_addr())?;
                Ok(IpNetwork::host(addr))
            }
        }
    }
}

impl fmt::Display for IpNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.addr, self.prefix_len)
    }
}

/// A parsed allow or deny list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IpRanges {
    networks: Vec<IpNetwork>,
}

impl IpRanges {
    /// The networks in input order.
    pub fn networks(&self) -> &[IpNetwork] {
        &self.networks
    }

    /// Whether any network contains `addr`.
    pub fn contains(&self, addr: IpAddr) -> bool {
        self.networks.iter().any(|net| net.contains(addr))
    }

    /// Number of networks.
    pub fn len(&self) -> usize {
        self.networks.len()
    }

    /// Whether the list has no networks.
    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }
}

impl FromIterator<IpNetwork> for IpRanges {
    fn from_iter<I: IntoIterator<Item = IpNetwork>>(iter: I) -> Self {
        Self {
            networks: iter.into_iter().collect(),
        }
    }
}

impl FromStr for IpRanges {
    type Err = RangeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        read_ip_ranges(s.as_bytes())
    }
}

/// Read a range list, one entry per line.
///
/// # Errors
///
/// Fails on the first malformed line, reporting its 1-based line number,
/// or when the reader fails.
///
/// # Example
///
/// ```
/// use cyclo::ranges::read_ip_ranges;
///
/// let input = "1.2.3.4\n# comment\n\n141.212.118.7/24  # trailing\n";
/// let ranges = read_ip_ranges(input.as_bytes()).unwrap();
/// let shown: Vec<String> = ranges.networks().iter().map(|n| n.to_string()).collect();
/// assert_eq!(shown, ["1.2.3.4/32", "141.212.118.0/24"]);
/// ```
pub fn read_ip_ranges<R: BufRead>(reader: R) -> Result<IpRanges, RangeParseError> {
    let mut networks = Vec::new();
    for (idx, row) in reader.lines().enumerate() {
        let row = row?;
        let entry = row.split('#').next().unwrap_or("").trim();
        if entry.is_empty() {
            continue;
        }
        let network: IpNetwork = entry.parse().map_err(|e: RangeParseError| e.at_line(idx + 1))?;
        networks.push(network);
    }
    Ok(IpRanges { networks })
}
