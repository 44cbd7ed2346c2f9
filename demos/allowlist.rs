use std::io::Cursor;
use std::net::{IpAddr, Ipv4Addr};

use cyclo::groups::GROUP_24;
use cyclo::{read_ip_ranges, UintGroupIterator};

const ALLOWLIST: &str = "\
# lab networks
10.1.2.0/24
10.200.0.0/28   # printers
10.64.0.1
";

fn main() {
    let allowed = read_ip_ranges(Cursor::new(ALLOWLIST)).expect("allowlist parses");
    println!("{} networks allowed", allowed.len());

    // Every offset within 10.0.0.0/8, in random order
    let spec = GROUP_24.spec();
    spec.validate().expect("built-in group is valid");
    let mut it = UintGroupIterator::from_entropy(&spec).expect("OS entropy");

    let base = u32::from(Ipv4Addr::new(10, 0, 0, 0));
    let mut hits = 0;
    loop {
        let x = it.next_uint();
        if x == 0 {
            break;
        }
        let offset = x - 1;
        if offset >= 1 << 24 {
            continue;
        }
        let addr = IpAddr::V4(Ipv4Addr::from(base + offset as u32));
        if allowed.contains(addr) {
            hits += 1;
            if hits <= 8 {
                println!("probe {}", addr);
            }
        }
    }
    println!("{} addresses probed", hits);
}
