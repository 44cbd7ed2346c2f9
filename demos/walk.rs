use cyclo::groups::GROUP_8;
use cyclo::{GroupIterator, UintGroupIterator};

fn main() {
    let spec = GROUP_8.spec();
    spec.validate().expect("built-in group is valid");
    println!("group: {}", spec);

    let found = spec
        .find_generator(&mut rand::rngs::OsRng)
        .expect("OS entropy");
    println!("generator: {}", found);

    let it = UintGroupIterator::from_entropy(&spec).expect("OS entropy");
    println!("g = {}, start = {}", it.generator(), it.start());
    let order: Vec<u64> = it.collect();
    println!("first 16: {:?}", &order[..16]);
    println!("emitted {} of {} elements", order.len(), GROUP_8.period());

    let it = GroupIterator::from_entropy(&spec).expect("OS entropy");
    println!("auto-selected {} iterator", match it {
        GroupIterator::BigInt(_) => "big-int",
        GroupIterator::Uint(_) => "fixed-width",
    });
}
