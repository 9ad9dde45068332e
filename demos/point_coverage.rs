use rb_interval_set::{Interval, IntervalSet};

trait Point<T> {
    fn unit(x: T) -> Interval<T>;
}

impl Point<u32> for Interval<u32> {
    fn unit(x: u32) -> Self {
        Interval::new(x, x + 1)
    }
}

fn main() {
    let mut covered = IntervalSet::<u32>::new();
    covered.add(Interval::new(3, 7));
    covered.add(Interval::new(10, 12));

    // Single points touching a stored interval extend it.
    covered.add(Interval::unit(7));
    covered.add(Interval::unit(9));
    assert_eq!(covered.to_string(), "[3,8) [9,12)");

    covered.add(Interval::unit(8));
    assert_eq!(covered.to_string(), "[3,12)");
    assert_eq!(covered.len(), 1);

    assert_eq!(
        covered.find_overlapping(&Interval::unit(5)),
        Some(&Interval::new(3, 12))
    );
    assert_eq!(covered.find_overlapping(&Interval::unit(12)), None);
    println!("covered: {covered}");
}
