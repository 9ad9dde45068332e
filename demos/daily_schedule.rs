use rb_interval_set::{CircularIntervalSet, Error, Interval};

const MINUTES_PER_DAY: u32 = 24 * 60;

fn at(hour: u32, minute: u32) -> u32 {
    hour * 60 + minute
}

fn main() -> Result<(), Error> {
    let mut busy = CircularIntervalSet::new(0, MINUTES_PER_DAY);

    // The night shift runs across midnight.
    busy.add(Interval::new(at(22, 0), at(6, 0)))?;
    busy.add(Interval::new(at(9, 0), at(12, 30)))?;
    busy.add(Interval::new(at(12, 0), at(13, 0)))?;
    busy.add(Interval::new(at(5, 30), at(7, 0)))?;

    let blocks: Vec<_> = busy.intervals().collect();
    assert_eq!(
        blocks,
        vec![
            Interval::new(at(22, 0), at(7, 0)),
            Interval::new(at(9, 0), at(13, 0)),
        ]
    );

    let lunch = Interval::new(at(12, 45), at(13, 30));
    assert!(busy.find_overlapping(&lunch)?.is_some());
    let late = Interval::new(at(23, 30), at(0, 15));
    assert!(busy.find_overlapping(&late)?.is_some());
    let afternoon = Interval::new(at(14, 0), at(16, 0));
    assert!(busy.find_overlapping(&afternoon)?.is_none());

    assert_eq!(
        busy.add(Interval::new(at(23, 0), MINUTES_PER_DAY)),
        Err(Error::InvalidRange)
    );

    for block in busy.intervals() {
        println!(
            "busy {:02}:{:02} - {:02}:{:02}",
            block.start / 60,
            block.start % 60,
            block.end / 60,
            block.end % 60
        );
    }
    Ok(())
}
