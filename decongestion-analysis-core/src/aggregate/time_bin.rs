use uom::si::f64::Time;

use crate::util::unit::TimeUnit;

const LABEL_SCALE: f64 = 1e6;

/// a single half-open window [start, end) of the simulated day.
#[derive(Clone, Debug, PartialEq)]
pub struct TimeBin {
    pub index: usize,
    pub start: Time,
    pub end: Time,
}

impl TimeBin {
    /// test for bin membership. bins are lower bound inclusive and
    /// upper bound exclusive.
    pub fn contains(&self, time: Time) -> bool {
        self.start <= time && time < self.end
    }

    /// the bin's lower bound written in the label unit, such as "120" for
    /// the bin starting at minute 120.
    pub fn label(&self, unit: TimeUnit) -> String {
        format_label(unit.from_uom(self.start))
    }
}

/// labels are rounded to a millionth of the label unit, dropping the noise
/// that multiples of widths like 0.1 pick up in binary floating point.
fn format_label(value: f64) -> String {
    let value = (value * LABEL_SCALE).round() / LABEL_SCALE;
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}
