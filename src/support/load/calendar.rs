use jiff::civil::Date;

use crate::support::units::{HOURS_PER_YEAR, MONTHS_PER_YEAR};

use super::LoadError;

/// A non-leap year, so that months add up to [`HOURS_PER_YEAR`].
const REFERENCE_YEAR: i16 = 2023;

/// Hours in each calendar month, January first.
pub(super) fn month_hours() -> Result<[usize; MONTHS_PER_YEAR], LoadError> {
    let mut hours = [0; MONTHS_PER_YEAR];
    for (month, slot) in (1_i8..=12).zip(&mut hours) {
        let days = Date::new(REFERENCE_YEAR, month, 1)?.days_in_month();
        *slot = usize::from(days.unsigned_abs()) * 24;
    }
    debug_assert_eq!(hours.iter().sum::<usize>(), HOURS_PER_YEAR);
    Ok(hours)
}

/// Calendar month (0 = January) of simulation month `index`.
pub(super) fn calendar_month(start_month: u8, index: usize) -> usize {
    (usize::from(start_month) - 1 + index) % MONTHS_PER_YEAR
}

/// Hours in each month of the year, January first.
///
/// Equal months are 730 hours each, which splits a year into whole hours.
fn year_blocks(all_months_equal: bool) -> Result<[usize; MONTHS_PER_YEAR], LoadError> {
    if all_months_equal {
        return Ok([HOURS_PER_YEAR / MONTHS_PER_YEAR; MONTHS_PER_YEAR]);
    }
    month_hours()
}

/// Hours per simulation month over `months` months.
///
/// Equal months are 730 hours; otherwise each month gets its calendar length.
pub(super) fn hours_per_month(
    start_month: u8,
    months: usize,
    all_months_equal: bool,
) -> Result<Vec<f64>, LoadError> {
    Ok(month_lengths(start_month, months, all_months_equal)?
        .into_iter()
        .map(|hours| hours as f64)
        .collect())
}

/// Lengths (h) of `months` simulation months, used to split hourly data.
pub(super) fn month_lengths(
    start_month: u8,
    months: usize,
    all_months_equal: bool,
) -> Result<Vec<usize>, LoadError> {
    let hours = year_blocks(all_months_equal)?;
    Ok((0..months)
        .map(|i| hours[calendar_month(start_month, i)])
        .collect())
}

/// Rotates one year of monthly data so that it begins at `start_month`.
pub(super) fn rotate_monthly(values: &[f64], start_month: u8) -> Vec<f64> {
    let shift = usize::from(start_month) - 1;
    values[shift..].iter().chain(&values[..shift]).copied().collect()
}

/// Rotates one year of hourly data by the hours of the months preceding `start_month`.
pub(super) fn rotate_hourly(
    values: &[f64],
    start_month: u8,
    all_months_equal: bool,
) -> Result<Vec<f64>, LoadError> {
    let hours = year_blocks(all_months_equal)?;
    let shift: usize = hours[..usize::from(start_month) - 1].iter().sum();
    Ok(values[shift..].iter().chain(&values[..shift]).copied().collect())
}

/// Repeats one year of data `years` times.
pub(super) fn tile(values: &[f64], years: usize) -> Vec<f64> {
    values
        .iter()
        .copied()
        .cycle()
        .take(values.len() * years)
        .collect()
}

/// Monthly totals and maxima of an hourly series.
pub(super) fn resample(hourly: &[f64], lengths: &[usize]) -> (Vec<f64>, Vec<f64>) {
    let mut totals = Vec::with_capacity(lengths.len());
    let mut peaks = Vec::with_capacity(lengths.len());
    let mut start = 0;
    for &length in lengths {
        let end = (start + length).min(hourly.len());
        let month = &hourly[start..end];
        totals.push(month.iter().sum());
        peaks.push(month.iter().copied().fold(0.0, f64::max));
        start = end;
    }
    (totals, peaks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::support::units::UPM;

    #[test]
    fn calendar_lengths() {
        let hours = month_hours().unwrap();
        assert_eq!(hours[0], 744);
        assert_eq!(hours[1], 672);
        assert_eq!(hours[3], 720);
        assert_eq!(hours.iter().sum::<usize>(), HOURS_PER_YEAR);
    }

    #[test]
    fn rotation_starts_at_the_given_month() {
        let months: Vec<f64> = (1..=12).map(f64::from).collect();
        let rotated = rotate_monthly(&months, 3);
        assert_eq!(rotated[0], 3.0);
        assert_eq!(rotated[11], 2.0);

        let hourly: Vec<f64> = (0..HOURS_PER_YEAR).map(|h| h as f64).collect();
        let rotated = rotate_hourly(&hourly, 2, false).unwrap();
        assert_eq!(rotated[0], 744.0);
        assert_eq!(rotated[HOURS_PER_YEAR - 744], 0.0);

        let rotated = rotate_hourly(&hourly, 2, true).unwrap();
        assert_eq!(rotated[0], 730.0);
    }

    #[test]
    fn unequal_months_follow_the_calendar() {
        let upm = hours_per_month(2, 24, false).unwrap();
        assert_eq!(upm[0], 672.0);
        assert_eq!(upm[11], 744.0);
        assert_eq!(upm[12], 672.0);
        assert!(hours_per_month(5, 3, true).unwrap().iter().all(|&h| h == UPM));
    }

    #[test]
    fn equal_months_split_hourly_data_into_upm_blocks() {
        let lengths = month_lengths(3, 24, true).unwrap();
        assert!(lengths.iter().all(|&length| length as f64 == UPM));
        assert_eq!(lengths.iter().sum::<usize>(), 2 * HOURS_PER_YEAR);
    }

    #[test]
    fn resampling_sums_and_peaks() {
        let hourly = [1.0, 3.0, 2.0, 0.5, 0.5];
        let (totals, peaks) = resample(&hourly, &[3, 2]);
        assert_eq!(totals, vec![6.0, 1.0]);
        assert_eq!(peaks, vec![3.0, 0.5]);
    }
}
