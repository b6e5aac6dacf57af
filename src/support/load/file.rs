use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use crate::support::units::HOURS_PER_YEAR;

use super::{HourlyLoad, LoadError};

/// Layout of a text file with hourly heating and cooling columns (kW).
///
/// Files with 8760 data rows give a single repeated year; longer files must
/// hold a whole number of years.
///
/// ```no_run
/// use twine_borefield::support::load::HourlyLoadFile;
///
/// let load = HourlyLoadFile { separator: ',', ..HourlyLoadFile::default() }
///     .read_path("hourly_profile.csv")?;
/// # Ok::<(), twine_borefield::support::load::LoadError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HourlyLoadFile {
    pub separator: char,
    /// Skip the first line.
    pub header: bool,
    /// Zero-based column holding the heating demand.
    pub heating_column: usize,
    /// Zero-based column holding the cooling demand.
    pub cooling_column: usize,
}

impl Default for HourlyLoadFile {
    fn default() -> Self {
        Self {
            separator: ';',
            header: true,
            heating_column: 0,
            cooling_column: 1,
        }
    }
}

impl HourlyLoadFile {
    /// # Errors
    ///
    /// Returns a [`LoadError`] if the file cannot be opened or parsed.
    pub fn read_path(&self, path: impl AsRef<Path>) -> Result<HourlyLoad, LoadError> {
        let file = File::open(path)?;
        self.read(BufReader::new(file))
    }

    /// Reads a load from any buffered source.
    ///
    /// Blank lines are skipped.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] if a line cannot be parsed, a value is
    /// negative, or the row count is not a multiple of 8760.
    pub fn read(&self, reader: impl BufRead) -> Result<HourlyLoad, LoadError> {
        let mut heating = Vec::with_capacity(HOURS_PER_YEAR);
        let mut cooling = Vec::with_capacity(HOURS_PER_YEAR);

        for (index, line) in reader.lines().enumerate().skip(usize::from(self.header)) {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split(self.separator).collect();
            heating.push(self.field(&fields, self.heating_column, index + 1)?);
            cooling.push(self.field(&fields, self.cooling_column, index + 1)?);
        }

        if heating.len() == HOURS_PER_YEAR {
            HourlyLoad::new(heating, cooling)
        } else {
            HourlyLoad::multiyear(heating, cooling)
        }
    }

    fn field(&self, fields: &[&str], column: usize, line: usize) -> Result<f64, LoadError> {
        let text = fields.get(column).ok_or_else(|| LoadError::Parse {
            line,
            message: format!("missing column {column}"),
        })?;
        text.trim().parse().map_err(|_| LoadError::Parse {
            line,
            message: format!("{:?} is not a number", text.trim()),
        })
    }
}
