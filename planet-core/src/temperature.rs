//! Temperature profile of the column
//!
//! Temperatures usually come from a measurement file sampled on its own
//! altitudes. [`read_temperature_file`] ingests such a file and
//! [`TemperatureProfile::from_measurements`] interpolates it onto an
//! [`AltitudeGrid`].
//!
//! # File format
//!
//! One header line followed by whitespace separated rows:
//!
//! ```text
//! T(K)   z(km)   dT    dz
//! 170.0  600.0   1.0   5.0
//! ```
//!
//! Blank lines and lines starting with `#` are ignored. Every data row must
//! carry exactly four numbers, temperatures must be positive and altitudes
//! strictly increasing.

use crate::altitude::AltitudeGrid;
use crate::errors::{DiffusionError, DiffusionResult};
use crate::scalar::Scalar;
use log::{debug, warn};
use ndarray::{Array1, ArrayBase, ArrayView1, Data, Ix1};
use std::path::Path;

const COLUMNS: usize = 4;

/// Raw temperature measurements as read from a file
#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureMeasurements<S: Scalar> {
    pub temperature: Array1<S>,
    pub altitude: Array1<S>,
    pub temperature_error: Array1<S>,
    pub altitude_error: Array1<S>,
}

impl<S: Scalar> TemperatureMeasurements<S> {
    pub fn len(&self) -> usize {
        self.temperature.len()
    }

    pub fn is_empty(&self) -> bool {
        self.temperature.is_empty()
    }
}

/// Read a temperature measurement file.
///
/// See the module documentation for the accepted format.
pub fn read_temperature_file<S: Scalar>(
    path: impl AsRef<Path>,
) -> DiffusionResult<TemperatureMeasurements<S>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| DiffusionError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_temperature(&content, path)
}

/// Parse the content of a temperature measurement file.
///
/// `origin` is only used to locate errors.
pub fn parse_temperature<S: Scalar>(
    content: &str,
    origin: &Path,
) -> DiffusionResult<TemperatureMeasurements<S>> {
    let ingestion_error = |line: usize, reason: String| DiffusionError::DataIngestion {
        path: origin.to_path_buf(),
        line,
        reason,
    };

    let mut lines = content.lines().enumerate();
    if lines.next().is_none() {
        return Err(ingestion_error(1, "missing header line".to_string()));
    }

    let mut columns: [Vec<S>; COLUMNS] = Default::default();
    for (index, line) in lines {
        let line_number = index + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = trimmed.split_whitespace().collect();
        if fields.len() != COLUMNS {
            return Err(ingestion_error(
                line_number,
                format!("expected {} columns, found {}", COLUMNS, fields.len()),
            ));
        }
        let mut row = [S::zero(); COLUMNS];
        for (value, field) in row.iter_mut().zip(fields) {
            let parsed: f64 = field
                .parse()
                .map_err(|_| ingestion_error(line_number, format!("'{}' is not a number", field)))?;
            if !parsed.is_finite() {
                return Err(ingestion_error(
                    line_number,
                    format!("'{}' is not finite", field),
                ));
            }
            *value = S::cast(parsed);
        }

        let [temperature, altitude, _, _] = row;
        if temperature <= S::zero() {
            return Err(ingestion_error(
                line_number,
                format!("temperature must be positive, got {}", temperature),
            ));
        }
        if let Some(previous) = columns[1].last() {
            if altitude <= *previous {
                return Err(ingestion_error(
                    line_number,
                    format!(
                        "altitudes must be strictly increasing, {} follows {}",
                        altitude, previous
                    ),
                ));
            }
        }
        for (column, value) in columns.iter_mut().zip(row) {
            column.push(value);
        }
    }

    if columns[0].len() < 2 {
        return Err(ingestion_error(
            content.lines().count(),
            format!(
                "at least 2 data rows are required, found {}",
                columns[0].len()
            ),
        ));
    }

    let [temperature, altitude, temperature_error, altitude_error] = columns.map(Array1::from);
    debug!(
        "Read {} temperature measurements from {}",
        temperature.len(),
        origin.display()
    );
    Ok(TemperatureMeasurements {
        temperature,
        altitude,
        temperature_error,
        altitude_error,
    })
}

/// Piecewise-linear interpolation of `values` sampled at `at` onto `targets`.
///
/// `at` must be strictly increasing. Targets outside the sampled range take
/// the value of the nearest end point.
pub fn linear_interpolation<S, D1, D2, D3>(
    values: &ArrayBase<D1, Ix1>,
    at: &ArrayBase<D2, Ix1>,
    targets: &ArrayBase<D3, Ix1>,
) -> DiffusionResult<Array1<S>>
where
    S: Scalar,
    D1: Data<Elem = S>,
    D2: Data<Elem = S>,
    D3: Data<Elem = S>,
{
    if values.len() != at.len() {
        return Err(DiffusionError::invalid(format!(
            "interpolation needs as many values ({}) as abscissas ({})",
            values.len(),
            at.len()
        )));
    }
    if at.is_empty() {
        return Err(DiffusionError::invalid("interpolation needs at least one sample"));
    }
    if at.windows(2).into_iter().any(|w| w[1] <= w[0]) {
        return Err(DiffusionError::invalid(
            "interpolation abscissas must be strictly increasing",
        ));
    }

    let first = at[0];
    let last = at[at.len() - 1];
    let clamped = targets.iter().filter(|&&z| z < first || z > last).count();
    if clamped > 0 {
        warn!(
            "{} target altitudes lie outside the measured range [{}, {}]; end values are used",
            clamped, first, last
        );
    }

    let mut j = 0;
    let interpolated = targets.mapv(|z| {
        if z <= first {
            return values[0];
        }
        if z >= last {
            return values[values.len() - 1];
        }
        // Targets are usually increasing, so the search rarely restarts
        if at[j] > z {
            j = 0;
        }
        while at[j + 1] < z {
            j += 1;
        }
        let slope = (values[j + 1] - values[j]) / (at[j + 1] - at[j]);
        values[j] + slope * (z - at[j])
    });
    Ok(interpolated)
}

/// Neutral and ion temperatures at every level of an altitude grid
#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureProfile<S: Scalar> {
    neutral: Array1<S>,
    ion: Array1<S>,
}

impl<S: Scalar> TemperatureProfile<S> {
    pub fn new<D1, D2>(
        neutral: &ArrayBase<D1, Ix1>,
        ion: &ArrayBase<D2, Ix1>,
        grid: &AltitudeGrid<S>,
    ) -> DiffusionResult<Self>
    where
        D1: Data<Elem = S>,
        D2: Data<Elem = S>,
    {
        for (label, profile) in [("neutral", neutral.view()), ("ion", ion.view())] {
            if profile.len() != grid.len() {
                return Err(DiffusionError::invalid(format!(
                    "{} temperature has {} levels but the altitude grid has {}",
                    label,
                    profile.len(),
                    grid.len()
                )));
            }
            if let Some(index) = profile.iter().position(|&t| !(t.is_finite() && t > S::zero()))
            {
                return Err(DiffusionError::invalid(format!(
                    "{} temperature must be positive at every level, got {} at index {}",
                    label, profile[index], index
                )));
            }
        }
        Ok(Self {
            neutral: neutral.to_owned(),
            ion: ion.to_owned(),
        })
    }

    /// Same temperature for neutrals and ions
    pub fn isothermal_species<D: Data<Elem = S>>(
        neutral: &ArrayBase<D, Ix1>,
        grid: &AltitudeGrid<S>,
    ) -> DiffusionResult<Self> {
        Self::new(neutral, neutral, grid)
    }

    /// Interpolate measurements onto the grid, using them for neutrals and ions
    pub fn from_measurements(
        measurements: &TemperatureMeasurements<S>,
        grid: &AltitudeGrid<S>,
    ) -> DiffusionResult<Self> {
        let neutral = linear_interpolation(
            &measurements.temperature,
            &measurements.altitude,
            &grid.altitudes(),
        )?;
        Self::isothermal_species(&neutral, grid)
    }

    pub fn neutral(&self) -> ArrayView1<'_, S> {
        self.neutral.view()
    }

    pub fn ion(&self) -> ArrayView1<'_, S> {
        self.ion.view()
    }

    pub fn len(&self) -> usize {
        self.neutral.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neutral.is_empty()
    }
}
