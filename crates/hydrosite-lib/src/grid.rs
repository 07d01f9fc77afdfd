//! Raster fields (elevation, discharge) read from ESRI ASCII grids.
//!
//! The profile builder only needs point sampling, expressed by the
//! [`FieldSampler`] trait. [`Grid`] implements it with nearest-cell lookup:
//! the value of the cell containing the point, never an interpolation, so a
//! discharge step at a confluence stays a step.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};
use crate::geometry::Point;

/// Source of field values along a river.
pub trait FieldSampler {
    /// Value at `point`, or `None` outside the field or on a nodata cell.
    fn sample(&self, point: Point) -> Option<f64>;

    /// Edge length of a field cell in map units.
    fn cell_size(&self) -> f64;
}

/// Regular square-cell raster, stored row-major from the northern row.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    ncols: usize,
    nrows: usize,
    /// Western edge of the raster.
    west: f64,
    /// Southern edge of the raster.
    south: f64,
    cell_size: f64,
    values: Vec<Option<f64>>,
}

impl Grid {
    /// Build a grid by evaluating `value(col, row)` for every cell; row 0 is the
    /// northern row.
    pub fn from_fn<F>(
        ncols: usize,
        nrows: usize,
        west: f64,
        south: f64,
        cell_size: f64,
        mut value: F,
    ) -> Self
    where
        F: FnMut(usize, usize) -> Option<f64>,
    {
        let mut values = Vec::with_capacity(ncols * nrows);
        for row in 0..nrows {
            for col in 0..ncols {
                values.push(value(col, row));
            }
        }
        Self {
            ncols,
            nrows,
            west,
            south,
            cell_size,
            values,
        }
    }

    /// Read an ESRI ASCII grid from disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let grid = Self::parse(&text).map_err(|message| Error::GridFormat {
            path: path.to_path_buf(),
            message,
        })?;
        debug!(
            path = %path.display(),
            ncols = grid.ncols,
            nrows = grid.nrows,
            cell_size = grid.cell_size,
            "loaded grid"
        );
        Ok(grid)
    }

    /// Parse the ESRI ASCII grid format.
    ///
    /// Header keys are case-insensitive; both `xllcorner`/`yllcorner` and
    /// `xllcenter`/`yllcenter` origins are accepted and `nodata_value` is
    /// optional.
    pub fn parse(text: &str) -> std::result::Result<Self, String> {
        let mut tokens = text.split_whitespace().peekable();

        let mut ncols = None;
        let mut nrows = None;
        let mut x_corner = None;
        let mut y_corner = None;
        let mut x_center = None;
        let mut y_center = None;
        let mut cell_size = None;
        let mut nodata = None;

        while let Some(token) = tokens.peek() {
            if !token.starts_with(|c: char| c.is_ascii_alphabetic()) {
                break;
            }
            let key = token.to_ascii_lowercase();
            tokens.next();
            let raw = tokens
                .next()
                .ok_or_else(|| format!("missing value for header {key}"))?;
            let value: f64 = raw
                .parse()
                .map_err(|_| format!("header {key} has non-numeric value {raw:?}"))?;
            match key.as_str() {
                "ncols" => ncols = Some(value),
                "nrows" => nrows = Some(value),
                "xllcorner" => x_corner = Some(value),
                "yllcorner" => y_corner = Some(value),
                "xllcenter" => x_center = Some(value),
                "yllcenter" => y_center = Some(value),
                "cellsize" => cell_size = Some(value),
                "nodata_value" => nodata = Some(value),
                other => return Err(format!("unknown header {other}")),
            }
        }

        let ncols = count(ncols, "ncols")?;
        let nrows = count(nrows, "nrows")?;
        let cell_size = cell_size.ok_or("missing header cellsize")?;
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(format!("cellsize must be positive, got {cell_size}"));
        }
        let half = cell_size / 2.0;
        let west = x_corner
            .or(x_center.map(|x| x - half))
            .ok_or("missing header xllcorner or xllcenter")?;
        let south = y_corner
            .or(y_center.map(|y| y - half))
            .ok_or("missing header yllcorner or yllcenter")?;

        let cells = ncols
            .checked_mul(nrows)
            .ok_or_else(|| format!("grid of {ncols} x {nrows} cells is too large"))?;

        let mut values = Vec::new();
        for raw in tokens {
            let value: f64 = raw
                .parse()
                .map_err(|_| format!("cell value {raw:?} is not a number"))?;
            let is_nodata = nodata.is_some_and(|nd| value == nd) || value.is_nan();
            values.push(if is_nodata { None } else { Some(value) });
        }
        if values.len() != cells {
            return Err(format!(
                "expected {cells} cell values, found {}",
                values.len()
            ));
        }

        Ok(Self {
            ncols,
            nrows,
            west,
            south,
            cell_size,
            values,
        })
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    /// Cell `(col, row)` containing `point`; the eastern and northern raster
    /// edges belong to the last column and first row.
    fn cell_of(&self, point: Point) -> Option<(usize, usize)> {
        let east = self.west + self.ncols as f64 * self.cell_size;
        let north = self.south + self.nrows as f64 * self.cell_size;
        if !(point.x >= self.west && point.x <= east && point.y >= self.south && point.y <= north)
        {
            return None;
        }
        let col = (((point.x - self.west) / self.cell_size) as usize).min(self.ncols - 1);
        let row = (((north - point.y) / self.cell_size) as usize).min(self.nrows - 1);
        Some((col, row))
    }
}

fn count(value: Option<f64>, key: &str) -> std::result::Result<usize, String> {
    match value {
        Some(v) if v >= 1.0 && v.fract() == 0.0 => Ok(v as usize),
        Some(v) => Err(format!("{key} must be a positive integer, got {v}")),
        None => Err(format!("missing header {key}")),
    }
}

impl FieldSampler for Grid {
    fn sample(&self, point: Point) -> Option<f64> {
        let (col, row) = self.cell_of(point)?;
        self.values[row * self.ncols + col]
    }

    fn cell_size(&self) -> f64 {
        self.cell_size
    }
}
