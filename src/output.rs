use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::Result;

use crate::result::{Columns, SweepPoint};


/// Formats a value the way printf's `%.6g` would: six significant digits,
/// trailing zeros trimmed, scientific notation outside `[1e-4, 1e6)`.
pub fn fmt_g(x: f64) -> String {
    if x.is_nan() {
        return "nan".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if x == 0.0 {
        return "0".to_string();
    }

    // Round to six significant digits first so the notation choice sees the
    // rounded exponent (999999.5 belongs in scientific form).
    let sci = format!("{:.5e}", x);
    let (mantissa, exp) = sci.split_once('e').expect("scientific format");
    let exp: i32 = exp.parse().expect("scientific exponent");

    if exp < -4 || exp >= 6 {
        let mantissa = trim_zeros(mantissa);
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exp.abs())
    } else {
        let precision = (5 - exp).max(0) as usize;
        trim_zeros(&format!("{:.*}", precision, x))
    }
}

fn trim_zeros(s: &str) -> String {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s.to_string()
    }
}

/// Convert a linear power coefficient to decibels, clamped below at 1e-15.
pub fn to_db(linear: f64) -> f64 {
    10.0 * linear.max(1e-15).log10()
}

/// Convert decibels back to a linear power coefficient.
pub fn from_db(db: f64) -> f64 {
    10f64.powf(db / 10.0)
}

/// Writes the sweep as CSV with the run's column contract.
pub fn write_csv<W: Write + ?Sized>(
    writer: &mut W,
    points: &[SweepPoint],
    columns: Columns,
) -> Result<()> {
    write!(writer, "period,duty_cycle,N,wavelength")?;
    if columns.width1 {
        write!(writer, ",w1")?;
    }
    if columns.width2 {
        write!(writer, ",w2")?;
    }
    write!(writer, ",n1,n2,loss,R,T,phase_r,phase_t")?;
    if columns.group_delay {
        write!(writer, ",group_delay")?;
    }
    writeln!(writer)?;

    for point in points {
        write!(
            writer,
            "{},{},{},{}",
            fmt_g(point.period),
            fmt_g(point.duty_cycle),
            fmt_g(point.n_periods),
            fmt_g(point.wavelength)
        )?;
        if columns.width1 {
            write!(writer, ",{}", fmt_g(point.w1.unwrap_or(0.0)))?;
        }
        if columns.width2 {
            write!(writer, ",{}", fmt_g(point.w2.unwrap_or(0.0)))?;
        }
        write!(
            writer,
            ",{},{},{},{},{},{},{}",
            fmt_g(point.n1),
            fmt_g(point.n2),
            fmt_g(point.loss),
            fmt_g(point.reflectance),
            fmt_g(point.transmittance),
            fmt_g(point.phase_r),
            fmt_g(point.phase_t)
        )?;
        if columns.group_delay {
            write!(writer, ",{}", fmt_g(point.group_delay.unwrap_or(0.0)))?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

/// Writes the sweep as a JSON array of row objects.
pub fn write_json<W: Write + ?Sized>(writer: &mut W, points: &[SweepPoint]) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, points)?;
    writeln!(writer)?;
    Ok(())
}

/// Opens a buffered writer on the output file, or stdout when no path is
/// given, and hands it to the caller's emit closure.
pub fn with_sink<F>(path: Option<&Path>, emit: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> Result<()>,
{
    match path {
        Some(path) => {
            let file = File::create(path)?;
            let mut writer = BufWriter::new(file);
            emit(&mut writer)?;
            writer.flush()?;
        }
        None => {
            let stdout = std::io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            emit(&mut writer)?;
            writer.flush()?;
        }
    }
    Ok(())
}
