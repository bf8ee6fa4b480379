//! Plain tabular reporting of sweep results.

use std::io::{self, Write};

use crate::sweep::VelocitySweepResult;

/// Write the sweep roots as a plain table, one block per mode.
///
/// Columns: velocity, damping `Re(p)`, frequency `Im(p)`, and the scaled
/// determinant-style status. Non-convergent points print a dash.
pub fn write_report<W: Write>(out: &mut W, result: &VelocitySweepResult) -> io::Result<()> {
    for (kmode, roots) in result.roots.iter().enumerate() {
        writeln!(out, "mode {kmode}")?;
        writeln!(out, "{:>12} {:>14} {:>14}", "U", "Re(p)", "Im(p)")?;
        for (&u, root) in result.velocities.iter().zip(roots.iter()) {
            match root {
                Some(p) => writeln!(out, "{u:>12.4} {:>14.6} {:>14.6}", p.re, p.im)?,
                None => writeln!(out, "{u:>12.4} {:>14} {:>14}", "-", "-")?,
            }
        }
        if let Some(onset) = result.flutter_onset(kmode) {
            writeln!(
                out,
                "flutter onset: U = {:.4}, omega = {:.6}",
                onset.velocity, onset.frequency
            )?;
        }
        writeln!(out)?;
    }
    Ok(())
}
