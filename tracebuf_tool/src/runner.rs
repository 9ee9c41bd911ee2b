// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

use std::io;
use std::path;

use tracebuf_decode::display::TraceOrigin;
use tracebuf_decode::ClockNameTable;
use tracebuf_decode::PrintOutcome;
use tracebuf_decode::TraceContext;
use tracebuf_decode::TraceError;
use tracebuf_decode::TracePrinter;

use crate::discovery::LiveBuffer;
use crate::dump_to_file;
use crate::InputFile;
use crate::Mode;
use crate::ToolConfig;
use crate::ToolError;

/// What a successful run did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// This many bytes were dumped.
    Dumped(u64),
    /// The trace was decoded.
    Decoded(PrintOutcome),
}

/// Runs the selected action, writing user-facing output to `out`.
pub fn run<W: io::Write>(
    mode: &Mode,
    config: &ToolConfig,
    out: &mut W,
) -> Result<RunOutcome, ToolError> {
    return match mode {
        Mode::Dump { location, output } => {
            let buffer = location.resolve(config)?;
            let region = map_live(config, &buffer)?;
            let written = dump_to_file(region_bytes(&region), output)?;
            writeln!(
                out,
                "Wrote {} bytes log buffer to {}",
                written,
                output.display()
            )
            .map_err(TraceError::Output)?;
            Ok(RunOutcome::Dumped(written))
        }
        Mode::DecodeFile { input, clk_summary } => {
            let names = load_names(clk_summary.as_deref());
            let mut file = InputFile::open(input)
                .map_err(|e| TraceError::acquisition(format!("open {}", input.display()), e))?;
            let context = TraceContext::open(&mut file)?;
            let mut printer = TracePrinter::new(&names, &mut *out);
            let outcome = printer.print_trace(&context, &mut file, TraceOrigin::File)?;
            Ok(RunOutcome::Decoded(outcome))
        }
        Mode::DecodeLive {
            location,
            clk_summary,
        } => {
            let names = load_names(Some(
                clk_summary
                    .as_deref()
                    .unwrap_or(config.debugfs.clk_summary.as_path()),
            ));
            let buffer = location.resolve(config)?;
            let mut region = map_live(config, &buffer)?;
            let context = TraceContext::open(&mut region)?;
            let mut printer = TracePrinter::new(&names, &mut *out);
            let outcome = printer.print_trace(&context, &mut region, TraceOrigin::Memory)?;
            Ok(RunOutcome::Decoded(outcome))
        }
    };
}

fn load_names(path: Option<&path::Path>) -> ClockNameTable {
    return match path {
        Some(path) => ClockNameTable::load_or_empty(path),
        None => ClockNameTable::new(),
    };
}

#[cfg(unix)]
type LiveRegion = crate::MappedRegion;

#[cfg(unix)]
fn map_live(config: &ToolConfig, buffer: &LiveBuffer) -> Result<LiveRegion, ToolError> {
    return Ok(crate::MappedRegion::map(
        &config.mem_device,
        buffer.phys_addr,
        buffer.len,
    )?);
}

#[cfg(unix)]
fn region_bytes(region: &LiveRegion) -> &[u8] {
    return region.as_slice();
}

#[cfg(not(unix))]
type LiveRegion = tracebuf_decode::SliceSource<'static>;

#[cfg(not(unix))]
fn map_live(config: &ToolConfig, _buffer: &LiveBuffer) -> Result<LiveRegion, ToolError> {
    return Err(TraceError::acquisition(
        format!("map {}", config.mem_device.display()),
        io::Error::new(
            io::ErrorKind::Unsupported,
            "physical memory mapping is not supported on this platform",
        ),
    )
    .into());
}

#[cfg(not(unix))]
fn region_bytes(region: &LiveRegion) -> &[u8] {
    return region.data();
}
