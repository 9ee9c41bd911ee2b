// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

use std::ffi;
use std::path;

use crate::discovery::parse_hex;
use crate::discovery::DebugfsPaths;
use crate::discovery::LiveBuffer;
use crate::ToolConfig;
use crate::ToolError;

/// Environment variable overriding the debugfs mount point.
pub const DEBUGFS_ENV: &str = "TRACEBUF_DEBUGFS";

/// Environment variable overriding the physical memory device.
pub const MEM_DEVICE_ENV: &str = "TRACEBUF_MEM_DEVICE";

/// Where a live trace buffer is found.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LiveLocation {
    /// Given on the command line.
    Explicit(LiveBuffer),
    /// Read from debugfs at run time.
    Auto,
}

impl LiveLocation {
    /// Returns the buffer location, reading debugfs for [`LiveLocation::Auto`].
    pub fn resolve(&self, config: &ToolConfig) -> Result<LiveBuffer, ToolError> {
        return match self {
            LiveLocation::Explicit(buffer) => Ok(*buffer),
            LiveLocation::Auto => Ok(LiveBuffer::discover(&config.debugfs)?),
        };
    }
}

/// The single action selected by a valid set of options.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Copy a live buffer verbatim to a file.
    Dump {
        /// Buffer to copy.
        location: LiveLocation,
        /// Destination file.
        output: path::PathBuf,
    },
    /// Decode a previously dumped buffer.
    DecodeFile {
        /// Dumped buffer.
        input: path::PathBuf,
        /// Optional clock-name table.
        clk_summary: Option<path::PathBuf>,
    },
    /// Decode a live buffer in place.
    DecodeLive {
        /// Buffer to decode.
        location: LiveLocation,
        /// Clock-name table; the debugfs table is used when absent.
        clk_summary: Option<path::PathBuf>,
    },
}

/// Parsed command-line options, before validation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Options {
    /// `-p`: physical address of the buffer.
    pub phys_addr: Option<u64>,
    /// `-l`: length of the buffer.
    pub length: Option<u64>,
    /// `-i`: dumped buffer to decode.
    pub input: Option<path::PathBuf>,
    /// `-o`: dump destination.
    pub output: Option<path::PathBuf>,
    /// `-c`: clock-name table.
    pub clk_summary: Option<path::PathBuf>,
    /// `-d`
    pub decode: bool,
    /// `-s`
    pub dump: bool,
    /// `-a`: discover the buffer through debugfs.
    pub auto: bool,
    /// Debugfs mount point.
    pub debugfs: path::PathBuf,
    /// Physical memory device.
    pub mem_device: path::PathBuf,
}

/// Builds the `tracebuf` command-line interface.
pub fn command() -> clap::Command {
    return clap::Command::new("tracebuf")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Dump or decode a firmware circular trace buffer")
        .after_help(
            "Examples:\n  \
             tracebuf -a -o trace.bin             dump the live buffer\n  \
             tracebuf -d -p 3e000000 -l 65536     decode a live buffer in place\n  \
             tracebuf -d -i trace.bin -c clk.txt  decode a dumped buffer on a host",
        )
        .arg(
            clap::arg!(-p --"phys-addr" <HEX> "Physical address of the trace buffer")
                .value_parser(parse_phys_addr),
        )
        .arg(
            clap::arg!(-l --length <LEN> "Length of the trace buffer in bytes")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            clap::arg!(-i --input <FILE> "Dumped trace buffer to decode")
                .value_parser(clap::value_parser!(path::PathBuf)),
        )
        .arg(
            clap::arg!(-o --output <FILE> "File to dump the trace buffer to")
                .value_parser(clap::value_parser!(path::PathBuf)),
        )
        .arg(
            clap::arg!(-c --"clk-summary" <FILE> "Clock-name table from the target")
                .value_parser(clap::value_parser!(path::PathBuf)),
        )
        .arg(clap::arg!(-d --decode "Decode the trace buffer"))
        .arg(clap::arg!(-s --dump "Dump the trace buffer to the output file"))
        .arg(clap::arg!(-a --auto "Read the buffer address and length from debugfs"))
        .arg(
            clap::arg!(--debugfs <DIR> "Debugfs mount point")
                .env(DEBUGFS_ENV)
                .default_value(DebugfsPaths::DEFAULT_ROOT)
                .value_parser(clap::value_parser!(path::PathBuf)),
        )
        .arg(
            clap::arg!(--"mem-device" <PATH> "Physical memory device")
                .env(MEM_DEVICE_ENV)
                .default_value(ToolConfig::DEFAULT_MEM_DEVICE)
                .value_parser(clap::value_parser!(path::PathBuf)),
        );
}

fn parse_phys_addr(text: &str) -> Result<u64, String> {
    return parse_hex(text).ok_or_else(|| format!("'{}' is not a hexadecimal address", text));
}

impl Options {
    /// Parses `args` (including the program name).
    pub fn try_parse_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<ffi::OsString> + Clone,
    {
        let matches = command().try_get_matches_from(args)?;
        return Ok(Self::from_matches(&matches));
    }

    /// Extracts options from already-parsed matches.
    pub fn from_matches(matches: &clap::ArgMatches) -> Self {
        let path = |id: &str| matches.get_one::<path::PathBuf>(id).cloned();
        return Self {
            phys_addr: matches.get_one::<u64>("phys-addr").copied(),
            length: matches.get_one::<u64>("length").copied(),
            input: path("input"),
            output: path("output"),
            clk_summary: path("clk-summary"),
            decode: matches.get_flag("decode"),
            dump: matches.get_flag("dump"),
            auto: matches.get_flag("auto"),
            debugfs: path("debugfs").unwrap_or_else(|| DebugfsPaths::DEFAULT_ROOT.into()),
            mem_device: path("mem-device")
                .unwrap_or_else(|| ToolConfig::DEFAULT_MEM_DEVICE.into()),
        };
    }

    /// Environment-derived settings.
    pub fn config(&self) -> ToolConfig {
        return ToolConfig::new(&self.debugfs, &self.mem_device);
    }

    /// Checks the options for conflicts and selects the action to run.
    /// Performs no I/O.
    pub fn validate(&self) -> Result<Mode, ToolError> {
        let explicit = self.phys_addr.is_some() || self.length.is_some();

        if self.input.is_some() && self.output.is_some() {
            return Err(ToolError::conflict(
                "cannot specify both input and output files",
            ));
        }

        if self.input.is_some() && (explicit || self.auto) {
            return Err(ToolError::conflict(
                "--input cannot be combined with --phys-addr, --length or --auto",
            ));
        }

        if self.phys_addr.is_some() != self.length.is_some() {
            return Err(ToolError::conflict(
                "--phys-addr and --length must be given together",
            ));
        }

        if self.auto && explicit {
            return Err(ToolError::conflict(
                "--auto replaces --phys-addr and --length",
            ));
        }

        if self.dump && self.decode {
            return Err(ToolError::conflict("cannot both dump and decode"));
        }

        let location = match (self.phys_addr, self.length) {
            (Some(phys_addr), Some(len)) => Some(LiveLocation::Explicit(LiveBuffer { phys_addr, len })),
            _ if self.auto => Some(LiveLocation::Auto),
            _ => None,
        };

        if self.dump || (self.output.is_some() && !self.decode) {
            let output = self.output.clone().ok_or_else(|| {
                ToolError::conflict("dump requires an output file (--output)")
            })?;
            let location = location.ok_or_else(|| {
                ToolError::conflict("dump requires --auto or --phys-addr with --length")
            })?;
            return Ok(Mode::Dump { location, output });
        }

        if self.decode {
            if self.output.is_some() {
                return Err(ToolError::conflict("--output cannot be used with --decode"));
            }

            let clk_summary = self.clk_summary.clone();
            if let Some(input) = &self.input {
                return Ok(Mode::DecodeFile {
                    input: input.clone(),
                    clk_summary,
                });
            }

            return match location {
                Some(location) => Ok(Mode::DecodeLive {
                    location,
                    clk_summary,
                }),
                None => Err(ToolError::conflict(
                    "decode needs an input file or a trace buffer address and length",
                )),
            };
        }

        return Err(ToolError::conflict(
            "nothing to do: use --decode, or --dump/--output",
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Options {
        let mut argv = vec!["tracebuf"];
        argv.extend_from_slice(args);
        return Options::try_parse_from(argv).unwrap();
    }

    fn validate(args: &[&str]) -> Result<Mode, ToolError> {
        return parse(args).validate();
    }

    fn explicit(phys_addr: u64, len: u64) -> LiveLocation {
        return LiveLocation::Explicit(LiveBuffer { phys_addr, len });
    }

    #[test]
    fn parses_all_options() {
        let options = parse(&[
            "-p", "0x3e000000", "-l", "4096", "-c", "clk.txt", "-d", "--debugfs", "/dbg",
            "--mem-device", "/tmp/mem",
        ]);
        assert_eq!(Some(0x3e00_0000), options.phys_addr);
        assert_eq!(Some(4096), options.length);
        assert_eq!(Some(path::PathBuf::from("clk.txt")), options.clk_summary);
        assert!(options.decode);
        assert!(!options.dump);
        assert_eq!(path::PathBuf::from("/dbg"), options.debugfs);
        assert_eq!(path::PathBuf::from("/tmp/mem"), options.mem_device);
    }

    #[test]
    fn bad_address_is_a_parse_error() {
        assert!(Options::try_parse_from(["tracebuf", "-p", "zz", "-l", "1"]).is_err());
    }

    #[test]
    fn valid_combinations() {
        let cases: &[(&[&str], Mode)] = &[
            (
                &["-a", "-o", "out.bin"],
                Mode::Dump {
                    location: LiveLocation::Auto,
                    output: "out.bin".into(),
                },
            ),
            (
                &["-s", "-p", "1000", "-l", "64", "-o", "out.bin"],
                Mode::Dump {
                    location: explicit(0x1000, 64),
                    output: "out.bin".into(),
                },
            ),
            (
                &["-d", "-a"],
                Mode::DecodeLive {
                    location: LiveLocation::Auto,
                    clk_summary: None,
                },
            ),
            (
                &["-d", "-p", "1000", "-l", "64", "-c", "clk"],
                Mode::DecodeLive {
                    location: explicit(0x1000, 64),
                    clk_summary: Some("clk".into()),
                },
            ),
            (
                &["-d", "-i", "in.bin"],
                Mode::DecodeFile {
                    input: "in.bin".into(),
                    clk_summary: None,
                },
            ),
        ];

        for (args, expected) in cases {
            assert_eq!(expected, &validate(args).unwrap(), "args {:?}", args);
        }
    }

    #[test]
    fn conflicting_combinations() {
        let cases: &[&[&str]] = &[
            &["-d", "-i", "in.bin", "-o", "out.bin"],
            &["-d", "-i", "in.bin", "-a"],
            &["-d", "-i", "in.bin", "-p", "1000", "-l", "64"],
            &["-d", "-p", "1000"],
            &["-d", "-l", "64"],
            &["-a", "-p", "1000", "-l", "64", "-o", "out.bin"],
            &["-s", "-d", "-a", "-o", "out.bin"],
            &["-s", "-a"],
            &["-s", "-o", "out.bin"],
            &["-o", "out.bin"],
            &["-d"],
            &["-d", "-a", "-o", "out.bin"],
            &["-i", "in.bin"],
            &[],
        ];

        for args in cases {
            match validate(args) {
                Err(ToolError::OptionConflict(_)) => {}
                other => panic!("args {:?}: unexpected {:?}", args, other),
            }
        }
    }

    #[test]
    fn conflicts_report_options_stage() {
        let err = validate(&[]).unwrap_err();
        assert_eq!("options", err.stage());
    }
}
