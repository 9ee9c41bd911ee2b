// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

use std::env;
use std::io;
use std::io::Write;
use std::process::ExitCode;

use tracebuf_tool::Options;
use tracebuf_tool::ToolError;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let options = match Options::try_parse_from(env::args_os()) {
        Ok(options) => options,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let result = options.validate().and_then(|mode| {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        let outcome = tracebuf_tool::run(&mode, &options.config(), &mut out)?;
        log::debug!("{:?}", outcome);
        return Ok(());
    });

    return match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    };
}

fn report(e: &ToolError) {
    let stderr = io::stderr();
    let mut err = stderr.lock();
    let _ = writeln!(err, "tracebuf: {}: {}", e.stage(), e);
    if let ToolError::OptionConflict(_) = e {
        let _ = writeln!(err, "{}", tracebuf_tool::command().render_usage());
    }
}
