// SPDX-License-Identifier: GPL-3.0-or-later

use rostargets::{args, config, context, modes};
use std::process::ExitCode;

fn main() -> anyhow::Result<ExitCode> {
    let arguments = args::Arguments::try_from(args::cli().get_matches())?;

    // `RUST_LOG` wins over the verbosity flags.
    let default_level = match arguments.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();
    log::info!(
        "{} {} on {}/{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    );
    log::info!("{arguments}");

    let context = context::Context::capture()?;
    log::info!("{context}");
    let settings = config::Loader::load(&context, &arguments.config)?;
    log::info!("{settings}");

    let mode = modes::Mode::configure(context, arguments, settings)?;
    let status = mode.run();
    log::debug!("Finished with {status:?}");
    Ok(status)
}
