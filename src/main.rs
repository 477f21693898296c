use std::{env, panic, process};

use backtrace::Backtrace;
use clap::Parser;

use netproject::{
    cli::{GlobalOptions, Options},
    replay::ReplayError,
    ErrorDisplay,
};

/// Exit status for scenarios that can't be loaded or don't make sense, as
/// opposed to failures writing the result.
const SCENARIO_ERROR_EXIT_CODE: i32 = 2;

fn main() {
    install_panic_hook();

    let options = Options::parse();
    init_logger(&options.global);

    if let Err(err) = options.run() {
        log::error!("{}", ErrorDisplay(&*err));

        let code = if err.downcast_ref::<ReplayError>().is_some() {
            SCENARIO_ERROR_EXIT_CODE
        } else {
            1
        };
        process::exit(code);
    }
}

fn init_logger(global: &GlobalOptions) {
    let log_env = env_logger::Env::default().default_filter_or(global.log_filter());

    env_logger::Builder::from_env(log_env)
        .format_module_path(false)
        .format_timestamp(None)
        // Continuation lines line up after the `[LEVEL] ` label.
        .format_indent(Some(8))
        .write_style(global.color.into())
        .init();
}

fn install_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        let payload = panic_info.payload();
        let message = payload
            .downcast_ref::<&str>()
            .map(|message| message.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "<no message>".to_owned());

        log::error!(
            "netproject {} panicked: {}",
            env!("CARGO_PKG_VERSION"),
            message
        );

        if let Some(location) = panic_info.location() {
            log::error!("  at {}:{}", location.file(), location.line());
        }

        log::error!("Re-running with -vv and the same scenario shows the last events handled.");

        // The backtrace crate doesn't read RUST_BACKTRACE itself.
        match env::var("RUST_BACKTRACE").as_deref() {
            Ok("1") | Ok("full") => eprintln!("{:?}", Backtrace::new()),
            _ => eprintln!("note: set RUST_BACKTRACE=1 to print a backtrace."),
        }

        process::exit(101);
    }));
}
