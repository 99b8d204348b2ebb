//! Log setup. `RUST_LOG` selects levels; the default is `info`, with
//! `-v` raising stratux crates to `debug` and `-vv` to `trace`.

use tracing_subscriber::EnvFilter;

pub fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "info,stratux_core=debug,stratux_feed=debug",
        _ => "info,stratux_core=trace,stratux_feed=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
