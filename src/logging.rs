use std::io::Write;

use log::LevelFilter;

/// Install the global logger: `warn` by default, `debug` when verbose.
/// `RUST_LOG` still takes precedence over either.
pub fn init(verbose: bool) {
    let default = if verbose { LevelFilter::Debug } else { LevelFilter::Warn };

    let mut builder = env_logger::Builder::new();
    builder.filter_level(default).parse_default_env().format(|buf, record| {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        writeln!(buf, "[{}] {:<5} {}", timestamp, record.level(), record.args())
    });

    // a second init (tests) keeps the first logger
    let _ = builder.try_init();
}
