use tracing_subscriber::filter::Directive;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize logging on stderr.
///
/// `verbosity` 0 emits warnings and errors, 1 adds info, 2 or more adds debug.
/// `RUST_LOG` directives are honoured alongside.
pub fn init_logging(verbosity: u8) {
    let directive = match verbosity {
        0 => "jobdash=warn",
        1 => "jobdash=info",
        _ => "jobdash=debug",
    };

    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = directive.parse::<Directive>() {
        filter = filter.add_directive(directive);
    }

    // A subscriber may already be installed (tests); keep it.
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(filter)
        .try_init();
}
