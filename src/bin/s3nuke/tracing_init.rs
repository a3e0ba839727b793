// Initializes the tracing subscriber for the CLI binary.

use std::env;
use std::io::IsTerminal;

use s3nuke::config::TracingConfig;

const EVENT_FILTER_ENV_VAR: &str = "RUST_LOG";

pub fn init_tracing(config: &TracingConfig) {
    let subscriber_builder = tracing_subscriber::fmt()
        .with_writer(std::io::stdout)
        .compact()
        .with_ansi(!config.disable_color_tracing && std::io::stdout().is_terminal());

    let mut show_target = true;
    let tracing_level = config.tracing_level;
    let event_filter = if env::var(EVENT_FILTER_ENV_VAR).is_ok() {
        env::var(EVENT_FILTER_ENV_VAR).unwrap()
    } else {
        show_target = false;
        format!("s3nuke={tracing_level}")
    };

    let subscriber_builder = subscriber_builder
        .with_env_filter(event_filter)
        .with_target(show_target);
    if config.json_tracing {
        subscriber_builder.json().init();
    } else {
        subscriber_builder.init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusty_fork::rusty_fork_test;

    rusty_fork_test! {
        #[test]
        fn init_json_tracing() {
            init_tracing(&TracingConfig {
                tracing_level: log::Level::Info,
                json_tracing: true,
                disable_color_tracing: false,
            });
        }

        #[test]
        fn init_normal_tracing() {
            // This code is used to test purpose only and runs in separated processes.
            unsafe { env::remove_var(EVENT_FILTER_ENV_VAR) };

            init_tracing(&TracingConfig {
                tracing_level: log::Level::Info,
                json_tracing: false,
                disable_color_tracing: false,
            });
        }

        #[test]
        fn init_disable_color_tracing() {
            init_tracing(&TracingConfig {
                tracing_level: log::Level::Info,
                json_tracing: false,
                disable_color_tracing: true,
            });
        }

        #[test]
        fn init_with_env() {
            // This code is used to test purpose only and runs in separated processes.
            unsafe { env::set_var(EVENT_FILTER_ENV_VAR, "trace") };

            init_tracing(&TracingConfig {
                tracing_level: log::Level::Info,
                json_tracing: false,
                disable_color_tracing: true,
            });
        }
    }
}
