//! Переключение magnetic_node logger'а на tracing Bevy
//!
//! До старта App работает ConsoleLogger (LogPlugin ещё не поднят),
//! дальше сообщения core идут в тот же вывод, что и логи Bevy.

use bevy::prelude::*;
use magnetic_node::logger::{set_logger, LogLevel, LogPrinter};

pub struct LogBridgePlugin;

impl Plugin for LogBridgePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, install_bevy_logger);
    }
}

struct BevyLogPrinter;

impl LogPrinter for BevyLogPrinter {
    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Debug => debug!(target: "magnetic_node", "{}", message),
            LogLevel::Info => info!(target: "magnetic_node", "{}", message),
            LogLevel::Warning => warn!(target: "magnetic_node", "{}", message),
            LogLevel::Error => error!(target: "magnetic_node", "{}", message),
        }
    }
}

fn install_bevy_logger() {
    set_logger(Box::new(BevyLogPrinter));
    info!("magnetic_node logger routed to Bevy tracing");
}
