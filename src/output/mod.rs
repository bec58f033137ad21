mod styling;
mod tables;

pub use styling::{bright_green, bright_red, dim};
pub use tables::settings_fields_table;

use styling::magenta_bold;

/// Prints the notifier banner to stderr.
///
/// Displays the tool name, version, and description at the start of execution.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        magenta_bold("🚀 Rocket.Chat Notifier"),
        dim(env!("CARGO_PKG_VERSION")),
        dim("CI stage notifications for Rocket.Chat")
    );
}
