use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color as TableColor, ContentArrangement, Table};

use rocketchat_notifier::config::SettingsField;

/// Table and cell creation helpers
pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn flag_cell(set: bool, color: TableColor) -> Cell {
    if set {
        Cell::new("yes").fg(color)
    } else {
        Cell::new("no")
    }
}

/// Renders the settings form fields in display order.
pub fn settings_fields_table(fields: &[SettingsField]) -> Table {
    let mut table = create_table();
    table.set_header(vec!["#", "Key", "Label", "Required", "Secure"]);

    let mut fields = fields.to_vec();
    fields.sort_by_key(|field| field.display_order);

    for field in fields {
        table.add_row(vec![
            Cell::new(field.display_order),
            Cell::new(field.key),
            Cell::new(field.label),
            flag_cell(field.required, TableColor::Yellow),
            flag_cell(field.secure, TableColor::Red),
        ]);
    }
    table
}
