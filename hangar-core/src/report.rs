//! Report formatting utilities for ship listings.

use std::fmt::Write;

use serde::Serialize;

use crate::domain::Ship;
use crate::rating::year_of_millis;

/// Render ships as a Markdown table.
pub fn render_ships_markdown(ships: &[Ship]) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "# Hangar Ships\n");
    if ships.is_empty() {
        let _ = writeln!(output, "No ships found.");
        return output;
    }
    let _ = writeln!(
        output,
        "| Id | Name | Planet | Type | Year | Used | Speed | Crew | Rating |"
    );
    let _ = writeln!(output, "|---|---|---|---|---|---|---|---|---|");
    for ship in ships {
        let _ = writeln!(
            output,
            "| {} | {} | {} | {} | {} | {} | {:.2} | {} | {:.2} |",
            ship.id,
            escape_cell(&ship.name),
            escape_cell(&ship.planet),
            ship.ship_type,
            production_year_label(ship.prod_date),
            if ship.is_used { "yes" } else { "no" },
            ship.speed,
            ship.crew_size,
            ship.rating
        );
    }
    output
}

/// Render ships as plain text, one block per ship.
pub fn render_ships_text(ships: &[Ship]) -> String {
    let mut output = String::new();
    if ships.is_empty() {
        let _ = writeln!(output, "No ships found.");
        return output;
    }
    for ship in ships {
        append_ship_text(&mut output, ship);
        let _ = writeln!(output);
    }
    output
}

/// Render a single ship as plain text.
pub fn render_ship_text(ship: &Ship) -> String {
    let mut output = String::new();
    append_ship_text(&mut output, ship);
    output
}

/// Render any serializable payload as JSON.
pub fn render_json<T: Serialize + ?Sized>(payload: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(payload)
}

fn append_ship_text(output: &mut String, ship: &Ship) {
    let _ = writeln!(output, "Ship #{}: {}", ship.id, ship.name);
    let _ = writeln!(output, "Planet: {}", ship.planet);
    let _ = writeln!(output, "Type: {}", ship.ship_type);
    let _ = writeln!(output, "Year: {}", production_year_label(ship.prod_date));
    let _ = writeln!(output, "Used: {}", if ship.is_used { "yes" } else { "no" });
    let _ = writeln!(output, "Speed: {:.2}", ship.speed);
    let _ = writeln!(output, "Crew: {}", ship.crew_size);
    let _ = writeln!(output, "Rating: {:.2}", ship.rating);
}

fn production_year_label(prod_date: i64) -> String {
    year_of_millis(prod_date)
        .map(|year| year.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn escape_cell(value: &str) -> String {
    value.replace('|', "\\|")
}
