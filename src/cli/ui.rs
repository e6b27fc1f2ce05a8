use crate::api::ApiError;
use crate::core::format::format_signed_percent;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    Label,
    Highlight,
    Error,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::Label => style(text).bold(),
        StyleType::Highlight => style(text).green().bold(),
        StyleType::Error => style(text).red(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates a styled header cell for a table.
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

pub fn right_cell(text: impl Into<String>) -> Cell {
    Cell::new(text.into()).set_alignment(CellAlignment::Right)
}

/// Formats an `Option<T>` into a `Cell`. `None` is displayed as "N/A".
pub fn format_optional_cell<T>(value: Option<T>, format_fn: impl Fn(T) -> String) -> Cell {
    value.map_or(
        Cell::new("N/A")
            .fg(Color::DarkGrey)
            .set_alignment(CellAlignment::Right),
        |v| right_cell(format_fn(v)),
    )
}

/// Creates a cell for displaying a signed percentage change. Korean market
/// convention: gains are red, losses are blue.
pub fn change_cell(change: f64) -> Cell {
    let color = if change >= 0.0 {
        Color::Red
    } else {
        Color::Blue
    };
    right_cell(format_signed_percent(change)).fg(color)
}

/// Creates a new `indicatif::ProgressBar` with standard styling.
pub fn new_progress_bar(len: u64, with_message: bool) -> ProgressBar {
    let template = if with_message {
        "{spinner:.green} {msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})"
    } else {
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})"
    };

    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::with_template(template)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}

/// Wraps a failed API call with what was being loaded. A body that does not
/// decode usually means the server omits fields the data contract requires,
/// so the message says so.
pub fn load_failure(what: &str, err: ApiError) -> anyhow::Error {
    let context = match err {
        ApiError::Decode(_) => format!(
            "Failed to load {what}: the response does not match the expected ETF data contract"
        ),
        _ => format!("Failed to load {what}"),
    };
    anyhow::Error::new(err).context(context)
}

/// Renders a failed command for the terminal.
///
/// With `show_details` the full error chain and a diagnostic id (the API error
/// code, or the HTTP status) are included; otherwise they are suppressed. Both
/// forms tell the user how to retry or go back to the listing.
pub fn error_report(err: &anyhow::Error, show_details: bool) -> String {
    let mut output = format!(
        "{}\nSomething went wrong while loading this page.\n",
        style_text("Error", StyleType::Error)
    );

    if show_details {
        output.push_str(&format!("\n  {err:#}\n"));
        let api_error = err.chain().find_map(|e| e.downcast_ref::<ApiError>());
        let error_id = api_error.and_then(|e| {
            e.error_info()
                .map(|info| info.code.clone())
                .or_else(|| e.status().map(|s| s.as_u16().to_string()))
        });
        if let Some(id) = error_id {
            output.push_str(&format!(
                "  {}\n",
                style_text(&format!("Error ID: {id}"), StyleType::Subtle)
            ));
        }
    }

    output.push_str(&format!(
        "\n{} run the same command again\n{} etf-helper list",
        style_text("Retry:", StyleType::Label),
        style_text("Home: ", StyleType::Label)
    ));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::envelope::ErrorInfo;
    use crate::core::types::EtfSummary;
    use anyhow::Context;
    use reqwest::StatusCode;

    fn not_found() -> anyhow::Error {
        Err::<(), _>(ApiError::Status {
            status: StatusCode::NOT_FOUND,
            error: Some(ErrorInfo::new("NOT_FOUND", "ETF not found")),
            body: String::new(),
        })
        .context("Failed to load ETF 000000")
        .unwrap_err()
    }

    #[test]
    fn test_error_report_with_details() {
        let report = error_report(&not_found(), true);

        assert!(report.contains("Failed to load ETF 000000"));
        assert!(report.contains("ETF not found"));
        assert!(report.contains("Error ID: NOT_FOUND"));
        assert!(report.contains("etf-helper list"));
    }

    #[test]
    fn test_error_report_hides_details() {
        let report = error_report(&not_found(), false);

        assert!(!report.contains("ETF not found"));
        assert!(!report.contains("Error ID"));
        assert!(report.contains("Retry:"));
        assert!(report.contains("etf-helper list"));
    }

    #[test]
    fn test_error_report_status_id_and_plain_errors() {
        let status_only = anyhow::Error::new(ApiError::Status {
            status: StatusCode::BAD_GATEWAY,
            error: None,
            body: String::new(),
        });
        assert!(error_report(&status_only, true).contains("Error ID: 502"));

        let plain = anyhow::anyhow!("config is broken");
        let report = error_report(&plain, true);
        assert!(report.contains("config is broken"));
        assert!(!report.contains("Error ID"));
    }

    #[test]
    fn test_load_failure_names_contract_mismatch() {
        let decode =
            serde_json::from_str::<EtfSummary>(r#"{"code":"069500"}"#).unwrap_err();
        let err = load_failure("the ETF list", ApiError::Decode(decode));
        assert!(err.to_string().contains("does not match the expected ETF data contract"));
        assert!(format!("{err:#}").contains("missing field"));

        let other = load_failure("ETF 069500", ApiError::InvalidQuery("bad".to_string()));
        assert_eq!(other.to_string(), "Failed to load ETF 069500");
    }

    #[test]
    fn test_change_cell_text() {
        assert_eq!(change_cell(1.5).content(), "+1.50%");
        assert_eq!(change_cell(-0.25).content(), "-0.25%");
    }
}
