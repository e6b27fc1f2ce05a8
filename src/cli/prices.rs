use super::ui;
use crate::api::EtfApi;
use crate::core::format::{format_currency, format_date, format_signed_percent};
use crate::core::types::{PriceHistoryPoint, PricePeriod};
use anyhow::{Context, Result};

fn pct_change(from: f64, to: f64) -> Option<f64> {
    if from > 0.0 {
        Some((to - from) / from * 100.0)
    } else {
        None
    }
}

/// Renders a price series in the order given, with the change against the
/// previous point and over the whole window.
pub fn render_prices(code: &str, period: PricePeriod, points: &[PriceHistoryPoint]) -> String {
    let mut output = format!(
        "{}\n\n",
        ui::style_text(
            &format!("Price history of {code} ({period})"),
            ui::StyleType::Title
        )
    );
    if points.is_empty() {
        output.push_str("No price data for this period.");
        return output;
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Date"),
        ui::header_cell("Price"),
        ui::header_cell("Change"),
    ]);

    let mut previous: Option<f64> = None;
    for point in points {
        let change = previous.and_then(|p| pct_change(p, point.price));
        table.add_row(vec![
            ui::right_cell(format_date(&point.date)),
            ui::right_cell(format_currency(point.price)),
            ui::format_optional_cell(change, format_signed_percent),
        ]);
        previous = Some(point.price);
    }
    output.push_str(&table.to_string());

    if let (Some(first), Some(last)) = (points.first(), points.last()) {
        if let Some(change) = pct_change(first.price, last.price) {
            output.push_str(&format!(
                "\n\n{} {} ({} → {})",
                ui::style_text("Period change:", ui::StyleType::Label),
                format_signed_percent(change),
                format_date(&first.date),
                format_date(&last.date)
            ));
        }
    }
    output
}

pub async fn run(api: &dyn EtfApi, code: &str, period: PricePeriod) -> Result<()> {
    let points = api
        .get_prices(code, period)
        .await
        .with_context(|| format!("Failed to load price history of {code}"))?;
    println!("{}", render_prices(code, period, &points));
    Ok(())
}
