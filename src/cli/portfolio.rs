use super::ui;
use crate::api::{ApiError, EtfApi};
use crate::core::format::{format_currency, format_signed_percent, format_thousands};
use crate::core::types::PortfolioItem;
use anyhow::Result;
use comfy_table::Cell;
use futures::future::join_all;
use std::collections::{BTreeSet, HashMap};
use tracing::warn;

/// Portfolio positions with totals over the positions that have a price.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioSummary {
    pub items: Vec<PortfolioItem>,
    pub total_cost: f64,
    pub total_value: f64,
    pub profit_loss: f64,
    pub return_pct: Option<f64>,
    /// Positions left out of the totals for lack of a current price.
    pub unpriced: usize,
}

impl PortfolioSummary {
    pub fn new(items: Vec<PortfolioItem>) -> Self {
        let mut total_cost = 0.0;
        let mut total_value = 0.0;
        let mut unpriced = 0;
        for item in &items {
            match item.market_value() {
                Some(value) => {
                    total_cost += item.cost_basis();
                    total_value += value;
                }
                None => unpriced += 1,
            }
        }
        let profit_loss = total_value - total_cost;
        let return_pct = (total_cost > 0.0).then(|| profit_loss / total_cost * 100.0);

        Self {
            items,
            total_cost,
            total_value,
            profit_loss,
            return_pct,
            unpriced,
        }
    }

    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("ETF"),
            ui::header_cell("Quantity"),
            ui::header_cell("Avg Price"),
            ui::header_cell("Current"),
            ui::header_cell("Value"),
            ui::header_cell("P/L"),
            ui::header_cell("Return"),
        ]);

        for item in &self.items {
            let return_cell = match item.return_pct() {
                Some(pct) => ui::change_cell(pct),
                None => ui::format_optional_cell(None::<f64>, format_signed_percent),
            };
            table.add_row(vec![
                Cell::new(format!("{} ({})", item.etf_name, item.etf_code)),
                ui::right_cell(format_thousands(item.quantity)),
                ui::right_cell(format_currency(item.avg_price)),
                ui::format_optional_cell(item.current_price, format_currency),
                ui::format_optional_cell(item.market_value(), format_currency),
                ui::format_optional_cell(item.profit_loss(), format_currency),
                return_cell,
            ]);
        }

        let mut output = format!(
            "{}\n\n",
            ui::style_text("Portfolio", ui::StyleType::Title)
        );
        if self.items.is_empty() {
            output.push_str("No positions configured.");
            return output;
        }
        output.push_str(&table.to_string());

        output.push_str(&format!(
            "\n\nTotal Value: {}\nTotal P/L:   {} ({})",
            ui::style_text(&format_currency(self.total_value), ui::StyleType::Highlight),
            ui::style_text(&format_currency(self.profit_loss), ui::StyleType::Label),
            self.return_pct
                .map_or("N/A".to_string(), format_signed_percent)
        ));
        if self.unpriced > 0 {
            output.push_str(&format!(
                "\n{}",
                ui::style_text(
                    &format!("{} position(s) without a current price", self.unpriced),
                    ui::StyleType::Error
                )
            ));
        }
        output
    }
}

/// Fetches the current price of every distinct ETF in `items` concurrently.
pub async fn fetch_quotes(
    api: &dyn EtfApi,
    items: &[PortfolioItem],
) -> HashMap<String, Result<f64, ApiError>> {
    let codes: BTreeSet<&str> = items.iter().map(|i| i.etf_code.as_str()).collect();

    let pb = ui::new_progress_bar(codes.len() as u64, true);
    pb.set_message("Fetching prices...");

    let quote_futures = codes.into_iter().map(|code| {
        let pb_clone = pb.clone();
        async move {
            let res = api.get_etf(code).await.map(|detail| detail.summary.price);
            pb_clone.inc(1);
            (code.to_string(), res)
        }
    });

    let quotes = join_all(quote_futures).await.into_iter().collect();
    pb.finish_and_clear();
    quotes
}

/// Sets each position's current price from `quotes`. A failed quote keeps the
/// configured price, if any.
pub fn apply_quotes(
    items: &[PortfolioItem],
    quotes: &HashMap<String, Result<f64, ApiError>>,
) -> Vec<PortfolioItem> {
    items
        .iter()
        .map(|item| {
            let mut item = item.clone();
            match quotes.get(&item.etf_code) {
                Some(Ok(price)) => item.current_price = Some(*price),
                Some(Err(e)) => warn!(code = %item.etf_code, error = %e, "Price unavailable"),
                None => {}
            }
            item
        })
        .collect()
}

pub async fn run(api: &dyn EtfApi, items: &[PortfolioItem]) -> Result<()> {
    let quotes = fetch_quotes(api, items).await;
    let summary = PortfolioSummary::new(apply_quotes(items, &quotes));
    println!("{}", summary.display_as_table());
    Ok(())
}
