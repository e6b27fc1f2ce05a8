use super::ui;
use crate::api::EtfApi;
use crate::core::format::{format_currency, format_date, format_thousands};
use crate::core::types::{EtfDetail, EtfHolding};
use anyhow::{Context, Result};
use comfy_table::Cell;
use tracing::warn;

fn holdings_table(holdings: &[EtfHolding]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("#"),
        ui::header_cell("Holding"),
        ui::header_cell("Weight (%)"),
    ]);
    for (i, holding) in holdings.iter().enumerate() {
        table.add_row(vec![
            ui::right_cell((i + 1).to_string()),
            Cell::new(&holding.name),
            ui::right_cell(format!("{:.2}%", holding.weight)),
        ]);
    }
    table.to_string()
}

pub fn render_holdings(code: &str, holdings: &[EtfHolding]) -> String {
    let mut output = format!(
        "{}\n\n",
        ui::style_text(&format!("Holdings of {code}"), ui::StyleType::Title)
    );
    if holdings.is_empty() {
        output.push_str("No holdings reported.");
        return output;
    }
    output.push_str(&holdings_table(holdings));

    let total: f64 = holdings.iter().map(|h| h.weight).sum();
    output.push_str(&format!(
        "\n\n{} {:.2}%",
        ui::style_text("Total weight:", ui::StyleType::Label),
        total
    ));
    output
}

impl EtfDetail {
    pub fn display_as_table(&self) -> String {
        let etf = &self.summary;

        let mut info = ui::new_styled_table();
        info.set_header(vec![ui::header_cell("Field"), ui::header_cell("Value")]);
        let rows = [
            ("Code", etf.code.clone()),
            ("Category", etf.category.clone()),
            ("Manager", etf.manager.clone()),
            ("Listed", format_date(&etf.listed_at)),
            ("Fee", format!("{:.2}%", etf.fee)),
            ("NAV", format_currency(etf.nav)),
            ("Price", format_currency(etf.price)),
            ("Volume", format_thousands(etf.volume as f64)),
            ("Updated", format_date(&etf.updated_at)),
        ];
        for (label, value) in rows {
            info.add_row(vec![Cell::new(label), ui::right_cell(value)]);
        }

        let mut returns = ui::new_styled_table();
        returns.set_header(vec![
            ui::header_cell("1M"),
            ui::header_cell("3M"),
            ui::header_cell("6M"),
            ui::header_cell("1Y"),
        ]);
        returns.add_row(vec![
            ui::change_cell(etf.return_1m),
            ui::change_cell(etf.return_3m),
            ui::change_cell(etf.return_6m),
            ui::change_cell(etf.return_1y),
        ]);

        let mut output = format!(
            "{}\n\n{}\n\n{}\n\n{}",
            ui::style_text(&etf.name, ui::StyleType::Title),
            info,
            ui::style_text("Returns", ui::StyleType::Label),
            returns
        );

        output.push_str("\n\n");
        output.push_str(&render_holdings(&etf.code, &self.holdings));
        if !self.holdings_within_bounds() {
            output.push_str(&format!(
                "\n{}",
                ui::style_text(
                    "Holding weights add up to more than 100%",
                    ui::StyleType::Error
                )
            ));
        }
        output
    }
}

/// Loads the detail page. Holdings are fetched from their own endpoint only
/// when the ETF exists and its detail payload carries none.
pub async fn load(api: &dyn EtfApi, code: &str) -> Result<EtfDetail> {
    let mut detail = api
        .get_etf(code)
        .await
        .map_err(|e| ui::load_failure(&format!("ETF {code}"), e))?;

    if detail.holdings.is_empty() {
        match api.get_holdings(code).await {
            Ok(holdings) => detail.holdings = holdings,
            Err(e) => warn!(error = %e, code, "Holdings unavailable"),
        }
    }
    if !detail.holdings_within_bounds() {
        warn!(
            code,
            total = detail.holdings_weight_total(),
            "Holding weights exceed 100%"
        );
    }
    Ok(detail)
}

pub async fn run(api: &dyn EtfApi, code: &str) -> Result<()> {
    let detail = load(api, code).await?;
    println!("{}", detail.display_as_table());
    Ok(())
}

pub async fn run_holdings(api: &dyn EtfApi, code: &str) -> Result<()> {
    let holdings = api
        .get_holdings(code)
        .await
        .with_context(|| format!("Failed to load holdings of {code}"))?;
    println!("{}", render_holdings(code, &holdings));
    Ok(())
}
