use super::ui;
use crate::api::{EtfApi, EtfPage};
use crate::core::format::{format_currency, format_thousands};
use crate::core::types::EtfListQuery;
use anyhow::Result;
use comfy_table::Cell;

impl EtfPage {
    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Code"),
            ui::header_cell("Name"),
            ui::header_cell("Category"),
            ui::header_cell("Manager"),
            ui::header_cell("Price"),
            ui::header_cell("1M"),
            ui::header_cell("1Y"),
            ui::header_cell("Volume"),
        ]);

        for etf in &self.items {
            table.add_row(vec![
                Cell::new(&etf.code),
                Cell::new(&etf.name),
                Cell::new(&etf.category),
                Cell::new(&etf.manager),
                ui::right_cell(format_currency(etf.price)),
                ui::change_cell(etf.return_1m),
                ui::change_cell(etf.return_1y),
                ui::right_cell(format_thousands(etf.volume as f64)),
            ]);
        }

        let mut output = format!("{}\n\n", ui::style_text("ETF List", ui::StyleType::Title));
        if self.items.is_empty() {
            output.push_str("No ETFs match the given filters.");
        } else {
            output.push_str(&table.to_string());
        }

        if let Some(meta) = &self.meta {
            output.push_str(&format!(
                "\n\n{}",
                ui::style_text(
                    &format!(
                        "Page {} of {} ({} ETFs)",
                        meta.page,
                        meta.total_pages,
                        format_thousands(meta.total as f64)
                    ),
                    ui::StyleType::Subtle
                )
            ));
        }
        output
    }
}

pub async fn run(api: &dyn EtfApi, query: &EtfListQuery) -> Result<()> {
    let page = api
        .list_etfs(query)
        .await
        .map_err(|e| ui::load_failure("the ETF list", e))?;
    println!("{}", page.display_as_table());
    Ok(())
}
