use super::ui;
use crate::api::EtfApi;
use crate::core::format::format_date_str;
use crate::core::types::HealthStatus;
use anyhow::{Context, Result};

pub fn render_health(base_url: &str, health: &HealthStatus) -> String {
    let checked = format_date_str(&health.timestamp).unwrap_or_else(|_| health.timestamp.clone());
    let status_style = if health.status == "healthy" {
        ui::StyleType::Highlight
    } else {
        ui::StyleType::Error
    };
    format!(
        "API {}: {} (version {}, checked {})",
        base_url,
        ui::style_text(&health.status, status_style),
        health.version,
        checked
    )
}

pub async fn run(api: &dyn EtfApi, base_url: &str) -> Result<()> {
    let health = api
        .health()
        .await
        .with_context(|| format!("API at {base_url} is not reachable"))?;
    println!("{}", render_health(base_url, &health));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_health() {
        let health = HealthStatus {
            status: "healthy".to_string(),
            timestamp: "2024-02-15T09:30:00.123456".to_string(),
            version: "0.1.0".to_string(),
        };

        let output = render_health("http://localhost:8000/", &health);
        assert!(output.contains("healthy"));
        assert!(output.contains("version 0.1.0"));
        assert!(output.contains("checked 2024.02.15"));
    }
}
