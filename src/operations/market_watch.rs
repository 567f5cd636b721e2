// Read-only market price monitor running beside the scheduler
use crate::client::{GameApi, RemoteError};
use crate::config::MarketConfig;
use crate::models::ResourceInfo;
use crate::shutdown::StopSignal;
use crate::{o_debug, o_error, o_info};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct PriceDeviation {
    pub resource: String,
    /// Current price as a percentage of the base price
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PriceReport {
    pub high: Vec<PriceDeviation>,
    pub low: Vec<PriceDeviation>,
}

/// Split market prices into those above `high_percent` and below `low_percent`
/// of their catalog base price. Unknown resources and non-positive base prices
/// are ignored; market order is kept.
pub fn price_deviations(
    catalog: &[(String, ResourceInfo)],
    prices: &[(String, f64)],
    high_percent: f64,
    low_percent: f64,
) -> PriceReport {
    let mut report = PriceReport::default();

    for (resource, current) in prices {
        let Some((_, info)) = catalog.iter().find(|(name, _)| name == resource) else {
            continue;
        };
        if info.base_price <= 0.0 {
            continue;
        }

        let percent = current / info.base_price * 100.0;
        let deviation = PriceDeviation {
            resource: resource.clone(),
            percent,
        };
        if percent > high_percent {
            report.high.push(deviation);
        } else if percent < low_percent {
            report.low.push(deviation);
        }
    }

    report
}

pub struct PriceMonitor {
    api: GameApi,
    config: MarketConfig,
    stop: StopSignal,
}

impl PriceMonitor {
    pub fn new(api: GameApi, config: MarketConfig, stop: StopSignal) -> Self {
        Self { api, config, stop }
    }

    /// Check prices every `poll_interval_seconds` until stopped. Errors are
    /// logged and retried on the next interval.
    pub async fn run(self) {
        let interval = Duration::from_secs_f64(self.config.poll_interval_seconds);
        o_info!("📈 Price monitor started, checking every {:.1}s", interval.as_secs_f64());

        loop {
            match self.check_once().await {
                Ok(report) => self.log_report(&report),
                Err(e) => o_error!("📈 Price check failed: {}", e),
            }

            if !self.stop.sleep(interval).await {
                break;
            }
        }

        o_info!("📈 Price monitor stopped");
    }

    pub async fn check_once(&self) -> Result<PriceReport, RemoteError> {
        let catalog = self.api.resource_catalog().await?;
        let prices = self.api.market_prices().await?;
        Ok(price_deviations(
            &catalog,
            &prices,
            self.config.high_percent,
            self.config.low_percent,
        ))
    }

    fn log_report(&self, report: &PriceReport) {
        if report.high.is_empty() {
            o_debug!("📈 No resource above {}%", self.config.high_percent);
        }
        for deviation in &report.high {
            o_info!("📈 {}: {:.2}% of base price", deviation.resource, deviation.percent);
        }

        if report.low.is_empty() {
            o_debug!("📉 No resource below {}%", self.config.low_percent);
        }
        for deviation in &report.low {
            o_info!("📉 {}: {:.2}% of base price", deviation.resource, deviation.percent);
        }
    }
}
