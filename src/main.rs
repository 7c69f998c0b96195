use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use sail_conditions::{ConditionsService, SailConfig, logging};
use tracing::info;

const USAGE: &str = "usage: sail-conditions <latitude> <longitude> <YYYY-MM-DD> [--config FILE]";

struct Args {
    latitude: f64,
    longitude: f64,
    date: String,
    config: Option<PathBuf>,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Args> {
    let mut positional = Vec::new();
    let mut config = None;

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let path = args.next().context("--config needs a file path")?;
                config = Some(PathBuf::from(path));
            }
            "--help" | "-h" => bail!(USAGE),
            _ => positional.push(arg),
        }
    }

    let [latitude, longitude, date] = <[String; 3]>::try_from(positional)
        .map_err(|_| anyhow::anyhow!(USAGE))?;

    Ok(Args {
        latitude: latitude
            .parse()
            .with_context(|| format!("invalid latitude: {latitude}"))?,
        longitude: longitude
            .parse()
            .with_context(|| format!("invalid longitude: {longitude}"))?,
        date,
        config,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = parse_args(std::env::args().skip(1))?;

    let config = SailConfig::load_from_path(args.config)?;
    logging::init(&config.logging)?;

    let service = ConditionsService::from_config(&config)?;
    let report = service
        .fetch_all(args.latitude, args.longitude, &args.date)
        .await
        .context("failed to fetch conditions")?;

    if let Ok(weather) = &report.weather {
        info!(
            condition = %weather.weather.condition,
            wind = %weather.format_wind(),
            sea = %weather.format_sea_state(),
            "forecast summary"
        );
    }

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
