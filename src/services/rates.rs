use crate::models::{Asset, AssetType};

/// Per-type growth defaults applied when an asset carries no usable
/// growth-rate bucket. Conservative long-run figures; crypto deliberately 0.
pub fn default_growth_rate(asset_type: AssetType) -> f64 {
    match asset_type {
        AssetType::Stock | AssetType::Etf => 0.07,
        AssetType::Bond | AssetType::RealEstate => 0.03,
        AssetType::Deposit => 0.02,
        AssetType::Cash | AssetType::Crypto | AssetType::Other => 0.0,
    }
}

/// Resolves an asset's expected annual growth rate. Prefers the 5-year
/// bucket of the asset's growth-rate map, then the shortest remaining
/// horizon, then the per-type default. Never fails.
pub fn resolve_asset_rate(asset: &Asset) -> f64 {
    if let Some(rates) = &asset.growth_rates {
        if let Some(rate) = rates.get("5y") {
            return *rate;
        }
        let shortest = rates
            .iter()
            .filter_map(|(horizon, rate)| Some((parse_horizon_years(horizon)?, *rate)))
            .min_by_key(|(years, _)| *years);
        if let Some((_, rate)) = shortest {
            return rate;
        }
    }
    default_growth_rate(asset.asset_type)
}

fn parse_horizon_years(horizon: &str) -> Option<u32> {
    horizon.trim().trim_end_matches('y').parse().ok()
}

#[derive(Debug, Clone, PartialEq)]
pub struct InflationGuidance {
    pub region: &'static str,
    pub typical_range: (f64, f64),
    pub default_rate: f64,
}

/// Region-specific inflation guidance. Unknown regions fall back to a fixed
/// conservative default; absence of data is never an error.
pub fn resolve_inflation(region: Option<&str>) -> InflationGuidance {
    match region.map(|r| r.to_ascii_uppercase()).as_deref() {
        Some("US") => InflationGuidance {
            region: "United States",
            typical_range: (0.02, 0.04),
            default_rate: 0.03,
        },
        Some("UK") => InflationGuidance {
            region: "United Kingdom",
            typical_range: (0.02, 0.04),
            default_rate: 0.03,
        },
        Some("EU") => InflationGuidance {
            region: "European Union",
            typical_range: (0.02, 0.03),
            default_rate: 0.025,
        },
        Some("JP") => InflationGuidance {
            region: "Japan",
            typical_range: (0.0, 0.02),
            default_rate: 0.01,
        },
        _ => InflationGuidance {
            region: "Unknown",
            typical_range: (0.035, 0.04),
            default_rate: 0.04,
        },
    }
}

/// Maps an IANA timezone to the coarse region codes the inflation table
/// understands.
pub fn region_from_timezone(timezone: Option<&str>) -> Option<&'static str> {
    let tz = timezone?;
    if tz.starts_with("America/") {
        Some("US")
    } else if tz == "Europe/London" {
        Some("UK")
    } else if tz.starts_with("Europe/") {
        Some("EU")
    } else if tz == "Asia/Tokyo" {
        Some("JP")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn asset(asset_type: AssetType, growth_rates: Option<HashMap<String, f64>>) -> Asset {
        Asset {
            id: "a-1".to_string(),
            name: "Test".to_string(),
            asset_type,
            ticker: None,
            balance: 1000.0,
            currency: "USD".to_string(),
            growth_rates,
        }
    }

    #[test]
    fn test_type_defaults() {
        assert_eq!(default_growth_rate(AssetType::Stock), 0.07);
        assert_eq!(default_growth_rate(AssetType::Etf), 0.07);
        assert_eq!(default_growth_rate(AssetType::Bond), 0.03);
        assert_eq!(default_growth_rate(AssetType::Cash), 0.0);
        assert_eq!(default_growth_rate(AssetType::Deposit), 0.02);
        assert_eq!(default_growth_rate(AssetType::Crypto), 0.0);
        assert_eq!(default_growth_rate(AssetType::RealEstate), 0.03);
    }

    #[test]
    fn test_five_year_bucket_preferred() {
        let rates = HashMap::from([("5y".to_string(), 0.12), ("10y".to_string(), 0.08)]);
        assert_eq!(resolve_asset_rate(&asset(AssetType::Stock, Some(rates))), 0.12);
    }

    #[test]
    fn test_shortest_horizon_when_no_five_year() {
        let rates = HashMap::from([("10y".to_string(), 0.08), ("20y".to_string(), 0.06)]);
        assert_eq!(resolve_asset_rate(&asset(AssetType::Stock, Some(rates))), 0.08);
    }

    #[test]
    fn test_default_when_no_buckets() {
        assert_eq!(resolve_asset_rate(&asset(AssetType::Deposit, None)), 0.02);
        let empty = HashMap::new();
        assert_eq!(resolve_asset_rate(&asset(AssetType::Bond, Some(empty))), 0.03);
    }

    #[test]
    fn test_unparsable_horizon_falls_back() {
        let rates = HashMap::from([("long-term".to_string(), 0.2)]);
        assert_eq!(resolve_asset_rate(&asset(AssetType::Etf, Some(rates))), 0.07);
    }

    #[test]
    fn test_known_region_inflation() {
        let us = resolve_inflation(Some("US"));
        assert_eq!(us.default_rate, 0.03);
        assert_eq!(us.typical_range, (0.02, 0.04));

        let jp = resolve_inflation(Some("jp"));
        assert_eq!(jp.region, "Japan");
        assert_eq!(jp.default_rate, 0.01);
    }

    #[test]
    fn test_unknown_region_falls_back() {
        let unknown = resolve_inflation(Some("XYZ"));
        assert_eq!(unknown.default_rate, 0.04);
        assert_eq!(unknown.typical_range, (0.035, 0.04));
        assert_eq!(resolve_inflation(None).default_rate, 0.04);
    }

    #[test]
    fn test_region_from_timezone() {
        assert_eq!(region_from_timezone(Some("America/New_York")), Some("US"));
        assert_eq!(region_from_timezone(Some("Europe/London")), Some("UK"));
        assert_eq!(region_from_timezone(Some("Europe/Berlin")), Some("EU"));
        assert_eq!(region_from_timezone(Some("Asia/Tokyo")), Some("JP"));
        assert_eq!(region_from_timezone(Some("Asia/Dubai")), None);
        assert_eq!(region_from_timezone(None), None);
    }
}
