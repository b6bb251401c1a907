//! Coordinator configuration.
//!
//! Configuration is immutable for the lifetime of one coordinator; changing
//! any of it means tearing the coordinator down and building a new one.

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Bounds for the ticker rotation interval, in seconds.
pub const MIN_ROTATION_SECS: u64 = 5;
pub const MAX_ROTATION_SECS: u64 = 300;
pub const DEFAULT_ROTATION_SECS: u64 = 15;

/// Bounds for the legacy fixed refresh interval, in minutes.
pub const MIN_REFRESH_MINUTES: u64 = 60;
pub const MAX_REFRESH_MINUTES: u64 = 43200;

/// Wall-clock refresh hours of the canonical twice-daily schedule.
pub const MORNING_REFRESH_HOUR: u32 = 7;
pub const AFTERNOON_REFRESH_HOUR: u32 = 16;

/// When the full refresh cycle runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshSchedule {
    /// Canonical: refresh at 07:00 and 16:00 local time, with a startup
    /// backfill when the process starts mid-window.
    TwiceDaily,

    /// Legacy compatibility mode: refresh every fixed number of minutes.
    Interval { minutes: u64 },
}

impl Default for RefreshSchedule {
    fn default() -> Self {
        RefreshSchedule::TwiceDaily
    }
}

/// Immutable settings for one coordinator instance.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Upstream API key, sent as the `key` query parameter on every fetch.
    pub api_key: String,

    /// Province the fuel price feed is queried for.
    pub fuel_province: Province,

    /// City the air quality feed is queried for (free text).
    pub air_city: String,

    /// Ticker rotation interval in seconds.
    pub rotation_secs: u64,

    pub schedule: RefreshSchedule,
}

impl CoordinatorConfig {
    /// Config with the defaults the setup flow offers: Fujian fuel prices,
    /// Putian air quality, 15s ticker, twice-daily refresh.
    pub fn new(api_key: impl Into<String>) -> Self {
        CoordinatorConfig {
            api_key: api_key.into(),
            fuel_province: Province::default(),
            air_city: "莆田".to_string(),
            rotation_secs: DEFAULT_ROTATION_SECS,
            schedule: RefreshSchedule::default(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::EmptyApiKey);
        }
        if !(MIN_ROTATION_SECS..=MAX_ROTATION_SECS).contains(&self.rotation_secs) {
            return Err(ConfigError::RotationIntervalOutOfRange(self.rotation_secs));
        }
        if let RefreshSchedule::Interval { minutes } = self.schedule {
            if !(MIN_REFRESH_MINUTES..=MAX_REFRESH_MINUTES).contains(&minutes) {
                return Err(ConfigError::RefreshIntervalOutOfRange(minutes));
            }
        }
        Ok(())
    }
}

/// The 31 province names the fuel price endpoint accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Province {
    Beijing,
    Tianjin,
    Hebei,
    Shanxi,
    InnerMongolia,
    Liaoning,
    Jilin,
    Heilongjiang,
    Shanghai,
    Jiangsu,
    Zhejiang,
    Anhui,
    Fujian,
    Jiangxi,
    Shandong,
    Henan,
    Hubei,
    Hunan,
    Guangdong,
    Guangxi,
    Hainan,
    Chongqing,
    Sichuan,
    Guizhou,
    Yunnan,
    Tibet,
    Shaanxi,
    Gansu,
    Qinghai,
    Ningxia,
    Xinjiang,
}

impl Province {
    pub const ALL: [Province; 31] = [
        Province::Beijing,
        Province::Tianjin,
        Province::Hebei,
        Province::Shanxi,
        Province::InnerMongolia,
        Province::Liaoning,
        Province::Jilin,
        Province::Heilongjiang,
        Province::Shanghai,
        Province::Jiangsu,
        Province::Zhejiang,
        Province::Anhui,
        Province::Fujian,
        Province::Jiangxi,
        Province::Shandong,
        Province::Henan,
        Province::Hubei,
        Province::Hunan,
        Province::Guangdong,
        Province::Guangxi,
        Province::Hainan,
        Province::Chongqing,
        Province::Sichuan,
        Province::Guizhou,
        Province::Yunnan,
        Province::Tibet,
        Province::Shaanxi,
        Province::Gansu,
        Province::Qinghai,
        Province::Ningxia,
        Province::Xinjiang,
    ];

    /// The wire value sent as the `prov` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Province::Beijing => "北京",
            Province::Tianjin => "天津",
            Province::Hebei => "河北",
            Province::Shanxi => "山西",
            Province::InnerMongolia => "内蒙古",
            Province::Liaoning => "辽宁",
            Province::Jilin => "吉林",
            Province::Heilongjiang => "黑龙江",
            Province::Shanghai => "上海",
            Province::Jiangsu => "江苏",
            Province::Zhejiang => "浙江",
            Province::Anhui => "安徽",
            Province::Fujian => "福建",
            Province::Jiangxi => "江西",
            Province::Shandong => "山东",
            Province::Henan => "河南",
            Province::Hubei => "湖北",
            Province::Hunan => "湖南",
            Province::Guangdong => "广东",
            Province::Guangxi => "广西",
            Province::Hainan => "海南",
            Province::Chongqing => "重庆",
            Province::Sichuan => "四川",
            Province::Guizhou => "贵州",
            Province::Yunnan => "云南",
            Province::Tibet => "西藏",
            Province::Shaanxi => "陕西",
            Province::Gansu => "甘肃",
            Province::Qinghai => "青海",
            Province::Ningxia => "宁夏",
            Province::Xinjiang => "新疆",
        }
    }

    /// Look a province up by its wire name.
    pub fn parse(name: &str) -> Option<Province> {
        Self::ALL.iter().copied().find(|p| p.as_str() == name)
    }
}

impl Default for Province {
    fn default() -> Self {
        Province::Fujian
    }
}

impl fmt::Display for Province {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Province {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Province::parse(s).ok_or_else(|| ConfigError::UnknownProvince(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(CoordinatorConfig::new("test-key").validate().is_ok());
    }

    #[test]
    fn empty_api_key_rejected() {
        let config = CoordinatorConfig::new("   ");
        assert_eq!(config.validate(), Err(ConfigError::EmptyApiKey));
    }

    #[test]
    fn rotation_interval_bounds_enforced() {
        let mut config = CoordinatorConfig::new("test-key");

        config.rotation_secs = 4;
        assert_eq!(
            config.validate(),
            Err(ConfigError::RotationIntervalOutOfRange(4))
        );

        config.rotation_secs = 301;
        assert_eq!(
            config.validate(),
            Err(ConfigError::RotationIntervalOutOfRange(301))
        );

        config.rotation_secs = 5;
        assert!(config.validate().is_ok());
        config.rotation_secs = 300;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn refresh_interval_bounds_enforced() {
        let mut config = CoordinatorConfig::new("test-key");

        config.schedule = RefreshSchedule::Interval { minutes: 59 };
        assert_eq!(
            config.validate(),
            Err(ConfigError::RefreshIntervalOutOfRange(59))
        );

        config.schedule = RefreshSchedule::Interval { minutes: 60 };
        assert!(config.validate().is_ok());

        config.schedule = RefreshSchedule::Interval { minutes: 43201 };
        assert_eq!(
            config.validate(),
            Err(ConfigError::RefreshIntervalOutOfRange(43201))
        );
    }

    #[test]
    fn province_round_trips_through_wire_name() {
        assert_eq!(Province::ALL.len(), 31);
        for province in Province::ALL {
            assert_eq!(Province::parse(province.as_str()), Some(province));
        }
        assert_eq!(Province::parse("atlantis"), None);
        assert_eq!("福建".parse::<Province>(), Ok(Province::Fujian));
    }
}
