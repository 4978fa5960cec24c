use std::fs;

use serde::{ Deserialize, Serialize };
use toml;
use std::error::Error;
use std::fmt;

use oekorps::ridepooling_emissions::ElectricityBlendPolicy;

/// One year
const MAX_SESSION_TTL_SECONDS: i64 = 365 * 24 * 60 * 60;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AppSettings {
    pub debug: Option<DebugSettings>,
    pub rest_api: RestAPISettings,
    #[serde(default)]
    pub worker: WorkerSettings,
    #[serde(default)]
    pub sessions: SessionsSettings,
    #[serde(default)]
    pub calculation: CalculationSettings,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct DebugSettings {
    pub enable: bool
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RestAPISettings {
    pub host: String,
    pub back_end_port: i32,
    #[serde(default = "default_api_scope")]
    pub api_scope: String,
}

fn default_api_scope() -> String { "/api".to_string() }

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct WorkerSettings {
    /// Sessions idle for longer than this are evicted
    #[serde(default = "default_session_ttl_seconds")]
    pub session_ttl_seconds: i64,
    #[serde(default = "default_sweep_interval_milliseconds")]
    pub sweep_interval_milliseconds: u64,
}

fn default_session_ttl_seconds() -> i64 { 86400 }
fn default_sweep_interval_milliseconds() -> u64 { 60000 }

impl Default for WorkerSettings {
    fn default() -> Self {
        WorkerSettings {
            session_ttl_seconds: default_session_ttl_seconds(),
            sweep_interval_milliseconds: default_sweep_interval_milliseconds(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SessionsSettings {
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

fn default_max_sessions() -> usize { 1000 }

impl Default for SessionsSettings {
    fn default() -> Self {
        SessionsSettings { max_sessions: default_max_sessions() }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CalculationSettings {
    // Either "legacy_double_scaling" or "single_blend". Default is "legacy_double_scaling"
    pub electricity_blend_policy: Option<String>,
}

impl Default for CalculationSettings {
    fn default() -> Self {
        CalculationSettings { electricity_blend_policy: None }
    }
}

impl CalculationSettings {
    pub fn get_blend_policy(&self) -> Result<ElectricityBlendPolicy, Box<dyn Error>> {
        match &self.electricity_blend_policy {
            Some(policy) => Ok(policy.parse::<ElectricityBlendPolicy>()?),
            None => Ok(ElectricityBlendPolicy::default()),
        }
    }
}

impl AppSettings {
    pub fn new(filename: &str) -> Result<Self, Box<dyn Error>> {
        let toml_contents = match fs::read_to_string(filename) {
            Ok(contents) => contents,
            Err(err) => {
                return Err(format!("Something went wrong reading the file '{}': {}", filename, err).into());
            }
        };
        AppSettings::from_toml(&toml_contents)
    }
    pub fn from_toml(toml_contents: &str) -> Result<Self, Box<dyn Error>> {
        let mut app_settings = match toml::from_str::<AppSettings>(toml_contents) {
            Ok(result) => result,
            Err(err) => {
                return Err(format!("Can't parse TOML configuration file due the error: {:?}", err).into());
            }
        };
        // Set default values
        if app_settings.calculation.electricity_blend_policy.is_none() {
            app_settings.calculation.electricity_blend_policy = Some(ElectricityBlendPolicy::default().to_string());
        }
        // Check if blend policy is valid
        app_settings.calculation.get_blend_policy()?;
        if app_settings.worker.session_ttl_seconds <= 0 || app_settings.worker.session_ttl_seconds > MAX_SESSION_TTL_SECONDS {
            return Err(format!(
                "Invalid session TTL: '{}'. It must be a number of seconds in (0; {}].",
                app_settings.worker.session_ttl_seconds, MAX_SESSION_TTL_SECONDS
            ).into());
        }
        if app_settings.worker.sweep_interval_milliseconds == 0 {
            return Err("Invalid sweep interval: it must be a positive number of milliseconds.".into());
        }
        if app_settings.sessions.max_sessions == 0 {
            return Err("Invalid session limit: at least one session must be allowed.".into());
        }
        match app_settings.debug {
            None => {
                app_settings.debug = Some(DebugSettings{
                    enable: false,
                });
            },
            _ => {  }
        }
        return Ok(app_settings);
    }
    pub fn is_debug(&self) -> bool {
        self.debug.as_ref().map(|debug| debug.enable).unwrap_or(false)
    }
}

impl fmt::Display for AppSettings {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Debug: {}\n\tBack-end host: {}\n\tBack-end port: {}\n\tAPI scope: {}\n\tSession TTL (seconds): {}\n\tSweep interval (millis): {}\n\tMax sessions: {}\n\tElectricity blend policy: {}",
            self.is_debug(),
            self.rest_api.host,
            self.rest_api.back_end_port,
            self.rest_api.api_scope,
            self.worker.session_ttl_seconds,
            self.worker.sweep_interval_milliseconds,
            self.sessions.max_sessions,
            self.calculation.electricity_blend_policy.as_ref().unwrap_or(&"undefined".to_string()),
        )
    }
}
