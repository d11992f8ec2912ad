//! configuration file handling module
//! This module provides structure and methods related to configuration file handling.
use crate::constants::*;

/// Main Configuration Structure
#[derive(Debug, Default, Deserialize)]
pub struct CConfig {
    pub debug: Option<u8>,
    pub time_zone: Option<String>,
    pub time_format: Option<String>,
    pub interface: Option<String>,
    pub fail_fast: Option<bool>,
    pub promiscuous: Option<bool>,
    pub pid: Option<String>,
    pub working_dir: Option<String>,
    pub main_log: Option<String>,
    pub error_log: Option<String>,
}

impl CConfig {
    // debug() getter
    pub fn debug(&self) -> u8 {
        match self.debug {
            Some(v) => v,
            None => DEBUG_LEVEL_INFO,
        }
    }
    // time_zone() getter
    pub fn time_zone(&self) -> u8 {
        match &self.time_zone {
            Some(s) => match &s[..] {
                "local" => 0,
                "utc" => 1,
                _ => 0,
            },
            None => 0,
        }
    }
    // time_format() getter
    pub fn time_format(&self) -> u8 {
        match &self.time_format {
            Some(s) => match &s[..] {
                "disabled" => 0,
                "rfc2822" => 1,
                _ => 0,
            },
            None => 0,
        }
    }
    // interface() getter
    pub fn interface(&self) -> Option<String> {
        self.interface.clone()
    }
    // fail_fast() getter
    /// end the process on the first validation failure when true
    pub fn fail_fast(&self) -> bool {
        match self.fail_fast {
            Some(b) => b,
            None => false,
        }
    }
    // promiscuous() getter
    pub fn promiscuous(&self) -> bool {
        match self.promiscuous {
            Some(b) => b,
            None => true,
        }
    }
    // pid() getter
    pub fn pid(&self) -> String {
        match &self.pid {
            Some(v) => v.clone(),
            None => RPINGD_DFLT_PIDFILE.to_string(),
        }
    }
    // working_dir() getter
    pub fn working_dir(&self) -> String {
        match &self.working_dir {
            Some(v) => v.clone(),
            None => RPINGD_DFLT_WORKDIR.to_string(),
        }
    }
    // main_log() getter
    pub fn main_log(&self) -> String {
        match &self.main_log {
            Some(v) => v.clone(),
            None => RPINGD_DFLT_LOGFILE.to_string(),
        }
    }
    // error_log() getter
    pub fn error_log(&self) -> String {
        match &self.error_log {
            Some(v) => v.clone(),
            None => RPINGD_DFLT_ELOGFILE.to_string(),
        }
    }
}

// decode_config() function
/// read and decode configuration file
pub fn decode_config(filename: String) -> CConfig {
    let file = std::fs::read_to_string(filename).expect("Cannot read rpingd configuration file");
    let config: CConfig = match toml::from_str(&file) {
        Ok(c) => c,
        Err(e) => panic!("error(config): Cannot parse configuration file:\n {}", e),
    };
    // return config
    config
}

// Tests
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_take_defaults() {
        let config: CConfig = toml::from_str("").unwrap();
        assert_eq!(config.debug(), DEBUG_LEVEL_INFO);
        assert_eq!(config.fail_fast(), false);
        assert_eq!(config.promiscuous(), true);
        assert_eq!(config.pid(), RPINGD_DFLT_PIDFILE);
        assert!(config.interface().is_none());
    }

    #[test]
    fn keys_decode_from_toml() {
        let config: CConfig = toml::from_str(
            r#"
            debug = 3
            time_zone = "utc"
            time_format = "rfc2822"
            interface = "eth0"
            fail_fast = true
            promiscuous = false
        "#,
        )
        .unwrap();
        assert_eq!(config.debug(), 3);
        assert_eq!(config.time_zone(), 1);
        assert_eq!(config.time_format(), 1);
        assert_eq!(config.interface(), Some("eth0".to_string()));
        assert!(config.fail_fast());
        assert!(!config.promiscuous());
    }
}
