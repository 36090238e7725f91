use std::fs;
use std::str::FromStr;

use http::Uri;
use log::{debug, trace, LevelFilter};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use validator::{Validate, ValidationError};

use crate::core::{ConfigError, ConfigResult};

pub mod payload;

const DEFAULT_BASE_URL: &str = "http://localhost:1323";

const DEFAULT_LUA_FILTER: &str = "\n\
\t\tfunction envoy_on_request(request_handle)\n\
\t\t   request_handle:logInfo(\"Hello World request\");\n\
\t\tend\n\
\t\t\n\
\t\tfunction envoy_on_response(response_handle)\n\
\t\t   response_handle:logInfo(\"Hello World response\");\n\
\t\tend\n\
\t";

const DEFAULT_RATELIMIT_FILTER: &str = "\n\
\t{\n\
\t  \"descriptors\" :\n\
\t  [\n\
\t    {\n\
\t      \"generic_key\":\n\
\t      {\n\
\t        \"descriptor_value\":\"default\"\n\
\t      }\n\
\t    }\n\
\t  ]\n\
\t}\n\
\t";

const DEFAULT_GLOBAL_RATELIMIT: &str = "\n\
\t\t{\n\
\t\t  \"domain\": \"enroute\",\n\
\t\t  \"descriptors\" :\n\
\t\t  [\n\
\t\t    {\n\
\t\t      \"key\" : \"generic_key\",\n\
\t\t      \"value\" : \"default\",\n\
\t\t      \"rate_limit\" :\n\
\t\t      {\n\
\t\t        \"unit\" : \"second\",\n\
\t\t        \"requests_per_unit\" : 10\n\
\t\t      }\n\
\t\t    }\n\
\t\t  ]\n\
\t\t}";

static HOST_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:(?:\d{1,3}\.){3}\d{1,3}|\[[0-9a-f:]+\]|[a-z0-9.-]+)$")
        .expect("host regex is valid")
});

/// Payload document: where the control plane lives and the gateway objects
/// each operation creates, shows or deletes.
#[derive(Clone, Debug, Serialize, Deserialize, Validate)]
#[serde(default)]
#[validate(schema(function = "Config::validate_base_url"))]
pub struct Config {
    pub base_url: String,

    #[validate(nested)]
    pub proxy: ProxyConf,
    #[validate(nested)]
    pub service: ServiceConf,
    #[validate(nested)]
    pub route: RouteConf,
    #[validate(nested)]
    pub upstream: UpstreamConf,
    #[serde(deserialize_with = "FilterConf::deserialize_lua")]
    #[validate(nested)]
    pub lua_filter: FilterConf,
    #[serde(deserialize_with = "FilterConf::deserialize_ratelimit")]
    #[validate(nested)]
    pub ratelimit_filter: FilterConf,
    #[validate(nested)]
    pub global_config: GlobalConfigConf,

    #[validate(nested)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            proxy: ProxyConf::default(),
            service: ServiceConf::default(),
            route: RouteConf::default(),
            upstream: UpstreamConf::default(),
            lua_filter: FilterConf::lua(),
            ratelimit_filter: FilterConf::ratelimit(),
            global_config: GlobalConfigConf::default(),
            log: Log::default(),
        }
    }
}

// Config file load and validation
impl Config {
    pub fn load_from_yaml<P>(path: P) -> ConfigResult<Self>
    where
        P: AsRef<std::path::Path> + std::fmt::Display,
    {
        let conf_str = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        debug!("Conf file read from {path}");
        Self::from_yaml(&conf_str)
    }

    /// Load from `path` when given, otherwise fall back to the built-in defaults.
    pub fn load(path: Option<&str>) -> ConfigResult<Self> {
        match path {
            Some(path) => Self::load_from_yaml(path),
            None => {
                debug!("No conf file given, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn from_yaml(conf_str: &str) -> ConfigResult<Self> {
        trace!("Read conf file: {conf_str}");
        let conf: Config = serde_yaml::from_str(conf_str)?;

        trace!("Loaded conf: {conf:?}");

        conf.validate()?;

        Ok(conf)
    }

    #[allow(dead_code)]
    pub fn to_yaml(&self) -> ConfigResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Base URL without a trailing slash, ready for path concatenation.
    pub fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    fn validate_base_url(&self) -> Result<(), ValidationError> {
        let uri: Uri = self
            .base_url
            .parse()
            .map_err(|_| ValidationError::new("invalid_base_url"))?;

        match (uri.scheme_str(), uri.authority()) {
            (Some("http" | "https"), Some(_)) => Ok(()),
            _ => Err(ValidationError::new("base_url_must_be_http")),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ProxyConf {
    #[validate(length(min = 1))]
    pub name: String,
}

impl Default for ProxyConf {
    fn default() -> Self {
        Self {
            name: "gw".to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ServiceConf {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub fqdn: String,
}

impl Default for ServiceConf {
    fn default() -> Self {
        Self {
            name: "test_svc".to_string(),
            fqdn: "localhost".to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct RouteConf {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub prefix: String,
}

impl Default for RouteConf {
    fn default() -> Self {
        Self {
            name: "test_route".to_string(),
            prefix: "/".to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct UpstreamConf {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(custom(function = "UpstreamConf::validate_ip"))]
    pub ip: String,
    // The control plane takes port and weight as strings
    #[validate(custom(function = "UpstreamConf::validate_port"))]
    pub port: String,
    pub hc_path: String,
    #[validate(custom(function = "UpstreamConf::validate_weight"))]
    pub weight: String,
}

impl Default for UpstreamConf {
    fn default() -> Self {
        Self {
            name: "test_upstream".to_string(),
            ip: "localhost".to_string(),
            port: "9001".to_string(),
            hc_path: "/".to_string(),
            weight: "100".to_string(),
        }
    }
}

impl UpstreamConf {
    fn validate_ip(ip: &str) -> Result<(), ValidationError> {
        if HOST_REGEX.is_match(ip) {
            Ok(())
        } else {
            let mut err = ValidationError::new("invalid_upstream_ip");
            err.add_param("ip".into(), &ip.to_string());
            Err(err)
        }
    }

    fn validate_port(port: &str) -> Result<(), ValidationError> {
        match port.parse::<u16>() {
            Ok(p) if p > 0 => Ok(()),
            _ => Err(ValidationError::new("invalid_upstream_port")),
        }
    }

    fn validate_weight(weight: &str) -> Result<(), ValidationError> {
        weight
            .parse::<u32>()
            .map(|_| ())
            .map_err(|_| ValidationError::new("invalid_upstream_weight"))
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, Validate)]
pub struct FilterConf {
    #[validate(length(min = 1))]
    pub name: String,
    #[serde(rename = "type")]
    #[validate(length(min = 1))]
    pub kind: String,
    pub config: String,
}

impl FilterConf {
    pub fn lua() -> Self {
        Self {
            name: "test_filter_lua".to_string(),
            kind: "http_filter_lua".to_string(),
            config: DEFAULT_LUA_FILTER.to_string(),
        }
    }

    pub fn ratelimit() -> Self {
        Self {
            name: "test_filter_rl".to_string(),
            kind: "route_filter_ratelimit".to_string(),
            config: DEFAULT_RATELIMIT_FILTER.to_string(),
        }
    }

    fn deserialize_lua<'de, D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        FilterOverride::deserialize(deserializer).map(|o| o.apply(Self::lua()))
    }

    fn deserialize_ratelimit<'de, D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        FilterOverride::deserialize(deserializer).map(|o| o.apply(Self::ratelimit()))
    }
}

/// Fields a document sets on one filter; the rest come from that filter's defaults.
#[derive(Deserialize)]
struct FilterOverride {
    name: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    config: Option<String>,
}

impl FilterOverride {
    fn apply(self, base: FilterConf) -> FilterConf {
        FilterConf {
            name: self.name.unwrap_or(base.name),
            kind: self.kind.unwrap_or(base.kind),
            config: self.config.unwrap_or(base.config),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct GlobalConfigConf {
    #[validate(length(min = 1))]
    pub name: String,
    #[serde(rename = "type")]
    #[validate(length(min = 1))]
    pub kind: String,
    pub config: String,
}

impl Default for GlobalConfigConf {
    fn default() -> Self {
        Self {
            name: "test_gc".to_string(),
            kind: "globalconfig_ratelimit".to_string(),
            config: DEFAULT_GLOBAL_RATELIMIT.to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Log {
    #[validate(custom(function = "Log::validate_level"))]
    pub level: String,
}

impl Default for Log {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl Log {
    pub fn level_filter(&self) -> LevelFilter {
        LevelFilter::from_str(&self.level).unwrap_or(LevelFilter::Warn)
    }

    fn validate_level(level: &str) -> Result<(), ValidationError> {
        LevelFilter::from_str(level)
            .map(|_| ())
            .map_err(|_| ValidationError::new("invalid_log_level"))
    }
}
