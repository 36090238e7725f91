//! Request bodies as the gateway control plane expects them on the wire.

use serde::Serialize;

use super::{FilterConf, GlobalConfigConf, ProxyConf, RouteConf, ServiceConf, UpstreamConf};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProxyArg {
    #[serde(rename = "Name")]
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ServiceArg {
    #[serde(rename = "Service_Name")]
    pub service_name: String,
    #[serde(rename = "Fqdn")]
    pub fqdn: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RouteArg {
    #[serde(rename = "Route_Name")]
    pub route_name: String,
    #[serde(rename = "Route_Prefix")]
    pub route_prefix: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UpstreamArg {
    #[serde(rename = "Upstream_name")]
    pub upstream_name: String,
    #[serde(rename = "Upstream_ip")]
    pub upstream_ip: String,
    #[serde(rename = "Upstream_port")]
    pub upstream_port: String,
    #[serde(rename = "Upstream_hc_path")]
    pub upstream_hc_path: String,
    #[serde(rename = "Upstream_weight")]
    pub upstream_weight: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FilterArg {
    #[serde(rename = "Filter_name")]
    pub filter_name: String,
    #[serde(rename = "Filter_type")]
    pub filter_type: String,
    #[serde(rename = "Filter_config")]
    pub filter_config: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GlobalConfigArg {
    #[serde(rename = "Globalconfig_name")]
    pub globalconfig_name: String,
    #[serde(rename = "Globalconfig_type")]
    pub globalconfig_type: String,
    #[serde(rename = "Config")]
    pub config: String,
}

/// Strip newlines, tabs and backslashes from an embedded config document.
pub fn compact_config(config: &str) -> String {
    config
        .chars()
        .filter(|c| !matches!(c, '\n' | '\t' | '\\'))
        .collect()
}

impl From<&ProxyConf> for ProxyArg {
    fn from(conf: &ProxyConf) -> Self {
        Self {
            name: conf.name.clone(),
        }
    }
}

impl From<&ServiceConf> for ServiceArg {
    fn from(conf: &ServiceConf) -> Self {
        Self {
            service_name: conf.name.clone(),
            fqdn: conf.fqdn.clone(),
        }
    }
}

impl From<&RouteConf> for RouteArg {
    fn from(conf: &RouteConf) -> Self {
        Self {
            route_name: conf.name.clone(),
            route_prefix: conf.prefix.clone(),
        }
    }
}

impl From<&UpstreamConf> for UpstreamArg {
    fn from(conf: &UpstreamConf) -> Self {
        Self {
            upstream_name: conf.name.clone(),
            upstream_ip: conf.ip.clone(),
            upstream_port: conf.port.clone(),
            upstream_hc_path: conf.hc_path.clone(),
            upstream_weight: conf.weight.clone(),
        }
    }
}

impl From<&FilterConf> for FilterArg {
    fn from(conf: &FilterConf) -> Self {
        Self {
            filter_name: conf.name.clone(),
            filter_type: conf.kind.clone(),
            filter_config: conf.config.clone(),
        }
    }
}

impl From<&GlobalConfigConf> for GlobalConfigArg {
    fn from(conf: &GlobalConfigConf) -> Self {
        Self {
            globalconfig_name: conf.name.clone(),
            globalconfig_type: conf.kind.clone(),
            config: compact_config(&conf.config),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::config::Config;

    #[test]
    fn test_wire_field_names() {
        let conf = Config::default();

        assert_eq!(
            serde_json::to_value(ProxyArg::from(&conf.proxy)).unwrap(),
            json!({"Name": "gw"})
        );
        assert_eq!(
            serde_json::to_value(ServiceArg::from(&conf.service)).unwrap(),
            json!({"Service_Name": "test_svc", "Fqdn": "localhost"})
        );
        assert_eq!(
            serde_json::to_value(RouteArg::from(&conf.route)).unwrap(),
            json!({"Route_Name": "test_route", "Route_Prefix": "/"})
        );
        assert_eq!(
            serde_json::to_value(UpstreamArg::from(&conf.upstream)).unwrap(),
            json!({
                "Upstream_name": "test_upstream",
                "Upstream_ip": "localhost",
                "Upstream_port": "9001",
                "Upstream_hc_path": "/",
                "Upstream_weight": "100"
            })
        );

        let filter = serde_json::to_value(FilterArg::from(&conf.ratelimit_filter)).unwrap();
        assert_eq!(filter["Filter_name"], "test_filter_rl");
        assert_eq!(filter["Filter_type"], "route_filter_ratelimit");
    }

    #[test]
    fn test_compact_config() {
        assert_eq!(compact_config("{\n\t\"a\" : 1\\\n}"), "{\"a\" : 1}");
        assert_eq!(compact_config("plain"), "plain");
    }

    #[test]
    fn test_global_config_is_compacted() {
        let conf = Config::default();
        let arg = GlobalConfigArg::from(&conf.global_config);

        assert!(!arg.config.contains(['\n', '\t', '\\']));
        let parsed: serde_json::Value = serde_json::from_str(&arg.config).unwrap();
        assert_eq!(parsed["domain"], "enroute");
        assert_eq!(
            parsed["descriptors"][0]["rate_limit"]["requests_per_unit"],
            10
        );
    }
}
