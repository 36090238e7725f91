//! Operation sets
//!
//! The three fixed scripts (create, delete, show) and the control-plane
//! endpoints they address.

use std::{fmt, str::FromStr, sync::Arc};

use crate::config::{
    payload::{FilterArg, GlobalConfigArg, ProxyArg, RouteArg, ServiceArg, UpstreamArg},
    Config,
};

use super::step::{CommandTable, Step};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Operation {
    Create,
    Delete,
    #[default]
    Show,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let op = match self {
            Operation::Create => "create",
            Operation::Delete => "delete",
            Operation::Show => "show",
        };
        write!(f, "{}", op)
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(Operation::Create),
            "delete" => Ok(Operation::Delete),
            "show" => Ok(Operation::Show),
            _ => Err(format!("Operation [{s}] not supported")),
        }
    }
}

/// Fully resolved control-plane URLs for one payload document.
#[derive(Clone, Debug)]
pub struct Endpoints {
    pub proxies: String,
    pub services: String,
    pub routes: String,
    pub upstreams: String,
    pub filters: String,
    pub global_configs: String,

    pub global_config: String,
    pub route_filter: String,
    pub service_filter: String,
    pub upstream: String,
    pub route: String,
    pub service: String,
    pub proxy: String,

    pub proxy_global_config: String,
    pub route_filter_link: String,
    pub service_filter_link: String,
    pub route_upstream_link: String,
    pub proxy_service_link: String,

    pub proxy_dump: String,
}

impl Endpoints {
    pub fn new(config: &Config) -> Self {
        let base = config.base();
        let proxy = &config.proxy.name;
        let svc = &config.service.name;
        let route = &config.route.name;
        let upstream = &config.upstream.name;
        let lua = &config.lua_filter.name;
        let rl = &config.ratelimit_filter.name;
        let gc = &config.global_config.name;

        Self {
            proxies: format!("{base}/proxy"),
            services: format!("{base}/service"),
            routes: format!("{base}/service/{svc}/route"),
            upstreams: format!("{base}/upstream"),
            filters: format!("{base}/filter"),
            global_configs: format!("{base}/globalconfig"),

            global_config: format!("{base}/globalconfig/{gc}"),
            route_filter: format!("{base}/filter/{rl}"),
            service_filter: format!("{base}/filter/{lua}"),
            upstream: format!("{base}/upstream/{upstream}"),
            route: format!("{base}/service/{svc}/route/{route}"),
            service: format!("{base}/service/{svc}"),
            proxy: format!("{base}/proxy/{proxy}"),

            proxy_global_config: format!("{base}/proxy/{proxy}/globalconfig/{gc}"),
            route_filter_link: format!("{base}/service/{svc}/route/{route}/filter/{rl}"),
            service_filter_link: format!("{base}/service/{svc}/filter/{lua}"),
            route_upstream_link: format!("{base}/service/{svc}/route/{route}/upstream/{upstream}"),
            proxy_service_link: format!("{base}/proxy/{proxy}/service/{svc}"),

            proxy_dump: format!("{base}/proxy/dump/{proxy}"),
        }
    }
}

/// Build the command table for `op`.
pub fn command_table(op: Operation, config: &Config) -> CommandTable {
    let urls = Endpoints::new(config);
    match op {
        Operation::Create => create_table(&urls, config),
        Operation::Delete => delete_table(&urls),
        Operation::Show => show_table(&urls),
    }
}

fn create_table(urls: &Endpoints, config: &Config) -> CommandTable {
    let proxy = Arc::new(ProxyArg::from(&config.proxy));
    let service = Arc::new(ServiceArg::from(&config.service));
    let route = Arc::new(RouteArg::from(&config.route));
    let upstream = Arc::new(UpstreamArg::from(&config.upstream));
    let lua_filter = Arc::new(FilterArg::from(&config.lua_filter));
    let rl_filter = Arc::new(FilterArg::from(&config.ratelimit_filter));
    let global_config = Arc::new(GlobalConfigArg::from(&config.global_config));

    CommandTable::new([
        Step::get(25, "-- GET PROXY --", &urls.proxy_dump),
        Step::post(50, "-- POST PROXY --", &urls.proxies).with_argument(proxy),
        Step::post(75, "-- POST SVC --", &urls.services).with_argument(service),
        Step::post(100, "-- POST RT --", &urls.routes).with_argument(route),
        Step::post(125, "-- POST U --", &urls.upstreams).with_argument(upstream),
        Step::post(130, "-- POST SVC/R/U --", &urls.route_upstream_link),
        Step::post(140, "-- POST PROXY/SVC --", &urls.proxy_service_link),
        Step::post(150, "-- POST FIL --", &urls.filters).with_argument(lua_filter),
        Step::post(160, "-- POST SVC/FIL --", &urls.service_filter_link),
        Step::post(175, "-- POST FIL --", &urls.filters).with_argument(rl_filter),
        Step::post(185, "-- POST SVC/R/FIL --", &urls.route_filter_link),
        Step::post(200, "-- POST GC --", &urls.global_configs).with_argument(global_config.clone()),
        Step::post(225, "-- POST PROXY/GC --", &urls.proxy_global_config)
            .with_argument(global_config),
    ])
}

fn delete_table(urls: &Endpoints) -> CommandTable {
    CommandTable::new([
        Step::delete(10, "-- DIS GC --", &urls.proxy_global_config),
        Step::delete(12, "-- DEL GC --", &urls.global_config),
        Step::delete(20, "-- DIS RT FIL --", &urls.route_filter_link),
        Step::delete(22, "-- DEL FIL --", &urls.route_filter),
        Step::delete(24, "-- DIS SVC FIL --", &urls.service_filter_link),
        Step::delete(25, "-- DEL FIL --", &urls.service_filter),
        Step::delete(45, "-- DIS U --", &urls.route_upstream_link),
        Step::delete(50, "-- DEL U --", &urls.upstream),
        Step::delete(75, "-- DEL RT --", &urls.route),
        Step::delete(80, "-- DIS PROXY/SVC --", &urls.proxy_service_link),
        Step::delete(100, "-- DEL SVC --", &urls.service),
        Step::delete(125, "-- DEL PROXY --", &urls.proxy),
    ])
}

fn show_table(urls: &Endpoints) -> CommandTable {
    CommandTable::new([
        Step::get(25, " -- DUMP PROXY -- ", &urls.proxy_dump),
        Step::get(50, " -- GET PROXY -- ", &urls.proxies),
        Step::get(75, " -- GET SVC -- ", &urls.services),
        Step::get(100, " -- GET RT -- ", &urls.routes),
        Step::get(125, " -- GET U -- ", &urls.upstreams),
        Step::get(150, " -- GET FIL -- ", &urls.filters),
        Step::get(175, " -- GET GC -- ", &urls.global_configs),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestration::Verb;

    #[test]
    fn test_operation_parse() {
        assert_eq!("create".parse::<Operation>().unwrap(), Operation::Create);
        assert_eq!("delete".parse::<Operation>().unwrap(), Operation::Delete);
        assert_eq!("show".parse::<Operation>().unwrap(), Operation::Show);
        assert_eq!(Operation::default(), Operation::Show);
        assert_eq!(
            "purge".parse::<Operation>().unwrap_err(),
            "Operation [purge] not supported"
        );
    }

    #[test]
    fn test_endpoints() {
        let urls = Endpoints::new(&Config::default());
        assert_eq!(urls.proxy_dump, "http://localhost:1323/proxy/dump/gw");
        assert_eq!(urls.routes, "http://localhost:1323/service/test_svc/route");
        assert_eq!(
            urls.route_upstream_link,
            "http://localhost:1323/service/test_svc/route/test_route/upstream/test_upstream"
        );
        assert_eq!(
            urls.proxy_global_config,
            "http://localhost:1323/proxy/gw/globalconfig/test_gc"
        );
        assert_eq!(urls.route_filter, "http://localhost:1323/filter/test_filter_rl");
        assert_eq!(urls.service_filter, "http://localhost:1323/filter/test_filter_lua");
    }

    #[test]
    fn test_create_table() {
        let table = command_table(Operation::Create, &Config::default());
        assert_eq!(
            table.sequences(),
            vec![25, 50, 75, 100, 125, 130, 140, 150, 160, 175, 185, 200, 225]
        );

        let steps = table.steps();
        assert_eq!(steps[0].verb, Verb::GET);
        assert!(steps[1..].iter().all(|s| s.verb == Verb::POST));

        let with_body: Vec<u32> = steps
            .iter()
            .filter(|s| s.argument.is_some())
            .map(|s| s.sequence)
            .collect();
        assert_eq!(with_body, vec![50, 75, 100, 125, 150, 175, 200, 225]);

        let proxy_body = steps[1].argument.as_ref().unwrap().to_json().unwrap();
        assert_eq!(proxy_body, br#"{"Name":"gw"}"#);
    }

    #[test]
    fn test_delete_table() {
        let table = command_table(Operation::Delete, &Config::default());
        assert_eq!(
            table.sequences(),
            vec![10, 12, 20, 22, 24, 25, 45, 50, 75, 80, 100, 125]
        );
        assert!(table
            .steps()
            .iter()
            .all(|s| s.verb == Verb::DELETE && s.argument.is_none()));
        assert_eq!(
            table.steps().last().unwrap().target,
            "http://localhost:1323/proxy/gw"
        );
    }

    #[test]
    fn test_show_table() {
        let table = command_table(Operation::Show, &Config::default());
        assert_eq!(table.sequences(), vec![25, 50, 75, 100, 125, 150, 175]);
        assert!(table.steps().iter().all(|s| s.verb == Verb::GET));
        assert_eq!(table.steps()[0].label, " -- DUMP PROXY -- ");
    }

    #[test]
    fn test_table_follows_config() {
        let mut config = Config::default();
        config.base_url = "http://gw.internal:9000/".to_string();
        config.proxy.name = "edge".to_string();

        let table = command_table(Operation::Delete, &config);
        assert_eq!(
            table.steps().last().unwrap().target,
            "http://gw.internal:9000/proxy/edge"
        );
    }
}
