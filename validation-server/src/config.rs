use std::net::SocketAddr;

use envconfig::Envconfig;

#[derive(Envconfig, Clone)]
pub struct Config {
    #[envconfig(default = "127.0.0.1:3400")]
    pub address: SocketAddr,

    #[envconfig(default = "http://localhost:8000/live/flags.json")]
    pub flag_poll_url: String,

    #[envconfig(default = "300")]
    pub flag_poll_interval_secs: u64,

    #[envconfig(default = "true")]
    pub export_prometheus: bool,
}
