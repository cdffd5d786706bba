//! Configuration records for the envfig demo application.
//!
//! [`DemoConfig`] nests two sections, [`ServerConfig`] and [`DisplayConfig`].
//! Every field carries an `env` key, so the variables are:
//!
//! | Env var                   | Field                    |
//! |---------------------------|--------------------------|
//! | `NAME`                    | `name`                   |
//! | `VERBOSE`                 | `verbose`                |
//! | `SERVER_HOST`             | `server.host`            |
//! | `SERVER_PORT`             | `server.port`            |
//! | `SERVER_MAX_CONNECTIONS`  | `server.max_connections` |
//! | `SERVER_READ_TIMEOUT`     | `server.read_timeout`    |
//! | `SERVER_PEERS`            | `server.peers`           |
//! | `DISPLAY_COLOR`           | `display.color`          |
//! | `DISPLAY_FORMAT`          | `display.format`         |

use std::time::Duration;

use envfig::Config;

/// Root configuration for the demo application.
#[derive(Config, Debug, Default)]
pub struct DemoConfig {
    /// Application name shown in the echo banner.
    #[config(env = "name", conform = "trim,default=envfig-demo")]
    pub name: String,

    #[config(env = "verbose")]
    pub verbose: bool,

    #[config(env = "server", nested)]
    pub server: ServerConfig,

    #[config(env = "display", nested)]
    pub display: DisplayConfig,
}

#[derive(Config, Debug, Default)]
pub struct ServerConfig {
    #[config(env = "host", conform = "trim,default=127.0.0.1", validate = "required,ip")]
    pub host: String,

    #[config(env = "port", conform = "default=8080", validate = "min=1024")]
    pub port: u16,

    #[config(env = "max_connections", conform = "default=100", validate = "min=1,max=10000")]
    pub max_connections: u32,

    #[config(env = "read_timeout", conform = "default=30s", validate = "max=5m")]
    pub read_timeout: Duration,

    /// Upstream peers, comma-separated. Optional, but at least two when given.
    #[config(env = "peers", validate = "omitempty,min=2")]
    pub peers: Vec<String>,
}

#[derive(Config, Debug, Default)]
pub struct DisplayConfig {
    /// red, green, yellow, blue, magenta, cyan or white.
    #[config(
        env = "color",
        conform = "trim,lcase,default=yellow",
        validate = "oneof=red green yellow blue magenta cyan white"
    )]
    pub color: String,

    #[config(env = "format", conform = "lcase,default=table", validate = "oneof=table plain")]
    pub format: String,
}
