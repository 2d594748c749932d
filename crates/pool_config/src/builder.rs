/*   Copyright (c) 2020 TensorBase, and its contributors

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.*/
use crate::{
    config::PoolConfig,
    errors::{ConfigError, Result, UrlError},
    options::{parse_host_port, ConnectOptions, PoolOptions, DEFAULT_TCP_PORT},
};

/// Pool config builder
///
/// # Example
/// `
/// let config = PoolConfigBuilder::default()
///    .with_database("default")
///    .with_username("default")
///    .with_password("")
///    .add_addr("www.example.com:9000")
///    .build::<Conn>()
///    .unwrap();
/// `
pub struct PoolConfigBuilder {
    addr: Vec<String>,
    username: Option<String>,
    password: Option<String>,
    database: Option<String>,
    pool_min: u16,
    pool_max: u16,
    ping: bool,
}

impl PoolConfigBuilder {
    /// If set, the pool checks server availability every time
    /// a connection is taken from it.
    #[inline]
    pub fn with_ping(mut self) -> Self {
        self.ping = true;
        self
    }
    /// Set connection pool boundaries
    /// min - set the number of idle connection that the pool can keep up to
    /// max - set maximum number of connection that pool can issued
    #[inline]
    pub fn with_pool(mut self, min: u16, max: u16) -> Self {
        self.pool_min = min;
        self.pool_max = max;
        self
    }

    /// Set the username that is used in authentication
    #[inline]
    pub fn with_username(mut self, value: impl ToString) -> Self {
        self.username = Some(value.to_string());
        self
    }
    /// Set the default database of every connection
    #[inline]
    pub fn with_database(mut self, value: impl ToString) -> Self {
        self.database = Some(value.to_string());
        self
    }
    /// Set password that is used in authentication
    #[inline]
    pub fn with_password(mut self, value: impl ToString) -> Self {
        self.password = Some(value.to_string());
        self
    }

    /// Add server host address in `host[:port]` form.
    ///
    /// With several addresses new connections go to them in turn,
    /// in the order they were added.
    #[inline]
    pub fn add_addr(mut self, value: impl ToString) -> Self {
        self.addr.push(value.to_string());
        self
    }

    /// Convert the builder into a `PoolConfig`.
    pub fn build<C>(self) -> Result<PoolConfig<C>> {
        let mut options: PoolOptions = crate::DEF_OPTIONS.clone();
        options.pool_min = self.pool_min;
        options.pool_max = self.pool_max;
        options.ping_before_query = self.ping;
        options.validate()?;

        let mut proto = ConnectOptions::default();
        if let Some(username) = self.username {
            proto.username = username;
        }
        if let Some(password) = self.password {
            proto.password = password;
        }
        if let Some(database) = self.database {
            proto.database = database;
        }

        let mut servers = Vec::with_capacity(self.addr.len());
        for addr in self.addr {
            let (host, port) = parse_host_port(&addr, DEFAULT_TCP_PORT).ok_or_else(|| {
                UrlError::InvalidParamValue {
                    param: "addr".into(),
                    value: addr.clone(),
                }
            })?;
            servers.push(proto.clone().with_host(host).with_port(port));
        }

        let mut config = PoolConfig::new(options);
        match servers.len() {
            0 => return Err(ConfigError::EmptyTargetList.into()),
            1 => {
                config.connecting_to(servers.remove(0));
            }
            _ => {
                config.connecting_to_all(servers)?;
            }
        }
        Ok(config)
    }
}

impl Default for PoolConfigBuilder {
    fn default() -> Self {
        PoolConfigBuilder {
            addr: Vec::new(),
            username: None,
            password: None,
            database: None,
            pool_min: crate::DEF_OPTIONS.pool_min,
            pool_max: crate::DEF_OPTIONS.pool_max,
            ping: false,
        }
    }
}
