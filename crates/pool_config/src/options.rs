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
use crate::errors::{ConfigError, UrlError};
use percent_encoding::percent_decode_str;
use std::fmt;
use std::{borrow::Cow, time::Duration};
use url::Url;

type Result<T> = std::result::Result<T, UrlError>;

pub(crate) const DEFAULT_MIN_POOL_SIZE: u16 = 2;
pub(crate) const DEFAULT_MAX_POOL_SIZE: u16 = 10;
pub(crate) const DEFAULT_TCP_PORT: u16 = 9000;
pub(crate) const DEFAULT_TLS_PORT: u16 = 9009;

/// Pool sizing and behaviour settings.
///
/// The target selection code never looks inside; the settings are kept
/// for the owning pool and handed back unchanged by `PoolConfig::options`.
#[derive(Clone, PartialEq, Debug)]
pub struct PoolOptions {
    /// Lower bound of idle connections kept by the pool (defaults to 2).
    pub(crate) pool_min: u16,
    /// Upper bound of connections the pool may issue (defaults to 10).
    pub(crate) pool_max: u16,
    /// Timeout for connection (defaults to `500 ms`)
    pub(crate) connection_timeout: Duration,
    /// Ping server every time before a connection is handed out. (defaults to `true`)
    pub(crate) ping_before_query: bool,
    /// Timeout for ping (defaults to `700 ms`)
    pub(crate) ping_timeout: Duration,
    /// TCP keep alive timeout (defaults to `None`).
    pub(crate) keepalive: Option<Duration>,
    /// The number of retries to send request to server. (defaults to `3`)
    pub(crate) send_retries: u8,
    /// Amount of time to wait before next retry. (defaults to `1 sec`)
    pub(crate) retry_timeout: Duration,
}

impl Default for PoolOptions {
    fn default() -> Self {
        PoolOptions {
            pool_min: DEFAULT_MIN_POOL_SIZE,
            pool_max: DEFAULT_MAX_POOL_SIZE,
            connection_timeout: Duration::from_millis(500),
            ping_before_query: true,
            ping_timeout: Duration::from_millis(700),
            keepalive: None,
            send_retries: 3,
            retry_timeout: Duration::from_secs(1),
        }
    }
}

impl PoolOptions {
    #[inline]
    pub fn pool_min(&self) -> u16 {
        self.pool_min
    }
    #[inline]
    pub fn pool_max(&self) -> u16 {
        self.pool_max
    }
    #[inline]
    pub fn connection_timeout(&self) -> Duration {
        self.connection_timeout
    }
    #[inline]
    pub fn ping_before_query(&self) -> bool {
        self.ping_before_query
    }
    #[inline]
    pub fn ping_timeout(&self) -> Duration {
        self.ping_timeout
    }
    #[inline]
    pub fn keepalive(&self) -> Option<Duration> {
        self.keepalive
    }
    #[inline]
    pub fn send_retries(&self) -> u8 {
        self.send_retries
    }
    #[inline]
    pub fn retry_timeout(&self) -> Duration {
        self.retry_timeout
    }

    pub fn with_pool(mut self, min: u16, max: u16) -> Self {
        self.pool_min = min;
        self.pool_max = max;
        self
    }

    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    pub fn with_ping(mut self, ping: bool) -> Self {
        self.ping_before_query = ping;
        self
    }

    pub fn with_retries(mut self, retries: u8, timeout: Duration) -> Self {
        self.send_retries = retries;
        self.retry_timeout = timeout;
        self
    }

    /// Check pool boundaries
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.pool_max < self.pool_min {
            return Err(ConfigError::InvalidPoolConstraints {
                min: self.pool_min,
                max: self.pool_max,
            });
        }
        Ok(())
    }
}

/// Remote endpoint and credentials of a single server.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ConnectOptions {
    pub(crate) host: String,
    pub(crate) port: u16,
    pub(crate) database: String,
    pub(crate) username: String,
    pub(crate) password: String,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        ConnectOptions {
            host: "localhost".into(),
            port: DEFAULT_TCP_PORT,
            database: "default".into(),
            username: "default".into(),
            password: "".into(),
        }
    }
}

impl ConnectOptions {
    pub fn new(host: impl ToString, port: u16) -> Self {
        ConnectOptions {
            host: host.to_string(),
            port,
            ..Default::default()
        }
    }

    #[inline]
    pub fn host(&self) -> &str {
        &self.host
    }
    #[inline]
    pub fn port(&self) -> u16 {
        self.port
    }
    #[inline]
    pub fn database(&self) -> &str {
        &self.database
    }
    #[inline]
    pub fn username(&self) -> &str {
        &self.username
    }
    #[inline]
    pub fn password(&self) -> &str {
        &self.password
    }
    /// Socket address in `host:port` form
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    #[inline]
    pub fn with_host(mut self, value: impl ToString) -> Self {
        self.host = value.to_string();
        self
    }
    #[inline]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }
    #[inline]
    pub fn with_database(mut self, value: impl ToString) -> Self {
        self.database = value.to_string();
        self
    }
    #[inline]
    pub fn with_username(mut self, value: impl ToString) -> Self {
        self.username = value.to_string();
        self
    }
    #[inline]
    pub fn with_password(mut self, value: impl ToString) -> Self {
        self.password = value.to_string();
        self
    }
}

impl fmt::Debug for ConnectOptions {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // password is never printed
        f.debug_struct("ConnectOptions")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("username", &self.username)
            .finish()
    }
}

impl fmt::Display for ConnectOptions {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}@{}:{}/{}", self.username, self.host, self.port, self.database)
    }
}

/// Run `parse` on a query parameter value, naming the parameter on failure
fn parse_param<'a, F, T>(param: Cow<'a, str>, value: Cow<'a, str>, parse: F) -> Result<T>
where
    F: Fn(&str) -> Option<T>,
{
    parse(&*value).ok_or_else(|| UrlError::InvalidParamValue {
        param: param.into_owned(),
        value: value.into_owned(),
    })
}

/// Percent-decode a url component
fn decode_component(param: &str, raw: &str) -> Result<String> {
    percent_decode_str(raw)
        .decode_utf8()
        .map(Cow::into_owned)
        .map_err(|_| UrlError::InvalidParamValue {
            param: param.into(),
            value: raw.into(),
        })
}

/// The database is the only path segment, if present
fn database_from_url(url: &Url) -> Result<Option<String>> {
    let segments: Vec<&str> = url
        .path_segments()
        .map(|segments| segments.collect())
        .unwrap_or_default();
    match segments.as_slice() {
        [] | [""] => Ok(None),
        [database] => decode_component("database", database).map(Some),
        _ => Err(UrlError::Invalid),
    }
}

/// `<n>ms`, `<n>s`, or a bare `<n>` counted in seconds
fn parse_duration(source: &str) -> Option<Duration> {
    if let Some(millis) = source.strip_suffix("ms") {
        return millis.parse::<u64>().ok().map(Duration::from_millis);
    }
    let secs = source.strip_suffix('s').unwrap_or(source);
    secs.parse::<u64>().ok().map(Duration::from_secs)
}

/// Like `parse_duration`, `none` disables the setting
fn parse_opt_duration(source: &str) -> Option<Option<Duration>> {
    match source {
        "none" => Some(None),
        _ => parse_duration(source).map(Some),
    }
}

/// Split `name[:port]` into host name and port number.
/// A missing port is replaced with `default_port`. IPv6 literals must be
/// bracketed, `[::1]` or `[::1]:9000`, and keep their brackets.
pub(crate) fn parse_host_port(source: &str, default_port: u16) -> Option<(String, u16)> {
    let (host, port) = if source.starts_with('[') {
        let end = source.find(']')?;
        match &source[end + 1..] {
            "" => (&source[..=end], None),
            rest => (&source[..=end], Some(rest.strip_prefix(':')?)),
        }
    } else {
        match source.rfind(':') {
            Some(pos) => (&source[..pos], Some(&source[pos + 1..])),
            None => (source, None),
        }
    };
    let port = match port {
        Some(port) => port.parse::<u16>().ok()?,
        None => default_port,
    };
    if host.is_empty() || host == "[]" {
        return None;
    }
    Some((host.to_string(), port))
}

/// Parse connection url
/// `tcp://[username[:password]@]host[:port][/database][?param=value&...]`
///
/// Returns the pool settings and the list of servers. The first server
/// comes from the url authority, each `host` parameter appends another
/// one sharing the same credentials and database.
pub(crate) fn parse_url(url: &Url) -> Result<(PoolOptions, Vec<ConnectOptions>)> {
    let defport = match url.scheme() {
        "tcp" => DEFAULT_TCP_PORT,
        "tls" => DEFAULT_TLS_PORT,
        _ => {
            return Err(UrlError::UnsupportedScheme {
                scheme: url.scheme().to_string(),
            })
        }
    };

    if url.cannot_be_a_base() || !url.has_host() {
        return Err(UrlError::Invalid);
    }

    let mut options = crate::DEF_OPTIONS.clone();
    let mut primary = ConnectOptions::default();

    let user = url.username();
    if !user.is_empty() {
        primary.username = decode_component("username", user)?;
    }
    if let Some(password) = url.password() {
        primary.password = decode_component("password", password)?;
    }
    primary.host = url.host_str().unwrap_or("localhost").into();
    primary.port = url.port().unwrap_or(defport);

    if let Some(database) = database_from_url(url)? {
        primary.database = database;
    }

    let mut extra: Vec<(String, u16)> = Vec::new();
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "pool_min" => options.pool_min = parse_param(key, value, |v| v.parse::<u16>().ok())?,
            "pool_max" => options.pool_max = parse_param(key, value, |v| v.parse::<u16>().ok())?,
            "keepalive" => options.keepalive = parse_param(key, value, parse_opt_duration)?,
            "ping_before_query" => {
                options.ping_before_query = parse_param(key, value, |v| v.parse::<bool>().ok())?
            }
            "send_retries" => {
                options.send_retries = parse_param(key, value, |v| v.parse::<u8>().ok())?
            }
            "retry_timeout" => options.retry_timeout = parse_param(key, value, parse_duration)?,
            "ping_timeout" => options.ping_timeout = parse_param(key, value, parse_duration)?,
            "connection_timeout" => {
                options.connection_timeout = parse_param(key, value, parse_duration)?
            }
            "host" => extra.push(parse_param(key, value, |v| parse_host_port(v, defport))?),
            _ => return Err(UrlError::UnknownParameter { param: key.into() }),
        };
    }

    let mut servers = Vec::with_capacity(extra.len() + 1);
    for (host, port) in extra {
        servers.push(primary.clone().with_host(host).with_port(port));
    }
    servers.insert(0, primary);
    Ok((options, servers))
}
