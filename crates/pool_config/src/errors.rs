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
use std::result;

use thiserror::Error;
use url::ParseError;

use crate::target::TargetShape;

/// This type enumerates target configuration errors.
/// They are raised synchronously by the configuring call and leave
/// the previous configuration untouched.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum ConfigError {
    #[error("Empty target list")]
    EmptyTargetList,

    #[error(
        "Heterogeneous target shapes: target #{} is {}, but target #0 is {}",
        index,
        found,
        expected
    )]
    HeterogeneousTargetShapes {
        index: usize,
        expected: TargetShape,
        found: TargetShape,
    },

    #[error("Invalid pool constraints: pool_min ({}) > pool_max ({}).", min, max)]
    InvalidPoolConstraints { min: u16, max: u16 },
}

/// This type enumerates configuration URL errors.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum UrlError {
    #[error("Invalid or incomplete connection URL")]
    Invalid,

    #[error("Invalid value `{}' for connection URL parameter `{}'.", value, param)]
    InvalidParamValue { param: String, value: String },

    #[error("URL parse error: {}", _0)]
    Parse(#[source] ParseError),

    #[error("Unknown connection URL parameter `{}'.", param)]
    UnknownParameter { param: String },

    #[error("Unsupported connection URL scheme `{}'.", scheme)]
    UnsupportedScheme { scheme: String },
}

/// Failure of a deferred target computation.
///
/// Pending targets are shared between every caller that receives them,
/// so the error has to be cloneable.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum TargetError {
    #[error("Target lookup failed: {}", _0)]
    Lookup(String),
}

/// Consolidation of errors
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum Error {
    #[error("Configuration error: `{}'", _0)]
    Config(#[source] ConfigError),

    #[error("URL error: `{}'", _0)]
    Url(#[source] UrlError),

    #[error("Target error: `{}'", _0)]
    Target(#[source] TargetError),
}

pub type Result<T> = result::Result<T, Error>;

impl Error {
    pub fn is_config(&self) -> bool {
        matches!(self, Error::Config(_))
    }
}

impl From<ParseError> for UrlError {
    fn from(err: ParseError) -> Self {
        UrlError::Parse(err)
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Error::Url(err.into())
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::Config(err)
    }
}

impl From<UrlError> for Error {
    fn from(err: UrlError) -> Self {
        Error::Url(err)
    }
}

impl From<TargetError> for Error {
    fn from(err: TargetError) -> Self {
        Error::Target(err)
    }
}
