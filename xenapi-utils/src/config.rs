/**
    xenapi-rs provides a Rust based XenAPI client.
    Copyright (C) 2016 Star Lab Corp.

    This program is free software; you can redistribute it and/or modify
    it under the terms of the GNU General Public License as published by
    the Free Software Foundation; either version 2 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU General Public License for more details.

    You should have received a copy of the GNU General Public License along
    with this program; if not, see <http://www.gnu.org/licenses/>.
**/

// Where to connect and who to log in as.
//
// Command line flags win over the `XE_*` environment variables, which
// win over the `~/.xe` file the stock `xe` tool reads.

use clap::ArgMatches;
use std::env;
use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;
use xenapi::{Error, Result, Target};

pub const RC_FILE: &'static str = ".xe";
pub const DEFAULT_USERNAME: &'static str = "root";

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Config {
    pub server: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Config {
    /// Read `key=value` lines. Blank lines and `#` comments are skipped.
    pub fn parse_rc(text: &str) -> Config {
        let mut config = Config::default();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut kv = line.splitn(2, '=');
            let key = kv.next().unwrap_or("").trim();
            let value = match kv.next() {
                Some(value) => value.trim().to_owned(),
                None => {
                    warn!("ignoring {:?} in rc file", line);
                    continue;
                }
            };

            match key {
                "server" => config.server = Some(value),
                "port" => {
                    match value.parse() {
                        Ok(port) => config.port = Some(port),
                        Err(_) => warn!("ignoring bad port {:?} in rc file", value),
                    }
                }
                "username" => config.username = Some(value),
                "password" => config.password = Some(value),
                _ => debug!("ignoring unknown key {:?} in rc file", key),
            }
        }
        config
    }

    pub fn from_env<F>(var: F) -> Config
        where F: Fn(&str) -> Option<String>
    {
        Config {
            server: var("XE_SERVER"),
            port: None,
            username: var("XE_USERNAME"),
            password: var("XE_PASSWORD"),
        }
    }

    pub fn from_args(matches: &ArgMatches) -> Result<Config> {
        let port = match matches.value_of("port") {
            Some(port) => Some(parse_port(port)?),
            None => None,
        };

        Ok(Config {
               server: matches.value_of("server").map(String::from),
               port: port,
               username: matches.value_of("username").map(String::from),
               password: matches.value_of("password").map(String::from),
           })
    }

    /// Fill in whatever is unset here from `other`
    pub fn or(self, other: Config) -> Config {
        Config {
            server: self.server.or(other.server),
            port: self.port.or(other.port),
            username: self.username.or(other.username),
            password: self.password.or(other.password),
        }
    }

    pub fn load(matches: &ArgMatches) -> Result<Config> {
        let rc = match rc_path().map(|path| read_rc(&path)) {
            Some(Ok(config)) => config,
            Some(Err(ref e)) if e.kind() == io::ErrorKind::NotFound => Config::default(),
            Some(Err(e)) => {
                warn!("unable to read rc file: {}", e);
                Config::default()
            }
            None => Config::default(),
        };

        Ok(Config::from_args(matches)?
               .or(Config::from_env(|name| env::var(name).ok()))
               .or(rc))
    }

    /// With no server the local xapi socket is used
    pub fn target(&self) -> Result<Target> {
        let server = match self.server {
            Some(ref server) => server,
            None => return Ok(Target::local()),
        };

        match (server.parse::<Target>()?, self.port) {
            (Target::Http { host, .. }, Some(port)) => {
                Ok(Target::Http {
                       host: host,
                       port: port,
                   })
            }
            (Target::Unix(_), Some(_)) => {
                Err(Error::InvalidTarget(format!("a port makes no sense for {}", server)))
            }
            (target, None) => Ok(target),
        }
    }

    pub fn username(&self) -> &str {
        self.username.as_ref().map(|s| s.as_str()).unwrap_or(DEFAULT_USERNAME)
    }

    pub fn password(&self) -> &str {
        self.password.as_ref().map(|s| s.as_str()).unwrap_or("")
    }
}

fn parse_port(port: &str) -> Result<u16> {
    port.trim()
        .parse()
        .map_err(|_| Error::InvalidTarget(format!("bad port {:?}", port)))
}

fn rc_path() -> Option<PathBuf> {
    env::var_os("HOME").map(|home| PathBuf::from(home).join(RC_FILE))
}

fn read_rc(path: &PathBuf) -> io::Result<Config> {
    let mut text = String::new();
    File::open(path)?.read_to_string(&mut text)?;
    debug!("read {}", path.display());
    Ok(Config::parse_rc(&text))
}
