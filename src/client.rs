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

use codec::XenApiProto;
use error::{Error, Result};
use futures::{future, Future};
use std::fmt;
use std::io;
use std::net::ToSocketAddrs;
use std::path::PathBuf;
use std::str::FromStr;
use tokio_core::net::TcpStream;
use tokio_core::reactor::Handle;
use tokio_proto::TcpClient;
use tokio_proto::pipeline::ClientService;
use tokio_service::Service;
use tokio_uds::UnixStream;
use tokio_uds_proto::UnixClient;
use wire;

/// Where xapi is listening
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Target {
    Http { host: String, port: u16 },
    Unix(PathBuf),
}

impl Target {
    /// The socket xapi listens on inside dom0
    pub fn local() -> Target {
        Target::Unix(PathBuf::from(wire::LOCAL_SOCKET))
    }

    /// What to send as the `Host` header
    pub fn host_header(&self) -> String {
        match *self {
            Target::Http { ref host, port } => {
                let host = if host.contains(':') {
                    format!("[{}]", host)
                } else {
                    host.clone()
                };
                if port == wire::DEFAULT_PORT {
                    host
                } else {
                    format!("{}:{}", host, port)
                }
            }
            Target::Unix(_) => String::from("localhost"),
        }
    }
}

fn parse_port(port: &str, target: &str) -> Result<u16> {
    port.parse::<u16>()
        .map_err(|_| Error::InvalidTarget(format!("bad port in {:?}", target)))
}

impl FromStr for Target {
    type Err = Error;

    /// Accepts `http://host[:port][/]`, `unix:///path`, an absolute socket
    /// path, or a bare `host[:port]`.
    fn from_str(s: &str) -> Result<Target> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::InvalidTarget(String::from("empty target")));
        }

        if s.starts_with("unix://") {
            let path = &s["unix://".len()..];
            if path.is_empty() {
                return Err(Error::InvalidTarget(format!("no socket path in {:?}", s)));
            }
            return Ok(Target::Unix(PathBuf::from(path)));
        }

        if s.starts_with('/') {
            return Ok(Target::Unix(PathBuf::from(s)));
        }

        if s.starts_with("https://") {
            return Err(Error::InvalidTarget(format!("TLS is not supported, use http:// or the \
                                                     local socket: {:?}",
                                                    s)));
        }

        let rest = if s.starts_with("http://") {
            &s["http://".len()..]
        } else if s.contains("://") {
            return Err(Error::InvalidTarget(format!("unsupported scheme in {:?}", s)));
        } else {
            s
        };

        let mut parts = rest.splitn(2, '/');
        let authority = parts.next().unwrap_or("");
        if parts.next().map(|p| !p.is_empty()).unwrap_or(false) {
            warn!("ignoring path in {:?}, xapi only answers on /", s);
        }

        let (host, port) = if authority.starts_with('[') {
            // [v6addr]:port
            let end = authority.find(']')
                .ok_or_else(|| Error::InvalidTarget(format!("unterminated [ in {:?}", s)))?;
            let host = &authority[1..end];
            let port = match &authority[end + 1..] {
                "" => wire::DEFAULT_PORT,
                p if p.starts_with(':') => parse_port(&p[1..], s)?,
                _ => return Err(Error::InvalidTarget(format!("junk after ] in {:?}", s))),
            };
            (host, port)
        } else if authority.matches(':').count() == 1 {
            let mut hp = authority.splitn(2, ':');
            let host = hp.next().unwrap_or("");
            (host, parse_port(hp.next().unwrap_or(""), s)?)
        } else {
            // no port, or a bare v6 address
            (authority, wire::DEFAULT_PORT)
        };

        if host.is_empty() {
            return Err(Error::InvalidTarget(format!("no host in {:?}", s)));
        }

        Ok(Target::Http {
               host: host.to_owned(),
               port: port,
           })
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Target::Http { .. } => write!(f, "http://{}/", self.host_header()),
            Target::Unix(ref path) => write!(f, "unix://{}", path.display()),
        }
    }
}

enum Inner {
    Tcp(ClientService<TcpStream, XenApiProto>),
    Unix(ClientService<UnixStream, XenApiProto>),
}

/// A connection to xapi
pub struct Client {
    inner: Inner,
}

impl Client {
    pub fn connect(target: &Target, handle: &Handle) -> Box<Future<Item = Client, Error = Error>> {
        let proto = XenApiProto::new(target.host_header());

        match *target {
            Target::Http { ref host, port } => {
                let addr = match (host.as_str(), port).to_socket_addrs().map(|mut a| a.next()) {
                    Ok(Some(addr)) => addr,
                    Ok(None) => {
                        return Box::new(future::err(Error::InvalidTarget(format!("{} did not \
                                                                                   resolve",
                                                                                  host))))
                    }
                    Err(e) => return Box::new(future::err(Error::Io(e))),
                };

                debug!("connecting to {} at {}", target, addr);
                Box::new(TcpClient::new(proto)
                             .connect(&addr, handle)
                             .map(|conn| Client { inner: Inner::Tcp(conn) })
                             .map_err(Error::from))
            }
            Target::Unix(ref path) => {
                debug!("connecting to {}", target);
                Box::new(future::result(UnixClient::new(proto)
                                            .connect(path, handle)
                                            .map(|conn| Client { inner: Inner::Unix(conn) })
                                            .map_err(Error::from)))
            }
        }
    }
}

impl Service for Client {
    type Request = wire::Request;
    type Response = wire::Response;
    type Error = io::Error;
    type Future = Box<Future<Item = wire::Response, Error = io::Error>>;

    fn call(&self, req: Self::Request) -> Self::Future {
        match self.inner {
            Inner::Tcp(ref conn) => Box::new(conn.call(req)),
            Inner::Unix(ref conn) => Box::new(conn.call(req)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use super::*;

    fn http(host: &str, port: u16) -> Target {
        Target::Http {
            host: String::from(host),
            port: port,
        }
    }

    #[test]
    fn parse_http() {
        assert_eq!("http://xs1.example.com".parse::<Target>().unwrap(),
                   http("xs1.example.com", 80));
        assert_eq!("http://10.0.0.1:8080/".parse::<Target>().unwrap(),
                   http("10.0.0.1", 8080));
        assert_eq!("xs1".parse::<Target>().unwrap(), http("xs1", 80));
        assert_eq!("xs1:443".parse::<Target>().unwrap(), http("xs1", 443));
    }

    #[test]
    fn parse_v6() {
        assert_eq!("http://[fe80::1]:8080".parse::<Target>().unwrap(),
                   http("fe80::1", 8080));
        assert_eq!("fe80::1".parse::<Target>().unwrap(), http("fe80::1", 80));
    }

    #[test]
    fn parse_unix() {
        assert_eq!("unix:///var/lib/xcp/xapi".parse::<Target>().unwrap(),
                   Target::local());
        assert_eq!("/tmp/xapi.sock".parse::<Target>().unwrap(),
                   Target::Unix(PathBuf::from("/tmp/xapi.sock")));
    }

    #[test]
    fn parse_rejects() {
        assert!("".parse::<Target>().is_err());
        assert!("https://xs1".parse::<Target>().is_err());
        assert!("ftp://xs1".parse::<Target>().is_err());
        assert!("xs1:http".parse::<Target>().is_err());
        assert!("http://:80".parse::<Target>().is_err());
        assert!("unix://".parse::<Target>().is_err());
    }

    #[test]
    fn host_header() {
        assert_eq!(http("xs1", 80).host_header(), "xs1");
        assert_eq!(http("xs1", 8080).host_header(), "xs1:8080");
        assert_eq!(http("fe80::1", 8080).host_header(), "[fe80::1]:8080");
        assert_eq!(Target::local().host_header(), "localhost");
    }

    #[test]
    fn display() {
        assert_eq!(http("xs1", 8080).to_string(), "http://xs1:8080/");
        assert_eq!(Target::local().to_string(), "unix:///var/lib/xcp/xapi");
    }
}
