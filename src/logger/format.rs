//! Access log format module
//!
//! Supports multiple log formats:
//! - `combined` (Apache/Nginx combined format)
//! - `common` (Common Log Format - CLF)
//! - `json` (JSON structured logging)
//! - Custom patterns with variables

use chrono::Local;
use hyper::{Request, Response};
use std::net::SocketAddr;
use std::time::Duration;

const CLF_TIME_FORMAT: &str = "%d/%b/%Y:%H:%M:%S %z";

/// Access log entry containing all request/response information
#[derive(Debug, Clone)]
pub struct AccessLogEntry {
    /// Client IP address
    pub remote_addr: String,
    /// Request timestamp
    pub time: chrono::DateTime<Local>,
    pub method: String,
    pub path: String,
    /// Query string (without leading ?)
    pub query: Option<String>,
    /// HTTP version (1.0, 1.1, 2)
    pub http_version: String,
    pub status: u16,
    /// Response body size in bytes
    pub body_bytes: u64,
    pub referer: Option<String>,
    pub user_agent: Option<String>,
    /// Request processing time in microseconds
    pub request_time_us: u64,
}

impl AccessLogEntry {
    /// Capture one request/response exchange
    pub fn from_exchange<B, R>(
        req: &Request<B>,
        resp: &Response<R>,
        peer_addr: SocketAddr,
        elapsed: Duration,
    ) -> Self {
        let header = |name: &str| {
            req.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(ToString::to_string)
        };
        let body_bytes = resp
            .headers()
            .get(hyper::header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);

        Self {
            remote_addr: peer_addr.ip().to_string(),
            time: Local::now(),
            method: req.method().to_string(),
            path: req.uri().path().to_string(),
            query: req.uri().query().map(ToString::to_string),
            http_version: http_version(req.version()).to_string(),
            status: resp.status().as_u16(),
            body_bytes,
            referer: header("referer"),
            user_agent: header("user-agent"),
            request_time_us: u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX),
        }
    }

    /// Format the log entry according to the specified format
    pub fn format(&self, format: &str) -> String {
        match format {
            "combined" => format!(
                "{} \"{}\" \"{}\"",
                self.format_common(),
                self.referer.as_deref().unwrap_or("-"),
                self.user_agent.as_deref().unwrap_or("-"),
            ),
            "common" => self.format_common(),
            "json" => self.format_json(),
            custom => self.format_custom(custom),
        }
    }

    fn request_uri(&self) -> String {
        match &self.query {
            Some(q) => format!("{}?{q}", self.path),
            None => self.path.clone(),
        }
    }

    /// `$remote_addr - - [$time_local] "$request" $status $body_bytes_sent`
    fn format_common(&self) -> String {
        format!(
            "{} - - [{}] \"{} {} HTTP/{}\" {} {}",
            self.remote_addr,
            self.time.format(CLF_TIME_FORMAT),
            self.method,
            self.request_uri(),
            self.http_version,
            self.status,
            self.body_bytes,
        )
    }

    fn format_json(&self) -> String {
        serde_json::json!({
            "remote_addr": self.remote_addr,
            "time": self.time.to_rfc3339(),
            "method": self.method,
            "path": self.path,
            "query": self.query,
            "http_version": self.http_version,
            "status": self.status,
            "body_bytes": self.body_bytes,
            "referer": self.referer,
            "user_agent": self.user_agent,
            "request_time_us": self.request_time_us,
        })
        .to_string()
    }

    /// Custom format with variable substitution
    ///
    /// Supported variables: `$remote_addr`, `$time_local`, `$time_iso8601`,
    /// `$request`, `$request_method`, `$request_uri`, `$status`,
    /// `$body_bytes_sent`, `$http_referer`, `$http_user_agent`,
    /// `$request_time` (seconds, 3 decimal places).
    ///
    /// The pattern is expanded in one pass; substituted values are never
    /// scanned for variables again.
    fn format_custom(&self, pattern: &str) -> String {
        let mut out = String::with_capacity(pattern.len() * 2);
        let mut rest = pattern;

        while let Some(pos) = rest.find('$') {
            out.push_str(&rest[..pos]);
            rest = &rest[pos..];
            // Longest names first so `$request_uri` wins over `$request`
            match CUSTOM_VARIABLES.iter().find(|v| rest.starts_with(**v)) {
                Some(var) => {
                    out.push_str(&self.variable(var));
                    rest = &rest[var.len()..];
                }
                None => {
                    out.push('$');
                    rest = &rest[1..];
                }
            }
        }
        out.push_str(rest);
        out
    }

    fn variable(&self, name: &str) -> String {
        match name {
            "$remote_addr" => self.remote_addr.clone(),
            "$time_local" => self.time.format(CLF_TIME_FORMAT).to_string(),
            "$time_iso8601" => self.time.to_rfc3339(),
            "$request_time" => {
                #[allow(clippy::cast_precision_loss)]
                let secs = self.request_time_us as f64 / 1_000_000.0;
                format!("{secs:.3}")
            }
            "$request_method" => self.method.clone(),
            "$request_uri" => self.request_uri(),
            "$request" => format!(
                "{} {} HTTP/{}",
                self.method,
                self.request_uri(),
                self.http_version
            ),
            "$status" => self.status.to_string(),
            "$body_bytes_sent" => self.body_bytes.to_string(),
            "$http_referer" => self.referer.clone().unwrap_or_else(|| "-".to_string()),
            "$http_user_agent" => self.user_agent.clone().unwrap_or_else(|| "-".to_string()),
            _ => String::new(),
        }
    }
}

/// Custom pattern variables, longest first where one prefixes another
const CUSTOM_VARIABLES: [&str; 11] = [
    "$remote_addr",
    "$time_local",
    "$time_iso8601",
    "$request_method",
    "$request_time",
    "$request_uri",
    "$request",
    "$status",
    "$body_bytes_sent",
    "$http_referer",
    "$http_user_agent",
];

fn http_version(version: hyper::Version) -> &'static str {
    match version {
        hyper::Version::HTTP_09 => "0.9",
        hyper::Version::HTTP_10 => "1.0",
        hyper::Version::HTTP_2 => "2",
        hyper::Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_entry() -> AccessLogEntry {
        let req = Request::builder()
            .uri("/_static/theme.css?v=1")
            .header("referer", "https://cheats.example.com/")
            .header("user-agent", "Mozilla/5.0")
            .body(())
            .unwrap();
        let resp = Response::builder()
            .status(200)
            .header("content-length", "1234")
            .body(())
            .unwrap();
        AccessLogEntry::from_exchange(
            &req,
            &resp,
            "192.168.1.1:51000".parse().unwrap(),
            Duration::from_micros(1600),
        )
    }

    #[test]
    fn test_from_exchange() {
        let entry = create_test_entry();
        assert_eq!(entry.remote_addr, "192.168.1.1");
        assert_eq!(entry.path, "/_static/theme.css");
        assert_eq!(entry.query.as_deref(), Some("v=1"));
        assert_eq!(entry.body_bytes, 1234);
        assert_eq!(entry.request_time_us, 1600);
    }

    #[test]
    fn test_format_combined() {
        let log = create_test_entry().format("combined");
        assert!(log.starts_with("192.168.1.1 - - ["));
        assert!(log.contains("\"GET /_static/theme.css?v=1 HTTP/1.1\" 200 1234"));
        assert!(log.ends_with("\"https://cheats.example.com/\" \"Mozilla/5.0\""));
    }

    #[test]
    fn test_format_common() {
        let log = create_test_entry().format("common");
        assert!(log.contains("\"GET /_static/theme.css?v=1 HTTP/1.1\" 200 1234"));
        // Common format does not include referer/user-agent
        assert!(!log.contains("Mozilla"));
    }

    #[test]
    fn test_format_json() {
        let log = create_test_entry().format("json");
        let value: serde_json::Value = serde_json::from_str(&log).unwrap();
        assert_eq!(value["remote_addr"], "192.168.1.1");
        assert_eq!(value["status"], 200);
        assert_eq!(value["query"], "v=1");
        assert_eq!(value["body_bytes"], 1234);
    }

    #[test]
    fn test_format_custom() {
        let log = create_test_entry().format("$remote_addr $request_method $status $request_time");
        // 1600us rounds to 0.002s at 3 decimal places
        assert_eq!(log, "192.168.1.1 GET 200 0.002");
    }

    #[test]
    fn test_custom_does_not_expand_client_input() {
        let req = Request::builder()
            .uri("/$status/$remote_addr")
            .header("user-agent", "$request_time")
            .body(())
            .unwrap();
        let resp = Response::builder().status(404).body(()).unwrap();
        let entry = AccessLogEntry::from_exchange(
            &req,
            &resp,
            "10.0.0.1:4000".parse().unwrap(),
            Duration::from_micros(10),
        );

        let log = entry.format("$request_uri $status \"$http_user_agent\" $$x");
        assert_eq!(log, "/$status/$remote_addr 404 \"$request_time\" $$x");
        assert_eq!(
            entry.format("$request"),
            "GET /$status/$remote_addr HTTP/1.1"
        );
    }
}
