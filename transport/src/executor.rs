//! Blocking executor for `HttpRequest` values, backed by ureq.
//!
//! ureq's status-as-error behavior is disabled so 4xx/5xx responses come
//! back as data and the core decides what they mean. Idempotent requests are
//! replayed according to the configured `RetryPolicy`.

use std::thread;
use std::time::{Duration, Instant};

use idblock_core::{
    ClientConfig, HttpMethod, HttpRequest, HttpResponse, MultipartForm, Outcome, RequestBody, RetryPolicy,
    TransportError, TransportErrorKind,
};
use tracing::{debug, warn};
use ureq::typestate::{WithBody, WithoutBody};
use ureq::unversioned::multipart::{Form, Part};
use ureq::{Agent, RequestBuilder};

#[derive(Debug, Clone)]
pub struct Transport {
    agent: Agent,
    timeout: Duration,
    retry: RetryPolicy,
}

impl Transport {
    pub fn new(config: &ClientConfig) -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(config.timeout))
            .build()
            .new_agent();
        Self {
            agent,
            timeout: config.timeout,
            retry: config.retry,
        }
    }

    pub fn retry(&self) -> RetryPolicy {
        self.retry
    }

    /// Execute with retries and the configured per-attempt timeout.
    pub fn execute(&self, request: &HttpRequest) -> Outcome {
        self.run(request, None)
    }

    /// Like [`execute`](Self::execute), but give up once `deadline` has
    /// elapsed across all attempts.
    pub fn execute_with_deadline(&self, request: &HttpRequest, deadline: Duration) -> Outcome {
        self.run(request, Some(Instant::now() + deadline))
    }

    fn run(&self, request: &HttpRequest, deadline: Option<Instant>) -> Outcome {
        let mut attempt = 0;
        loop {
            let timeout = match deadline {
                None => self.timeout,
                Some(at) => {
                    let remaining = at.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        return Err(TransportError::new(TransportErrorKind::Timeout, "deadline exceeded"));
                    }
                    remaining.min(self.timeout)
                }
            };

            let outcome = self.send(request, timeout);
            if !self.retry.should_retry(request.method, attempt, &outcome) {
                return outcome;
            }

            attempt += 1;
            let delay = self.retry.delay_for(attempt);
            if deadline.is_some_and(|at| Instant::now() + delay >= at) {
                return outcome;
            }
            match &outcome {
                Ok(response) => debug!(url = %request.url, status = response.status, attempt, ?delay, "retrying"),
                Err(err) => debug!(url = %request.url, error = %err, attempt, ?delay, "retrying"),
            }
            thread::sleep(delay);
        }
    }

    fn send(&self, request: &HttpRequest, timeout: Duration) -> Outcome {
        let url = request.url.as_str();

        let result = match request.method {
            HttpMethod::Get => without_body(self.agent.get(url), request, timeout).call(),
            HttpMethod::Delete => without_body(self.agent.delete(url), request, timeout).call(),
            HttpMethod::Post => with_body(self.agent.post(url), request, timeout),
            HttpMethod::Put => with_body(self.agent.put(url), request, timeout),
            HttpMethod::Patch => with_body(self.agent.patch(url), request, timeout),
        };

        let mut response = result.map_err(|e| {
            let err = classify(e);
            warn!(method = %request.method, url, error = %err, "transport error");
            err
        })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| Some((name.to_string(), value.to_str().ok()?.to_string())))
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| TransportError::new(TransportErrorKind::Body, e.to_string()))?;

        Ok(HttpResponse { status, headers, body })
    }
}

/// ureq form over the borrowed parts. ureq picks the boundary and sets the
/// multipart content type when the form is sent.
fn multipart_form(form: &MultipartForm) -> Result<Form<'_>, ureq::Error> {
    let mut out = Form::new();
    for part in form.parts() {
        let field = Part::bytes(&part.bytes)
            .file_name(&part.file_name)
            .mime_str(&part.content_type)?;
        out = out.part(&part.name, field);
    }
    Ok(out)
}

fn headers<B>(mut builder: RequestBuilder<B>, request: &HttpRequest) -> RequestBuilder<B> {
    for (name, value) in &request.headers {
        if name.eq_ignore_ascii_case("content-type") {
            continue;
        }
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn without_body(
    builder: RequestBuilder<WithoutBody>,
    request: &HttpRequest,
    timeout: Duration,
) -> RequestBuilder<WithoutBody> {
    headers(builder, request)
        .config()
        .timeout_global(Some(timeout))
        .build()
}

fn with_body(
    builder: RequestBuilder<WithBody>,
    request: &HttpRequest,
    timeout: Duration,
) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    let builder = headers(builder, request)
        .config()
        .timeout_global(Some(timeout))
        .build();
    match &request.body {
        None => builder.send_empty(),
        Some(RequestBody::Json(text)) => builder
            .content_type("application/json")
            .send(text.as_bytes()),
        Some(RequestBody::Multipart(form)) => builder.send(multipart_form(form)?),
    }
}

fn classify(err: ureq::Error) -> TransportError {
    let kind = match &err {
        ureq::Error::Timeout(_) => TransportErrorKind::Timeout,
        ureq::Error::HostNotFound | ureq::Error::ConnectionFailed => TransportErrorKind::Connect,
        ureq::Error::Io(io) => match io.kind() {
            std::io::ErrorKind::TimedOut => TransportErrorKind::Timeout,
            std::io::ErrorKind::ConnectionRefused
            | std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::ConnectionAborted
            | std::io::ErrorKind::NotConnected => TransportErrorKind::Connect,
            _ => TransportErrorKind::Other,
        },
        _ => TransportErrorKind::Other,
    };
    TransportError::new(kind, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};

    /// Read one request (head plus `content-length` body).
    fn read_request(stream: &mut TcpStream) -> Vec<u8> {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = stream.read(&mut chunk).unwrap();
            if n == 0 {
                return buf;
            }
            buf.extend_from_slice(&chunk[..n]);
            if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
                let len = head
                    .lines()
                    .find_map(|l| l.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + len {
                    return buf;
                }
            }
        }
    }

    /// Accept one connection, answer `{}` and hand back the raw request.
    fn capture_one() -> (String, thread::JoinHandle<Vec<u8>>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let origin = format!("http://{}", listener.local_addr().unwrap());
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let raw = read_request(&mut stream);
            stream
                .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 2\r\nconnection: close\r\n\r\n{}")
                .unwrap();
            raw
        });
        (origin, handle)
    }

    fn transport(origin: &str) -> Transport {
        Transport::new(
            &ClientConfig::new(origin)
                .with_timeout(Duration::from_secs(2))
                .with_retry(RetryPolicy::none()),
        )
    }

    #[test]
    fn multipart_body_is_framed_by_ureq() {
        let (origin, server) = capture_one();
        let form = MultipartForm::new().file("file", "face.jpg", "image/jpeg", vec![0xff, 0xd8, 0xff]);
        let request = HttpRequest {
            method: HttpMethod::Post,
            url: format!("{origin}/api/v1/auth/upload/profile-image"),
            headers: vec![("cache-control".into(), "no-cache".into())],
            body: Some(RequestBody::Multipart(form)),
        };
        let response = transport(&origin).execute(&request).unwrap();
        assert_eq!(response.status, 200);

        let raw = String::from_utf8_lossy(&server.join().unwrap()).to_string();
        let lower = raw.to_ascii_lowercase();
        let boundary = lower
            .lines()
            .find_map(|l| l.strip_prefix("content-type: multipart/form-data; boundary="))
            .unwrap()
            .trim()
            .to_string();
        assert!(lower.contains(&format!("--{boundary}--")));
        assert!(raw.contains("name=\"file\""));
        assert!(raw.contains("filename=\"face.jpg\""));
        assert!(lower.contains("content-type: image/jpeg"));
    }

    #[test]
    fn json_body_carries_json_content_type() {
        let (origin, server) = capture_one();
        let request = HttpRequest {
            method: HttpMethod::Post,
            url: format!("{origin}/api/v1/auth/login"),
            headers: vec![("content-type".into(), "application/json".into())],
            body: Some(RequestBody::Json(r#"{"email":"a@b.com"}"#.to_string())),
        };
        transport(&origin).execute(&request).unwrap();

        let raw = String::from_utf8_lossy(&server.join().unwrap()).to_string();
        assert!(raw.to_ascii_lowercase().contains("content-type: application/json"));
        assert!(raw.ends_with(r#"{"email":"a@b.com"}"#));
    }

    #[test]
    fn refused_connection_is_a_transport_outcome() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let request = HttpRequest {
            method: HttpMethod::Get,
            url: format!("http://{addr}/api/v1/common/country"),
            headers: Vec::new(),
            body: None,
        };
        assert!(transport(&format!("http://{addr}")).execute(&request).is_err());
    }
}
