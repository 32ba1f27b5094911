use std::thread;
use std::time::Duration;

fn should_retry_http_status(status: u16) -> bool {
    status == 408 || status == 429 || (500..=599).contains(&status)
}

/// Blocking GET returning the response body as text. Retryable statuses
/// and transport errors are retried up to `attempts` times with
/// `retry_delay` between tries; hard client errors fail immediately.
pub(crate) fn get_text_with_retries(
    url: &str,
    connect_timeout: Duration,
    read_timeout: Duration,
    attempts: usize,
    retry_delay: Duration,
) -> Result<String, String> {
    let attempts = attempts.max(1);

    for attempt in 1..=attempts {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(connect_timeout)
            .timeout_read(read_timeout)
            .timeout_write(read_timeout)
            .build();

        match agent.get(url).call() {
            Ok(response) => match response.into_string() {
                Ok(body) => return Ok(body),
                Err(err) => {
                    return Err(format!("request failed: response decode failed: {err}"));
                }
            },
            Err(ureq::Error::Status(status, response)) => {
                let body = response.into_string().unwrap_or_default();
                let body = body.trim();
                let status_error = if body.is_empty() {
                    format!("HTTP status {status}")
                } else {
                    let truncated = body.chars().take(240).collect::<String>();
                    format!("HTTP status {status} ({truncated})")
                };

                if should_retry_http_status(status) {
                    if attempt < attempts {
                        thread::sleep(retry_delay);
                        continue;
                    }
                    return Err(format!(
                        "request failed after {attempts} attempt(s): {status_error}"
                    ));
                }

                return Err(format!("request failed: {status_error}"));
            }
            Err(ureq::Error::Transport(err)) => {
                if attempt < attempts {
                    thread::sleep(retry_delay);
                    continue;
                }
                return Err(format!(
                    "request failed after {attempts} attempt(s): transport error: {err}"
                ));
            }
        }
    }

    Err("request failed: exhausted attempts without a concrete error".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Serves a canned queue of (status, body) responses, one per
    /// connection, then answers 200 "fallback" for anything extra.
    struct CannedServer {
        base_url: String,
        served: Arc<AtomicUsize>,
    }

    impl CannedServer {
        fn spawn(responses: Vec<(u16, &str)>) -> Self {
            let listener = TcpListener::bind(("127.0.0.1", 0)).expect("bind test server");
            let addr = listener.local_addr().expect("local addr");
            let served = Arc::new(AtomicUsize::new(0));
            let served_clone = Arc::clone(&served);
            let queue = Arc::new(Mutex::new(
                responses
                    .into_iter()
                    .map(|(status, body)| (status, body.to_string()))
                    .collect::<VecDeque<_>>(),
            ));
            let total = queue.lock().expect("lock").len();

            thread::spawn(move || {
                // One connection per queued response; the listener drops
                // with the thread once the queue is drained.
                for _ in 0..total {
                    let Ok((mut stream, _)) = listener.accept() else {
                        break;
                    };
                    served_clone.fetch_add(1, Ordering::SeqCst);
                    let (status, body) = queue
                        .lock()
                        .expect("lock")
                        .pop_front()
                        .unwrap_or((200, "fallback".to_string()));

                    let mut buf = [0_u8; 1024];
                    let _ = stream.set_read_timeout(Some(Duration::from_millis(200)));
                    let _ = stream.read(&mut buf);

                    let reason = match status {
                        200 => "OK",
                        404 => "Not Found",
                        500 => "Internal Server Error",
                        503 => "Service Unavailable",
                        _ => "Status",
                    };
                    let _ = write!(
                        stream,
                        "HTTP/1.1 {status} {reason}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    let _ = stream.flush();
                }
            });

            Self {
                base_url: format!("http://{addr}"),
                served,
            }
        }

        fn request_count(&self) -> usize {
            self.served.load(Ordering::SeqCst)
        }
    }

    #[test]
    fn retries_server_errors_until_success() {
        let server = CannedServer::spawn(vec![(500, "boom"), (503, "down"), (200, "ok")]);

        let body = get_text_with_retries(
            &server.base_url,
            Duration::from_millis(200),
            Duration::from_millis(200),
            3,
            Duration::from_millis(1),
        )
        .expect("should succeed on the third attempt");

        assert_eq!(body, "ok");
        assert_eq!(server.request_count(), 3);
    }

    #[test]
    fn does_not_retry_hard_client_errors() {
        let server = CannedServer::spawn(vec![(404, "nope")]);

        let err = get_text_with_retries(
            &server.base_url,
            Duration::from_millis(200),
            Duration::from_millis(200),
            5,
            Duration::from_millis(1),
        )
        .expect_err("404 must not be retried");

        assert!(err.contains("HTTP status 404"), "unexpected error: {err}");
        assert_eq!(server.request_count(), 1);
    }

    #[test]
    fn reports_exhausted_attempts_for_persistent_failures() {
        let server = CannedServer::spawn(vec![(503, "down"), (503, "still down")]);

        let err = get_text_with_retries(
            &server.base_url,
            Duration::from_millis(200),
            Duration::from_millis(200),
            2,
            Duration::from_millis(1),
        )
        .expect_err("persistent 503 must error out");

        assert!(
            err.contains("after 2 attempt(s)") && err.contains("HTTP status 503"),
            "unexpected error: {err}"
        );
        assert_eq!(server.request_count(), 2);
    }
}
