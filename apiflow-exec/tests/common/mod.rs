#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use apiflow_core::{parse_flow_str, DocumentFormat, Flow};
use apiflow_exec::{Event, EventSink, HttpClient, HttpError, HttpRequest, HttpResponse};
use async_trait::async_trait;

#[derive(Clone)]
pub struct Reply {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
    pub delay: Duration,
    pub error: Option<HttpError>,
}

impl Reply {
    pub fn json(status: u16, body: serde_json::Value) -> Self {
        Self {
            status,
            headers: BTreeMap::from([(
                "content-type".to_string(),
                "application/json".to_string(),
            )]),
            body: serde_json::to_vec(&body).unwrap(),
            delay: Duration::ZERO,
            error: None,
        }
    }

    pub fn fail(error: HttpError) -> Self {
        Self {
            error: Some(error),
            ..Self::json(200, serde_json::json!({}))
        }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Routes by substring of the request URL; the first matching route wins.
#[derive(Default)]
pub struct MockHttp {
    routes: Mutex<Vec<(String, Reply)>>,
    requests: Mutex<Vec<HttpRequest>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: AtomicUsize,
}

impl MockHttp {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn route(&self, url_part: &str, reply: Reply) {
        self.routes
            .lock()
            .unwrap()
            .push((url_part.to_string(), reply));
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn urls(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .map(|r| r.url.to_string())
            .collect()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

struct InFlight(Arc<AtomicUsize>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl HttpClient for MockHttp {
    async fn send(
        &self,
        req: HttpRequest,
        _timeout: Duration,
        _max_response_bytes: usize,
    ) -> Result<HttpResponse, HttpError> {
        let url = req.url.to_string();
        self.requests.lock().unwrap().push(req);
        let reply = self
            .routes
            .lock()
            .unwrap()
            .iter()
            .find(|(part, _)| url.contains(part.as_str()))
            .map(|(_, reply)| reply.clone())
            .unwrap_or_else(|| Reply::json(200, serde_json::json!({})));

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight(self.in_flight.clone());

        if !reply.delay.is_zero() {
            tokio::time::sleep(reply.delay).await;
        }
        if let Some(err) = reply.error {
            return Err(err);
        }
        Ok(HttpResponse {
            status: reply.status,
            headers: reply.headers,
            body: reply.body,
        })
    }
}

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<Event>>,
}

impl RecordingSink {
    pub fn types(&self) -> Vec<&'static str> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.event_type())
            .collect()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventSink for RecordingSink {
    async fn emit(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

pub fn flow(yaml: &str) -> Flow {
    parse_flow_str(yaml, DocumentFormat::Yaml).unwrap().document
}
