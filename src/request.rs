//! Deferred HTTP calls: a prepared request, the transport that sends it, and
//! the transform that turns the raw response into a value.

use std::error::Error as StdError;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use tokio::runtime::{Handle, Runtime};
use tokio::task::JoinHandle;
use tracing::{debug, error, trace};
use url::Url;

use crate::error::{Error, RequestError, Result};

type Transform<T> = Arc<dyn Fn(RawResponse) -> Result<T> + Send + Sync>;

/// HTTP client plus the runtime its calls are scheduled on.
///
/// Clones share both the connection pool and the runtime.
#[derive(Clone)]
pub struct Transport {
    client: reqwest::Client,
    handle: Handle,
    _runtime: Option<Arc<OwnedRuntime>>,
}

struct OwnedRuntime(Option<Runtime>);

impl Drop for OwnedRuntime {
    fn drop(&mut self) {
        // may run on a worker thread, where a blocking shutdown would panic
        if let Some(runtime) = self.0.take() {
            runtime.shutdown_background();
        }
    }
}

impl Transport {
    /// Creates a transport with its own multi-threaded runtime.
    pub fn new() -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("binclient-worker")
            .enable_all()
            .build()
            .map_err(|source| Error::Runtime { source })?;

        Ok(Transport {
            client: reqwest::Client::builder().build()?,
            handle: runtime.handle().clone(),
            _runtime: Some(Arc::new(OwnedRuntime(Some(runtime)))),
        })
    }

    /// Creates a transport that schedules its calls on an existing runtime.
    ///
    /// Blocking execution needs a multi-threaded runtime behind `handle`.
    pub fn with_handle(handle: Handle) -> Result<Self> {
        Ok(Self::with_client(reqwest::Client::builder().build()?, handle))
    }

    pub fn with_client(client: reqwest::Client, handle: Handle) -> Self {
        Transport {
            client,
            handle,
            _runtime: None,
        }
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.handle.block_on(future)
    }
}

/// Description of an outbound call: method, URL, headers and body.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Option<Bytes>,
}

impl PreparedRequest {
    pub fn get(url: Url) -> Self {
        PreparedRequest {
            method: Method::GET,
            url,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn post(url: Url, content_type: &'static str, body: impl Into<Bytes>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        PreparedRequest {
            method: Method::POST,
            url,
            headers,
            body: Some(body.into()),
        }
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    fn build(&self, client: &reqwest::Client) -> reqwest::RequestBuilder {
        let builder = client
            .request(self.method.clone(), self.url.clone())
            .headers(self.headers.clone());
        match &self.body {
            Some(body) => builder.body(body.clone()),
            None => builder,
        }
    }
}

impl fmt::Display for PreparedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

/// A fully read response: status, final URL after redirects, and body.
#[derive(Debug, Clone)]
pub struct RawResponse {
    status: StatusCode,
    url: Url,
    body: Bytes,
}

impl RawResponse {
    pub fn new(status: StatusCode, url: Url, body: impl Into<Bytes>) -> Self {
        RawResponse {
            status,
            url,
            body: body.into(),
        }
    }

    async fn read(response: reqwest::Response) -> Result<Self> {
        let status = response.status();
        let url = response.url().clone();
        let body = response.bytes().await?;
        Ok(RawResponse { status, url, body })
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn text(&self) -> Result<&str> {
        Ok(std::str::from_utf8(&self.body)?)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// An HTTP call producing a `T`, executed only when asked to.
///
/// Every execution issues a new call; the request itself holds no state
/// between executions and may be executed any number of times.
pub struct DeferredRequest<T> {
    request: Arc<PreparedRequest>,
    transport: Transport,
    transform: Transform<T>,
}

impl<T> Clone for DeferredRequest<T> {
    fn clone(&self) -> Self {
        DeferredRequest {
            request: self.request.clone(),
            transport: self.transport.clone(),
            transform: self.transform.clone(),
        }
    }
}

impl<T> fmt::Debug for DeferredRequest<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredRequest")
            .field("request", &self.request)
            .finish_non_exhaustive()
    }
}

impl<T: 'static> DeferredRequest<T> {
    pub fn new<F>(request: PreparedRequest, transport: Transport, transform: F) -> Self
    where
        F: Fn(RawResponse) -> Result<T> + Send + Sync + 'static,
    {
        DeferredRequest {
            request: Arc::new(request),
            transport,
            transform: Arc::new(transform),
        }
    }

    pub fn request(&self) -> &PreparedRequest {
        &self.request
    }

    /// Applies `f` to the value once the transform has succeeded.
    pub fn map<U, F>(self, f: F) -> DeferredRequest<U>
    where
        U: 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        let transform = self.transform;
        DeferredRequest {
            request: self.request,
            transport: self.transport,
            transform: Arc::new(move |raw| transform(raw).map(&f)),
        }
    }

    /// Executes the request on the current runtime.
    pub async fn send(&self) -> Result<T> {
        exchange(&self.transport.client, &self.request, self.transform.as_ref()).await
    }

    /// Executes the request on the calling thread.
    ///
    /// # Panics
    ///
    /// Panics when called from within an asynchronous context; use
    /// [`DeferredRequest::send`] there.
    pub fn execute_blocking(&self) -> std::result::Result<T, RequestError> {
        self.transport
            .block_on(self.send())
            .map_err(|source| RequestError::new(self.request.to_string(), source))
    }

    /// Like [`DeferredRequest::execute_blocking`], computing a fallback value
    /// from the failure instead of returning it.
    pub fn execute_blocking_or_else<F>(&self, on_failure: F) -> T
    where
        F: FnOnce(Error) -> T,
    {
        self.transport.block_on(self.send()).unwrap_or_else(on_failure)
    }

    /// Executes on the calling thread and hands the outcome to exactly one
    /// callback. An error returned by `on_success` goes to `on_failure`.
    pub fn execute_blocking_with<S, E, F>(&self, on_success: S, on_failure: F)
    where
        S: FnOnce(T) -> std::result::Result<(), E>,
        E: Into<Box<dyn StdError + Send + Sync>>,
        F: FnOnce(Error),
    {
        complete(self.transport.block_on(self.send()), on_success, on_failure);
    }
}

impl<T: Send + 'static> DeferredRequest<T> {
    /// Spawns the request on the transport's runtime.
    pub fn execute_async(&self) -> JoinHandle<Result<T>> {
        // the task owns a transport clone so an owned runtime outlives it
        let transport = self.transport.clone();
        let request = self.request.clone();
        let transform = self.transform.clone();
        self.transport.handle.spawn(async move {
            exchange(&transport.client, &request, transform.as_ref()).await
        })
    }

    /// Spawns the request and runs one of the callbacks on a runtime worker
    /// when it completes. An error returned by `on_success` goes to
    /// `on_failure`; `on_success` is never retried.
    pub fn execute_async_with<S, E, F>(&self, on_success: S, on_failure: F) -> JoinHandle<()>
    where
        S: FnOnce(T) -> std::result::Result<(), E> + Send + 'static,
        E: Into<Box<dyn StdError + Send + Sync>>,
        F: FnOnce(Error) + Send + 'static,
    {
        let transport = self.transport.clone();
        let request = self.request.clone();
        let transform = self.transform.clone();
        self.transport.handle.spawn(async move {
            let result = exchange(&transport.client, &request, transform.as_ref()).await;
            complete(result, on_success, on_failure);
        })
    }

    /// Spawns the request; failures are logged at error level.
    pub fn execute_async_logged<S, E>(&self, on_success: S) -> JoinHandle<()>
    where
        S: FnOnce(T) -> std::result::Result<(), E> + Send + 'static,
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        let description = self.request.to_string();
        self.execute_async_with(on_success, move |error| {
            error!("request {description} failed: {}", ErrorChain(&error));
        })
    }
}

async fn exchange<T>(
    client: &reqwest::Client,
    request: &PreparedRequest,
    transform: &(dyn Fn(RawResponse) -> Result<T> + Send + Sync),
) -> Result<T> {
    debug!("sending request: {request}");
    let response = request.build(client).send().await?;
    let raw = RawResponse::read(response).await?;
    trace!(
        "response: request='{request}', status={status}, size={size}",
        status = raw.status(),
        size = raw.body().len()
    );
    transform(raw)
}

fn complete<T, S, E, F>(result: Result<T>, on_success: S, on_failure: F)
where
    S: FnOnce(T) -> std::result::Result<(), E>,
    E: Into<Box<dyn StdError + Send + Sync>>,
    F: FnOnce(Error),
{
    match result {
        Ok(value) => {
            if let Err(source) = on_success(value) {
                on_failure(Error::Handler {
                    source: source.into(),
                });
            }
        }
        Err(error) => on_failure(error),
    }
}

/// Displays an error followed by its chain of sources.
struct ErrorChain<'a>(&'a (dyn StdError + 'static));

impl fmt::Display for ErrorChain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)?;
        let mut source = self.0.source();
        while let Some(cause) = source {
            write!(f, ": {cause}")?;
            source = cause.source();
        }
        Ok(())
    }
}
