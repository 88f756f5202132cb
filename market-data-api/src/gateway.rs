use crate::types::config::GatewayConfig;
use crate::{Error, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// 외부로 나가는 요청 한 건
#[derive(Debug, Clone)]
pub struct GatewayRequest {
    method: Method,
    url: String,
    query: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    body: Option<serde_json::Value>,
}

impl GatewayRequest {
    fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::Post, url)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// 같은 이름의 기본 헤더보다 우선한다
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn bearer(self, token: &str) -> Self {
        self.header("authorization", format!("Bearer {}", token))
    }

    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// 대소문자 구분 없이 헤더 값 조회
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn body(&self) -> Option<&serde_json::Value> {
        self.body.as_ref()
    }
}

/// 상태 코드와 본문만 담은 응답. 상태 코드 해석은 호출 측의 몫
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    status: u16,
    body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.body
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.body
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// 스키마와 맞지 않으면 `Error::Provider`
    pub fn json<T: DeserializeOwned>(&self, provider: &str) -> Result<T> {
        serde_json::from_slice(&self.body)
            .map_err(|e| Error::provider(provider, format!("응답 파싱 실패: {}", e)))
    }

    /// 2xx가 아니면 `Error::Provider`
    pub fn ensure_success(self, provider: &str) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(Error::provider(
                provider,
                format!("비정상 상태 코드 {}", self.status),
            ))
        }
    }
}

/// 모든 클라이언트가 공유하는 HTTP 호출 계층.
/// 재시도하지 않으며 상태 코드를 오류로 바꾸지도 않는다.
#[async_trait]
pub trait HttpGateway: Send + Sync {
    async fn execute(&self, request: GatewayRequest) -> Result<RawResponse>;

    async fn get(&self, url: &str, params: &[(&str, &str)]) -> Result<RawResponse> {
        let request = params
            .iter()
            .fold(GatewayRequest::get(url), |request, (key, value)| {
                request.query(*key, *value)
            });
        self.execute(request).await
    }

    async fn post(&self, url: &str, body: Option<serde_json::Value>) -> Result<RawResponse> {
        let request = match body {
            Some(body) => GatewayRequest::post(url).json(body),
            None => GatewayRequest::post(url),
        };
        self.execute(request).await
    }
}

/// reqwest 기반 게이트웨이
#[derive(Clone)]
pub struct RequestGateway {
    client: reqwest::Client,
    user_agent: String,
}

impl RequestGateway {
    pub fn new(config: &GatewayConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self {
            client,
            user_agent: config.user_agent().clone(),
        })
    }

    /// 기본 User-Agent를 붙인 reqwest 요청. 호출자가 같은 헤더를 주면 그 값을 쓴다
    fn build(&self, request: &GatewayRequest) -> Result<reqwest::Request> {
        let url = if request.query_pairs().is_empty() {
            url::Url::parse(request.url())?
        } else {
            url::Url::parse_with_params(request.url(), request.query_pairs())?
        };

        let mut builder = match request.method() {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
        };
        if request.header_value("user-agent").is_none() {
            builder = builder.header(reqwest::header::USER_AGENT, self.user_agent.as_str());
        }
        for (name, value) in request.headers() {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body() {
            builder = builder.json(body);
        }

        Ok(builder.build()?)
    }
}

#[async_trait]
impl HttpGateway for RequestGateway {
    async fn execute(&self, request: GatewayRequest) -> Result<RawResponse> {
        let request = self.build(&request)?;
        let url = request.url().clone();

        let response = self.client.execute(request).await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        debug!(%url, status, bytes = body.len(), "외부 요청 완료");

        Ok(RawResponse::new(status, body.to_vec()))
    }
}
