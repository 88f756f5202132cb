//! 미국 시세 세션 상태(베어러 토큰 + 종목 식별자 캐시)와 저장소.
//!
//! 상태는 시작할 때 저장소에서 읽고, 토큰 갱신이나 새 종목 식별자가 생길 때마다
//! 통째로 다시 저장한다. 읽기-수정-저장은 하나의 잠금 안에서 일어나므로
//! 동시에 여러 종목을 처음 조회해도 갱신이 유실되지 않는다.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// 저장 문서: `{ "token": "...", "instruments": { "AAPL": "450dfc6d-..." } }`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    /// 예전 파일의 `access_token` 키도 읽는다
    #[serde(default, alias = "access_token")]
    token: String,
    #[serde(default)]
    instruments: HashMap<String, String>,
}

impl SessionState {
    pub fn new(token: impl Into<String>, instruments: HashMap<String, String>) -> Self {
        Self {
            token: token.into(),
            instruments,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn has_token(&self) -> bool {
        !self.token.trim().is_empty()
    }

    pub fn instrument(&self, ticker: &str) -> Option<&str> {
        self.instruments.get(ticker).map(String::as_str)
    }

    pub fn instruments(&self) -> &HashMap<String, String> {
        &self.instruments
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = token.into();
    }

    pub fn insert_instrument(&mut self, ticker: impl Into<String>, instrument_id: impl Into<String>) {
        self.instruments.insert(ticker.into(), instrument_id.into());
    }
}

/// 세션 상태 영속화 포트
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<SessionState>;
    fn save(&self, state: &SessionState) -> Result<()>;
}

/// JSON 파일 저장소. 임시 파일에 쓴 뒤 rename 해서 교체한다.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SessionStore for JsonFileStore {
    fn load(&self) -> Result<SessionState> {
        if !self.path.exists() {
            debug!("세션 파일이 없어 새로 만듭니다: {}", self.path.display());
            let state = SessionState::default();
            self.save(&state)?;
            return Ok(state);
        }

        let content = fs::read_to_string(&self.path)
            .map_err(|e| Error::store("세션 파일 읽기", e.to_string()))?;
        if content.trim().is_empty() {
            return Ok(SessionState::default());
        }

        serde_json::from_str(&content).map_err(|e| Error::store("세션 파일 파싱", e.to_string()))
    }

    fn save(&self, state: &SessionState) -> Result<()> {
        let json = serde_json::to_string_pretty(state)
            .map_err(|e| Error::store("세션 직렬화", e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| Error::store("세션 디렉터리 생성", e.to_string()))?;
        }

        let temp_path = self.temp_path();
        fs::write(&temp_path, json).map_err(|e| Error::store("세션 임시 파일 저장", e.to_string()))?;
        fs::rename(&temp_path, &self.path)
            .map_err(|e| Error::store("세션 파일 교체", e.to_string()))?;

        debug!("세션이 저장되었습니다: {}", self.path.display());
        Ok(())
    }
}

/// 메모리 저장소. 저장 횟수를 세므로 테스트에서 영속화 여부를 확인할 수 있다.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<SessionState>,
    saves: AtomicUsize,
}

impl MemoryStore {
    pub fn new(state: SessionState) -> Self {
        Self {
            state: Mutex::new(state),
            saves: AtomicUsize::new(0),
        }
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> SessionState {
        self.state
            .lock()
            .map(|state| state.clone())
            .unwrap_or_default()
    }
}

impl SessionStore for MemoryStore {
    fn load(&self) -> Result<SessionState> {
        self.state
            .lock()
            .map(|state| state.clone())
            .map_err(|e| Error::store("메모리 세션 읽기", e.to_string()))
    }

    fn save(&self, state: &SessionState) -> Result<()> {
        let mut stored = self
            .state
            .lock()
            .map_err(|e| Error::store("메모리 세션 저장", e.to_string()))?;
        *stored = state.clone();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// 미국 시세 클라이언트가 단독으로 소유하는 세션 상태.
/// 하나의 잠금이 모든 읽기-수정-저장 구간을 감싼다.
pub struct ResilienceState {
    state: tokio::sync::Mutex<SessionState>,
    store: Arc<dyn SessionStore>,
}

impl ResilienceState {
    /// 저장소에서 마지막 상태를 읽어온다
    pub fn load(store: Arc<dyn SessionStore>) -> Result<Self> {
        let state = store.load()?;
        info!(
            "세션 상태 로드: 토큰 {}, 종목 식별자 {}개",
            if state.has_token() { "있음" } else { "없음" },
            state.instruments().len()
        );
        Ok(Self {
            state: tokio::sync::Mutex::new(state),
            store,
        })
    }

    pub async fn token(&self) -> String {
        self.state.lock().await.token().to_string()
    }

    pub async fn has_token(&self) -> bool {
        self.state.lock().await.has_token()
    }

    pub async fn instrument(&self, ticker: &str) -> Option<String> {
        self.state.lock().await.instrument(ticker).map(str::to_string)
    }

    pub async fn snapshot(&self) -> SessionState {
        self.state.lock().await.clone()
    }

    pub async fn replace_token(&self, token: String) {
        let mut state = self.state.lock().await;
        state.set_token(token);
        self.persist(&state);
    }

    pub async fn record_instrument(&self, ticker: &str, instrument_id: &str) {
        let mut state = self.state.lock().await;
        state.insert_instrument(ticker, instrument_id);
        self.persist(&state);
    }

    // 메모리 상태가 기준이므로 저장 실패는 경고만 남긴다
    fn persist(&self, state: &SessionState) {
        if let Err(e) = self.store.save(state) {
            warn!("세션 저장 실패: {}", e);
        }
    }
}
