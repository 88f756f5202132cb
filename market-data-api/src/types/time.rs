use chrono::{DateTime, Utc};

/// 서울 기준 현재 시각. 캐시 우회 파라미터와 날짜 경로 생성에 사용
#[derive(Debug, Clone)]
pub struct Time(DateTime<chrono_tz::Tz>);

impl Time {
    pub fn now() -> Self {
        Self(Utc::now().with_timezone(&chrono_tz::Asia::Seoul))
    }
    /// YYYY-MM-DD
    pub fn date(&self) -> String {
        format!("{}", self.0.format("%Y-%m-%d"))
    }
    /// 초 단위 유닉스 시각
    pub fn timestamp(&self) -> i64 {
        self.0.timestamp()
    }
}
