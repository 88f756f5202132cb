pub mod config;
pub mod response;
pub mod time;

use crate::Error;
use getset::Getters;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// 시세가 속한 거래 세션
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SessionLabel {
    Regular,
    PreMarket,
    AfterHours,
    Overnight,
    /// 알 수 없는 라벨은 그대로 보여준다
    Other(String),
}

impl SessionLabel {
    /// 제공자가 내려주는 세션 문자열("Pre-market", "After-hours" 등)을 변환
    pub fn from_provider(label: &str) -> Self {
        let trimmed = label.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "" | "today" | "regular" | "regular market" | "market open" => Self::Regular,
            "pre-market" | "premarket" | "pre market" => Self::PreMarket,
            "after-hours" | "after hours" | "afterhours" => Self::AfterHours,
            "overnight" | "24 hour market" => Self::Overnight,
            _ => Self::Other(trimmed.to_string()),
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Self::Regular => "본장",
            Self::PreMarket => "프리장",
            Self::AfterHours => "애프터장",
            Self::Overnight => "오버나잇",
            Self::Other(label) => label,
        }
    }
}

impl fmt::Display for SessionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// 단일 종목 시세. 요청마다 새로 만들고 캐시하지 않는다.
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct Quote {
    #[getset(get = "pub")]
    symbol: String,
    #[getset(get = "pub")]
    company_name: String,
    #[getset(get = "pub")]
    price: Decimal,
    #[getset(get = "pub")]
    session: SessionLabel,
    #[getset(get = "pub")]
    change_amount: Option<Decimal>,
    #[getset(get = "pub")]
    change_percent: Option<Decimal>,
}

impl Quote {
    pub fn new(
        symbol: impl Into<String>,
        company_name: impl Into<String>,
        price: Decimal,
        session: SessionLabel,
        change_amount: Option<Decimal>,
        change_percent: Option<Decimal>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            company_name: company_name.into(),
            price,
            session,
            change_amount,
            change_percent,
        }
    }
}

/// 국내 지수 스냅샷. 값은 제공자가 표시하는 문자열 그대로 보관
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct MarketPoint {
    #[getset(get = "pub")]
    market_name: String,
    #[getset(get = "pub")]
    close_price: String,
    #[getset(get = "pub")]
    change_amount: String,
    #[getset(get = "pub")]
    change_percent_text: String,
}

impl MarketPoint {
    pub fn new(
        market_name: impl Into<String>,
        close_price: impl Into<String>,
        change_amount: impl Into<String>,
        change_percent_text: impl Into<String>,
    ) -> Self {
        Self {
            market_name: market_name.into(),
            close_price: close_price.into(),
            change_amount: change_amount.into(),
            change_percent_text: change_percent_text.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KoreanMarket {
    Kospi,
    Kosdaq,
}

impl KoreanMarket {
    /// 네이버 지수 API 경로에 쓰이는 코드
    pub fn code(&self) -> &'static str {
        match self {
            Self::Kospi => "KOSPI",
            Self::Kosdaq => "KOSDAQ",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Kospi => "코스피",
            Self::Kosdaq => "코스닥",
        }
    }
}

impl fmt::Display for KoreanMarket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// 미국 주식 차트 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartKind {
    Realtime,
    Day,
    Week,
    Monthly,
    Month1,
    Month3,
    Year1,
    Year3,
    Year10,
}

impl ChartKind {
    pub const ALL: [ChartKind; 9] = [
        Self::Realtime,
        Self::Day,
        Self::Week,
        Self::Monthly,
        Self::Month1,
        Self::Month3,
        Self::Year1,
        Self::Year3,
        Self::Year10,
    ];

    /// 사용자 입력으로 받는 키 (변경 금지)
    pub fn key(&self) -> &'static str {
        match self {
            Self::Realtime => "REALTIME",
            Self::Day => "DAY",
            Self::Week => "WEEK",
            Self::Monthly => "MONTHLY",
            Self::Month1 => "MONTH_1",
            Self::Month3 => "MONTH_3",
            Self::Year1 => "YEAR",
            Self::Year3 => "YEAR_3",
            Self::Year10 => "YEAR_10",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Realtime => "실시간",
            Self::Day => "일봉",
            Self::Week => "주봉",
            Self::Monthly => "월봉",
            Self::Month1 => "1개월",
            Self::Month3 => "3개월",
            Self::Year1 => "1년",
            Self::Year3 => "3년",
            Self::Year10 => "10년",
        }
    }

    /// 가능한 라벨 목록 (안내 메시지용)
    pub fn labels() -> Vec<&'static str> {
        Self::ALL.iter().map(|kind| kind.label()).collect()
    }
}

impl FromStr for ChartKind {
    type Err = Error;

    /// 키(`MONTH_3`)와 라벨(`3개월`) 모두 허용
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.key().eq_ignore_ascii_case(trimmed) || kind.label() == trimmed)
            .ok_or_else(|| Error::InvalidChartKind(trimmed.to_string()))
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// 원화 환율을 조회할 통화
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Currency {
    Usd,
    Jpy,
    Eur,
    Cny,
}

impl Currency {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Usd => "USD",
            Self::Jpy => "JPY",
            Self::Eur => "EUR",
            Self::Cny => "CNY",
        }
    }
}

impl FromStr for Currency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USD" => Ok(Self::Usd),
            "JPY" => Ok(Self::Jpy),
            "EUR" => Ok(Self::Eur),
            "CNY" => Ok(Self::Cny),
            other => Err(Error::InvalidCurrency(other.to_string())),
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// 거래소 단축코드 (예: "005930")
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SymbolCode(String);

impl SymbolCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SymbolCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 종목명 → 단축코드 매핑. 외부에서 한 번 만들어 읽기 전용으로 넘겨받는다.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    entries: HashMap<String, Vec<String>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, code: impl Into<String>) {
        self.entries.entry(name.into()).or_default().push(code.into());
    }

    /// 기존 매핑을 버리고 하나의 코드로 덮어쓴다
    pub fn set(&mut self, name: impl Into<String>, code: impl Into<String>) {
        self.entries.insert(name.into(), vec![code.into()]);
    }

    /// 같은 이름이 여러 코드에 매핑되어 있으면 처음 등록된 코드를 쓴다
    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.entries
            .get(name)
            .and_then(|codes| codes.first())
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<HashMap<String, Vec<String>>> for SymbolTable {
    fn from(entries: HashMap<String, Vec<String>>) -> Self {
        Self { entries }
    }
}

impl<N: Into<String>, C: Into<String>> FromIterator<(N, C)> for SymbolTable {
    fn from_iter<I: IntoIterator<Item = (N, C)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (name, code) in iter {
            table.insert(name, code);
        }
        table
    }
}

/// "$1,234.56", "+2.10", "−0.35%" 같은 표시용 숫자를 Decimal로 변환
pub fn parse_decimal(text: &str) -> Option<Decimal> {
    let cleaned: String = text
        .trim()
        .replace('\u{2212}', "-")
        .chars()
        .filter(|c| !matches!(c, ',' | '$' | '%' | '+' | ' ' | '(' | ')'))
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_session_label_mapping() {
        assert_eq!(SessionLabel::from_provider("Pre-market"), SessionLabel::PreMarket);
        assert_eq!(SessionLabel::from_provider("After-hours"), SessionLabel::AfterHours);
        assert_eq!(SessionLabel::from_provider("Overnight"), SessionLabel::Overnight);
        assert_eq!(SessionLabel::from_provider("Today"), SessionLabel::Regular);
        assert_eq!(
            SessionLabel::from_provider(" Holiday trading "),
            SessionLabel::Other("Holiday trading".to_string())
        );
        assert_eq!(SessionLabel::Other("Holiday trading".into()).display_name(), "Holiday trading");
    }

    #[test]
    fn test_chart_kind_parse() {
        assert_eq!("MONTH_3".parse::<ChartKind>().expect("key"), ChartKind::Month3);
        assert_eq!("year".parse::<ChartKind>().expect("key"), ChartKind::Year1);
        assert_eq!("주봉".parse::<ChartKind>().expect("label"), ChartKind::Week);
        assert!(matches!(
            "HOUR".parse::<ChartKind>(),
            Err(Error::InvalidChartKind(kind)) if kind == "HOUR"
        ));
    }

    #[test]
    fn test_currency_parse() {
        assert_eq!(" jpy ".parse::<Currency>().expect("currency"), Currency::Jpy);
        assert!(matches!(
            "GBP".parse::<Currency>(),
            Err(Error::InvalidCurrency(code)) if code == "GBP"
        ));
    }

    #[test]
    fn test_symbol_table_first_code_wins() {
        let table: SymbolTable = vec![("삼성전자", "005930"), ("삼성전자", "005935")]
            .into_iter()
            .collect();
        assert_eq!(table.lookup("삼성전자"), Some("005930"));
        assert_eq!(table.lookup("없는종목"), None);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal("$1,234.56"), Some(dec!(1234.56)));
        assert_eq!(parse_decimal("+2.10"), Some(dec!(2.10)));
        assert_eq!(parse_decimal("\u{2212}0.35%"), Some(dec!(-0.35)));
        assert_eq!(parse_decimal("(1.17%)"), Some(dec!(1.17)));
        assert_eq!(parse_decimal(""), None);
        assert_eq!(parse_decimal("N/A"), None);
    }
}
