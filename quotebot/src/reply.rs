//! 채팅 응답 문자열

use market_data_api::currency::FxRate;
use market_data_api::korean::KrChartPeriod;
use market_data_api::sentiment::{FearGreedIndex, Mention};
use market_data_api::types::response::upbit::Ticker;
use market_data_api::types::{ChartKind, MarketPoint, Quote};
use rust_decimal::Decimal;
use std::fmt::Write;

pub const NOT_FOUND: &str = "종목 정보를 찾지 못했습니다.";
pub const FETCH_FAILED: &str = "데이터를 가져오는데 실패했습니다.";

/// 응답에 붙는 이미지
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attachment {
    /// 메신저가 직접 내려받는 이미지 주소
    Url(String),
    Image(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub attachment: Option<Attachment>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attachment: None,
        }
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }
}

/// "1234567.5" → "1,234,567.5"
pub fn group_digits(value: &str) -> String {
    let (sign, unsigned) = match value.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", value),
    };
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (unsigned, None),
    };

    let mut grouped = String::from(sign);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if let Some(fraction) = fraction {
        grouped.push('.');
        grouped.push_str(fraction);
    }
    grouped
}

fn signed(value: Decimal) -> String {
    if value.is_sign_negative() {
        value.to_string()
    } else {
        format!("+{}", value)
    }
}

pub fn invalid_chart_kind() -> String {
    format!(
        "잘못된 차트 타입입니다.\n가능한 값: {}",
        ChartKind::labels().join(", ")
    )
}

pub fn korean_index(point: &MarketPoint) -> String {
    format!(
        "{} 지수: {} ({} {})",
        point.market_name(),
        point.close_price(),
        point.change_amount(),
        point.change_percent_text()
    )
}

pub fn korean_stock(quote: &Quote, period: KrChartPeriod) -> String {
    let percent = quote.change_percent().unwrap_or_default().round_dp(2);
    let mut text = format!(
        "종목명: {} / 현재: {} ({:.2}%)",
        quote.company_name(),
        group_digits(&quote.price().to_string()),
        percent
    );
    if period == KrChartPeriod::Week {
        text.push_str(&format!("\n{} 차트입니다.", period.keyword()));
    }
    text
}

/// `[회사명] 차트종류` 머리줄 + 세션별 가격 줄
pub fn us_stock(quote: &Quote, chart: Option<ChartKind>) -> String {
    let mut text = match chart {
        Some(kind) => format!("[{}] {}", quote.company_name(), kind.label()),
        None => format!("[{}]", quote.company_name()),
    };
    let _ = write!(text, "\n{}: ${}", quote.session(), quote.price());
    if let Some(change) = quote.change_amount() {
        let _ = write!(text, " {}", signed(*change));
    }
    if let Some(percent) = quote.change_percent() {
        let _ = write!(text, " ({}%)", signed(*percent));
    }
    text
}

pub fn us_quote_line(ticker: &str, result: &market_data_api::Result<Quote>) -> String {
    match result {
        Ok(quote) => {
            let mut line = format!("{} ({}): ${}", ticker, quote.session(), quote.price());
            if let Some(percent) = quote.change_percent() {
                let _ = write!(line, " {}%", signed(*percent));
            }
            line
        }
        Err(e) if e.is_not_found() => format!("{}: {}", ticker, NOT_FOUND),
        Err(_) => format!("{}: {}", ticker, FETCH_FAILED),
    }
}

pub fn fx(amount: Option<Decimal>, rate: &FxRate, converted: Decimal) -> String {
    match amount {
        None => format!(
            "{}{}: {}원",
            rate.unit_size(),
            rate.display_name(),
            rate.base_price()
        ),
        Some(amount) => format!("{}{}: {:.2}원", amount, rate.display_name(), converted),
    }
}

pub fn fear_greed(index: &FearGreedIndex) -> String {
    format!("현재 fear & greed Index\n{} {}\n", index.score(), index.rating())
}

pub fn wallstreetbets(mentions: &[Mention]) -> String {
    let mut text = String::from("댓글이 많은 순서\n");
    for (i, mention) in mentions.iter().enumerate() {
        let _ = writeln!(
            text,
            "{}. {} {} ({})",
            i + 1,
            mention.ticker(),
            mention.sentiment().emoji(),
            mention.sentiment_score()
        );
    }
    text
}

pub fn upbit(ticker: &Ticker) -> String {
    format!(
        "[업비트] 현재가: {}원 ({:.2}% {})",
        group_digits(&(ticker.trade_price().trunc() as i64).to_string()),
        ticker.signed_change_rate() * 100.0,
        group_digits(&(ticker.signed_change_price().trunc() as i64).to_string())
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use market_data_api::types::SessionLabel;
    use rust_decimal_macros::dec;

    #[test]
    fn test_group_digits() {
        assert_eq!(group_digits("71000"), "71,000");
        assert_eq!(group_digits("-1183000"), "-1,183,000");
        assert_eq!(group_digits("999"), "999");
        assert_eq!(group_digits("1234567.25"), "1,234,567.25");
    }

    #[test]
    fn test_korean_messages() {
        let point = MarketPoint::new("KOSPI", "2,650.30", "+12.40", "0.47%");
        assert_eq!(korean_index(&point), "KOSPI 지수: 2,650.30 (+12.40 0.47%)");

        let quote = Quote::new(
            "005930",
            "삼성전자",
            dec!(71000),
            SessionLabel::Regular,
            Some(dec!(-500)),
            Some(dec!(-0.7)),
        );
        assert_eq!(
            korean_stock(&quote, KrChartPeriod::Day),
            "종목명: 삼성전자 / 현재: 71,000 (-0.70%)"
        );
        assert!(korean_stock(&quote, KrChartPeriod::Week).ends_with("\n주봉 차트입니다."));
    }

    #[test]
    fn test_us_stock_message() {
        let quote = Quote::new(
            "AAPL",
            "Apple",
            dec!(182.30),
            SessionLabel::AfterHours,
            Some(dec!(2.10)),
            Some(dec!(1.17)),
        );
        assert_eq!(
            us_stock(&quote, Some(ChartKind::Realtime)),
            "[Apple] 실시간\n애프터장: $182.30 +2.10 (+1.17%)"
        );
        assert_eq!(us_quote_line("AAPL", &Ok(quote)), "AAPL (애프터장): $182.30 +1.17%");
        assert_eq!(
            us_quote_line(
                "ZZZZ",
                &Err(market_data_api::Error::NotFound("ZZZZ".to_string()))
            ),
            "ZZZZ: 종목 정보를 찾지 못했습니다."
        );
    }

    #[test]
    fn test_fx_message() {
        let rate = FxRate::new(dec!(1300.5), "달러", 1);
        assert_eq!(fx(None, &rate, dec!(1300.5)), "1달러: 1300.5원");
        assert_eq!(fx(Some(dec!(200)), &rate, dec!(260100.00)), "200달러: 260100.00원");
    }

    #[test]
    fn test_invalid_chart_kind_lists_labels() {
        assert_eq!(
            invalid_chart_kind(),
            "잘못된 차트 타입입니다.\n가능한 값: 실시간, 일봉, 주봉, 월봉, 1개월, 3개월, 1년, 3년, 10년"
        );
    }
}
