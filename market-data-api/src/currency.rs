use crate::gateway::HttpGateway;
use crate::types::response::dunamu::ForexRecent;
use crate::types::time::Time;
use crate::types::Currency;
use crate::{Error, Result};
use getset::Getters;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;

pub const FOREX_ENDPOINT: &str = "https://quotation-api-cdn.dunamu.com/v1/forex/recent";
pub const CHART_ENDPOINT: &str =
    "https://ssl.pstatic.net/imgfinance/chart/marketindex/area/month3";

const PROVIDER: &str = "두나무 환율";

/// 통화 단위(`unit_size`)당 원화 가격
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct FxRate {
    #[getset(get = "pub")]
    base_price: Decimal,
    #[getset(get = "pub")]
    display_name: String,
    #[getset(get = "pub")]
    unit_size: u32,
}

impl FxRate {
    pub fn new(base_price: Decimal, display_name: impl Into<String>, unit_size: u32) -> Self {
        Self {
            base_price,
            display_name: display_name.into(),
            unit_size,
        }
    }
}

/// 외화 금액을 원화로 환산. 금액이 없으면 한 단위(`unit_size`) 기준.
/// 결과는 소수점 둘째 자리로 반올림한다. 표현 범위를 넘으면 `InvalidAmount`.
pub fn convert(amount: Option<Decimal>, rate: &FxRate) -> Result<Decimal> {
    let unit = Decimal::from(rate.unit_size.max(1));
    let amount = amount.unwrap_or(unit);
    amount
        .checked_div(unit)
        .and_then(|per_unit| per_unit.checked_mul(rate.base_price))
        .map(|won| won.round_dp(2))
        .ok_or_else(|| Error::InvalidAmount(amount.to_string()))
}

/// 최근 3개월 환율 차트 이미지 URL
pub fn chart_url(currency: Currency) -> String {
    format!(
        "{}/FX_{}KRW.png?ver={}",
        CHART_ENDPOINT,
        currency.code(),
        Time::now().timestamp()
    )
}

#[derive(Clone)]
pub struct CurrencyService {
    gateway: Arc<dyn HttpGateway>,
}

impl CurrencyService {
    pub fn new(gateway: Arc<dyn HttpGateway>) -> Self {
        Self { gateway }
    }

    pub async fn fetch_rate(&self, currency: Currency) -> Result<FxRate> {
        let codes = format!("FRX.KRW{}", currency.code());
        let rows: Vec<ForexRecent> = self
            .gateway
            .get(FOREX_ENDPOINT, &[("codes", codes.as_str())])
            .await?
            .ensure_success(PROVIDER)?
            .json(PROVIDER)?;

        let row = rows
            .first()
            .ok_or_else(|| Error::provider(PROVIDER, format!("{} 환율 결과가 비어 있습니다", codes)))?;
        let base_price = Decimal::from_f64(*row.base_price()).ok_or_else(|| {
            Error::provider(PROVIDER, format!("환율 값 변환 실패: {}", row.base_price()))
        })?;

        info!("{} 환율: {} 원 / {}{}", currency, base_price, row.currency_unit(), row.currency_name());
        Ok(FxRate::new(base_price, row.currency_name(), *row.currency_unit()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::testing::FakeGateway;
    use crate::gateway::RawResponse;
    use rust_decimal_macros::dec;

    #[test]
    fn test_convert() {
        let usd = FxRate::new(dec!(1300), "달러", 1);
        assert_eq!(convert(Some(dec!(200)), &usd).expect("won"), dec!(260000.00));
        assert_eq!(convert(None, &usd).expect("won"), dec!(1300));

        let jpy = FxRate::new(dec!(905.12), "엔", 100);
        assert_eq!(convert(Some(dec!(1000)), &jpy).expect("won"), dec!(9051.20));
        assert_eq!(convert(None, &jpy).expect("won"), dec!(905.12));
        assert_eq!(convert(Some(dec!(1)), &jpy).expect("won"), dec!(9.05));
    }

    #[test]
    fn test_convert_overflow() {
        let usd = FxRate::new(dec!(1300), "달러", 1);
        let huge: Decimal = "100000000000000000000000000".parse().expect("decimal");
        assert!(matches!(convert(Some(huge), &usd), Err(Error::InvalidAmount(_))));
        assert!(matches!(
            convert(Some(Decimal::MAX), &usd),
            Err(Error::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_chart_url() {
        assert!(chart_url(Currency::Jpy).starts_with(
            "https://ssl.pstatic.net/imgfinance/chart/marketindex/area/month3/FX_JPYKRW.png?ver="
        ));
    }

    #[tokio::test]
    async fn test_fetch_rate() {
        let gateway = Arc::new(FakeGateway::new().route(
            "forex/recent",
            vec![RawResponse::new(
                200,
                r#"[{"code":"FRX.KRWJPY","currencyCode":"JPY","currencyName":"엔","basePrice":905.12,"currencyUnit":100}]"#,
            )],
        ));
        let service = CurrencyService::new(gateway.clone());

        let rate = service.fetch_rate(Currency::Jpy).await.expect("rate");
        assert_eq!(*rate.base_price(), dec!(905.12));
        assert_eq!(rate.display_name(), "엔");
        assert_eq!(*rate.unit_size(), 100);

        let requests = gateway.requests();
        assert_eq!(
            requests[0].query_pairs()[0],
            ("codes".to_string(), "FRX.KRWJPY".to_string())
        );
    }

    #[tokio::test]
    async fn test_empty_rate_is_provider_error() {
        let gateway = Arc::new(
            FakeGateway::new().route("forex/recent", vec![RawResponse::new(200, "[]")]),
        );
        assert!(matches!(
            CurrencyService::new(gateway).fetch_rate(Currency::Usd).await,
            Err(Error::Provider { .. })
        ));
    }
}
