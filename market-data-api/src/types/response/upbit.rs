use getset::Getters;
use serde::Deserialize;

/// 업비트 `/v1/ticker?markets=KRW-BTC` 배열의 원소
#[derive(Clone, Debug, Deserialize, Getters)]
pub struct Ticker {
    #[getset(get = "pub")]
    market: String,
    #[getset(get = "pub")]
    trade_price: f64,
    /// 부호 있는 변화율 (0.0123 = 1.23%)
    #[getset(get = "pub")]
    signed_change_rate: f64,
    #[getset(get = "pub")]
    signed_change_price: f64,
}
