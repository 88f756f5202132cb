use getset::Getters;
use serde::Deserialize;

/// 두나무 환율 (`/v1/forex/recent?codes=FRX.KRW{CODE}`) 배열의 원소
#[derive(Clone, Debug, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct ForexRecent {
    #[getset(get = "pub")]
    #[serde(default)]
    code: Option<String>,
    /// 통화 단위당 원화 가격
    #[getset(get = "pub")]
    base_price: f64,
    /// 예: "달러", "엔"
    #[getset(get = "pub")]
    currency_name: String,
    /// 예: USD는 1, JPY는 100
    #[getset(get = "pub")]
    currency_unit: u32,
}
