use getset::Getters;
use serde::Deserialize;

/// 지수 기본 정보 (`/api/index/{KOSPI|KOSDAQ}/basic`)
#[derive(Clone, Debug, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct IndexBasic {
    /// 현재 지수 (예: "2,650.12")
    #[getset(get = "pub")]
    close_price: String,
    /// 전일 대비
    #[getset(get = "pub")]
    compare_to_previous_close_price: String,
    /// 등락률, % 기호 없음
    #[getset(get = "pub")]
    fluctuations_ratio: String,
}

/// 실시간 종목 시세 (`/api/realtime/domestic/stock/{code}`)
#[derive(Clone, Debug, Deserialize, Getters)]
pub struct RealtimeStock {
    #[getset(get = "pub")]
    #[serde(default)]
    datas: Vec<RealtimeStockRow>,
}

#[derive(Clone, Debug, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct RealtimeStockRow {
    #[getset(get = "pub")]
    #[serde(default)]
    item_code: Option<String>,
    #[getset(get = "pub")]
    stock_name: String,
    /// 현재가 (예: "71,000")
    #[getset(get = "pub")]
    close_price: String,
    #[getset(get = "pub")]
    #[serde(default)]
    compare_to_previous_close_price: Option<String>,
    #[getset(get = "pub")]
    fluctuations_ratio: String,
}
