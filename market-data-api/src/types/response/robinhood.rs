use getset::Getters;
use serde::Deserialize;

/// 종목 페이지 `<script id="__NEXT_DATA__">` 안의 JSON 중 토큰이 들어있는 경로만 정의
/// `props.pageProps.dehydratedState.queries[0].state.data`
#[derive(Clone, Debug, Deserialize)]
pub struct NextData {
    pub props: NextProps,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextProps {
    pub page_props: PageProps,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageProps {
    pub dehydrated_state: DehydratedState,
}

#[derive(Clone, Debug, Deserialize)]
pub struct DehydratedState {
    #[serde(default)]
    pub queries: Vec<DehydratedQuery>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct DehydratedQuery {
    pub state: QueryState,
}

#[derive(Clone, Debug, Deserialize)]
pub struct QueryState {
    #[serde(default)]
    pub data: serde_json::Value,
}

impl NextData {
    /// 비어있지 않은 문자열 토큰만 인정
    pub fn bearer_token(&self) -> Option<&str> {
        self.props
            .page_props
            .dehydrated_state
            .queries
            .first()
            .and_then(|query| query.state.data.as_str())
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }
}

/// `detail-page-live-updating-data` 응답
#[derive(Clone, Debug, Deserialize, Getters)]
pub struct LiveDetail {
    #[getset(get = "pub")]
    #[serde(default)]
    symbol: Option<String>,
    #[getset(get = "pub")]
    #[serde(default)]
    name: Option<String>,
    #[getset(get = "pub")]
    chart_section: ChartSection,
}

/// 가격 표시 슬롯. 정규장 값은 primary, 프리/애프터/오버나잇 값은 secondary/tertiary에 온다
#[derive(Clone, Debug, Deserialize, Getters)]
pub struct ChartSection {
    #[getset(get = "pub")]
    primary_value: DisplaySlot,
    #[getset(get = "pub")]
    #[serde(default)]
    secondary_value: Option<DisplaySlot>,
    #[getset(get = "pub")]
    #[serde(default)]
    tertiary_value: Option<DisplaySlot>,
}

#[derive(Clone, Debug, Default, Deserialize, Getters)]
pub struct DisplaySlot {
    /// 예: "$182.30"
    #[getset(get = "pub")]
    #[serde(default)]
    price: Option<String>,
    /// 예: "+$2.10"
    #[getset(get = "pub")]
    #[serde(default)]
    change: Option<String>,
    /// 예: "+1.17%"
    #[getset(get = "pub")]
    #[serde(default)]
    change_percent: Option<String>,
    /// 예: "Today", "After-hours"
    #[getset(get = "pub")]
    #[serde(default)]
    label: Option<String>,
}

impl DisplaySlot {
    pub fn is_empty(&self) -> bool {
        self.price
            .as_deref()
            .map(|price| price.trim().is_empty())
            .unwrap_or(true)
    }
}

impl ChartSection {
    /// 가장 최근 세션 값을 가진 슬롯: tertiary > secondary > primary 중 비어있지 않은 첫 슬롯
    pub fn latest(&self) -> &DisplaySlot {
        [self.tertiary_value.as_ref(), self.secondary_value.as_ref()]
            .into_iter()
            .flatten()
            .find(|slot| !slot.is_empty())
            .unwrap_or(&self.primary_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_data_token() {
        let raw = r#"{"props":{"pageProps":{"dehydratedState":{"queries":[{"state":{"data":"abc.def"}}]}}}}"#;
        let data: NextData = serde_json::from_str(raw).expect("valid next data");
        assert_eq!(data.bearer_token(), Some("abc.def"));

        let raw = r#"{"props":{"pageProps":{"dehydratedState":{"queries":[{"state":{"data":{"nested":1}}}]}}}}"#;
        let data: NextData = serde_json::from_str(raw).expect("valid next data");
        assert_eq!(data.bearer_token(), None);
    }

    #[test]
    fn test_latest_slot_skips_empty() {
        let raw = r#"{
            "primary_value": {"price": "$100.00", "label": "Today"},
            "secondary_value": {"price": "$101.00", "label": "After-hours"},
            "tertiary_value": {"price": ""}
        }"#;
        let section: ChartSection = serde_json::from_str(raw).expect("valid section");
        assert_eq!(section.latest().price().as_deref(), Some("$101.00"));

        let raw = r#"{"primary_value": {"price": "$100.00", "label": "Today"}}"#;
        let section: ChartSection = serde_json::from_str(raw).expect("valid section");
        assert_eq!(section.latest().label().as_deref(), Some("Today"));
    }
}
