//! 제공자별 응답 스키마. 필드가 빠지면 역직렬화 단계에서 실패하므로
//! 호출 측은 이를 `Error::Provider`로 바꿔 돌려준다.

pub mod cnn;
pub mod dunamu;
pub mod naver;
pub mod robinhood;
pub mod tradestie;
pub mod upbit;
