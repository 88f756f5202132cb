//! KRX 전종목 CSV → 종목명/단축코드 테이블

use crate::utility::errors::{BotError, BotResult};
use market_data_api::types::SymbolTable;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::info;

pub const NAME_COLUMN: &str = "한글 종목약명";
pub const CODE_COLUMN: &str = "단축코드";

/// CSV에 없거나 다르게 불리는 별칭
const CUSTOM_FIXTURES: &[(&str, &str)] = &[("곱버스", "252670")];

pub fn load_symbol_table(path: &Path) -> BotResult<SymbolTable> {
    let file = File::open(path)
        .map_err(|e| BotError::symbol_table(path.display().to_string(), e.to_string()))?;
    let table = read_symbol_table(file)?;
    info!("종목 테이블 로드: {} ({}개)", path.display(), table.len());
    Ok(table)
}

pub fn read_symbol_table<R: Read>(reader: R) -> BotResult<SymbolTable> {
    let mut reader = csv::Reader::from_reader(reader);
    let headers = reader.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|header| header.trim_start_matches('\u{feff}').trim() == name)
            .ok_or_else(|| BotError::symbol_table("CSV", format!("{} 컬럼이 없습니다", name)))
    };
    let name_index = column(NAME_COLUMN)?;
    let code_index = column(CODE_COLUMN)?;

    let mut table = SymbolTable::new();
    for record in reader.records() {
        let record = record?;
        let (Some(name), Some(code)) = (record.get(name_index), record.get(code_index)) else {
            continue;
        };
        let (name, code) = (name.trim(), code.trim());
        if !name.is_empty() && !code.is_empty() {
            table.insert(name, code);
        }
    }

    apply_custom_fixtures(&mut table);
    Ok(table)
}

pub fn apply_custom_fixtures(table: &mut SymbolTable) {
    for (name, code) in CUSTOM_FIXTURES {
        table.set(*name, *code);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\u{feff}표준코드,단축코드,한글 종목명,한글 종목약명,시장구분\n\
KR7005930003,005930,삼성전자보통주,삼성전자,KOSPI\n\
KR7000660001,000660,SK하이닉스보통주,SK하이닉스,KOSPI\n\
KR7252670005,252670,삼성KODEX200선물인버스2X,KODEX 200선물인버스2X,KOSPI\n\
KR7000000000,,빈코드,빈코드,KOSPI\n";

    #[test]
    fn test_read_symbol_table() {
        let table = read_symbol_table(SAMPLE.as_bytes()).expect("valid csv");
        assert_eq!(table.lookup("삼성전자"), Some("005930"));
        assert_eq!(table.lookup("SK하이닉스"), Some("000660"));
        assert_eq!(table.lookup("곱버스"), Some("252670"));
        assert_eq!(table.lookup("빈코드"), None);
    }

    #[test]
    fn test_missing_column() {
        let result = read_symbol_table("이름,코드\n삼성전자,005930\n".as_bytes());
        assert!(matches!(result, Err(BotError::SymbolTable { .. })));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("krx_symbols.csv");
        std::fs::write(&path, SAMPLE).expect("write csv");

        let table = load_symbol_table(&path).expect("load");
        assert_eq!(table.len(), 4);

        assert!(load_symbol_table(&dir.path().join("missing.csv")).is_err());
    }
}
