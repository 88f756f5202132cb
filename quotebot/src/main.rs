use clap::{Parser, Subcommand};
use market_data_api::types::KoreanMarket;
use quotebot::{
    bot::QuoteBot,
    init_tracing,
    reply::{self, Attachment, Reply},
    utility::config::Config,
    utility::errors::{BotError, BotResult},
};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "quotebot")]
#[command(about = "Korean/US market quote bot")]
struct Args {
    /// 설정 파일 경로 (기본값: config.toml)
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// 차트 이미지를 저장할 파일. 없으면 크기만 기록한다
    #[arg(short, long)]
    out: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// 코스피 지수, 또는 종목명/코드 시세 (예: kospi 삼성전자 주봉)
    Kospi { name: Vec<String> },
    /// 코스닥 지수
    Kosdaq,
    /// 미국 주식 시세 + 차트 (예: us AAPL 3개월)
    Us { ticker: String, chart: Option<String> },
    /// 여러 미국 종목 동시 조회
    Multi {
        #[arg(required = true)]
        tickers: Vec<String>,
    },
    /// 원화 환율 (usd/jpy/eur/cny), 금액을 주면 환산
    Fx { currency: String, amount: Option<String> },
    /// CNN 공포탐욕지수
    Fg,
    /// WallStreetBets 언급 상위 10종목
    Wsb,
    /// 업비트 비트코인 시세
    Btc,
}

fn main() -> BotResult<()> {
    // 명령행 인수 파싱
    let args = Args::parse();

    let config = Config::load_from_file(&args.config)?;
    init_tracing(&config.logging.level).map_err(BotError::general)?;
    info!("🚀 quotebot 시작! 설정 파일: {}", args.config);

    let runtime = tokio::runtime::Runtime::new()?;
    let reply = match runtime.block_on(run(&config, args.command)) {
        Ok(reply) => reply,
        Err(e @ BotError::InvalidInput { .. }) => {
            println!("{}", e);
            return Err(e);
        }
        Err(e) => {
            error!("❌ 명령 처리 실패: {}", e);
            println!("{}", reply::FETCH_FAILED);
            return Err(e);
        }
    };

    println!("{}", reply.text);
    match reply.attachment {
        Some(Attachment::Url(url)) => println!("{}", url),
        Some(Attachment::Image(image)) => match &args.out {
            Some(path) => {
                std::fs::write(path, &image).map_err(|e| BotError::io("차트 이미지 저장", e))?;
                info!("📈 차트 저장: {} ({} bytes)", path.display(), image.len());
            }
            None => info!("📈 차트 이미지 {} bytes (--out 으로 저장 가능)", image.len()),
        },
        None => {}
    }

    Ok(())
}

async fn run(config: &Config, command: Command) -> BotResult<Reply> {
    let bot = QuoteBot::from_config(config)?;

    match command {
        Command::Kospi { name } => bot.korean_stock(&name).await,
        Command::Kosdaq => bot.korean_index(KoreanMarket::Kosdaq).await,
        Command::Us { ticker, chart } => bot.us_stock(&ticker, chart.as_deref()).await,
        Command::Multi { tickers } => bot.us_many(&tickers).await,
        Command::Fx { currency, amount } => bot.fx_by_key(&currency, amount.as_deref()).await,
        Command::Fg => bot.fear_greed().await,
        Command::Wsb => bot.wallstreetbets().await,
        Command::Btc => bot.bitcoin().await,
    }
}
