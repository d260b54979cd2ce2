//! 시가총액 상위 암호화폐 목록 명령어.

use anyhow::Context;
use tracing::info;

use pulse_core::categories::category_of;
use pulse_data::MarketDataManager;

/// 상위 목록을 조회해 순위/심볼/가격/카테고리 표로 출력합니다.
pub async fn run(manager: &MarketDataManager, limit: usize) -> anyhow::Result<()> {
    info!(limit = limit, "상위 암호화폐 목록 조회");

    let listings = manager
        .top_symbols(limit)
        .await
        .context("상위 목록 조회 실패 (CMC_API_KEY가 필요합니다)")?;

    println!("{:<6} {:<10} {:>16}  {}", "Rank", "Symbol", "Price (USD)", "Category");
    println!("{}", "-".repeat(52));
    for (rank, listing) in listings.iter().enumerate() {
        println!(
            "{:<6} {:<10} {:>16.4}  {}",
            rank + 1,
            listing.symbol,
            listing.price,
            category_of(&listing.symbol)
        );
    }
    println!("\n{} assets", listings.len());

    Ok(())
}
