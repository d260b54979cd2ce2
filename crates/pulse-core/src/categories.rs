//! 암호화폐 카테고리 테이블.
//!
//! 상관관계 분석에서 개별 코인을 묶어 카테고리 지수를 만들 때 사용하는
//! 정적 분류표입니다. 분류에 없는 심볼은 "Other"로 처리됩니다.

/// 카테고리 이름과 소속 심볼 목록.
pub const CRYPTO_CATEGORIES: &[(&str, &[&str])] = &[
    (
        "Layer1",
        &[
            "BTC", "ETH", "SOL", "ADA", "AVAX", "NEAR", "APT", "ALGO", "ICP", "TON", "ETC",
            "BCH", "HBAR", "SUI", "VET", "LTC",
        ],
    ),
    ("Layer2", &["OP", "ARB", "POL", "MNT"]),
    ("DeFi", &["UNI", "AAVE", "BGB", "LEO", "RENDER", "OM"]),
    ("Exchange", &["BNB", "OKB", "CRO"]),
    (
        "Infrastructure",
        &["LINK", "FIL", "XLM", "TRX", "XRP", "VIRTUAL"],
    ),
    ("Privacy", &["XMR"]),
    ("Stablecoin", &["USDT", "USDC", "DAI", "USDe"]),
    ("Meme", &["DOGE", "SHIB", "PEPE", "HYPE", "ENA"]),
    ("AI & Data", &["FET", "KAS", "TAO"]),
    ("Cross-Chain", &["ATOM", "DOT"]),
];

/// 분류되지 않은 심볼의 카테고리 레이블.
pub const OTHER_CATEGORY: &str = "Other";

/// 심볼이 속한 카테고리를 반환합니다.
pub fn category_of(symbol: &str) -> &'static str {
    let upper = symbol.to_uppercase();
    for (category, members) in CRYPTO_CATEGORIES {
        if members.iter().any(|m| m.eq_ignore_ascii_case(&upper)) {
            return category;
        }
    }
    OTHER_CATEGORY
}

/// 카테고리 이름 목록 (테이블 순서 유지).
pub fn category_names() -> Vec<&'static str> {
    CRYPTO_CATEGORIES.iter().map(|(name, _)| *name).collect()
}

/// 카테고리의 소속 심볼 목록을 반환합니다.
pub fn members_of(category: &str) -> Option<&'static [&'static str]> {
    CRYPTO_CATEGORIES
        .iter()
        .find(|(name, _)| *name == category)
        .map(|(_, members)| *members)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_lookup() {
        assert_eq!(category_of("BTC"), "Layer1");
        assert_eq!(category_of("doge"), "Meme");
        assert_eq!(category_of("USDC"), "Stablecoin");
        assert_eq!(category_of("NOT_A_COIN"), OTHER_CATEGORY);
    }

    #[test]
    fn test_members_and_names_consistent() {
        for name in category_names() {
            let members = members_of(name).unwrap();
            assert!(!members.is_empty());
            for member in members {
                assert_eq!(category_of(member), name);
            }
        }
        assert!(members_of("Nope").is_none());
    }

    #[test]
    fn test_no_symbol_in_two_categories() {
        let mut seen = std::collections::HashSet::new();
        for (_, members) in CRYPTO_CATEGORIES {
            for member in *members {
                assert!(seen.insert(*member), "{} appears twice", member);
            }
        }
    }
}
